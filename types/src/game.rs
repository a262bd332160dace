use serde::{Deserialize, Serialize};

use crate::Identifier;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Game {
    pub id: Identifier,
    pub name: String,
    pub category: String,
    pub description: String,
    pub publisher: String,
    pub release_year: Option<u16>,
    pub cover_url: Option<String>,
}

impl Game {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            ..Self::default()
        }
    }
}
