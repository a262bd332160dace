use serde::{Deserialize, Serialize};

use crate::Identifier;

/// A review starts unpublished; `is_published` is false unless set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    pub id: Identifier,
    pub title: String,
    /// Advisory link to a game. Not enforced by the store.
    pub game_id: Option<Identifier>,
    pub author: String,
    pub body: String,
    pub score: Option<u8>,
    pub is_published: bool,
}

impl Review {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}
