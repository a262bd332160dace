use crate::error::validate_name;
use crate::DatabaseError;

pub const GAME_COLLECTION: &str = "games";
pub const REVIEW_COLLECTION: &str = "reviews";

/// Collection name per entity kind, injected into the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    games: String,
    reviews: String,
}

impl Collections {
    pub fn new(games: impl Into<String>, reviews: impl Into<String>) -> Result<Self, DatabaseError> {
        let games = games.into();
        let reviews = reviews.into();
        validate_name(&games)?;
        validate_name(&reviews)?;
        if games == reviews {
            return Err(DatabaseError::InvalidName(format!(
                "{games} is used for both games and reviews"
            )));
        }
        Ok(Self { games, reviews })
    }

    pub fn games(&self) -> &str {
        &self.games
    }

    pub fn reviews(&self) -> &str {
        &self.reviews
    }
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            games: GAME_COLLECTION.to_string(),
            reviews: REVIEW_COLLECTION.to_string(),
        }
    }
}
