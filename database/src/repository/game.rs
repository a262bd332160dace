use async_trait::async_trait;
use types::{Game, Identifier};

use super::{Repository, CATEGORY_FIELD};
use crate::document::FieldValue;
use crate::DatabaseError;

#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Overwrites `game.id` with a fresh identifier and inserts the game.
    async fn store_game(&self, game: &mut Game) -> Result<Identifier, DatabaseError>;
    async fn find_all_games(&self) -> Result<Vec<Game>, DatabaseError>;
    /// `Ok(None)` when no game has this id.
    async fn get_game_by_id(&self, id: Identifier) -> Result<Option<Game>, DatabaseError>;
    async fn find_games_by_category(&self, category: &str) -> Result<Vec<Game>, DatabaseError>;
    async fn find_all_categories(&self) -> Result<Vec<String>, DatabaseError>;
    /// Replaces the game stored under `game.id`, creating it if absent.
    async fn update_game(&self, game: &Game) -> Result<(), DatabaseError>;
    /// Deleting an unknown id is not an error.
    async fn delete_game_by_id(&self, id: Identifier) -> Result<(), DatabaseError>;
}

#[async_trait]
impl GameRepository for Repository {
    async fn store_game(&self, game: &mut Game) -> Result<Identifier, DatabaseError> {
        let (collection, ready) = self.games();
        let mut session = self.checkout(&collection, ready).await?;

        game.id = Identifier::new();
        collection.insert(&mut session, game.id, &*game).await?;

        tracing::debug!("Stored game {} in {}", game.id, self.database);
        Ok(game.id)
    }

    async fn find_all_games(&self) -> Result<Vec<Game>, DatabaseError> {
        let (collection, ready) = self.games();
        let mut session = self.checkout(&collection, ready).await?;
        collection.find_all(&mut session).await
    }

    async fn get_game_by_id(&self, id: Identifier) -> Result<Option<Game>, DatabaseError> {
        let (collection, ready) = self.games();
        let mut session = self.checkout(&collection, ready).await?;
        collection.find_one(&mut session, id).await
    }

    async fn find_games_by_category(&self, category: &str) -> Result<Vec<Game>, DatabaseError> {
        let (collection, ready) = self.games();
        let mut session = self.checkout(&collection, ready).await?;
        collection
            .find_by(&mut session, CATEGORY_FIELD, FieldValue::Text(category))
            .await
    }

    async fn find_all_categories(&self) -> Result<Vec<String>, DatabaseError> {
        let (collection, ready) = self.games();
        let mut session = self.checkout(&collection, ready).await?;
        collection.distinct(&mut session, CATEGORY_FIELD).await
    }

    async fn update_game(&self, game: &Game) -> Result<(), DatabaseError> {
        let (collection, ready) = self.games();
        let mut session = self.checkout(&collection, ready).await?;
        collection.upsert(&mut session, game.id, game).await?;

        tracing::debug!("Updated game {} in {}", game.id, self.database);
        Ok(())
    }

    async fn delete_game_by_id(&self, id: Identifier) -> Result<(), DatabaseError> {
        let (collection, ready) = self.games();
        let mut session = self.checkout(&collection, ready).await?;
        let removed = collection.delete(&mut session, id).await?;

        tracing::debug!("Deleted game {} from {} ({} removed)", id, self.database, removed);
        Ok(())
    }
}
