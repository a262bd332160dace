use std::sync::Arc;

use database::{DatabaseError, GameRepository};
use types::{Game, Identifier};

pub struct GameController<R: ?Sized> {
    repository: Arc<R>,
}

impl<R: ?Sized> Clone for GameController<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<R: GameRepository + ?Sized> GameController<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn find_all_games(&self) -> Result<Vec<Game>, DatabaseError> {
        self.repository.find_all_games().await
    }

    pub async fn find_game_by_id(&self, id: Identifier) -> Result<Option<Game>, DatabaseError> {
        self.repository.get_game_by_id(id).await
    }

    pub async fn find_games_by_category(&self, category: &str) -> Result<Vec<Game>, DatabaseError> {
        self.repository.find_games_by_category(category).await
    }

    pub async fn find_all_categories(&self) -> Result<Vec<String>, DatabaseError> {
        self.repository.find_all_categories().await
    }

    pub async fn store_game(&self, game: &mut Game) -> Result<Identifier, DatabaseError> {
        self.repository.store_game(game).await
    }

    pub async fn update_game(&self, game: &Game) -> Result<(), DatabaseError> {
        self.repository.update_game(game).await
    }

    pub async fn delete_game_by_id(&self, id: Identifier) -> Result<(), DatabaseError> {
        self.repository.delete_game_by_id(id).await
    }
}
