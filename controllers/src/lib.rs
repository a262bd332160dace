//! Use-case layer between the delivery layer and the repositories.
//!
//! Each controller method maps to exactly one repository call and returns
//! its result untouched.

pub mod game;
pub mod review;

pub use game::GameController;
pub use review::ReviewController;

#[cfg(test)]
pub(crate) mod mocks {
    use async_trait::async_trait;
    use database::{DatabaseError, GameRepository, ReviewRepository};
    use mockall::mock;
    use types::{Game, Identifier, Review};

    mock! {
        pub Games {}

        #[async_trait]
        impl GameRepository for Games {
            async fn store_game(&self, game: &mut Game) -> Result<Identifier, DatabaseError>;
            async fn find_all_games(&self) -> Result<Vec<Game>, DatabaseError>;
            async fn get_game_by_id(&self, id: Identifier) -> Result<Option<Game>, DatabaseError>;
            async fn find_games_by_category(&self, category: &str) -> Result<Vec<Game>, DatabaseError>;
            async fn find_all_categories(&self) -> Result<Vec<String>, DatabaseError>;
            async fn update_game(&self, game: &Game) -> Result<(), DatabaseError>;
            async fn delete_game_by_id(&self, id: Identifier) -> Result<(), DatabaseError>;
        }
    }

    mock! {
        pub Reviews {}

        #[async_trait]
        impl ReviewRepository for Reviews {
            async fn store_review(&self, review: &mut Review) -> Result<Identifier, DatabaseError>;
            async fn find_all_reviews(&self) -> Result<Vec<Review>, DatabaseError>;
            async fn find_all_unpublished_reviews(&self) -> Result<Vec<Review>, DatabaseError>;
            async fn get_review_by_id(&self, id: Identifier) -> Result<Option<Review>, DatabaseError>;
            async fn update_review(&self, review: &Review) -> Result<(), DatabaseError>;
            async fn delete_review_by_id(&self, id: Identifier) -> Result<(), DatabaseError>;
        }
    }
}
