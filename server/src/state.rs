use std::sync::Arc;

use controllers::{GameController, ReviewController};
use database::{Collections, Pool, Repository};

#[derive(Clone)]
pub struct AppState {
    pub games: GameController<Repository>,
    pub reviews: ReviewController<Repository>,
    pub pool: Arc<Pool>,
    pub api_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(pool: Arc<Pool>, database: &str, api_token: Option<String>) -> Self {
        let repository = Arc::new(Repository::new(
            pool.clone(),
            database,
            Collections::default(),
        ));

        Self {
            games: GameController::new(repository.clone()),
            reviews: ReviewController::new(repository),
            pool,
            api_token: api_token.map(Arc::from),
        }
    }

    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }
}
