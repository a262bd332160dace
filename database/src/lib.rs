pub mod collections;
pub mod config;
mod document;
pub mod error;
pub mod pool;
pub mod repository;
pub mod retry;

pub use collections::Collections;
pub use config::DatabaseConfig;
pub use error::DatabaseError;
pub use pool::{Affinity, Pool, PoolStatus, Session, StoreOptions};
pub use repository::{GameRepository, Repository, ReviewRepository};
pub use retry::retry_with_backoff;
