pub mod game;
pub mod review;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use game::GameRepository;
pub use review::ReviewRepository;

use crate::document::DocumentCollection;
use crate::pool::{Affinity, Pool, Session};
use crate::{Collections, DatabaseError};

const CATEGORY_FIELD: &str = "category";
const PUBLISHED_FIELD: &str = "is_published";

/// Document-store repository for one database. Implements both
/// [`GameRepository`] and [`ReviewRepository`]; every call borrows its own
/// pool session and gives it back before returning.
///
/// Collections are created on first use. A failed setup is retried on the
/// next call.
pub struct Repository {
    pool: Arc<Pool>,
    database: String,
    collections: Collections,
    games_ready: AtomicBool,
    reviews_ready: AtomicBool,
}

impl Repository {
    pub fn new(pool: Arc<Pool>, database: impl Into<String>, collections: Collections) -> Self {
        Self {
            pool,
            database: database.into(),
            collections,
            games_ready: AtomicBool::new(false),
            reviews_ready: AtomicBool::new(false),
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    pub fn pool(&self) -> &Arc<Pool> {
        &self.pool
    }

    fn games(&self) -> (DocumentCollection<'_>, &AtomicBool) {
        let collection =
            DocumentCollection::new(&self.database, self.collections.games(), CATEGORY_FIELD);
        (collection, &self.games_ready)
    }

    fn reviews(&self) -> (DocumentCollection<'_>, &AtomicBool) {
        let collection =
            DocumentCollection::new(&self.database, self.collections.reviews(), PUBLISHED_FIELD);
        (collection, &self.reviews_ready)
    }

    /// Borrows a session, creating the collection first if this repository
    /// has not done so yet. Concurrent first calls may both run the
    /// idempotent setup.
    async fn checkout(
        &self,
        collection: &DocumentCollection<'_>,
        ready: &AtomicBool,
    ) -> Result<Session<'_>, DatabaseError> {
        let mut session = self.pool.session(Affinity::Shared).await?;
        if !ready.load(Ordering::Acquire) {
            collection.ensure(&mut session).await?;
            ready.store(true, Ordering::Release);
        }
        Ok(session)
    }
}
