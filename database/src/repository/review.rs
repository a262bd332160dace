use async_trait::async_trait;
use types::{Identifier, Review};

use super::{Repository, PUBLISHED_FIELD};
use crate::document::FieldValue;
use crate::DatabaseError;

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Overwrites `review.id` with a fresh identifier and inserts the review.
    async fn store_review(&self, review: &mut Review) -> Result<Identifier, DatabaseError>;
    /// All reviews sorted by id.
    async fn find_all_reviews(&self) -> Result<Vec<Review>, DatabaseError>;
    async fn find_all_unpublished_reviews(&self) -> Result<Vec<Review>, DatabaseError>;
    async fn get_review_by_id(&self, id: Identifier) -> Result<Option<Review>, DatabaseError>;
    async fn update_review(&self, review: &Review) -> Result<(), DatabaseError>;
    async fn delete_review_by_id(&self, id: Identifier) -> Result<(), DatabaseError>;
}

#[async_trait]
impl ReviewRepository for Repository {
    async fn store_review(&self, review: &mut Review) -> Result<Identifier, DatabaseError> {
        let (collection, ready) = self.reviews();
        let mut session = self.checkout(&collection, ready).await?;

        review.id = Identifier::new();
        collection.insert(&mut session, review.id, &*review).await?;

        tracing::debug!("Stored review {} in {}", review.id, self.database);
        Ok(review.id)
    }

    async fn find_all_reviews(&self) -> Result<Vec<Review>, DatabaseError> {
        let (collection, ready) = self.reviews();
        let mut session = self.checkout(&collection, ready).await?;
        collection.find_all(&mut session).await
    }

    async fn find_all_unpublished_reviews(&self) -> Result<Vec<Review>, DatabaseError> {
        let (collection, ready) = self.reviews();
        let mut session = self.checkout(&collection, ready).await?;
        collection
            .find_by(&mut session, PUBLISHED_FIELD, FieldValue::Flag(false))
            .await
    }

    async fn get_review_by_id(&self, id: Identifier) -> Result<Option<Review>, DatabaseError> {
        let (collection, ready) = self.reviews();
        let mut session = self.checkout(&collection, ready).await?;
        collection.find_one(&mut session, id).await
    }

    async fn update_review(&self, review: &Review) -> Result<(), DatabaseError> {
        let (collection, ready) = self.reviews();
        let mut session = self.checkout(&collection, ready).await?;
        collection.upsert(&mut session, review.id, review).await?;

        tracing::debug!("Updated review {} in {}", review.id, self.database);
        Ok(())
    }

    async fn delete_review_by_id(&self, id: Identifier) -> Result<(), DatabaseError> {
        let (collection, ready) = self.reviews();
        let mut session = self.checkout(&collection, ready).await?;
        let removed = collection.delete(&mut session, id).await?;

        tracing::debug!("Deleted review {} from {} ({} removed)", id, self.database, removed);
        Ok(())
    }
}
