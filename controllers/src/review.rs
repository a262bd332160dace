use std::sync::Arc;

use database::{DatabaseError, ReviewRepository};
use types::{Identifier, Review};

pub struct ReviewController<R: ?Sized> {
    repository: Arc<R>,
}

impl<R: ?Sized> Clone for ReviewController<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<R: ReviewRepository + ?Sized> ReviewController<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn find_all_reviews(&self) -> Result<Vec<Review>, DatabaseError> {
        self.repository.find_all_reviews().await
    }

    pub async fn find_all_unpublished_reviews(&self) -> Result<Vec<Review>, DatabaseError> {
        self.repository.find_all_unpublished_reviews().await
    }

    pub async fn get_review_by_id(&self, id: Identifier) -> Result<Option<Review>, DatabaseError> {
        self.repository.get_review_by_id(id).await
    }

    pub async fn store_review(&self, review: &mut Review) -> Result<Identifier, DatabaseError> {
        self.repository.store_review(review).await
    }

    pub async fn update_review(&self, review: &Review) -> Result<(), DatabaseError> {
        self.repository.update_review(review).await
    }

    pub async fn delete_review_by_id(&self, id: Identifier) -> Result<(), DatabaseError> {
        self.repository.delete_review_by_id(id).await
    }
}
