//! Repository port for trail persistence.

use crate::trail::{
    access::Caller,
    domain::{Trail, TrailContent, TrailId, TrailPatch},
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for trail repository operations.
pub type TrailRepositoryResult<T> = Result<T, TrailRepositoryError>;

/// Trail persistence contract.
///
/// Every operation names the caller it runs for. Stores that enforce access
/// rules natively (row-level security) use it to identify the session;
/// stores that do not may ignore it.
#[async_trait]
pub trait TrailRepository: Send + Sync {
    /// Stores new trail content and returns the stored trail.
    ///
    /// The store assigns the identifier and creation timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`TrailRepositoryError::DuplicateTrail`] when the assigned
    /// identifier collides with an existing row, or
    /// [`TrailRepositoryError::MissingRequiredField`] when the store rejects
    /// a null required column.
    async fn create(&self, caller: &Caller, content: &TrailContent) -> TrailRepositoryResult<Trail>;

    /// Finds a trail by identifier.
    ///
    /// Returns `None` when the trail does not exist.
    async fn find_by_id(&self, caller: &Caller, id: TrailId) -> TrailRepositoryResult<Option<Trail>>;

    /// Returns at most `limit` trails, newest first.
    async fn list_recent(&self, caller: &Caller, limit: usize) -> TrailRepositoryResult<Vec<Trail>>;

    /// Applies a partial update and returns the stored result.
    ///
    /// An empty patch leaves the row untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TrailRepositoryError::NotFound`] when the trail does not
    /// exist.
    async fn update(
        &self,
        caller: &Caller,
        id: TrailId,
        patch: &TrailPatch,
    ) -> TrailRepositoryResult<Trail>;

    /// Deletes a trail.
    ///
    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, caller: &Caller, id: TrailId) -> TrailRepositoryResult<bool>;
}

/// Errors returned by trail repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TrailRepositoryError {
    /// A trail with the same identifier already exists.
    #[error("duplicate trail identifier")]
    DuplicateTrail,

    /// A required column was null.
    #[error("missing required trail field: {0}")]
    MissingRequiredField(String),

    /// The trail was not found.
    #[error("trail not found: {0}")]
    NotFound(TrailId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TrailRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
