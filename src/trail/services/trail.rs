//! Service layer for recording and revisiting trails.
//!
//! Provides [`TrailService`], which applies a [`TrailAccessPolicy`] in front
//! of a [`TrailRepository`]. Rows the policy hides behave as absent; writes
//! the policy rejects fail with [`TrailServiceError::AccessDenied`].

use crate::trail::{
    access::{Caller, TrailAccessPolicy, TrailOperation},
    domain::{Trail, TrailContent, TrailId, TrailPatch},
    ports::{TrailRepository, TrailRepositoryError},
};
use std::sync::Arc;
use thiserror::Error;

/// Number of trails returned by [`TrailService::list_recent`] unless
/// configured otherwise.
pub const DEFAULT_RECENT_LIMIT: usize = 20;

/// Service-level errors for trail operations.
#[derive(Debug, Error)]
pub enum TrailServiceError {
    /// The access policy rejected the operation.
    #[error("{caller} may not {operation} trails under policy '{policy}'")]
    AccessDenied {
        /// Caller that attempted the operation.
        caller: Caller,
        /// Rejected operation.
        operation: TrailOperation,
        /// Name of the rejecting policy.
        policy: String,
    },
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TrailRepositoryError),
}

/// Result type for trail service operations.
pub type TrailServiceResult<T> = Result<T, TrailServiceError>;

/// Trail recording and retrieval service.
#[derive(Clone)]
pub struct TrailService<R, P>
where
    R: TrailRepository,
    P: TrailAccessPolicy,
{
    repository: Arc<R>,
    policy: Arc<P>,
    recent_limit: usize,
}

impl<R, P> TrailService<R, P>
where
    R: TrailRepository,
    P: TrailAccessPolicy,
{
    /// Creates a new trail service.
    ///
    /// Logs a warning when `policy` admits every caller.
    #[must_use]
    pub fn new(repository: Arc<R>, policy: Arc<P>) -> Self {
        if policy.is_unrestricted() {
            tracing::warn!(
                policy = policy.name(),
                "trail access policy grants every caller every operation"
            );
        }
        Self {
            repository,
            policy,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }

    /// Sets the number of trails returned by [`Self::list_recent`].
    #[must_use]
    pub const fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }

    /// Returns the configured recent-listing limit.
    #[must_use]
    pub const fn recent_limit(&self) -> usize {
        self.recent_limit
    }

    /// Records a new trail.
    ///
    /// # Errors
    ///
    /// Returns [`TrailServiceError::AccessDenied`] when the policy rejects
    /// the content, or [`TrailServiceError::Repository`] when persistence
    /// fails.
    pub async fn record(&self, caller: &Caller, content: TrailContent) -> TrailServiceResult<Trail> {
        self.ensure_writable(caller, TrailOperation::Insert, &content)?;
        let trail = self.repository.create(caller, &content).await?;
        tracing::info!(trail_id = %trail.id(), %caller, "recorded trail");
        Ok(trail)
    }

    /// Finds a trail by identifier.
    ///
    /// Returns `Ok(None)` when the trail does not exist or the policy hides
    /// it from `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`TrailServiceError::Repository`] when persistence lookup
    /// fails.
    pub async fn find(&self, caller: &Caller, id: TrailId) -> TrailServiceResult<Option<Trail>> {
        tracing::debug!(trail_id = %id, %caller, "looking up trail");
        Ok(self.find_visible(caller, id).await?)
    }

    /// Returns the most recent trails visible to `caller`, newest first,
    /// bounded by the configured recent limit.
    ///
    /// # Errors
    ///
    /// Returns [`TrailServiceError::Repository`] when persistence lookup
    /// fails.
    pub async fn list_recent(&self, caller: &Caller) -> TrailServiceResult<Vec<Trail>> {
        self.list_recent_with_limit(caller, self.recent_limit).await
    }

    /// Returns at most `limit` recent trails visible to `caller`, newest
    /// first.
    ///
    /// Hidden rows are filtered after the store applies the limit, so a
    /// restrictive policy may yield fewer than `limit` entries.
    ///
    /// # Errors
    ///
    /// Returns [`TrailServiceError::Repository`] when persistence lookup
    /// fails.
    pub async fn list_recent_with_limit(
        &self,
        caller: &Caller,
        limit: usize,
    ) -> TrailServiceResult<Vec<Trail>> {
        let trails = self.repository.list_recent(caller, limit).await?;
        let visible: Vec<Trail> = trails
            .into_iter()
            .filter(|trail| self.policy.can_read(caller, trail))
            .collect();
        tracing::debug!(%caller, limit, count = visible.len(), "listed recent trails");
        Ok(visible)
    }

    /// Applies a partial update, typically the synthesis and graph computed
    /// after the trail was recorded.
    ///
    /// # Errors
    ///
    /// Returns [`TrailServiceError::Repository`] with
    /// [`TrailRepositoryError::NotFound`] when the trail is absent or hidden,
    /// [`TrailServiceError::AccessDenied`] when the policy rejects the
    /// updated content, or [`TrailServiceError::Repository`] when
    /// persistence fails.
    pub async fn annotate(
        &self,
        caller: &Caller,
        id: TrailId,
        patch: TrailPatch,
    ) -> TrailServiceResult<Trail> {
        let current = self.find_visible_or_error(caller, id).await?;
        let next = current.content().patched(&patch);
        self.ensure_writable(caller, TrailOperation::Update, &next)?;
        let updated = self.repository.update(caller, id, &patch).await?;
        tracing::info!(trail_id = %id, %caller, "annotated trail");
        Ok(updated)
    }

    /// Deletes a trail.
    ///
    /// # Errors
    ///
    /// Returns [`TrailServiceError::Repository`] with
    /// [`TrailRepositoryError::NotFound`] when the trail is absent or hidden,
    /// or [`TrailServiceError::Repository`] when persistence fails.
    pub async fn delete(&self, caller: &Caller, id: TrailId) -> TrailServiceResult<()> {
        self.find_visible_or_error(caller, id).await?;
        if !self.repository.delete(caller, id).await? {
            return Err(TrailRepositoryError::NotFound(id).into());
        }
        tracing::info!(trail_id = %id, %caller, "deleted trail");
        Ok(())
    }

    async fn find_visible(
        &self,
        caller: &Caller,
        id: TrailId,
    ) -> Result<Option<Trail>, TrailRepositoryError> {
        let found = self.repository.find_by_id(caller, id).await?;
        Ok(found.filter(|trail| self.policy.can_read(caller, trail)))
    }

    async fn find_visible_or_error(
        &self,
        caller: &Caller,
        id: TrailId,
    ) -> TrailServiceResult<Trail> {
        self.find_visible(caller, id)
            .await?
            .ok_or_else(|| TrailRepositoryError::NotFound(id).into())
    }

    fn ensure_writable(
        &self,
        caller: &Caller,
        operation: TrailOperation,
        content: &TrailContent,
    ) -> TrailServiceResult<()> {
        if self.policy.can_write(caller, content) {
            return Ok(());
        }
        tracing::warn!(%caller, %operation, policy = self.policy.name(), "trail write denied");
        Err(TrailServiceError::AccessDenied {
            caller: *caller,
            operation,
            policy: self.policy.name().to_owned(),
        })
    }
}
