//! In-memory trail repository for tests and embedded use.

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::trail::{
    access::Caller,
    domain::{PersistedTrailData, Trail, TrailContent, TrailId, TrailPatch},
    ports::{TrailRepository, TrailRepositoryError, TrailRepositoryResult},
};

/// Thread-safe in-memory trail repository.
///
/// Identifiers come from [`TrailId::new`] and creation timestamps from the
/// injected clock, standing in for the column defaults of the `PostgreSQL`
/// schema. Trails created within the same clock tick are ordered by
/// insertion.
pub struct InMemoryTrailRepository<C = DefaultClock> {
    state: Arc<RwLock<InMemoryTrailState>>,
    clock: Arc<C>,
}

#[derive(Debug, Default)]
struct InMemoryTrailState {
    trails: HashMap<TrailId, StoredTrail>,
    next_sequence: u64,
}

#[derive(Debug, Clone)]
struct StoredTrail {
    trail: Trail,
    sequence: u64,
}

impl InMemoryTrailRepository<DefaultClock> {
    /// Creates an empty repository stamped by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl<C> InMemoryTrailRepository<C> {
    /// Creates an empty repository stamped by `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<C>) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryTrailState::default())),
            clock,
        }
    }
}

impl Default for InMemoryTrailRepository<DefaultClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for InMemoryTrailRepository<C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> fmt::Debug for InMemoryTrailRepository<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryTrailRepository")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn lock_error(err: impl fmt::Display) -> TrailRepositoryError {
    TrailRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl<C> TrailRepository for InMemoryTrailRepository<C>
where
    C: Clock + Send + Sync,
{
    async fn create(&self, _caller: &Caller, content: &TrailContent) -> TrailRepositoryResult<Trail> {
        let mut state = self.state.write().map_err(lock_error)?;

        let id = TrailId::new();
        if state.trails.contains_key(&id) {
            return Err(TrailRepositoryError::DuplicateTrail);
        }

        let trail = Trail::from_persisted(PersistedTrailData {
            id,
            created_at: self.clock.utc(),
            content: content.clone(),
        });
        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.trails.insert(
            id,
            StoredTrail {
                trail: trail.clone(),
                sequence,
            },
        );
        Ok(trail)
    }

    async fn find_by_id(&self, _caller: &Caller, id: TrailId) -> TrailRepositoryResult<Option<Trail>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.trails.get(&id).map(|stored| stored.trail.clone()))
    }

    async fn list_recent(&self, _caller: &Caller, limit: usize) -> TrailRepositoryResult<Vec<Trail>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut stored: Vec<&StoredTrail> = state.trails.values().collect();
        stored.sort_by(|a, b| {
            b.trail
                .created_at()
                .cmp(&a.trail.created_at())
                .then_with(|| b.sequence.cmp(&a.sequence))
        });
        Ok(stored
            .into_iter()
            .take(limit)
            .map(|entry| entry.trail.clone())
            .collect())
    }

    async fn update(
        &self,
        _caller: &Caller,
        id: TrailId,
        patch: &TrailPatch,
    ) -> TrailRepositoryResult<Trail> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored = state
            .trails
            .get_mut(&id)
            .ok_or(TrailRepositoryError::NotFound(id))?;

        if patch.is_empty() {
            return Ok(stored.trail.clone());
        }

        let updated = Trail::from_persisted(PersistedTrailData {
            id,
            created_at: stored.trail.created_at(),
            content: stored.trail.content().patched(patch),
        });
        stored.trail = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, _caller: &Caller, id: TrailId) -> TrailRepositoryResult<bool> {
        let mut state = self.state.write().map_err(lock_error)?;
        Ok(state.trails.remove(&id).is_some())
    }
}
