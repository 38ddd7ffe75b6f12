//! Trail aggregate root.

use super::{GraphPayload, TrailContent, TrailId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A stored trail.
///
/// Only stores construct trails: the identifier and creation time are
/// assigned when the row is written. Trails serialize for callers but do not
/// deserialize; stores rebuild them through [`Trail::from_persisted`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trail {
    id: TrailId,
    created_at: DateTime<Utc>,
    #[serde(flatten)]
    content: TrailContent,
}

/// Parameter object for reconstructing a persisted trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTrailData {
    /// Persisted trail identifier.
    pub id: TrailId,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted query, synthesis, and graph.
    pub content: TrailContent,
}

impl Trail {
    /// Reconstructs a trail from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTrailData) -> Self {
        Self {
            id: data.id,
            created_at: data.created_at,
            content: data.content,
        }
    }

    /// Returns the trail identifier.
    #[must_use]
    pub const fn id(&self) -> TrailId {
        self.id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the caller-writable content.
    #[must_use]
    pub const fn content(&self) -> &TrailContent {
        &self.content
    }

    /// Returns the query that produced the trail.
    #[must_use]
    pub fn query(&self) -> &str {
        self.content.query()
    }

    /// Returns the synthesis text, if any.
    #[must_use]
    pub fn synthesis(&self) -> Option<&str> {
        self.content.synthesis()
    }

    /// Returns the graph nodes payload, if any.
    #[must_use]
    pub const fn nodes(&self) -> Option<&GraphPayload> {
        self.content.nodes()
    }

    /// Returns the graph edges payload, if any.
    #[must_use]
    pub const fn edges(&self) -> Option<&GraphPayload> {
        self.content.edges()
    }
}
