//! Diesel row models for trail persistence.

use super::schema::trails;
use crate::trail::domain::{
    GraphPayload, PersistedTrailData, Trail, TrailContent, TrailId, TrailPatch,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for trail records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = trails)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TrailRow {
    /// Trail identifier.
    pub id: uuid::Uuid,
    /// Query that produced the trail.
    pub query: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Optional synthesis text.
    pub synthesis: Option<String>,
    /// Optional graph nodes payload.
    pub nodes: Option<Value>,
    /// Optional graph edges payload.
    pub edges: Option<Value>,
}

impl From<TrailRow> for Trail {
    fn from(row: TrailRow) -> Self {
        let TrailRow {
            id,
            query,
            created_at,
            synthesis,
            nodes,
            edges,
        } = row;

        let mut content = TrailContent::new(query);
        if let Some(text) = synthesis {
            content = content.with_synthesis(text);
        }
        if let Some(value) = nodes {
            content = content.with_nodes(value);
        }
        if let Some(value) = edges {
            content = content.with_edges(value);
        }

        Self::from_persisted(PersistedTrailData {
            id: TrailId::from_uuid(id),
            created_at,
            content,
        })
    }
}

/// Insert model for trail records.
///
/// `id` and `created_at` are omitted so the column defaults apply.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = trails)]
pub struct NewTrailRow {
    /// Query that produced the trail.
    pub query: String,
    /// Optional synthesis text.
    pub synthesis: Option<String>,
    /// Optional graph nodes payload.
    pub nodes: Option<Value>,
    /// Optional graph edges payload.
    pub edges: Option<Value>,
}

impl From<&TrailContent> for NewTrailRow {
    fn from(content: &TrailContent) -> Self {
        Self {
            query: content.query().to_owned(),
            synthesis: content.synthesis().map(str::to_owned),
            nodes: content.nodes().map(payload_value),
            edges: content.edges().map(payload_value),
        }
    }
}

/// Changeset for partial trail updates. Unset fields are skipped.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = trails)]
pub struct TrailChangeset {
    /// New synthesis text.
    pub synthesis: Option<String>,
    /// New graph nodes payload.
    pub nodes: Option<Value>,
    /// New graph edges payload.
    pub edges: Option<Value>,
}

impl From<&TrailPatch> for TrailChangeset {
    fn from(patch: &TrailPatch) -> Self {
        Self {
            synthesis: patch.synthesis().map(str::to_owned),
            nodes: patch.nodes().map(payload_value),
            edges: patch.edges().map(payload_value),
        }
    }
}

fn payload_value(payload: &GraphPayload) -> Value {
    payload.as_value().clone()
}
