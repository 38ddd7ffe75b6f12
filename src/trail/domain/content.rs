//! Caller-writable trail content.

use super::{GraphPayload, TrailPatch};
use serde::{Deserialize, Serialize};

/// The part of a trail a caller supplies: the query and its optional
/// synthesis and graph.
///
/// The query is required. Everything else may be provided up front or set
/// later through a [`TrailPatch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailContent {
    query: String,
    synthesis: Option<String>,
    nodes: Option<GraphPayload>,
    edges: Option<GraphPayload>,
}

impl TrailContent {
    /// Creates content holding only a query.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            synthesis: None,
            nodes: None,
            edges: None,
        }
    }

    /// Sets the synthesis text.
    #[must_use]
    pub fn with_synthesis(mut self, synthesis: impl Into<String>) -> Self {
        self.synthesis = Some(synthesis.into());
        self
    }

    /// Sets the graph nodes payload.
    #[must_use]
    pub fn with_nodes(mut self, nodes: impl Into<GraphPayload>) -> Self {
        self.nodes = Some(nodes.into());
        self
    }

    /// Sets the graph edges payload.
    #[must_use]
    pub fn with_edges(mut self, edges: impl Into<GraphPayload>) -> Self {
        self.edges = Some(edges.into());
        self
    }

    /// Returns the query that produced the trail.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the synthesis text, if any.
    #[must_use]
    pub fn synthesis(&self) -> Option<&str> {
        self.synthesis.as_deref()
    }

    /// Returns the graph nodes payload, if any.
    #[must_use]
    pub const fn nodes(&self) -> Option<&GraphPayload> {
        self.nodes.as_ref()
    }

    /// Returns the graph edges payload, if any.
    #[must_use]
    pub const fn edges(&self) -> Option<&GraphPayload> {
        self.edges.as_ref()
    }

    /// Applies a partial update in place. The query is never touched.
    pub fn apply(&mut self, patch: &TrailPatch) {
        if let Some(synthesis) = patch.synthesis() {
            self.synthesis = Some(synthesis.to_owned());
        }
        if let Some(nodes) = patch.nodes() {
            self.nodes = Some(nodes.clone());
        }
        if let Some(edges) = patch.edges() {
            self.edges = Some(edges.clone());
        }
    }

    /// Returns a copy with `patch` applied.
    #[must_use]
    pub fn patched(&self, patch: &TrailPatch) -> Self {
        let mut next = self.clone();
        next.apply(patch);
        next
    }
}
