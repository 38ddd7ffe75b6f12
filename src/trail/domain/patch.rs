//! Partial updates for stored trails.

use super::GraphPayload;
use serde::{Deserialize, Serialize};

/// Partial update for the mutable fields of a trail.
///
/// Each field that is set overwrites the stored value; unset fields are left
/// as they are. The query and creation time are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailPatch {
    synthesis: Option<String>,
    nodes: Option<GraphPayload>,
    edges: Option<GraphPayload>,
}

impl TrailPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
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

    /// Returns the synthesis to write, if any.
    #[must_use]
    pub fn synthesis(&self) -> Option<&str> {
        self.synthesis.as_deref()
    }

    /// Returns the nodes payload to write, if any.
    #[must_use]
    pub const fn nodes(&self) -> Option<&GraphPayload> {
        self.nodes.as_ref()
    }

    /// Returns the edges payload to write, if any.
    #[must_use]
    pub const fn edges(&self) -> Option<&GraphPayload> {
        self.edges.as_ref()
    }

    /// Returns `true` when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.synthesis.is_none() && self.nodes.is_none() && self.edges.is_none()
    }
}
