//! Semi-structured graph payloads attached to trails.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema-less JSON payload holding the nodes or edges of a trail graph.
///
/// Any well-formed JSON value is accepted and handed back unchanged; the
/// payload imposes no shape of its own. Numbers keep their full precision,
/// including integers wider than 64 bits and exponents beyond `f64`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphPayload(Value);

impl GraphPayload {
    /// Wraps a JSON value.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the wrapped JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the payload and returns the JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for GraphPayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<GraphPayload> for Value {
    fn from(payload: GraphPayload) -> Self {
        payload.0
    }
}
