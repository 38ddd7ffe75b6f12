//! Domain model for trails.
//!
//! A trail is created from a query, stamped by the store with an identifier
//! and creation time, and later enriched with a synthesis and a graph. All
//! infrastructure concerns are kept outside the domain boundary.

mod content;
mod graph;
mod ids;
mod patch;
mod trail;

pub use content::TrailContent;
pub use graph::GraphPayload;
pub use ids::TrailId;
pub use patch::TrailPatch;
pub use trail::{PersistedTrailData, Trail};
