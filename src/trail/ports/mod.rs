//! Port contracts for trail persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by trail services.

pub mod repository;

pub use repository::{TrailRepository, TrailRepositoryError, TrailRepositoryResult};
