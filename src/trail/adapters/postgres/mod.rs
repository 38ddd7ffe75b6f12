//! `PostgreSQL` adapters for trail persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresTrailRepository, TrailPgPool};
