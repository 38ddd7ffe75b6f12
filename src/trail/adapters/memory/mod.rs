//! In-memory adapters for trail persistence.

mod repository;

pub use repository::InMemoryTrailRepository;
