//! Application services for trail persistence.

mod trail;

pub use trail::{DEFAULT_RECENT_LIMIT, TrailService, TrailServiceError, TrailServiceResult};
