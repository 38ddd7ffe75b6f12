//! Trail persistence for Trails.
//!
//! A trail records one explored query together with an optional synthesis
//! and the graph (nodes and edges) produced while exploring it. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Access policy seam in [`access`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod access;
pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
