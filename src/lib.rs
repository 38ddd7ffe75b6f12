//! Trails: persistence for query exploration trails.
//!
//! A trail captures one query together with the synthesis and the graph
//! (nodes and edges) produced while exploring it. This crate provides the
//! `trails` table schema, a typed domain model, and repositories that store
//! trails in memory or in `PostgreSQL`.
//!
//! # Architecture
//!
//! Trails follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, memory)
//!
//! # Modules
//!
//! - [`trail`]: Trail domain, access policy, repositories, and service
//! - [`config`]: Layered configuration and connection pool construction
//!
//! # Access control
//!
//! The schema installs a single row-level-security policy,
//! `"Allow all access to trails"`, that grants every caller every operation.
//! [`trail::access::AllowAllTrails`] mirrors it in Rust. Both are
//! placeholders until trails carry an owner.

pub mod config;
pub mod trail;
