//! Access control for trails.
//!
//! [`TrailAccessPolicy`] mirrors the row-level-security policy installed on
//! the `trails` table: `can_read` plays the part of the `USING` predicate and
//! `can_write` the `WITH CHECK` predicate. Services consult the policy before
//! touching a repository, so in-memory and `PostgreSQL` stores see the same
//! rules.

mod caller;
mod policy;

pub use caller::{Caller, PrincipalId};
pub use policy::{AllowAllTrails, TrailAccessPolicy, TrailOperation};
