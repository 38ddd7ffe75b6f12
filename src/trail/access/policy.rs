//! Access policies for trail rows.

use super::Caller;
use crate::trail::domain::{Trail, TrailContent};
use std::fmt;

/// Operations a policy can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrailOperation {
    /// Reading a trail.
    Select,
    /// Creating a trail.
    Insert,
    /// Changing a stored trail.
    Update,
    /// Removing a stored trail.
    Delete,
}

impl TrailOperation {
    /// Returns the canonical lowercase operation name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for TrailOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row-level access rules for trails.
pub trait TrailAccessPolicy: Send + Sync {
    /// Human-readable policy name.
    fn name(&self) -> &str;

    /// Row visibility: whether `caller` may see `trail` at all.
    ///
    /// Hidden rows behave as if they did not exist.
    fn can_read(&self, caller: &Caller, trail: &Trail) -> bool;

    /// Write validation: whether `caller` may store a row holding `content`.
    fn can_write(&self, caller: &Caller, content: &TrailContent) -> bool;

    /// Returns `true` when the policy admits every caller for every
    /// operation.
    fn is_unrestricted(&self) -> bool {
        false
    }
}

/// Grants every caller every operation on every trail.
///
/// This matches the `"Allow all access to trails"` row-level-security policy
/// in the schema and shares its name. It is a placeholder: trails carry no
/// owner yet, so nothing narrower can be expressed. Once they do, replace it
/// with a policy that compares the caller with the owning principal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllowAllTrails;

impl AllowAllTrails {
    /// Name of the matching database policy.
    pub const NAME: &'static str = "Allow all access to trails";
}

impl TrailAccessPolicy for AllowAllTrails {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn can_read(&self, _caller: &Caller, _trail: &Trail) -> bool {
        true
    }

    fn can_write(&self, _caller: &Caller, _content: &TrailContent) -> bool {
        true
    }

    fn is_unrestricted(&self) -> bool {
        true
    }
}
