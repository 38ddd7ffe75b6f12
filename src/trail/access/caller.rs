//! Callers on whose behalf trail operations run.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(Uuid);

impl PrincipalId {
    /// Creates a principal identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The party an operation runs for.
///
/// No credentials are verified here; the caller is carried through so that
/// policies and the database session can see who is asking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Caller {
    /// A caller with no identity.
    #[default]
    Anonymous,
    /// A caller identified by principal.
    Principal(PrincipalId),
}

impl Caller {
    /// Creates a principal caller from a UUID.
    #[must_use]
    pub const fn principal(id: Uuid) -> Self {
        Self::Principal(PrincipalId::from_uuid(id))
    }

    /// Returns the principal identifier, if the caller has one.
    #[must_use]
    pub const fn principal_id(&self) -> Option<PrincipalId> {
        match self {
            Self::Anonymous => None,
            Self::Principal(id) => Some(*id),
        }
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("anonymous"),
            Self::Principal(id) => write!(f, "principal:{id}"),
        }
    }
}
