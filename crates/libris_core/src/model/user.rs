//! Caller identity as seen by the core.
//!
//! Authentication happens outside this crate. The core only consumes the
//! user id, whether the caller is authenticated, and the capability flags
//! granted to that user.

use crate::auth::capability::Capability;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Stable identifier of an externally managed user.
pub type UserId = Uuid;

/// Stored user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

/// Authenticated caller with its granted capability flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: UserId,
    pub username: String,
    pub capabilities: BTreeSet<Capability>,
}

impl Principal {
    /// Creates a principal without any capability flag.
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            capabilities: BTreeSet::new(),
        }
    }

    /// Returns a copy of this principal holding `capabilities` in addition.
    pub fn with_capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities.extend(capabilities);
        self
    }
}

/// Identity of the caller of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    Authenticated(Principal),
}

impl Actor {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Returns the caller's user id, `None` for anonymous callers.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(principal) => Some(principal.id),
        }
    }

    /// Anonymous callers hold no capability.
    pub fn has_capability(&self, capability: Capability) -> bool {
        match self {
            Self::Anonymous => false,
            Self::Authenticated(principal) => principal.capabilities.contains(&capability),
        }
    }

    /// Whether the caller is the user referenced by a record's owner field.
    pub fn is_owner_of(&self, owner: UserId) -> bool {
        self.user_id() == Some(owner)
    }
}

impl From<Principal> for Actor {
    fn from(value: Principal) -> Self {
        Self::Authenticated(value)
    }
}
