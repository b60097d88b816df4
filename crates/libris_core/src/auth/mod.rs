//! Authorization strategies.
//!
//! # Responsibility
//! - Decide whether a caller may perform an action on a resource.
//! - Offer two independent strategies selected per resource type:
//!   owner-based ([`OwnershipPolicy`]) and capability-flag-based
//!   ([`CapabilityPolicy`]).
//!
//! # Invariants
//! - Decisions are pure functions of actor, action and existing owner.
//! - Anonymous callers may only view.

pub mod capability;
pub mod ownership;

use crate::model::user::{Actor, UserId};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use capability::{parse_capability, Capability, CapabilityError, CapabilityPolicy};
pub use ownership::OwnershipPolicy;

/// Operation a caller attempts on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Whether the action leaves the store unchanged.
    pub fn is_read_only(self) -> bool {
        matches!(self, Self::View)
    }
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NotAuthenticated,
    NotOwner,
    MissingCapability(Capability),
}

impl Display for DenyReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "Authentication credentials were not provided."),
            Self::NotOwner => write!(f, "You do not have permission to perform this action."),
            Self::MissingCapability(capability) => write!(
                f,
                "You do not have permission to perform this action ({} required).",
                capability.as_str()
            ),
        }
    }
}

impl Error for DenyReason {}

/// Authorization outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Converts the decision into a `Result` for `?` propagation.
    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(reason),
        }
    }
}

/// Authorization strategy contract.
///
/// `owner` is the owner of the record as currently stored, never a value
/// taken from the request payload. `None` means the resource has no owner
/// concept (or, for `Create`/`View`, that no record exists yet).
pub trait AuthorizationPolicy {
    /// Stable strategy name used in log events.
    fn name(&self) -> &'static str;

    fn authorize(&self, actor: &Actor, action: Action, owner: Option<UserId>) -> Decision;
}
