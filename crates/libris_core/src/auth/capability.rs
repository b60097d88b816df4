//! Capability-flag authorization.
//!
//! Capabilities are named grants (`can_view`, `can_create`, `can_edit`,
//! `can_delete`) held by a user independent of record ownership.

use crate::auth::{Action, AuthorizationPolicy, Decision, DenyReason};
use crate::model::user::{Actor, UserId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Named permission flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    View,
    Create,
    Edit,
    Delete,
}

/// Stored string value for the view capability.
pub const CAPABILITY_VIEW: &str = "can_view";
/// Stored string value for the create capability.
pub const CAPABILITY_CREATE: &str = "can_create";
/// Stored string value for the edit capability.
pub const CAPABILITY_EDIT: &str = "can_edit";
/// Stored string value for the delete capability.
pub const CAPABILITY_DELETE: &str = "can_delete";

impl Capability {
    pub const ALL: [Capability; 4] = [Self::View, Self::Create, Self::Edit, Self::Delete];

    /// Stable string id used in storage and messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => CAPABILITY_VIEW,
            Self::Create => CAPABILITY_CREATE,
            Self::Edit => CAPABILITY_EDIT,
            Self::Delete => CAPABILITY_DELETE,
        }
    }

    /// Capability required to perform `action`.
    pub fn for_action(action: Action) -> Self {
        match action {
            Action::View => Self::View,
            Action::Create => Self::Create,
            Action::Update => Self::Edit,
            Action::Delete => Self::Delete,
        }
    }
}

/// Parses one capability from its stored string value.
pub fn parse_capability(value: &str) -> Result<Capability, CapabilityError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(CapabilityError::EmptyCapability);
    }

    match normalized {
        CAPABILITY_VIEW => Ok(Capability::View),
        CAPABILITY_CREATE => Ok(Capability::Create),
        CAPABILITY_EDIT => Ok(Capability::Edit),
        CAPABILITY_DELETE => Ok(Capability::Delete),
        other => Err(CapabilityError::UnsupportedCapability(other.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    EmptyCapability,
    UnsupportedCapability(String),
}

impl Display for CapabilityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCapability => write!(f, "capability value must not be empty"),
            Self::UnsupportedCapability(value) => write!(f, "capability is unsupported: {value}"),
        }
    }
}

impl Error for CapabilityError {}

/// Requires the capability matching the action; ownership is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityPolicy;

impl AuthorizationPolicy for CapabilityPolicy {
    fn name(&self) -> &'static str {
        "capability"
    }

    fn authorize(&self, actor: &Actor, action: Action, _owner: Option<UserId>) -> Decision {
        let required = Capability::for_action(action);
        if actor.has_capability(required) {
            Decision::Allow
        } else {
            Decision::Deny(DenyReason::MissingCapability(required))
        }
    }
}
