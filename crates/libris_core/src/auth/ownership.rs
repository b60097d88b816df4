//! Owner-based authorization.
//!
//! | Action    | Anonymous | Authenticated non-owner     | Owner |
//! |-----------|-----------|-----------------------------|-------|
//! | view/list | allow     | allow                       | allow |
//! | create    | deny      | allow                       | allow |
//! | update    | deny      | deny (allow if no owner)    | allow |
//! | delete    | deny      | deny (allow if no owner)    | allow |

use crate::auth::{Action, AuthorizationPolicy, Decision, DenyReason};
use crate::model::user::{Actor, UserId};

/// Read for everyone, write for authenticated callers, edit for owners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnershipPolicy;

impl AuthorizationPolicy for OwnershipPolicy {
    fn name(&self) -> &'static str {
        "ownership"
    }

    fn authorize(&self, actor: &Actor, action: Action, owner: Option<UserId>) -> Decision {
        if action.is_read_only() {
            return Decision::Allow;
        }
        if !actor.is_authenticated() {
            return Decision::Deny(DenyReason::NotAuthenticated);
        }

        match (action, owner) {
            (Action::Create, _) => Decision::Allow,
            (Action::Update | Action::Delete, None) => Decision::Allow,
            (Action::Update | Action::Delete, Some(owner)) if actor.is_owner_of(owner) => {
                Decision::Allow
            }
            _ => Decision::Deny(DenyReason::NotOwner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OwnershipPolicy;
    use crate::auth::{Action, AuthorizationPolicy, Decision, DenyReason};
    use crate::model::user::{Actor, Principal};
    use uuid::Uuid;

    fn signed_in() -> (Actor, Uuid) {
        let id = Uuid::new_v4();
        (Actor::from(Principal::new(id, "reader")), id)
    }

    #[test]
    fn anonymous_can_only_view() {
        let policy = OwnershipPolicy;
        let owner = Some(Uuid::new_v4());
        assert_eq!(
            policy.authorize(&Actor::Anonymous, Action::View, owner),
            Decision::Allow
        );
        for action in [Action::Create, Action::Update, Action::Delete] {
            assert_eq!(
                policy.authorize(&Actor::Anonymous, action, owner),
                Decision::Deny(DenyReason::NotAuthenticated)
            );
        }
    }

    #[test]
    fn non_owner_cannot_update_or_delete_owned_record() {
        let (actor, _) = signed_in();
        let owner = Some(Uuid::new_v4());
        let policy = OwnershipPolicy;

        assert!(policy.authorize(&actor, Action::Create, None).is_allowed());
        assert_eq!(
            policy.authorize(&actor, Action::Update, owner),
            Decision::Deny(DenyReason::NotOwner)
        );
        assert_eq!(
            policy.authorize(&actor, Action::Delete, owner),
            Decision::Deny(DenyReason::NotOwner)
        );
    }

    #[test]
    fn owner_can_update_and_delete() {
        let (actor, id) = signed_in();
        let policy = OwnershipPolicy;
        assert!(policy.authorize(&actor, Action::Update, Some(id)).is_allowed());
        assert!(policy.authorize(&actor, Action::Delete, Some(id)).is_allowed());
    }

    #[test]
    fn ownerless_resource_is_editable_by_any_authenticated_caller() {
        let (actor, _) = signed_in();
        let policy = OwnershipPolicy;
        assert!(policy.authorize(&actor, Action::Update, None).is_allowed());
        assert!(policy.authorize(&actor, Action::Delete, None).is_allowed());
    }
}
