//! Resource mutation gateway.
//!
//! # Responsibility
//! - Run every read/write through one control flow:
//!   authorize → look up existing record → validate → execute.
//! - Translate repository outcomes into the caller-facing error taxonomy.
//!
//! # Invariants
//! - Authorization runs before any lookup or mutation; a denied request
//!   leaves the store untouched.
//! - Update/delete authorize against the owner of the stored record, never
//!   against anything in the payload.
//! - Missing records are reported as a bare [`GatewayError::NotFound`],
//!   whatever the cause.

use crate::auth::{Action, AuthorizationPolicy, DenyReason};
use crate::model::user::{Actor, UserId};
use crate::repo::user_repo::UserRepository;
use crate::repo::{RepoError, RepoResult};
use crate::validation::{FieldErrors, RawFields, Validator};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type GatewayResult<T> = Result<T, GatewayError>;

const INVALID_REFERENCE_MESSAGE: &str = "Invalid pk - object does not exist.";

/// Caller-facing outcome of a failed operation.
#[derive(Debug)]
pub enum GatewayError {
    /// Field-level input errors (400).
    Validation(FieldErrors),
    /// Authorization refused the request (403).
    Forbidden(DenyReason),
    /// Target record does not exist (404).
    NotFound,
    /// Request conflicts with current state, e.g. a duplicate like (400).
    Conflict(String),
    /// Store fault (500).
    Storage(RepoError),
}

impl GatewayError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "{errors}"),
            Self::Forbidden(reason) => write!(f, "{reason}"),
            Self::NotFound => write!(f, "Not found."),
            Self::Conflict(message) => write!(f, "{message}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Forbidden(reason) => Some(reason),
            Self::Storage(err) => Some(err),
            Self::NotFound | Self::Conflict(_) => None,
        }
    }
}

impl From<RepoError> for GatewayError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { .. } => Self::NotFound,
            RepoError::InvalidReference { field, .. } => {
                Self::Validation(FieldErrors::single(field, INVALID_REFERENCE_MESSAGE))
            }
            other => Self::Storage(other),
        }
    }
}

impl From<FieldErrors> for GatewayError {
    fn from(value: FieldErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<DenyReason> for GatewayError {
    fn from(value: DenyReason) -> Self {
        Self::Forbidden(value)
    }
}

/// Owner of a stored record as seen by authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The resource type has no owner concept.
    Unowned,
    OwnedBy(UserId),
}

impl Ownership {
    fn owner(self) -> Option<UserId> {
        match self {
            Self::Unowned => None,
            Self::OwnedBy(owner) => Some(owner),
        }
    }
}

/// Returns the authenticated caller's id or a forbidden error.
pub fn require_user(actor: &Actor) -> GatewayResult<UserId> {
    actor
        .user_id()
        .ok_or(GatewayError::Forbidden(DenyReason::NotAuthenticated))
}

/// Like [`require_user`], and mirrors the caller into the local user table
/// so rows it authors can reference it.
pub fn provision_user(users: &impl UserRepository, actor: &Actor) -> GatewayResult<UserId> {
    match actor {
        Actor::Anonymous => Err(GatewayError::Forbidden(DenyReason::NotAuthenticated)),
        Actor::Authenticated(principal) => {
            users.ensure_user(principal)?;
            Ok(principal.id)
        }
    }
}

/// Gateway for one resource type with its selected authorization strategy.
pub struct Gateway {
    resource: &'static str,
    policy: Box<dyn AuthorizationPolicy>,
}

impl Gateway {
    pub fn new(resource: &'static str, policy: impl AuthorizationPolicy + 'static) -> Self {
        Self {
            resource,
            policy: Box::new(policy),
        }
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Runs the authorization strategy, logging denials.
    pub fn authorize(
        &self,
        actor: &Actor,
        action: Action,
        owner: Option<UserId>,
    ) -> GatewayResult<()> {
        self.policy
            .authorize(actor, action, owner)
            .into_result()
            .map_err(|reason| {
                warn!(
                    "event=authorize module=gateway status=denied resource={} action={} policy={} authenticated={}",
                    self.resource,
                    action.as_str(),
                    self.policy.name(),
                    actor.is_authenticated()
                );
                GatewayError::Forbidden(reason)
            })
    }

    /// Authorized single-record read.
    pub fn view<T>(
        &self,
        actor: &Actor,
        load: impl FnOnce() -> RepoResult<Option<T>>,
    ) -> GatewayResult<T> {
        self.authorize(actor, Action::View, None)?;
        self.observe(Action::View, None, load().map_err(GatewayError::from))?
            .ok_or(GatewayError::NotFound)
    }

    /// Authorized list read.
    pub fn list<T>(
        &self,
        actor: &Actor,
        load: impl FnOnce() -> RepoResult<Vec<T>>,
    ) -> GatewayResult<Vec<T>> {
        self.authorize(actor, Action::View, None)?;
        self.observe(Action::View, None, load().map_err(GatewayError::from))
    }

    /// Authorize → validate → insert.
    pub fn create<V: Validator, T>(
        &self,
        actor: &Actor,
        validator: &V,
        fields: &RawFields,
        insert: impl FnOnce(V::Output) -> GatewayResult<T>,
    ) -> GatewayResult<T> {
        self.authorize(actor, Action::Create, None)?;
        let draft = validator.validate(fields)?;
        let result = insert(draft);
        self.log_outcome(Action::Create, None, &result);
        result
    }

    /// Authorize → look up stored owner → authorize against it → validate →
    /// apply.
    pub fn update<V: Validator, T>(
        &self,
        actor: &Actor,
        id: Uuid,
        ownership: impl FnOnce() -> RepoResult<Option<Ownership>>,
        validator: &V,
        fields: &RawFields,
        apply: impl FnOnce(V::Output) -> GatewayResult<T>,
    ) -> GatewayResult<T> {
        self.mutate(actor, Action::Update, id, ownership, || {
            let draft = validator.validate(fields)?;
            apply(draft)
        })
    }

    /// Authorize → look up stored owner → authorize against it → remove.
    pub fn delete(
        &self,
        actor: &Actor,
        id: Uuid,
        ownership: impl FnOnce() -> RepoResult<Option<Ownership>>,
        remove: impl FnOnce() -> RepoResult<()>,
    ) -> GatewayResult<()> {
        self.mutate(actor, Action::Delete, id, ownership, || {
            remove().map_err(GatewayError::from)
        })
    }

    /// Shared flow for operations on an existing record.
    ///
    /// The first authorization pass runs without an owner so that callers
    /// without standing are refused before the lookup can reveal whether
    /// the record exists.
    pub fn mutate<T>(
        &self,
        actor: &Actor,
        action: Action,
        id: Uuid,
        ownership: impl FnOnce() -> RepoResult<Option<Ownership>>,
        apply: impl FnOnce() -> GatewayResult<T>,
    ) -> GatewayResult<T> {
        self.authorize(actor, action, None)?;
        let stored = ownership()?.ok_or(GatewayError::NotFound)?;
        self.authorize(actor, action, stored.owner())?;
        let result = apply();
        self.log_outcome(action, Some(id), &result);
        result
    }

    fn observe<T>(
        &self,
        action: Action,
        id: Option<Uuid>,
        result: GatewayResult<T>,
    ) -> GatewayResult<T> {
        if let Err(GatewayError::Storage(err)) = &result {
            self.log_storage_error(action, id, err);
        }
        result
    }

    fn log_outcome<T>(&self, action: Action, id: Option<Uuid>, result: &GatewayResult<T>) {
        match result {
            Ok(_) => match id {
                Some(id) => info!(
                    "event=mutation module=gateway status=ok resource={} action={} id={id}",
                    self.resource,
                    action.as_str()
                ),
                None => info!(
                    "event=mutation module=gateway status=ok resource={} action={}",
                    self.resource,
                    action.as_str()
                ),
            },
            Err(GatewayError::Storage(err)) => self.log_storage_error(action, id, err),
            Err(_) => {}
        }
    }

    fn log_storage_error(&self, action: Action, id: Option<Uuid>, err: &RepoError) {
        let id = id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
        error!(
            "event=mutation module=gateway status=error resource={} action={} id={id} error={err}",
            self.resource,
            action.as_str()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{require_user, Gateway, GatewayError, Ownership};
    use crate::auth::{Action, CapabilityPolicy, DenyReason, OwnershipPolicy};
    use crate::model::user::{Actor, Principal};
    use crate::repo::RepoError;
    use crate::validation::{NameValidator, RawFields};
    use std::cell::Cell;
    use uuid::Uuid;

    fn member() -> (Actor, Uuid) {
        let id = Uuid::new_v4();
        (Actor::from(Principal::new(id, "member")), id)
    }

    fn named(name: &str) -> RawFields {
        RawFields::from([("name".to_string(), name.to_string())])
    }

    #[test]
    fn denied_create_never_reaches_insert() {
        let gateway = Gateway::new("thing", OwnershipPolicy);
        let called = Cell::new(false);
        let err = gateway
            .create(&Actor::Anonymous, &NameValidator::default(), &named("x"), |_| {
                called.set(true);
                Ok(())
            })
            .expect_err("anonymous create must fail");
        assert!(matches!(
            err,
            GatewayError::Forbidden(DenyReason::NotAuthenticated)
        ));
        assert!(!called.get());
    }

    #[test]
    fn invalid_input_is_reported_before_insert() {
        let gateway = Gateway::new("thing", OwnershipPolicy);
        let (actor, _) = member();
        let err = gateway
            .create(&actor, &NameValidator::default(), &named("  "), |_| {
                Ok::<_, GatewayError>(())
            })
            .expect_err("blank name must fail");
        assert!(matches!(err, GatewayError::Validation(errors) if errors.contains("name")));
    }

    #[test]
    fn anonymous_update_is_forbidden_before_lookup() {
        let gateway = Gateway::new("thing", OwnershipPolicy);
        let looked_up = Cell::new(false);
        let err = gateway
            .update(
                &Actor::Anonymous,
                Uuid::new_v4(),
                || {
                    looked_up.set(true);
                    Ok(None)
                },
                &NameValidator::default(),
                &named("x"),
                |_| Ok(()),
            )
            .expect_err("anonymous update must fail");
        assert!(matches!(err, GatewayError::Forbidden(_)));
        assert!(!looked_up.get());
    }

    #[test]
    fn missing_record_is_not_found() {
        let gateway = Gateway::new("thing", OwnershipPolicy);
        let (actor, _) = member();
        let err = gateway
            .delete(&actor, Uuid::new_v4(), || Ok(None), || Ok(()))
            .expect_err("missing record");
        assert!(matches!(err, GatewayError::NotFound));
    }

    #[test]
    fn stored_owner_decides_update() {
        let gateway = Gateway::new("thing", OwnershipPolicy);
        let (actor, id) = member();
        let other = Uuid::new_v4();

        let err = gateway
            .mutate(
                &actor,
                Action::Update,
                Uuid::new_v4(),
                || Ok(Some(Ownership::OwnedBy(other))),
                || Ok(()),
            )
            .expect_err("non-owner update");
        assert!(matches!(err, GatewayError::Forbidden(DenyReason::NotOwner)));

        gateway
            .mutate(
                &actor,
                Action::Update,
                Uuid::new_v4(),
                || Ok(Some(Ownership::OwnedBy(id))),
                || Ok(()),
            )
            .expect("owner update");
    }

    #[test]
    fn capability_gateway_requires_view_flag_for_reads() {
        let gateway = Gateway::new("library", CapabilityPolicy);
        let (actor, _) = member();
        let err = gateway
            .list(&actor, || Ok(Vec::<u8>::new()))
            .expect_err("view requires can_view");
        assert!(matches!(err, GatewayError::Forbidden(_)));
    }

    #[test]
    fn repository_errors_map_to_taxonomy() {
        let id = Uuid::new_v4();
        assert!(matches!(
            GatewayError::from(RepoError::NotFound { entity: "book", id }),
            GatewayError::NotFound
        ));
        match GatewayError::from(RepoError::InvalidReference { field: "author", id }) {
            GatewayError::Validation(errors) => assert_eq!(
                errors.messages("author"),
                ["Invalid pk - object does not exist."]
            ),
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            GatewayError::from(RepoError::InvalidData("bad".to_string())),
            GatewayError::Storage(_)
        ));
    }

    #[test]
    fn require_user_rejects_anonymous() {
        assert!(require_user(&Actor::Anonymous).is_err());
        let (actor, id) = member();
        assert_eq!(require_user(&actor).expect("signed in"), id);
    }
}
