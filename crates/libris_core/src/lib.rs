//! Core of the libris backends: validation, authorization, persistence and
//! the mutation gateway that ties them together.
//! This crate is the single source of truth for business invariants.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use api::ApiResponse;
pub use auth::{Action, AuthorizationPolicy, Capability, CapabilityPolicy, Decision, DenyReason, OwnershipPolicy};
pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::user::{Actor, Principal, User, UserId};
pub use repo::{RepoError, RepoResult};
pub use service::gateway::{Gateway, GatewayError, GatewayResult};
pub use validation::{FieldErrors, RawFields, Validator};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
