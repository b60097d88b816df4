//! HTTP-facing operations.
//!
//! # Responsibility
//! - Map gateway outcomes onto status codes and JSON bodies.
//! - Parse list query parameters.
//!
//! Routing and authentication live outside this crate: a router maps a verb
//! and path onto one function here and passes the authenticated [`Actor`].
//!
//! [`Actor`]: crate::model::user::Actor

pub mod catalog;
pub mod query;
pub mod social;

use crate::service::gateway::GatewayError;
use log::error;
use serde::Serialize;
use serde_json::{json, Value};

pub use query::{parse_book_list_query, parse_post_list_query, QueryParams};

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_NO_CONTENT: u16 = 204;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_FORBIDDEN: u16 = 403;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Status code plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Serializes `value` as the body of a success response.
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self::new(status, body),
            Err(err) => {
                error!("event=api_encode module=api status=error error={err}");
                Self::internal_error()
            }
        }
    }

    pub fn message(status: u16, message: &str) -> Self {
        Self::new(status, json!({ "message": message }))
    }

    pub fn no_content() -> Self {
        Self::new(STATUS_NO_CONTENT, Value::Null)
    }

    pub fn internal_error() -> Self {
        Self::new(
            STATUS_INTERNAL_ERROR,
            json!({ "detail": "A server error occurred." }),
        )
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<GatewayError> for ApiResponse {
    fn from(value: GatewayError) -> Self {
        match value {
            GatewayError::Validation(errors) => Self::json(STATUS_BAD_REQUEST, &errors),
            GatewayError::Forbidden(reason) => Self::new(
                STATUS_FORBIDDEN,
                json!({ "detail": reason.to_string() }),
            ),
            GatewayError::NotFound => {
                Self::new(STATUS_NOT_FOUND, json!({ "detail": "Not found." }))
            }
            GatewayError::Conflict(message) => Self::message(STATUS_BAD_REQUEST, &message),
            GatewayError::Storage(_) => Self::internal_error(),
        }
    }
}

/// Renders `result` with `status` on success and the error mapping otherwise.
pub(crate) fn respond<T: Serialize>(status: u16, result: Result<T, GatewayError>) -> ApiResponse {
    match result {
        Ok(value) => ApiResponse::json(status, &value),
        Err(err) => err.into(),
    }
}

pub(crate) fn respond_with(
    result: Result<(), GatewayError>,
    success: impl FnOnce() -> ApiResponse,
) -> ApiResponse {
    match result {
        Ok(()) => success(),
        Err(err) => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::ApiResponse;
    use crate::auth::DenyReason;
    use crate::repo::RepoError;
    use crate::service::gateway::GatewayError;
    use crate::validation::FieldErrors;
    use serde_json::json;

    #[test]
    fn validation_errors_render_field_map() {
        let response = ApiResponse::from(GatewayError::Validation(FieldErrors::single(
            "publication_year",
            "Publication year cannot be in the future.",
        )));
        assert_eq!(response.status, 400);
        assert_eq!(
            response.body,
            json!({ "publication_year": ["Publication year cannot be in the future."] })
        );
    }

    #[test]
    fn forbidden_renders_detail() {
        let response = ApiResponse::from(GatewayError::Forbidden(DenyReason::NotAuthenticated));
        assert_eq!(response.status, 403);
        assert_eq!(
            response.body,
            json!({ "detail": "Authentication credentials were not provided." })
        );
    }

    #[test]
    fn not_found_is_uniform() {
        let response = ApiResponse::from(GatewayError::NotFound);
        assert_eq!(response.status, 404);
        assert_eq!(response.body, json!({ "detail": "Not found." }));
    }

    #[test]
    fn conflict_renders_message() {
        let response = ApiResponse::from(GatewayError::conflict("You have already liked this post"));
        assert_eq!(response.status, 400);
        assert_eq!(
            response.body,
            json!({ "message": "You have already liked this post" })
        );
    }

    #[test]
    fn storage_fault_hides_details() {
        let response = ApiResponse::from(GatewayError::Storage(RepoError::InvalidData(
            "bad uuid".to_string(),
        )));
        assert_eq!(response.status, 500);
        assert!(!response.body.to_string().contains("bad uuid"));
    }
}
