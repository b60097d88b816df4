//! Core use-case services.
//!
//! # Responsibility
//! - Instantiate the mutation gateway per resource type.
//! - Orchestrate repository calls and side effects into use-case APIs.
//!
//! Each service is generic over its repository traits; `sqlite(conn)`
//! builds the connection-backed variant.

pub mod author_service;
pub mod book_service;
pub mod comment_service;
pub mod contact_service;
pub mod follow_service;
pub mod gateway;
pub mod library_service;
pub mod like_service;
pub mod notification_service;
pub mod notify;
pub mod post_service;
