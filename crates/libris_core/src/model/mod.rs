//! Domain records for the catalog and social stores.
//!
//! # Responsibility
//! - Define the canonical shapes returned by repositories and services.
//! - Model the caller identity consumed by authorization.
//!
//! # Invariants
//! - Every record is identified by a stable UUID v4.
//! - Timestamps are Unix epoch milliseconds assigned by the store.

pub mod catalog;
pub mod social;
pub mod user;
