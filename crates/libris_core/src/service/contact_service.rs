//! Contact form submission.
//!
//! Submissions are validated and acknowledged; nothing is persisted.

use crate::auth::OwnershipPolicy;
use crate::model::user::Actor;
use crate::service::gateway::{Gateway, GatewayResult};
use crate::validation::{ContactMessage, ContactValidator, RawFields};
use log::info;

pub const CONTACT_SUCCESS_MESSAGE: &str = "Form submitted successfully!";

pub struct ContactService {
    gateway: Gateway,
}

impl Default for ContactService {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactService {
    pub fn new() -> Self {
        Self {
            gateway: Gateway::new("contact", OwnershipPolicy),
        }
    }

    /// Requires an authenticated caller.
    pub fn submit(&self, actor: &Actor, fields: &RawFields) -> GatewayResult<ContactMessage> {
        self.gateway
            .create(actor, &ContactValidator, fields, |message| {
                info!(
                    "event=contact_submit module=contact_service status=ok message_chars={}",
                    message.message.chars().count()
                );
                Ok(message)
            })
    }
}
