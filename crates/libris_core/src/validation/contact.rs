//! Contact form validation.

use crate::validation::{char_len, required, FieldErrors, RawFields, Validator};
use once_cell::sync::Lazy;
use regex::Regex;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z\s\-']+$").expect("valid contact name regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("valid email regex")
});

const NAME_MAX_CHARS: usize = 100;
const MESSAGE_MIN_CHARS: usize = 10;
const MESSAGE_MAX_CHARS: usize = 1000;

/// Sanitized contact submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactValidator;

impl Validator for ContactValidator {
    type Output = ContactMessage;

    fn validate(&self, fields: &RawFields) -> Result<ContactMessage, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = required(fields, "name", &mut errors).and_then(|name| {
            if name.is_empty() {
                errors.add("name", "This field is required.");
                None
            } else if char_len(name) > NAME_MAX_CHARS {
                errors.add("name", "Ensure this value has at most 100 characters.");
                None
            } else if !NAME_RE.is_match(name) {
                errors.add(
                    "name",
                    "Name can only contain letters, spaces, hyphens, and apostrophes.",
                );
                None
            } else {
                Some(name.to_string())
            }
        });

        let email = required(fields, "email", &mut errors).and_then(|email| {
            if EMAIL_RE.is_match(email) {
                Some(email.to_string())
            } else {
                errors.add("email", "Enter a valid email address.");
                None
            }
        });

        let message = required(fields, "message", &mut errors).and_then(|message| {
            let len = char_len(message);
            if len < MESSAGE_MIN_CHARS {
                errors.add("message", "Message must be at least 10 characters long.");
                None
            } else if len > MESSAGE_MAX_CHARS {
                errors.add("message", "Ensure this value has at most 1000 characters.");
                None
            } else {
                Some(message.to_string())
            }
        });

        match (name, email, message) {
            (Some(name), Some(email), Some(message)) => Ok(ContactMessage {
                name,
                email,
                message,
            }),
            _ => Err(errors),
        }
    }
}
