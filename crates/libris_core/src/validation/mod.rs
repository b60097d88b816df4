//! Form/serializer-style input validation.
//!
//! # Responsibility
//! - Turn raw string fields into sanitized drafts for the repositories.
//! - Report every failing field at once as [`FieldErrors`].
//!
//! # Invariants
//! - Validators never panic and never touch storage.
//! - The only ambient input is the current year, injected at construction.

pub mod book;
pub mod contact;
pub mod post;

use chrono::Datelike;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use book::{AuthorRef, BookDraft, BookValidator, YearPolicy};
pub use contact::{ContactMessage, ContactValidator};
pub use post::{normalize_tag, normalize_tags, CommentValidator, NameValidator, PostDraft, PostValidator};

/// Raw submitted fields keyed by field name.
pub type RawFields = BTreeMap<String, String>;

pub(crate) const REQUIRED_MESSAGE: &str = "This field is required.";

/// Field name → human-readable messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an error set holding one message.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded for `field`, empty when the field is valid.
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns `value` when no error was recorded.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let fields = self.fields().collect::<Vec<_>>().join(", ");
        write!(f, "invalid fields: {fields}")
    }
}

impl Error for FieldErrors {}

/// Validation strategy over raw fields.
pub trait Validator {
    type Output;

    fn validate(&self, fields: &RawFields) -> Result<Self::Output, FieldErrors>;
}

/// Current calendar year in local time.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Flattens a JSON object body into raw string fields.
///
/// Strings are kept verbatim, numbers and booleans use their JSON text,
/// arrays of scalars are comma-joined and `null` is treated as absent.
/// Non-object bodies produce no fields.
pub fn raw_fields_from_json(body: &Value) -> RawFields {
    let Some(object) = body.as_object() else {
        return RawFields::new();
    };

    object
        .iter()
        .filter_map(|(key, value)| scalar_text(value).map(|text| (key.clone(), text)))
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => None,
    }
}

/// Returns the trimmed value of a required field, recording an error when
/// the field is missing.
pub(crate) fn required<'a>(
    fields: &'a RawFields,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<&'a str> {
    match fields.get(field) {
        Some(value) => Some(value.trim()),
        None => {
            errors.add(field, REQUIRED_MESSAGE);
            None
        }
    }
}

pub(crate) fn char_len(value: &str) -> usize {
    value.chars().count()
}
