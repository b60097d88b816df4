//! Post, comment and plain-name validation.

use crate::validation::{char_len, required, FieldErrors, RawFields, Validator};
use std::collections::BTreeSet;

pub const POST_TITLE_MAX_CHARS: usize = 200;
pub const COMMENT_MAX_CHARS: usize = 1000;
pub const TAG_MAX_CHARS: usize = 50;

/// Sanitized post input. The owner is always the caller, never the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    /// Lowercase, deduplicated, sorted.
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostValidator;

impl Validator for PostValidator {
    type Output = PostDraft;

    fn validate(&self, fields: &RawFields) -> Result<PostDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = required(fields, "title", &mut errors).and_then(|title| {
            if title.is_empty() {
                errors.add("title", "This field may not be blank.");
                None
            } else if char_len(title) > POST_TITLE_MAX_CHARS {
                errors.add("title", "Ensure this field has no more than 200 characters.");
                None
            } else {
                Some(title.to_string())
            }
        });

        let content = required(fields, "content", &mut errors).and_then(|content| {
            if content.is_empty() {
                errors.add("content", "This field may not be blank.");
                None
            } else {
                Some(content.to_string())
            }
        });

        let raw_tags = fields
            .get("tags")
            .map(|value| value.split(',').map(str::to_string).collect::<Vec<_>>())
            .unwrap_or_default();
        let tags = normalize_tags(&raw_tags);
        if tags.iter().any(|tag| char_len(tag) > TAG_MAX_CHARS) {
            errors.add("tags", "Ensure each tag has at most 50 characters.");
        }

        match (title, content) {
            (Some(title), Some(content)) if errors.is_empty() => Ok(PostDraft {
                title,
                content,
                tags,
            }),
            _ => Err(errors),
        }
    }
}

/// Validates comment bodies; yields the trimmed content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentValidator;

impl Validator for CommentValidator {
    type Output = String;

    fn validate(&self, fields: &RawFields) -> Result<String, FieldErrors> {
        let mut errors = FieldErrors::new();
        let content = required(fields, "content", &mut errors).and_then(|content| {
            if content.is_empty() {
                errors.add("content", "This field may not be blank.");
                None
            } else if char_len(content) > COMMENT_MAX_CHARS {
                errors.add("content", "Ensure this field has no more than 1000 characters.");
                None
            } else {
                Some(content.to_string())
            }
        });
        content.ok_or(errors)
    }
}

/// Validates a single `name` field (authors, libraries, librarians).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameValidator {
    max_chars: usize,
}

impl NameValidator {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

impl Default for NameValidator {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Validator for NameValidator {
    type Output = String;

    fn validate(&self, fields: &RawFields) -> Result<String, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required(fields, "name", &mut errors).and_then(|name| {
            if name.is_empty() {
                errors.add("name", "This field may not be blank.");
                None
            } else if char_len(name) > self.max_chars {
                errors.add(
                    "name",
                    format!(
                        "Ensure this field has no more than {} characters.",
                        self.max_chars
                    ),
                );
                None
            } else {
                Some(name.to_string())
            }
        });
        name.ok_or(errors)
    }
}

/// Normalizes one tag: trimmed, lowercase, `None` when blank.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes, deduplicates and sorts tag values.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .filter_map(|tag| normalize_tag(tag))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
