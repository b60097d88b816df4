//! Book validation for the bookshelf form and the catalog API.
//!
//! The two surfaces disagree on the year rule: the bookshelf form only
//! bounds the year to `[1000, 2100]`, the catalog API additionally refuses
//! years after the current one. [`YearPolicy`] selects the rule.

use crate::model::catalog::AuthorId;
use crate::validation::{char_len, current_year, required, FieldErrors, RawFields, Validator};
use uuid::Uuid;

pub const TITLE_MAX_CHARS: usize = 200;
pub const AUTHOR_NAME_MAX_CHARS: usize = 100;
pub const MIN_PUBLICATION_YEAR: i32 = 1000;
pub const MAX_PUBLICATION_YEAR: i32 = 2100;

/// Publication year rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearPolicy {
    /// `[1000, 2100]` only.
    Bounded,
    /// `[1000, 2100]` and not after the current year.
    NotInFuture,
}

/// How the submitted `author` field refers to an author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorRef {
    /// Existing author by id; existence is checked on write.
    Id(AuthorId),
    /// Author by display name; resolved or created on write.
    Name(String),
}

/// Sanitized book input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: AuthorRef,
    pub publication_year: i32,
}

/// Book validator bound to one [`YearPolicy`] and a fixed current year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookValidator {
    policy: YearPolicy,
    current_year: i32,
}

impl BookValidator {
    pub fn new(policy: YearPolicy, current_year: i32) -> Self {
        Self {
            policy,
            current_year,
        }
    }

    /// Validator used by the catalog API surface.
    pub fn catalog_api() -> Self {
        Self::new(YearPolicy::NotInFuture, current_year())
    }

    /// Validator used by the bookshelf form surface.
    pub fn bookshelf_form() -> Self {
        Self::new(YearPolicy::Bounded, current_year())
    }

    pub fn policy(&self) -> YearPolicy {
        self.policy
    }

    fn check_year(&self, year: i32, errors: &mut FieldErrors) {
        if !(MIN_PUBLICATION_YEAR..=MAX_PUBLICATION_YEAR).contains(&year) {
            errors.add("publication_year", "Please enter a valid publication year.");
            return;
        }
        if self.policy == YearPolicy::NotInFuture && year > self.current_year {
            errors.add(
                "publication_year",
                "Publication year cannot be in the future.",
            );
        }
    }
}

impl Validator for BookValidator {
    type Output = BookDraft;

    fn validate(&self, fields: &RawFields) -> Result<BookDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = required(fields, "title", &mut errors).and_then(|title| {
            if title.is_empty() {
                errors.add("title", "Title cannot be empty.");
                None
            } else if char_len(title) > TITLE_MAX_CHARS {
                errors.add("title", "Title is too long (max 200 characters).");
                None
            } else {
                Some(title.to_string())
            }
        });

        let author = required(fields, "author", &mut errors).and_then(|author| {
            if let Ok(id) = Uuid::parse_str(author) {
                return Some(AuthorRef::Id(id));
            }
            if author.is_empty() {
                errors.add("author", "Author name cannot be empty.");
                None
            } else if char_len(author) > AUTHOR_NAME_MAX_CHARS {
                errors.add("author", "Author name is too long (max 100 characters).");
                None
            } else {
                Some(AuthorRef::Name(author.to_string()))
            }
        });

        let publication_year =
            required(fields, "publication_year", &mut errors).and_then(|raw| {
                match raw.parse::<i32>() {
                    Ok(year) => {
                        self.check_year(year, &mut errors);
                        Some(year)
                    }
                    Err(_) => {
                        errors.add("publication_year", "Enter a whole number.");
                        None
                    }
                }
            });

        match (title, author, publication_year) {
            (Some(title), Some(author), Some(publication_year)) if errors.is_empty() => {
                Ok(BookDraft {
                    title,
                    author,
                    publication_year,
                })
            }
            _ => Err(errors),
        }
    }
}
