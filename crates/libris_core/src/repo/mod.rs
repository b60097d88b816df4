//! Repository layer: one explicit repository per entity over SQLite.
//!
//! # Responsibility
//! - Provide `find`/`create`/`update`/`delete` contracts per entity.
//! - Keep SQL inside the persistence boundary.
//! - Implement cascade deletes explicitly inside one transaction.
//!
//! # Invariants
//! - Missed lookups on write paths return [`RepoError::NotFound`]; read
//!   paths return `Ok(None)`.
//! - Uniqueness hits on likes/follows are reported as "already exists"
//!   outcomes, not errors.
//! - Read paths reject malformed persisted ids instead of masking them.

pub mod author_repo;
pub mod book_repo;
pub mod comment_repo;
pub mod follow_repo;
pub mod library_repo;
pub mod like_repo;
pub mod notification_repo;
pub mod post_repo;
pub mod user_repo;

use crate::db::DbError;
use rusqlite::Row;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Target row of an update/delete does not exist.
    NotFound { entity: &'static str, id: Uuid },
    /// A submitted reference points at a missing row.
    InvalidReference { field: &'static str, id: Uuid },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidReference { field, id } => {
                write!(f, "`{field}` references a missing row: {id}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn new_id() -> Uuid {
    Uuid::new_v4()
}

/// Reads a UUID text column, rejecting malformed values.
pub(crate) fn uuid_column(row: &Row<'_>, column: &str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{text}` in {column}")))
}

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` substring pattern.
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
