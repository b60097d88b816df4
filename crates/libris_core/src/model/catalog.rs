//! Catalog records: authors, books, libraries and librarians.
//!
//! # Invariants
//! - A book always references an existing author.
//! - A library has at most one librarian; the librarian lives and dies with
//!   its library.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type AuthorId = Uuid;
pub type BookId = Uuid;
pub type LibraryId = Uuid;
pub type LibrarianId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
}

/// Book read model joined with its author's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub publication_year: i32,
    /// Serialized as `author` to match the catalog API shape.
    #[serde(rename = "author")]
    pub author_id: AuthorId,
    pub author_name: String,
}

/// Author together with the books it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorWithBooks {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    pub id: LibraryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Librarian {
    pub id: LibrarianId,
    pub name: String,
    pub library_id: LibraryId,
}

/// Library detail projection: the library, its librarian and its books.
///
/// `books` carries no ordering guarantee beyond the store's title sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryDetail {
    #[serde(flatten)]
    pub library: Library,
    pub librarian: Option<Librarian>,
    pub books: Vec<Book>,
}
