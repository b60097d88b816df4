//! Book use-case service.
//!
//! # Responsibility
//! - Serve the two book surfaces: the catalog API and the bookshelf form.
//! - Resolve the submitted author reference before writing.
//!
//! # Invariants
//! - The catalog API uses the owner strategy (books have no owner) and
//!   rejects publication years in the future.
//! - The bookshelf uses capability flags and the bounded year range.

use crate::auth::{CapabilityPolicy, OwnershipPolicy};
use crate::model::catalog::{AuthorId, Book, BookId};
use crate::model::user::Actor;
use crate::repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
use crate::repo::book_repo::{BookFields, BookListQuery, BookRepository, SqliteBookRepository};
use crate::repo::{RepoError, RepoResult};
use crate::service::gateway::{Gateway, GatewayResult, Ownership};
use crate::validation::{AuthorRef, BookDraft, BookValidator, RawFields};
use rusqlite::Connection;

/// Result cap applied to bookshelf searches without an explicit limit.
pub const BOOKSHELF_SEARCH_LIMIT: u32 = 100;

/// Entry point a book request came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSurface {
    CatalogApi,
    Bookshelf,
}

impl BookSurface {
    fn gateway(self) -> Gateway {
        match self {
            Self::CatalogApi => Gateway::new("book", OwnershipPolicy),
            Self::Bookshelf => Gateway::new("book", CapabilityPolicy),
        }
    }

    fn validator(self) -> BookValidator {
        match self {
            Self::CatalogApi => BookValidator::catalog_api(),
            Self::Bookshelf => BookValidator::bookshelf_form(),
        }
    }
}

pub struct BookService<B: BookRepository, A: AuthorRepository> {
    gateway: Gateway,
    validator: BookValidator,
    surface: BookSurface,
    books: B,
    authors: A,
}

impl<'conn> BookService<SqliteBookRepository<'conn>, SqliteAuthorRepository<'conn>> {
    pub fn sqlite(conn: &'conn Connection, surface: BookSurface) -> Self {
        Self::new(
            SqliteBookRepository::new(conn),
            SqliteAuthorRepository::new(conn),
            surface,
        )
    }
}

impl<B: BookRepository, A: AuthorRepository> BookService<B, A> {
    pub fn new(books: B, authors: A, surface: BookSurface) -> Self {
        Self::with_validator(books, authors, surface, surface.validator())
    }

    /// Creates a service with an explicit validator, e.g. a fixed year.
    pub fn with_validator(books: B, authors: A, surface: BookSurface, validator: BookValidator) -> Self {
        Self {
            gateway: surface.gateway(),
            validator,
            surface,
            books,
            authors,
        }
    }

    pub fn surface(&self) -> BookSurface {
        self.surface
    }

    pub fn list_books(&self, actor: &Actor, query: &BookListQuery) -> GatewayResult<Vec<Book>> {
        let mut query = query.clone();
        if self.surface == BookSurface::Bookshelf && query.search.is_some() && query.limit.is_none() {
            query.limit = Some(BOOKSHELF_SEARCH_LIMIT);
        }
        self.gateway.list(actor, || self.books.list_books(&query))
    }

    pub fn get_book(&self, actor: &Actor, id: BookId) -> GatewayResult<Book> {
        self.gateway.view(actor, || self.books.get_book(id))
    }

    pub fn create_book(&self, actor: &Actor, fields: &RawFields) -> GatewayResult<Book> {
        self.gateway.create(actor, &self.validator, fields, |draft| {
            let fields = self.resolve(draft)?;
            Ok(self.books.create_book(&fields)?)
        })
    }

    pub fn update_book(&self, actor: &Actor, id: BookId, fields: &RawFields) -> GatewayResult<Book> {
        self.gateway.update(
            actor,
            id,
            || self.stored(id),
            &self.validator,
            fields,
            |draft| {
                let fields = self.resolve(draft)?;
                Ok(self.books.update_book(id, &fields)?)
            },
        )
    }

    pub fn delete_book(&self, actor: &Actor, id: BookId) -> GatewayResult<()> {
        self.gateway
            .delete(actor, id, || self.stored(id), || self.books.delete_book(id))
    }

    fn stored(&self, id: BookId) -> RepoResult<Option<Ownership>> {
        Ok(self.books.get_book(id)?.map(|_| Ownership::Unowned))
    }

    fn resolve(&self, draft: BookDraft) -> RepoResult<BookFields> {
        let author_id = self.resolve_author(draft.author)?;
        Ok(BookFields {
            title: draft.title,
            author_id,
            publication_year: draft.publication_year,
        })
    }

    /// Ids must exist; names are looked up and created when unknown.
    fn resolve_author(&self, author: AuthorRef) -> RepoResult<AuthorId> {
        match author {
            AuthorRef::Id(id) => match self.authors.get_author(id)? {
                Some(author) => Ok(author.id),
                None => Err(RepoError::InvalidReference { field: "author", id }),
            },
            AuthorRef::Name(name) => match self.authors.find_author_by_name(&name)? {
                Some(author) => Ok(author.id),
                None => Ok(self.authors.create_author(&name)?.id),
            },
        }
    }
}
