//! Library relationship service.
//!
//! # Responsibility
//! - Library CRUD, book membership and the one-per-library librarian.
//!
//! # Invariants
//! - Every operation is gated by capability flags; ownership plays no part.
//! - Membership and librarian changes count as edits of the library.

use crate::auth::{Action, CapabilityPolicy};
use crate::model::catalog::{BookId, Librarian, Library, LibraryDetail, LibraryId};
use crate::model::user::Actor;
use crate::repo::library_repo::{LibraryRepository, SqliteLibraryRepository};
use crate::repo::RepoResult;
use crate::service::gateway::{Gateway, GatewayError, GatewayResult, Ownership};
use crate::validation::{NameValidator, RawFields, Validator};
use rusqlite::Connection;

pub struct LibraryService<L: LibraryRepository> {
    gateway: Gateway,
    validator: NameValidator,
    libraries: L,
}

impl<'conn> LibraryService<SqliteLibraryRepository<'conn>> {
    pub fn sqlite(conn: &'conn Connection) -> Self {
        Self::new(SqliteLibraryRepository::new(conn))
    }
}

impl<L: LibraryRepository> LibraryService<L> {
    pub fn new(libraries: L) -> Self {
        Self {
            gateway: Gateway::new("library", CapabilityPolicy),
            validator: NameValidator::default(),
            libraries,
        }
    }

    pub fn list_libraries(&self, actor: &Actor) -> GatewayResult<Vec<Library>> {
        self.gateway.list(actor, || self.libraries.list_libraries())
    }

    /// Library with its librarian and books.
    pub fn library_detail(&self, actor: &Actor, id: LibraryId) -> GatewayResult<LibraryDetail> {
        self.gateway
            .view(actor, || self.libraries.get_library_detail(id))
    }

    pub fn create_library(&self, actor: &Actor, fields: &RawFields) -> GatewayResult<Library> {
        self.gateway.create(actor, &self.validator, fields, |name| {
            Ok(self.libraries.create_library(&name)?)
        })
    }

    pub fn add_book(&self, actor: &Actor, id: LibraryId, book_id: BookId) -> GatewayResult<()> {
        self.gateway.mutate(actor, Action::Update, id, || self.stored(id), || {
            Ok(self.libraries.add_book(id, book_id)?)
        })
    }

    /// Fails with not found when the book is not held by the library.
    pub fn remove_book(&self, actor: &Actor, id: LibraryId, book_id: BookId) -> GatewayResult<()> {
        self.gateway.mutate(actor, Action::Update, id, || self.stored(id), || {
            if self.libraries.remove_book(id, book_id)? {
                Ok(())
            } else {
                Err(GatewayError::NotFound)
            }
        })
    }

    /// Assigns the librarian, replacing any previous one.
    pub fn set_librarian(
        &self,
        actor: &Actor,
        id: LibraryId,
        fields: &RawFields,
    ) -> GatewayResult<Librarian> {
        self.gateway.mutate(actor, Action::Update, id, || self.stored(id), || {
            let name = self.validator.validate(fields)?;
            Ok(self.libraries.set_librarian(id, &name)?)
        })
    }

    /// Deletes the library, its librarian and its book links.
    pub fn delete_library(&self, actor: &Actor, id: LibraryId) -> GatewayResult<()> {
        self.gateway
            .delete(actor, id, || self.stored(id), || self.libraries.delete_library(id))
    }

    fn stored(&self, id: LibraryId) -> RepoResult<Option<Ownership>> {
        Ok(self.libraries.get_library(id)?.map(|_| Ownership::Unowned))
    }
}
