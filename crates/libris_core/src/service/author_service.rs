//! Author use-case service (catalog API surface).

use crate::auth::OwnershipPolicy;
use crate::model::catalog::{Author, AuthorId, AuthorWithBooks};
use crate::model::user::Actor;
use crate::repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
use crate::repo::RepoResult;
use crate::service::gateway::{Gateway, GatewayResult, Ownership};
use crate::validation::{NameValidator, RawFields};
use rusqlite::Connection;

/// Author names on the catalog API allow up to 200 characters.
pub const CATALOG_AUTHOR_NAME_MAX_CHARS: usize = 200;

pub struct AuthorService<A: AuthorRepository> {
    gateway: Gateway,
    validator: NameValidator,
    authors: A,
}

impl<'conn> AuthorService<SqliteAuthorRepository<'conn>> {
    pub fn sqlite(conn: &'conn Connection) -> Self {
        Self::new(SqliteAuthorRepository::new(conn))
    }
}

impl<A: AuthorRepository> AuthorService<A> {
    pub fn new(authors: A) -> Self {
        Self {
            gateway: Gateway::new("author", OwnershipPolicy),
            validator: NameValidator::new(CATALOG_AUTHOR_NAME_MAX_CHARS),
            authors,
        }
    }

    pub fn list_authors(&self, actor: &Actor) -> GatewayResult<Vec<Author>> {
        self.gateway.list(actor, || self.authors.list_authors())
    }

    /// Author with its books nested.
    pub fn get_author(&self, actor: &Actor, id: AuthorId) -> GatewayResult<AuthorWithBooks> {
        self.gateway
            .view(actor, || self.authors.get_author_with_books(id))
    }

    pub fn create_author(&self, actor: &Actor, fields: &RawFields) -> GatewayResult<Author> {
        self.gateway.create(actor, &self.validator, fields, |name| {
            Ok(self.authors.create_author(&name)?)
        })
    }

    pub fn update_author(
        &self,
        actor: &Actor,
        id: AuthorId,
        fields: &RawFields,
    ) -> GatewayResult<Author> {
        self.gateway.update(
            actor,
            id,
            || self.stored(id),
            &self.validator,
            fields,
            |name| Ok(self.authors.update_author(id, &name)?),
        )
    }

    /// Deletes the author together with its books.
    pub fn delete_author(&self, actor: &Actor, id: AuthorId) -> GatewayResult<()> {
        self.gateway
            .delete(actor, id, || self.stored(id), || self.authors.delete_author(id))
    }

    fn stored(&self, id: AuthorId) -> RepoResult<Option<Ownership>> {
        Ok(self.authors.get_author(id)?.map(|_| Ownership::Unowned))
    }
}
