//! Author persistence.
//!
//! # Invariants
//! - Deleting an author deletes its books and their library links in the
//!   same transaction.

use crate::model::catalog::{Author, AuthorId, AuthorWithBooks};
use crate::repo::book_repo::{BookListQuery, BookRepository, SqliteBookRepository};
use crate::repo::{new_id, uuid_column, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

pub trait AuthorRepository {
    fn create_author(&self, name: &str) -> RepoResult<Author>;
    fn update_author(&self, id: AuthorId, name: &str) -> RepoResult<Author>;
    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>>;
    /// Exact, case-sensitive name match; the oldest author wins on duplicates.
    fn find_author_by_name(&self, name: &str) -> RepoResult<Option<Author>>;
    fn get_author_with_books(&self, id: AuthorId) -> RepoResult<Option<AuthorWithBooks>>;
    /// Lists authors sorted by name.
    fn list_authors(&self) -> RepoResult<Vec<Author>>;
    fn delete_author(&self, id: AuthorId) -> RepoResult<()>;
}

pub struct SqliteAuthorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuthorRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AuthorRepository for SqliteAuthorRepository<'_> {
    fn create_author(&self, name: &str) -> RepoResult<Author> {
        let author = Author {
            id: new_id(),
            name: name.to_string(),
        };
        self.conn.execute(
            "INSERT INTO authors (id, name) VALUES (?1, ?2);",
            params![author.id.to_string(), author.name.as_str()],
        )?;
        Ok(author)
    }

    fn update_author(&self, id: AuthorId, name: &str) -> RepoResult<Author> {
        let changed = self.conn.execute(
            "UPDATE authors SET name = ?2 WHERE id = ?1;",
            params![id.to_string(), name],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "author",
                id,
            });
        }
        Ok(Author {
            id,
            name: name.to_string(),
        })
    }

    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        let name = self
            .conn
            .query_row(
                "SELECT name FROM authors WHERE id = ?1;",
                [id.to_string()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(name.map(|name| Author { id, name }))
    }

    fn find_author_by_name(&self, name: &str) -> RepoResult<Option<Author>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name FROM authors WHERE name = ?1 ORDER BY created_at ASC, rowid ASC LIMIT 1;",
        )?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(Author {
                id: uuid_column(row, "id")?,
                name: row.get("name")?,
            }));
        }
        Ok(None)
    }

    fn get_author_with_books(&self, id: AuthorId) -> RepoResult<Option<AuthorWithBooks>> {
        let Some(author) = self.get_author(id)? else {
            return Ok(None);
        };
        let books = SqliteBookRepository::new(self.conn).list_books(&BookListQuery {
            author: Some(id.to_string()),
            ..BookListQuery::default()
        })?;
        Ok(Some(AuthorWithBooks { author, books }))
    }

    fn list_authors(&self) -> RepoResult<Vec<Author>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM authors ORDER BY name ASC, id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut authors = Vec::new();
        while let Some(row) = rows.next()? {
            authors.push(Author {
                id: uuid_column(row, "id")?,
                name: row.get("name")?,
            });
        }
        Ok(authors)
    }

    fn delete_author(&self, id: AuthorId) -> RepoResult<()> {
        let id_text = id.to_string();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM library_books
             WHERE book_id IN (SELECT id FROM books WHERE author_id = ?1);",
            [id_text.as_str()],
        )?;
        tx.execute("DELETE FROM books WHERE author_id = ?1;", [id_text.as_str()])?;
        let changed = tx.execute("DELETE FROM authors WHERE id = ?1;", [id_text.as_str()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "author",
                id,
            });
        }
        tx.commit()?;
        Ok(())
    }
}
