//! Library, librarian and library/book link persistence.
//!
//! # Invariants
//! - One librarian per library (`librarians.library_id` is unique).
//! - Deleting a library deletes its librarian and its book links in one
//!   transaction; the books themselves survive.

use crate::model::catalog::{BookId, Librarian, Library, LibraryDetail, LibraryId};
use crate::repo::book_repo::{parse_book_row, BOOK_SELECT_SQL};
use crate::repo::{new_id, uuid_column, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

pub trait LibraryRepository {
    fn create_library(&self, name: &str) -> RepoResult<Library>;
    fn get_library(&self, id: LibraryId) -> RepoResult<Option<Library>>;
    fn list_libraries(&self) -> RepoResult<Vec<Library>>;
    fn get_library_detail(&self, id: LibraryId) -> RepoResult<Option<LibraryDetail>>;
    /// Linking an already linked book is a no-op.
    fn add_book(&self, library_id: LibraryId, book_id: BookId) -> RepoResult<()>;
    /// Returns whether a link was removed.
    fn remove_book(&self, library_id: LibraryId, book_id: BookId) -> RepoResult<bool>;
    /// Installs `name` as the library's librarian, replacing any previous one.
    fn set_librarian(&self, library_id: LibraryId, name: &str) -> RepoResult<Librarian>;
    fn get_librarian(&self, library_id: LibraryId) -> RepoResult<Option<Librarian>>;
    fn delete_library(&self, id: LibraryId) -> RepoResult<()>;
}

pub struct SqliteLibraryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLibraryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn ensure_library_exists(&self, id: LibraryId) -> RepoResult<()> {
        if self.get_library(id)?.is_none() {
            return Err(RepoError::NotFound {
                entity: "library",
                id,
            });
        }
        Ok(())
    }
}

impl LibraryRepository for SqliteLibraryRepository<'_> {
    fn create_library(&self, name: &str) -> RepoResult<Library> {
        let library = Library {
            id: new_id(),
            name: name.to_string(),
        };
        self.conn.execute(
            "INSERT INTO libraries (id, name) VALUES (?1, ?2);",
            params![library.id.to_string(), library.name.as_str()],
        )?;
        Ok(library)
    }

    fn get_library(&self, id: LibraryId) -> RepoResult<Option<Library>> {
        let name = self
            .conn
            .query_row(
                "SELECT name FROM libraries WHERE id = ?1;",
                [id.to_string()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(name.map(|name| Library { id, name }))
    }

    fn list_libraries(&self) -> RepoResult<Vec<Library>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM libraries ORDER BY name ASC, id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut libraries = Vec::new();
        while let Some(row) = rows.next()? {
            libraries.push(Library {
                id: uuid_column(row, "id")?,
                name: row.get("name")?,
            });
        }
        Ok(libraries)
    }

    fn get_library_detail(&self, id: LibraryId) -> RepoResult<Option<LibraryDetail>> {
        let Some(library) = self.get_library(id)? else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(&format!(
            "{BOOK_SELECT_SQL}
             INNER JOIN library_books ON library_books.book_id = books.id
             WHERE library_books.library_id = ?1
             ORDER BY books.title ASC, books.id ASC;"
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }

        Ok(Some(LibraryDetail {
            librarian: self.get_librarian(id)?,
            library,
            books,
        }))
    }

    fn add_book(&self, library_id: LibraryId, book_id: BookId) -> RepoResult<()> {
        self.ensure_library_exists(library_id)?;
        let book_exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM books WHERE id = ?1);",
            [book_id.to_string()],
            |row| row.get(0),
        )?;
        if book_exists != 1 {
            return Err(RepoError::InvalidReference {
                field: "book",
                id: book_id,
            });
        }

        self.conn.execute(
            "INSERT OR IGNORE INTO library_books (library_id, book_id) VALUES (?1, ?2);",
            params![library_id.to_string(), book_id.to_string()],
        )?;
        Ok(())
    }

    fn remove_book(&self, library_id: LibraryId, book_id: BookId) -> RepoResult<bool> {
        self.ensure_library_exists(library_id)?;
        let changed = self.conn.execute(
            "DELETE FROM library_books WHERE library_id = ?1 AND book_id = ?2;",
            params![library_id.to_string(), book_id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn set_librarian(&self, library_id: LibraryId, name: &str) -> RepoResult<Librarian> {
        self.ensure_library_exists(library_id)?;
        let librarian = Librarian {
            id: new_id(),
            name: name.to_string(),
            library_id,
        };

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM librarians WHERE library_id = ?1;",
            [library_id.to_string()],
        )?;
        tx.execute(
            "INSERT INTO librarians (id, name, library_id) VALUES (?1, ?2, ?3);",
            params![
                librarian.id.to_string(),
                librarian.name.as_str(),
                library_id.to_string(),
            ],
        )?;
        tx.commit()?;
        Ok(librarian)
    }

    fn get_librarian(&self, library_id: LibraryId) -> RepoResult<Option<Librarian>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM librarians WHERE library_id = ?1;")?;
        let mut rows = stmt.query([library_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(Librarian {
                id: uuid_column(row, "id")?,
                name: row.get("name")?,
                library_id,
            }));
        }
        Ok(None)
    }

    fn delete_library(&self, id: LibraryId) -> RepoResult<()> {
        let id_text = id.to_string();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM librarians WHERE library_id = ?1;",
            [id_text.as_str()],
        )?;
        tx.execute(
            "DELETE FROM library_books WHERE library_id = ?1;",
            [id_text.as_str()],
        )?;
        let changed = tx.execute("DELETE FROM libraries WHERE id = ?1;", [id_text.as_str()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "library",
                id,
            });
        }
        tx.commit()?;
        Ok(())
    }
}
