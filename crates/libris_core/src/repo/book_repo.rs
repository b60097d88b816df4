//! Book persistence with filter, search and ordering support.
//!
//! # Invariants
//! - Writes check that the referenced author exists and report a missing
//!   one as [`RepoError::InvalidReference`] on `author`.
//! - Lists default to ascending title order with `id` as tie-breaker.
//! - Deleting a book removes its library links in the same transaction.

use crate::model::catalog::{AuthorId, Book, BookId};
use crate::repo::{like_pattern, new_id, uuid_column, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

pub(crate) const BOOK_SELECT_SQL: &str = "SELECT
    books.id AS id,
    books.title AS title,
    books.publication_year AS publication_year,
    books.author_id AS author_id,
    authors.name AS author_name
FROM books
INNER JOIN authors ON authors.id = books.author_id";

/// Column a book list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSortField {
    Title,
    PublicationYear,
}

impl BookSortField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::PublicationYear => "publication_year",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "title" => Some(Self::Title),
            "publication_year" => Some(Self::PublicationYear),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Title => "books.title",
            Self::PublicationYear => "books.publication_year",
        }
    }
}

/// One sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookOrder {
    pub field: BookSortField,
    pub descending: bool,
}

impl BookOrder {
    pub fn ascending(field: BookSortField) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub fn descending(field: BookSortField) -> Self {
        Self {
            field,
            descending: true,
        }
    }
}

/// Filter/search/order options for listing books.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookListQuery {
    /// Exact year match.
    pub publication_year: Option<i32>,
    /// Exact title match.
    pub title: Option<String>,
    /// Exact author id or exact author name.
    pub author: Option<String>,
    /// Case-insensitive substring over title and author name.
    pub search: Option<String>,
    /// Sort keys in priority order; empty means ascending title.
    pub ordering: Vec<BookOrder>,
    pub limit: Option<u32>,
}

/// Column values written for one book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFields {
    pub title: String,
    pub author_id: AuthorId,
    pub publication_year: i32,
}

pub trait BookRepository {
    fn create_book(&self, fields: &BookFields) -> RepoResult<Book>;
    fn update_book(&self, id: BookId, fields: &BookFields) -> RepoResult<Book>;
    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>>;
    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>>;
    fn delete_book(&self, id: BookId) -> RepoResult<()>;
}

pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn ensure_author_exists(&self, author_id: AuthorId) -> RepoResult<()> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM authors WHERE id = ?1);",
            [author_id.to_string()],
            |row| row.get(0),
        )?;
        if exists == 1 {
            Ok(())
        } else {
            Err(RepoError::InvalidReference {
                field: "author",
                id: author_id,
            })
        }
    }

    fn read_back(&self, id: BookId) -> RepoResult<Book> {
        self.get_book(id)?
            .ok_or(RepoError::NotFound { entity: "book", id })
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn create_book(&self, fields: &BookFields) -> RepoResult<Book> {
        self.ensure_author_exists(fields.author_id)?;
        let id = new_id();
        self.conn.execute(
            "INSERT INTO books (id, title, publication_year, author_id)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                fields.title.as_str(),
                fields.publication_year,
                fields.author_id.to_string(),
            ],
        )?;
        self.read_back(id)
    }

    fn update_book(&self, id: BookId, fields: &BookFields) -> RepoResult<Book> {
        self.ensure_author_exists(fields.author_id)?;
        let changed = self.conn.execute(
            "UPDATE books
             SET
                title = ?2,
                publication_year = ?3,
                author_id = ?4,
                updated_at = (CAST(unixepoch('subsec') * 1000 AS INTEGER))
             WHERE id = ?1;",
            params![
                id.to_string(),
                fields.title.as_str(),
                fields.publication_year,
                fields.author_id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "book", id });
        }
        self.read_back(id)
    }

    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} WHERE books.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_book_row(row)?));
        }
        Ok(None)
    }

    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>> {
        let mut sql = format!("{BOOK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(year) = query.publication_year {
            sql.push_str(" AND books.publication_year = ?");
            bind_values.push(Value::Integer(i64::from(year)));
        }

        if let Some(title) = query.title.as_ref() {
            sql.push_str(" AND books.title = ?");
            bind_values.push(Value::Text(title.clone()));
        }

        if let Some(author) = query.author.as_ref() {
            match Uuid::parse_str(author) {
                Ok(author_id) => {
                    sql.push_str(" AND books.author_id = ?");
                    bind_values.push(Value::Text(author_id.to_string()));
                }
                Err(_) => {
                    sql.push_str(" AND authors.name = ?");
                    bind_values.push(Value::Text(author.clone()));
                }
            }
        }

        if let Some(search) = query.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                let pattern = like_pattern(search);
                sql.push_str(
                    " AND (books.title LIKE ? ESCAPE '\\' OR authors.name LIKE ? ESCAPE '\\')",
                );
                bind_values.push(Value::Text(pattern.clone()));
                bind_values.push(Value::Text(pattern));
            }
        }

        sql.push_str(" ORDER BY ");
        if query.ordering.is_empty() {
            sql.push_str("books.title ASC, ");
        }
        for order in &query.ordering {
            sql.push_str(order.field.column());
            sql.push_str(if order.descending { " DESC, " } else { " ASC, " });
        }
        sql.push_str("books.id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }
        Ok(books)
    }

    fn delete_book(&self, id: BookId) -> RepoResult<()> {
        let id_text = id.to_string();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM library_books WHERE book_id = ?1;",
            [id_text.as_str()],
        )?;
        let changed = tx.execute("DELETE FROM books WHERE id = ?1;", [id_text.as_str()])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "book", id });
        }
        tx.commit()?;
        Ok(())
    }
}

pub(crate) fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    Ok(Book {
        id: uuid_column(row, "id")?,
        title: row.get("title")?,
        publication_year: row.get("publication_year")?,
        author_id: uuid_column(row, "author_id")?,
        author_name: row.get("author_name")?,
    })
}
