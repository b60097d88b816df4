//! Catalog and library endpoints.

use crate::api::query::{parse_book_list_query, QueryParams};
use crate::api::{respond, respond_with, ApiResponse, STATUS_CREATED, STATUS_OK};
use crate::model::catalog::{AuthorId, BookId, LibraryId};
use crate::model::user::Actor;
use crate::service::author_service::AuthorService;
use crate::service::book_service::{BookService, BookSurface};
use crate::service::gateway::GatewayError;
use crate::service::library_service::LibraryService;
use crate::validation::raw_fields_from_json;
use rusqlite::Connection;
use serde_json::Value;

pub fn list_books(
    conn: &Connection,
    surface: BookSurface,
    actor: &Actor,
    params: &QueryParams,
) -> ApiResponse {
    let query = match parse_book_list_query(params) {
        Ok(query) => query,
        Err(errors) => return GatewayError::Validation(errors).into(),
    };
    respond(
        STATUS_OK,
        BookService::sqlite(conn, surface).list_books(actor, &query),
    )
}

pub fn get_book(conn: &Connection, surface: BookSurface, actor: &Actor, id: BookId) -> ApiResponse {
    respond(STATUS_OK, BookService::sqlite(conn, surface).get_book(actor, id))
}

pub fn create_book(
    conn: &Connection,
    surface: BookSurface,
    actor: &Actor,
    body: &Value,
) -> ApiResponse {
    let fields = raw_fields_from_json(body);
    respond(
        STATUS_CREATED,
        BookService::sqlite(conn, surface).create_book(actor, &fields),
    )
}

pub fn update_book(
    conn: &Connection,
    surface: BookSurface,
    actor: &Actor,
    id: BookId,
    body: &Value,
) -> ApiResponse {
    let fields = raw_fields_from_json(body);
    respond(
        STATUS_OK,
        BookService::sqlite(conn, surface).update_book(actor, id, &fields),
    )
}

pub fn delete_book(
    conn: &Connection,
    surface: BookSurface,
    actor: &Actor,
    id: BookId,
) -> ApiResponse {
    respond_with(
        BookService::sqlite(conn, surface).delete_book(actor, id),
        ApiResponse::no_content,
    )
}

pub fn list_authors(conn: &Connection, actor: &Actor) -> ApiResponse {
    respond(STATUS_OK, AuthorService::sqlite(conn).list_authors(actor))
}

pub fn get_author(conn: &Connection, actor: &Actor, id: AuthorId) -> ApiResponse {
    respond(STATUS_OK, AuthorService::sqlite(conn).get_author(actor, id))
}

pub fn create_author(conn: &Connection, actor: &Actor, body: &Value) -> ApiResponse {
    let fields = raw_fields_from_json(body);
    respond(
        STATUS_CREATED,
        AuthorService::sqlite(conn).create_author(actor, &fields),
    )
}

pub fn update_author(conn: &Connection, actor: &Actor, id: AuthorId, body: &Value) -> ApiResponse {
    let fields = raw_fields_from_json(body);
    respond(
        STATUS_OK,
        AuthorService::sqlite(conn).update_author(actor, id, &fields),
    )
}

pub fn delete_author(conn: &Connection, actor: &Actor, id: AuthorId) -> ApiResponse {
    respond_with(
        AuthorService::sqlite(conn).delete_author(actor, id),
        ApiResponse::no_content,
    )
}

pub fn list_libraries(conn: &Connection, actor: &Actor) -> ApiResponse {
    respond(STATUS_OK, LibraryService::sqlite(conn).list_libraries(actor))
}

pub fn library_detail(conn: &Connection, actor: &Actor, id: LibraryId) -> ApiResponse {
    respond(
        STATUS_OK,
        LibraryService::sqlite(conn).library_detail(actor, id),
    )
}

pub fn create_library(conn: &Connection, actor: &Actor, body: &Value) -> ApiResponse {
    let fields = raw_fields_from_json(body);
    respond(
        STATUS_CREATED,
        LibraryService::sqlite(conn).create_library(actor, &fields),
    )
}

/// Adds a book to the library and returns the refreshed detail.
pub fn add_library_book(
    conn: &Connection,
    actor: &Actor,
    id: LibraryId,
    book_id: BookId,
) -> ApiResponse {
    let service = LibraryService::sqlite(conn);
    let result = service
        .add_book(actor, id, book_id)
        .and_then(|()| service.library_detail(actor, id));
    respond(STATUS_OK, result)
}

pub fn remove_library_book(
    conn: &Connection,
    actor: &Actor,
    id: LibraryId,
    book_id: BookId,
) -> ApiResponse {
    respond_with(
        LibraryService::sqlite(conn).remove_book(actor, id, book_id),
        ApiResponse::no_content,
    )
}

pub fn set_librarian(conn: &Connection, actor: &Actor, id: LibraryId, body: &Value) -> ApiResponse {
    let fields = raw_fields_from_json(body);
    respond(
        STATUS_OK,
        LibraryService::sqlite(conn).set_librarian(actor, id, &fields),
    )
}

pub fn delete_library(conn: &Connection, actor: &Actor, id: LibraryId) -> ApiResponse {
    respond_with(
        LibraryService::sqlite(conn).delete_library(actor, id),
        ApiResponse::no_content,
    )
}
