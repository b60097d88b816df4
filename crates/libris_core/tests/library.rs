use libris_core::db::open_db_in_memory;
use libris_core::repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
use libris_core::repo::book_repo::{BookFields, BookRepository, SqliteBookRepository};
use libris_core::repo::library_repo::{LibraryRepository, SqliteLibraryRepository};
use libris_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use libris_core::service::library_service::LibraryService;
use libris_core::{Actor, Capability, GatewayError, RawFields};
use rusqlite::Connection;

fn name(value: &str) -> RawFields {
    RawFields::from([("name".to_string(), value.to_string())])
}

fn librarian_admin(conn: &Connection) -> Actor {
    let users = SqliteUserRepository::new(conn);
    let user = users.create_user("admin").unwrap();
    for capability in Capability::ALL {
        users.grant_capability(user.id, capability).unwrap();
    }
    Actor::from(users.load_principal(user.id).unwrap().unwrap())
}

fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

#[test]
fn library_detail_includes_librarian_and_books() {
    let conn = open_db_in_memory().unwrap();
    let admin = librarian_admin(&conn);
    let author = SqliteAuthorRepository::new(&conn)
        .create_author("Austen")
        .unwrap();
    let book = SqliteBookRepository::new(&conn)
        .create_book(&BookFields {
            title: "Emma".to_string(),
            author_id: author.id,
            publication_year: 1815,
        })
        .unwrap();
    let service = LibraryService::sqlite(&conn);

    let library = service.create_library(&admin, &name(" Central ")).unwrap();
    assert_eq!(library.name, "Central");
    service.add_book(&admin, library.id, book.id).unwrap();
    service.add_book(&admin, library.id, book.id).unwrap();
    let librarian = service
        .set_librarian(&admin, library.id, &name("Marian"))
        .unwrap();

    let detail = service.library_detail(&admin, library.id).unwrap();
    assert_eq!(detail.library, library);
    assert_eq!(detail.librarian, Some(librarian));
    assert_eq!(detail.books, [book]);
}

#[test]
fn setting_librarian_replaces_previous_one() {
    let conn = open_db_in_memory().unwrap();
    let admin = librarian_admin(&conn);
    let service = LibraryService::sqlite(&conn);
    let library = service.create_library(&admin, &name("Branch")).unwrap();

    service
        .set_librarian(&admin, library.id, &name("First"))
        .unwrap();
    service
        .set_librarian(&admin, library.id, &name("Second"))
        .unwrap();

    let current = SqliteLibraryRepository::new(&conn)
        .get_librarian(library.id)
        .unwrap()
        .unwrap();
    assert_eq!(current.name, "Second");
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM librarians;"), 1);
}

#[test]
fn adding_missing_book_is_a_field_error() {
    let conn = open_db_in_memory().unwrap();
    let admin = librarian_admin(&conn);
    let service = LibraryService::sqlite(&conn);
    let library = service.create_library(&admin, &name("Branch")).unwrap();

    match service.add_book(&admin, library.id, uuid::Uuid::new_v4()) {
        Err(GatewayError::Validation(errors)) => assert!(errors.contains("book")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(matches!(
        service.add_book(&admin, uuid::Uuid::new_v4(), uuid::Uuid::new_v4()),
        Err(GatewayError::NotFound)
    ));
}

#[test]
fn deleting_library_cascades_to_librarian_and_links() {
    let conn = open_db_in_memory().unwrap();
    let admin = librarian_admin(&conn);
    let author = SqliteAuthorRepository::new(&conn)
        .create_author("Herbert")
        .unwrap();
    let book = SqliteBookRepository::new(&conn)
        .create_book(&BookFields {
            title: "Dune".to_string(),
            author_id: author.id,
            publication_year: 1965,
        })
        .unwrap();
    let service = LibraryService::sqlite(&conn);
    let library = service.create_library(&admin, &name("Doomed")).unwrap();
    service.add_book(&admin, library.id, book.id).unwrap();
    service
        .set_librarian(&admin, library.id, &name("Keeper"))
        .unwrap();

    service.delete_library(&admin, library.id).unwrap();

    assert_eq!(count(&conn, "SELECT COUNT(*) FROM libraries;"), 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM librarians;"), 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM library_books;"), 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM books;"), 1);
    assert!(matches!(
        service.delete_library(&admin, library.id),
        Err(GatewayError::NotFound)
    ));
}

#[test]
fn removing_unlinked_book_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let admin = librarian_admin(&conn);
    let service = LibraryService::sqlite(&conn);
    let library = service.create_library(&admin, &name("Branch")).unwrap();

    assert!(matches!(
        service.remove_book(&admin, library.id, uuid::Uuid::new_v4()),
        Err(GatewayError::NotFound)
    ));
}

#[test]
fn deleting_book_unlinks_it_from_libraries() {
    let conn = open_db_in_memory().unwrap();
    let admin = librarian_admin(&conn);
    let author = SqliteAuthorRepository::new(&conn)
        .create_author("Someone")
        .unwrap();
    let books = SqliteBookRepository::new(&conn);
    let book = books
        .create_book(&BookFields {
            title: "Shelved".to_string(),
            author_id: author.id,
            publication_year: 2000,
        })
        .unwrap();
    let service = LibraryService::sqlite(&conn);
    let library = service.create_library(&admin, &name("Branch")).unwrap();
    service.add_book(&admin, library.id, book.id).unwrap();

    books.delete_book(book.id).unwrap();

    let detail = service.library_detail(&admin, library.id).unwrap();
    assert!(detail.books.is_empty());
}
