use libris_core::db::open_db_in_memory;
use libris_core::model::social::Post;
use libris_core::repo::post_repo::PostListQuery;
use libris_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use libris_core::service::comment_service::CommentService;
use libris_core::service::like_service::LikeService;
use libris_core::service::post_service::PostService;
use libris_core::{Actor, GatewayError, Principal, RawFields};
use rusqlite::Connection;

fn fields(pairs: &[(&str, &str)]) -> RawFields {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn user(conn: &Connection, username: &str) -> Actor {
    let users = SqliteUserRepository::new(conn);
    let user = users.create_user(username).unwrap();
    Actor::from(users.load_principal(user.id).unwrap().unwrap())
}

fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

fn titles(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|post| post.title.as_str()).collect()
}

#[test]
fn post_tags_are_normalized_and_searchable() {
    let conn = open_db_in_memory().unwrap();
    let author = user(&conn, "author");
    let posts = PostService::sqlite(&conn);

    let post = posts
        .create_post(
            &author,
            &fields(&[
                ("title", "Ownership"),
                ("content", "Borrowing rules explained"),
                ("tags", "Rust, rust ,  Systems,"),
            ]),
        )
        .unwrap();
    assert_eq!(post.tags, ["rust", "systems"]);
    posts
        .create_post(&author, &fields(&[("title", "Gardening"), ("content", "Tomatoes")]))
        .unwrap();

    let by_tag = PostListQuery {
        tag: Some("rust".to_string()),
        ..PostListQuery::default()
    };
    assert_eq!(
        titles(&posts.list_posts(&Actor::Anonymous, &by_tag).unwrap()),
        ["Ownership"]
    );

    let by_search = PostListQuery {
        search: Some("TOMATO".to_string()),
        ..PostListQuery::default()
    };
    assert_eq!(
        titles(&posts.list_posts(&Actor::Anonymous, &by_search).unwrap()),
        ["Gardening"]
    );

    let all = posts
        .list_posts(&Actor::Anonymous, &PostListQuery::default())
        .unwrap();
    assert_eq!(titles(&all), ["Gardening", "Ownership"]);
}

#[test]
fn blank_post_fields_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let author = user(&conn, "author");

    let err = PostService::sqlite(&conn)
        .create_post(&author, &fields(&[("title", "   "), ("content", "")]))
        .unwrap_err();
    match err {
        GatewayError::Validation(errors) => {
            assert!(errors.contains("title"));
            assert!(errors.contains("content"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn owner_updates_post_and_tags_are_replaced() {
    let conn = open_db_in_memory().unwrap();
    let author = user(&conn, "author");
    let posts = PostService::sqlite(&conn);
    let post = posts
        .create_post(
            &author,
            &fields(&[("title", "Draft"), ("content", "v1"), ("tags", "old")]),
        )
        .unwrap();

    let updated = posts
        .update_post(
            &author,
            post.id,
            &fields(&[("title", "Final"), ("content", "v2"), ("tags", "new")]),
        )
        .unwrap();
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.tags, ["new"]);
    assert!(updated.updated_at >= post.updated_at);
}

#[test]
fn comment_ownership_is_enforced() {
    let conn = open_db_in_memory().unwrap();
    let author = user(&conn, "author");
    let commenter = user(&conn, "commenter");
    let posts = PostService::sqlite(&conn);
    let comments = CommentService::sqlite(&conn);
    let post = posts
        .create_post(&author, &fields(&[("title", "Topic"), ("content", "Body")]))
        .unwrap();
    let comment = comments
        .create_comment(&commenter, post.id, &fields(&[("content", " Nice post ")]))
        .unwrap();
    assert_eq!(comment.content, "Nice post");
    assert_eq!(Some(comment.author_id), commenter.user_id());

    assert!(matches!(
        comments.update_comment(&author, comment.id, &fields(&[("content", "edited")])),
        Err(GatewayError::Forbidden(_))
    ));
    let edited = comments
        .update_comment(&commenter, comment.id, &fields(&[("content", "edited")]))
        .unwrap();
    assert_eq!(edited.content, "edited");

    comments.delete_comment(&commenter, comment.id).unwrap();
    assert!(matches!(
        comments.delete_comment(&commenter, comment.id),
        Err(GatewayError::NotFound)
    ));
}

#[test]
fn comment_on_missing_post_is_a_field_error() {
    let conn = open_db_in_memory().unwrap();
    let commenter = user(&conn, "commenter");

    let err = CommentService::sqlite(&conn)
        .create_comment(&commenter, uuid::Uuid::new_v4(), &fields(&[("content", "hello")]))
        .unwrap_err();
    match err {
        GatewayError::Validation(errors) => assert!(errors.contains("post")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn listing_comments_of_missing_post_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    assert!(matches!(
        CommentService::sqlite(&conn).list_comments(&Actor::Anonymous, uuid::Uuid::new_v4()),
        Err(GatewayError::NotFound)
    ));
}

#[test]
fn deleting_post_cascades_without_orphans() {
    let conn = open_db_in_memory().unwrap();
    let author = user(&conn, "author");
    let fan = user(&conn, "fan");
    let posts = PostService::sqlite(&conn);
    let post = posts
        .create_post(
            &author,
            &fields(&[("title", "Doomed"), ("content", "Body"), ("tags", "a,b")]),
        )
        .unwrap();
    CommentService::sqlite(&conn)
        .create_comment(&fan, post.id, &fields(&[("content", "first!")]))
        .unwrap();
    LikeService::sqlite(&conn).like_post(&fan, post.id).unwrap();
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM notifications;"), 2);

    posts.delete_post(&author, post.id).unwrap();

    assert_eq!(count(&conn, "SELECT COUNT(*) FROM posts;"), 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM comments;"), 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM likes;"), 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM post_tags;"), 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM notifications;"), 0);
    assert!(matches!(
        posts.get_post(&Actor::Anonymous, post.id),
        Err(GatewayError::NotFound)
    ));
}

#[test]
fn externally_authenticated_caller_writes_without_prior_user_row() {
    let conn = open_db_in_memory().unwrap();
    let author = user(&conn, "author");
    let external_id = uuid::Uuid::new_v4();
    let external = Actor::from(Principal::new(external_id, "external"));

    let own_post = PostService::sqlite(&conn)
        .create_post(&external, &fields(&[("title", "Hello"), ("content", "Body")]))
        .unwrap();
    assert_eq!(own_post.author_id, external_id);

    let post = PostService::sqlite(&conn)
        .create_post(&author, &fields(&[("title", "Theirs"), ("content", "Body")]))
        .unwrap();
    let comment = CommentService::sqlite(&conn)
        .create_comment(&external, post.id, &fields(&[("content", "Nice")]))
        .unwrap();
    assert_eq!(comment.author_id, external_id);
    LikeService::sqlite(&conn).like_post(&external, post.id).unwrap();

    let users = SqliteUserRepository::new(&conn);
    users
        .ensure_user(&Principal::new(external_id, "renamed"))
        .unwrap();
    assert_eq!(users.get_user(external_id).unwrap().unwrap().username, "external");
    assert_eq!(
        count(&conn, "SELECT COUNT(*) FROM users WHERE username = 'external';"),
        1
    );
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM notifications;"), 2);
}
