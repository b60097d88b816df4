use libris_core::db::open_db_in_memory;
use libris_core::model::social::NotificationTarget;
use libris_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use libris_core::service::comment_service::CommentService;
use libris_core::service::follow_service::{
    FollowService, ALREADY_FOLLOWING_MESSAGE, NOT_FOLLOWING_MESSAGE, SELF_FOLLOW_MESSAGE,
};
use libris_core::service::notification_service::NotificationService;
use libris_core::service::notify::{VERB_COMMENTED, VERB_FOLLOWED};
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

fn conflict_message<T: std::fmt::Debug>(result: Result<T, GatewayError>) -> String {
    match result {
        Err(GatewayError::Conflict(message)) => message,
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[test]
fn follow_lifecycle_and_notification() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let bob_id = bob.user_id().unwrap();
    let follows = FollowService::sqlite(&conn);

    follows.follow(&alice, bob_id).unwrap();
    assert_eq!(
        conflict_message(follows.follow(&alice, bob_id)),
        ALREADY_FOLLOWING_MESSAGE
    );
    assert_eq!(follows.following(&alice).unwrap(), [bob_id]);

    let inbox = NotificationService::sqlite(&conn)
        .list_notifications(&bob)
        .unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].verb, VERB_FOLLOWED);
    assert_eq!(inbox[0].target, NotificationTarget::User(bob_id));

    follows.unfollow(&alice, bob_id).unwrap();
    assert_eq!(
        conflict_message(follows.unfollow(&alice, bob_id)),
        NOT_FOLLOWING_MESSAGE
    );
    assert!(follows.following(&alice).unwrap().is_empty());
}

#[test]
fn following_self_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice");

    assert_eq!(
        conflict_message(FollowService::sqlite(&conn).follow(&alice, alice.user_id().unwrap())),
        SELF_FOLLOW_MESSAGE
    );
}

#[test]
fn following_unknown_user_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice");
    let follows = FollowService::sqlite(&conn);

    assert!(matches!(
        follows.follow(&alice, uuid::Uuid::new_v4()),
        Err(GatewayError::NotFound)
    ));
    assert!(matches!(
        follows.follow(&Actor::Anonymous, alice.user_id().unwrap()),
        Err(GatewayError::Forbidden(_))
    ));
}

#[test]
fn feed_lists_followed_authors_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let reader = user(&conn, "reader");
    let followed = user(&conn, "followed");
    let stranger = user(&conn, "stranger");
    let posts = PostService::sqlite(&conn);
    for (author, title) in [
        (&followed, "First"),
        (&stranger, "Elsewhere"),
        (&followed, "Second"),
    ] {
        posts
            .create_post(author, &fields(&[("title", title), ("content", "Body")]))
            .unwrap();
    }
    FollowService::sqlite(&conn)
        .follow(&reader, followed.user_id().unwrap())
        .unwrap();

    let feed = posts.feed(&reader).unwrap();
    let titles = feed.iter().map(|post| post.title.as_str()).collect::<Vec<_>>();
    assert_eq!(titles, ["Second", "First"]);

    assert!(matches!(
        posts.feed(&Actor::Anonymous),
        Err(GatewayError::Forbidden(_))
    ));
}

#[test]
fn comments_notify_post_author_except_own() {
    let conn = open_db_in_memory().unwrap();
    let author = user(&conn, "author");
    let reader = user(&conn, "reader");
    let post = PostService::sqlite(&conn)
        .create_post(&author, &fields(&[("title", "Topic"), ("content", "Body")]))
        .unwrap();
    let comments = CommentService::sqlite(&conn);

    comments
        .create_comment(&author, post.id, &fields(&[("content", "replying to myself")]))
        .unwrap();
    comments
        .create_comment(&reader, post.id, &fields(&[("content", "great read")]))
        .unwrap();

    let inbox = NotificationService::sqlite(&conn)
        .list_notifications(&author)
        .unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(Some(inbox[0].actor_id), reader.user_id());
    assert_eq!(inbox[0].verb, VERB_COMMENTED);
    assert_eq!(inbox[0].target, NotificationTarget::Post(post.id));
}

#[test]
fn externally_authenticated_caller_can_follow() {
    let conn = open_db_in_memory().unwrap();
    let bob = user(&conn, "bob");
    let bob_id = bob.user_id().unwrap();
    let external_id = uuid::Uuid::new_v4();
    let external = Actor::from(Principal::new(external_id, "external"));

    FollowService::sqlite(&conn).follow(&external, bob_id).unwrap();

    assert_eq!(
        FollowService::sqlite(&conn).following(&external).unwrap(),
        vec![bob_id]
    );
    let inbox = NotificationService::sqlite(&conn)
        .list_notifications(&bob)
        .unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].actor_id, external_id);
}
