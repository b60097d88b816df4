//! Blog and social endpoints.

use crate::api::query::{parse_post_list_query, QueryParams};
use crate::api::{respond, respond_with, ApiResponse, STATUS_CREATED, STATUS_OK};
use crate::model::social::{CommentId, PostId};
use crate::model::user::{Actor, UserId};
use crate::service::comment_service::CommentService;
use crate::service::contact_service::{ContactService, CONTACT_SUCCESS_MESSAGE};
use crate::service::follow_service::FollowService;
use crate::service::like_service::LikeService;
use crate::service::notification_service::NotificationService;
use crate::service::post_service::PostService;
use crate::validation::raw_fields_from_json;
use rusqlite::Connection;
use serde_json::Value;

pub const LIKED_MESSAGE: &str = "Post liked successfully";
pub const UNLIKED_MESSAGE: &str = "Post unliked";
pub const FOLLOWED_MESSAGE: &str = "User followed successfully";
pub const UNFOLLOWED_MESSAGE: &str = "User unfollowed";

pub fn list_posts(conn: &Connection, actor: &Actor, params: &QueryParams) -> ApiResponse {
    let query = parse_post_list_query(params);
    respond(STATUS_OK, PostService::sqlite(conn).list_posts(actor, &query))
}

pub fn get_post(conn: &Connection, actor: &Actor, id: PostId) -> ApiResponse {
    respond(STATUS_OK, PostService::sqlite(conn).get_post(actor, id))
}

pub fn create_post(conn: &Connection, actor: &Actor, body: &Value) -> ApiResponse {
    let fields = raw_fields_from_json(body);
    respond(
        STATUS_CREATED,
        PostService::sqlite(conn).create_post(actor, &fields),
    )
}

pub fn update_post(conn: &Connection, actor: &Actor, id: PostId, body: &Value) -> ApiResponse {
    let fields = raw_fields_from_json(body);
    respond(
        STATUS_OK,
        PostService::sqlite(conn).update_post(actor, id, &fields),
    )
}

pub fn delete_post(conn: &Connection, actor: &Actor, id: PostId) -> ApiResponse {
    respond_with(
        PostService::sqlite(conn).delete_post(actor, id),
        ApiResponse::no_content,
    )
}

pub fn feed(conn: &Connection, actor: &Actor) -> ApiResponse {
    respond(STATUS_OK, PostService::sqlite(conn).feed(actor))
}

pub fn list_comments(conn: &Connection, actor: &Actor, post_id: PostId) -> ApiResponse {
    respond(
        STATUS_OK,
        CommentService::sqlite(conn).list_comments(actor, post_id),
    )
}

pub fn create_comment(conn: &Connection, actor: &Actor, post_id: PostId, body: &Value) -> ApiResponse {
    let fields = raw_fields_from_json(body);
    respond(
        STATUS_CREATED,
        CommentService::sqlite(conn).create_comment(actor, post_id, &fields),
    )
}

pub fn update_comment(conn: &Connection, actor: &Actor, id: CommentId, body: &Value) -> ApiResponse {
    let fields = raw_fields_from_json(body);
    respond(
        STATUS_OK,
        CommentService::sqlite(conn).update_comment(actor, id, &fields),
    )
}

pub fn delete_comment(conn: &Connection, actor: &Actor, id: CommentId) -> ApiResponse {
    respond_with(
        CommentService::sqlite(conn).delete_comment(actor, id),
        ApiResponse::no_content,
    )
}

pub fn like_post(conn: &Connection, actor: &Actor, post_id: PostId) -> ApiResponse {
    respond_with(
        LikeService::sqlite(conn).like_post(actor, post_id).map(|_| ()),
        || ApiResponse::message(STATUS_OK, LIKED_MESSAGE),
    )
}

pub fn unlike_post(conn: &Connection, actor: &Actor, post_id: PostId) -> ApiResponse {
    respond_with(LikeService::sqlite(conn).unlike_post(actor, post_id), || {
        ApiResponse::message(STATUS_OK, UNLIKED_MESSAGE)
    })
}

pub fn follow_user(conn: &Connection, actor: &Actor, user_id: UserId) -> ApiResponse {
    respond_with(FollowService::sqlite(conn).follow(actor, user_id), || {
        ApiResponse::message(STATUS_OK, FOLLOWED_MESSAGE)
    })
}

pub fn unfollow_user(conn: &Connection, actor: &Actor, user_id: UserId) -> ApiResponse {
    respond_with(FollowService::sqlite(conn).unfollow(actor, user_id), || {
        ApiResponse::message(STATUS_OK, UNFOLLOWED_MESSAGE)
    })
}

pub fn list_notifications(conn: &Connection, actor: &Actor) -> ApiResponse {
    respond(
        STATUS_OK,
        NotificationService::sqlite(conn).list_notifications(actor),
    )
}

pub fn submit_contact(actor: &Actor, body: &Value) -> ApiResponse {
    let fields = raw_fields_from_json(body);
    respond_with(
        ContactService::new().submit(actor, &fields).map(|_| ()),
        || ApiResponse::message(STATUS_OK, CONTACT_SUCCESS_MESSAGE),
    )
}
