//! Like/unlike use-case service.
//!
//! # Responsibility
//! - Drive the like state machine of one `(user, post)` pair.
//! - Notify the post author when a like is actually created.
//!
//! # Invariants
//! - Liking twice reports a conflict and creates neither a second like nor
//!   a second notification.
//! - Unliking an absent like reports a conflict.
//! - Unliking never produces a notification.
//! - A caller unknown to the local user table is recorded before its
//!   first like.

use crate::auth::{Action, OwnershipPolicy};
use crate::model::social::{Like, PostId};
use crate::model::user::{Actor, UserId};
use crate::repo::like_repo::{LikeOutcome, LikeRepository, SqliteLikeRepository};
use crate::repo::notification_repo::SqliteNotificationRepository;
use crate::repo::post_repo::{PostRepository, SqlitePostRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::service::gateway::{
    provision_user, require_user, Gateway, GatewayError, GatewayResult,
};
use crate::service::notify::{
    dispatch_best_effort, MutationEvent, NotificationDispatcher, SideEffectDispatcher,
};
use log::info;
use rusqlite::Connection;

pub const ALREADY_LIKED_MESSAGE: &str = "You have already liked this post";
pub const NOT_LIKED_MESSAGE: &str = "You haven't liked this post";

pub struct LikeService<
    U: UserRepository,
    P: PostRepository,
    L: LikeRepository,
    D: SideEffectDispatcher,
> {
    gateway: Gateway,
    users: U,
    posts: P,
    likes: L,
    dispatcher: D,
}

impl<'conn>
    LikeService<
        SqliteUserRepository<'conn>,
        SqlitePostRepository<'conn>,
        SqliteLikeRepository<'conn>,
        NotificationDispatcher<SqliteNotificationRepository<'conn>>,
    >
{
    pub fn sqlite(conn: &'conn Connection) -> Self {
        Self::new(
            SqliteUserRepository::new(conn),
            SqlitePostRepository::new(conn),
            SqliteLikeRepository::new(conn),
            NotificationDispatcher::new(SqliteNotificationRepository::new(conn)),
        )
    }
}

impl<U, P, L, D> LikeService<U, P, L, D>
where
    U: UserRepository,
    P: PostRepository,
    L: LikeRepository,
    D: SideEffectDispatcher,
{
    pub fn new(users: U, posts: P, likes: L, dispatcher: D) -> Self {
        Self {
            gateway: Gateway::new("like", OwnershipPolicy),
            users,
            posts,
            likes,
            dispatcher,
        }
    }

    pub fn like_post(&self, actor: &Actor, post_id: PostId) -> GatewayResult<Like> {
        let (user_id, post_author) = self.prepare(actor, post_id)?;
        provision_user(&self.users, actor)?;
        let like = match self.likes.insert_like(user_id, post_id)? {
            LikeOutcome::Created(like) => like,
            LikeOutcome::AlreadyExists => return Err(GatewayError::conflict(ALREADY_LIKED_MESSAGE)),
        };
        info!(
            "event=like module=like_service status=ok post_id={post_id} like_id={}",
            like.id
        );

        dispatch_best_effort(
            &self.dispatcher,
            &MutationEvent::LikeCreated {
                like: like.clone(),
                post_author,
            },
        );
        Ok(like)
    }

    pub fn unlike_post(&self, actor: &Actor, post_id: PostId) -> GatewayResult<()> {
        let (user_id, _) = self.prepare(actor, post_id)?;
        if !self.likes.delete_like(user_id, post_id)? {
            return Err(GatewayError::conflict(NOT_LIKED_MESSAGE));
        }
        info!("event=unlike module=like_service status=ok post_id={post_id}");
        Ok(())
    }

    pub fn count_likes(&self, actor: &Actor, post_id: PostId) -> GatewayResult<u64> {
        self.gateway.view(actor, || match self.posts.get_post(post_id)? {
            Some(_) => Ok(Some(self.likes.count_likes(post_id)?)),
            None => Ok(None),
        })
    }

    /// Authorizes the caller and resolves the liked post's author.
    fn prepare(&self, actor: &Actor, post_id: PostId) -> GatewayResult<(UserId, UserId)> {
        self.gateway.authorize(actor, Action::Create, None)?;
        let user_id = require_user(actor)?;
        let post = self
            .posts
            .get_post(post_id)?
            .ok_or(GatewayError::NotFound)?;
        Ok((user_id, post.author_id))
    }
}
