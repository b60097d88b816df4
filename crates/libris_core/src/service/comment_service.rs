//! Comment use-case service.
//!
//! # Invariants
//! - A comment on a missing post is a field error on `post`.
//! - A caller unknown to the local user table is recorded before its
//!   first comment.
//! - The post author is notified of comments by other users; a failed
//!   notification never fails the comment.

use crate::auth::OwnershipPolicy;
use crate::model::social::{Comment, CommentId, PostId};
use crate::model::user::Actor;
use crate::repo::comment_repo::{CommentRepository, SqliteCommentRepository};
use crate::repo::notification_repo::SqliteNotificationRepository;
use crate::repo::post_repo::{PostRepository, SqlitePostRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::{RepoError, RepoResult};
use crate::service::gateway::{provision_user, Gateway, GatewayResult, Ownership};
use crate::service::notify::{
    dispatch_best_effort, MutationEvent, NotificationDispatcher, SideEffectDispatcher,
};
use crate::validation::{CommentValidator, RawFields};
use rusqlite::Connection;

pub struct CommentService<
    U: UserRepository,
    P: PostRepository,
    C: CommentRepository,
    D: SideEffectDispatcher,
> {
    gateway: Gateway,
    users: U,
    posts: P,
    comments: C,
    dispatcher: D,
}

impl<'conn>
    CommentService<
        SqliteUserRepository<'conn>,
        SqlitePostRepository<'conn>,
        SqliteCommentRepository<'conn>,
        NotificationDispatcher<SqliteNotificationRepository<'conn>>,
    >
{
    pub fn sqlite(conn: &'conn Connection) -> Self {
        Self::new(
            SqliteUserRepository::new(conn),
            SqlitePostRepository::new(conn),
            SqliteCommentRepository::new(conn),
            NotificationDispatcher::new(SqliteNotificationRepository::new(conn)),
        )
    }
}

impl<U, P, C, D> CommentService<U, P, C, D>
where
    U: UserRepository,
    P: PostRepository,
    C: CommentRepository,
    D: SideEffectDispatcher,
{
    pub fn new(users: U, posts: P, comments: C, dispatcher: D) -> Self {
        Self {
            gateway: Gateway::new("comment", OwnershipPolicy),
            users,
            posts,
            comments,
            dispatcher,
        }
    }

    /// Comments of one post, newest first.
    pub fn list_comments(&self, actor: &Actor, post_id: PostId) -> GatewayResult<Vec<Comment>> {
        self.gateway.list(actor, || {
            if self.posts.get_post(post_id)?.is_none() {
                return Err(RepoError::NotFound {
                    entity: "post",
                    id: post_id,
                });
            }
            self.comments.list_comments(post_id)
        })
    }

    pub fn get_comment(&self, actor: &Actor, id: CommentId) -> GatewayResult<Comment> {
        self.gateway.view(actor, || self.comments.get_comment(id))
    }

    pub fn create_comment(
        &self,
        actor: &Actor,
        post_id: PostId,
        fields: &RawFields,
    ) -> GatewayResult<Comment> {
        let (comment, post_author) =
            self.gateway
                .create(actor, &CommentValidator, fields, |content| {
                    let post = self.posts.get_post(post_id)?.ok_or(
                        RepoError::InvalidReference {
                            field: "post",
                            id: post_id,
                        },
                    )?;
                    let author_id = provision_user(&self.users, actor)?;
                    let comment = self.comments.create_comment(post_id, author_id, &content)?;
                    Ok((comment, post.author_id))
                })?;

        dispatch_best_effort(
            &self.dispatcher,
            &MutationEvent::CommentCreated {
                comment: comment.clone(),
                post_author,
            },
        );
        Ok(comment)
    }

    pub fn update_comment(
        &self,
        actor: &Actor,
        id: CommentId,
        fields: &RawFields,
    ) -> GatewayResult<Comment> {
        self.gateway.update(
            actor,
            id,
            || self.stored(id),
            &CommentValidator,
            fields,
            |content| Ok(self.comments.update_comment(id, &content)?),
        )
    }

    pub fn delete_comment(&self, actor: &Actor, id: CommentId) -> GatewayResult<()> {
        self.gateway
            .delete(actor, id, || self.stored(id), || self.comments.delete_comment(id))
    }

    fn stored(&self, id: CommentId) -> RepoResult<Option<Ownership>> {
        Ok(self
            .comments
            .get_comment(id)?
            .map(|comment| Ownership::OwnedBy(comment.author_id)))
    }
}
