//! Post use-case service.
//!
//! # Invariants
//! - The author of a new post is the caller, whatever the payload says.
//! - A caller unknown to the local user table is recorded before its
//!   first post.
//! - Update/delete are decided against the stored author.

use crate::auth::OwnershipPolicy;
use crate::model::social::{Post, PostId};
use crate::model::user::Actor;
use crate::repo::post_repo::{PostListQuery, PostRepository, SqlitePostRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::RepoResult;
use crate::service::gateway::{provision_user, require_user, Gateway, GatewayResult, Ownership};
use crate::validation::{PostValidator, RawFields};
use rusqlite::Connection;

pub struct PostService<U: UserRepository, P: PostRepository> {
    gateway: Gateway,
    users: U,
    posts: P,
}

impl<'conn> PostService<SqliteUserRepository<'conn>, SqlitePostRepository<'conn>> {
    pub fn sqlite(conn: &'conn Connection) -> Self {
        Self::new(
            SqliteUserRepository::new(conn),
            SqlitePostRepository::new(conn),
        )
    }
}

impl<U: UserRepository, P: PostRepository> PostService<U, P> {
    pub fn new(users: U, posts: P) -> Self {
        Self {
            gateway: Gateway::new("post", OwnershipPolicy),
            users,
            posts,
        }
    }

    /// Posts matching `query`, newest first.
    pub fn list_posts(&self, actor: &Actor, query: &PostListQuery) -> GatewayResult<Vec<Post>> {
        self.gateway.list(actor, || self.posts.list_posts(query))
    }

    pub fn get_post(&self, actor: &Actor, id: PostId) -> GatewayResult<Post> {
        self.gateway.view(actor, || self.posts.get_post(id))
    }

    pub fn create_post(&self, actor: &Actor, fields: &RawFields) -> GatewayResult<Post> {
        self.gateway.create(actor, &PostValidator, fields, |draft| {
            let author_id = provision_user(&self.users, actor)?;
            Ok(self.posts.create_post(author_id, &draft)?)
        })
    }

    pub fn update_post(&self, actor: &Actor, id: PostId, fields: &RawFields) -> GatewayResult<Post> {
        self.gateway.update(
            actor,
            id,
            || self.stored(id),
            &PostValidator,
            fields,
            |draft| Ok(self.posts.update_post(id, &draft)?),
        )
    }

    /// Deletes the post with its comments, likes, tags and notifications.
    pub fn delete_post(&self, actor: &Actor, id: PostId) -> GatewayResult<()> {
        self.gateway
            .delete(actor, id, || self.stored(id), || self.posts.delete_post(id))
    }

    /// Posts by users the caller follows, newest first.
    pub fn feed(&self, actor: &Actor) -> GatewayResult<Vec<Post>> {
        let user_id = require_user(actor)?;
        let query = PostListQuery {
            followed_by: Some(user_id),
            ..PostListQuery::default()
        };
        self.gateway.list(actor, || self.posts.list_posts(&query))
    }

    fn stored(&self, id: PostId) -> RepoResult<Option<Ownership>> {
        Ok(self
            .posts
            .get_post(id)?
            .map(|post| Ownership::OwnedBy(post.author_id)))
    }
}
