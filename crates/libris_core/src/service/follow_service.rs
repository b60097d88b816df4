//! Follow/unfollow use-case service.

use crate::auth::{Action, OwnershipPolicy};
use crate::model::user::{Actor, UserId};
use crate::repo::follow_repo::{FollowRepository, SqliteFollowRepository};
use crate::repo::notification_repo::SqliteNotificationRepository;
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::service::gateway::{
    provision_user, require_user, Gateway, GatewayError, GatewayResult,
};
use crate::service::notify::{
    dispatch_best_effort, MutationEvent, NotificationDispatcher, SideEffectDispatcher,
};
use log::info;
use rusqlite::Connection;

pub const SELF_FOLLOW_MESSAGE: &str = "You cannot follow yourself";
pub const ALREADY_FOLLOWING_MESSAGE: &str = "You are already following this user";
pub const NOT_FOLLOWING_MESSAGE: &str = "You are not following this user";

pub struct FollowService<U: UserRepository, F: FollowRepository, D: SideEffectDispatcher> {
    gateway: Gateway,
    users: U,
    follows: F,
    dispatcher: D,
}

impl<'conn>
    FollowService<
        SqliteUserRepository<'conn>,
        SqliteFollowRepository<'conn>,
        NotificationDispatcher<SqliteNotificationRepository<'conn>>,
    >
{
    pub fn sqlite(conn: &'conn Connection) -> Self {
        Self::new(
            SqliteUserRepository::new(conn),
            SqliteFollowRepository::new(conn),
            NotificationDispatcher::new(SqliteNotificationRepository::new(conn)),
        )
    }
}

impl<U: UserRepository, F: FollowRepository, D: SideEffectDispatcher> FollowService<U, F, D> {
    pub fn new(users: U, follows: F, dispatcher: D) -> Self {
        Self {
            gateway: Gateway::new("follow", OwnershipPolicy),
            users,
            follows,
            dispatcher,
        }
    }

    pub fn follow(&self, actor: &Actor, target: UserId) -> GatewayResult<()> {
        let follower = self.prepare(actor, target)?;
        if follower == target {
            return Err(GatewayError::conflict(SELF_FOLLOW_MESSAGE));
        }
        provision_user(&self.users, actor)?;
        if !self.follows.follow(follower, target)? {
            return Err(GatewayError::conflict(ALREADY_FOLLOWING_MESSAGE));
        }
        info!("event=follow module=follow_service status=ok followed_id={target}");

        dispatch_best_effort(
            &self.dispatcher,
            &MutationEvent::FollowCreated {
                follower,
                followed: target,
            },
        );
        Ok(())
    }

    pub fn unfollow(&self, actor: &Actor, target: UserId) -> GatewayResult<()> {
        let follower = self.prepare(actor, target)?;
        if !self.follows.unfollow(follower, target)? {
            return Err(GatewayError::conflict(NOT_FOLLOWING_MESSAGE));
        }
        info!("event=unfollow module=follow_service status=ok followed_id={target}");
        Ok(())
    }

    /// Ids of the users the caller follows.
    pub fn following(&self, actor: &Actor) -> GatewayResult<Vec<UserId>> {
        let user_id = require_user(actor)?;
        self.gateway
            .list(actor, || self.follows.list_following(user_id))
    }

    fn prepare(&self, actor: &Actor, target: UserId) -> GatewayResult<UserId> {
        self.gateway.authorize(actor, Action::Create, None)?;
        let follower = require_user(actor)?;
        if self.users.get_user(target)?.is_none() {
            return Err(GatewayError::NotFound);
        }
        Ok(follower)
    }
}
