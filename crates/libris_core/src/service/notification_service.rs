//! Read access to the caller's own notifications.

use crate::auth::OwnershipPolicy;
use crate::model::social::Notification;
use crate::model::user::Actor;
use crate::repo::notification_repo::{NotificationRepository, SqliteNotificationRepository};
use crate::service::gateway::{require_user, Gateway, GatewayResult};
use rusqlite::Connection;

pub struct NotificationService<N: NotificationRepository> {
    gateway: Gateway,
    notifications: N,
}

impl<'conn> NotificationService<SqliteNotificationRepository<'conn>> {
    pub fn sqlite(conn: &'conn Connection) -> Self {
        Self::new(SqliteNotificationRepository::new(conn))
    }
}

impl<N: NotificationRepository> NotificationService<N> {
    pub fn new(notifications: N) -> Self {
        Self {
            gateway: Gateway::new("notification", OwnershipPolicy),
            notifications,
        }
    }

    /// Notifications addressed to the caller, newest first.
    pub fn list_notifications(&self, actor: &Actor) -> GatewayResult<Vec<Notification>> {
        let recipient = require_user(actor)?;
        self.gateway
            .list(actor, || self.notifications.list_for_recipient(recipient))
    }
}
