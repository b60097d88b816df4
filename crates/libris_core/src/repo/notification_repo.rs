//! Notification persistence. Rows are only written by the side-effect
//! dispatcher; clients can list them but never mutate them.

use crate::model::social::{Notification, NotificationTarget};
use crate::model::user::UserId;
use crate::repo::{new_id, uuid_column, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

/// Values for one notification row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient_id: UserId,
    pub actor_id: UserId,
    pub verb: String,
    pub target: NotificationTarget,
}

pub trait NotificationRepository {
    fn create_notification(&self, notification: &NewNotification) -> RepoResult<Notification>;
    /// Notifications addressed to `recipient_id`, newest first.
    fn list_for_recipient(&self, recipient_id: UserId) -> RepoResult<Vec<Notification>>;
}

pub struct SqliteNotificationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNotificationRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NotificationRepository for SqliteNotificationRepository<'_> {
    fn create_notification(&self, notification: &NewNotification) -> RepoResult<Notification> {
        let id = new_id();
        self.conn.execute(
            "INSERT INTO notifications (id, recipient_id, actor_id, verb, target_kind, target_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id.to_string(),
                notification.recipient_id.to_string(),
                notification.actor_id.to_string(),
                notification.verb.as_str(),
                notification.target.kind(),
                notification.target.id().to_string(),
            ],
        )?;

        let created_at: i64 = self.conn.query_row(
            "SELECT created_at FROM notifications WHERE id = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(Notification {
            id,
            recipient_id: notification.recipient_id,
            actor_id: notification.actor_id,
            verb: notification.verb.clone(),
            target: notification.target,
            created_at,
        })
    }

    fn list_for_recipient(&self, recipient_id: UserId) -> RepoResult<Vec<Notification>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, recipient_id, actor_id, verb, target_kind, target_id, created_at
             FROM notifications
             WHERE recipient_id = ?1
             ORDER BY created_at DESC, rowid DESC;",
        )?;
        let mut rows = stmt.query([recipient_id.to_string()])?;
        let mut notifications = Vec::new();
        while let Some(row) = rows.next()? {
            notifications.push(parse_notification_row(row)?);
        }
        Ok(notifications)
    }
}

fn parse_notification_row(row: &Row<'_>) -> RepoResult<Notification> {
    let kind: String = row.get("target_kind")?;
    let target_id = uuid_column(row, "target_id")?;
    let target = NotificationTarget::from_parts(&kind, target_id).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid target kind `{kind}` in notifications.target_kind"
        ))
    })?;

    Ok(Notification {
        id: uuid_column(row, "id")?,
        recipient_id: uuid_column(row, "recipient_id")?,
        actor_id: uuid_column(row, "actor_id")?,
        verb: row.get("verb")?,
        target,
        created_at: row.get("created_at")?,
    })
}
