//! Follow-graph persistence.

use crate::model::user::UserId;
use crate::repo::{uuid_column, RepoResult};
use rusqlite::{params, Connection};

pub trait FollowRepository {
    /// Returns `false` when the pair already existed.
    fn follow(&self, follower_id: UserId, followed_id: UserId) -> RepoResult<bool>;
    /// Returns `false` when there was nothing to remove.
    fn unfollow(&self, follower_id: UserId, followed_id: UserId) -> RepoResult<bool>;
    /// Users followed by `follower_id`, oldest follow first.
    fn list_following(&self, follower_id: UserId) -> RepoResult<Vec<UserId>>;
}

pub struct SqliteFollowRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFollowRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl FollowRepository for SqliteFollowRepository<'_> {
    fn follow(&self, follower_id: UserId, followed_id: UserId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "INSERT INTO follows (follower_id, followed_id) VALUES (?1, ?2)
             ON CONFLICT (follower_id, followed_id) DO NOTHING;",
            params![follower_id.to_string(), followed_id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn unfollow(&self, follower_id: UserId, followed_id: UserId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM follows WHERE follower_id = ?1 AND followed_id = ?2;",
            params![follower_id.to_string(), followed_id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn list_following(&self, follower_id: UserId) -> RepoResult<Vec<UserId>> {
        let mut stmt = self.conn.prepare(
            "SELECT followed_id FROM follows
             WHERE follower_id = ?1
             ORDER BY created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([follower_id.to_string()])?;
        let mut followed = Vec::new();
        while let Some(row) = rows.next()? {
            followed.push(uuid_column(row, "followed_id")?);
        }
        Ok(followed)
    }
}
