//! Like persistence.
//!
//! # Invariants
//! - `UNIQUE(user_id, post_id)` is enforced by the store. The insert is a
//!   single `ON CONFLICT DO NOTHING` statement, so of two concurrent likes
//!   of the same pair exactly one observes [`LikeOutcome::Created`].

use crate::model::social::{Like, PostId};
use crate::model::user::UserId;
use crate::repo::{new_id, uuid_column, RepoResult};
use rusqlite::{params, Connection};

/// Result of a like insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeOutcome {
    Created(Like),
    AlreadyExists,
}

pub trait LikeRepository {
    fn insert_like(&self, user_id: UserId, post_id: PostId) -> RepoResult<LikeOutcome>;
    /// Returns whether a like was removed.
    fn delete_like(&self, user_id: UserId, post_id: PostId) -> RepoResult<bool>;
    fn get_like(&self, user_id: UserId, post_id: PostId) -> RepoResult<Option<Like>>;
    fn count_likes(&self, post_id: PostId) -> RepoResult<u64>;
}

pub struct SqliteLikeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLikeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl LikeRepository for SqliteLikeRepository<'_> {
    fn insert_like(&self, user_id: UserId, post_id: PostId) -> RepoResult<LikeOutcome> {
        let changed = self.conn.execute(
            "INSERT INTO likes (id, user_id, post_id) VALUES (?1, ?2, ?3)
             ON CONFLICT (user_id, post_id) DO NOTHING;",
            params![
                new_id().to_string(),
                user_id.to_string(),
                post_id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Ok(LikeOutcome::AlreadyExists);
        }

        match self.get_like(user_id, post_id)? {
            Some(like) => Ok(LikeOutcome::Created(like)),
            // Unliked between insert and read-back.
            None => Ok(LikeOutcome::AlreadyExists),
        }
    }

    fn delete_like(&self, user_id: UserId, post_id: PostId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM likes WHERE user_id = ?1 AND post_id = ?2;",
            params![user_id.to_string(), post_id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn get_like(&self, user_id: UserId, post_id: PostId) -> RepoResult<Option<Like>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, post_id, created_at
             FROM likes
             WHERE user_id = ?1 AND post_id = ?2;",
        )?;
        let mut rows = stmt.query(params![user_id.to_string(), post_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(Like {
                id: uuid_column(row, "id")?,
                user_id: uuid_column(row, "user_id")?,
                post_id: uuid_column(row, "post_id")?,
                created_at: row.get("created_at")?,
            }));
        }
        Ok(None)
    }

    fn count_likes(&self, post_id: PostId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM likes WHERE post_id = ?1;",
            [post_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}
