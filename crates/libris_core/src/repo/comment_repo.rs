//! Comment persistence.

use crate::model::social::{Comment, CommentId, PostId};
use crate::model::user::UserId;
use crate::repo::{new_id, uuid_column, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const COMMENT_SELECT_SQL: &str = "SELECT
    id,
    post_id,
    author_id,
    content,
    created_at,
    updated_at
FROM comments";

pub trait CommentRepository {
    /// Fails with [`RepoError::InvalidReference`] on `post` when the post is gone.
    fn create_comment(
        &self,
        post_id: PostId,
        author_id: UserId,
        content: &str,
    ) -> RepoResult<Comment>;
    fn update_comment(&self, id: CommentId, content: &str) -> RepoResult<Comment>;
    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>>;
    /// Comments of one post, newest first.
    fn list_comments(&self, post_id: PostId) -> RepoResult<Vec<Comment>>;
    fn delete_comment(&self, id: CommentId) -> RepoResult<()>;
}

pub struct SqliteCommentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn read_back(&self, id: CommentId) -> RepoResult<Comment> {
        self.get_comment(id)?.ok_or(RepoError::NotFound {
            entity: "comment",
            id,
        })
    }
}

impl CommentRepository for SqliteCommentRepository<'_> {
    fn create_comment(
        &self,
        post_id: PostId,
        author_id: UserId,
        content: &str,
    ) -> RepoResult<Comment> {
        let post_exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM posts WHERE id = ?1);",
            [post_id.to_string()],
            |row| row.get(0),
        )?;
        if post_exists != 1 {
            return Err(RepoError::InvalidReference {
                field: "post",
                id: post_id,
            });
        }

        let id = new_id();
        self.conn.execute(
            "INSERT INTO comments (id, post_id, author_id, content) VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                post_id.to_string(),
                author_id.to_string(),
                content,
            ],
        )?;
        self.read_back(id)
    }

    fn update_comment(&self, id: CommentId, content: &str) -> RepoResult<Comment> {
        let changed = self.conn.execute(
            "UPDATE comments
             SET content = ?2, updated_at = (CAST(unixepoch('subsec') * 1000 AS INTEGER))
             WHERE id = ?1;",
            params![id.to_string(), content],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "comment",
                id,
            });
        }
        self.read_back(id)
    }

    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMMENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_comment_row(row)?));
        }
        Ok(None)
    }

    fn list_comments(&self, post_id: PostId) -> RepoResult<Vec<Comment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COMMENT_SELECT_SQL} WHERE post_id = ?1 ORDER BY created_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([post_id.to_string()])?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next()? {
            comments.push(parse_comment_row(row)?);
        }
        Ok(comments)
    }

    fn delete_comment(&self, id: CommentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM comments WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "comment",
                id,
            });
        }
        Ok(())
    }
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<Comment> {
    Ok(Comment {
        id: uuid_column(row, "id")?,
        post_id: uuid_column(row, "post_id")?,
        author_id: uuid_column(row, "author_id")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
