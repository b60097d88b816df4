//! Post and post-tag persistence.
//!
//! # Invariants
//! - Tag sets are replaced atomically with the post row.
//! - Lists are ordered newest first (`created_at DESC`, insertion order as
//!   tie-breaker).
//! - Deleting a post deletes, in one transaction, its comments, likes, tags
//!   and every notification targeting it.

use crate::model::social::{Post, PostId};
use crate::model::user::UserId;
use crate::repo::{like_pattern, new_id, uuid_column, RepoError, RepoResult};
use crate::validation::PostDraft;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const POST_SELECT_SQL: &str = "SELECT
    posts.id AS id,
    posts.title AS title,
    posts.content AS content,
    posts.author_id AS author_id,
    posts.created_at AS created_at,
    posts.updated_at AS updated_at
FROM posts";

/// Query options for listing posts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostListQuery {
    /// Case-insensitive substring over title and content.
    pub search: Option<String>,
    /// Exact (normalized) tag match.
    pub tag: Option<String>,
    /// Restrict to posts written by users this user follows.
    pub followed_by: Option<UserId>,
    pub limit: Option<u32>,
}

pub trait PostRepository {
    fn create_post(&self, author_id: UserId, draft: &PostDraft) -> RepoResult<Post>;
    /// Replaces title, content and tags; the author never changes.
    fn update_post(&self, id: PostId, draft: &PostDraft) -> RepoResult<Post>;
    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>>;
    fn list_posts(&self, query: &PostListQuery) -> RepoResult<Vec<Post>>;
    fn delete_post(&self, id: PostId) -> RepoResult<()>;
}

pub struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn read_back(&self, id: PostId) -> RepoResult<Post> {
        self.get_post(id)?
            .ok_or(RepoError::NotFound { entity: "post", id })
    }

    fn parse_post_row(&self, row: &Row<'_>) -> RepoResult<Post> {
        let id = uuid_column(row, "id")?;
        Ok(Post {
            id,
            title: row.get("title")?,
            content: row.get("content")?,
            author_id: uuid_column(row, "author_id")?,
            tags: load_tags_for_post(self.conn, id)?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn create_post(&self, author_id: UserId, draft: &PostDraft) -> RepoResult<Post> {
        let id = new_id();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO posts (id, title, content, author_id) VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                draft.title.as_str(),
                draft.content.as_str(),
                author_id.to_string(),
            ],
        )?;
        replace_tags(&tx, id, &draft.tags)?;
        tx.commit()?;
        self.read_back(id)
    }

    fn update_post(&self, id: PostId, draft: &PostDraft) -> RepoResult<Post> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE posts
             SET
                title = ?2,
                content = ?3,
                updated_at = (CAST(unixepoch('subsec') * 1000 AS INTEGER))
             WHERE id = ?1;",
            params![id.to_string(), draft.title.as_str(), draft.content.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "post", id });
        }
        replace_tags(&tx, id, &draft.tags)?;
        tx.commit()?;
        self.read_back(id)
    }

    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POST_SELECT_SQL} WHERE posts.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.parse_post_row(row)?));
        }
        Ok(None)
    }

    fn list_posts(&self, query: &PostListQuery) -> RepoResult<Vec<Post>> {
        let mut sql = format!("{POST_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(search) = query.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                let pattern = like_pattern(search);
                sql.push_str(
                    " AND (posts.title LIKE ? ESCAPE '\\' OR posts.content LIKE ? ESCAPE '\\')",
                );
                bind_values.push(Value::Text(pattern.clone()));
                bind_values.push(Value::Text(pattern));
            }
        }

        if let Some(tag) = query.tag.as_ref() {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1 FROM post_tags
                    WHERE post_tags.post_id = posts.id AND post_tags.tag = ?
                )",
            );
            bind_values.push(Value::Text(tag.clone()));
        }

        if let Some(follower_id) = query.followed_by {
            sql.push_str(
                " AND posts.author_id IN (
                    SELECT followed_id FROM follows WHERE follower_id = ?
                )",
            );
            bind_values.push(Value::Text(follower_id.to_string()));
        }

        sql.push_str(" ORDER BY posts.created_at DESC, posts.rowid DESC");
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next()? {
            posts.push(self.parse_post_row(row)?);
        }
        Ok(posts)
    }

    fn delete_post(&self, id: PostId) -> RepoResult<()> {
        let id_text = id.to_string();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM notifications WHERE target_kind = 'post' AND target_id = ?1;",
            [id_text.as_str()],
        )?;
        tx.execute("DELETE FROM likes WHERE post_id = ?1;", [id_text.as_str()])?;
        tx.execute("DELETE FROM comments WHERE post_id = ?1;", [id_text.as_str()])?;
        tx.execute("DELETE FROM post_tags WHERE post_id = ?1;", [id_text.as_str()])?;
        let changed = tx.execute("DELETE FROM posts WHERE id = ?1;", [id_text.as_str()])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "post", id });
        }
        tx.commit()?;
        Ok(())
    }
}

fn replace_tags(conn: &Connection, post_id: PostId, tags: &[String]) -> RepoResult<()> {
    let post_id = post_id.to_string();
    conn.execute(
        "DELETE FROM post_tags WHERE post_id = ?1;",
        [post_id.as_str()],
    )?;
    for tag in tags {
        conn.execute(
            "INSERT OR IGNORE INTO post_tags (post_id, tag) VALUES (?1, ?2);",
            params![post_id.as_str(), tag.as_str()],
        )?;
    }
    Ok(())
}

fn load_tags_for_post(conn: &Connection, post_id: PostId) -> RepoResult<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT tag FROM post_tags WHERE post_id = ?1 ORDER BY tag ASC;")?;
    let mut rows = stmt.query([post_id.to_string()])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get(0)?);
    }
    Ok(tags)
}
