//! Social records: posts, comments, likes, follows and notifications.
//!
//! # Invariants
//! - At most one like per `(user, post)` pair.
//! - A notification never has `recipient == actor`.
//! - Post tags are lowercase and unique per post.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PostId = Uuid;
pub type CommentId = Uuid;
pub type LikeId = Uuid;
pub type NotificationId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    #[serde(rename = "author")]
    pub author_id: UserId,
    /// Sorted ascending.
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    #[serde(rename = "post")]
    pub post_id: PostId,
    #[serde(rename = "author")]
    pub author_id: UserId,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: LikeId,
    #[serde(rename = "user")]
    pub user_id: UserId,
    #[serde(rename = "post")]
    pub post_id: PostId,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub follower_id: UserId,
    pub followed_id: UserId,
}

/// Entity a notification points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NotificationTarget {
    Post(PostId),
    User(UserId),
}

impl NotificationTarget {
    /// Stable kind string stored in `notifications.target_kind`.
    pub fn kind(self) -> &'static str {
        match self {
            Self::Post(_) => "post",
            Self::User(_) => "user",
        }
    }

    pub fn id(self) -> Uuid {
        match self {
            Self::Post(id) | Self::User(id) => id,
        }
    }

    /// Rebuilds a target from its stored kind and id.
    pub fn from_parts(kind: &str, id: Uuid) -> Option<Self> {
        match kind {
            "post" => Some(Self::Post(id)),
            "user" => Some(Self::User(id)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    #[serde(rename = "recipient")]
    pub recipient_id: UserId,
    #[serde(rename = "actor")]
    pub actor_id: UserId,
    pub verb: String,
    pub target: NotificationTarget,
    pub created_at: i64,
}
