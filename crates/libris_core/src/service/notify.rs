//! Side effects derived from successful mutations.
//!
//! # Responsibility
//! - Map mutation events to notification rows.
//! - Keep side-effect failures away from the primary mutation's outcome.
//!
//! # Invariants
//! - No notification is produced when the actor is also the recipient.
//! - Dispatch runs only after the primary write succeeded.
//! - [`dispatch_best_effort`] never returns an error; failures are logged.

use crate::model::social::{Comment, Like, Notification, NotificationTarget};
use crate::model::user::UserId;
use crate::repo::notification_repo::{NewNotification, NotificationRepository};
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const VERB_LIKED: &str = "liked your post";
pub const VERB_COMMENTED: &str = "commented on your post";
pub const VERB_FOLLOWED: &str = "started following you";

/// Committed mutation that may fan out into side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationEvent {
    LikeCreated { like: Like, post_author: UserId },
    CommentCreated { comment: Comment, post_author: UserId },
    FollowCreated { follower: UserId, followed: UserId },
}

impl MutationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LikeCreated { .. } => "like_created",
            Self::CommentCreated { .. } => "comment_created",
            Self::FollowCreated { .. } => "follow_created",
        }
    }

    /// Notification this event asks for, `None` on self-interaction.
    pub fn notification(&self) -> Option<NewNotification> {
        let notification = match self {
            Self::LikeCreated { like, post_author } => NewNotification {
                recipient_id: *post_author,
                actor_id: like.user_id,
                verb: VERB_LIKED.to_string(),
                target: NotificationTarget::Post(like.post_id),
            },
            Self::CommentCreated {
                comment,
                post_author,
            } => NewNotification {
                recipient_id: *post_author,
                actor_id: comment.author_id,
                verb: VERB_COMMENTED.to_string(),
                target: NotificationTarget::Post(comment.post_id),
            },
            Self::FollowCreated { follower, followed } => NewNotification {
                recipient_id: *followed,
                actor_id: *follower,
                verb: VERB_FOLLOWED.to_string(),
                target: NotificationTarget::User(*followed),
            },
        };
        (notification.recipient_id != notification.actor_id).then_some(notification)
    }
}

/// Side-effect failure.
#[derive(Debug)]
pub enum DispatchError {
    Repo(RepoError),
    /// Refusal from a dispatcher that does not write through a repository,
    /// such as one forwarding events to an external queue.
    Rejected(String),
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Rejected(reason) => write!(f, "dispatch rejected: {reason}"),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Rejected(_) => None,
        }
    }
}

impl From<RepoError> for DispatchError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Consumer of committed mutation events.
pub trait SideEffectDispatcher {
    /// Returns the notification written, if any.
    fn dispatch(&self, event: &MutationEvent) -> Result<Option<Notification>, DispatchError>;
}

impl<D: SideEffectDispatcher + ?Sized> SideEffectDispatcher for &D {
    fn dispatch(&self, event: &MutationEvent) -> Result<Option<Notification>, DispatchError> {
        (**self).dispatch(event)
    }
}

/// Writes one notification row per event.
pub struct NotificationDispatcher<N: NotificationRepository> {
    notifications: N,
}

impl<N: NotificationRepository> NotificationDispatcher<N> {
    pub fn new(notifications: N) -> Self {
        Self { notifications }
    }
}

impl<N: NotificationRepository> SideEffectDispatcher for NotificationDispatcher<N> {
    fn dispatch(&self, event: &MutationEvent) -> Result<Option<Notification>, DispatchError> {
        let Some(notification) = event.notification() else {
            return Ok(None);
        };
        let created = self.notifications.create_notification(&notification)?;
        info!(
            "event=notify module=dispatcher status=ok trigger={} notification_id={}",
            event.name(),
            created.id
        );
        Ok(Some(created))
    }
}

/// Runs `dispatcher` and swallows its failure after logging it.
pub fn dispatch_best_effort(dispatcher: &impl SideEffectDispatcher, event: &MutationEvent) {
    if let Err(err) = dispatcher.dispatch(event) {
        warn!(
            "event=notify module=dispatcher status=error trigger={} error={err}",
            event.name()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{MutationEvent, VERB_FOLLOWED, VERB_LIKED};
    use crate::model::social::{Like, NotificationTarget};
    use uuid::Uuid;

    fn like(user_id: Uuid, post_id: Uuid) -> Like {
        Like {
            id: Uuid::new_v4(),
            user_id,
            post_id,
            created_at: 0,
        }
    }

    #[test]
    fn like_notifies_post_author() {
        let (liker, author, post) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let event = MutationEvent::LikeCreated {
            like: like(liker, post),
            post_author: author,
        };
        let notification = event.notification().expect("notification expected");
        assert_eq!(notification.recipient_id, author);
        assert_eq!(notification.actor_id, liker);
        assert_eq!(notification.verb, VERB_LIKED);
        assert_eq!(notification.target, NotificationTarget::Post(post));
    }

    #[test]
    fn self_like_produces_nothing() {
        let (author, post) = (Uuid::new_v4(), Uuid::new_v4());
        let event = MutationEvent::LikeCreated {
            like: like(author, post),
            post_author: author,
        };
        assert!(event.notification().is_none());
    }

    #[test]
    fn follow_targets_followed_user() {
        let (follower, followed) = (Uuid::new_v4(), Uuid::new_v4());
        let notification = MutationEvent::FollowCreated { follower, followed }
            .notification()
            .expect("notification expected");
        assert_eq!(notification.verb, VERB_FOLLOWED);
        assert_eq!(notification.target, NotificationTarget::User(followed));
    }
}
