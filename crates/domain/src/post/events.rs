//! Post domain events.

use chrono::{DateTime, Utc};
use event_store::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::CommentId;

/// Events that can occur on a post aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PostEvent {
    /// Post was created and is now active.
    PostCreated(PostCreatedData),

    /// The post's message was replaced.
    MessageUpdated(MessageUpdatedData),

    PostLiked(PostLikedData),

    CommentAdded(CommentAddedData),

    CommentUpdated(CommentUpdatedData),

    CommentRemoved(CommentRemovedData),

    /// Post was removed by its author. Terminal.
    PostRemoved(PostRemovedData),
}

impl DomainEvent for PostEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PostEvent::PostCreated(_) => "PostCreated",
            PostEvent::MessageUpdated(_) => "MessageUpdated",
            PostEvent::PostLiked(_) => "PostLiked",
            PostEvent::CommentAdded(_) => "CommentAdded",
            PostEvent::CommentUpdated(_) => "CommentUpdated",
            PostEvent::CommentRemoved(_) => "CommentRemoved",
            PostEvent::PostRemoved(_) => "PostRemoved",
        }
    }
}

/// Data for PostCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostCreatedData {
    pub post_id: AggregateId,

    /// The user that wrote the post and may remove it.
    pub author: String,

    pub message: String,

    pub date_posted: DateTime<Utc>,
}

/// Data for MessageUpdated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageUpdatedData {
    pub message: String,
}

/// Data for PostLiked event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostLikedData {
    pub liked_at: DateTime<Utc>,
}

/// Data for CommentAdded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentAddedData {
    /// Assigned when the comment is added.
    pub comment_id: CommentId,

    pub comment: String,

    pub username: String,

    pub comment_date: DateTime<Utc>,
}

/// Data for CommentUpdated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentUpdatedData {
    pub comment_id: CommentId,

    pub comment: String,

    /// The user that made the edit.
    pub username: String,

    pub edit_date: DateTime<Utc>,
}

/// Data for CommentRemoved event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRemovedData {
    pub comment_id: CommentId,
}

/// Data for PostRemoved event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRemovedData {
    pub removed_by: String,

    pub removed_at: DateTime<Utc>,
}

impl PostEvent {
    pub fn post_created(
        post_id: AggregateId,
        author: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        PostEvent::PostCreated(PostCreatedData {
            post_id,
            author: author.into(),
            message: message.into(),
            date_posted: Utc::now(),
        })
    }

    pub fn message_updated(message: impl Into<String>) -> Self {
        PostEvent::MessageUpdated(MessageUpdatedData {
            message: message.into(),
        })
    }

    pub fn post_liked() -> Self {
        PostEvent::PostLiked(PostLikedData {
            liked_at: Utc::now(),
        })
    }

    pub fn comment_added(
        comment_id: CommentId,
        comment: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        PostEvent::CommentAdded(CommentAddedData {
            comment_id,
            comment: comment.into(),
            username: username.into(),
            comment_date: Utc::now(),
        })
    }

    pub fn comment_updated(
        comment_id: CommentId,
        comment: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        PostEvent::CommentUpdated(CommentUpdatedData {
            comment_id,
            comment: comment.into(),
            username: username.into(),
            edit_date: Utc::now(),
        })
    }

    pub fn comment_removed(comment_id: CommentId) -> Self {
        PostEvent::CommentRemoved(CommentRemovedData { comment_id })
    }

    pub fn post_removed(removed_by: impl Into<String>) -> Self {
        PostEvent::PostRemoved(PostRemovedData {
            removed_by: removed_by.into(),
            removed_at: Utc::now(),
        })
    }
}
