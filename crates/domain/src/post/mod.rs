//! Post aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod handler;
mod value_objects;

pub use aggregate::Post;
pub use commands::*;
pub use events::{
    CommentAddedData, CommentRemovedData, CommentUpdatedData, MessageUpdatedData, PostCreatedData,
    PostEvent, PostLikedData, PostRemovedData,
};
pub use handler::{PostCommandHandler, post_dispatcher};
pub use value_objects::{Comment, CommentId, same_user};

use thiserror::Error;

/// Business rule violations on a post.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PostError {
    /// The post was never created or has been removed.
    #[error("inactive post")]
    InactivePost,

    #[error("not comment owner")]
    NotCommentOwner,

    #[error("not post owner")]
    NotPostOwner,

    /// A required text value was empty.
    #[error("empty value: {field}")]
    EmptyValue { field: &'static str },

    #[error("comment not found: {comment_id}")]
    CommentNotFound { comment_id: CommentId },

    #[error("post already created")]
    AlreadyCreated,
}
