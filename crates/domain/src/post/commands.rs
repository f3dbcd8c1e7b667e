//! Post commands.

use event_store::AggregateId;
use serde::{Deserialize, Serialize};

use crate::command::Command;

use super::{CommentId, Post};

/// Command to create a new post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePost {
    /// The id the new post is created under.
    pub post_id: AggregateId,

    pub author: String,

    pub message: String,
}

impl CreatePost {
    pub fn new(post_id: AggregateId, author: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            post_id,
            author: author.into(),
            message: message.into(),
        }
    }
}

/// Command to replace a post's message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditMessage {
    pub post_id: AggregateId,
    pub message: String,
}

impl EditMessage {
    pub fn new(post_id: AggregateId, message: impl Into<String>) -> Self {
        Self {
            post_id,
            message: message.into(),
        }
    }
}

/// Command to like a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikePost {
    pub post_id: AggregateId,
}

impl LikePost {
    pub fn new(post_id: AggregateId) -> Self {
        Self { post_id }
    }
}

/// Command to comment on a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddComment {
    pub post_id: AggregateId,
    pub username: String,
    pub comment: String,
}

impl AddComment {
    pub fn new(post_id: AggregateId, username: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            post_id,
            username: username.into(),
            comment: comment.into(),
        }
    }
}

/// Command to change the text of an existing comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditComment {
    pub post_id: AggregateId,
    pub comment_id: CommentId,

    /// Must match the comment's author.
    pub username: String,

    pub comment: String,
}

impl EditComment {
    pub fn new(
        post_id: AggregateId,
        comment_id: CommentId,
        username: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            post_id,
            comment_id,
            username: username.into(),
            comment: comment.into(),
        }
    }
}

/// Command to delete a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveComment {
    pub post_id: AggregateId,
    pub comment_id: CommentId,

    /// Must match the comment's author.
    pub username: String,
}

impl RemoveComment {
    pub fn new(post_id: AggregateId, comment_id: CommentId, username: impl Into<String>) -> Self {
        Self {
            post_id,
            comment_id,
            username: username.into(),
        }
    }
}

/// Command to remove a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovePost {
    pub post_id: AggregateId,

    /// Must match the post's author.
    pub username: String,
}

impl RemovePost {
    pub fn new(post_id: AggregateId, username: impl Into<String>) -> Self {
        Self {
            post_id,
            username: username.into(),
        }
    }
}

/// Tag the dispatcher routes post commands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    CreatePost,
    EditMessage,
    LikePost,
    AddComment,
    EditComment,
    RemoveComment,
    RemovePost,
}

impl CommandKind {
    pub const ALL: [CommandKind; 7] = [
        CommandKind::CreatePost,
        CommandKind::EditMessage,
        CommandKind::LikePost,
        CommandKind::AddComment,
        CommandKind::EditComment,
        CommandKind::RemoveComment,
        CommandKind::RemovePost,
    ];
}

/// Any command against a post.
///
/// Serialized with a `command` field naming the variant, e.g.
/// `{"command": "LikePost", "post_id": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command")]
pub enum PostCommand {
    CreatePost(CreatePost),
    EditMessage(EditMessage),
    LikePost(LikePost),
    AddComment(AddComment),
    EditComment(EditComment),
    RemoveComment(RemoveComment),
    RemovePost(RemovePost),
}

impl Command for PostCommand {
    type Aggregate = Post;
    type Kind = CommandKind;

    fn kind(&self) -> CommandKind {
        match self {
            PostCommand::CreatePost(_) => CommandKind::CreatePost,
            PostCommand::EditMessage(_) => CommandKind::EditMessage,
            PostCommand::LikePost(_) => CommandKind::LikePost,
            PostCommand::AddComment(_) => CommandKind::AddComment,
            PostCommand::EditComment(_) => CommandKind::EditComment,
            PostCommand::RemoveComment(_) => CommandKind::RemoveComment,
            PostCommand::RemovePost(_) => CommandKind::RemovePost,
        }
    }

    fn aggregate_id(&self) -> AggregateId {
        match self {
            PostCommand::CreatePost(cmd) => cmd.post_id,
            PostCommand::EditMessage(cmd) => cmd.post_id,
            PostCommand::LikePost(cmd) => cmd.post_id,
            PostCommand::AddComment(cmd) => cmd.post_id,
            PostCommand::EditComment(cmd) => cmd.post_id,
            PostCommand::RemoveComment(cmd) => cmd.post_id,
            PostCommand::RemovePost(cmd) => cmd.post_id,
        }
    }
}

impl From<CreatePost> for PostCommand {
    fn from(cmd: CreatePost) -> Self {
        PostCommand::CreatePost(cmd)
    }
}

impl From<EditMessage> for PostCommand {
    fn from(cmd: EditMessage) -> Self {
        PostCommand::EditMessage(cmd)
    }
}

impl From<LikePost> for PostCommand {
    fn from(cmd: LikePost) -> Self {
        PostCommand::LikePost(cmd)
    }
}

impl From<AddComment> for PostCommand {
    fn from(cmd: AddComment) -> Self {
        PostCommand::AddComment(cmd)
    }
}

impl From<EditComment> for PostCommand {
    fn from(cmd: EditComment) -> Self {
        PostCommand::EditComment(cmd)
    }
}

impl From<RemoveComment> for PostCommand {
    fn from(cmd: RemoveComment) -> Self {
        PostCommand::RemoveComment(cmd)
    }
}

impl From<RemovePost> for PostCommand {
    fn from(cmd: RemovePost) -> Self {
        PostCommand::RemovePost(cmd)
    }
}
