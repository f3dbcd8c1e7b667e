//! Command handler for posts.

use std::sync::Arc;

use async_trait::async_trait;
use event_store::EventStore;

use crate::command::{CommandDispatcher, CommandHandler, CommandResult, DispatchError};
use crate::error::DomainError;
use crate::sourcing::EventSourcingHandler;

use super::{
    AddComment, CommandKind, CreatePost, EditComment, EditMessage, LikePost, Post, PostCommand,
    RemoveComment, RemovePost,
};

/// Handles every post command.
///
/// Creation loads through the fresh-aggregate path; all other commands need
/// the post to have history and fail with `AggregateNotFound` otherwise.
pub struct PostCommandHandler<S: EventStore> {
    sourcing: EventSourcingHandler<S, Post>,
}

impl<S: EventStore> PostCommandHandler<S> {
    pub fn new(store: S) -> Self {
        Self {
            sourcing: EventSourcingHandler::new(store),
        }
    }

    /// Returns a reference to the underlying orchestrator.
    pub fn sourcing(&self) -> &EventSourcingHandler<S, Post> {
        &self.sourcing
    }

    #[tracing::instrument(skip(self, cmd), fields(post_id = %cmd.post_id))]
    pub async fn create_post(&self, cmd: CreatePost) -> Result<CommandResult<Post>, DomainError> {
        let CreatePost {
            post_id,
            author,
            message,
        } = cmd;

        self.sourcing
            .execute(post_id, |post| post.create(post_id, author, message))
            .await
    }

    #[tracing::instrument(skip(self, cmd), fields(post_id = %cmd.post_id))]
    pub async fn edit_message(&self, cmd: EditMessage) -> Result<CommandResult<Post>, DomainError> {
        let message = cmd.message;

        self.sourcing
            .execute_existing(cmd.post_id, |post| post.edit_message(message))
            .await
    }

    #[tracing::instrument(skip(self, cmd), fields(post_id = %cmd.post_id))]
    pub async fn like_post(&self, cmd: LikePost) -> Result<CommandResult<Post>, DomainError> {
        self.sourcing
            .execute_existing(cmd.post_id, |post| post.like())
            .await
    }

    #[tracing::instrument(skip(self, cmd), fields(post_id = %cmd.post_id))]
    pub async fn add_comment(&self, cmd: AddComment) -> Result<CommandResult<Post>, DomainError> {
        let AddComment {
            post_id,
            username,
            comment,
        } = cmd;

        self.sourcing
            .execute_existing(post_id, |post| {
                post.add_comment(comment, username).map(|_| ())
            })
            .await
    }

    #[tracing::instrument(skip(self, cmd), fields(post_id = %cmd.post_id, comment_id = %cmd.comment_id))]
    pub async fn edit_comment(&self, cmd: EditComment) -> Result<CommandResult<Post>, DomainError> {
        let EditComment {
            post_id,
            comment_id,
            username,
            comment,
        } = cmd;

        self.sourcing
            .execute_existing(post_id, |post| {
                post.edit_comment(comment_id, &username, comment)
            })
            .await
    }

    #[tracing::instrument(skip(self, cmd), fields(post_id = %cmd.post_id, comment_id = %cmd.comment_id))]
    pub async fn remove_comment(
        &self,
        cmd: RemoveComment,
    ) -> Result<CommandResult<Post>, DomainError> {
        let RemoveComment {
            post_id,
            comment_id,
            username,
        } = cmd;

        self.sourcing
            .execute_existing(post_id, |post| post.remove_comment(comment_id, &username))
            .await
    }

    #[tracing::instrument(skip(self, cmd), fields(post_id = %cmd.post_id))]
    pub async fn remove_post(&self, cmd: RemovePost) -> Result<CommandResult<Post>, DomainError> {
        let RemovePost { post_id, username } = cmd;

        self.sourcing
            .execute_existing(post_id, |post| post.remove(&username))
            .await
    }
}

#[async_trait]
impl<S: EventStore + 'static> CommandHandler<PostCommand> for PostCommandHandler<S> {
    async fn handle(&self, command: PostCommand) -> Result<CommandResult<Post>, DomainError> {
        match command {
            PostCommand::CreatePost(cmd) => self.create_post(cmd).await,
            PostCommand::EditMessage(cmd) => self.edit_message(cmd).await,
            PostCommand::LikePost(cmd) => self.like_post(cmd).await,
            PostCommand::AddComment(cmd) => self.add_comment(cmd).await,
            PostCommand::EditComment(cmd) => self.edit_comment(cmd).await,
            PostCommand::RemoveComment(cmd) => self.remove_comment(cmd).await,
            PostCommand::RemovePost(cmd) => self.remove_post(cmd).await,
        }
    }
}

/// Builds a dispatcher with one shared post handler registered for every
/// post command kind.
pub fn post_dispatcher<S: EventStore + 'static>(
    store: S,
) -> Result<CommandDispatcher<PostCommand>, DispatchError> {
    let handler: Arc<dyn CommandHandler<PostCommand>> = Arc::new(PostCommandHandler::new(store));

    let mut builder = CommandDispatcher::builder();
    for kind in CommandKind::ALL {
        builder.register(kind, handler.clone())?;
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use event_store::{AggregateId, EventStoreExt, InMemoryEventStore, Version};

    use super::*;
    use crate::aggregate::Aggregate;
    use crate::post::{PostError, PostEvent};

    #[tokio::test]
    async fn create_then_like() {
        let handler = PostCommandHandler::new(InMemoryEventStore::in_memory());
        let post_id = AggregateId::new();

        handler
            .create_post(CreatePost::new(post_id, "alice", "hello"))
            .await
            .unwrap();
        let result = handler.like_post(LikePost::new(post_id)).await.unwrap();

        assert_eq!(result.new_version, Version::new(2));
        assert_eq!(result.aggregate.likes(), 1);
        assert!(matches!(result.events.as_slice(), [PostEvent::PostLiked(_)]));
    }

    #[tokio::test]
    async fn create_on_existing_post_is_rejected() {
        let handler = PostCommandHandler::new(InMemoryEventStore::in_memory());
        let post_id = AggregateId::new();
        handler
            .create_post(CreatePost::new(post_id, "alice", "hello"))
            .await
            .unwrap();

        let err = handler
            .create_post(CreatePost::new(post_id, "bob", "mine now"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::Validation(PostError::AlreadyCreated)
        ));
        let post = handler.sourcing().load(post_id).await.unwrap();
        assert_eq!(post.author(), "alice");
        assert_eq!(post.version(), Version::first());
    }

    #[tokio::test]
    async fn commands_on_unknown_post_are_not_found() {
        let handler = PostCommandHandler::new(InMemoryEventStore::in_memory());
        let post_id = AggregateId::new();

        let err = handler
            .edit_message(EditMessage::new(post_id, "hi"))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(
            !handler
                .sourcing()
                .store()
                .aggregate_exists(post_id)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn dispatcher_covers_every_kind() {
        let dispatcher = post_dispatcher(InMemoryEventStore::in_memory()).unwrap();

        assert_eq!(dispatcher.handler_count(), CommandKind::ALL.len());
        for kind in CommandKind::ALL {
            assert!(dispatcher.is_registered(kind));
        }
    }
}
