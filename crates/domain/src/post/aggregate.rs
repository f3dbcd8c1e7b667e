//! Post aggregate implementation.

use std::collections::HashMap;

use event_store::{AggregateId, Version};

use crate::aggregate::{Aggregate, PendingEvents};

use super::{
    Comment, CommentId, PostError, PostEvent, same_user,
    events::{CommentAddedData, CommentUpdatedData, PostCreatedData},
};

/// Post aggregate root.
///
/// A post starts inactive, becomes active when created and is deactivated for
/// good when its author removes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Post {
    id: Option<AggregateId>,

    /// Version of the last persisted event.
    version: Version,

    active: bool,

    author: String,

    message: String,

    likes: u64,

    comments: HashMap<CommentId, Comment>,

    pending: PendingEvents<PostEvent>,
}

impl Aggregate for Post {
    type Event = PostEvent;
    type Error = PostError;

    fn aggregate_type() -> &'static str {
        "Post"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            PostEvent::PostCreated(data) => self.apply_post_created(data),
            PostEvent::MessageUpdated(data) => self.message.clone_from(&data.message),
            PostEvent::PostLiked(_) => self.likes += 1,
            PostEvent::CommentAdded(data) => self.apply_comment_added(data),
            PostEvent::CommentUpdated(data) => self.apply_comment_updated(data),
            PostEvent::CommentRemoved(data) => {
                self.comments.remove(&data.comment_id);
            }
            PostEvent::PostRemoved(_) => self.active = false,
        }
    }

    fn pending_events(&self) -> &PendingEvents<Self::Event> {
        &self.pending
    }

    fn pending_events_mut(&mut self) -> &mut PendingEvents<Self::Event> {
        &mut self.pending
    }
}

// Query methods
impl Post {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn likes(&self) -> u64 {
        self.likes
    }

    pub fn comment(&self, comment_id: CommentId) -> Option<&Comment> {
        self.comments.get(&comment_id)
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }
}

// Intent methods
impl Post {
    /// Creates the post under `id`.
    pub fn create(
        &mut self,
        id: AggregateId,
        author: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<(), PostError> {
        if self.id.is_some() {
            return Err(PostError::AlreadyCreated);
        }

        self.raise(PostEvent::post_created(id, author, message));
        Ok(())
    }

    pub fn edit_message(&mut self, message: impl Into<String>) -> Result<(), PostError> {
        self.ensure_active()?;
        let message = non_empty(message.into(), "message")?;

        self.raise(PostEvent::message_updated(message));
        Ok(())
    }

    pub fn like(&mut self) -> Result<(), PostError> {
        self.ensure_active()?;

        self.raise(PostEvent::post_liked());
        Ok(())
    }

    /// Adds a comment and returns the id it was assigned.
    pub fn add_comment(
        &mut self,
        comment: impl Into<String>,
        username: impl Into<String>,
    ) -> Result<CommentId, PostError> {
        self.ensure_active()?;
        let comment = non_empty(comment.into(), "comment")?;

        let comment_id = CommentId::new();
        self.raise(PostEvent::comment_added(comment_id, comment, username));
        Ok(comment_id)
    }

    /// Replaces a comment's text. Only the comment's author may do this.
    pub fn edit_comment(
        &mut self,
        comment_id: CommentId,
        username: &str,
        comment: impl Into<String>,
    ) -> Result<(), PostError> {
        self.ensure_active()?;
        self.ensure_comment_owner(comment_id, username)?;

        self.raise(PostEvent::comment_updated(comment_id, comment, username));
        Ok(())
    }

    pub fn remove_comment(&mut self, comment_id: CommentId, username: &str) -> Result<(), PostError> {
        self.ensure_active()?;
        self.ensure_comment_owner(comment_id, username)?;

        self.raise(PostEvent::comment_removed(comment_id));
        Ok(())
    }

    /// Removes the post. Only its author may do this.
    pub fn remove(&mut self, username: &str) -> Result<(), PostError> {
        self.ensure_active()?;
        if !same_user(&self.author, username) {
            return Err(PostError::NotPostOwner);
        }

        self.raise(PostEvent::post_removed(username));
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), PostError> {
        if self.active {
            Ok(())
        } else {
            Err(PostError::InactivePost)
        }
    }

    fn ensure_comment_owner(&self, comment_id: CommentId, username: &str) -> Result<(), PostError> {
        let comment = self
            .comments
            .get(&comment_id)
            .ok_or(PostError::CommentNotFound { comment_id })?;

        if comment.is_owned_by(username) {
            Ok(())
        } else {
            Err(PostError::NotCommentOwner)
        }
    }
}

fn non_empty(value: String, field: &'static str) -> Result<String, PostError> {
    if value.is_empty() {
        Err(PostError::EmptyValue { field })
    } else {
        Ok(value)
    }
}

// Apply helpers
impl Post {
    fn apply_post_created(&mut self, data: &PostCreatedData) {
        self.id = Some(data.post_id);
        self.active = true;
        self.author.clone_from(&data.author);
        self.message.clone_from(&data.message);
    }

    fn apply_comment_added(&mut self, data: &CommentAddedData) {
        self.comments.insert(
            data.comment_id,
            Comment::new(data.comment.clone(), data.username.clone()),
        );
    }

    fn apply_comment_updated(&mut self, data: &CommentUpdatedData) {
        // Ownership stays with the user that added the comment.
        if let Some(comment) = self.comments.get_mut(&data.comment_id) {
            comment.text.clone_from(&data.comment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created_post() -> Post {
        let mut post = Post::default();
        post.create(AggregateId::new(), "alice", "hello").unwrap();
        post
    }

    fn removed_post() -> Post {
        let mut post = created_post();
        post.remove("alice").unwrap();
        post
    }

    #[test]
    fn new_post_is_inactive() {
        let post = Post::default();
        assert!(!post.is_active());
        assert!(post.id().is_none());
        assert!(post.version().is_none());
    }

    #[test]
    fn create_activates_post() {
        let post = created_post();

        assert!(post.is_active());
        assert!(post.id().is_some());
        assert_eq!(post.author(), "alice");
        assert_eq!(post.message(), "hello");
        assert_eq!(post.uncommitted_events().len(), 1);
        assert!(matches!(
            post.uncommitted_events()[0],
            PostEvent::PostCreated(_)
        ));
    }

    #[test]
    fn cannot_create_twice() {
        let mut post = created_post();
        let result = post.create(AggregateId::new(), "bob", "again");

        assert_eq!(result, Err(PostError::AlreadyCreated));
        assert_eq!(post.uncommitted_events().len(), 1);
    }

    #[test]
    fn edit_message() {
        let mut post = created_post();
        post.edit_message("updated").unwrap();

        assert_eq!(post.message(), "updated");
    }

    #[test]
    fn cannot_edit_empty_message() {
        let mut post = created_post();
        let result = post.edit_message("");

        assert_eq!(result, Err(PostError::EmptyValue { field: "message" }));
        assert_eq!(post.message(), "hello");
        assert_eq!(post.uncommitted_events().len(), 1);
    }

    #[test]
    fn like_counts() {
        let mut post = created_post();
        post.like().unwrap();
        post.like().unwrap();

        assert_eq!(post.likes(), 2);
    }

    #[test]
    fn mutations_on_inactive_post_are_rejected() {
        for mut post in [Post::default(), removed_post()] {
            let pending = post.uncommitted_events().len();

            assert_eq!(post.edit_message("y"), Err(PostError::InactivePost));
            assert_eq!(post.like(), Err(PostError::InactivePost));
            assert_eq!(post.add_comment("hi", "bob"), Err(PostError::InactivePost));
            assert_eq!(
                post.edit_comment(CommentId::new(), "bob", "x"),
                Err(PostError::InactivePost)
            );
            assert_eq!(
                post.remove_comment(CommentId::new(), "bob"),
                Err(PostError::InactivePost)
            );
            assert_eq!(post.remove("alice"), Err(PostError::InactivePost));
            assert_eq!(post.uncommitted_events().len(), pending);
        }
    }

    #[test]
    fn add_comment_assigns_id() {
        let mut post = created_post();
        let comment_id = post.add_comment("hi", "bob").unwrap();

        let comment = post.comment(comment_id).unwrap();
        assert_eq!(comment.text, "hi");
        assert_eq!(comment.username, "bob");
        match &post.uncommitted_events()[1] {
            PostEvent::CommentAdded(data) => assert_eq!(data.comment_id, comment_id),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn cannot_add_empty_comment() {
        let mut post = created_post();
        let result = post.add_comment("", "bob");

        assert_eq!(result, Err(PostError::EmptyValue { field: "comment" }));
        assert_eq!(post.comment_count(), 0);
    }

    #[test]
    fn comment_owner_can_edit_ignoring_case() {
        let mut post = created_post();
        let comment_id = post.add_comment("hi", "bob").unwrap();

        post.edit_comment(comment_id, "BOB", "edited").unwrap();

        let comment = post.comment(comment_id).unwrap();
        assert_eq!(comment.text, "edited");
        assert_eq!(comment.username, "bob");
    }

    #[test]
    fn other_user_cannot_edit_or_remove_comment() {
        let mut post = created_post();
        let comment_id = post.add_comment("hi", "bob").unwrap();

        assert_eq!(
            post.edit_comment(comment_id, "carol", "x"),
            Err(PostError::NotCommentOwner)
        );
        assert_eq!(
            post.remove_comment(comment_id, "carol"),
            Err(PostError::NotCommentOwner)
        );
        assert_eq!(post.comment(comment_id).unwrap().text, "hi");
    }

    #[test]
    fn unknown_comment_is_reported() {
        let mut post = created_post();
        let comment_id = CommentId::new();

        assert_eq!(
            post.edit_comment(comment_id, "bob", "x"),
            Err(PostError::CommentNotFound { comment_id })
        );
    }

    #[test]
    fn remove_comment() {
        let mut post = created_post();
        let comment_id = post.add_comment("hi", "bob").unwrap();

        post.remove_comment(comment_id, "Bob").unwrap();

        assert!(post.comment(comment_id).is_none());
    }

    #[test]
    fn only_author_can_remove_post() {
        let mut post = created_post();

        assert_eq!(post.remove("mallory"), Err(PostError::NotPostOwner));
        assert!(post.is_active());

        post.remove("ALICE").unwrap();
        assert!(!post.is_active());
    }

    #[test]
    fn replay_reproduces_state_without_pending_events() {
        let mut original = created_post();
        original.like().unwrap();
        let comment_id = original.add_comment("hi", "bob").unwrap();
        original.edit_comment(comment_id, "bob", "edited").unwrap();
        original.edit_message("updated").unwrap();
        let events = original.mark_committed();

        let mut replayed = Post::default();
        replayed.replay(events);

        assert_eq!(replayed, original);
        assert!(replayed.uncommitted_events().is_empty());
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        fn run(post: &mut Post, op: u8, text: &str, user: &str) {
            let first_comment = post.comments.keys().next().copied();
            let _ = match op {
                0 => post.edit_message(text),
                1 => post.like(),
                2 => post.add_comment(text, user).map(|_| ()),
                3 => match first_comment {
                    Some(id) => post.edit_comment(id, user, text),
                    None => Ok(()),
                },
                4 => match first_comment {
                    Some(id) => post.remove_comment(id, user),
                    None => Ok(()),
                },
                _ => post.remove(user),
            };
        }

        proptest! {
            #[test]
            fn replay_is_deterministic(
                ops in prop::collection::vec((0u8..6, "[a-c]{0,3}", "(alice|bob|Bob)"), 0..24),
            ) {
                let mut post = Post::default();
                post.create(AggregateId::new(), "alice", "hello").unwrap();
                for (op, text, user) in &ops {
                    run(&mut post, *op, text, user);
                }
                let events = post.mark_committed();

                let mut first = Post::default();
                first.replay(events.clone());
                let mut second = Post::default();
                second.replay(events);

                prop_assert_eq!(&first, &second);
                prop_assert_eq!(&first, &post);
            }
        }
    }
}
