//! Write side of the post service.
//!
//! This crate provides the core domain abstractions including:
//! - Aggregate trait for event-sourced entities
//! - DomainEvent trait for domain events
//! - EventSourcingHandler for loading and saving aggregates
//! - Command trait and the CommandDispatcher that routes commands
//! - Post aggregate implementation with its commands and handler

pub mod aggregate;
pub mod command;
pub mod error;
pub mod post;
pub mod sourcing;

pub use aggregate::{Aggregate, DomainEvent, PendingEvents};
pub use command::{
    Command, CommandDispatcher, CommandHandler, CommandResult, DispatchError, DispatcherBuilder,
};
pub use error::DomainError;
pub use post::{
    AddComment, Comment, CommentId, CommandKind, CreatePost, EditComment, EditMessage, LikePost,
    Post, PostCommand, PostCommandHandler, PostError, PostEvent, RemoveComment, RemovePost,
    post_dispatcher,
};
pub use sourcing::EventSourcingHandler;
