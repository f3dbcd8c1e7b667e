//! Commands and the dispatcher that routes them to their handlers.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use event_store::{AggregateId, Version};
use thiserror::Error;

use crate::aggregate::Aggregate;
use crate::error::DomainError;

/// Trait for commands that can be executed against an aggregate.
///
/// A command carries one caller intent. It may be rejected if the
/// aggregate's current state doesn't allow the action.
pub trait Command: Send + Sync + 'static {
    /// The type of aggregate this command targets.
    type Aggregate: Aggregate;

    /// Closed set of tags the dispatcher routes on.
    type Kind: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;

    /// Returns the ID of the aggregate this command targets.
    fn aggregate_id(&self) -> AggregateId;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult<A: Aggregate> {
    /// The aggregate after applying the new events.
    pub aggregate: A,

    /// The events that were raised and persisted.
    pub events: Vec<A::Event>,

    /// The version of the aggregate after the command.
    pub new_version: Version,
}

/// Handles one or more kinds of command.
#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    async fn handle(&self, command: C) -> Result<CommandResult<C::Aggregate>, DomainError>;
}

/// Errors from building or using a dispatcher.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("duplicate handler: {kind} already has a handler")]
    DuplicateHandler { kind: String },

    #[error("no handler registered for {kind}")]
    NoHandler { kind: String },
}

/// Collects handler registrations before dispatch starts.
pub struct DispatcherBuilder<C: Command> {
    handlers: HashMap<C::Kind, Arc<dyn CommandHandler<C>>>,
}

impl<C: Command> Default for DispatcherBuilder<C> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<C: Command> DispatcherBuilder<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handler for one command kind.
    ///
    /// Each kind takes exactly one handler; a second registration fails and
    /// leaves the first in place.
    pub fn register(
        &mut self,
        kind: C::Kind,
        handler: Arc<dyn CommandHandler<C>>,
    ) -> Result<&mut Self, DispatchError> {
        if self.handlers.contains_key(&kind) {
            return Err(DispatchError::DuplicateHandler {
                kind: format!("{kind:?}"),
            });
        }
        self.handlers.insert(kind, handler);
        Ok(self)
    }

    /// Freezes the registrations.
    pub fn build(self) -> CommandDispatcher<C> {
        CommandDispatcher {
            handlers: Arc::new(self.handlers),
        }
    }
}

/// Routes each command to the single handler registered for its kind.
///
/// Immutable once built; clones share the same registrations.
pub struct CommandDispatcher<C: Command> {
    handlers: Arc<HashMap<C::Kind, Arc<dyn CommandHandler<C>>>>,
}

impl<C: Command> Clone for CommandDispatcher<C> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<C: Command> CommandDispatcher<C> {
    pub fn builder() -> DispatcherBuilder<C> {
        DispatcherBuilder::new()
    }

    pub fn is_registered(&self, kind: C::Kind) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Invokes the handler registered for the command's kind.
    #[tracing::instrument(skip(self, command), fields(kind = ?command.kind(), aggregate_id = %command.aggregate_id()))]
    pub async fn dispatch(&self, command: C) -> Result<CommandResult<C::Aggregate>, DomainError> {
        let kind = command.kind();
        let handler = self
            .handlers
            .get(&kind)
            .ok_or_else(|| DispatchError::NoHandler {
                kind: format!("{kind:?}"),
            })?;

        metrics::counter!("commands_dispatched").increment(1);

        let result = handler.handle(command).await;
        if let Err(e) = &result {
            metrics::counter!("commands_rejected").increment(1);
            if e.is_fault() {
                tracing::error!(error = %e, "command failed");
            } else {
                tracing::warn!(error = %e, "command rejected");
            }
        }
        result
    }
}
