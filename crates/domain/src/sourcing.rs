//! Loading aggregates from their streams and saving their pending events.

use std::marker::PhantomData;

use event_store::{AggregateId, EventStore, UncommittedEvent, Version};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::command::CommandResult;
use crate::error::DomainError;

/// Rebuilds aggregates from the event store and persists what they raise.
///
/// Every load constructs a fresh aggregate; nothing is cached between calls.
/// The aggregate's version is the concurrency token for the next append.
pub struct EventSourcingHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    store: S,
    _phantom: PhantomData<A>,
}

impl<S, A> EventSourcingHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the underlying event store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads an aggregate, or a fresh one if the id has no history.
    ///
    /// This is the path for creation commands. Store failures other than
    /// "not found" are still returned.
    #[tracing::instrument(skip(self), fields(aggregate_type = A::aggregate_type()))]
    pub async fn load(&self, aggregate_id: AggregateId) -> Result<A, DomainError> {
        match self.load_existing(aggregate_id).await {
            Err(e) if e.is_not_found() => {
                tracing::debug!("no history, starting from a fresh aggregate");
                Ok(A::default())
            }
            other => other,
        }
    }

    /// Loads an aggregate that must already have history.
    ///
    /// Fails with `AggregateNotFound` for an id that was never written.
    pub async fn load_existing(&self, aggregate_id: AggregateId) -> Result<A, DomainError> {
        let stream = self.store.read(aggregate_id).await?;

        let mut last_version = Version::none();
        let mut events = Vec::with_capacity(stream.len());
        for record in stream {
            let event = A::Event::from_record(&record.event_type, &record.payload).map_err(
                |source| DomainError::UnknownEvent {
                    aggregate_type: A::aggregate_type(),
                    event_type: record.event_type.clone(),
                    version: record.version,
                    source,
                },
            )?;
            events.push(event);
            last_version = last_version.max(record.version);
        }

        let mut aggregate = A::default();
        aggregate.replay(events);
        aggregate.set_version(last_version);

        tracing::debug!(%aggregate_id, version = %last_version, "aggregate loaded");
        Ok(aggregate)
    }

    /// Appends the aggregate's pending events and clears them.
    ///
    /// The aggregate's current version is the expected version. On failure
    /// the pending events are left in place and the error is returned as is.
    /// Nothing pending is a no-op.
    #[tracing::instrument(skip(self, aggregate), fields(aggregate_type = A::aggregate_type()))]
    pub async fn save(&self, aggregate: &mut A) -> Result<Version, DomainError> {
        let (_, version) = self.commit(aggregate).await?;
        Ok(version)
    }

    /// Loads the aggregate (fresh if unknown), runs an intent method on it
    /// and saves what it raised.
    pub async fn execute<F>(
        &self,
        aggregate_id: AggregateId,
        intent: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&mut A) -> Result<(), A::Error> + Send,
        DomainError: From<A::Error>,
    {
        let aggregate = self.load(aggregate_id).await?;
        self.run(aggregate, intent).await
    }

    /// Like [`execute`](Self::execute), but the aggregate must already exist.
    pub async fn execute_existing<F>(
        &self,
        aggregate_id: AggregateId,
        intent: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&mut A) -> Result<(), A::Error> + Send,
        DomainError: From<A::Error>,
    {
        let aggregate = self.load_existing(aggregate_id).await?;
        self.run(aggregate, intent).await
    }

    async fn run<F>(&self, mut aggregate: A, intent: F) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&mut A) -> Result<(), A::Error> + Send,
        DomainError: From<A::Error>,
    {
        intent(&mut aggregate)?;
        let (events, new_version) = self.commit(&mut aggregate).await?;

        Ok(CommandResult {
            aggregate,
            events,
            new_version,
        })
    }

    async fn commit(&self, aggregate: &mut A) -> Result<(Vec<A::Event>, Version), DomainError> {
        if aggregate.pending_events().is_empty() {
            return Ok((Vec::new(), aggregate.version()));
        }

        let aggregate_id = aggregate.id().ok_or(DomainError::Uninitialized {
            aggregate_type: A::aggregate_type(),
        })?;

        let records = aggregate
            .uncommitted_events()
            .iter()
            .map(DomainEvent::to_uncommitted)
            .collect::<Result<Vec<UncommittedEvent>, _>>()?;

        let new_version = self
            .store
            .append(
                aggregate_id,
                A::aggregate_type(),
                records,
                aggregate.version(),
            )
            .await?;

        let events = aggregate.mark_committed();
        aggregate.set_version(new_version);
        Ok((events, new_version))
    }
}
