//! Event log for the post command side.
//!
//! Streams are keyed by aggregate id, strictly ordered by version and only
//! ever appended to. [`EventLogStore`] enforces the optimistic concurrency
//! check; an [`EventRepository`] does the physical reads and writes.

pub mod config;
pub mod error;
pub mod event;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod store;

pub use config::StoreConfig;
pub use error::{EventStoreError, Result};
pub use event::{AggregateId, EventEnvelope, EventId, UncommittedEvent, Version};
pub use memory::InMemoryEventRepository;
pub use postgres::PostgresEventRepository;
pub use repository::{EventRepository, EventTransaction};
pub use store::{EventLogStore, EventStore, EventStoreExt};

/// Event log store backed by process memory.
pub type InMemoryEventStore = EventLogStore<InMemoryEventRepository>;

/// Event log store backed by PostgreSQL.
pub type PostgresEventStore = EventLogStore<PostgresEventRepository>;
