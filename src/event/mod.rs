//! Log de eventos por ejecución y trait EventStore.

mod store;
mod types;

pub use store::{EventStore, InMemoryEventStore};
pub use types::{ChainEvent, ChainEventKind};
