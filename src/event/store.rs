use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::{ChainEvent, ChainEventKind};

/// Almacenamiento de eventos append-only, particionado por run.
pub trait EventStore {
    /// Agrega un evento a partir de su kind y devuelve el evento completo
    /// (con seq y ts asignados).
    fn append_kind(&mut self, run_id: Uuid, kind: ChainEventKind) -> ChainEvent;
    /// Lista los eventos de un run en orden ascendente por seq.
    fn list(&self, run_id: Uuid) -> Vec<ChainEvent>;
}

#[derive(Default)]
pub struct InMemoryEventStore {
    inner: HashMap<Uuid, Vec<ChainEvent>>,
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, run_id: Uuid, kind: ChainEventKind) -> ChainEvent {
        let events = self.inner.entry(run_id).or_default();
        let ev = ChainEvent { seq: events.len() as u64,
                              run_id,
                              kind,
                              ts: Utc::now() };
        events.push(ev.clone());
        ev
    }

    fn list(&self, run_id: Uuid) -> Vec<ChainEvent> {
        self.inner.get(&run_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_assigns_sequential_seq_per_run() {
        let mut store = InMemoryEventStore::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let e0 = store.append_kind(a, ChainEventKind::RunCompleted { final_count: 0 });
        let e1 = store.append_kind(a, ChainEventKind::RunCompleted { final_count: 1 });
        let other = store.append_kind(b, ChainEventKind::RunCompleted { final_count: 2 });

        assert_eq!((e0.seq, e1.seq, other.seq), (0, 1, 0));
        assert_eq!(store.list(a).len(), 2);
        assert!(store.list(Uuid::new_v4()).is_empty());
    }
}
