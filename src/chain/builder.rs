//! Superficies de composición: `Chain` (builder) y `Runner` (factory).
//!
//! Ambas reducen al mismo núcleo: normalizar entradas a una secuencia plana
//! y conducirla con un `ChainRun` fresco por ejecución.
//!
//! Notas de diseño
//! - El completion handler es un parámetro dedicado de `run`, no una
//!   convención de "último argumento si es función".
//! - El primer step jamás corre dentro del stack del caller: el run se
//!   agenda en el runtime y cede exactamente una vez antes del step 0.
//! - Registrar valida de inmediato: los errores de configuración aparecen en
//!   `then`, nunca diferidos al run.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::oneshot;
use uuid::Uuid;

use super::context::ChainContext;
use super::runner::{ChainRun, MergePolicy, SharedEventStore};
use crate::constants::ENGINE_VERSION;
use crate::errors::{ChainCoreError, StepError};
use crate::event::{ChainEvent, ChainEventKind, EventStore, InMemoryEventStore};
use crate::hashing::hash_value;
use crate::step::{normalize, Step, StepEntry};

/// Cadena estilo builder: acumula steps y se ejecuta una o más veces.
///
/// Cada `run` deriva su propio estado (contexto, vector de argumentos,
/// índice); ejecuciones solapadas no se interfieren.
pub struct Chain {
    seeds: Vec<Value>,
    steps: Vec<Step>,
    policy: MergePolicy,
    events: SharedEventStore,
}

impl Chain {
    pub fn new() -> Self {
        Self::with_seeds(Vec::new())
    }

    /// Cadena con vector de argumentos semilla, usado cuando `run` no recibe
    /// argumentos propios.
    pub fn with_seeds(seeds: Vec<Value>) -> Self {
        Self { seeds,
               steps: Vec::new(),
               policy: MergePolicy::default(),
               events: Arc::new(Mutex::new(InMemoryEventStore::default())) }
    }

    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_event_store(mut self, store: impl EventStore + Send + 'static) -> Self {
        self.events = Arc::new(Mutex::new(store));
        self
    }

    /// Registra una entrada: un step, un grupo (aplanado un nivel) o la
    /// secuencia de otra cadena. Devuelve `&mut Self` para encadenar
    /// registros.
    pub fn then(&mut self, entry: impl Into<StepEntry>) -> Result<&mut Self, ChainCoreError> {
        let mut flat = normalize(vec![entry.into()])?;
        self.steps.append(&mut flat);
        Ok(self)
    }

    /// Secuencia plana acumulada, en orden de inserción.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn definition_hash(&self) -> String {
        hash_value(&serde_json::json!({
            "engine_version": ENGINE_VERSION,
            "step_ids": self.steps.iter().map(Step::id).collect::<Vec<_>>(),
            "merge_policy": self.policy.as_str(),
        }))
    }

    /// Ejecuta la cadena contra `args` (o contra los seeds si `args` viene
    /// vacío) e invoca `on_complete` exactamente una vez con el contexto
    /// compartido y el resultado. Devuelve el id del run.
    ///
    /// Requiere un runtime tokio activo: el run corre en una task propia.
    pub fn run<F>(&self, args: Vec<Value>, on_complete: F) -> Uuid
        where F: FnOnce(&ChainContext, Result<Vec<Value>, StepError>) + Send + 'static
    {
        let run_id = Uuid::new_v4();
        let ctx = Arc::new(ChainContext::new(run_id));
        let initial = if args.is_empty() { self.seeds.clone() } else { args };
        let run = ChainRun { run_id,
                             steps: self.steps.clone(),
                             policy: self.policy,
                             definition_hash: self.definition_hash(),
                             events: Arc::clone(&self.events) };

        tokio::spawn(async move {
            // deferral inicial único: el caller siempre retoma control antes
            // de que el step 0 se invoque
            tokio::task::yield_now().await;
            let result = run.drive(initial, Arc::clone(&ctx)).await;
            on_complete(&ctx, result);
        });

        run_id
    }

    /// Variante awaitable de `run` para quienes prefieren un `Result` en vez
    /// de un handler.
    pub async fn run_collect(&self, args: Vec<Value>) -> Result<Vec<Value>, StepError> {
        let (tx, rx) = oneshot::channel();
        self.run(args, move |_ctx, result| {
            let _ = tx.send(result);
        });
        rx.await
          .unwrap_or_else(|_| Err(StepError::new("run task dropped before completion")))
    }

    /// Eventos registrados para un run de esta cadena.
    pub fn events_for(&self, run_id: Uuid) -> Vec<ChainEvent> {
        self.events
            .lock()
            .map(|store| store.list(run_id))
            .unwrap_or_default()
    }

    /// Vista compacta del log de un run, una letra por evento.
    pub fn event_variants(&self, run_id: Uuid) -> Vec<&'static str> {
        self.events_for(run_id)
            .iter()
            .map(|e| match e.kind {
                ChainEventKind::RunInitialized { .. } => "I",
                ChainEventKind::StepStarted { .. } => "S",
                ChainEventKind::StepFinished { .. } => "F",
                ChainEventKind::StepFailed { .. } => "X",
                ChainEventKind::RunCompleted { .. } => "C",
            })
            .collect()
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&Chain> for StepEntry {
    fn from(chain: &Chain) -> Self {
        StepEntry::Subchain(chain.steps.to_vec())
    }
}

/// Estilo factory: captura los seeds una vez y devuelve un runner
/// reutilizable que ejecuta listas de steps contra esos seeds.
pub fn chain(seeds: Vec<Value>) -> Runner {
    Runner { seeds }
}

pub struct Runner {
    seeds: Vec<Value>,
}

impl Runner {
    /// Normaliza las entradas en una cadena fresca sembrada con los valores
    /// capturados y la ejecuta de inmediato.
    pub fn run<F>(&self, entries: Vec<StepEntry>, on_complete: F) -> Result<Uuid, ChainCoreError>
        where F: FnOnce(&ChainContext, Result<Vec<Value>, StepError>) + Send + 'static
    {
        let mut chain = Chain::with_seeds(self.seeds.clone());
        for entry in entries {
            chain.then(entry)?;
        }
        Ok(chain.run(Vec::new(), on_complete))
    }

    /// Variante awaitable de `run`.
    pub async fn run_collect(&self, entries: Vec<StepEntry>) -> Result<Result<Vec<Value>, StepError>, ChainCoreError> {
        let (tx, rx) = oneshot::channel();
        self.run(entries, move |_ctx, result| {
            let _ = tx.send(result);
        })?;
        Ok(rx.await
             .unwrap_or_else(|_| Err(StepError::new("run task dropped before completion"))))
    }
}
