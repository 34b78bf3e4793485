//! Controlador de continuación: el estado transitorio de una ejecución.
//!
//! Máquina de estados implícita sobre la secuencia plana de steps:
//! `Pending(i)` es el índice del bucle; éxito avanza a `i + 1` fusionando el
//! vector de argumentos según la política activa; un fallo en cualquier
//! índice es terminal y los steps restantes nunca se invocan. Cada run crea
//! su propio `ChainRun`: ejecuciones solapadas de la misma cadena no
//! comparten nada más que los closures (vía `Arc`) y la event store.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::context::ChainContext;
use crate::errors::StepError;
use crate::event::{ChainEventKind, EventStore};
use crate::step::{adapter, Step};

/// Política de fusión del vector de argumentos entre steps.
///
/// Las dos variantes observadas en los ejecutores originales; se elige por
/// cadena y se aplica de punta a punta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Conserva la aridad del vector previo: la posición `i` toma el valor
    /// producido salvo que sea `Null`, en cuyo caso mantiene el anterior.
    /// Valores producidos más allá de la aridad previa se descartan. Si el
    /// vector previo está vacío, el producido pasa completo.
    #[default]
    PositionalFallback,
    /// El vector producido reemplaza al anterior por completo.
    Replace,
}

impl MergePolicy {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            MergePolicy::PositionalFallback => "positional_fallback",
            MergePolicy::Replace => "replace",
        }
    }
}

pub(crate) type SharedEventStore = Arc<Mutex<dyn EventStore + Send>>;

/// Run State: vive exactamente lo que dura una ejecución.
pub(crate) struct ChainRun {
    pub(crate) run_id: Uuid,
    pub(crate) steps: Vec<Step>,
    pub(crate) policy: MergePolicy,
    pub(crate) definition_hash: String,
    pub(crate) events: SharedEventStore,
}

impl ChainRun {
    fn append(&self, kind: ChainEventKind) {
        if let Ok(mut store) = self.events.lock() {
            store.append_kind(self.run_id, kind);
        }
    }

    /// Conduce la secuencia completa: invoca cada step en orden vía el
    /// adaptador, fusiona valores producidos y corta en el primer fallo.
    /// Una secuencia vacía completa de inmediato con el vector inicial.
    pub(crate) async fn drive(self, initial: Vec<Value>, ctx: Arc<ChainContext>) -> Result<Vec<Value>, StepError> {
        self.append(ChainEventKind::RunInitialized { definition_hash: self.definition_hash.clone(),
                                                     step_count: self.steps.len(),
                                                     seed_count: initial.len() });

        let mut args = initial;
        for (index, step) in self.steps.iter().enumerate() {
            self.append(ChainEventKind::StepStarted { step_index: index,
                                                      step_id: step.id().to_string() });
            debug!(run_id = %self.run_id, step = step.id(), index, "step started");

            match adapter::invoke(step, &ctx, &args).await {
                Ok(produced) => {
                    self.append(ChainEventKind::StepFinished { step_index: index,
                                                               step_id: step.id().to_string(),
                                                               produced: produced.len() });
                    args = merge_args(args, produced, self.policy);
                }
                Err(error) => {
                    self.append(ChainEventKind::StepFailed { step_index: index,
                                                             step_id: step.id().to_string(),
                                                             error: error.clone() });
                    debug!(run_id = %self.run_id, step = step.id(), "step failed; short-circuiting");
                    return Err(error);
                }
            }
        }

        self.append(ChainEventKind::RunCompleted { final_count: args.len() });
        Ok(args)
    }
}

/// Fusiona el vector producido con el previo según la política activa.
pub(crate) fn merge_args(previous: Vec<Value>, produced: Vec<Value>, policy: MergePolicy) -> Vec<Value> {
    match policy {
        MergePolicy::Replace => produced,
        MergePolicy::PositionalFallback => {
            if previous.is_empty() {
                return produced;
            }
            let mut produced = produced.into_iter();
            previous.into_iter()
                    .map(|prev| match produced.next() {
                        Some(Value::Null) | None => prev,
                        Some(value) => value,
                    })
                    .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replace_swaps_the_vector_wholesale() {
        let out = merge_args(vec![json!("a"), json!("b")], vec![json!("x")], MergePolicy::Replace);
        assert_eq!(out, vec![json!("x")]);
    }

    #[test]
    fn positional_fallback_keeps_previous_on_null_and_short_output() {
        let prev = vec![json!("a"), json!("b"), json!("c")];
        let produced = vec![json!("x"), json!(null)];
        let out = merge_args(prev, produced, MergePolicy::PositionalFallback);
        assert_eq!(out, vec![json!("x"), json!("b"), json!("c")]);
    }

    #[test]
    fn positional_fallback_drops_extra_values() {
        let out = merge_args(vec![json!("a")],
                             vec![json!("x"), json!("y")],
                             MergePolicy::PositionalFallback);
        assert_eq!(out, vec![json!("x")]);
    }

    #[test]
    fn positional_fallback_passes_output_through_when_no_previous() {
        let out = merge_args(vec![], vec![json!("x")], MergePolicy::PositionalFallback);
        assert_eq!(out, vec![json!("x")]);
    }
}
