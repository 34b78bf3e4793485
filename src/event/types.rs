//! Tipos de evento de una ejecución y estructura `ChainEvent`.
//!
//! Rol en la cadena:
//! - Cada run emite eventos a un `EventStore` append-only, identificados por
//!   el `run_id` de esa ejecución.
//! - El log permite observar desde afuera el avance paso a paso y el motivo
//!   exacto de un corte por error, sin tocar el estado del run.
//! - El enum `ChainEventKind` es el contrato observable y estable del motor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::StepError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChainEventKind {
    /// Primer evento de todo run: fija la `definition_hash` de la cadena, la
    /// cantidad de steps aplanados y la aridad del vector inicial.
    RunInitialized {
        definition_hash: String,
        step_count: usize,
        seed_count: usize,
    },
    /// Un step comenzó su invocación. No implica éxito.
    StepStarted { step_index: usize, step_id: String },
    /// Un step resolvió correctamente; `produced` es la cantidad de valores
    /// que entregó (antes de aplicar la política de merge).
    StepFinished {
        step_index: usize,
        step_id: String,
        produced: usize,
    },
    /// Un step falló. Es terminal: los steps restantes nunca se invocan.
    StepFailed {
        step_index: usize,
        step_id: String,
        error: StepError,
    },
    /// Cierre exitoso del run con la aridad del vector final.
    RunCompleted { final_count: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainEvent {
    /// Orden de append dentro del run, asignado por el EventStore.
    pub seq: u64,
    pub run_id: Uuid,
    pub kind: ChainEventKind,
    /// Metadato temporal; no participa del hash de definición.
    pub ts: DateTime<Utc>,
}
