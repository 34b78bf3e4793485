//! Errores específicos del core (simples por ahora).
//!
//! Dos familias separadas a propósito:
//! - `ChainCoreError`: fallos de configuración/registro. Aparecen al armar la
//!   cadena, nunca en tiempo de ejecución.
//! - `StepError`: fallos en tiempo de ejecución de un step. Siempre viajan
//!   hacia el completion handler; nunca se propagan por el stack del caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum ChainCoreError {
    #[error("configuration: {0}")] Configuration(String),
    #[error("internal: {0}")] Internal(String),
}

/// Fallo de un step. Serializable para poder viajar dentro de un
/// `ChainEventKind::StepFailed`.
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[error("{message}")]
pub struct StepError {
    /// Id del step que originó el fallo. `None` hasta que el adaptador lo
    /// etiqueta al salir de la invocación.
    pub step_id: Option<String>,
    pub message: String,
}

impl StepError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { step_id: None,
               message: message.into() }
    }

    /// Etiqueta el error con el id del step si aún no lo tiene.
    pub(crate) fn tagged(mut self, step_id: &str) -> Self {
        if self.step_id.is_none() {
            self.step_id = Some(step_id.to_string());
        }
        self
    }
}

impl From<String> for StepError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for StepError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
