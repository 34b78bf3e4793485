//! Definiciones relacionadas a Steps.
//!
//! Un Step es una unidad de trabajo que recibe el vector de argumentos actual
//! y produce 0..n valores de salida (o un fallo). Este módulo define:
//! - `Step` y `StepKind`: la unión etiquetada de convenciones de llamada
//!   (síncrona, callback-style, suspendible), decidida al registrar el step.
//! - `Next`: la continuación de un step callback-style.
//! - `adapter`: invocación uniforme de cualquier convención.
//! - `normalize`: aplanado estructural de entradas de registro.

pub(crate) mod adapter;
pub mod definition;
pub mod normalize;

pub use definition::{BoxFuture, Next, Step, StepKind, StepResult};
pub use normalize::{normalize, StepEntry};
