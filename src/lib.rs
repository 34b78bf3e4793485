//! chain-core: Motor secuencial de encadenamiento de tareas
//!
//! Este crate ejecuta una lista ordenada de unidades de trabajo (síncronas,
//! callback-style o suspendibles) una detrás de otra, pasando los valores
//! producidos como argumentos del siguiente step, cortando en el primer
//! error, e invocando un completion handler exactamente una vez.
//!
//! - Expone `chain` con las superficies builder/factory y el controlador.
//! - Expone `step` con el modelo de steps y el adaptador de convenciones.
//! - Expone `event` con el log append-only por ejecución.
//! - Expone `hashing` para el hash canónico de la definición.

pub mod chain;
pub mod constants;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod step;

pub use chain::{chain, Chain, ChainContext, MergePolicy, Runner};
pub use errors::{ChainCoreError, StepError};
pub use event::{ChainEvent, ChainEventKind, EventStore, InMemoryEventStore};
pub use step::{BoxFuture, Next, Step, StepEntry, StepKind, StepResult};
