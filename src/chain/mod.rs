//! Superficies de composición (builder y factory) y el controlador de
//! continuación que ambas comparten.
//!
//! Provee:
//! - `Chain`: acumula steps y puede ejecutarse varias veces con argumentos
//!   frescos.
//! - `chain` / `Runner`: captura seeds una vez y ejecuta listas de steps de
//!   inmediato contra esos seeds.
//! - `ChainContext`: estado mutable compartido dentro de un run.
//! - `MergePolicy`: política de fusión del vector de argumentos.

pub mod builder;
pub mod context;
pub mod runner;

pub use builder::{chain, Chain, Runner};
pub use context::ChainContext;
pub use runner::MergePolicy;
