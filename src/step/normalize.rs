//! Normalizador estructural de entradas de registro.
//!
//! Convierte una lista heterogénea (steps sueltos, grupos de steps, o la
//! secuencia interna de otra cadena) en una secuencia plana y ordenada.
//! Puramente estructural: nada se invoca durante la normalización, y todo
//! error de configuración aparece al registrar, nunca al ejecutar.

use super::definition::Step;
use crate::errors::ChainCoreError;

/// Entrada de registro aceptada por `Chain::then` y por un `Runner`.
pub enum StepEntry {
    /// Un step directo.
    Single(Step),
    /// Grupo de entradas, empalmado en orden. Se admite a lo sumo un nivel
    /// de anidamiento.
    Group(Vec<StepEntry>),
    /// Secuencia interna (ya plana) de otra cadena.
    Subchain(Vec<Step>),
}

impl From<Step> for StepEntry {
    fn from(step: Step) -> Self {
        StepEntry::Single(step)
    }
}

impl From<Vec<Step>> for StepEntry {
    fn from(steps: Vec<Step>) -> Self {
        StepEntry::Group(steps.into_iter().map(StepEntry::Single).collect())
    }
}

/// Aplana las entradas preservando el orden de inserción (depth-first).
pub fn normalize(entries: Vec<StepEntry>) -> Result<Vec<Step>, ChainCoreError> {
    let mut flat = Vec::new();
    for entry in entries {
        push_entry(entry, &mut flat, 0)?;
    }
    Ok(flat)
}

fn push_entry(entry: StepEntry, out: &mut Vec<Step>, depth: usize) -> Result<(), ChainCoreError> {
    match entry {
        StepEntry::Single(step) => {
            if step.id().is_empty() {
                return Err(ChainCoreError::Configuration("step id must not be empty".into()));
            }
            out.push(step);
        }
        StepEntry::Group(inner) => {
            if depth >= 1 {
                return Err(ChainCoreError::Configuration("step groups nest at most one level".into()));
            }
            for e in inner {
                push_entry(e, out, depth + 1)?;
            }
        }
        StepEntry::Subchain(steps) => {
            for step in steps {
                push_entry(StepEntry::Single(step), out, depth)?;
            }
        }
    }
    Ok(())
}
