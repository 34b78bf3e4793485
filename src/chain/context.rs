//! Contexto de ejecución compartido dentro de un run.

use std::sync::Mutex;

use serde_json::{Map, Value};
use uuid::Uuid;

/// Receptor común de todos los steps y del completion handler de un run.
///
/// Es la única pieza de estado mutable compartido: un step temprano puede
/// dejar valores que steps posteriores (y el handler) observan. Nunca se
/// reasigna a mitad de un run y nunca se comparte entre runs distintos.
pub struct ChainContext {
    run_id: Uuid,
    state: Mutex<Map<String, Value>>,
}

impl ChainContext {
    pub(crate) fn new(run_id: Uuid) -> Self {
        Self { run_id,
               state: Mutex::new(Map::new()) }
    }

    /// Identificador del run al que pertenece este contexto.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        if let Ok(mut state) = self.state.lock() {
            state.insert(key.into(), value);
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.state.lock().ok().and_then(|state| state.get(key).cloned())
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.state.lock().ok().and_then(|mut state| state.remove(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_get_remove_roundtrip() {
        let ctx = ChainContext::new(Uuid::new_v4());
        assert_eq!(ctx.get("k"), None);

        ctx.set("k", json!(42));
        assert_eq!(ctx.get("k"), Some(json!(42)));

        assert_eq!(ctx.remove("k"), Some(json!(42)));
        assert_eq!(ctx.get("k"), None);
    }
}
