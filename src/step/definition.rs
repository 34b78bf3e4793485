//! Modelo de steps y su continuación.
//!
//! La convención de llamada de cada step se fija una única vez, al
//! construirlo, como variante de `StepKind`. El motor nunca re-inspecciona la
//! función en tiempo de ejecución: despacha sobre la unión etiquetada.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::oneshot;
use tracing::warn;

use crate::chain::ChainContext;
use crate::errors::StepError;

/// Future empaquetado con el resultado de un step suspendible.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Resultado uniforme de cualquier step: valores producidos o fallo.
pub type StepResult = Result<Vec<Value>, StepError>;

type SyncFn = dyn Fn(&ChainContext, &[Value]) -> StepResult + Send + Sync;
type CallbackFn = dyn Fn(&ChainContext, &[Value], Next) -> Result<(), StepError> + Send + Sync;
type SuspendFn = dyn Fn(Arc<ChainContext>, Vec<Value>) -> BoxFuture<StepResult> + Send + Sync;

/// Convención de llamada de un step.
#[derive(Clone)]
pub enum StepKind {
    /// Retorno directo: el valor producido (o el error) sale por `Result`.
    Sync(Arc<SyncFn>),
    /// El step recibe una continuación `Next` que debe resolver exactamente
    /// una vez, posiblemente después de suspenderse (timers, tasks).
    Callback(Arc<CallbackFn>),
    /// El step produce un future que eventualmente resuelve a error-o-valores.
    Suspendable(Arc<SuspendFn>),
}

impl StepKind {
    pub fn name(&self) -> &'static str {
        match self {
            StepKind::Sync(_) => "sync",
            StepKind::Callback(_) => "callback",
            StepKind::Suspendable(_) => "suspendable",
        }
    }
}

/// Unidad de trabajo registrada en una cadena.
///
/// Inmutable una vez creada. Clonarla es barato: comparte el closure
/// subyacente vía `Arc`, lo que permite que cada ejecución (y cada subcadena
/// incluida en otra cadena) tenga su propia secuencia sin duplicar código.
#[derive(Clone)]
pub struct Step {
    pub(crate) id: String,
    pub(crate) kind: StepKind,
}

impl Step {
    /// Step síncrono: `f(ctx, args)` retorna los valores producidos o un
    /// `StepError` (el equivalente a "retornar una instancia de error").
    pub fn sync<F>(id: impl Into<String>, f: F) -> Self
        where F: Fn(&ChainContext, &[Value]) -> StepResult + Send + Sync + 'static
    {
        Self { id: id.into(),
               kind: StepKind::Sync(Arc::new(f)) }
    }

    /// Step callback-style: `f(ctx, args, next)` debe resolver `next`
    /// exactamente una vez. Un `Err` retornado antes de resolver la
    /// continuación se enruta como fallo del step; si la continuación ya se
    /// resolvió, gana la primera resolución.
    pub fn callback<F>(id: impl Into<String>, f: F) -> Self
        where F: Fn(&ChainContext, &[Value], Next) -> Result<(), StepError> + Send + Sync + 'static
    {
        Self { id: id.into(),
               kind: StepKind::Callback(Arc::new(f)) }
    }

    /// Step suspendible: `f(ctx, args)` produce un future. El runtime lo
    /// conduce hasta completarse; un `Err` dentro del future equivale al
    /// error retornado por un step síncrono.
    pub fn suspendable<F, Fut>(id: impl Into<String>, f: F) -> Self
        where F: Fn(Arc<ChainContext>, Vec<Value>) -> Fut + Send + Sync + 'static,
              Fut: Future<Output = StepResult> + Send + 'static
    {
        let wrapped = move |ctx: Arc<ChainContext>, args: Vec<Value>| -> BoxFuture<StepResult> {
            Box::pin(f(ctx, args))
        };
        Self { id: id.into(),
               kind: StepKind::Suspendable(Arc::new(wrapped)) }
    }

    /// Identificador estable del step dentro de la cadena.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
         .field("id", &self.id)
         .field("kind", &self.kind.name())
         .finish()
    }
}

/// Continuación de un step callback-style.
///
/// Clonable para que el step pueda moverla a tasks o timers. La primera
/// resolución gana; las posteriores se ignoran para no corromper el vector de
/// argumentos ni disparar dos veces el completion handler.
#[derive(Clone)]
pub struct Next {
    tx: Arc<Mutex<Option<oneshot::Sender<StepResult>>>>,
}

impl Next {
    pub(crate) fn new(tx: oneshot::Sender<StepResult>) -> Self {
        Self { tx: Arc::new(Mutex::new(Some(tx))) }
    }

    /// Resuelve la continuación con los valores producidos.
    pub fn done(&self, values: Vec<Value>) {
        self.resolve(Ok(values));
    }

    /// Resuelve la continuación con un fallo.
    pub fn fail(&self, error: StepError) {
        self.resolve(Err(error));
    }

    fn resolve(&self, result: StepResult) {
        let taken = match self.tx.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        match taken {
            Some(tx) => {
                // El receptor sólo desaparece si la ejecución fue abandonada.
                let _ = tx.send(result);
            }
            None => warn!("step continuation resolved more than once; keeping the first result"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn step_debug_shows_id_and_kind() {
        let s = Step::sync("a", |_ctx, _args| Ok(vec![]));
        assert_eq!(format!("{s:?}"), "Step { id: \"a\", kind: \"sync\" }");
        assert_eq!(s.kind_name(), "sync");
    }

    #[test]
    fn next_first_resolution_wins() {
        let (tx, rx) = oneshot::channel();
        let next = Next::new(tx);
        next.done(vec![json!("first")]);
        next.done(vec![json!("second")]);
        next.fail(StepError::new("late"));

        let result = tokio_test::block_on(rx).expect("sender resolved");
        assert_eq!(result, Ok(vec![json!("first")]));
    }
}
