//! Adaptador de convención de llamada.
//!
//! Presenta cualquier `Step` con una interfaz única: invocación asíncrona que
//! resuelve a `Result<Vec<Value>, StepError>` exactamente una vez. El
//! controlador de continuación no sabe (ni necesita saber) qué convención usa
//! cada step.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::oneshot;

use super::definition::{Next, Step, StepKind, StepResult};
use crate::chain::ChainContext;
use crate::errors::StepError;

/// Invoca un step con el contexto compartido y el vector de argumentos
/// actual. El error resultante queda etiquetado con el id del step.
pub(crate) async fn invoke(step: &Step, ctx: &Arc<ChainContext>, args: &[Value]) -> StepResult {
    let result = match &step.kind {
        StepKind::Sync(f) => f.as_ref()(ctx, args),
        StepKind::Callback(f) => invoke_callback(f.as_ref(), ctx, args).await,
        StepKind::Suspendable(f) => f.as_ref()(Arc::clone(ctx), args.to_vec()).await,
    };
    result.map_err(|e| e.tagged(&step.id))
}

async fn invoke_callback(f: &(dyn Fn(&ChainContext, &[Value], Next) -> Result<(), StepError> + Send + Sync),
                         ctx: &Arc<ChainContext>,
                         args: &[Value])
                         -> StepResult {
    let (tx, rx) = oneshot::channel();
    let next = Next::new(tx);

    if let Err(error) = f(ctx, args, next.clone()) {
        // Fallo síncrono del cuerpo del step: se enruta por la continuación.
        // Si la continuación ya se resolvió, la primera resolución gana.
        next.fail(error);
    }
    drop(next);

    match rx.await {
        Ok(result) => result,
        // Toda copia de `Next` fue descartada sin resolverse.
        Err(_) => Err(StepError::new("step dropped its continuation without resolving it")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn ctx() -> Arc<ChainContext> {
        Arc::new(ChainContext::new(Uuid::new_v4()))
    }

    #[test]
    fn sync_step_maps_values_and_errors() {
        let ok = Step::sync("ok", |_ctx, args| Ok(vec![json!(format!("{}!", args[0].as_str().unwrap()))]));
        let bad = Step::sync("bad", |_ctx, _args| Err(StepError::new("blow up")));
        let ctx = ctx();

        let out = tokio_test::block_on(invoke(&ok, &ctx, &[json!("hi")]));
        assert_eq!(out, Ok(vec![json!("hi!")]));

        let err = tokio_test::block_on(invoke(&bad, &ctx, &[])).unwrap_err();
        assert_eq!(err.message, "blow up");
        assert_eq!(err.step_id.as_deref(), Some("bad"));
    }

    #[test]
    fn callback_error_return_routes_to_failure() {
        let step = Step::callback("cb", |_ctx, _args, _next| Err(StepError::new("boom")));
        let err = tokio_test::block_on(invoke(&step, &ctx(), &[])).unwrap_err();
        assert_eq!(err.message, "boom");
    }

    #[test]
    fn callback_resolution_beats_late_error_return() {
        // La continuación ya se resolvió cuando el cuerpo retorna Err: gana
        // la resolución.
        let step = Step::callback("cb", |_ctx, _args, next| {
            next.done(vec![json!("resolved")]);
            Err(StepError::new("too late"))
        });
        let out = tokio_test::block_on(invoke(&step, &ctx(), &[]));
        assert_eq!(out, Ok(vec![json!("resolved")]));
    }

    #[test]
    fn dropped_continuation_is_a_step_error() {
        let step = Step::callback("cb", |_ctx, _args, next| {
            drop(next);
            Ok(())
        });
        let err = tokio_test::block_on(invoke(&step, &ctx(), &[])).unwrap_err();
        assert!(err.message.contains("without resolving"));
    }

    #[tokio::test]
    async fn suspendable_step_awaits_its_future() {
        let step = Step::suspendable("gen", |_ctx, args| async move {
            tokio::task::yield_now().await;
            Ok(vec![args[0].clone(), json!("extra")])
        });
        let out = invoke(&step, &ctx(), &[json!("hi")]).await;
        assert_eq!(out, Ok(vec![json!("hi"), json!("extra")]));
    }
}
