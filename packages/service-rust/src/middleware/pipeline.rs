//! Pipeline composition: wraps an `OperationService` with every middleware layer.

use std::sync::Arc;

use outcome_core::{Command, Outcome};
use tower::{Service, ServiceBuilder};

use super::timeout::TimeoutLayer;
use super::trace::TraceLayer;
use crate::dispatch::{OperationService, OutcomeFuture};
use crate::operation::Invocation;
use crate::registry::{OperationRegistry, RegistryError};

/// Build the dispatch pipeline for `Operation<C, R>`.
///
/// Layer order (outermost to innermost):
/// 1. `TraceLayer` -- record timing and status, including timed-out calls
/// 2. `TimeoutLayer` -- enforce the invocation's budget and cancel on expiry
#[must_use]
pub fn build_dispatch_pipeline<C, R>(registry: Arc<OperationRegistry>) -> impl Service<
    Invocation<C>,
    Response = Outcome<R>,
    Error = RegistryError,
    Future = OutcomeFuture<R, RegistryError>,
> + Clone
+ Send
where
    C: Command,
    R: Send + 'static,
{
    ServiceBuilder::new()
        .layer(TraceLayer)
        .layer(TimeoutLayer)
        .service(OperationService::<C, R>::new(registry))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use outcome_core::OutcomeStatus;
    use parking_lot::Mutex;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;
    use crate::operation::Operation;

    /// Collects every `status` value recorded on a span.
    #[derive(Clone, Default)]
    struct RecordedStatuses(Arc<Mutex<Vec<String>>>);

    struct StatusVisitor(Option<String>);

    impl Visit for StatusVisitor {
        fn record_str(&mut self, field: &Field, value: &str) {
            if field.name() == "status" {
                self.0 = Some(value.to_string());
            }
        }

        fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for RecordedStatuses {
        fn on_record(
            &self,
            _id: &tracing::span::Id,
            values: &tracing::span::Record<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut visitor = StatusVisitor(None);
            values.record(&mut visitor);
            if let Some(status) = visitor.0 {
                self.0.lock().push(status);
            }
        }
    }

    struct Archive {
        id: u64,
    }
    impl Command for Archive {}

    /// Waits for cancellation, then reports a no-op.
    #[derive(Default)]
    struct ArchiveOperation;

    #[async_trait]
    impl Operation<Archive, u64> for ArchiveOperation {
        async fn execute(&self, command: Archive, cancel: CancellationToken) -> Outcome<u64> {
            if command.id == 0 {
                cancel.cancelled().await;
                return Outcome::no_operation();
            }
            Outcome::success(command.id)
        }
    }

    fn registry() -> Arc<OperationRegistry> {
        Arc::new(
            OperationRegistry::builder()
                .register_default::<Archive, u64, ArchiveOperation>()
                .build()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn pipeline_routes_through_all_layers() {
        let svc = build_dispatch_pipeline::<Archive, u64>(registry());
        let outcome = svc
            .oneshot(Invocation::new(42, Archive { id: 7 }, 5_000))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::success(7));
    }

    #[tokio::test(start_paused = true)]
    async fn pipeline_timeout_cancels_operation() {
        let svc = build_dispatch_pipeline::<Archive, u64>(registry());
        let invocation = Invocation::new(1, Archive { id: 0 }, 100);
        let token = invocation.cancel.clone();

        let outcome = svc.oneshot(invocation).await.unwrap();
        assert_eq!(outcome, Outcome::failure("operation timed out after 100ms"));
        assert!(token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn pipeline_records_status_of_timed_out_calls() {
        let recorded = RecordedStatuses::default();
        let subscriber = tracing_subscriber::registry().with(recorded.clone());
        let _guard = tracing::subscriber::set_default(subscriber);

        let svc = build_dispatch_pipeline::<Archive, u64>(registry());
        let outcome = svc
            .oneshot(Invocation::new(1, Archive { id: 0 }, 100))
            .await
            .unwrap();

        assert_eq!(outcome.status(), OutcomeStatus::Failed);
        assert_eq!(recorded.0.lock().as_slice(), ["failed".to_string()]);
    }

    #[tokio::test]
    async fn pipeline_surfaces_unbound_contract() {
        let svc = build_dispatch_pipeline::<Archive, String>(registry());
        let err = svc
            .oneshot(Invocation::new(1, Archive { id: 1 }, 5_000))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Unbound { .. }));
    }

    #[tokio::test]
    async fn pipeline_is_reusable() {
        let mut svc = build_dispatch_pipeline::<Archive, u64>(registry());
        for id in 1..=3 {
            let outcome = ServiceExt::ready(&mut svc)
                .await
                .unwrap()
                .call(Invocation::new(id, Archive { id }, 5_000))
                .await
                .unwrap();
            assert_eq!(outcome.value(), Some(&id));
        }
    }
}
