//! Timeout middleware for invocations.
//!
//! An invocation that exceeds its `timeout_ms` budget has its cancellation
//! token fired and resolves to `Outcome::failure`. A budget of zero disables
//! the timeout.

use std::task::{Context, Poll};
use std::time::Duration;

use outcome_core::{Command, Outcome};
use tower::{Layer, Service};
use tracing::warn;

use crate::dispatch::OutcomeFuture;
use crate::operation::Invocation;

// ---------------------------------------------------------------------------
// TimeoutLayer
// ---------------------------------------------------------------------------

/// Tower layer that wraps services with per-invocation timeout enforcement.
///
/// The budget is read from each invocation's `timeout_ms` field, so callers
/// can choose different budgets per call.
#[derive(Debug, Clone)]
pub struct TimeoutLayer;

impl<S> Layer<S> for TimeoutLayer {
    type Service = TimeoutService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TimeoutService { inner }
    }
}

// ---------------------------------------------------------------------------
// TimeoutService
// ---------------------------------------------------------------------------

/// Service wrapper that enforces per-invocation timeouts.
#[derive(Debug, Clone)]
pub struct TimeoutService<S> {
    inner: S,
}

impl<S, C, R> Service<Invocation<C>> for TimeoutService<S>
where
    S: Service<Invocation<C>, Response = Outcome<R>> + Send,
    S::Future: Send + 'static,
    S::Error: 'static,
    C: Command,
    R: Send + 'static,
{
    type Response = Outcome<R>;
    type Error = S::Error;
    type Future = OutcomeFuture<R, S::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, invocation: Invocation<C>) -> Self::Future {
        let timeout_ms = invocation.timeout_ms;
        let call_id = invocation.call_id;
        let cancel = invocation.cancel.clone();
        let fut = self.inner.call(invocation);
        Box::pin(async move {
            if timeout_ms == 0 {
                return fut.await;
            }
            let duration = Duration::from_millis(timeout_ms);
            match tokio::time::timeout(duration, fut).await {
                Ok(result) => result,
                Err(_elapsed) => {
                    cancel.cancel();
                    warn!(call_id, timeout_ms, "operation timed out");
                    Ok(Outcome::failure(format!(
                        "operation timed out after {timeout_ms}ms"
                    )))
                }
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
