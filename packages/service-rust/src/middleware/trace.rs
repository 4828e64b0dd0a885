//! Tracing middleware for invocations.
//!
//! Wraps each call in an `operation` span and records its duration and the
//! resulting outcome status.

use std::fmt::Display;
use std::task::{Context, Poll};
use std::time::Instant;

use outcome_core::{Command, Outcome};
use tower::{Layer, Service};
use tracing::{info_span, Instrument};

use crate::dispatch::OutcomeFuture;
use crate::operation::{short_type_name, Invocation};

// ---------------------------------------------------------------------------
// TraceLayer
// ---------------------------------------------------------------------------

/// Tower layer that instruments invocations with timing and status.
#[derive(Debug, Clone)]
pub struct TraceLayer;

impl<S> Layer<S> for TraceLayer {
    type Service = TraceService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TraceService { inner }
    }
}

// ---------------------------------------------------------------------------
// TraceService
// ---------------------------------------------------------------------------

/// Service wrapper that records invocation duration and status in tracing spans.
#[derive(Debug, Clone)]
pub struct TraceService<S> {
    inner: S,
}

impl<S, C, R> Service<Invocation<C>> for TraceService<S>
where
    S: Service<Invocation<C>, Response = Outcome<R>> + Send,
    S::Future: Send + 'static,
    S::Error: Display + 'static,
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
        let command = short_type_name::<C>();
        let call_id = invocation.call_id;

        let span = info_span!(
            "operation",
            command = command,
            call_id = call_id,
            duration_ms = tracing::field::Empty,
            status = tracing::field::Empty,
        );

        let fut = self.inner.call(invocation);

        Box::pin(
            async move {
                let start = Instant::now();
                let result = fut.await;
                let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                let status = match &result {
                    Ok(outcome) => outcome.status().as_str(),
                    Err(_) => "error",
                };

                tracing::Span::current().record("duration_ms", duration_ms);
                tracing::Span::current().record("status", status);

                match &result {
                    Ok(outcome) => {
                        if let Some(error) = outcome.error() {
                            tracing::debug!(
                                kind = %error.kind(),
                                messages = ?error.messages(),
                                "operation failed"
                            );
                        }
                        tracing::info!(
                            command = command,
                            call_id = call_id,
                            duration_ms = duration_ms,
                            status = status,
                            "operation complete"
                        );
                    }
                    Err(err) => {
                        tracing::warn!(
                            command = command,
                            call_id = call_id,
                            error = %err,
                            "operation dispatch failed"
                        );
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
