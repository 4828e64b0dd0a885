//! The operation contract and the request type carried through dispatch.

use async_trait::async_trait;
use outcome_core::{Command, Outcome};
use tokio_util::sync::CancellationToken;

/// A unit of work that turns a command of type `C` into an `Outcome<R>`.
///
/// Expected business failures are returned through the `Outcome` failure
/// factories. Panics are reserved for programming errors.
///
/// Cancellation is advisory: `cancel` fires when the caller gives up (for
/// example on timeout), and each implementation decides whether to stop
/// early. Callers with no cancellation source pass a fresh token.
#[async_trait]
pub trait Operation<C: Command, R: Send + 'static>: Send + Sync + 'static {
    async fn execute(&self, command: C, cancel: CancellationToken) -> Outcome<R>;
}

/// A command together with the call metadata the dispatch pipeline needs.
#[derive(Debug, Clone)]
pub struct Invocation<C> {
    /// Caller-unique id, recorded in tracing spans.
    pub call_id: u64,
    pub command: C,
    /// Shared with the executing operation.
    pub cancel: CancellationToken,
    /// Budget for the whole call. Zero disables the timeout.
    pub timeout_ms: u64,
}

impl<C: Command> Invocation<C> {
    /// Creates an invocation with a fresh cancellation token.
    #[must_use]
    pub fn new(call_id: u64, command: C, timeout_ms: u64) -> Self {
        Self {
            call_id,
            command,
            cancel: CancellationToken::new(),
            timeout_ms,
        }
    }

    /// Replaces the cancellation token, e.g. with a child of a request-scoped one.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Short type name of `T` (last path segment), used as a log field.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
