//! Dispatch: running resolved operations as `tower` services.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use outcome_core::{Command, Outcome};
use tower::{Service, ServiceExt};

use crate::config::DispatchConfig;
use crate::middleware::build_dispatch_pipeline;
use crate::operation::Invocation;
use crate::registry::{OperationRegistry, RegistryError};

/// Boxed future returned by every service in the dispatch pipeline.
pub type OutcomeFuture<R, E> = Pin<Box<dyn Future<Output = Result<Outcome<R>, E>> + Send>>;

// ---------------------------------------------------------------------------
// OperationService
// ---------------------------------------------------------------------------

/// `tower::Service` that executes `Operation<C, R>` invocations.
///
/// Each call resolves a fresh operation from the registry, so no state leaks
/// between calls. Business failures come back as `Ok(outcome)`; `Err` is
/// reserved for registry wiring errors.
pub struct OperationService<C, R> {
    registry: Arc<OperationRegistry>,
    _contract: PhantomData<fn(C) -> R>,
}

impl<C, R> OperationService<C, R> {
    #[must_use]
    pub fn new(registry: Arc<OperationRegistry>) -> Self {
        Self {
            registry,
            _contract: PhantomData,
        }
    }
}

impl<C, R> Clone for OperationService<C, R> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.registry))
    }
}

impl<C, R> Service<Invocation<C>> for OperationService<C, R>
where
    C: Command,
    R: Send + 'static,
{
    type Response = Outcome<R>;
    type Error = RegistryError;
    type Future = OutcomeFuture<R, RegistryError>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, invocation: Invocation<C>) -> Self::Future {
        let resolved = self.registry.resolve::<C, R>();
        Box::pin(async move {
            let operation = resolved?;
            Ok(operation
                .execute(invocation.command, invocation.cancel)
                .await)
        })
    }
}

// ---------------------------------------------------------------------------
// OperationDispatcher
// ---------------------------------------------------------------------------

/// Entry point for callers: wraps commands into invocations and runs them
/// through the dispatch pipeline.
///
/// Each invocation gets a unique call id and the configured default timeout.
pub struct OperationDispatcher {
    registry: Arc<OperationRegistry>,
    config: DispatchConfig,
    call_id_counter: AtomicU64,
}

impl OperationDispatcher {
    #[must_use]
    pub fn new(registry: Arc<OperationRegistry>, config: DispatchConfig) -> Self {
        Self {
            registry,
            config,
            call_id_counter: AtomicU64::new(1),
        }
    }

    #[must_use]
    pub fn registry(&self) -> Arc<OperationRegistry> {
        Arc::clone(&self.registry)
    }

    fn next_call_id(&self) -> u64 {
        self.call_id_counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Wrap `command` with a fresh call id, cancellation token and the
    /// default timeout.
    pub fn invocation<C: Command>(&self, command: C) -> Invocation<C> {
        Invocation::new(self.next_call_id(), command, self.config.default_timeout_ms)
    }

    /// Execute `command` with the operation bound to `Operation<C, R>`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if no operation is bound for the pair.
    pub async fn dispatch<C, R>(&self, command: C) -> Result<Outcome<R>, RegistryError>
    where
        C: Command,
        R: Send + 'static,
    {
        self.dispatch_invocation(self.invocation(command)).await
    }

    /// Execute a caller-built invocation (custom timeout or cancellation).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if no operation is bound for the pair.
    pub async fn dispatch_invocation<C, R>(
        &self,
        invocation: Invocation<C>,
    ) -> Result<Outcome<R>, RegistryError>
    where
        C: Command,
        R: Send + 'static,
    {
        build_dispatch_pipeline::<C, R>(self.registry())
            .oneshot(invocation)
            .await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
