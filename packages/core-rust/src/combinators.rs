//! Transform, chain, branch and side-effect combinators over [`Outcome`].
//!
//! Every combinator is total. `map` and `bind` short-circuit whenever the
//! outcome failed *or* carries no value, so the supplied function only ever
//! sees a real input. Short-circuited results keep status, error and metadata.

use std::future::Future;

use crate::error::OperationError;
use crate::outcome::{Outcome, OutcomeState};
use crate::status::OutcomeStatus;

impl<T> Outcome<T> {
    /// Transforms the carried value.
    ///
    /// `f` runs at most once, and only for a `Completed` outcome holding a
    /// value. Status, error and metadata pass through unchanged.
    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        let Outcome { state, metadata } = self;
        let state = match state {
            OutcomeState::Completed(Some(value)) => OutcomeState::Completed(Some(f(value))),
            other => other.without_value(),
        };
        Outcome { state, metadata }
    }

    /// Chains into another outcome-producing step.
    ///
    /// On the value path the returned outcome replaces this one entirely,
    /// including its metadata. Otherwise `f` is not called and the result
    /// keeps this outcome's status, error and metadata.
    pub fn bind<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> Outcome<U>,
    {
        let Outcome { state, metadata } = self;
        match state {
            OutcomeState::Completed(Some(value)) => f(value),
            other => Outcome {
                state: other.without_value(),
                metadata,
            },
        }
    }

    /// Async [`bind`](Self::bind). Suspends only while awaiting `f`'s future.
    pub async fn bind_async<U, F, Fut>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Outcome<U>>,
    {
        let Outcome { state, metadata } = self;
        match state {
            OutcomeState::Completed(Some(value)) => f(value).await,
            other => Outcome {
                state: other.without_value(),
                metadata,
            },
        }
    }

    /// Async [`map`](Self::map).
    pub async fn map_async<U, F, Fut>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = U>,
    {
        let Outcome { state, metadata } = self;
        let state = match state {
            OutcomeState::Completed(Some(value)) => OutcomeState::Completed(Some(f(value).await)),
            other => other.without_value(),
        };
        Outcome { state, metadata }
    }

    /// Two-way dispatch on [`succeeded`](Self::succeeded).
    ///
    /// Exactly one handler runs. Success handlers receive the value, if any;
    /// failure handlers receive the status and its error.
    pub fn fold<R, S, F>(self, on_success: S, on_failure: F) -> R
    where
        S: FnOnce(Option<T>) -> R,
        F: FnOnce(OutcomeStatus, OperationError) -> R,
    {
        let status = self.status();
        match self.state {
            OutcomeState::Completed(value) => on_success(value),
            OutcomeState::NoOperation => on_success(None),
            OutcomeState::Invalid(err)
            | OutcomeState::NotFound(err)
            | OutcomeState::Unauthorized(err)
            | OutcomeState::Unprocessable(err)
            | OutcomeState::Failed(err) => on_failure(status, err),
        }
    }

    /// Seven-way dispatch, one handler per status.
    ///
    /// `Completed` receives the value, `NoOperation` receives nothing, and
    /// every failure receives its error.
    #[allow(clippy::too_many_arguments)]
    pub fn match_detailed<R>(
        self,
        on_completed: impl FnOnce(Option<T>) -> R,
        on_no_operation: impl FnOnce() -> R,
        on_invalid: impl FnOnce(OperationError) -> R,
        on_not_found: impl FnOnce(OperationError) -> R,
        on_unauthorized: impl FnOnce(OperationError) -> R,
        on_unprocessable: impl FnOnce(OperationError) -> R,
        on_failed: impl FnOnce(OperationError) -> R,
    ) -> R {
        match self.state {
            OutcomeState::Completed(value) => on_completed(value),
            OutcomeState::NoOperation => on_no_operation(),
            OutcomeState::Invalid(err) => on_invalid(err),
            OutcomeState::NotFound(err) => on_not_found(err),
            OutcomeState::Unauthorized(err) => on_unauthorized(err),
            OutcomeState::Unprocessable(err) => on_unprocessable(err),
            OutcomeState::Failed(err) => on_failed(err),
        }
    }

    /// Runs `action` if the outcome succeeded, then returns it unchanged.
    #[must_use]
    pub fn on_success<F>(self, action: F) -> Self
    where
        F: FnOnce(Option<&T>),
    {
        if self.succeeded() {
            action(self.value());
        }
        self
    }

    /// Runs `action` if the outcome failed, then returns it unchanged.
    #[must_use]
    pub fn on_failure<F>(self, action: F) -> Self
    where
        F: FnOnce(OutcomeStatus, &OperationError),
    {
        if let Some(err) = self.error() {
            action(self.status(), err);
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
