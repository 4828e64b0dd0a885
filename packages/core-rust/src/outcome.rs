//! The outcome envelope returned by every operation.

use std::collections::BTreeMap;

use crate::error::OperationError;
use crate::status::OutcomeStatus;

/// Free-form string annotations carried alongside an outcome.
pub type Metadata = BTreeMap<String, String>;

/// Status-specific payload of an [`Outcome`].
///
/// One variant per [`OutcomeStatus`]. Success variants cannot hold an error
/// and failure variants cannot hold a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeState<T> {
    /// Operation completed. The value is absent for outcomes decoded from an
    /// envelope that carried none, and after a short-circuited `map`/`bind`.
    Completed(Option<T>),
    /// Nothing happened; never carries a value.
    NoOperation,
    Invalid(OperationError),
    NotFound(OperationError),
    Unauthorized(OperationError),
    Unprocessable(OperationError),
    Failed(OperationError),
}

impl<T> OutcomeState<T> {
    #[must_use]
    pub fn status(&self) -> OutcomeStatus {
        match self {
            Self::Completed(_) => OutcomeStatus::Completed,
            Self::NoOperation => OutcomeStatus::NoOperation,
            Self::Invalid(_) => OutcomeStatus::Invalid,
            Self::NotFound(_) => OutcomeStatus::NotFound,
            Self::Unauthorized(_) => OutcomeStatus::Unauthorized,
            Self::Unprocessable(_) => OutcomeStatus::Unprocessable,
            Self::Failed(_) => OutcomeStatus::Failed,
        }
    }

    /// Same status and error, value dropped, retyped to `U`.
    pub(crate) fn without_value<U>(self) -> OutcomeState<U> {
        match self {
            Self::Completed(_) => OutcomeState::Completed(None),
            Self::NoOperation => OutcomeState::NoOperation,
            Self::Invalid(err) => OutcomeState::Invalid(err),
            Self::NotFound(err) => OutcomeState::NotFound(err),
            Self::Unauthorized(err) => OutcomeState::Unauthorized(err),
            Self::Unprocessable(err) => OutcomeState::Unprocessable(err),
            Self::Failed(err) => OutcomeState::Failed(err),
        }
    }

    /// Rebuilds a failure state from its status and error.
    ///
    /// Returns `None` for success statuses and for an error whose kind is not
    /// the one [`OutcomeStatus::error_kind`] assigns to `status`.
    pub(crate) fn failure(status: OutcomeStatus, error: OperationError) -> Option<Self> {
        if status.error_kind() != Some(error.kind()) {
            return None;
        }
        match status {
            OutcomeStatus::Completed | OutcomeStatus::NoOperation => None,
            OutcomeStatus::Invalid => Some(Self::Invalid(error)),
            OutcomeStatus::NotFound => Some(Self::NotFound(error)),
            OutcomeStatus::Unauthorized => Some(Self::Unauthorized(error)),
            OutcomeStatus::Unprocessable => Some(Self::Unprocessable(error)),
            OutcomeStatus::Failed => Some(Self::Failed(error)),
        }
    }
}

/// Result of a use-case operation: success, semantic no-op, or a typed failure.
///
/// Immutable once built. Every combinator consumes the outcome and returns a
/// new one. Two outcomes are equal when status, value, error and metadata
/// all compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub(crate) state: OutcomeState<T>,
    pub(crate) metadata: Option<Metadata>,
}

impl<T> Outcome<T> {
    /// `Completed` with `value` attached.
    pub fn success(value: T) -> Self {
        Self::from_state(OutcomeState::Completed(Some(value)))
    }

    /// `NoOperation` with no value.
    pub fn no_operation() -> Self {
        Self::from_state(OutcomeState::NoOperation)
    }

    /// `NoOperation`; the supplied value is dropped.
    ///
    /// A no-op signals that nothing happened, so forwarding a payload would
    /// misrepresent it.
    pub fn no_operation_with(value: T) -> Self {
        drop(value);
        Self::no_operation()
    }

    /// `Invalid` with a [`Validation`](crate::ErrorKind::Validation) error.
    pub fn validation_failure<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_state(OutcomeState::Invalid(OperationError::validation(messages)))
    }

    /// `NotFound` with an [`Unexpected`](crate::ErrorKind::Unexpected) error.
    pub fn not_found_failure(message: impl Into<String>) -> Self {
        Self::from_state(OutcomeState::NotFound(OperationError::unexpected(message)))
    }

    /// `Unauthorized` with an [`Authorization`](crate::ErrorKind::Authorization) error.
    pub fn authorization_failure(message: impl Into<String>) -> Self {
        Self::from_state(OutcomeState::Unauthorized(OperationError::authorization(
            message,
        )))
    }

    /// `Unprocessable` with an [`Unexpected`](crate::ErrorKind::Unexpected) error.
    pub fn unprocessable_failure(message: impl Into<String>) -> Self {
        Self::from_state(OutcomeState::Unprocessable(OperationError::unexpected(
            message,
        )))
    }

    /// `Failed` with an [`Unexpected`](crate::ErrorKind::Unexpected) error.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::from_state(OutcomeState::Failed(OperationError::unexpected(message)))
    }

    /// Wraps an explicit state with no metadata.
    ///
    /// Crate-private: failure states built here must pair each status with
    /// its error kind, which the public factories guarantee.
    pub(crate) fn from_state(state: OutcomeState<T>) -> Self {
        Self {
            state,
            metadata: None,
        }
    }

    /// Returns a new outcome with `key` set in its metadata.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(Metadata::new)
            .insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn status(&self) -> OutcomeStatus {
        self.state.status()
    }

    /// Derived purely from [`OutcomeStatus::is_success`].
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status().is_success()
    }

    #[must_use]
    pub fn failed(&self) -> bool {
        !self.succeeded()
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match &self.state {
            OutcomeState::Completed(value) => value.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self.state {
            OutcomeState::Completed(value) => value,
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&OperationError> {
        match &self.state {
            OutcomeState::Completed(_) | OutcomeState::NoOperation => None,
            OutcomeState::Invalid(err)
            | OutcomeState::NotFound(err)
            | OutcomeState::Unauthorized(err)
            | OutcomeState::Unprocessable(err)
            | OutcomeState::Failed(err) => Some(err),
        }
    }

    #[must_use]
    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> &OutcomeState<T> {
        &self.state
    }

    #[must_use]
    pub fn into_state(self) -> OutcomeState<T> {
        self.state
    }

    /// Collapses the outcome for `?`-style propagation.
    ///
    /// `NoOperation` and a value-less `Completed` become `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns the attached [`OperationError`] for every failure status.
    pub fn into_result(self) -> Result<Option<T>, OperationError> {
        match self.state {
            OutcomeState::Completed(value) => Ok(value),
            OutcomeState::NoOperation => Ok(None),
            OutcomeState::Invalid(err)
            | OutcomeState::NotFound(err)
            | OutcomeState::Unauthorized(err)
            | OutcomeState::Unprocessable(err)
            | OutcomeState::Failed(err) => Err(err),
        }
    }
}

impl Outcome<()> {
    /// `Completed` for operations with nothing to return.
    #[must_use]
    pub fn completed() -> Self {
        Self::success(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
