//! Failure cause taxonomy carried by failed outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse classification of why an operation failed.
///
/// Orthogonal to [`OutcomeStatus`](crate::OutcomeStatus): the status says what
/// happened at the use-case level, the kind says what caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No cause recorded.
    Unspecified,
    /// The command failed input validation.
    Validation,
    /// The caller is not allowed to perform the operation.
    Authorization,
    /// Anything else, including missing resources and unprocessable requests.
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unspecified => "unspecified",
            Self::Validation => "validation",
            Self::Authorization => "authorization",
            Self::Unexpected => "unexpected",
        };
        f.write_str(label)
    }
}

/// Error attached to every failed outcome.
///
/// Only the named constructors create values, so `kind` always agrees with
/// the context that produced the error. Messages keep their insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[error("{kind} error: {}", .messages.join("; "))]
pub struct OperationError {
    kind: ErrorKind,
    messages: Vec<String>,
}

impl OperationError {
    /// Validation error with one message per violated rule.
    ///
    /// An empty list is accepted; supplying at least one message is the
    /// caller's responsibility.
    pub fn validation<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: ErrorKind::Validation,
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }

    /// Authorization error with a single message.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Authorization,
            messages: vec![message.into()],
        }
    }

    /// Unexpected error with a single message.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Unexpected,
            messages: vec![message.into()],
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// First message, if any. Handy for adapters that surface a single line.
    #[must_use]
    pub fn first_message(&self) -> Option<&str> {
        self.messages.first().map(String::as_str)
    }
}
