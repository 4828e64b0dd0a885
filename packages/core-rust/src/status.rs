//! Seven-way operation status and its success/failure partition.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Use-case level classification of an operation result.
///
/// Numeric codes follow declaration order starting at 1 and are stable; they
/// are what crosses process boundaries (see [`OutcomeEnvelope`](crate::OutcomeEnvelope)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum OutcomeStatus {
    Completed = 1,
    NoOperation = 2,
    Invalid = 3,
    NotFound = 4,
    Unauthorized = 5,
    Unprocessable = 6,
    Failed = 7,
}

/// Raised when a raw status code names none of the known statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("status {status} is out of range for OutcomeStatus (expected 1..=7)")]
pub struct StatusOutOfRange {
    pub status: u8,
}

impl OutcomeStatus {
    /// Every status, in declaration order.
    pub const ALL: [OutcomeStatus; 7] = [
        Self::Completed,
        Self::NoOperation,
        Self::Invalid,
        Self::NotFound,
        Self::Unauthorized,
        Self::Unprocessable,
        Self::Failed,
    ];

    /// Stable numeric identity of this status.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// `true` for `Completed` and `NoOperation`.
    ///
    /// This partition is the only definition of success used anywhere.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Completed | Self::NoOperation)
    }

    #[must_use]
    pub const fn is_failure(self) -> bool {
        !self.is_success()
    }

    /// Error kind carried by failures with this status; `None` for successes.
    #[must_use]
    pub const fn error_kind(self) -> Option<ErrorKind> {
        match self {
            Self::Completed | Self::NoOperation => None,
            Self::Invalid => Some(ErrorKind::Validation),
            Self::Unauthorized => Some(ErrorKind::Authorization),
            Self::NotFound | Self::Unprocessable | Self::Failed => Some(ErrorKind::Unexpected),
        }
    }

    /// Human-readable name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::NoOperation => "no_operation",
            Self::Invalid => "invalid",
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::Unprocessable => "unprocessable",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<OutcomeStatus> for u8 {
    fn from(status: OutcomeStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for OutcomeStatus {
    type Error = StatusOutOfRange;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Completed),
            2 => Ok(Self::NoOperation),
            3 => Ok(Self::Invalid),
            4 => Ok(Self::NotFound),
            5 => Ok(Self::Unauthorized),
            6 => Ok(Self::Unprocessable),
            7 => Ok(Self::Failed),
            status => Err(StatusOutOfRange { status }),
        }
    }
}
