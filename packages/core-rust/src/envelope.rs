//! Flat wire shape of an outcome and its validating conversion.
//!
//! Adapters that serialize outcomes exchange an [`OutcomeEnvelope`]: a raw
//! numeric status plus optional value, error and metadata. Converting back
//! into an [`Outcome`] is where malformed records are rejected, including
//! status codes outside the seven known members.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, OperationError};
use crate::outcome::{Metadata, Outcome, OutcomeState};
use crate::status::{OutcomeStatus, StatusOutOfRange};

/// Serializable `{status, value, error, metadata}` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeEnvelope<T> {
    /// Raw status code; see [`OutcomeStatus::code`].
    pub status: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Reasons an envelope cannot become an [`Outcome`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    #[error(transparent)]
    OutOfRange(#[from] StatusOutOfRange),
    #[error("failure status {status} must not carry a value")]
    UnexpectedValue { status: OutcomeStatus },
    #[error("success status {status} must not carry an error")]
    UnexpectedError { status: OutcomeStatus },
    #[error("failure status {status} is missing its error")]
    MissingError { status: OutcomeStatus },
    #[error("failure status {status} cannot carry a {kind} error")]
    KindMismatch {
        status: OutcomeStatus,
        kind: ErrorKind,
    },
}

impl<T> OutcomeEnvelope<T> {
    /// Decodes the envelope and runs the matching handler.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::OutOfRange`] naming the offending code when
    /// `status` is not one of the seven known statuses, or another
    /// [`EnvelopeError`] when the record breaks an outcome invariant.
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
    ) -> Result<R, EnvelopeError> {
        let outcome = Outcome::<T>::try_from(self)?;
        Ok(outcome.match_detailed(
            on_completed,
            on_no_operation,
            on_invalid,
            on_not_found,
            on_unauthorized,
            on_unprocessable,
            on_failed,
        ))
    }
}

impl<T> From<Outcome<T>> for OutcomeEnvelope<T> {
    fn from(outcome: Outcome<T>) -> Self {
        let status = outcome.status().code();
        let Outcome { state, metadata } = outcome;
        let (value, error) = match state {
            OutcomeState::Completed(value) => (value, None),
            OutcomeState::NoOperation => (None, None),
            OutcomeState::Invalid(err)
            | OutcomeState::NotFound(err)
            | OutcomeState::Unauthorized(err)
            | OutcomeState::Unprocessable(err)
            | OutcomeState::Failed(err) => (None, Some(err)),
        };
        Self {
            status,
            value,
            error,
            metadata,
        }
    }
}

impl<T> TryFrom<OutcomeEnvelope<T>> for Outcome<T> {
    type Error = EnvelopeError;

    /// A value on a `NoOperation` envelope is dropped, matching
    /// [`Outcome::no_operation_with`]. A failure's error kind must be the one
    /// [`OutcomeStatus::error_kind`] assigns to its status.
    fn try_from(envelope: OutcomeEnvelope<T>) -> Result<Self, Self::Error> {
        let status = OutcomeStatus::try_from(envelope.status)?;
        let state = match (status, envelope.value, envelope.error) {
            (OutcomeStatus::Completed | OutcomeStatus::NoOperation, _, Some(_)) => {
                return Err(EnvelopeError::UnexpectedError { status });
            }
            (OutcomeStatus::Completed, value, None) => OutcomeState::Completed(value),
            (OutcomeStatus::NoOperation, _, None) => OutcomeState::NoOperation,
            (_, Some(_), _) => return Err(EnvelopeError::UnexpectedValue { status }),
            (_, None, None) => return Err(EnvelopeError::MissingError { status }),
            (_, None, Some(err)) => {
                let kind = err.kind();
                OutcomeState::failure(status, err)
                    .ok_or(EnvelopeError::KindMismatch { status, kind })?
            }
        };
        Ok(Outcome {
            state,
            metadata: envelope.metadata,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status: u8) -> OutcomeEnvelope<i32> {
        OutcomeEnvelope {
            status,
            value: None,
            error: None,
            metadata: None,
        }
    }

    #[test]
    fn envelope_from_outcome_flattens_fields() {
        let envelope: OutcomeEnvelope<i32> =
            Outcome::not_found_failure("gone").with_metadata("id", "7").into();
        assert_eq!(envelope.status, 4);
        assert!(envelope.value.is_none());
        assert_eq!(
            envelope.error.as_ref().map(OperationError::kind),
            Some(ErrorKind::Unexpected)
        );
        assert_eq!(
            envelope.metadata.as_ref().and_then(|m| m.get("id")).map(String::as_str),
            Some("7")
        );
    }

    #[test]
    fn converts_back_into_equal_outcome() {
        let outcomes: Vec<Outcome<i32>> = vec![
            Outcome::success(1).with_metadata("k", "v"),
            Outcome::no_operation(),
            Outcome::validation_failure(["x", "y"]),
            Outcome::authorization_failure("no"),
            Outcome::failure("boom"),
        ];
        for outcome in outcomes {
            let envelope = OutcomeEnvelope::from(outcome.clone());
            assert_eq!(Outcome::<i32>::try_from(envelope), Ok(outcome));
        }
    }

    #[test]
    fn json_shape_omits_absent_fields() {
        let envelope = OutcomeEnvelope::from(Outcome::success("hi".to_string()));
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json, serde_json::json!({ "status": 1, "value": "hi" }));
    }

    #[test]
    fn out_of_range_status_names_the_code() {
        let err = Outcome::<i32>::try_from(raw(9)).unwrap_err();
        assert_eq!(err, EnvelopeError::OutOfRange(StatusOutOfRange { status: 9 }));
        assert!(err.to_string().contains("status 9"));
    }

    #[test]
    fn match_detailed_rejects_out_of_range_status() {
        let result = raw(0).match_detailed(
            |_| "completed",
            || "no-op",
            |_| "invalid",
            |_| "not found",
            |_| "unauthorized",
            |_| "unprocessable",
            |_| "failed",
        );
        assert!(matches!(
            result,
            Err(EnvelopeError::OutOfRange(StatusOutOfRange { status: 0 }))
        ));
    }

    #[test]
    fn match_detailed_dispatches_decoded_envelope() {
        let envelope = OutcomeEnvelope::from(Outcome::<i32>::unprocessable_failure("stuck"));
        let result = envelope.match_detailed(
            |_| String::new(),
            String::new,
            |_| String::new(),
            |_| String::new(),
            |_| String::new(),
            |err| err.first_message().unwrap_or_default().to_string(),
            |_| String::new(),
        );
        assert_eq!(result, Ok("stuck".to_string()));
    }

    #[test]
    fn rejects_value_on_failure() {
        let mut envelope = raw(7);
        envelope.value = Some(1);
        envelope.error = Some(OperationError::unexpected("boom"));
        assert_eq!(
            Outcome::<i32>::try_from(envelope),
            Err(EnvelopeError::UnexpectedValue {
                status: OutcomeStatus::Failed
            })
        );
    }

    #[test]
    fn rejects_error_on_success() {
        let mut envelope = raw(1);
        envelope.error = Some(OperationError::unexpected("boom"));
        assert_eq!(
            Outcome::<i32>::try_from(envelope),
            Err(EnvelopeError::UnexpectedError {
                status: OutcomeStatus::Completed
            })
        );
    }

    #[test]
    fn rejects_failure_without_error() {
        assert_eq!(
            Outcome::<i32>::try_from(raw(5)),
            Err(EnvelopeError::MissingError {
                status: OutcomeStatus::Unauthorized
            })
        );
    }

    #[test]
    fn rejects_error_kind_that_disagrees_with_status() {
        let not_found: OutcomeEnvelope<i32> =
            serde_json::from_str(r#"{"status":4,"error":{"kind":"validation","messages":[]}}"#)
                .unwrap();
        assert_eq!(
            Outcome::<i32>::try_from(not_found),
            Err(EnvelopeError::KindMismatch {
                status: OutcomeStatus::NotFound,
                kind: ErrorKind::Validation
            })
        );

        let failed: OutcomeEnvelope<i32> = serde_json::from_str(
            r#"{"status":7,"error":{"kind":"unspecified","messages":["boom"]}}"#,
        )
        .unwrap();
        let err = Outcome::<i32>::try_from(failed).unwrap_err();
        assert_eq!(
            err,
            EnvelopeError::KindMismatch {
                status: OutcomeStatus::Failed,
                kind: ErrorKind::Unspecified
            }
        );
        assert_eq!(
            err.to_string(),
            "failure status failed cannot carry a unspecified error"
        );

        let mut invalid = raw(3);
        invalid.error = Some(OperationError::authorization("x"));
        assert!(matches!(
            Outcome::<i32>::try_from(invalid),
            Err(EnvelopeError::KindMismatch { .. })
        ));
    }

    #[test]
    fn accepts_every_factory_kind() {
        let outcomes: Vec<Outcome<i32>> = vec![
            Outcome::validation_failure(["bad"]),
            Outcome::not_found_failure("gone"),
            Outcome::authorization_failure("no"),
            Outcome::unprocessable_failure("stuck"),
            Outcome::failure("boom"),
        ];
        for outcome in outcomes {
            let envelope = OutcomeEnvelope::from(outcome.clone());
            assert_eq!(Outcome::<i32>::try_from(envelope), Ok(outcome));
        }
    }

    #[test]
    fn drops_value_on_no_operation() {
        let mut envelope = raw(2);
        envelope.value = Some(10);
        assert_eq!(Outcome::<i32>::try_from(envelope), Ok(Outcome::no_operation()));
    }

    #[test]
    fn completed_without_value_decodes_as_empty() {
        let outcome = Outcome::<i32>::try_from(raw(1)).unwrap();
        assert_eq!(outcome.status(), OutcomeStatus::Completed);
        assert!(outcome.value().is_none());
    }

    #[test]
    fn deserializes_from_json() {
        let envelope: OutcomeEnvelope<i32> = serde_json::from_str(
            r#"{"status":3,"error":{"kind":"validation","messages":["too short"]}}"#,
        )
        .unwrap();
        let outcome = Outcome::<i32>::try_from(envelope).unwrap();
        assert_eq!(outcome, Outcome::validation_failure(["too short"]));
    }
}
