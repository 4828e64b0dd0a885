//! Outcome core: the typed result envelope returned by use-case operations,
//! its status/error taxonomy, and the combinators that chain outcomes.

pub mod combinators;
pub mod command;
pub mod envelope;
pub mod error;
pub mod outcome;
pub mod status;

pub use command::Command;
pub use envelope::{EnvelopeError, OutcomeEnvelope};
pub use error::{ErrorKind, OperationError};
pub use outcome::{Metadata, Outcome, OutcomeState};
pub use status::{OutcomeStatus, StatusOutOfRange};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_chains() {
        let mapped = Outcome::success(42).map(|x| x.to_string());
        assert_eq!(mapped, Outcome::success("42".to_string()));

        let mut invoked = false;
        let invalid = Outcome::<i32>::validation_failure(["Error"]).map(|x| {
            invoked = true;
            x.to_string()
        });
        assert!(!invoked);
        assert_eq!(invalid.status(), OutcomeStatus::Invalid);
        assert!(invalid.value().is_none());

        let missing = Outcome::<i32>::not_found_failure("Not found")
            .bind(|x| Outcome::success(x + 1));
        assert_eq!(missing.status(), OutcomeStatus::NotFound);

        let bound = Outcome::success(10).bind(|x| Outcome::success(format!("Value: {x}")));
        assert_eq!(bound.status(), OutcomeStatus::Completed);
        assert_eq!(bound.value().map(String::as_str), Some("Value: 10"));
    }
}
