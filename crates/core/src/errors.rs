//! Core error types for the Recurra engine.
//!
//! Transport-specific errors (reqwest, serde) are converted to these types
//! by the adapter crates so that the settlement logic can reason about
//! failure kinds without knowing how a collaborator is reached.

use std::time::Duration;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Generic message shown when a failure carries nothing more specific.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Root error type for the bill engine.
#[derive(Error, Debug)]
pub enum Error {
    /// The request never completed (connection refused, DNS, reset, ...).
    #[error("Network request failed: {0}")]
    NetworkFailure(String),

    /// The request did not complete within the configured bound.
    /// Handled exactly like a network failure.
    #[error("Operation '{operation}' timed out after {after:?}")]
    Timeout { operation: String, after: Duration },

    /// The remote service answered with a non-success status.
    #[error("Server rejected the request (HTTP {status}): {}", message.as_deref().unwrap_or("no message"))]
    ServerRejected {
        status: u16,
        message: Option<String>,
    },

    /// The primary settlement succeeded but a dependent loan or savings
    /// action did not.
    #[error("Compensation failed: {0}")]
    CompensationFailed(String),

    /// Another settlement for the same bill has not finished yet.
    #[error("A settlement is already in progress for bill {0}")]
    SettlementInProgress(String),

    #[error("Input validation failed: {0}")]
    Validation(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration value: {0}")]
    Config(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// True for failures where the primary request never produced a
    /// server-side effect that we know of.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::NetworkFailure(_) | Error::Timeout { .. })
    }

    /// Every settlement failure can be retried by the user.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::NetworkFailure(_)
                | Error::Timeout { .. }
                | Error::ServerRejected { .. }
                | Error::CompensationFailed(_)
                | Error::SettlementInProgress(_)
        )
    }

    /// Message suitable for a toast: the server's own message when it sent
    /// one, otherwise a generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            Error::ServerRejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            Error::Validation(message) => message.clone(),
            Error::SettlementInProgress(_) => {
                "This bill is already being updated. Please wait.".to_string()
            }
            Error::CompensationFailed(_) => {
                "The bill was updated, but a linked loan or savings goal could not be adjusted."
                    .to_string()
            }
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Unexpected(format!("Failed to parse payload: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_server_message() {
        let err = Error::ServerRejected {
            status: 422,
            message: Some("Bill is already paid".to_string()),
        };
        assert_eq!(err.user_message(), "Bill is already paid");
    }

    #[test]
    fn user_message_falls_back_for_blank_or_missing_message() {
        let blank = Error::ServerRejected {
            status: 500,
            message: Some("  ".to_string()),
        };
        assert_eq!(blank.user_message(), GENERIC_FAILURE_MESSAGE);

        let network = Error::NetworkFailure("connection reset".to_string());
        assert_eq!(network.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn timeouts_are_network_failures() {
        let err = Error::Timeout {
            operation: "mark bill paid".to_string(),
            after: Duration::from_secs(15),
        };
        assert!(err.is_network());
        assert!(err.is_recoverable());
        assert!(!Error::Unexpected("boom".into()).is_recoverable());
    }
}
