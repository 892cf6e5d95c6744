//! Checkout Flow Error Types

use thiserror::Error;

use crate::readiness::NotReady;

/// Result type alias for checkout flow operations
pub type Result<T> = std::result::Result<T, FlowError>;

/// Checkout flow errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// Card rejected by the gateway during tokenization
    #[error("Tokenization error: {0}")]
    Tokenization(String),

    /// A client-side handle is not available yet
    #[error("Not ready: {0}")]
    NotReady(NotReady),

    /// A required identifier is missing
    #[error("Missing identifier: {0}")]
    MissingIdentifier(&'static str),

    /// Request to the intent handler failed
    #[error("Request failed: {0}")]
    Request(String),

    /// Client-side next action failed
    #[error("Next action failed: {0}")]
    NextAction(String),

    /// Plan selector token could not be decoded
    #[error("Invalid plan token: {0}")]
    InvalidToken(String),

    /// Operation not valid in the current flow state
    #[error("Invalid state: {0}")]
    InvalidState(&'static str),
}

impl FlowError {
    /// Whether this error should reach the error slot at all.
    /// Missing handles and stale submits are skipped quietly.
    pub fn is_silent(&self) -> bool {
        matches!(self, FlowError::NotReady(_) | FlowError::InvalidState(_))
    }

    /// Message for the error slot
    pub fn user_message(&self) -> String {
        match self {
            FlowError::Tokenization(msg) | FlowError::NextAction(msg) => msg.clone(),
            FlowError::MissingIdentifier(field) => format!("{field} is required"),
            FlowError::Request(_) => "Payment request failed. Please try again.".into(),
            FlowError::InvalidToken(_) => "Please choose a valid payment plan.".into(),
            FlowError::NotReady(_) | FlowError::InvalidState(_) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_errors() {
        assert!(FlowError::NotReady(NotReady::CardElement).is_silent());
        assert!(FlowError::InvalidState("no intent awaiting confirmation").is_silent());
        assert!(!FlowError::Request("timeout".into()).is_silent());
    }

    #[test]
    fn test_user_message() {
        assert_eq!(
            FlowError::Tokenization("Your card number is incomplete.".into()).user_message(),
            "Your card number is incomplete."
        );
        assert_eq!(
            FlowError::Request("HTTP 502".into()).user_message(),
            "Payment request failed. Please try again."
        );
        assert_eq!(
            FlowError::MissingIdentifier("customer_id").user_message(),
            "customer_id is required"
        );
    }
}
