//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Stripe API error
    #[error("Stripe error: {0}")]
    Stripe(String),

    /// Transport failure talking to Stripe
    #[error("HTTP error: {0}")]
    Http(String),

    /// Stripe did not answer in time
    #[error("Stripe request timed out")]
    Timeout,

    /// Required request field missing or blank
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Request field present but unusable
    #[error("Invalid field {field}: {value}")]
    InvalidField { field: &'static str, value: String },

    /// Unrecognized `action_type`
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),
}

impl PaymentError {
    /// Whether the caller sent a bad request
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PaymentError::MissingField(_)
                | PaymentError::InvalidField { .. }
                | PaymentError::UnknownAction(_)
        )
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            PaymentError::Stripe(msg) => msg.clone(),
            PaymentError::Timeout => "The payment service did not respond in time.".into(),
            PaymentError::MissingField(field) => format!("{field} is required."),
            PaymentError::InvalidField { field, .. } => format!("{field} is invalid."),
            PaymentError::UnknownAction(action) => format!("Unknown action: {action}"),
            PaymentError::Config(_) => "Service configuration error.".into(),
            _ => "Payment processing failed. Please try again.".into(),
        }
    }
}

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PaymentError::Timeout
        } else if err.is_decode() {
            PaymentError::Parse(err.to_string())
        } else {
            PaymentError::Http(err.to_string())
        }
    }
}

impl From<stripe::StripeError> for PaymentError {
    fn from(err: stripe::StripeError) -> Self {
        PaymentError::Stripe(err.to_string())
    }
}
