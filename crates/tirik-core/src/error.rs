//! # Payment Error Types
//!
//! Typed error handling for the Tirikchilik client.
//! All client operations return `Result<T, PaymentError>`.
//!
//! Four kinds make up the domain taxonomy: `Failed` (the generic payment
//! error), `CardNotFound`, `PaymentNotFound` and `UserNotFound`. The
//! remaining variants are faults outside that taxonomy: a broken
//! configuration, or an upstream body that could not be decoded at all.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Fallback message when the upstream error carries no usable `message.en`.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Message, code and description reported by the upstream API.
///
/// `code` and `description` are `None` for failures raised locally
/// (transport errors, unsupported methods).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamError {
    pub message: String,
    pub code: Option<String>,
    pub description: Option<String>,
}

impl UpstreamError {
    /// A locally raised failure with no upstream code or description.
    pub fn local(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            description: None,
        }
    }

    pub fn new(
        message: impl Into<String>,
        code: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code,
            description,
        }
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Code: {}. Message: {}. Description: {}",
            self.code.as_deref().unwrap_or("none"),
            self.message,
            self.description.as_deref().unwrap_or("none"),
        )
    }
}

/// Core error type for all client operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Generic payment failure: unclassified upstream error, transport
    /// failure, or misuse caught before any I/O.
    #[error("PaymentError. {0}")]
    Failed(UpstreamError),

    /// The upstream card lookup failed; `details` is lifted from the
    /// JSON nested inside the error description.
    #[error("CardNotFoundError. Details: {details}. Code: {code}")]
    CardNotFound {
        details: Value,
        code: String,
        description: String,
    },

    /// The referenced payment (or other upstream resource) does not exist
    #[error("PaymentNotFoundError. {0}")]
    PaymentNotFound(UpstreamError),

    /// Project lookup succeeded but returned no record
    #[error("UserNotFoundError. {message}")]
    UserNotFound { message: String },

    /// Configuration errors (bad env values, transport could not be built)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Upstream body (or its nested description) could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl PaymentError {
    /// Generic failure with a locally produced message.
    pub fn failed(message: impl Into<String>) -> Self {
        PaymentError::Failed(UpstreamError::local(message))
    }

    /// `User '<name>' not found`
    pub fn user_not_found(name: &str) -> Self {
        PaymentError::UserNotFound {
            message: format!("User '{}' not found", name),
        }
    }

    /// Upstream machine code, when the error came from the API
    pub fn code(&self) -> Option<&str> {
        match self {
            PaymentError::Failed(e) | PaymentError::PaymentNotFound(e) => e.code.as_deref(),
            PaymentError::CardNotFound { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Raw upstream description, when the error came from the API
    pub fn description(&self) -> Option<&str> {
        match self {
            PaymentError::Failed(e) | PaymentError::PaymentNotFound(e) => {
                e.description.as_deref()
            }
            PaymentError::CardNotFound { description, .. } => Some(description),
            _ => None,
        }
    }

    /// Human-readable message without the variant prefix
    pub fn message(&self) -> String {
        match self {
            PaymentError::Failed(e) | PaymentError::PaymentNotFound(e) => e.message.clone(),
            PaymentError::CardNotFound { details, .. } => match details {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
            PaymentError::UserNotFound { message } => message.clone(),
            PaymentError::Configuration(m) | PaymentError::MalformedResponse(m) => m.clone(),
        }
    }

    /// True for the four domain kinds; false for configuration and decode faults
    pub fn is_domain_error(&self) -> bool {
        !matches!(
            self,
            PaymentError::Configuration(_) | PaymentError::MalformedResponse(_)
        )
    }
}

/// Result type alias for client operations
pub type PaymentResult<T> = Result<T, PaymentError>;
