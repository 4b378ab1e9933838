//! # tirik-core
//!
//! Core types for the Tirikchilik donation API client.
//!
//! This crate provides:
//! - `Envelope` and `check_envelope` for the `{success, data, error}` wrapper
//! - `classify_error` mapping upstream error objects to `PaymentError`
//! - `PaymentRequest` and `Card` for create-payment bodies
//! - `DonationGateway` trait implemented by the HTTP client
//!
//! Nothing here performs I/O.
//!
//! ## Example
//!
//! ```rust
//! use tirik_core::{check_envelope, PaymentError};
//! use serde_json::json;
//!
//! let err = check_envelope(json!({
//!     "success": false,
//!     "error": { "code": "ERROR_NOT_FOUND", "message": { "en": "Not found" } }
//! }))
//! .unwrap_err();
//!
//! assert!(matches!(err, PaymentError::PaymentNotFound(_)));
//! ```

pub mod envelope;
pub mod error;
pub mod gateway;
pub mod payment;

// Re-exports for convenience
pub use envelope::{check_envelope, classify_error, is_truthy, Envelope};
pub use error::{PaymentError, PaymentResult, UpstreamError};
pub use gateway::{DonationGateway, SharedGateway};
pub use payment::{Card, CreatePaymentBody, PaymentCreated, PaymentRequest, ProjectUser};
