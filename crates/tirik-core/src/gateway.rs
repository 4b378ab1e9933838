//! # Donation Gateway Trait
//!
//! The seam between callers and a concrete donation API client.
//! `tirik-client` provides the HTTP implementation; tests and tools can
//! substitute their own.

use crate::envelope::Envelope;
use crate::error::PaymentResult;
use crate::payment::PaymentRequest;
use async_trait::async_trait;
use std::sync::Arc;

/// Operations available once a project has been resolved.
#[async_trait]
pub trait DonationGateway: Send + Sync {
    /// Project id resolved when the gateway was constructed.
    fn project_id(&self) -> i64;

    /// Submit a card payment and return the upstream envelope verbatim.
    async fn create_payment(&self, request: &PaymentRequest) -> PaymentResult<Envelope>;

    /// Fetch the upstream status envelope for a payment.
    async fn get_payment_status(&self, pay_id: &str) -> PaymentResult<Envelope>;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type SharedGateway = Arc<dyn DonationGateway>;
