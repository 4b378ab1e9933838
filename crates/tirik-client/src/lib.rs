//! # tirik-client
//!
//! HTTP client for the Tirikchilik donation API.
//!
//! A [`TirikClient`] owns a pooled [`Session`] and the donate id of one
//! project, resolved once while connecting.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/api/User/GetByName?userName=` | Resolve project (on connect) |
//! | POST | `/api/ProjectPay/Create` | Create payment |
//! | GET | `/api/ProjectPay/Status?payId=` | Payment status |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tirik_client::TirikClient;
//! use tirik_core::{Card, PaymentCreated, PaymentRequest};
//!
//! let client = TirikClient::from_env("my-project").await?;
//!
//! let request = PaymentRequest::new(50_000, Card::new("8600123412341234", "2709"))
//!     .with_donater("Aziz");
//! let envelope = client.create_payment(&request).await?;
//! let created: PaymentCreated = envelope.data_as()?;
//!
//! // Redirect the donor to created.checkout_url, then poll:
//! let status = client.get_payment_status(&created.pay_id).await?;
//! ```

pub mod client;
pub mod config;
pub mod session;

// Re-exports
pub use client::TirikClient;
pub use config::{RetryPolicy, TirikConfig};
pub use session::{HttpMethod, Session};
