//! # Tirikchilik Client
//!
//! A client is bound to one project. The project name is resolved to its
//! donate id once, while connecting; every payment made through the client
//! targets that id.

use crate::config::TirikConfig;
use crate::session::Session;
use async_trait::async_trait;
use tirik_core::{
    is_truthy, DonationGateway, Envelope, PaymentError, PaymentRequest, PaymentResult,
    ProjectUser,
};
use tracing::{debug, info, instrument};

/// HTTP client for the Tirikchilik donation API
#[derive(Debug, Clone)]
pub struct TirikClient {
    config: TirikConfig,
    session: Session,
    project_id: i64,
}

impl TirikClient {
    /// Connect with default configuration and resolve `project_name`.
    pub async fn connect(project_name: &str) -> PaymentResult<Self> {
        Self::connect_with(TirikConfig::default(), project_name).await
    }

    /// Connect using configuration loaded from the environment
    pub async fn from_env(project_name: &str) -> PaymentResult<Self> {
        let config = TirikConfig::from_env()?;
        Self::connect_with(config, project_name).await
    }

    /// Connect with explicit configuration and resolve `project_name`.
    ///
    /// Fails if the transport cannot be built or the project cannot be
    /// resolved.
    pub async fn connect_with(config: TirikConfig, project_name: &str) -> PaymentResult<Self> {
        let session = Session::new(&config)?;
        let project_id = resolve_project(&session, &config, project_name).await?;

        info!(project = project_name, project_id, "Resolved Tirikchilik project");

        Ok(Self {
            config,
            session,
            project_id,
        })
    }

    pub fn project_id(&self) -> i64 {
        self.project_id
    }

    pub fn config(&self) -> &TirikConfig {
        &self.config
    }

    /// Underlying session, for raw calls against the same API
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Create a payment towards the resolved project.
    ///
    /// Returns the upstream envelope verbatim; decode it with
    /// `envelope.data_as::<PaymentCreated>()` for typed access.
    #[instrument(
        skip(self, request),
        fields(
            project_id = self.project_id,
            amount = request.amount,
            card = %request.card.masked_pan()
        )
    )]
    pub async fn create_payment(&self, request: &PaymentRequest) -> PaymentResult<Envelope> {
        let body = request.to_body(self.project_id)?;
        let envelope = self
            .session
            .post(&self.config.create_payment_url(), &body)
            .await?;

        info!("Created payment");
        Ok(envelope)
    }

    /// Fetch the status envelope for `pay_id`.
    ///
    /// Status values (`"Paid"`, `"Pending"`, ...) are passed through as sent.
    #[instrument(skip(self))]
    pub async fn get_payment_status(&self, pay_id: &str) -> PaymentResult<Envelope> {
        let envelope = self
            .session
            .get(&self.config.payment_status_url(), &[("payId", pay_id)])
            .await?;

        debug!(status = ?envelope.data(), "Fetched payment status");
        Ok(envelope)
    }
}

#[async_trait]
impl DonationGateway for TirikClient {
    fn project_id(&self) -> i64 {
        self.project_id
    }

    async fn create_payment(&self, request: &PaymentRequest) -> PaymentResult<Envelope> {
        TirikClient::create_payment(self, request).await
    }

    async fn get_payment_status(&self, pay_id: &str) -> PaymentResult<Envelope> {
        TirikClient::get_payment_status(self, pay_id).await
    }
}

/// Look up `name` and return its donate id.
#[instrument(skip(session, config))]
async fn resolve_project(
    session: &Session,
    config: &TirikConfig,
    name: &str,
) -> PaymentResult<i64> {
    let envelope = session
        .get(&config.user_lookup_url(), &[("userName", name)])
        .await?;

    project_id_from(&envelope, name)
}

/// Pull `data.donateId` out of a lookup envelope
fn project_id_from(envelope: &Envelope, name: &str) -> PaymentResult<i64> {
    if !envelope.data().map(is_truthy).unwrap_or(false) {
        return Err(PaymentError::user_not_found(name));
    }

    let user: ProjectUser = envelope.data_as().map_err(|e| {
        PaymentError::MalformedResponse(format!("User lookup for '{}': {}", name, e.message()))
    })?;
    Ok(user.donate_id)
}
