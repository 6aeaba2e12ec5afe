//! Outbound email delivery
//!
//! Production delivery goes through the Resend HTTP API. The trait is the seam
//! used by the HTTP layer so tests can record deliveries instead.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

pub const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("email provider API key is not configured")]
    NotConfigured,
    #[error("email provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("email provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message, returning the provider's message id
    async fn send(&self, email: &OutboundEmail) -> Result<String, MailerError>;
}

pub struct ResendMailer {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

#[derive(serde::Deserialize)]
struct ResendResponse {
    id: String,
}

impl ResendMailer {
    pub fn new(api_key: Option<String>) -> Result<Self, MailerError> {
        Self::with_endpoint(api_key, RESEND_ENDPOINT)
    }

    pub fn with_endpoint(api_key: Option<String>, endpoint: &str) -> Result<Self, MailerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            client,
            api_key,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<String, MailerError> {
        let api_key = self.api_key.as_deref().ok_or(MailerError::NotConfigured)?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailerError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ResendResponse = response.json().await?;
        Ok(parsed.id)
    }
}
