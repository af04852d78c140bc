//! Analysis service transport.
//!
//! The transport only moves bytes: it reports the HTTP status and raw body
//! and fails only when no response was obtained. Status and payload policy
//! belong to the dispatcher.

use std::time::Duration;

use async_trait::async_trait;
use pharmaguard_common::{PharmaGuardError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, instrument};

use crate::request::{AnalysisRequest, FormField};

pub const DEFAULT_ENDPOINT: &str = "https://pharmaguard-production.up.railway.app/full-analysis";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Raw response of the analysis endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    /// Issue exactly one POST for `request`.
    async fn submit(&self, request: &AnalysisRequest) -> Result<TransportResponse>;
}

/// reqwest-backed client for the analysis endpoint.
pub struct HttpAnalysisClient {
    endpoint: String,
    client: Client,
}

impl HttpAnalysisClient {
    pub fn new(endpoint: Option<&str>, timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
            .build()
            .map_err(|e| PharmaGuardError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            endpoint: endpoint.unwrap_or(DEFAULT_ENDPOINT).to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Build the multipart body from the request's field list.
pub fn build_form(request: &AnalysisRequest) -> Result<Form> {
    let mut form = Form::new();
    for field in request.form_fields() {
        form = match field {
            FormField::File { name, file_name, mime, bytes } => {
                let part = Part::bytes(bytes.to_vec())
                    .file_name(file_name.to_string())
                    .mime_str(mime)?;
                form.part(name, part)
            }
            FormField::Text { name, value } => form.text(name, value),
        };
    }
    Ok(form)
}

#[async_trait]
impl AnalysisTransport for HttpAnalysisClient {
    #[instrument(skip(self, request), fields(endpoint = %self.endpoint, drugs = request.drugs().len()))]
    async fn submit(&self, request: &AnalysisRequest) -> Result<TransportResponse> {
        let form = build_form(request)?;

        debug!(file = request.file().name(), "Posting analysis request");

        let resp = self.client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();

        debug!(status, body_len = body.len(), "Analysis service responded");
        Ok(TransportResponse { status, body })
    }
}
