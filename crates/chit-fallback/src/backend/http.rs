//! HTTP backend posting JSON batches to the fallback parsing service.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::FallbackBackend;
use crate::{FallbackError, FallbackRequest, FallbackResponse, Result};

/// Backend talking to the fallback service over HTTP.
pub struct HttpBackend {
    client: Client,
    endpoint: String,
}

impl HttpBackend {
    /// Create a backend for the given endpoint with a client-level timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FallbackError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// The configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl FallbackBackend for HttpBackend {
    async fn resolve(&self, request: &FallbackRequest) -> Result<FallbackResponse> {
        debug!(
            "submitting {} lines to fallback service at {}",
            request.lines.len(),
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FallbackError::Status(status.as_u16()));
        }

        response
            .json::<FallbackResponse>()
            .await
            .map_err(|e| FallbackError::Malformed(e.to_string()))
    }
}
