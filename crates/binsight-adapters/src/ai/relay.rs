//! Relay inference adapter
//!
//! Posts the image to a small HTTP relay that holds the provider key and the
//! classification instruction. The relay answers with the provider's raw
//! `generateContent` body.

use async_trait::async_trait;
use binsight_core::ports::inference::{
    InferenceError, InferencePort, InferenceRequest, InferenceResponse,
};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

use super::wire::read_response;

/// Client for the classification relay
pub struct RelayAdapter {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    image: &'a str,
}

impl RelayAdapter {
    /// Creates a relay client
    ///
    /// # Errors
    /// Returns `InferenceError::RequestFailed` if the HTTP client cannot be built
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl InferencePort for RelayAdapter {
    /// Sends only the base64 image; the relay supplies instruction and schema
    async fn generate(
        &self,
        request: InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError> {
        debug!(endpoint = %self.endpoint, "Sending image to relay");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&RelayRequest {
                image: &request.image.data,
            })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to reach classification relay");
                InferenceError::RequestFailed(e.to_string())
            })?;

        read_response(self.name(), response).await
    }

    fn name(&self) -> &str {
        "relay"
    }
}
