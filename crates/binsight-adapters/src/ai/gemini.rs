//! Gemini API adapter implementation
//!
//! Implements the InferencePort trait for Google's Gemini API using
//! structured JSON output.

use async_trait::async_trait;
use binsight_core::api_key::SecretApiKey;
use binsight_core::ports::inference::{
    InferenceError, InferencePort, InferenceRequest, InferenceResponse,
};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

use super::wire::read_response;

/// Default Gemini model
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Gemini API base URL
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Default request timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Gemini API adapter
///
/// Makes exactly one `generateContent` call per request. Rate limiting is
/// reported, not retried.
pub struct GeminiAdapter {
    client: Client,
    api_key: SecretApiKey,
    model: String,
    base_url: String,
}

impl GeminiAdapter {
    /// Creates a new Gemini adapter
    ///
    /// # Arguments
    /// * `api_key` - Google AI API key
    /// * `model` - Model identifier (e.g., "gemini-2.5-flash")
    /// * `timeout` - Whole-request timeout
    ///
    /// # Errors
    /// Returns `InferenceError::RequestFailed` if the HTTP client cannot be built
    pub fn new(
        api_key: SecretApiKey,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            model: model.into(),
            base_url: GEMINI_API_BASE.to_string(),
        })
    }

    /// Creates a new Gemini adapter with the default model and timeout
    pub fn with_default_model(api_key: SecretApiKey) -> Result<Self, InferenceError> {
        Self::new(
            api_key,
            DEFAULT_GEMINI_MODEL,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        )
    }

    /// Points the adapter at another endpoint root (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn api_url(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.base_url,
            self.model,
            self.api_key.expose()
        )
    }

    /// Builds the request body for the Gemini API
    fn build_request(&self, request: &InferenceRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: SystemInstruction {
                parts: vec![Part::Text {
                    text: request.system_instruction.clone(),
                }],
            },
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: request.image.mime_type.clone(),
                            data: request.image.data.clone(),
                        },
                    },
                    Part::Text {
                        text: request.prompt.clone(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: request.response_schema.clone(),
            },
        }
    }
}

#[async_trait]
impl InferencePort for GeminiAdapter {
    async fn generate(
        &self,
        request: InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError> {
        let body = self.build_request(&request);

        debug!(model = %self.model, "Sending request to Gemini API");

        let response = self
            .client
            .post(self.api_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                // reqwest errors carry the URL, which carries the key
                let e = e.without_url();
                error!(error = %e, "Failed to send request to Gemini API");
                InferenceError::RequestFailed(e.to_string())
            })?;

        read_response(self.name(), response).await
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// === Request Types ===

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: SystemInstruction,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}
