//! Inference service port definition

use async_trait::async_trait;
use thiserror::Error;

/// Inline image sent to the inference service
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    /// MIME type (e.g., "image/jpeg")
    pub mime_type: String,
    /// Base64 payload without any data URI header
    pub data: String,
}

/// A single classification request
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    /// Fixed system instruction describing the taxonomy
    pub system_instruction: String,
    /// The image to classify
    pub image: InlineImage,
    /// User-turn prompt text
    pub prompt: String,
    /// JSON schema the structured output must satisfy
    pub response_schema: serde_json::Value,
}

/// Raw response from the inference service
#[derive(Debug, Clone, Default)]
pub struct InferenceResponse {
    /// Structured output text, `None` when the service returned no content
    pub text: Option<String>,
}

/// Errors that can occur while talking to the inference service
#[derive(Debug, Error)]
pub enum InferenceError {
    /// API key is missing or invalid
    #[error("Unauthorized: API key is missing or invalid. Set GEMINI_API_KEY or GOOGLE_AI_API_KEY")]
    Unauthorized,

    /// Rate limit exceeded
    #[error("Rate limit exceeded. Please wait and try again.")]
    RateLimitExceeded,

    /// The service rejected the request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Provider-specific error
    #[error("Provider '{0}' error: {1}")]
    ProviderError(String, String),

    /// Request could not be sent or completed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Response envelope could not be understood
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

/// Port for the external multimodal inference service
///
/// Implementations perform exactly one round trip per call.
#[async_trait]
pub trait InferencePort: Send + Sync {
    /// Sends the request and returns the structured output text
    async fn generate(
        &self,
        request: InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError>;

    /// Short provider name used in logs
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inference_error_messages() {
        let err = InferenceError::Unauthorized;
        assert!(err.to_string().contains("GEMINI_API_KEY"));

        let err = InferenceError::RateLimitExceeded;
        assert!(err.to_string().contains("Rate limit"));

        let err = InferenceError::ProviderError("gemini".to_string(), "Server error".to_string());
        let msg = err.to_string();
        assert!(msg.contains("gemini"));
        assert!(msg.contains("Server error"));
    }

    #[test]
    fn test_default_response_has_no_text() {
        let response = InferenceResponse::default();
        assert!(response.text.is_none());
    }
}
