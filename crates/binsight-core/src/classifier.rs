//! Classification client
//!
//! Sends one image to the inference service, validates the structured output
//! against the result schema, and translates every failure into a message that
//! is safe to show to the user.

use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::model::{AnalysisResult, WasteCategory};
use crate::payload::split_data_uri;
use crate::ports::inference::{InferenceError, InferencePort};
use crate::prompt::PromptBuilder;

/// Message shown for any classification failure
pub const CLASSIFICATION_FAILED_MESSAGE: &str = "Failed to analyze the image. Please try again.";

/// Errors surfaced by the classification client
///
/// The display text is always user-safe. Provider detail stays in
/// [`ClassificationError::detail`] and the logs.
#[derive(Debug, Error)]
pub enum ClassificationError {
    /// The service could not be reached or rejected the call
    #[error("Failed to analyze the image. Please try again.")]
    RequestFailed { detail: String },

    /// The service answered with missing or malformed content
    #[error("Failed to analyze the image. Please try again.")]
    InvalidResponse { detail: String },
}

impl ClassificationError {
    /// Diagnostic detail for logs, never for display
    pub fn detail(&self) -> &str {
        match self {
            ClassificationError::RequestFailed { detail }
            | ClassificationError::InvalidResponse { detail } => detail,
        }
    }

    /// Message for the presentation layer
    pub fn user_message(&self) -> &'static str {
        CLASSIFICATION_FAILED_MESSAGE
    }
}

impl From<InferenceError> for ClassificationError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::InvalidResponse(detail) => {
                ClassificationError::InvalidResponse { detail }
            }
            other => ClassificationError::RequestFailed {
                detail: other.to_string(),
            },
        }
    }
}

/// Structured output as returned by the model, before validation
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    category: String,
    item_name: String,
    confidence: f64,
    reasoning: String,
    disposal_action: String,
    sustainability_tip: String,
}

/// Client for the external classification service
pub struct ClassificationClient<P: InferencePort + ?Sized> {
    provider: Arc<P>,
}

impl<P: InferencePort + ?Sized> ClassificationClient<P> {
    /// Creates a new client over the given inference provider
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Classifies one image
    ///
    /// Accepts either a data URI or bare base64. Exactly one request is made.
    pub async fn classify(&self, image: &str) -> Result<AnalysisResult, ClassificationError> {
        let (mime_type, base64) = split_data_uri(image);
        let request = PromptBuilder::build_request(mime_type, base64);

        debug!(
            provider = self.provider.name(),
            mime_type = %mime_type,
            payload_len = base64.len(),
            "Sending classification request"
        );

        let response = self.provider.generate(request).await.map_err(|e| {
            error!(provider = self.provider.name(), error = %e, "Inference request failed");
            ClassificationError::from(e)
        })?;

        let text = response
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                warn!(provider = self.provider.name(), "Inference service returned no content");
                ClassificationError::InvalidResponse {
                    detail: "No content in response".to_string(),
                }
            })?;

        let result = parse_analysis(&text).map_err(|detail| {
            warn!(
                provider = self.provider.name(),
                error = %detail,
                response = %text,
                "Inference response failed validation"
            );
            ClassificationError::InvalidResponse { detail }
        })?;

        info!(
            category = %result.category,
            item = %result.item_name,
            confidence = result.confidence,
            "Classification completed"
        );

        Ok(result)
    }
}

/// Parses and validates the structured output
fn parse_analysis(text: &str) -> Result<AnalysisResult, String> {
    let raw: RawAnalysis =
        serde_json::from_str(text.trim()).map_err(|e| format!("Invalid JSON response: {}", e))?;

    let category = WasteCategory::from_wire(&raw.category)
        .ok_or_else(|| format!("Unknown category: {}", raw.category))?;

    if !raw.confidence.is_finite() || !(0.0..=1.0).contains(&raw.confidence) {
        return Err(format!("Confidence out of range: {}", raw.confidence));
    }

    Ok(AnalysisResult {
        category,
        item_name: raw.item_name,
        confidence: raw.confidence,
        reasoning: raw.reasoning,
        disposal_action: raw.disposal_action,
        sustainability_tip: raw.sustainability_tip,
    })
}


#[cfg(test)]
mod tests {
    use super::testing::{MockInferencePort, Reply, BOTTLE};
    use super::*;

    const PIZZA_BOX: &str = r#"{
        "category": "COMPOST",
        "itemName": "Greasy pizza box",
        "confidence": 0.88,
        "reasoning": "Cardboard soaked with grease cannot be recycled.",
        "disposalAction": "Tear into pieces and put in the compost bin.",
        "sustainabilityTip": "Recycle the clean lid separately."
    }"#;

    fn make_client(
        port: MockInferencePort,
    ) -> (
        ClassificationClient<MockInferencePort>,
        Arc<MockInferencePort>,
    ) {
        let port = Arc::new(port);
        (ClassificationClient::new(Arc::clone(&port)), port)
    }

    #[tokio::test]
    async fn test_valid_response_round_trips_fields() {
        let (client, port) = make_client(MockInferencePort::replying(BOTTLE));

        let result = client.classify("data:image/jpeg;base64,aGVsbG8=").await.unwrap();

        assert_eq!(result.category, WasteCategory::Recycle);
        assert_eq!(result.item_name, "Plastic water bottle");
        assert_eq!(result.confidence, 0.97);
        assert_eq!(result.reasoning, "Clear PET #1 bottle, empty and clean.");
        assert_eq!(
            result.disposal_action,
            "Empty, replace the cap, and place in the recycling bin."
        );
        assert_eq!(result.sustainability_tip, "Carry a refillable bottle.");
        assert_eq!(port.call_count(), 1);
    }

    #[tokio::test]
    async fn test_greasy_pizza_box_is_compost() {
        let (client, _) = make_client(MockInferencePort::replying(PIZZA_BOX));
        let result = client.classify("aGVsbG8=").await.unwrap();
        assert_eq!(result.category, WasteCategory::Compost);
    }

    #[tokio::test]
    async fn test_data_uri_header_is_stripped() {
        let (client, port) = make_client(MockInferencePort::replying(BOTTLE));
        client.classify("data:image/png;base64,aGVsbG8=").await.unwrap();

        let request = port.last_request();
        assert_eq!(request.image.data, "aGVsbG8=");
        assert_eq!(request.image.mime_type, "image/png");
        assert!(request.system_instruction.contains("HAZARD > COMPOST"));
    }

    #[tokio::test]
    async fn test_bare_base64_passes_through() {
        let (client, port) = make_client(MockInferencePort::replying(BOTTLE));
        client.classify("aGVsbG8=").await.unwrap();

        let request = port.last_request();
        assert_eq!(request.image.data, "aGVsbG8=");
        assert_eq!(request.image.mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_out_of_range_confidence_is_rejected() {
        let body = BOTTLE.replace("0.97", "1.43");
        let (client, _) = make_client(MockInferencePort::replying(&body));

        let err = client.classify("aGVsbG8=").await.unwrap_err();
        assert!(matches!(err, ClassificationError::InvalidResponse { .. }));
        assert!(err.detail().contains("1.43"));
    }

    #[tokio::test]
    async fn test_negative_confidence_is_rejected() {
        let body = BOTTLE.replace("0.97", "-0.1");
        let (client, _) = make_client(MockInferencePort::replying(&body));
        let err = client.classify("aGVsbG8=").await.unwrap_err();
        assert!(matches!(err, ClassificationError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_missing_field_is_rejected() {
        let body = r#"{"category": "TRASH", "itemName": "Chip bag", "confidence": 0.8}"#;
        let (client, _) = make_client(MockInferencePort::replying(body));
        let err = client.classify("aGVsbG8=").await.unwrap_err();
        assert!(matches!(err, ClassificationError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected() {
        let body = BOTTLE.replace("RECYCLE", "UNKNOWN");
        let (client, _) = make_client(MockInferencePort::replying(&body));
        let err = client.classify("aGVsbG8=").await.unwrap_err();
        assert!(err.detail().contains("UNKNOWN"));
    }

    #[tokio::test]
    async fn test_empty_content_is_invalid_response() {
        let (client, _) = make_client(MockInferencePort::with_reply(Reply::Text(None)));
        let err = client.classify("aGVsbG8=").await.unwrap_err();
        assert!(matches!(err, ClassificationError::InvalidResponse { .. }));

        let (client, _) = make_client(MockInferencePort::replying("   "));
        let err = client.classify("aGVsbG8=").await.unwrap_err();
        assert!(matches!(err, ClassificationError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_non_json_content_is_invalid_response() {
        let (client, _) = make_client(MockInferencePort::replying("It is a bottle."));
        let err = client.classify("aGVsbG8=").await.unwrap_err();
        assert!(err.detail().contains("Invalid JSON"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_sanitized() {
        let (client, port) = make_client(MockInferencePort::with_reply(Reply::Fail(|| {
            InferenceError::ProviderError(
                "gemini".to_string(),
                "INTERNAL: backend stack trace at 0x7f".to_string(),
            )
        })));

        let err = client.classify("aGVsbG8=").await.unwrap_err();
        assert!(matches!(err, ClassificationError::RequestFailed { .. }));
        assert_eq!(err.to_string(), CLASSIFICATION_FAILED_MESSAGE);
        assert!(!err.to_string().contains("stack trace"));
        assert!(err.detail().contains("stack trace"));
        assert_eq!(port.call_count(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_is_not_retried() {
        let (client, port) = make_client(MockInferencePort::with_reply(Reply::Fail(|| {
            InferenceError::RateLimitExceeded
        })));

        let err = client.classify("aGVsbG8=").await.unwrap_err();
        assert!(matches!(err, ClassificationError::RequestFailed { .. }));
        assert_eq!(port.call_count(), 1);
    }

    #[tokio::test]
    async fn test_envelope_error_maps_to_invalid_response() {
        let (client, _) = make_client(MockInferencePort::with_reply(Reply::Fail(|| {
            InferenceError::InvalidResponse("missing candidates".to_string())
        })));
        let err = client.classify("aGVsbG8=").await.unwrap_err();
        assert!(matches!(err, ClassificationError::InvalidResponse { .. }));
        assert_eq!(err.user_message(), CLASSIFICATION_FAILED_MESSAGE);
    }
}
