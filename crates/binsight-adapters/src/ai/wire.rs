//! Response envelope shared by the direct and relay clients
//!
//! The relay forwards the provider's `generateContent` body untouched, so
//! both adapters read responses the same way.

use binsight_core::ports::inference::{InferenceError, InferenceResponse};
use reqwest::Response;
use serde::Deserialize;
use tracing::{debug, error, warn};

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    // Absent when the candidate was blocked
    #[serde(default)]
    pub(crate) content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseContent {
    #[serde(default)]
    pub(crate) parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponsePart {
    #[serde(default)]
    pub(crate) text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, `None` if it has none
    pub(crate) fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Maps an HTTP response to the port's result
///
/// 401/403 → Unauthorized, 429 → RateLimitExceeded, 400 → InvalidRequest,
/// any other failure status → ProviderError. A success body that is not a
/// `generateContent` envelope is InvalidResponse.
pub(crate) async fn read_response(
    provider: &str,
    response: Response,
) -> Result<InferenceResponse, InferenceError> {
    let status = response.status();

    if !status.is_success() {
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        return match status.as_u16() {
            401 | 403 => {
                error!(provider, "Inference service authentication failed");
                Err(InferenceError::Unauthorized)
            }
            429 => {
                warn!(provider, "Inference service rate limit exceeded");
                Err(InferenceError::RateLimitExceeded)
            }
            400 => {
                error!(provider, body = %error_body, "Inference service rejected the request");
                Err(InferenceError::InvalidRequest(error_body))
            }
            _ => {
                error!(provider, status = %status, body = %error_body, "Inference service error");
                Err(InferenceError::ProviderError(
                    provider.to_string(),
                    format!("{}: {}", status, error_body),
                ))
            }
        };
    }

    let body: GenerateContentResponse = response.json().await.map_err(|e| {
        error!(provider, error = %e, "Failed to parse inference response");
        InferenceError::InvalidResponse(e.to_string())
    })?;

    let text = body.into_text();
    debug!(
        provider,
        text_length = text.as_ref().map(|t| t.len()).unwrap_or(0),
        "Received inference response"
    );

    Ok(InferenceResponse { text })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "candidates": [
                {
                    "content": {
                        "parts": [
                            {"text": "{\"category\":"},
                            {"text": "\"TRASH\"}"}
                        ],
                        "role": "model"
                    },
                    "finishReason": "STOP"
                }
            ],
            "usageMetadata": {"totalTokenCount": 812}
        }"#;

        let response: GenerateContentResponse =
            serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(
            response.into_text().as_deref(),
            Some(r#"{"category":"TRASH"}"#)
        );
    }

    #[test]
    fn test_blocked_candidate_has_no_text() {
        let json = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert!(response.into_text().is_none());
    }

    #[test]
    fn test_empty_envelope_has_no_text() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_text().is_none());
    }

    #[test]
    fn test_non_text_parts_are_skipped() {
        let json = r#"{"candidates": [{"content": {"parts": [
            {"inlineData": {"mimeType": "image/png", "data": "AAAA"}},
            {"text": "answer"}
        ]}}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_text().as_deref(), Some("answer"));
    }
}
