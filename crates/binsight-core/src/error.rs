//! Common error types for Binsight
//!
//! Domain errors live next to the code that raises them and are re-exported
//! here. `BinsightError` wraps them all for `?` propagation at the edges.

use thiserror::Error;

pub use crate::acquisition::CameraError;
pub use crate::app_state::ValidationError;
pub use crate::capture::{CaptureError, TorchError};
pub use crate::classifier::ClassificationError;
pub use crate::logging::LoggerError;
pub use crate::ports::inference::InferenceError;
pub use crate::ports::media::MediaError;

/// Top-level error type for Binsight operations
#[derive(Debug, Error)]
pub enum BinsightError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Torch error: {0}")]
    Torch(#[from] TorchError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Classification error: {0}")]
    Classification(#[from] ClassificationError),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("Logger error: {0}")]
    Logger(#[from] LoggerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::CLASSIFICATION_FAILED_MESSAGE;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue("jpeg_quality must be between 90 and 100".to_string());
        assert!(err.to_string().contains("jpeg_quality"));
    }

    #[test]
    fn test_binsight_error_from_config() {
        let err: BinsightError = ConfigError::ParseError("bad".to_string()).into();
        assert!(matches!(err, BinsightError::Config(_)));
    }

    #[test]
    fn test_binsight_error_from_camera() {
        let err: BinsightError = CameraError::Unavailable.into();
        assert!(matches!(err, BinsightError::Camera(_)));
        assert!(err.to_string().contains("camera"));
    }

    #[test]
    fn test_binsight_error_from_torch() {
        let err: BinsightError = TorchError::Unsupported.into();
        assert!(matches!(err, BinsightError::Torch(_)));
    }

    #[test]
    fn test_binsight_error_from_capture() {
        let err: BinsightError = CaptureError::NoFrame.into();
        assert!(matches!(err, BinsightError::Capture(_)));
    }

    #[test]
    fn test_binsight_error_from_validation() {
        let err: BinsightError = ValidationError::NotAnImage.into();
        assert!(err.to_string().contains("Please upload a valid image file."));
    }

    #[test]
    fn test_classification_error_hides_detail() {
        let err: BinsightError = ClassificationError::RequestFailed {
            detail: "connection reset by peer".to_string(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains(CLASSIFICATION_FAILED_MESSAGE));
        assert!(!msg.contains("connection reset"));
    }

    #[test]
    fn test_binsight_error_from_inference() {
        let err: BinsightError = InferenceError::RateLimitExceeded.into();
        assert!(matches!(err, BinsightError::Inference(_)));
    }

    #[test]
    fn test_binsight_error_from_logger() {
        let err: BinsightError = LoggerError::InitializationFailed("twice".to_string()).into();
        assert!(matches!(err, BinsightError::Logger(_)));
    }

    // === Anyhow Interoperability Tests ===

    #[test]
    fn test_binsight_error_to_anyhow() {
        let err = BinsightError::Config(ConfigError::InvalidValue("test".to_string()));
        let anyhow_err: anyhow::Error = err.into();
        assert!(anyhow_err.to_string().contains("test"));
    }

    #[test]
    fn test_result_with_anyhow() {
        fn fallible_operation() -> anyhow::Result<()> {
            Err(CameraError::Unavailable)?
        }

        assert!(fallible_operation().is_err());
    }
}
