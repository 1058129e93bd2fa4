//! Binsight Core - Domain logic for the Binsight waste classifier
//!
//! Camera negotiation, the capture session, the classification contract and
//! the application state machine. Devices and inference providers are
//! reached through the traits in [`ports`]; concrete adapters live in
//! `binsight-adapters`.

pub mod acquisition;
pub mod api_key;
pub mod app_state;
pub mod capture;
pub mod classifier;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod payload;
pub mod ports;
pub mod prompt;

// Re-export primary types for convenient access
pub use acquisition::{
    default_strategies, AcquisitionStrategy, ActiveStream, CameraError, CameraSession,
    FacingOnly, GenericVideo, HighResolution, MediaAcquisition, CAMERA_UNAVAILABLE_MESSAGE,
};
pub use api_key::{ApiKeyManager, SecretApiKey, GEMINI_API_KEY_ENV, GOOGLE_AI_API_KEY_ENV};
pub use app_state::{
    AnalysisState, ApplicationState, Phase, SelectedFile, ValidationError, NOT_AN_IMAGE_MESSAGE,
};
pub use capture::{
    CameraStatus, CaptureError, CaptureSession, CaptureState, CapturedPhoto, TorchError,
};
pub use classifier::{ClassificationClient, ClassificationError, CLASSIFICATION_FAILED_MESSAGE};
pub use config::{
    binsight_home, get_default_config_path, load_config, load_config_from_path, CameraConfig,
    ClassifierConfig, ClassifierMode, Config, LoggingConfig,
};
pub use error::{BinsightError, ConfigError};
pub use logging::{init_logger, LogLevel, LoggerConfig, LoggerError, LoggerGuard};
pub use model::{AnalysisResult, WasteCategory};
pub use ports::inference::{
    InferenceError, InferencePort, InferenceRequest, InferenceResponse, InlineImage,
};
pub use ports::media::{
    FacingMode, MediaDevicePort, MediaError, MediaStream, TrackCapabilities, VideoConstraints,
    VideoFrame,
};
pub use prompt::PromptBuilder;
