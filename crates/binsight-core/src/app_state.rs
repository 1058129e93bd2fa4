//! Application state machine
//!
//! Coordinates camera acquisition, capture, file input and classification.
//! The presentation layer renders from [`AnalysisState`] and the camera
//! status; it never mutates either directly.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::acquisition::CameraError;
use crate::capture::{CameraStatus, CaptureError, CaptureSession, CaptureState, TorchError};
use crate::classifier::ClassificationClient;
use crate::config::CameraConfig;
use crate::model::AnalysisResult;
use crate::payload::is_image_mime;
use crate::ports::inference::InferencePort;
use crate::ports::media::{FacingMode, MediaDevicePort};

/// Message shown when a selected file is not an image
pub const NOT_AN_IMAGE_MESSAGE: &str = "Please upload a valid image file.";

/// Input validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Please upload a valid image file.")]
    NotAnImage,
}

/// Where the session currently is
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Phase {
    #[default]
    Idle,
    CapturingPreview,
    Classifying,
    Result(AnalysisResult),
    /// Failed with a message safe to display
    Failed(String),
}

/// State seen while the camera was closed through a shared handle
static IDLE: AnalysisState = AnalysisState {
    phase: Phase::Idle,
    image_preview: None,
};

/// What the presentation layer renders from
///
/// Loading, result and error are one phase, so no combination of them can
/// be observed at once.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisState {
    phase: Phase,
    image_preview: Option<String>,
}

impl AnalysisState {
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Classifying)
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.phase, Phase::CapturingPreview)
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.phase {
            Phase::Result(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Image being (or last) classified, as a data URI
    pub fn image_preview(&self) -> Option<&str> {
        self.image_preview.as_deref()
    }
}

/// A file chosen by the user, before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    /// MIME type declared by the file picker
    pub declared_type: String,
    pub data_uri: String,
}

impl SelectedFile {
    /// Checks the declared type
    ///
    /// # Errors
    /// Returns `ValidationError::NotAnImage` unless the type is `image/*`
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_image_mime(&self.declared_type) {
            Ok(())
        } else {
            Err(ValidationError::NotAnImage)
        }
    }
}

/// Single owner of the capture-and-classify flow
pub struct ApplicationState<M, P>
where
    M: MediaDevicePort + ?Sized,
    P: InferencePort + ?Sized,
{
    capture: Arc<CaptureSession<M>>,
    classifier: ClassificationClient<P>,
    default_facing: FacingMode,
    state: AnalysisState,
    selected_file: Option<SelectedFile>,
    camera_notice: Option<String>,
}

impl<M, P> ApplicationState<M, P>
where
    M: MediaDevicePort + ?Sized,
    P: InferencePort + ?Sized,
{
    /// Wires the state machine to a camera device and an inference provider
    pub fn new(device: Arc<M>, provider: Arc<P>, config: &CameraConfig) -> Self {
        Self::with_parts(
            Arc::new(CaptureSession::new(device, config)),
            ClassificationClient::new(provider),
            config.default_facing,
        )
    }

    /// Builds the state machine from preassembled components
    pub fn with_parts(
        capture: Arc<CaptureSession<M>>,
        classifier: ClassificationClient<P>,
        default_facing: FacingMode,
    ) -> Self {
        Self {
            capture,
            classifier,
            default_facing,
            state: AnalysisState::default(),
            selected_file: None,
            camera_notice: None,
        }
    }

    /// Current state, with the preview phase dropped once the camera is closed
    pub fn state(&self) -> &AnalysisState {
        if self.camera_closed_elsewhere() {
            &IDLE
        } else {
            &self.state
        }
    }

    /// Camera problem to show next to the capture controls, if any
    pub fn camera_notice(&self) -> Option<&str> {
        self.camera_notice.as_deref()
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    pub fn camera_status(&self) -> CameraStatus {
        self.capture.status()
    }

    /// Shared handle to the capture session
    ///
    /// Lets another task close the camera, even while an open is pending.
    /// A close through the handle moves the state back to `Idle`.
    pub fn camera_handle(&self) -> Arc<CaptureSession<M>> {
        Arc::clone(&self.capture)
    }

    /// Opens the camera with the configured default facing mode
    ///
    /// Any previous result, error and preview are discarded. On failure the
    /// state returns to `Idle` and the message is kept as a camera notice.
    pub async fn open_camera(&mut self) -> Result<CameraStatus, CameraError> {
        self.camera_notice = None;
        self.state = AnalysisState::default();

        match self.capture.open(self.default_facing).await {
            Ok(status) => {
                self.state.phase = Phase::CapturingPreview;
                info!(
                    facing = ?status.facing_mode,
                    tier = ?status.tier,
                    "Capture preview started"
                );
                Ok(status)
            }
            Err(e) => {
                self.camera_failed(&e);
                Err(e)
            }
        }
    }

    /// Closes the capture UI; a no-op when already closed
    pub fn close_camera(&mut self) {
        self.capture.close();
        if self.state.is_capturing() {
            self.state.phase = Phase::Idle;
        }
    }

    /// Toggles the flashlight
    ///
    /// Failures are logged and leave the state unchanged.
    pub async fn toggle_torch(&mut self) -> Result<bool, TorchError> {
        self.sync_with_camera();
        self.capture.toggle_torch().await.map_err(|e| {
            warn!(error = %e, "Torch toggle failed");
            e
        })
    }

    /// Switches between front and rear cameras
    ///
    /// Only valid while the preview is showing; otherwise returns
    /// `CameraError::NotOpen` and leaves the state alone. A failed switch
    /// closes the capture UI.
    pub async fn switch_camera(&mut self) -> Result<CameraStatus, CameraError> {
        self.sync_with_camera();
        if !self.state.is_capturing() {
            return Err(CameraError::NotOpen);
        }

        match self.capture.switch_facing().await {
            Ok(status) => Ok(status),
            Err(e) => {
                self.camera_failed(&e);
                Err(e)
            }
        }
    }

    /// Grabs a still from the preview and classifies it
    ///
    /// If no frame can be captured the preview stays open with a notice.
    /// Outside the preview it returns `CaptureError::NotOpen` and leaves the
    /// state alone.
    pub async fn capture_photo(&mut self) -> Result<&AnalysisState, CaptureError> {
        self.sync_with_camera();
        if !self.state.is_capturing() {
            return Err(CaptureError::NotOpen);
        }

        let photo = match self.capture.capture().await {
            Ok(photo) => photo,
            Err(e) => {
                warn!(error = %e, "Photo capture failed");
                self.camera_notice = Some(e.to_string());
                return Err(e);
            }
        };

        debug!(width = photo.width, height = photo.height, "Photo captured");
        Ok(self.submit_image(photo.data_uri).await)
    }

    /// Validates and classifies a user-selected file
    ///
    /// A non-image declared type fails immediately with no preview and no
    /// inference call.
    pub async fn select_file(&mut self, file: SelectedFile) -> &AnalysisState {
        if let Err(e) = file.validate() {
            warn!(
                name = %file.name,
                declared_type = %file.declared_type,
                "Rejected non-image file"
            );
            self.capture.close();
            self.selected_file = None;
            self.state = AnalysisState {
                phase: Phase::Failed(e.to_string()),
                image_preview: None,
            };
            return &self.state;
        }

        let data_uri = file.data_uri.clone();
        self.selected_file = Some(file);
        self.submit_image(data_uri).await
    }

    /// Classifies an image payload
    ///
    /// Closes the camera first if it is open, then moves through
    /// `Classifying` to `Result` or `Failed`.
    pub async fn submit_image(&mut self, data_uri: String) -> &AnalysisState {
        self.capture.close();
        self.camera_notice = None;
        self.state = AnalysisState {
            phase: Phase::Classifying,
            image_preview: Some(data_uri.clone()),
        };

        let outcome = self.classifier.classify(&data_uri).await;
        self.state.phase = match outcome {
            Ok(result) => Phase::Result(result),
            Err(e) => {
                warn!(detail = %e.detail(), "Classification failed");
                Phase::Failed(e.user_message().to_string())
            }
        };

        &self.state
    }

    /// Returns to the initial state from anywhere
    pub fn reset(&mut self) {
        self.capture.close();
        self.state = AnalysisState::default();
        self.selected_file = None;
        self.camera_notice = None;
        debug!("Application state reset");
    }

    fn camera_closed_elsewhere(&self) -> bool {
        self.state.is_capturing() && self.capture.state() == CaptureState::Closed
    }

    fn sync_with_camera(&mut self) {
        if self.camera_closed_elsewhere() {
            debug!("Camera closed through a shared handle");
            self.state.phase = Phase::Idle;
        }
    }

    fn camera_failed(&mut self, error: &CameraError) {
        self.state.phase = Phase::Idle;
        match error {
            CameraError::Cancelled => debug!("Camera request superseded"),
            CameraError::NotOpen => debug!("Camera was already closed"),
            CameraError::Unavailable => {
                warn!("Camera unavailable");
                self.camera_notice = Some(error.to_string());
            }
        }
    }
}
