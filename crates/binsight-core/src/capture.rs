//! Capture session lifecycle
//!
//! Owns the camera for the capture UI: opening and closing it, torch and
//! facing changes, and turning the live frame into a JPEG still.
//!
//! All methods take `&self`. The internal lock is never held across an
//! `.await`, so a shared handle can close the session while an open is still
//! pending. Every open and close bumps an epoch; an acquisition that completes
//! under a stale epoch is discarded and its stream stopped.

use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::acquisition::{CameraError, CameraSession, MediaAcquisition};
use crate::config::CameraConfig;
use crate::payload::{encode_jpeg, to_data_uri};
use crate::ports::media::{FacingMode, MediaDevicePort};

/// Errors from torch control
#[derive(Debug, Error)]
pub enum TorchError {
    /// No camera is open
    #[error("No active camera stream")]
    NoActiveStream,

    /// The active track has no torch
    #[error("Flashlight is not supported on this camera")]
    Unsupported,

    /// The track refused the torch constraint
    #[error("Flashlight could not be toggled: {0}")]
    ConstraintRejected(String),
}

/// Errors from still capture
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No camera is open
    #[error("Camera is not open")]
    NotOpen,

    /// The stream has not decoded a frame yet
    #[error("Camera has not produced a frame yet. Please wait a moment and try again.")]
    NoFrame,

    /// JPEG serialization failed
    #[error("Failed to encode photo: {0}")]
    EncodingFailed(String),
}

/// Lifecycle state of the capture UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Closed,
    Opening,
    Open,
}

/// Snapshot of the session for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraStatus {
    pub state: CaptureState,
    pub facing_mode: Option<FacingMode>,
    pub torch_on: bool,
    pub torch_capable: bool,
    /// Whether the preview should be mirrored. Never applied to captures.
    pub mirror_preview: bool,
    pub tier: Option<&'static str>,
}

/// A captured still image
#[derive(Debug, Clone)]
pub struct CapturedPhoto {
    /// `data:image/jpeg;base64,...`
    pub data_uri: String,
    /// Native frame width in pixels
    pub width: u32,
    /// Native frame height in pixels
    pub height: u32,
}

#[derive(Default)]
struct SessionInner {
    state: CaptureState,
    camera: Option<CameraSession>,
    epoch: u64,
}

/// Camera lifecycle owner for the capture UI
pub struct CaptureSession<M: MediaDevicePort + ?Sized> {
    acquisition: MediaAcquisition<M>,
    jpeg_quality: u8,
    inner: Mutex<SessionInner>,
}

impl<M: MediaDevicePort + ?Sized> CaptureSession<M> {
    /// Creates a closed session over the given device
    pub fn new(device: Arc<M>, config: &CameraConfig) -> Self {
        Self::with_acquisition(MediaAcquisition::new(device, config), config.jpeg_quality)
    }

    /// Creates a closed session over a preconfigured acquisition ladder
    pub fn with_acquisition(acquisition: MediaAcquisition<M>, jpeg_quality: u8) -> Self {
        Self {
            acquisition,
            jpeg_quality,
            inner: Mutex::new(SessionInner::default()),
        }
    }

    fn inner(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> CaptureState {
        self.inner().state
    }

    pub fn is_open(&self) -> bool {
        self.state() == CaptureState::Open
    }

    /// Returns a snapshot of the current camera
    pub fn status(&self) -> CameraStatus {
        let inner = self.inner();
        let camera = inner.camera.as_ref();
        let facing_mode = camera.map(|c| c.facing_mode);
        CameraStatus {
            state: inner.state,
            facing_mode,
            torch_on: camera.map(|c| c.torch_on).unwrap_or(false),
            torch_capable: camera.map(|c| c.torch_capable).unwrap_or(false),
            mirror_preview: facing_mode == Some(FacingMode::User),
            tier: camera.map(|c| c.tier),
        }
    }

    /// Opens the camera facing `mode`
    ///
    /// Any held stream is stopped before acquisition starts. On failure the
    /// session returns to `Closed`.
    pub async fn open(&self, mode: FacingMode) -> Result<CameraStatus, CameraError> {
        self.acquire(mode, CaptureState::Opening).await
    }

    /// Replaces the stream with one facing the other way
    ///
    /// The UI stays open during the switch. If the new camera cannot be
    /// acquired the session closes.
    pub async fn switch_facing(&self) -> Result<CameraStatus, CameraError> {
        let target = {
            let inner = self.inner();
            if inner.state != CaptureState::Open {
                return Err(CameraError::NotOpen);
            }
            inner
                .camera
                .as_ref()
                .map(|c| c.facing_mode.opposite())
                .unwrap_or_default()
        };
        info!(facing = %target, "Switching camera");
        self.acquire(target, CaptureState::Open).await
    }

    async fn acquire(
        &self,
        mode: FacingMode,
        pending_state: CaptureState,
    ) -> Result<CameraStatus, CameraError> {
        let epoch = {
            let mut inner = self.inner();
            // Release the device before asking for it again.
            inner.camera = None;
            inner.epoch += 1;
            inner.state = pending_state;
            inner.epoch
        };

        let result = self.acquisition.open(mode).await;

        {
            let mut inner = self.inner();
            if inner.epoch != epoch {
                // Dropping `result` stops any stream the stale attempt obtained.
                debug!(epoch, current = inner.epoch, "Discarding superseded camera request");
                return Err(CameraError::Cancelled);
            }

            match result {
                Ok(camera) => {
                    inner.camera = Some(camera);
                    inner.state = CaptureState::Open;
                }
                Err(e) => {
                    inner.state = CaptureState::Closed;
                    return Err(e);
                }
            }
        }

        Ok(self.status())
    }

    /// Installs an already acquired camera, replacing any current one
    pub fn attach_stream(&self, camera: CameraSession) {
        let mut inner = self.inner();
        inner.epoch += 1;
        inner.camera = Some(camera);
        inner.state = CaptureState::Open;
    }

    /// Flips the flashlight
    ///
    /// Returns the new torch state. On failure the torch state is unchanged.
    pub async fn toggle_torch(&self) -> Result<bool, TorchError> {
        let (stream, want_on, epoch) = {
            let inner = self.inner();
            let camera = inner.camera.as_ref().ok_or(TorchError::NoActiveStream)?;
            if !camera.torch_capable {
                return Err(TorchError::Unsupported);
            }
            (camera.stream.shared(), !camera.torch_on, inner.epoch)
        };

        stream.apply_torch(want_on).await.map_err(|e| {
            warn!(error = %e, want_on, "Torch constraint rejected");
            TorchError::ConstraintRejected(e.to_string())
        })?;

        let mut inner = self.inner();
        if inner.epoch != epoch {
            return Err(TorchError::NoActiveStream);
        }
        let camera = inner.camera.as_mut().ok_or(TorchError::NoActiveStream)?;
        camera.torch_on = want_on;
        debug!(torch_on = want_on, "Torch toggled");
        Ok(want_on)
    }

    /// Captures the current frame as a JPEG data URI
    ///
    /// The frame is encoded at its native resolution with no mirroring,
    /// whatever the preview shows. Encoding runs on the blocking pool.
    pub async fn capture(&self) -> Result<CapturedPhoto, CaptureError> {
        let stream = {
            let inner = self.inner();
            match (inner.state, inner.camera.as_ref()) {
                (CaptureState::Open, Some(camera)) => camera.stream.shared(),
                _ => return Err(CaptureError::NotOpen),
            }
        };

        let frame = stream
            .current_frame()
            .filter(|f| f.is_well_formed())
            .ok_or(CaptureError::NoFrame)?;

        let (width, height) = (frame.width, frame.height);
        let quality = self.jpeg_quality;
        let jpeg = tokio::task::spawn_blocking(move || encode_jpeg(&frame, quality))
            .await
            .map_err(|e| CaptureError::EncodingFailed(e.to_string()))?
            .map_err(CaptureError::EncodingFailed)?;

        info!(width, height, bytes = jpeg.len(), "Photo captured");

        Ok(CapturedPhoto {
            data_uri: to_data_uri("image/jpeg", &jpeg),
            width,
            height,
        })
    }

    /// Closes the camera
    ///
    /// Idempotent. Stops every track, clears torch state, and supersedes any
    /// pending open.
    pub fn close(&self) {
        let released = {
            let mut inner = self.inner();
            inner.epoch += 1;
            inner.state = CaptureState::Closed;
            inner.camera.take()
        };
        if let Some(camera) = released {
            info!(stream = camera.stream.id(), "Closing camera");
        }
    }
}
