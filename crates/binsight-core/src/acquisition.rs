//! Camera stream acquisition with tiered fallback
//!
//! Devices differ wildly in which constraints they accept. Acquisition walks an
//! ordered list of strategies, from the most specific request to the most
//! generic, and settles on the first one the device satisfies.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::CameraConfig;
use crate::ports::media::{FacingMode, MediaDevicePort, MediaStream, VideoConstraints};

/// Message shown when no acquisition tier succeeds
pub const CAMERA_UNAVAILABLE_MESSAGE: &str =
    "Unable to access the camera. Please check permissions or upload a photo instead.";

/// Errors that can occur while opening a camera
#[derive(Debug, Error)]
pub enum CameraError {
    /// Every acquisition tier failed (permission denied or no device)
    #[error("Unable to access the camera. Please check permissions or upload a photo instead.")]
    Unavailable,

    /// The attempt was superseded by a close or a newer open
    #[error("Camera request was cancelled")]
    Cancelled,

    /// The operation needs an open camera
    #[error("Camera is not open")]
    NotOpen,
}

/// Owned handle to a live stream
///
/// Dropping the handle stops every track, so a stream can never outlive the
/// session that acquired it.
pub struct ActiveStream {
    stream: Arc<dyn MediaStream>,
}

impl ActiveStream {
    pub fn new(stream: Box<dyn MediaStream>) -> Self {
        Self {
            stream: Arc::from(stream),
        }
    }

    /// Shared reference for operations that must run without holding a lock
    pub(crate) fn shared(&self) -> Arc<dyn MediaStream> {
        Arc::clone(&self.stream)
    }

    pub fn id(&self) -> &str {
        self.stream.id()
    }

    pub fn is_live(&self) -> bool {
        self.stream.is_live()
    }
}

impl Drop for ActiveStream {
    fn drop(&mut self) {
        debug!(stream = self.stream.id(), "Stopping camera stream");
        self.stream.stop();
    }
}

impl std::fmt::Debug for ActiveStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveStream")
            .field("id", &self.stream.id())
            .field("live", &self.stream.is_live())
            .finish()
    }
}

/// A live camera plus what was learned while acquiring it
#[derive(Debug)]
pub struct CameraSession {
    pub(crate) stream: ActiveStream,
    /// Facing mode reported to the view layer
    pub facing_mode: FacingMode,
    pub torch_on: bool,
    pub torch_capable: bool,
    /// Name of the strategy that produced the stream
    pub tier: &'static str,
}

impl CameraSession {
    pub fn stream(&self) -> &ActiveStream {
        &self.stream
    }
}

/// One rung of the acquisition ladder
pub trait AcquisitionStrategy: Send + Sync {
    /// Name used in logs and in [`CameraSession::tier`]
    fn name(&self) -> &'static str;

    /// Constraints to request for the given facing mode
    fn constraints(&self, requested: FacingMode) -> VideoConstraints;

    /// Facing mode to report once this strategy succeeds
    fn resolved_facing(&self, requested: FacingMode) -> FacingMode {
        requested
    }
}

/// Facing mode plus an ideal high-resolution hint
pub struct HighResolution {
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl AcquisitionStrategy for HighResolution {
    fn name(&self) -> &'static str {
        "high-resolution"
    }

    fn constraints(&self, requested: FacingMode) -> VideoConstraints {
        VideoConstraints {
            facing_mode: Some(requested),
            ideal_width: Some(self.ideal_width),
            ideal_height: Some(self.ideal_height),
        }
    }
}

/// Facing mode only, for devices that reject the resolution hint
pub struct FacingOnly;

impl AcquisitionStrategy for FacingOnly {
    fn name(&self) -> &'static str {
        "facing-only"
    }

    fn constraints(&self, requested: FacingMode) -> VideoConstraints {
        VideoConstraints {
            facing_mode: Some(requested),
            ..VideoConstraints::default()
        }
    }
}

/// Any camera at all, for devices without facing-mode discrimination
///
/// Reports `user` regardless of the request: such devices are almost always
/// front-facing webcams. This is a heuristic; a hybrid device may resolve to
/// a rear camera here and still be reported as `user`.
pub struct GenericVideo;

impl AcquisitionStrategy for GenericVideo {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn constraints(&self, _requested: FacingMode) -> VideoConstraints {
        VideoConstraints::any()
    }

    fn resolved_facing(&self, _requested: FacingMode) -> FacingMode {
        FacingMode::User
    }
}

/// Builds the default three-tier ladder
pub fn default_strategies(config: &CameraConfig) -> Vec<Box<dyn AcquisitionStrategy>> {
    vec![
        Box::new(HighResolution {
            ideal_width: config.ideal_width,
            ideal_height: config.ideal_height,
        }),
        Box::new(FacingOnly),
        Box::new(GenericVideo),
    ]
}

/// Negotiates camera streams against a media device
pub struct MediaAcquisition<M: MediaDevicePort + ?Sized> {
    device: Arc<M>,
    strategies: Vec<Box<dyn AcquisitionStrategy>>,
}

impl<M: MediaDevicePort + ?Sized> MediaAcquisition<M> {
    /// Creates an acquisition over the default ladder
    pub fn new(device: Arc<M>, config: &CameraConfig) -> Self {
        Self::with_strategies(device, default_strategies(config))
    }

    /// Creates an acquisition over a custom ladder
    pub fn with_strategies(device: Arc<M>, strategies: Vec<Box<dyn AcquisitionStrategy>>) -> Self {
        Self { device, strategies }
    }

    /// Names of the configured tiers, in order
    pub fn tier_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Opens a camera facing the requested direction
    ///
    /// Tiers are tried in order and each failure is isolated; the first stream
    /// obtained wins. The caller must have released any previous stream.
    pub async fn open(&self, mode: FacingMode) -> Result<CameraSession, CameraError> {
        for (index, strategy) in self.strategies.iter().enumerate() {
            let constraints = strategy.constraints(mode);
            debug!(
                tier = index + 1,
                strategy = strategy.name(),
                ?constraints,
                "Requesting camera stream"
            );

            match self.device.get_user_media(constraints).await {
                Ok(stream) => {
                    let stream = ActiveStream::new(stream);
                    let torch_capable = stream
                        .stream
                        .capabilities()
                        .map(|caps| caps.torch)
                        .unwrap_or(false);
                    let facing_mode = strategy.resolved_facing(mode);

                    info!(
                        tier = index + 1,
                        strategy = strategy.name(),
                        facing = %facing_mode,
                        torch_capable,
                        stream = stream.id(),
                        "Camera stream acquired"
                    );

                    return Ok(CameraSession {
                        stream,
                        facing_mode,
                        torch_on: false,
                        torch_capable,
                        tier: strategy.name(),
                    });
                }
                Err(e) => {
                    warn!(
                        tier = index + 1,
                        strategy = strategy.name(),
                        error = %e,
                        "Camera acquisition tier failed"
                    );
                }
            }
        }

        warn!(requested = %mode, "All camera acquisition tiers failed");
        Err(CameraError::Unavailable)
    }
}
