//! Media device port definition
//!
//! Models a `getUserMedia`-style camera API: a device hands out live streams
//! for a set of video constraints, and each stream exposes its capabilities,
//! torch control, and the most recently decoded frame.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which way the camera faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear camera, pointing away from the user
    #[default]
    Environment,
    /// Front camera, pointing at the user
    User,
}

impl FacingMode {
    /// Returns the other camera direction
    pub fn opposite(self) -> Self {
        match self {
            FacingMode::Environment => FacingMode::User,
            FacingMode::User => FacingMode::Environment,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FacingMode::Environment => "environment",
            FacingMode::User => "user",
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FacingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "environment" | "rear" | "back" => Ok(FacingMode::Environment),
            "user" | "front" => Ok(FacingMode::User),
            _ => Err(format!("Unknown facing mode: {}", s)),
        }
    }
}

/// Constraint set for a single stream request
///
/// `None` fields leave the choice to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoConstraints {
    pub facing_mode: Option<FacingMode>,
    pub ideal_width: Option<u32>,
    pub ideal_height: Option<u32>,
}

impl VideoConstraints {
    /// Unconstrained `{ video: true }` request
    pub fn any() -> Self {
        Self::default()
    }

    /// Returns true when no constraint is set
    pub fn is_unconstrained(&self) -> bool {
        self.facing_mode.is_none() && self.ideal_width.is_none() && self.ideal_height.is_none()
    }
}

/// Capability set reported by a video track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackCapabilities {
    /// Whether the track supports the `torch` constraint
    pub torch: bool,
}

/// A decoded video frame at the source's native resolution
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Tightly packed RGBA8 pixels, row-major, top-left origin
    pub rgba: Vec<u8>,
}

impl VideoFrame {
    /// Returns true when the pixel buffer matches the declared dimensions
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.rgba.len() == (self.width as usize) * (self.height as usize) * 4
    }
}

/// Errors reported by the media device layer
#[derive(Debug, Error)]
pub enum MediaError {
    /// The user or platform refused camera access
    #[error("Camera permission denied")]
    PermissionDenied,

    /// No camera matches the request
    #[error("No camera device found")]
    NotFound,

    /// The device cannot satisfy one of the constraints
    #[error("Constraint not satisfiable: {0}")]
    Overconstrained(String),

    /// The device is held by another process
    #[error("Camera is busy: {0}")]
    NotReadable(String),

    /// Track was stopped before the operation completed
    #[error("Track has ended")]
    TrackEnded,

    /// Anything else the backend reports
    #[error("Media backend error: {0}")]
    Backend(String),
}

/// A live camera stream
///
/// `stop` must be idempotent. After it returns, the device is released and
/// `is_live` reports false.
#[async_trait]
pub trait MediaStream: Send + Sync {
    /// Backend identifier for logging
    fn id(&self) -> &str;

    /// Capabilities of the primary video track, `None` when the backend
    /// offers no capability query
    fn capabilities(&self) -> Option<TrackCapabilities>;

    /// Applies the torch constraint to the primary video track
    async fn apply_torch(&self, on: bool) -> Result<(), MediaError>;

    /// Most recently decoded frame, `None` before the first frame arrives
    fn current_frame(&self) -> Option<VideoFrame>;

    /// Stops every track of the stream
    fn stop(&self);

    /// Whether any track is still running
    fn is_live(&self) -> bool;
}

/// Port for camera device access
#[async_trait]
pub trait MediaDevicePort: Send + Sync {
    /// Requests a video stream matching the constraints
    async fn get_user_media(
        &self,
        constraints: VideoConstraints,
    ) -> Result<Box<dyn MediaStream>, MediaError>;
}
