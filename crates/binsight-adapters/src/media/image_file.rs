//! Still-image camera device
//!
//! Serves a decoded image as the live frame of every stream it opens. By
//! default it behaves like a generic webcam: it rejects facing-mode
//! constraints and has no torch.

use async_trait::async_trait;
use binsight_core::ports::media::{
    MediaDevicePort, MediaError, MediaStream, TrackCapabilities, VideoConstraints, VideoFrame,
};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Camera device whose frames come from an image file
pub struct ImageFileCamera {
    frame: VideoFrame,
    facing_modes: bool,
    torch: bool,
    live: Arc<AtomicUsize>,
    opened: AtomicUsize,
}

impl ImageFileCamera {
    /// Decodes `path` and serves it at its native resolution
    ///
    /// # Errors
    /// Returns `MediaError::NotFound` if the file is missing and
    /// `MediaError::NotReadable` if it cannot be decoded
    pub fn open(path: &Path) -> Result<Self, MediaError> {
        if !path.exists() {
            return Err(MediaError::NotFound);
        }

        let image = image::open(path)
            .map_err(|e| MediaError::NotReadable(format!("{}: {}", path.display(), e)))?
            .to_rgba8();

        debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "Loaded camera source image"
        );

        Ok(Self::from_frame(VideoFrame {
            width: image.width(),
            height: image.height(),
            rgba: image.into_raw(),
        }))
    }

    pub fn from_frame(frame: VideoFrame) -> Self {
        Self {
            frame,
            facing_modes: false,
            torch: false,
            live: Arc::new(AtomicUsize::new(0)),
            opened: AtomicUsize::new(0),
        }
    }

    /// Accept facing-mode constraints like a phone camera does
    pub fn with_facing_modes(mut self, enabled: bool) -> Self {
        self.facing_modes = enabled;
        self
    }

    /// Report a controllable torch on every track
    pub fn with_torch(mut self, enabled: bool) -> Self {
        self.torch = enabled;
        self
    }

    /// Streams opened and not yet stopped
    pub fn live_streams(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaDevicePort for ImageFileCamera {
    async fn get_user_media(
        &self,
        constraints: VideoConstraints,
    ) -> Result<Box<dyn MediaStream>, MediaError> {
        if constraints.facing_mode.is_some() && !self.facing_modes {
            return Err(MediaError::Overconstrained("facingMode".to_string()));
        }

        // Ideal width and height are hints; the native size is always served
        let n = self.opened.fetch_add(1, Ordering::SeqCst) + 1;
        self.live.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(ImageFileStream {
            id: format!("image-file-{}", n),
            frame: self.frame.clone(),
            torch: self.torch,
            torch_on: AtomicBool::new(false),
            live: AtomicBool::new(true),
            live_count: Arc::clone(&self.live),
        }))
    }
}

struct ImageFileStream {
    id: String,
    frame: VideoFrame,
    torch: bool,
    torch_on: AtomicBool,
    live: AtomicBool,
    live_count: Arc<AtomicUsize>,
}

#[async_trait]
impl MediaStream for ImageFileStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> Option<TrackCapabilities> {
        Some(TrackCapabilities { torch: self.torch })
    }

    async fn apply_torch(&self, on: bool) -> Result<(), MediaError> {
        if !self.is_live() {
            return Err(MediaError::TrackEnded);
        }
        if !self.torch {
            return Err(MediaError::Overconstrained("torch".to_string()));
        }
        self.torch_on.store(on, Ordering::SeqCst);
        Ok(())
    }

    fn current_frame(&self) -> Option<VideoFrame> {
        self.is_live().then(|| self.frame.clone())
    }

    fn stop(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            self.live_count.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binsight_core::config::CameraConfig;
    use binsight_core::ports::media::FacingMode;
    use binsight_core::{CaptureSession, MediaAcquisition};
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn frame(width: u32, height: u32) -> VideoFrame {
        VideoFrame {
            width,
            height,
            rgba: vec![128; (width * height * 4) as usize],
        }
    }

    #[test]
    fn test_open_decodes_native_resolution() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bottle.png");
        RgbImage::from_pixel(320, 240, Rgb([10, 200, 30]))
            .save(&path)
            .unwrap();

        let camera = ImageFileCamera::open(&path).unwrap();

        assert_eq!(camera.frame.width, 320);
        assert_eq!(camera.frame.height, 240);
        assert_eq!(&camera.frame.rgba[..4], &[10, 200, 30, 255]);
    }

    #[test]
    fn test_open_missing_file() {
        let result = ImageFileCamera::open(Path::new("/nonexistent/photo.jpg"));
        assert!(matches!(result, Err(MediaError::NotFound)));
    }

    #[test]
    fn test_open_undecodable_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.png");
        std::fs::write(&path, b"not an image").unwrap();

        let result = ImageFileCamera::open(&path);
        assert!(matches!(result, Err(MediaError::NotReadable(_))));
    }

    #[tokio::test]
    async fn test_generic_device_rejects_facing_constraint() {
        let camera = ImageFileCamera::from_frame(frame(4, 4));

        let constrained = VideoConstraints {
            facing_mode: Some(FacingMode::Environment),
            ..VideoConstraints::default()
        };
        assert!(matches!(
            camera.get_user_media(constrained).await,
            Err(MediaError::Overconstrained(_))
        ));

        let stream = camera.get_user_media(VideoConstraints::any()).await.unwrap();
        assert!(stream.is_live());
        assert_eq!(camera.live_streams(), 1);

        stream.stop();
        stream.stop();
        assert_eq!(camera.live_streams(), 0);
        assert!(stream.current_frame().is_none());
    }

    #[tokio::test]
    async fn test_torch_support() {
        let camera = ImageFileCamera::from_frame(frame(4, 4)).with_torch(true);
        let stream = camera.get_user_media(VideoConstraints::any()).await.unwrap();

        assert_eq!(stream.capabilities(), Some(TrackCapabilities { torch: true }));
        assert!(stream.apply_torch(true).await.is_ok());

        stream.stop();
        assert!(matches!(
            stream.apply_torch(false).await,
            Err(MediaError::TrackEnded)
        ));
    }

    #[tokio::test]
    async fn test_no_torch_rejects_constraint() {
        let camera = ImageFileCamera::from_frame(frame(4, 4));
        let stream = camera.get_user_media(VideoConstraints::any()).await.unwrap();

        assert_eq!(stream.capabilities(), Some(TrackCapabilities { torch: false }));
        assert!(stream.apply_torch(true).await.is_err());
    }

    // === Acquisition Ladder Tests ===

    #[tokio::test]
    async fn test_generic_device_lands_on_generic_tier() {
        let camera = Arc::new(ImageFileCamera::from_frame(frame(8, 6)));
        let acquisition = MediaAcquisition::new(Arc::clone(&camera), &CameraConfig::default());

        let session = acquisition.open(FacingMode::Environment).await.unwrap();

        assert_eq!(session.tier, "generic");
        assert_eq!(session.facing_mode, FacingMode::User);
        assert_eq!(camera.live_streams(), 1);

        drop(session);
        assert_eq!(camera.live_streams(), 0);
    }

    #[tokio::test]
    async fn test_phone_like_device_lands_on_first_tier() {
        let camera = Arc::new(ImageFileCamera::from_frame(frame(8, 6)).with_facing_modes(true));
        let acquisition = MediaAcquisition::new(Arc::clone(&camera), &CameraConfig::default());

        let session = acquisition.open(FacingMode::Environment).await.unwrap();

        assert_eq!(session.tier, "high-resolution");
        assert_eq!(session.facing_mode, FacingMode::Environment);
    }

    #[tokio::test]
    async fn test_capture_through_session_keeps_native_size() {
        let camera = Arc::new(ImageFileCamera::from_frame(frame(640, 480)));
        let session = CaptureSession::new(Arc::clone(&camera), &CameraConfig::default());

        session.open(FacingMode::Environment).await.unwrap();
        let photo = session.capture().await.unwrap();

        assert_eq!((photo.width, photo.height), (640, 480));
        assert!(photo.data_uri.starts_with("data:image/jpeg;base64,"));

        session.close();
        assert_eq!(camera.live_streams(), 0);
    }
}
