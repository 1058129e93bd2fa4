//! Device for hosts with no camera attached

use async_trait::async_trait;
use binsight_core::ports::media::{MediaDevicePort, MediaError, MediaStream, VideoConstraints};

/// Answers every stream request with `NotFound`
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCamera;

#[async_trait]
impl MediaDevicePort for NoCamera {
    async fn get_user_media(
        &self,
        _constraints: VideoConstraints,
    ) -> Result<Box<dyn MediaStream>, MediaError> {
        Err(MediaError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binsight_core::config::CameraConfig;
    use binsight_core::ports::media::FacingMode;
    use binsight_core::{CameraError, MediaAcquisition};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_every_tier_fails() {
        let acquisition = MediaAcquisition::new(Arc::new(NoCamera), &CameraConfig::default());
        let result = acquisition.open(FacingMode::User).await;
        assert!(matches!(result, Err(CameraError::Unavailable)));
    }
}
