//! Snap command
//!
//! Handles `binsight snap --device <IMAGE>`: the camera path of the app,
//! driven by a still-image camera.

use anyhow::{bail, Context, Result};
use binsight_adapters::ImageFileCamera;
use binsight_core::{ApplicationState, FacingMode, MediaDevicePort, Phase};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::render::{render_camera_status, render_state};
use crate::app::{build_inference_port, AppContext};

/// Options for one snap run
#[derive(Debug, Clone, Default)]
pub struct SnapOptions {
    /// Image served as the camera feed
    pub device: PathBuf,
    /// Camera to open, overriding `[camera] default_facing`
    pub facing: Option<FacingMode>,
    /// Turn the flashlight on before capturing
    pub torch: bool,
    /// Switch to the other camera before capturing
    pub switch: bool,
    /// Emulate a device that honours facing-mode constraints
    pub facing_modes: bool,
    /// Emulate a device with a flashlight
    pub torch_capable: bool,
}

/// Open the camera, capture one photo and classify it
///
/// # Errors
/// Returns an error if the camera cannot be opened or switched, no frame is
/// available, or classification fails
pub async fn run(ctx: &AppContext, options: SnapOptions) -> Result<()> {
    let config = ctx.config();
    let provider = build_inference_port(&config.classifier)?;

    let camera = ImageFileCamera::open(&options.device)
        .with_context(|| format!("Failed to load {}", options.device.display()))?
        .with_facing_modes(options.facing_modes)
        .with_torch(options.torch_capable);
    let device: Arc<dyn MediaDevicePort> = Arc::new(camera);

    let mut camera_config = config.camera.clone();
    if let Some(facing) = options.facing {
        camera_config.default_facing = facing;
    }
    let mut app = ApplicationState::new(device, provider, &camera_config);

    app.open_camera().await?;
    println!("{}", render_camera_status(&app.camera_status()));

    if options.switch {
        app.switch_camera().await?;
        println!("{}", render_camera_status(&app.camera_status()));
    }

    if options.torch {
        match app.toggle_torch().await {
            Ok(on) => info!(on, "Flashlight toggled"),
            Err(e) => eprintln!("Warning: {}", e),
        }
        println!("{}", render_camera_status(&app.camera_status()));
    }

    println!();
    println!("Analyzing captured photo...");
    println!();

    let state = app.capture_photo().await?;
    if let Phase::Failed(message) = state.phase() {
        bail!("{}", message);
    }

    println!("{}", render_state(state));
    Ok(())
}
