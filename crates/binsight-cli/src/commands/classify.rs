//! Classify command
//!
//! Handles `binsight classify <FILE>`: the upload path of the app.

use anyhow::{bail, Context, Result};
use binsight_adapters::{read_selected_file, NoCamera};
use binsight_core::{ApplicationState, MediaDevicePort, Phase};
use std::path::Path;
use std::sync::Arc;

use super::render::render_state;
use crate::app::{build_inference_port, AppContext};

/// Classify an image file
///
/// Files whose extension does not declare an image type are rejected
/// without contacting the inference service.
///
/// # Errors
/// Returns an error if the file cannot be read, no provider is configured,
/// or classification fails
pub async fn run(ctx: &AppContext, file: &Path) -> Result<()> {
    let config = ctx.config();
    let selected = read_selected_file(file).await.context("Failed to read image")?;
    let provider = build_inference_port(&config.classifier)?;

    let device: Arc<dyn MediaDevicePort> = Arc::new(NoCamera);
    let mut app = ApplicationState::new(device, provider, &config.camera);

    println!("Analyzing {}...", selected.name);
    println!();

    let state = app.select_file(selected).await;
    if let Phase::Failed(message) = state.phase() {
        bail!("{}", message);
    }

    println!("{}", render_state(state));
    Ok(())
}
