//! Status command
//!
//! Handles `binsight status`: shows the effective configuration and whether
//! the classifier can be reached.

use anyhow::Result;
use binsight_core::{ApiKeyManager, ClassifierMode, Config};
use std::path::Path;

use crate::app::AppContext;

/// Show configuration and provider readiness
pub fn run(ctx: &AppContext) -> Result<()> {
    print!(
        "{}",
        render(ctx.config(), &ctx.config_path, ApiKeyManager::is_key_available())
    );
    Ok(())
}

fn render(config: &Config, config_path: &Path, key_available: bool) -> String {
    let mut out = String::new();

    out.push_str("Binsight Status\n");
    out.push_str("===============\n\n");

    out.push_str("Classifier\n");
    out.push_str("----------\n");
    out.push_str(&format!("  Mode: {}\n", config.classifier.mode));
    match config.classifier.mode {
        ClassifierMode::Direct => {
            out.push_str(&format!("  Model: {}\n", config.classifier.model));
            out.push_str(&format!(
                "  API key: {}\n",
                if key_available {
                    "configured"
                } else {
                    "missing (set GEMINI_API_KEY)"
                }
            ));
        }
        ClassifierMode::Relay => {
            out.push_str(&format!("  Relay: {}\n", config.classifier.relay_url));
        }
    }
    out.push_str(&format!(
        "  Timeout: {} seconds\n\n",
        config.classifier.timeout_seconds
    ));

    out.push_str("Camera\n");
    out.push_str("------\n");
    out.push_str(&format!("  Default facing: {}\n", config.camera.default_facing));
    out.push_str(&format!(
        "  Requested resolution: {}x{}\n",
        config.camera.ideal_width, config.camera.ideal_height
    ));
    out.push_str(&format!("  JPEG quality: {}\n\n", config.camera.jpeg_quality));

    out.push_str("Files\n");
    out.push_str("-----\n");
    out.push_str(&format!("  Config: {}\n", config_path.display()));
    out.push_str(&format!(
        "  Logs: {} (level {})\n",
        config.logging.log_dir.display(),
        config.logging.level
    ));

    out
}
