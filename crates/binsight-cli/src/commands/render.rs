//! Text rendering of application state
//!
//! The CLI's presentation layer: it only reads `AnalysisState` and
//! `CameraStatus`.

use binsight_core::{AnalysisResult, AnalysisState, CameraStatus, CaptureState, Phase};

/// Renders the analysis state as a block of text
pub fn render_state(state: &AnalysisState) -> String {
    match state.phase() {
        Phase::Idle => "Ready. Take a photo or choose an image.".to_string(),
        Phase::CapturingPreview => "Camera preview is open.".to_string(),
        Phase::Classifying => "Analyzing...".to_string(),
        Phase::Result(result) => render_result(result),
        Phase::Failed(message) => format!("Error: {}", message),
    }
}

/// Renders a classification result
pub fn render_result(result: &AnalysisResult) -> String {
    let title = format!("{} ({})", result.item_name, result.category.label());
    let underline = "=".repeat(title.chars().count());

    format!(
        "{title}\n{underline}\n\n\
         Category:    {category}\n\
         Confidence:  {confidence}%\n\n\
         Why:\n  {reasoning}\n\n\
         What to do:\n  {action}\n\n\
         Tip:\n  {tip}",
        category = result.category,
        confidence = result.confidence_percent(),
        reasoning = result.reasoning,
        action = result.disposal_action,
        tip = result.sustainability_tip,
    )
}

/// One-line summary of the camera
pub fn render_camera_status(status: &CameraStatus) -> String {
    match status.state {
        CaptureState::Closed => "Camera: closed".to_string(),
        CaptureState::Opening => "Camera: opening".to_string(),
        CaptureState::Open => {
            let facing = status
                .facing_mode
                .map(|f| f.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let torch = match (status.torch_capable, status.torch_on) {
                (false, _) => "unavailable",
                (true, true) => "on",
                (true, false) => "off",
            };
            format!(
                "Camera: open (facing {}, tier {}, flashlight {}{})",
                facing,
                status.tier.unwrap_or("unknown"),
                torch,
                if status.mirror_preview {
                    ", preview mirrored"
                } else {
                    ""
                }
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binsight_core::{FacingMode, WasteCategory};

    fn pizza_box() -> AnalysisResult {
        AnalysisResult {
            category: WasteCategory::Compost,
            item_name: "Greasy pizza box".to_string(),
            confidence: 0.884,
            reasoning: "Grease-soaked cardboard cannot be recycled.".to_string(),
            disposal_action: "Tear up and compost.".to_string(),
            sustainability_tip: "Recycle the clean lid separately.".to_string(),
        }
    }

    #[test]
    fn test_render_result() {
        let text = render_result(&pizza_box());

        assert!(text.starts_with("Greasy pizza box (Compost)\n"));
        assert!(text.contains("Category:    COMPOST"));
        assert!(text.contains("Confidence:  88%"));
        assert!(text.contains("Tear up and compost."));
        assert!(text.contains("Recycle the clean lid separately."));
    }

    #[test]
    fn test_render_unknown_category_label() {
        let mut result = pizza_box();
        result.category = WasteCategory::Unknown;
        assert!(render_result(&result).contains("(Unknown)"));
    }

    #[test]
    fn test_render_initial_state() {
        assert!(render_state(&AnalysisState::default()).starts_with("Ready"));
    }

    #[test]
    fn test_render_camera_status() {
        let closed = CameraStatus {
            state: CaptureState::Closed,
            facing_mode: None,
            torch_on: false,
            torch_capable: false,
            mirror_preview: false,
            tier: None,
        };
        assert_eq!(render_camera_status(&closed), "Camera: closed");

        let open = CameraStatus {
            state: CaptureState::Open,
            facing_mode: Some(FacingMode::User),
            torch_on: false,
            torch_capable: true,
            mirror_preview: true,
            tier: Some("generic"),
        };
        assert_eq!(
            render_camera_status(&open),
            "Camera: open (facing user, tier generic, flashlight off, preview mirrored)"
        );
    }
}
