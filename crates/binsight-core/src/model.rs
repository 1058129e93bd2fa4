//! Domain model for waste classification results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Disposal category assigned to an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WasteCategory {
    /// Clean paper, cardboard, glass, metal, rigid plastics
    Recycle,
    /// Food scraps, soiled paper, yard waste
    Compost,
    /// Batteries, electronics, chemicals, paint
    Hazard,
    /// Everything else headed for landfill
    Trash,
    /// Never produced by the classifier; consumers must still handle it
    Unknown,
}

impl WasteCategory {
    /// Categories the classifier is allowed to emit, in tie-break priority order
    pub const CLASSIFIABLE: [WasteCategory; 4] = [
        WasteCategory::Hazard,
        WasteCategory::Compost,
        WasteCategory::Recycle,
        WasteCategory::Trash,
    ];

    /// Wire name used in the response schema
    pub fn as_str(&self) -> &'static str {
        match self {
            WasteCategory::Recycle => "RECYCLE",
            WasteCategory::Compost => "COMPOST",
            WasteCategory::Hazard => "HAZARD",
            WasteCategory::Trash => "TRASH",
            WasteCategory::Unknown => "UNKNOWN",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            WasteCategory::Recycle => "Recycle",
            WasteCategory::Compost => "Compost",
            WasteCategory::Hazard => "Hazardous Waste",
            WasteCategory::Trash => "Landfill",
            WasteCategory::Unknown => "Unknown",
        }
    }

    /// Parses a wire name. Only the four classifiable categories are accepted.
    pub fn from_wire(s: &str) -> Option<Self> {
        Self::CLASSIFIABLE
            .into_iter()
            .find(|c| c.as_str() == s.trim())
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification outcome for one image
///
/// Produced only by the classification client and treated as read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub category: WasteCategory,
    pub item_name: String,
    /// Model confidence in `[0, 1]`
    pub confidence: f64,
    pub reasoning: String,
    pub disposal_action: String,
    pub sustainability_tip: String,
}

impl AnalysisResult {
    /// Confidence as a rounded percentage for display
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}
