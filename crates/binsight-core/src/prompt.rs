//! Prompt and response schema for waste classification
//!
//! Builds the single inference request sent for every classification.

use serde_json::{json, Value};

use crate::model::WasteCategory;
use crate::ports::inference::{InferenceRequest, InlineImage};

/// User-turn prompt sent alongside the image
pub const CLASSIFY_PROMPT: &str = "Classify the waste item in this image.";

/// System instruction encoding the taxonomy and tie-break rules
pub const SYSTEM_INSTRUCTION: &str = r#"You are an expert waste management assistant. Identify the main item in the image and decide how it should be disposed of.

Categories:
- RECYCLE: clean paper, cardboard, glass bottles and jars, metal cans, rigid plastic containers.
- COMPOST: food scraps, yard waste, and paper or cardboard that is dirty, wet, or greasy.
- HAZARD: batteries, electronics, light bulbs, paint, chemicals, medicines, and anything flammable or toxic.
- TRASH: everything that cannot be recycled, composted, or handled as hazardous waste.

When more than one category could apply, use this priority: HAZARD > COMPOST > RECYCLE > TRASH.
- A pizza box or paper plate that is greasy, wet, or food-soiled is COMPOST, never RECYCLE.
- Electronics, chemicals, and batteries are always HAZARD, even if their materials are recyclable.

Respond with the item name, the category, a confidence between 0 and 1, a short reasoning, a concrete disposal action, and one sustainability tip."#;

/// Builder for the classification request
pub struct PromptBuilder;

impl PromptBuilder {
    /// Builds the inference request for one image
    ///
    /// # Arguments
    /// * `mime_type` - MIME type of the image payload
    /// * `base64` - Base64 image data without a data URI header
    pub fn build_request(mime_type: &str, base64: &str) -> InferenceRequest {
        InferenceRequest {
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            image: InlineImage {
                mime_type: mime_type.to_string(),
                data: base64.to_string(),
            },
            prompt: CLASSIFY_PROMPT.to_string(),
            response_schema: Self::response_schema(),
        }
    }

    /// JSON schema the structured output must satisfy
    ///
    /// All six fields are required and `category` is limited to the four
    /// classifiable values.
    pub fn response_schema() -> Value {
        let categories: Vec<&str> = WasteCategory::CLASSIFIABLE
            .iter()
            .map(|c| c.as_str())
            .collect();

        json!({
            "type": "OBJECT",
            "properties": {
                "category": {
                    "type": "STRING",
                    "enum": categories,
                    "description": "Disposal category"
                },
                "itemName": {
                    "type": "STRING",
                    "description": "Short name of the item"
                },
                "confidence": {
                    "type": "NUMBER",
                    "description": "Confidence between 0 and 1"
                },
                "reasoning": {
                    "type": "STRING",
                    "description": "Why this category applies"
                },
                "disposalAction": {
                    "type": "STRING",
                    "description": "What the user should do with the item"
                },
                "sustainabilityTip": {
                    "type": "STRING",
                    "description": "One tip to reduce this kind of waste"
                }
            },
            "required": [
                "category",
                "itemName",
                "confidence",
                "reasoning",
                "disposalAction",
                "sustainabilityTip"
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_instruction_encodes_priority() {
        assert!(SYSTEM_INSTRUCTION.contains("HAZARD > COMPOST > RECYCLE > TRASH"));
        assert!(SYSTEM_INSTRUCTION.contains("greasy"));
        assert!(SYSTEM_INSTRUCTION.contains("batteries are always HAZARD"));
    }

    #[test]
    fn test_schema_requires_all_fields() {
        let schema = PromptBuilder::response_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 6);
        for field in [
            "category",
            "itemName",
            "confidence",
            "reasoning",
            "disposalAction",
            "sustainabilityTip",
        ] {
            assert!(required.iter().any(|v| v == field), "missing {}", field);
        }
    }

    #[test]
    fn test_schema_category_enum_excludes_unknown() {
        let schema = PromptBuilder::response_schema();
        let values = schema["properties"]["category"]["enum"].as_array().unwrap();
        assert_eq!(values.len(), 4);
        assert!(!values.iter().any(|v| v == "UNKNOWN"));
        assert_eq!(schema["properties"]["confidence"]["type"], "NUMBER");
    }

    #[test]
    fn test_build_request() {
        let request = PromptBuilder::build_request("image/jpeg", "aGVsbG8=");
        assert_eq!(request.image.mime_type, "image/jpeg");
        assert_eq!(request.image.data, "aGVsbG8=");
        assert_eq!(request.prompt, CLASSIFY_PROMPT);
        assert!(!request.system_instruction.is_empty());
    }
}
