//! Image payload helpers
//!
//! Data URI assembly and parsing, plus JPEG serialization of captured frames.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};

use crate::ports::media::VideoFrame;

/// MIME type assumed when a payload carries no data URI header
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Builds a `data:<mime>;base64,<payload>` URI
pub fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, BASE64.encode(bytes))
}

/// Splits a data URI into its MIME type and base64 payload
///
/// Input without a `data:...;base64,` header is returned unchanged with the
/// default MIME type.
pub fn split_data_uri(input: &str) -> (&str, &str) {
    if let Some(rest) = input.strip_prefix("data:") {
        if let Some((header, payload)) = rest.split_once(',') {
            if let Some(mime) = header.strip_suffix(";base64") {
                let mime = if mime.is_empty() {
                    DEFAULT_IMAGE_MIME
                } else {
                    mime
                };
                return (mime, payload);
            }
        }
    }
    (DEFAULT_IMAGE_MIME, input)
}

/// Returns the base64 payload of a data URI, or the input when there is no header
pub fn strip_data_uri_header(input: &str) -> &str {
    split_data_uri(input).1
}

/// Returns true when a declared MIME type names an image
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type
        .trim()
        .to_ascii_lowercase()
        .strip_prefix("image/")
        .is_some_and(|subtype| !subtype.is_empty())
}

/// Serializes a frame to JPEG without any geometric transform
///
/// The output has exactly the frame's dimensions. Alpha is discarded.
pub fn encode_jpeg(frame: &VideoFrame, quality: u8) -> Result<Vec<u8>, String> {
    let rgba = RgbaImage::from_raw(frame.width, frame.height, frame.rgba.clone())
        .ok_or_else(|| {
            format!(
                "frame buffer of {} bytes does not match {}x{}",
                frame.rgba.len(),
                frame.width,
                frame.height
            )
        })?;
    let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality)
        .encode_image(&rgb)
        .map_err(|e| e.to_string())?;

    Ok(jpeg)
}
