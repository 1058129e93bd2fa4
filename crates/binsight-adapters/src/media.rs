//! Camera device adapters
//!
//! A camera backed by a still image, used by the CLI and tests on hosts
//! without a video device, and a device that has no camera at all.

mod image_file;
mod no_camera;

pub use image_file::ImageFileCamera;
pub use no_camera::NoCamera;
