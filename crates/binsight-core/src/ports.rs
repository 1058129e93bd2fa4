//! Port definitions for Hexagonal Architecture
//!
//! These traits define the boundaries between the core domain and external adapters.

pub mod inference;
pub mod media;

pub use inference::InferencePort;
pub use media::{MediaDevicePort, MediaStream};
