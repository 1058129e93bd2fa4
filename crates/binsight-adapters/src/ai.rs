//! Inference provider adapters
//!
//! Direct Gemini access and the key-holding relay, both implementing
//! InferencePort.

mod gemini;
mod relay;
mod wire;

pub use gemini::{GeminiAdapter, DEFAULT_GEMINI_MODEL, GEMINI_API_BASE, REQUEST_TIMEOUT_SECS};
pub use relay::RelayAdapter;
