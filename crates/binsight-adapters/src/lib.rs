//! Binsight Adapters - Infrastructure implementations
//!
//! Concrete implementations of the ports defined in binsight-core: Gemini and
//! relay inference clients, a still-image camera device, and file input.

pub mod ai;
pub mod file_input;
pub mod media;

// Re-export primary adapter types
pub use ai::{GeminiAdapter, RelayAdapter};
pub use file_input::{read_selected_file, FileInputError};
pub use media::{ImageFileCamera, NoCamera};
