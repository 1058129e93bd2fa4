//! CLI command implementations
//!
//! Each subcommand has its own module with the implementation logic.

pub mod classify;
pub mod render;
pub mod snap;
pub mod status;
