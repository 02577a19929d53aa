//! togif Common Utilities
//!
//! Shared infrastructure for all togif crates:
//! - Error types and result aliases
//! - Configuration loading
//! - Tracing/logging initialization
//! - Time formatting

pub mod config;
pub mod error;
pub mod logging;
pub mod timecode;

pub use config::*;
pub use error::*;
pub use timecode::*;
