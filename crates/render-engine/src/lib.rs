//! togif Render Engine
//!
//! Turns a validated edit into a GIF:
//!
//! ```text
//! EditSpecification ── compile ──► PipelineDescription
//!                                        │
//!            mask.png ◄── write_mask ────┤ (background only)
//!                                        ▼
//!                                 ffmpeg -filter_complex
//!                                        │
//!                                        ▼
//!                                    clip.gif
//! ```
//!
//! The compiler is pure; only [`export`] touches the filesystem and spawns
//! processes.

pub mod export;
pub mod filter_graph;
pub mod mask;
pub mod pipeline;
pub mod probe;

pub use export::*;
pub use filter_graph::compile;
pub use mask::{generate_mask, write_mask};
pub use pipeline::*;
pub use probe::probe_source;
