//! togif Edit Model
//!
//! Defines the data contracts between the interactive editors and the
//! filter-graph compiler:
//! - **Geometry:** display-space and source-space points and rectangles
//! - **Coordinates:** letterbox fitting and display/source conversion
//! - **Edit:** trim range, zoom window, export and background settings
//! - **Snapshot:** the validated, immutable `EditSpecification`
//! - **Document:** edits persisted as JSON next to the source video
//!
//! Display-space values are `f64` canvas pixels. Source-space rectangles are
//! integer video pixels with even extents, ready for block-based encoders.

pub mod coords;
pub mod document;
pub mod edit;
pub mod geometry;
pub mod snapshot;
pub mod source;

pub use document::*;
pub use edit::*;
pub use geometry::*;
pub use snapshot::*;
pub use source::*;
