//! togif Interaction
//!
//! Turns raw pointer events into edit state:
//! - **Crop:** draw, resize, and move an aspect-locked crop box on the canvas
//! - **Timeline:** scrub, drag trim handles, and place zoom markers
//! - **Session:** owns both controllers and freezes them into an
//!   `EditSpecification`
//!
//! Controllers never fail. Out-of-range input is clamped, and validation
//! happens once, when a session is snapshotted for export.

pub mod crop;
pub mod gesture;
pub mod session;
pub mod timeline;

pub use crop::{CropCommit, CropInteractionController, CropMode};
pub use gesture::{PointerEvent, PointerPhase, ScriptStep};
pub use session::{EditorSession, SessionError};
pub use timeline::{DragTarget, TimelineController, TimelineUpdate, TrackGeometry};
