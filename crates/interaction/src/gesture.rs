//! Pointer events and recorded gesture scripts.
//!
//! Scripts are JSONL, one step per line, so a whole editing session can be
//! replayed without a rendering surface. Blank lines and `#` comments are
//! skipped.

use serde::{Deserialize, Serialize};

use togif_edit_model::QualityPreset;

/// Where a pointer event sits in its gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// The pointer left the surface. Ends the gesture like `Up`.
    Leave,
}

impl PointerPhase {
    pub fn ends_gesture(self) -> bool {
        matches!(self, Self::Up | Self::Leave)
    }
}

/// A pointer event in the coordinate space of the surface it hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self { phase, x, y }
    }

    pub fn down(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Down, x, y)
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Move, x, y)
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Up, x, y)
    }

    pub fn leave(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Leave, x, y)
    }
}

/// One step of a recorded editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "on", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Pointer event on the crop canvas.
    Canvas {
        phase: PointerPhase,
        x: f64,
        y: f64,
    },

    /// Pointer event on the timeline track. Only `x` matters.
    Timeline {
        phase: PointerPhase,
        x: f64,
    },

    /// Move the playhead.
    Seek { t: f64 },

    /// Restamp zoom-in at the playhead.
    MarkZoomIn,

    /// Place the zoom-out marker at the playhead.
    PlaceZoomOut,

    /// Remove the crop and both zoom markers.
    ClearCrop,

    /// Switch export settings to a named preset.
    Preset { quality: QualityPreset },
}

/// Parse a JSONL gesture script.
pub fn parse_script(jsonl: &str) -> Result<Vec<ScriptStep>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize steps back to JSONL.
pub fn serialize_script(steps: &[ScriptStep]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for step in steps {
        output.push_str(&serde_json::to_string(step)?);
        output.push('\n');
    }
    Ok(output)
}
