//! Metadata about the clip being edited.

use serde::{Deserialize, Serialize};

use crate::edit::EditError;
use crate::geometry::VideoDimensions;

/// Inbound source video metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceVideo {
    /// File name (or path) of the source clip.
    pub name: String,

    /// Duration in seconds.
    pub duration_secs: f64,

    /// Frame size in pixels.
    pub width: u32,
    pub height: u32,
}

impl SourceVideo {
    pub fn new(name: impl Into<String>, duration_secs: f64, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            duration_secs,
            width,
            height,
        }
    }

    pub fn dimensions(&self) -> VideoDimensions {
        VideoDimensions::new(self.width, self.height)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.dimensions().aspect_ratio()
    }

    pub fn validate(&self) -> Result<(), EditError> {
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(EditError::InvalidSource(format!(
                "duration must be positive, got {}",
                self.duration_secs
            )));
        }
        if self.width < 2 || self.height < 2 {
            return Err(EditError::InvalidSource(format!(
                "frame size {}x{} is too small",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Name of the exported GIF for this source.
    pub fn output_file_name(&self) -> String {
        gif_file_name(&self.name)
    }
}

/// Replace the final extension of `name` with `gif`, or append it.
///
/// Only a dot-suffix in the last path component counts as an extension.
pub fn gif_file_name(name: &str) -> String {
    let stem = match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() && !name[dot + 1..].contains('/') => &name[..dot],
        _ => name,
    };
    format!("{stem}.gif")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gif_file_name() {
        assert_eq!(gif_file_name("clip.final.mp4"), "clip.final.gif");
        assert_eq!(gif_file_name("clip"), "clip.gif");
        assert_eq!(gif_file_name("movie.webm"), "movie.gif");
        assert_eq!(gif_file_name("dir.v2/clip"), "dir.v2/clip.gif");
        assert_eq!(gif_file_name("trailing."), "trailing..gif");
    }

    #[test]
    fn test_validate() {
        assert!(SourceVideo::new("a.mp4", 10.0, 1920, 1080).validate().is_ok());
        assert!(SourceVideo::new("a.mp4", 0.0, 1920, 1080).validate().is_err());
        assert!(SourceVideo::new("a.mp4", f64::NAN, 1920, 1080).validate().is_err());
        assert!(SourceVideo::new("a.mp4", 10.0, 1, 1080).validate().is_err());
    }

    #[test]
    fn test_output_file_name() {
        let source = SourceVideo::new("screen recording.mov", 4.0, 1280, 720);
        assert_eq!(source.output_file_name(), "screen recording.gif");
    }
}
