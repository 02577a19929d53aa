//! Point, size, and rectangle types for the two coordinate spaces.
//!
//! Display space is the rendered canvas the user points at. Source space is
//! the pixel grid of the original video. The two never share a type, so a
//! canvas rectangle cannot reach the compiler without passing through
//! [`crate::coords`].

use serde::{Deserialize, Serialize};

/// A pointer position on the rendered canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayPoint {
    pub x: f64,
    pub y: f64,
}

impl DisplayPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset from `origin` to this point.
    pub fn delta_from(&self, origin: &DisplayPoint) -> (f64, f64) {
        (self.x - origin.x, self.y - origin.y)
    }
}

/// Size of the rendered canvas in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width over height; `0.0` for an empty canvas.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height <= 0.0 {
            0.0
        } else {
            self.width / self.height
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// A rectangle on the rendered canvas.
///
/// `x`/`y` is the top-left corner; `width`/`height` are never negative once
/// a controller has normalized the rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A zero-size rectangle at `point`.
    pub fn at(point: DisplayPoint) -> Self {
        Self::new(point.x, point.y, 0.0, 0.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn top_left(&self) -> DisplayPoint {
        DisplayPoint::new(self.x, self.y)
    }

    pub fn top_right(&self) -> DisplayPoint {
        DisplayPoint::new(self.right(), self.y)
    }

    pub fn bottom_left(&self) -> DisplayPoint {
        DisplayPoint::new(self.x, self.bottom())
    }

    pub fn bottom_right(&self) -> DisplayPoint {
        DisplayPoint::new(self.right(), self.bottom())
    }

    /// Inclusive containment check.
    pub fn contains(&self, point: &DisplayPoint) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Whether the rectangle lies entirely inside a canvas of `size`.
    pub fn fits_within(&self, size: &DisplaySize) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.right() <= size.width + 1e-9
            && self.bottom() <= size.height + 1e-9
    }

    /// Width over height; `0.0` for a degenerate rectangle.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height <= 0.0 {
            0.0
        } else {
            self.width / self.height
        }
    }

    /// Scale all components per axis (used when the canvas is resized).
    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self::new(self.x * sx, self.y * sy, self.width * sx, self.height * sy)
    }
}

/// A position in source video pixels (sub-pixel precision retained).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourcePoint {
    pub x: f64,
    pub y: f64,
}

/// A crop window in source video pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SourceRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Whether the rectangle lies entirely inside the video frame.
    pub fn fits_within(&self, dims: &VideoDimensions) -> bool {
        self.right() <= dims.width && self.bottom() <= dims.height
    }

    /// Whether both extents are even, as block-based encoders require.
    pub fn has_even_extent(&self) -> bool {
        self.width % 2 == 0 && self.height % 2 == 0
    }

    pub fn is_degenerate(&self) -> bool {
        self.width < 2 || self.height < 2
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f64 / self.height as f64
        }
    }
}

/// Pixel dimensions of the source video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoDimensions {
    pub width: u32,
    pub height: u32,
}

impl VideoDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; `1.0` for a dimensionless video.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f64 / self.height as f64
        }
    }

    /// The full frame as a crop window.
    pub fn full_rect(&self) -> SourceRect {
        SourceRect::new(0, 0, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rect_corners() {
        let rect = DisplayRect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.top_left(), DisplayPoint::new(10.0, 20.0));
        assert_eq!(rect.top_right(), DisplayPoint::new(110.0, 20.0));
        assert_eq!(rect.bottom_left(), DisplayPoint::new(10.0, 70.0));
        assert_eq!(rect.bottom_right(), DisplayPoint::new(110.0, 70.0));
    }

    #[test]
    fn test_display_rect_contains_is_inclusive() {
        let rect = DisplayRect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(&DisplayPoint::new(0.0, 0.0)));
        assert!(rect.contains(&DisplayPoint::new(10.0, 10.0)));
        assert!(!rect.contains(&DisplayPoint::new(10.1, 5.0)));
    }

    #[test]
    fn test_source_rect_bounds() {
        let dims = VideoDimensions::new(1920, 1080);
        assert!(SourceRect::new(0, 0, 1920, 1080).fits_within(&dims));
        assert!(!SourceRect::new(2, 0, 1920, 1080).fits_within(&dims));
        assert!(SourceRect::new(0, 0, 640, 360).has_even_extent());
        assert!(!SourceRect::new(0, 0, 641, 360).has_even_extent());
    }

    #[test]
    fn test_video_aspect_ratio() {
        let dims = VideoDimensions::new(1920, 1080);
        assert!((dims.aspect_ratio() - 16.0 / 9.0).abs() < 1e-9);
        assert_eq!(VideoDimensions::new(0, 0).aspect_ratio(), 1.0);
    }
}
