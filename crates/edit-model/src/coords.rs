//! Conversions between canvas (display) and video (source) pixels.
//!
//! The canvas shows the video letterboxed into its container. Both axis
//! scales derive from that effective render rectangle, so a rectangle drawn
//! on the canvas always maps onto the same region of the video regardless of
//! how large the canvas currently is.
//!
//! None of these functions fail: out-of-range input is clamped.

use crate::geometry::{DisplayPoint, DisplayRect, DisplaySize, SourcePoint, SourceRect, VideoDimensions};

/// Letterbox-fit a video of `source` dimensions into `container`.
///
/// A container wider than the video is height-bound, otherwise width-bound.
pub fn fit_to_container(container: DisplaySize, source: VideoDimensions) -> DisplaySize {
    if container.is_empty() {
        return DisplaySize::new(0.0, 0.0);
    }
    let video_aspect = source.aspect_ratio();
    if container.aspect_ratio() > video_aspect {
        DisplaySize::new(container.height * video_aspect, container.height)
    } else {
        DisplaySize::new(container.width, container.width / video_aspect)
    }
}

/// Map a canvas point into source pixels, clamped to the frame.
pub fn to_source(point: DisplayPoint, display: DisplaySize, source: VideoDimensions) -> SourcePoint {
    let (sx, sy) = scales(display, source);
    SourcePoint {
        x: (point.x * sx).clamp(0.0, source.width as f64),
        y: (point.y * sy).clamp(0.0, source.height as f64),
    }
}

/// Map a source crop window back onto the canvas, rounded to whole pixels.
pub fn to_display(rect: SourceRect, display: DisplaySize, source: VideoDimensions) -> DisplayRect {
    let (sx, sy) = scales(display, source);
    let inv = |v: u32, s: f64| if s > 0.0 { (v as f64 / s).round() } else { 0.0 };
    DisplayRect::new(
        inv(rect.x, sx),
        inv(rect.y, sy),
        inv(rect.width, sx),
        inv(rect.height, sy),
    )
}

/// Map a canvas rectangle into a crop window the encoder accepts.
///
/// The result is contained in the frame and has even width and height.
/// It may be degenerate (an extent below 2) if the input was tiny.
pub fn rect_to_source(rect: DisplayRect, display: DisplaySize, source: VideoDimensions) -> SourceRect {
    let (sx, sy) = scales(display, source);

    let x = round_clamped(rect.x * sx, source.width);
    let y = round_clamped(rect.y * sy, source.height);
    let width = round_clamped(rect.width * sx, source.width - x);
    let height = round_clamped(rect.height * sy, source.height - y);

    SourceRect::new(x, y, floor_even(width), floor_even(height))
}

/// Largest even number not above `n`.
pub fn floor_even(n: u32) -> u32 {
    n & !1
}

fn scales(display: DisplaySize, source: VideoDimensions) -> (f64, f64) {
    let axis = |src: u32, disp: f64| if disp > 0.0 { src as f64 / disp } else { 0.0 };
    (axis(source.width, display.width), axis(source.height, display.height))
}

fn round_clamped(value: f64, max: u32) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    (value.round() as u64).min(max as u64) as u32
}
