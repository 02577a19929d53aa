//! Rounded-corner alpha masks for the background frame.
//!
//! The mask is white with the shape encoded in alpha: fully opaque inside
//! the rounded rectangle, transparent outside the corners, with a one-pixel
//! anti-aliased edge along each arc.

use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};

use togif_common::error::{TogifError, TogifResult};

/// Render a `width`x`height` mask with corner `radius`.
///
/// The radius is clamped to half the shorter side. A radius below half a
/// pixel gives a fully opaque mask.
pub fn generate_mask(width: u32, height: u32, radius: u32) -> RgbaImage {
    let r = (radius as f64).min(width.min(height) as f64 / 2.0);
    let mut img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    if r < 0.5 {
        return img;
    }

    let (w, h) = (width as f64, height as f64);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let px = x as f64 + 0.5;
        let py = y as f64 + 0.5;

        // Nearest arc centre, only meaningful inside a corner box.
        let cx = if px < r {
            r
        } else if px > w - r {
            w - r
        } else {
            continue;
        };
        let cy = if py < r {
            r
        } else if py > h - r {
            h - r
        } else {
            continue;
        };

        let distance = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
        let coverage = (r - distance + 0.5).clamp(0.0, 1.0);
        pixel.0[3] = (coverage * 255.0).round() as u8;
    }
    img
}

/// Generate a mask and write it as PNG.
pub fn write_mask(path: &Path, width: u32, height: u32, radius: u32) -> TogifResult<()> {
    if width == 0 || height == 0 {
        return Err(TogifError::image(format!(
            "Mask size must be non-zero, got {width}x{height}"
        )));
    }
    generate_mask(width, height, radius)
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| TogifError::image(format!("Failed to write mask {}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), width, height, radius, "Wrote corner mask");
    Ok(())
}
