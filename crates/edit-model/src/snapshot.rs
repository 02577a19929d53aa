//! The frozen, validated edit handed to the compiler.

use serde::{Deserialize, Serialize};

use crate::edit::{BackgroundSettings, EditError, ExportSettings, TrimRange, ZoomWindow};
use crate::geometry::SourceRect;
use crate::source::SourceVideo;

/// Everything needed to render one export.
///
/// Built fresh for every export request and never mutated afterwards. The
/// constructor enforces:
/// - the trim range lies within the source duration,
/// - the crop is inside the frame with even extents of at least 2,
/// - a zoom-in exists only with a crop, a zoom-out only with a zoom-in,
///   and both lie inside the trim range in order,
/// - background padding is within `[0, 0.5]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EditSpecificationData")]
pub struct EditSpecification {
    source: SourceVideo,
    trim: TrimRange,
    crop: Option<SourceRect>,
    zoom: ZoomWindow,
    export: ExportSettings,
    background: BackgroundSettings,
}

#[derive(Deserialize)]
struct EditSpecificationData {
    source: SourceVideo,
    trim: TrimRange,
    #[serde(default)]
    crop: Option<SourceRect>,
    #[serde(default)]
    zoom: ZoomWindow,
    #[serde(default)]
    export: ExportSettings,
    #[serde(default)]
    background: BackgroundSettings,
}

impl TryFrom<EditSpecificationData> for EditSpecification {
    type Error = EditError;

    fn try_from(raw: EditSpecificationData) -> Result<Self, Self::Error> {
        Self::new(
            raw.source,
            raw.trim,
            raw.crop,
            raw.zoom,
            raw.export,
            raw.background,
        )
    }
}

impl EditSpecification {
    pub fn new(
        source: SourceVideo,
        trim: TrimRange,
        crop: Option<SourceRect>,
        zoom: ZoomWindow,
        export: ExportSettings,
        background: BackgroundSettings,
    ) -> Result<Self, EditError> {
        source.validate()?;
        // Re-check the trim against this source's duration.
        TrimRange::new(trim.start(), trim.end(), source.duration_secs)?;

        if let Some(rect) = crop {
            let dims = source.dimensions();
            if !rect.fits_within(&dims) {
                return Err(EditError::CropOutOfBounds {
                    x: rect.x,
                    y: rect.y,
                    width: rect.width,
                    height: rect.height,
                    source_width: dims.width,
                    source_height: dims.height,
                });
            }
            if rect.is_degenerate() || !rect.has_even_extent() {
                return Err(EditError::CropNotEven {
                    width: rect.width,
                    height: rect.height,
                });
            }
        }

        zoom.validate(&trim, crop.is_some())?;
        background.validate()?;

        Ok(Self {
            source,
            trim,
            crop,
            zoom,
            export,
            background,
        })
    }

    /// An untouched edit of the whole clip with the given settings.
    pub fn full_clip(source: SourceVideo, export: ExportSettings) -> Result<Self, EditError> {
        let trim = TrimRange::full(source.duration_secs)?;
        Self::new(
            source,
            trim,
            None,
            ZoomWindow::none(),
            export,
            BackgroundSettings::default(),
        )
    }

    pub fn source(&self) -> &SourceVideo {
        &self.source
    }

    pub fn trim(&self) -> TrimRange {
        self.trim
    }

    pub fn crop(&self) -> Option<SourceRect> {
        self.crop
    }

    pub fn zoom(&self) -> ZoomWindow {
        self.zoom
    }

    pub fn export(&self) -> &ExportSettings {
        &self.export
    }

    pub fn background(&self) -> &BackgroundSettings {
        &self.background
    }
}
