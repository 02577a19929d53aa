//! Edit parameters: trim, zoom window, export settings, and background.
//!
//! Value types with invariants expose validating constructors and keep their
//! fields private. Deserialization goes through the same checks.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Smallest allowed distance between zoom-in and zoom-out, in seconds.
pub const MIN_ZOOM_GAP_SECS: f64 = 0.1;

/// Float slack for comparisons against user-supplied times.
pub(crate) const TIME_EPSILON: f64 = 1e-9;

pub const FPS_RANGE: RangeInclusive<u32> = 5..=30;
pub const WIDTH_RANGE: RangeInclusive<u32> = 320..=1200;
pub const COLORS_RANGE: RangeInclusive<u32> = 32..=256;
pub const DITHER_RANGE: RangeInclusive<u32> = 0..=5;

/// Errors raised when edit parameters violate their constraints.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("invalid trim range [{start}, {end}] for a {duration}s source")]
    InvalidTrim { start: f64, end: f64, duration: f64 },

    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("loop count {0} is not one of -1, 0, 1, 2, 3, 5, 10")]
    InvalidLoopCount(i32),

    #[error("invalid color {0:?}, expected #rrggbb")]
    InvalidColor(String),

    #[error("background padding {0} is outside [0.0, 0.5]")]
    InvalidPadding(f64),

    #[error("zoom-in requires a crop rectangle")]
    ZoomWithoutCrop,

    #[error("zoom-out requires a zoom-in")]
    ZoomOutWithoutZoomIn,

    #[error("zoom window [{start:?}, {end:?}] does not fit trim [{trim_start}, {trim_end}]")]
    ZoomOutOfRange {
        start: Option<f64>,
        end: Option<f64>,
        trim_start: f64,
        trim_end: f64,
    },

    #[error("crop {width}x{height}+{x}+{y} does not fit a {source_width}x{source_height} source")]
    CropOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        source_width: u32,
        source_height: u32,
    },

    #[error("crop extent {width}x{height} must be even and at least 2x2")]
    CropNotEven { width: u32, height: u32 },

    #[error("invalid source: {0}")]
    InvalidSource(String),
}

/// Kept portion of the source, in seconds.
///
/// Always `0 <= start < end`; constructors also bound `end` by the source
/// duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TrimBounds")]
pub struct TrimRange {
    start: f64,
    end: f64,
}

#[derive(Deserialize)]
struct TrimBounds {
    start: f64,
    end: f64,
}

impl TryFrom<TrimBounds> for TrimRange {
    type Error = EditError;

    fn try_from(raw: TrimBounds) -> Result<Self, Self::Error> {
        TrimRange::new(raw.start, raw.end, f64::INFINITY)
    }
}

impl TrimRange {
    pub fn new(start: f64, end: f64, duration: f64) -> Result<Self, EditError> {
        let valid = start.is_finite()
            && end.is_finite()
            && start >= 0.0
            && start < end
            && end <= duration + TIME_EPSILON;
        if !valid {
            return Err(EditError::InvalidTrim {
                start,
                end,
                duration,
            });
        }
        Ok(Self { start, end })
    }

    /// The whole source.
    pub fn full(duration: f64) -> Result<Self, EditError> {
        Self::new(0.0, duration, duration)
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.start - TIME_EPSILON && t <= self.end + TIME_EPSILON
    }
}

/// Timestamps where playback switches into and out of the crop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoomWindow {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl ZoomWindow {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn starting_at(start: f64) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Check ordering against `trim` and whether a crop exists.
    pub fn validate(&self, trim: &TrimRange, has_crop: bool) -> Result<(), EditError> {
        let out_of_range = || EditError::ZoomOutOfRange {
            start: self.start,
            end: self.end,
            trim_start: trim.start(),
            trim_end: trim.end(),
        };

        match (self.start, self.end) {
            (None, None) => Ok(()),
            (None, Some(_)) => Err(EditError::ZoomOutWithoutZoomIn),
            (Some(_), _) if !has_crop => Err(EditError::ZoomWithoutCrop),
            (Some(start), end) => {
                if !start.is_finite() || !trim.contains(start) {
                    return Err(out_of_range());
                }
                if let Some(end) = end {
                    let ordered = end.is_finite()
                        && end + TIME_EPSILON >= start + MIN_ZOOM_GAP_SECS
                        && end <= trim.end() + TIME_EPSILON;
                    if !ordered {
                        return Err(out_of_range());
                    }
                }
                Ok(())
            }
        }
    }
}

/// GIF loop count: `0` loops forever, `-1` plays once, `n > 0` repeats `n`
/// extra times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct LoopCount(i32);

impl LoopCount {
    pub const ALLOWED: [i32; 7] = [-1, 0, 1, 2, 3, 5, 10];
    pub const FOREVER: LoopCount = LoopCount(0);
    pub const ONCE: LoopCount = LoopCount(-1);

    pub fn new(value: i32) -> Result<Self, EditError> {
        if Self::ALLOWED.contains(&value) {
            Ok(Self(value))
        } else {
            Err(EditError::InvalidLoopCount(value))
        }
    }

    pub fn get(&self) -> i32 {
        self.0
    }
}

impl Default for LoopCount {
    fn default() -> Self {
        Self::FOREVER
    }
}

impl TryFrom<i32> for LoopCount {
    type Error = EditError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LoopCount> for i32 {
    fn from(value: LoopCount) -> Self {
        value.0
    }
}

impl fmt::Display for LoopCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "forever"),
            -1 => write!(f, "once"),
            n => write!(f, "{n} more times"),
        }
    }
}

/// Named bundles of export settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    High,
    Medium,
    Low,
    Custom,
}

impl QualityPreset {
    /// `(fps, width, colors, dither)` for a named preset.
    fn values(self) -> Option<(u32, u32, u32, u32)> {
        match self {
            Self::High => Some((15, 800, 256, 5)),
            Self::Medium => Some((12, 600, 128, 4)),
            Self::Low => Some((10, 480, 64, 3)),
            Self::Custom => None,
        }
    }
}

impl FromStr for QualityPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown quality preset: {other}")),
        }
    }
}

/// Output encoding parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ExportSettingsData")]
pub struct ExportSettings {
    fps: u32,
    width: u32,
    colors: u32,
    dither: u32,
    loop_count: LoopCount,
    quality: QualityPreset,
}

#[derive(Deserialize)]
struct ExportSettingsData {
    fps: u32,
    width: u32,
    colors: u32,
    dither: u32,
    #[serde(default)]
    loop_count: LoopCount,
    quality: QualityPreset,
}

impl TryFrom<ExportSettingsData> for ExportSettings {
    type Error = EditError;

    fn try_from(raw: ExportSettingsData) -> Result<Self, Self::Error> {
        let mut settings = Self::new(raw.fps, raw.width, raw.colors, raw.dither, raw.loop_count)?;
        settings.quality = raw.quality;
        Ok(settings)
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            fps: 15,
            width: 600,
            colors: 256,
            dither: 5,
            loop_count: LoopCount::FOREVER,
            quality: QualityPreset::High,
        }
    }
}

impl ExportSettings {
    /// Validated settings, labelled [`QualityPreset::Custom`].
    pub fn new(
        fps: u32,
        width: u32,
        colors: u32,
        dither: u32,
        loop_count: LoopCount,
    ) -> Result<Self, EditError> {
        check_range("fps", fps, &FPS_RANGE)?;
        check_range("width", width, &WIDTH_RANGE)?;
        check_range("colors", colors, &COLORS_RANGE)?;
        check_range("dither", dither, &DITHER_RANGE)?;
        Ok(Self {
            fps,
            width,
            colors,
            dither,
            loop_count,
            quality: QualityPreset::Custom,
        })
    }

    /// Settings for a named preset. `Custom` yields the defaults relabelled.
    pub fn preset(preset: QualityPreset) -> Self {
        match preset.values() {
            Some((fps, width, colors, dither)) => Self {
                fps,
                width,
                colors,
                dither,
                loop_count: LoopCount::FOREVER,
                quality: preset,
            },
            None => Self {
                quality: QualityPreset::Custom,
                ..Self::default()
            },
        }
    }

    /// Apply a preset's values, keeping the loop count.
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        let loop_count = self.loop_count;
        *self = Self::preset(preset);
        self.loop_count = loop_count;
    }

    /// Whether the encoding values match, ignoring the preset label.
    pub fn same_values(&self, other: &ExportSettings) -> bool {
        (self.fps, self.width, self.colors, self.dither, self.loop_count)
            == (other.fps, other.width, other.colors, other.dither, other.loop_count)
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn colors(&self) -> u32 {
        self.colors
    }

    pub fn dither(&self) -> u32 {
        self.dither
    }

    pub fn loop_count(&self) -> LoopCount {
        self.loop_count
    }

    pub fn quality(&self) -> QualityPreset {
        self.quality
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.fps = clamp_range(fps, &FPS_RANGE);
        self.quality = QualityPreset::Custom;
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = clamp_range(width, &WIDTH_RANGE);
        self.quality = QualityPreset::Custom;
    }

    pub fn set_colors(&mut self, colors: u32) {
        self.colors = clamp_range(colors, &COLORS_RANGE);
        self.quality = QualityPreset::Custom;
    }

    pub fn set_dither(&mut self, dither: u32) {
        self.dither = clamp_range(dither, &DITHER_RANGE);
        self.quality = QualityPreset::Custom;
    }

    pub fn set_loop_count(&mut self, loop_count: LoopCount) {
        self.loop_count = loop_count;
        self.quality = QualityPreset::Custom;
    }
}

fn check_range(field: &'static str, value: u32, range: &RangeInclusive<u32>) -> Result<(), EditError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(EditError::OutOfRange {
            field,
            value: value as i64,
            min: *range.start() as i64,
            max: *range.end() as i64,
        })
    }
}

fn clamp_range(value: u32, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `0xrrggbb`, the form ffmpeg color options accept.
    pub fn ffmpeg_hex(&self) -> String {
        format!("0x{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for RgbColor {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EditError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for RgbColor {
    type Error = EditError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RgbColor> for String {
    fn from(value: RgbColor) -> Self {
        value.to_string()
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Rounded, padded backdrop composited behind the video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackgroundSettings {
    pub enabled: bool,
    pub color: RgbColor,
    /// Fraction of the frame size added on each side.
    pub padding: f64,
    /// Corner radius in output pixels.
    pub border_radius: u32,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            color: RgbColor::new(0x29, 0x29, 0x29),
            padding: 0.1,
            border_radius: 16,
        }
    }
}

impl BackgroundSettings {
    pub fn validate(&self) -> Result<(), EditError> {
        if !(0.0..=0.5).contains(&self.padding) {
            return Err(EditError::InvalidPadding(self.padding));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_range_validation() {
        assert!(TrimRange::new(0.0, 10.0, 10.0).is_ok());
        assert!(TrimRange::new(2.0, 8.0, 10.0).is_ok());
        assert!(TrimRange::new(5.0, 5.0, 10.0).is_err());
        assert!(TrimRange::new(-0.1, 5.0, 10.0).is_err());
        assert!(TrimRange::new(0.0, 10.5, 10.0).is_err());
        assert!(TrimRange::new(0.0, f64::NAN, 10.0).is_err());
        assert!((TrimRange::new(2.0, 8.0, 10.0).unwrap().duration() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_trim_deserialization_validates() {
        assert!(serde_json::from_str::<TrimRange>(r#"{"start":1.0,"end":4.0}"#).is_ok());
        assert!(serde_json::from_str::<TrimRange>(r#"{"start":4.0,"end":1.0}"#).is_err());
    }

    #[test]
    fn test_zoom_window_rules() {
        let trim = TrimRange::new(2.0, 8.0, 10.0).unwrap();
        assert!(ZoomWindow::none().validate(&trim, false).is_ok());
        assert_eq!(
            ZoomWindow::starting_at(3.0).validate(&trim, false),
            Err(EditError::ZoomWithoutCrop)
        );
        assert!(ZoomWindow::starting_at(3.0).validate(&trim, true).is_ok());

        let orphan = ZoomWindow {
            start: None,
            end: Some(5.0),
        };
        assert_eq!(orphan.validate(&trim, true), Err(EditError::ZoomOutWithoutZoomIn));

        let too_close = ZoomWindow {
            start: Some(3.0),
            end: Some(3.05),
        };
        assert!(too_close.validate(&trim, true).is_err());

        let exact_gap = ZoomWindow {
            start: Some(3.0),
            end: Some(3.1),
        };
        assert!(exact_gap.validate(&trim, true).is_ok());

        assert!(ZoomWindow::starting_at(1.0).validate(&trim, true).is_err());
    }

    #[test]
    fn test_loop_count_allowed_values() {
        for v in LoopCount::ALLOWED {
            assert_eq!(LoopCount::new(v).unwrap().get(), v);
        }
        assert!(LoopCount::new(4).is_err());
        assert!(serde_json::from_str::<LoopCount>("7").is_err());
        assert_eq!(LoopCount::FOREVER.to_string(), "forever");
        assert_eq!(LoopCount::ONCE.to_string(), "once");
    }

    #[test]
    fn test_presets() {
        let medium = ExportSettings::preset(QualityPreset::Medium);
        assert_eq!(
            (medium.fps(), medium.width(), medium.colors(), medium.dither()),
            (12, 600, 128, 4)
        );
        assert_eq!(medium.quality(), QualityPreset::Medium);

        let low = ExportSettings::preset(QualityPreset::Low);
        assert_eq!((low.fps(), low.width(), low.colors(), low.dither()), (10, 480, 64, 3));

        let defaults = ExportSettings::default();
        assert_eq!((defaults.fps(), defaults.width()), (15, 600));
        assert_eq!(defaults.quality(), QualityPreset::High);
    }

    #[test]
    fn test_setters_clamp_and_relabel() {
        let mut settings = ExportSettings::preset(QualityPreset::High);
        settings.set_width(2000);
        assert_eq!(settings.width(), 1200);
        assert_eq!(settings.quality(), QualityPreset::Custom);

        settings.apply_preset(QualityPreset::Low);
        assert_eq!(settings.quality(), QualityPreset::Low);
        settings.set_fps(1);
        assert_eq!(settings.fps(), 5);
        assert_eq!(settings.quality(), QualityPreset::Custom);
    }

    #[test]
    fn test_export_settings_new_rejects_out_of_range() {
        let err = ExportSettings::new(60, 600, 256, 5, LoopCount::FOREVER).unwrap_err();
        assert!(matches!(err, EditError::OutOfRange { field: "fps", .. }));
        assert!(ExportSettings::new(15, 600, 16, 5, LoopCount::FOREVER).is_err());
        assert!(ExportSettings::new(15, 600, 256, 6, LoopCount::FOREVER).is_err());
    }

    #[test]
    fn test_export_settings_deserialization_validates() {
        let ok = r#"{"fps":12,"width":600,"colors":128,"dither":4,"loop_count":0,"quality":"medium"}"#;
        let settings: ExportSettings = serde_json::from_str(ok).unwrap();
        assert_eq!(settings.quality(), QualityPreset::Medium);

        let bad = r#"{"fps":12,"width":100,"colors":128,"dither":4,"loop_count":0,"quality":"custom"}"#;
        assert!(serde_json::from_str::<ExportSettings>(bad).is_err());
    }

    #[test]
    fn test_rgb_color_parse_and_format() {
        let color: RgbColor = "#292929".parse().unwrap();
        assert_eq!(color, RgbColor::new(0x29, 0x29, 0x29));
        assert_eq!(color.to_string(), "#292929");
        assert_eq!(color.ffmpeg_hex(), "0x292929");
        assert!("292929".parse::<RgbColor>().is_err());
        assert!("#29292".parse::<RgbColor>().is_err());
        assert!("#zz2929".parse::<RgbColor>().is_err());
    }

    #[test]
    fn test_background_defaults() {
        let bg = BackgroundSettings::default();
        assert!(!bg.enabled);
        assert_eq!(bg.color.to_string(), "#292929");
        assert_eq!(bg.border_radius, 16);
        assert!(bg.validate().is_ok());

        let wide = BackgroundSettings {
            padding: 0.75,
            ..bg
        };
        assert_eq!(wide.validate(), Err(EditError::InvalidPadding(0.75)));
    }
}
