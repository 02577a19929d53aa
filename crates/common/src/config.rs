//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{TogifError, TogifResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default export parameters for new edits.
    pub export: ExportDefaults,

    /// Gesture tuning for the crop canvas and the timeline.
    pub interaction: InteractionConfig,

    /// Default background compositing parameters.
    pub background: BackgroundDefaults,

    /// External frame engine binaries.
    pub engine: EngineConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default export parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    /// Output frame rate.
    pub fps: u32,

    /// Output width in pixels.
    pub width: u32,

    /// Palette size.
    pub colors: u32,

    /// Bayer dither scale.
    pub dither: u32,

    /// GIF loop count (`0` = forever, `-1` = play once).
    pub loop_count: i32,
}

/// Gesture tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Hit radius around crop corner handles (display px).
    pub handle_hit_radius_px: f64,

    /// Smallest crop width a resize may shrink to (display px).
    pub min_crop_width_px: f64,

    /// Hit radius around timeline handles and markers (pointer px).
    pub marker_hit_radius_px: f64,

    /// Minimum trim duration in seconds.
    pub min_trim_gap_secs: f64,

    /// Minimum distance between zoom-in and zoom-out markers in seconds.
    pub min_zoom_gap_secs: f64,
}

/// Default background compositing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundDefaults {
    pub enabled: bool,

    /// Hex color such as `#292929`.
    pub color: String,

    /// Padding as a fraction of the frame size per side.
    pub padding: f64,

    /// Corner radius in output pixels.
    pub border_radius: u32,
}

/// Locations of the external ffmpeg tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "togif=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            export: ExportDefaults::default(),
            interaction: InteractionConfig::default(),
            background: BackgroundDefaults::default(),
            engine: EngineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            fps: 15,
            width: 600,
            colors: 256,
            dither: 5,
            loop_count: 0,
        }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            handle_hit_radius_px: 30.0,
            min_crop_width_px: 8.0,
            marker_hit_radius_px: 8.0,
            min_trim_gap_secs: 0.5,
            min_zoom_gap_secs: 0.1,
        }
    }
}

impl Default for BackgroundDefaults {
    fn default() -> Self {
        Self {
            enabled: false,
            color: "#292929".to_string(),
            padding: 0.1,
            border_radius: 16,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                Self::default()
            }
        }
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> TogifResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> TogifResult<()> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: &Path) -> TogifResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject tuning values the controllers cannot honor.
    pub fn validate(&self) -> TogifResult<()> {
        let i = &self.interaction;
        if !(0.1..=0.5).contains(&i.min_zoom_gap_secs) {
            return Err(TogifError::config(format!(
                "min_zoom_gap_secs must be within [0.1, 0.5], got {}",
                i.min_zoom_gap_secs
            )));
        }
        if i.min_zoom_gap_secs > i.min_trim_gap_secs {
            return Err(TogifError::config(
                "min_zoom_gap_secs must not exceed min_trim_gap_secs",
            ));
        }
        if i.handle_hit_radius_px <= 0.0 || i.marker_hit_radius_px <= 0.0 {
            return Err(TogifError::config("hit radii must be positive"));
        }
        if !(0.0..=0.5).contains(&self.background.padding) {
            return Err(TogifError::config(format!(
                "background padding must be within [0.0, 0.5], got {}",
                self.background.padding
            )));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("togif").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn test_zoom_gap_above_trim_gap_rejected() {
        let mut config = AppConfig::default();
        config.interaction.min_trim_gap_secs = 0.3;
        config.interaction.min_zoom_gap_secs = 0.4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"export":{"fps":24}}"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.export.fps, 24);
        assert_eq!(config.export.width, 600);
        assert_eq!(config.background.color, "#292929");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.engine.ffmpeg = "/opt/ffmpeg/bin/ffmpeg".to_string();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.engine.ffmpeg, "/opt/ffmpeg/bin/ffmpeg");
    }
}
