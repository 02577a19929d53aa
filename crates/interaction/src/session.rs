//! An editing session over one clip.
//!
//! The session owns both controllers plus the export and background settings
//! and keeps them consistent: a crop commit places the zoom-in marker, and
//! clearing the crop removes both zoom markers. [`EditorSession::snapshot`]
//! freezes the current state into an [`EditSpecification`] for export.

use togif_common::config::AppConfig;
use togif_common::timecode::format_time;
use togif_edit_model::{
    BackgroundSettings, DisplaySize, EditError, EditSpecification, ExportSettings, LoopCount,
    RgbColor, SourceVideo,
};

use crate::crop::{CropCommit, CropConfig, CropInteractionController};
use crate::gesture::{PointerEvent, ScriptStep};
use crate::timeline::{TimelineConfig, TimelineController, TimelineUpdate, TrackGeometry};

/// Errors raised when a session cannot be set up or frozen.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid edit: {0}")]
    Edit(#[from] EditError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Outcome of applying one script step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepOutcome {
    pub commit: Option<CropCommit>,
    pub timeline: TimelineUpdate,
}

/// Live editing state for one source clip.
#[derive(Debug, Clone)]
pub struct EditorSession {
    source: SourceVideo,
    crop: CropInteractionController,
    timeline: TimelineController,
    export: ExportSettings,
    background: BackgroundSettings,
}

impl EditorSession {
    /// Start a fresh session with defaults from `config`.
    pub fn new(
        source: SourceVideo,
        config: &AppConfig,
        container: DisplaySize,
        track: TrackGeometry,
    ) -> Result<Self, SessionError> {
        source.validate()?;

        let export = export_from_config(config)?;
        let background = background_from_config(config)?;

        let canvas = togif_edit_model::coords::fit_to_container(container, source.dimensions());
        let crop = CropInteractionController::new(
            CropConfig::from(&config.interaction),
            source.dimensions(),
            canvas,
        );
        let timeline = TimelineController::new(
            TimelineConfig::from(&config.interaction),
            source.duration_secs,
            track,
        );

        tracing::debug!(
            source = %source.name,
            duration = %format_time(source.duration_secs),
            canvas_width = canvas.width,
            canvas_height = canvas.height,
            "Editor session started"
        );

        Ok(Self {
            source,
            crop,
            timeline,
            export,
            background,
        })
    }

    /// Resume editing a saved edit.
    pub fn from_specification(
        edit: &EditSpecification,
        config: &AppConfig,
        container: DisplaySize,
        track: TrackGeometry,
    ) -> Result<Self, SessionError> {
        let mut session = Self::new(edit.source().clone(), config, container, track)?;
        session.export = *edit.export();
        session.background = *edit.background();
        session.timeline.restore(edit.trim(), edit.zoom());
        if let Some(rect) = edit.crop() {
            session.crop.restore(rect, edit.zoom().start);
        }
        Ok(session)
    }

    pub fn source(&self) -> &SourceVideo {
        &self.source
    }

    pub fn crop(&self) -> &CropInteractionController {
        &self.crop
    }

    pub fn timeline(&self) -> &TimelineController {
        &self.timeline
    }

    pub fn export_settings(&self) -> &ExportSettings {
        &self.export
    }

    pub fn export_settings_mut(&mut self) -> &mut ExportSettings {
        &mut self.export
    }

    pub fn background(&self) -> &BackgroundSettings {
        &self.background
    }

    pub fn background_mut(&mut self) -> &mut BackgroundSettings {
        &mut self.background
    }

    /// Route a pointer event on the crop canvas.
    pub fn canvas_event(&mut self, event: &PointerEvent) -> Option<CropCommit> {
        let commit = self.crop.handle(event, self.timeline.playhead())?;
        self.timeline.set_zoom_in(commit.zoom_in_time);
        Some(commit)
    }

    /// Route a pointer event on the timeline track.
    pub fn timeline_event(&mut self, event: &PointerEvent) -> TimelineUpdate {
        self.timeline.handle(event)
    }

    /// Resize the crop canvas to fit a new container.
    pub fn resize_canvas(&mut self, container: DisplaySize) {
        let canvas = togif_edit_model::coords::fit_to_container(container, self.source.dimensions());
        self.crop.set_canvas_size(canvas);
    }

    pub fn seek(&mut self, t: f64) -> TimelineUpdate {
        self.timeline.seek(t)
    }

    /// Restamp zoom-in at the playhead. No-op without a crop.
    pub fn mark_zoom_in(&mut self) -> TimelineUpdate {
        let playhead = self.timeline.playhead();
        if self.crop.mark_zoom_in(playhead) {
            self.timeline.set_zoom_in(playhead)
        } else {
            TimelineUpdate::default()
        }
    }

    /// Place the zoom-out marker at the playhead.
    pub fn place_zoom_out(&mut self) -> TimelineUpdate {
        let playhead = self.timeline.playhead();
        self.timeline.place_zoom_out(playhead)
    }

    /// Remove the crop and both zoom markers.
    pub fn clear_crop(&mut self) -> TimelineUpdate {
        self.crop.clear();
        self.timeline.clear_zoom()
    }

    /// Apply one recorded step.
    pub fn apply(&mut self, step: &ScriptStep) -> StepOutcome {
        match *step {
            ScriptStep::Canvas { phase, x, y } => StepOutcome {
                commit: self.canvas_event(&PointerEvent::new(phase, x, y)),
                ..StepOutcome::default()
            },
            ScriptStep::Timeline { phase, x } => StepOutcome {
                timeline: self.timeline_event(&PointerEvent::new(phase, x, 0.0)),
                ..StepOutcome::default()
            },
            ScriptStep::Seek { t } => StepOutcome {
                timeline: self.seek(t),
                ..StepOutcome::default()
            },
            ScriptStep::MarkZoomIn => StepOutcome {
                timeline: self.mark_zoom_in(),
                ..StepOutcome::default()
            },
            ScriptStep::PlaceZoomOut => StepOutcome {
                timeline: self.place_zoom_out(),
                ..StepOutcome::default()
            },
            ScriptStep::ClearCrop => StepOutcome {
                timeline: self.clear_crop(),
                ..StepOutcome::default()
            },
            ScriptStep::Preset { quality } => {
                self.export.apply_preset(quality);
                StepOutcome::default()
            }
        }
    }

    /// Freeze the current state into a validated edit.
    pub fn snapshot(&self) -> Result<EditSpecification, EditError> {
        let crop = self.crop.source_rect();
        let zoom = if crop.is_some() {
            self.timeline.zoom_window()
        } else {
            Default::default()
        };
        EditSpecification::new(
            self.source.clone(),
            self.timeline.trim_range()?,
            crop,
            zoom,
            self.export,
            self.background,
        )
    }
}

/// Export settings from configured defaults.
///
/// Values matching the built-in defaults keep their preset label.
pub fn export_from_config(config: &AppConfig) -> Result<ExportSettings, SessionError> {
    let d = &config.export;
    let settings = ExportSettings::new(
        d.fps,
        d.width,
        d.colors,
        d.dither,
        LoopCount::new(d.loop_count)?,
    )?;
    let defaults = ExportSettings::default();
    if settings.same_values(&defaults) {
        Ok(defaults)
    } else {
        Ok(settings)
    }
}

/// Background settings from configured defaults.
pub fn background_from_config(config: &AppConfig) -> Result<BackgroundSettings, SessionError> {
    let b = &config.background;
    let color: RgbColor = b
        .color
        .parse()
        .map_err(|e: EditError| SessionError::Config(e.to_string()))?;
    let background = BackgroundSettings {
        enabled: b.enabled,
        color,
        padding: b.padding,
        border_radius: b.border_radius,
    };
    background.validate()?;
    Ok(background)
}
