//! Timeline gestures: scrubbing, trim handles, and zoom markers.
//!
//! A pointer press latches one drag target and that target owns every move
//! until release, wherever the pointer wanders. Markers always satisfy
//! `trim_start <= zoom_in`, `zoom_in + min_zoom_gap <= zoom_out <= trim_end`
//! and `trim_end - trim_start >= min_trim_gap` (when the clip is long enough).

use togif_common::config::InteractionConfig;
use togif_edit_model::{EditError, TrimRange, ZoomWindow};

use crate::gesture::{PointerEvent, PointerPhase};

/// Tuning for timeline hit testing and marker spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineConfig {
    pub marker_hit_radius: f64,
    pub min_trim_gap: f64,
    pub min_zoom_gap: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            marker_hit_radius: 8.0,
            min_trim_gap: 0.5,
            min_zoom_gap: 0.1,
        }
    }
}

impl From<&InteractionConfig> for TimelineConfig {
    fn from(config: &InteractionConfig) -> Self {
        Self {
            marker_hit_radius: config.marker_hit_radius_px,
            min_trim_gap: config.min_trim_gap_secs,
            min_zoom_gap: config.min_zoom_gap_secs.clamp(0.1, 0.5),
        }
    }
}

/// Horizontal placement of the track in pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackGeometry {
    pub left: f64,
    pub width: f64,
}

impl TrackGeometry {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }
}

/// What the current timeline drag is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragTarget {
    None,
    Scrubber,
    TrimStart,
    TrimEnd,
    ZoomIn,
    ZoomOut,
}

/// Result of handling one timeline event.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimelineUpdate {
    /// Time the preview should seek to.
    pub seek: Option<f64>,
    pub trim_changed: bool,
    pub zoom_changed: bool,
}

impl TimelineUpdate {
    fn seek(t: f64) -> Self {
        Self {
            seek: Some(t),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.seek.is_none() && !self.trim_changed && !self.zoom_changed
    }
}

/// Owns playhead, trim handles, and zoom markers for one clip.
#[derive(Debug, Clone)]
pub struct TimelineController {
    config: TimelineConfig,
    duration: f64,
    trim_start: f64,
    trim_end: f64,
    zoom_in: Option<f64>,
    zoom_out: Option<f64>,
    playhead: f64,
    track: TrackGeometry,
    drag: DragTarget,
}

impl TimelineController {
    /// A timeline spanning the whole clip.
    pub fn new(config: TimelineConfig, duration: f64, track: TrackGeometry) -> Self {
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        Self {
            config,
            duration,
            trim_start: 0.0,
            trim_end: duration,
            zoom_in: None,
            zoom_out: None,
            playhead: 0.0,
            track,
            drag: DragTarget::None,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    pub fn trim_start(&self) -> f64 {
        self.trim_start
    }

    pub fn trim_end(&self) -> f64 {
        self.trim_end
    }

    pub fn zoom_in(&self) -> Option<f64> {
        self.zoom_in
    }

    pub fn zoom_out(&self) -> Option<f64> {
        self.zoom_out
    }

    pub fn drag(&self) -> DragTarget {
        self.drag
    }

    pub fn track(&self) -> TrackGeometry {
        self.track
    }

    pub fn set_track(&mut self, track: TrackGeometry) {
        self.track = track;
    }

    pub fn trim_range(&self) -> Result<TrimRange, EditError> {
        TrimRange::new(self.trim_start, self.trim_end, self.duration)
    }

    pub fn zoom_window(&self) -> ZoomWindow {
        ZoomWindow {
            start: self.zoom_in,
            end: self.zoom_out,
        }
    }

    /// Time under pointer position `x`.
    pub fn time_at(&self, x: f64) -> f64 {
        if self.track.width <= 0.0 {
            return 0.0;
        }
        let fraction = ((x - self.track.left) / self.track.width).clamp(0.0, 1.0);
        fraction * self.duration
    }

    /// Pointer position of time `t`.
    pub fn x_for_time(&self, t: f64) -> f64 {
        if self.duration <= 0.0 {
            return self.track.left;
        }
        self.track.left + (t / self.duration).clamp(0.0, 1.0) * self.track.width
    }

    /// Which target a press at `x` would latch.
    pub fn hit_test(&self, x: f64) -> DragTarget {
        let near = |t: f64| (x - self.x_for_time(t)).abs() <= self.config.marker_hit_radius;
        let candidates = [
            (DragTarget::ZoomOut, self.zoom_out),
            (DragTarget::ZoomIn, self.zoom_in),
            (DragTarget::TrimEnd, Some(self.trim_end)),
            (DragTarget::TrimStart, Some(self.trim_start)),
        ];
        candidates
            .into_iter()
            .find_map(|(target, t)| t.filter(|&t| near(t)).map(|_| target))
            .unwrap_or(DragTarget::Scrubber)
    }

    pub fn handle(&mut self, event: &PointerEvent) -> TimelineUpdate {
        match event.phase {
            PointerPhase::Down => self.pointer_down(event.x),
            PointerPhase::Move => self.pointer_move(event.x),
            PointerPhase::Up | PointerPhase::Leave => {
                self.release();
                TimelineUpdate::default()
            }
        }
    }

    pub fn pointer_down(&mut self, x: f64) -> TimelineUpdate {
        self.drag = self.hit_test(x);
        tracing::debug!(target_kind = ?self.drag, "Timeline drag latched");
        if self.drag == DragTarget::Scrubber {
            self.seek(self.time_at(x))
        } else {
            TimelineUpdate::default()
        }
    }

    pub fn pointer_move(&mut self, x: f64) -> TimelineUpdate {
        let t = self.time_at(x);
        let gap = self.config.min_zoom_gap;

        match self.drag {
            DragTarget::None => TimelineUpdate::default(),
            DragTarget::Scrubber => self.seek(t),
            DragTarget::TrimStart => {
                let start = t.min(self.trim_end - self.config.min_trim_gap).max(0.0);
                self.set_trim_start(start)
            }
            DragTarget::TrimEnd => {
                let end = t.max(self.trim_start + self.config.min_trim_gap).min(self.duration);
                self.set_trim_end(end)
            }
            // Markers cleared mid-drag stay cleared.
            DragTarget::ZoomIn if self.zoom_in.is_none() => TimelineUpdate::default(),
            DragTarget::ZoomOut if self.zoom_in.is_none() || self.zoom_out.is_none() => {
                TimelineUpdate::default()
            }
            DragTarget::ZoomIn => {
                let upper = self.zoom_out.map_or(self.trim_end, |out| out - gap);
                let at = clamp_between(t, self.trim_start, upper);
                let changed = self.zoom_in != Some(at);
                self.zoom_in = Some(at);
                TimelineUpdate {
                    zoom_changed: changed,
                    ..self.seek(at)
                }
            }
            DragTarget::ZoomOut => {
                let lower = self.zoom_in.map_or(self.trim_start, |zin| zin + gap);
                let at = clamp_between(t, lower, self.trim_end);
                let changed = self.zoom_out != Some(at);
                self.zoom_out = Some(at);
                TimelineUpdate {
                    zoom_changed: changed,
                    ..self.seek(at)
                }
            }
        }
    }

    /// Drop the latch. Marker positions are kept.
    pub fn release(&mut self) {
        if self.drag != DragTarget::None {
            tracing::debug!(target_kind = ?self.drag, "Timeline drag released");
        }
        self.drag = DragTarget::None;
    }

    /// Move the playhead to `t`, clamped to the clip.
    pub fn seek(&mut self, t: f64) -> TimelineUpdate {
        self.playhead = clamp_between(t, 0.0, self.duration);
        TimelineUpdate::seek(self.playhead)
    }

    /// Put the zoom-in marker at `t`, clamped into the trim range.
    ///
    /// A zoom-out that would end up closer than the minimum gap is dropped.
    pub fn set_zoom_in(&mut self, t: f64) -> TimelineUpdate {
        let at = clamp_between(t, self.trim_start, self.trim_end);
        self.zoom_in = Some(at);
        if let Some(out) = self.zoom_out {
            if out < at + self.config.min_zoom_gap {
                tracing::debug!(zoom_in = at, zoom_out = out, "Dropping zoom-out behind new zoom-in");
                self.zoom_out = None;
            }
        }
        TimelineUpdate {
            zoom_changed: true,
            ..TimelineUpdate::default()
        }
    }

    /// Put the zoom-out marker at `t`. Needs a zoom-in with room after it.
    pub fn place_zoom_out(&mut self, t: f64) -> TimelineUpdate {
        let Some(zin) = self.zoom_in else {
            return TimelineUpdate::default();
        };
        let lower = zin + self.config.min_zoom_gap;
        if lower > self.trim_end {
            return TimelineUpdate::default();
        }
        self.zoom_out = Some(clamp_between(t, lower, self.trim_end));
        TimelineUpdate {
            zoom_changed: true,
            ..TimelineUpdate::default()
        }
    }

    pub fn clear_zoom(&mut self) -> TimelineUpdate {
        let changed = self.zoom_in.is_some() || self.zoom_out.is_some();
        self.zoom_in = None;
        self.zoom_out = None;
        TimelineUpdate {
            zoom_changed: changed,
            ..TimelineUpdate::default()
        }
    }

    /// Load trim and zoom markers from a saved edit.
    pub fn restore(&mut self, trim: TrimRange, zoom: ZoomWindow) {
        self.trim_start = clamp_between(trim.start(), 0.0, self.duration);
        self.trim_end = clamp_between(trim.end(), self.trim_start, self.duration);
        self.zoom_in = zoom.start;
        self.zoom_out = zoom.start.and(zoom.end);
        self.reclamp_zoom();
        self.drag = DragTarget::None;
    }

    fn set_trim_start(&mut self, start: f64) -> TimelineUpdate {
        let trim_changed = start != self.trim_start;
        self.trim_start = start;
        let zoom_changed = self.reclamp_zoom();
        TimelineUpdate {
            trim_changed,
            zoom_changed,
            ..self.seek(start)
        }
    }

    fn set_trim_end(&mut self, end: f64) -> TimelineUpdate {
        let trim_changed = end != self.trim_end;
        self.trim_end = end;
        let zoom_changed = self.reclamp_zoom();
        TimelineUpdate {
            trim_changed,
            zoom_changed,
            ..self.seek(end)
        }
    }

    /// Pull zoom markers back inside the trim range. Returns whether any moved.
    fn reclamp_zoom(&mut self) -> bool {
        let before = (self.zoom_in, self.zoom_out);
        let gap = self.config.min_zoom_gap;
        let (start, end) = (self.trim_start, self.trim_end);

        match (self.zoom_in, self.zoom_out) {
            (Some(zin), Some(out)) if end - start >= gap => {
                let out = clamp_between(out, start + gap, end);
                self.zoom_out = Some(out);
                self.zoom_in = Some(clamp_between(zin, start, out - gap));
            }
            (Some(zin), _) => {
                self.zoom_out = None;
                self.zoom_in = Some(clamp_between(zin, start, end));
            }
            (None, _) => self.zoom_out = None,
        }

        before != (self.zoom_in, self.zoom_out)
    }
}

/// `value` clamped into `[lo, hi]`; `lo` wins if the bounds cross.
fn clamp_between(value: f64, lo: f64, hi: f64) -> f64 {
    value.min(hi).max(lo)
}
