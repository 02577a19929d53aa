//! Crop canvas gestures: draw, resize, and move an aspect-locked crop box.
//!
//! The controller keeps the crop in display space while the user drags and
//! converts it to source pixels only when a gesture ends. Every rectangle it
//! holds keeps the source video's aspect ratio and stays on the canvas.

use togif_common::config::InteractionConfig;
use togif_edit_model::coords;
use togif_edit_model::{DisplayPoint, DisplayRect, DisplaySize, SourceRect, VideoDimensions};

use crate::gesture::{PointerEvent, PointerPhase};

/// Tuning for crop hit testing and resizing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropConfig {
    /// Chebyshev radius around each corner that grabs the handle.
    pub handle_hit_radius: f64,
    /// Smallest width a resize may shrink the box to.
    pub min_width: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            handle_hit_radius: 30.0,
            min_width: 8.0,
        }
    }
}

impl From<&InteractionConfig> for CropConfig {
    fn from(config: &InteractionConfig) -> Self {
        Self {
            handle_hit_radius: config.handle_hit_radius_px,
            min_width: config.min_crop_width_px,
        }
    }
}

/// A corner handle of the crop box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Handle {
    /// Hit-test order.
    pub const ALL: [Handle; 4] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomLeft,
        Handle::BottomRight,
    ];

    pub fn corner_of(self, rect: &DisplayRect) -> DisplayPoint {
        match self {
            Self::TopLeft => rect.top_left(),
            Self::TopRight => rect.top_right(),
            Self::BottomLeft => rect.bottom_left(),
            Self::BottomRight => rect.bottom_right(),
        }
    }

    pub fn opposite(self) -> Handle {
        match self {
            Self::TopLeft => Self::BottomRight,
            Self::TopRight => Self::BottomLeft,
            Self::BottomLeft => Self::TopRight,
            Self::BottomRight => Self::TopLeft,
        }
    }

    /// Direction this corner lies in, seen from the opposite corner.
    fn direction(self) -> (f64, f64) {
        match self {
            Self::TopLeft => (-1.0, -1.0),
            Self::TopRight => (1.0, -1.0),
            Self::BottomLeft => (-1.0, 1.0),
            Self::BottomRight => (1.0, 1.0),
        }
    }
}

/// What a pointer position would grab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropHit {
    Handle(Handle),
    Body,
}

/// Cursor to show while hovering the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Move,
    /// Diagonal resize for the top-left and bottom-right corners.
    ResizeNwse,
    /// Diagonal resize for the top-right and bottom-left corners.
    ResizeNesw,
    Crosshair,
}

/// Gesture state of the crop canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropMode {
    Idle,
    /// Drawing a fresh box from `anchor`. `previous` is restored if the
    /// drawn box turns out degenerate.
    Drawing {
        anchor: DisplayPoint,
        previous: Option<DisplayRect>,
    },
    /// Dragging `handle`; `anchor` is the opposite corner, fixed for the
    /// whole gesture.
    Resizing {
        handle: Handle,
        anchor: DisplayPoint,
    },
    Moving {
        last: DisplayPoint,
    },
}

/// Emitted when a gesture leaves a usable crop behind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropCommit {
    pub rect: SourceRect,
    /// Playhead time at release; becomes the zoom-in marker.
    pub zoom_in_time: f64,
}

/// Turns canvas pointer events into an aspect-locked crop rectangle.
#[derive(Debug, Clone)]
pub struct CropInteractionController {
    config: CropConfig,
    canvas: DisplaySize,
    source: VideoDimensions,
    crop: Option<DisplayRect>,
    zoom_in_time: Option<f64>,
    mode: CropMode,
}

impl CropInteractionController {
    pub fn new(config: CropConfig, source: VideoDimensions, canvas: DisplaySize) -> Self {
        Self {
            config,
            canvas,
            source,
            crop: None,
            zoom_in_time: None,
            mode: CropMode::Idle,
        }
    }

    pub fn crop(&self) -> Option<DisplayRect> {
        self.crop
    }

    pub fn zoom_in_time(&self) -> Option<f64> {
        self.zoom_in_time
    }

    pub fn mode(&self) -> CropMode {
        self.mode
    }

    pub fn canvas_size(&self) -> DisplaySize {
        self.canvas
    }

    fn aspect(&self) -> f64 {
        self.source.aspect_ratio()
    }

    /// The current crop in source pixels, if it is usable.
    pub fn source_rect(&self) -> Option<SourceRect> {
        let rect = coords::rect_to_source(self.crop?, self.canvas, self.source);
        (!rect.is_degenerate()).then_some(rect)
    }

    /// Show an existing source-space crop on the canvas.
    pub fn restore(&mut self, rect: SourceRect, zoom_in_time: Option<f64>) {
        self.crop = Some(coords::to_display(rect, self.canvas, self.source));
        self.zoom_in_time = zoom_in_time;
        self.mode = CropMode::Idle;
    }

    /// What `point` would grab: corner handles first, then the body.
    pub fn hit_test(&self, point: DisplayPoint) -> Option<CropHit> {
        let rect = self.crop?;
        let r = self.config.handle_hit_radius;
        let near = |corner: DisplayPoint| (point.x - corner.x).abs() < r && (point.y - corner.y).abs() < r;

        if let Some(handle) = Handle::ALL.into_iter().find(|h| near(h.corner_of(&rect))) {
            return Some(CropHit::Handle(handle));
        }
        rect.contains(&point).then_some(CropHit::Body)
    }

    pub fn cursor_at(&self, point: DisplayPoint) -> CursorHint {
        match self.hit_test(point) {
            Some(CropHit::Handle(Handle::TopLeft | Handle::BottomRight)) => CursorHint::ResizeNwse,
            Some(CropHit::Handle(Handle::TopRight | Handle::BottomLeft)) => CursorHint::ResizeNesw,
            Some(CropHit::Body) => CursorHint::Move,
            None => CursorHint::Crosshair,
        }
    }

    /// Route one pointer event. `playhead` stamps the zoom-in of a commit.
    pub fn handle(&mut self, event: &PointerEvent, playhead: f64) -> Option<CropCommit> {
        let point = DisplayPoint::new(event.x, event.y);
        match event.phase {
            PointerPhase::Down => {
                self.pointer_down(point);
                None
            }
            PointerPhase::Move => {
                self.pointer_move(point);
                None
            }
            PointerPhase::Up | PointerPhase::Leave => self.pointer_up(playhead),
        }
    }

    pub fn pointer_down(&mut self, point: DisplayPoint) {
        self.mode = match (self.hit_test(point), self.crop) {
            (Some(CropHit::Handle(handle)), Some(rect)) => CropMode::Resizing {
                handle,
                anchor: handle.opposite().corner_of(&rect),
            },
            (Some(CropHit::Body), _) => CropMode::Moving { last: point },
            _ => {
                let anchor = DisplayPoint::new(
                    point.x.clamp(0.0, self.canvas.width.max(0.0)),
                    point.y.clamp(0.0, self.canvas.height.max(0.0)),
                );
                let previous = self.crop;
                self.crop = Some(DisplayRect::at(anchor));
                CropMode::Drawing { anchor, previous }
            }
        };
        tracing::debug!(mode = ?self.mode, "Crop gesture started");
    }

    pub fn pointer_move(&mut self, point: DisplayPoint) {
        match self.mode {
            CropMode::Idle => {}
            CropMode::Drawing { anchor, .. } => {
                let (dx, dy) = point.delta_from(&anchor);
                let direction = (sign(dx), sign(dy));
                self.crop = Some(self.anchored_rect(anchor, direction, dx.abs()));
            }
            CropMode::Resizing { handle, anchor } => {
                // Width follows the pointer, so the handle stays under it
                // even after the box was capped at a canvas edge.
                let direction = handle.direction();
                let (dx, _) = point.delta_from(&anchor);
                let width = (dx * direction.0).max(self.config.min_width);
                self.crop = Some(self.anchored_rect(anchor, direction, width));
            }
            CropMode::Moving { last } => {
                if let Some(rect) = self.crop {
                    let (dx, dy) = point.delta_from(&last);
                    let max_x = (self.canvas.width - rect.width).max(0.0);
                    let max_y = (self.canvas.height - rect.height).max(0.0);
                    self.crop = Some(DisplayRect::new(
                        (rect.x + dx).clamp(0.0, max_x),
                        (rect.y + dy).clamp(0.0, max_y),
                        rect.width,
                        rect.height,
                    ));
                }
                self.mode = CropMode::Moving { last: point };
            }
        }
        tracing::trace!(crop = ?self.crop, "Crop updated");
    }

    /// End the current gesture.
    ///
    /// Emits a commit when a gesture was in progress and left a usable box.
    /// A degenerate freshly drawn box is discarded in favor of the box that
    /// existed before the gesture.
    pub fn pointer_up(&mut self, playhead: f64) -> Option<CropCommit> {
        let mode = std::mem::replace(&mut self.mode, CropMode::Idle);
        if mode == CropMode::Idle {
            return None;
        }

        let Some(rect) = self.source_rect() else {
            if let CropMode::Drawing { previous, .. } = mode {
                tracing::debug!("Discarding degenerate crop, restoring previous");
                self.crop = previous;
            }
            return None;
        };

        self.zoom_in_time = Some(playhead);
        tracing::debug!(
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            zoom_in = playhead,
            "Crop committed"
        );
        Some(CropCommit {
            rect,
            zoom_in_time: playhead,
        })
    }

    /// Remove the crop and its zoom-in.
    pub fn clear(&mut self) {
        self.crop = None;
        self.zoom_in_time = None;
        self.mode = CropMode::Idle;
        tracing::debug!("Crop cleared");
    }

    /// Restamp the zoom-in at `playhead`. Returns `false` without a crop.
    pub fn mark_zoom_in(&mut self, playhead: f64) -> bool {
        if self.crop.is_none() {
            return false;
        }
        self.zoom_in_time = Some(playhead);
        true
    }

    /// Resize the canvas, keeping the crop over the same source region.
    pub fn set_canvas_size(&mut self, size: DisplaySize) {
        if let Some(rect) = self.crop {
            if !self.canvas.is_empty() && !size.is_empty() {
                let sx = size.width / self.canvas.width;
                let sy = size.height / self.canvas.height;
                self.crop = Some(rect.scaled(sx, sy));
            }
        }
        self.canvas = size;
    }

    /// Box growing from `anchor` in `direction`, `width` wide, with the
    /// source aspect ratio, shrunk as needed to stay on the canvas.
    fn anchored_rect(&self, anchor: DisplayPoint, direction: (f64, f64), width: f64) -> DisplayRect {
        let aspect = self.aspect();
        let room_x = if direction.0 < 0.0 {
            anchor.x
        } else {
            self.canvas.width - anchor.x
        };
        let room_y = if direction.1 < 0.0 {
            anchor.y
        } else {
            self.canvas.height - anchor.y
        };

        let width = width.min(room_x).min(room_y * aspect).max(0.0);
        let height = width / aspect;

        let x = if direction.0 < 0.0 { anchor.x - width } else { anchor.x };
        let y = if direction.1 < 0.0 { anchor.y - height } else { anchor.y };
        DisplayRect::new(x.max(0.0), y.max(0.0), width, height)
    }
}

fn sign(delta: f64) -> f64 {
    if delta < 0.0 {
        -1.0
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 640x360 canvas over a 1920x1080 source: 3 source px per display px.
    fn controller() -> CropInteractionController {
        CropInteractionController::new(
            CropConfig::default(),
            VideoDimensions::new(1920, 1080),
            DisplaySize::new(640.0, 360.0),
        )
    }

    fn drag(ctl: &mut CropInteractionController, from: (f64, f64), to: (f64, f64), t: f64) -> Option<CropCommit> {
        ctl.handle(&PointerEvent::down(from.0, from.1), t);
        ctl.handle(&PointerEvent::moved(to.0, to.1), t);
        ctl.handle(&PointerEvent::up(to.0, to.1), t)
    }

    fn assert_aspect(rect: DisplayRect) {
        assert!((rect.width / rect.height - 16.0 / 9.0).abs() < 1e-6, "{rect:?}");
    }

    #[test]
    fn test_draw_is_aspect_locked() {
        let mut ctl = controller();
        let commit = drag(&mut ctl, (100.0, 50.0), (420.0, 300.0), 3.0).unwrap();

        let rect = ctl.crop().unwrap();
        assert_eq!(rect.x, 100.0);
        assert_eq!(rect.y, 50.0);
        assert_eq!(rect.width, 320.0);
        assert_aspect(rect);

        assert_eq!(commit.rect, SourceRect::new(300, 150, 960, 540));
        assert_eq!(commit.zoom_in_time, 3.0);
        assert_eq!(ctl.zoom_in_time(), Some(3.0));
        assert_eq!(ctl.mode(), CropMode::Idle);
    }

    #[test]
    fn test_draw_up_and_left_flips_origin() {
        let mut ctl = controller();
        drag(&mut ctl, (420.0, 230.0), (100.0, 0.0), 0.0).unwrap();
        let rect = ctl.crop().unwrap();
        assert_eq!(rect.x, 100.0);
        assert_eq!(rect.width, 320.0);
        assert!((rect.y - 50.0).abs() < 1e-9);
        assert_aspect(rect);
    }

    #[test]
    fn test_draw_clamped_to_canvas_keeps_aspect() {
        let mut ctl = controller();
        drag(&mut ctl, (500.0, 300.0), (900.0, 900.0), 0.0).unwrap();
        let rect = ctl.crop().unwrap();
        assert!(rect.fits_within(&ctl.canvas_size()));
        // Only 60px of room below the anchor.
        assert!((rect.height - 60.0).abs() < 1e-9);
        assert_aspect(rect);
    }

    #[test]
    fn test_degenerate_draw_restores_previous() {
        let mut ctl = controller();
        drag(&mut ctl, (100.0, 50.0), (420.0, 230.0), 2.0).unwrap();
        let before = ctl.crop();

        // A click outside the box draws a zero-size rectangle.
        let commit = drag(&mut ctl, (600.0, 340.0), (600.0, 340.0), 5.0);
        assert!(commit.is_none());
        assert_eq!(ctl.crop(), before);
        assert_eq!(ctl.zoom_in_time(), Some(2.0));
    }

    #[test]
    fn test_degenerate_first_draw_leaves_no_crop() {
        let mut ctl = controller();
        assert!(drag(&mut ctl, (10.0, 10.0), (10.3, 10.0), 0.0).is_none());
        assert!(ctl.crop().is_none());
    }

    #[test]
    fn test_hit_test_prefers_handles() {
        let mut ctl = controller();
        drag(&mut ctl, (100.0, 50.0), (420.0, 230.0), 0.0);

        let hit = |x, y| ctl.hit_test(DisplayPoint::new(x, y));
        assert_eq!(hit(105.0, 55.0), Some(CropHit::Handle(Handle::TopLeft)));
        assert_eq!(hit(415.0, 52.0), Some(CropHit::Handle(Handle::TopRight)));
        assert_eq!(hit(102.0, 228.0), Some(CropHit::Handle(Handle::BottomLeft)));
        assert_eq!(hit(440.0, 250.0), Some(CropHit::Handle(Handle::BottomRight)));
        assert_eq!(hit(260.0, 140.0), Some(CropHit::Body));
        assert_eq!(hit(600.0, 340.0), None);
    }

    #[test]
    fn test_cursor_hints() {
        let mut ctl = controller();
        assert_eq!(ctl.cursor_at(DisplayPoint::new(10.0, 10.0)), CursorHint::Crosshair);
        drag(&mut ctl, (100.0, 50.0), (420.0, 230.0), 0.0);
        assert_eq!(ctl.cursor_at(DisplayPoint::new(100.0, 50.0)), CursorHint::ResizeNwse);
        assert_eq!(ctl.cursor_at(DisplayPoint::new(420.0, 50.0)), CursorHint::ResizeNesw);
        assert_eq!(ctl.cursor_at(DisplayPoint::new(260.0, 140.0)), CursorHint::Move);
    }

    #[test]
    fn test_resize_keeps_opposite_corner() {
        let mut ctl = controller();
        drag(&mut ctl, (100.0, 50.0), (420.0, 230.0), 0.0);

        // Drag the bottom-right handle 80px to the right.
        let commit = drag(&mut ctl, (420.0, 230.0), (500.0, 230.0), 4.0).unwrap();
        let rect = ctl.crop().unwrap();
        assert_eq!(rect.top_left(), DisplayPoint::new(100.0, 50.0));
        assert!((rect.width - 400.0).abs() < 1e-9);
        assert_aspect(rect);
        assert_eq!(commit.zoom_in_time, 4.0);
    }

    #[test]
    fn test_resize_top_left_anchors_bottom_right() {
        let mut ctl = controller();
        drag(&mut ctl, (100.0, 50.0), (420.0, 230.0), 0.0);

        drag(&mut ctl, (100.0, 50.0), (260.0, 50.0), 0.0).unwrap();
        let rect = ctl.crop().unwrap();
        assert!((rect.right() - 420.0).abs() < 1e-9);
        assert!((rect.bottom() - 230.0).abs() < 1e-9);
        assert!((rect.width - 160.0).abs() < 1e-9);
        assert_aspect(rect);
    }

    #[test]
    fn test_resize_never_inverts() {
        let mut ctl = controller();
        drag(&mut ctl, (100.0, 50.0), (420.0, 230.0), 0.0);

        drag(&mut ctl, (420.0, 230.0), (-500.0, 230.0), 0.0);
        let rect = ctl.crop().unwrap();
        assert_eq!(rect.top_left(), DisplayPoint::new(100.0, 50.0));
        assert!((rect.width - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_past_edge_caps_width() {
        let mut ctl = controller();
        drag(&mut ctl, (100.0, 50.0), (420.0, 230.0), 0.0);

        drag(&mut ctl, (420.0, 230.0), (2000.0, 230.0), 0.0);
        let rect = ctl.crop().unwrap();
        assert!(rect.fits_within(&ctl.canvas_size()));
        assert_aspect(rect);
        // The right edge binds before the bottom one.
        assert!((rect.right() - 640.0).abs() < 1e-9);
        assert!((rect.width - 540.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_back_from_off_canvas_stays_capped() {
        let mut ctl = controller();
        drag(&mut ctl, (100.0, 50.0), (420.0, 230.0), 0.0);

        ctl.handle(&PointerEvent::down(420.0, 230.0), 0.0);
        ctl.handle(&PointerEvent::moved(2000.0, 230.0), 0.0);
        assert!((ctl.crop().unwrap().width - 540.0).abs() < 1e-9);

        // Still past the right edge: the box must not shrink.
        ctl.handle(&PointerEvent::moved(700.0, 230.0), 0.0);
        let rect = ctl.crop().unwrap();
        assert!((rect.width - 540.0).abs() < 1e-9);
        assert_eq!(rect.top_left(), DisplayPoint::new(100.0, 50.0));

        // Back on the canvas the corner tracks the pointer again.
        ctl.handle(&PointerEvent::moved(500.0, 230.0), 0.0);
        let rect = ctl.crop().unwrap();
        assert!((rect.right() - 500.0).abs() < 1e-9);
        assert_aspect(rect);
        ctl.handle(&PointerEvent::up(500.0, 230.0), 0.0);
    }

    #[test]
    fn test_move_stays_on_canvas() {
        let mut ctl = controller();
        drag(&mut ctl, (100.0, 50.0), (420.0, 230.0), 0.0);

        drag(&mut ctl, (260.0, 140.0), (1260.0, 1140.0), 0.0);
        let rect = ctl.crop().unwrap();
        assert_eq!(rect.x, 320.0);
        assert!((rect.bottom() - 360.0).abs() < 1e-9);
        assert_eq!(rect.width, 320.0);
    }

    #[test]
    fn test_leave_commits_like_up() {
        let mut ctl = controller();
        ctl.handle(&PointerEvent::down(100.0, 50.0), 1.5);
        ctl.handle(&PointerEvent::moved(420.0, 230.0), 1.5);
        let commit = ctl.handle(&PointerEvent::leave(700.0, 230.0), 1.5);
        assert!(commit.is_some());
    }

    #[test]
    fn test_leave_without_gesture_is_ignored() {
        let mut ctl = controller();
        drag(&mut ctl, (100.0, 50.0), (420.0, 230.0), 1.0);
        assert!(ctl.handle(&PointerEvent::leave(700.0, 230.0), 9.0).is_none());
        assert_eq!(ctl.zoom_in_time(), Some(1.0));
    }

    #[test]
    fn test_clear_and_mark_zoom_in() {
        let mut ctl = controller();
        assert!(!ctl.mark_zoom_in(2.0));

        drag(&mut ctl, (100.0, 50.0), (420.0, 230.0), 1.0);
        assert!(ctl.mark_zoom_in(2.0));
        assert_eq!(ctl.zoom_in_time(), Some(2.0));

        ctl.clear();
        assert!(ctl.crop().is_none());
        assert!(ctl.zoom_in_time().is_none());
        assert!(ctl.source_rect().is_none());
    }

    #[test]
    fn test_canvas_resize_keeps_source_region() {
        let mut ctl = controller();
        drag(&mut ctl, (100.0, 50.0), (420.0, 230.0), 0.0);
        let before = ctl.source_rect();

        ctl.set_canvas_size(DisplaySize::new(1280.0, 720.0));
        assert_eq!(ctl.crop().unwrap().x, 200.0);
        assert_eq!(ctl.source_rect(), before);
    }

    #[test]
    fn test_restore_from_source() {
        let mut ctl = controller();
        ctl.restore(SourceRect::new(300, 150, 960, 540), Some(3.0));
        assert_eq!(ctl.crop(), Some(DisplayRect::new(100.0, 50.0, 320.0, 180.0)));
        assert_eq!(ctl.source_rect(), Some(SourceRect::new(300, 150, 960, 540)));
    }
}
