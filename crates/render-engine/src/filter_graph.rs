//! Compile an edit into a GIF filter pipeline.
//!
//! # Layout
//!
//! ```text
//! [0:v] ─ split ─┬─ trim → setpts → fps → scale ─────────┐
//!                ├─ trim → setpts → fps → crop → scale ──┼─ concat ─┐
//!                └─ trim → setpts → fps → scale ─────────┘          │
//!                                                                    │
//! [1:v] ─ scale → alphaextract ─────────────────────── alphamerge ───┤ (background only)
//!                                                       → pad        │
//!                                                                    ▼
//!                                      split ─┬─ palettegen ─┐
//!                                             └──────────────┴─ paletteuse → [out]
//! ```
//!
//! Every segment is scaled to the same even output size before concat, so
//! full-frame and cropped segments line up. The palette is computed once
//! over the whole output.

use togif_edit_model::coords::floor_even;
use togif_edit_model::EditSpecification;

use crate::pipeline::{
    EngineInput, Operation, OutputGeometry, PipelineDescription, PipelineShape, Segment,
    SegmentKind, Stage, StreamLabel,
};

/// Segments shorter than this are dropped.
const MIN_SEGMENT_SECS: f64 = 1e-6;

/// Build the pipeline for `spec`.
///
/// Pure: the same specification always yields an equal description. The
/// crop, if any, is assumed to lie inside the source with even extents,
/// which [`EditSpecification`] guarantees.
pub fn compile(spec: &EditSpecification) -> PipelineDescription {
    let (shape, segments) = plan_segments(spec);
    let geometry = output_geometry(spec);
    let export = spec.export();

    let mut graph = GraphBuilder::default();

    // Fan the source out to one branch per segment.
    let branches: Vec<StreamLabel> = if segments.len() > 1 {
        let outputs: Vec<StreamLabel> = (0..segments.len())
            .map(|i| StreamLabel::new(format!("in{i}")))
            .collect();
        graph.push(
            "source split",
            Operation::Split {
                outputs: segments.len(),
            },
            vec![StreamLabel::source_video()],
            outputs.clone(),
        );
        outputs
    } else {
        vec![StreamLabel::source_video()]
    };

    let crop = spec.crop();
    let mut scaled = Vec::with_capacity(segments.len());
    for (i, (segment, input)) in segments.iter().zip(branches).enumerate() {
        let tag = format!("s{i}");
        let mut stream = graph.chain(
            format!("segment {i} trim"),
            Operation::Trim {
                start: segment.start,
                end: segment.end,
            },
            input,
            format!("{tag}_trim"),
        );
        stream = graph.chain(
            format!("segment {i} reset timestamps"),
            Operation::ResetTimestamps,
            stream,
            format!("{tag}_pts"),
        );
        stream = graph.chain(
            format!("segment {i} resample"),
            Operation::Fps { fps: export.fps() },
            stream,
            format!("{tag}_fps"),
        );
        if let (SegmentKind::Cropped, Some(rect)) = (segment.kind, crop) {
            stream = graph.chain(
                format!("segment {i} crop"),
                Operation::Crop { rect },
                stream,
                format!("{tag}_crop"),
            );
        }
        stream = graph.chain(
            format!("segment {i} scale"),
            Operation::Scale {
                width: geometry.video_width,
                height: geometry.video_height,
            },
            stream,
            tag,
        );
        scaled.push(stream);
    }

    let mut stream = if scaled.len() > 1 {
        let joined = StreamLabel::new("joined");
        graph.push(
            "concat",
            Operation::Concat {
                segments: scaled.len(),
            },
            scaled,
            vec![joined.clone()],
        );
        joined
    } else {
        // A pipeline always has at least one segment.
        scaled.pop().unwrap_or_else(StreamLabel::source_video)
    };

    let mut inputs = vec![EngineInput::SourceVideo];
    let background = spec.background();
    if background.enabled {
        inputs.push(EngineInput::MaskImage {
            width: geometry.video_width,
            height: geometry.video_height,
            radius: background.border_radius,
        });

        let mask = graph.chain(
            "mask scale",
            Operation::Scale {
                width: geometry.video_width,
                height: geometry.video_height,
            },
            StreamLabel::mask_image(),
            "mask_scaled",
        );
        let alpha = graph.chain("mask alpha extract", Operation::AlphaExtract, mask, "mask_alpha");

        let rounded = StreamLabel::new("rounded");
        graph.push(
            "mask merge",
            Operation::AlphaMerge,
            vec![stream, alpha],
            vec![rounded.clone()],
        );
        stream = graph.chain(
            "background pad",
            Operation::Pad {
                width: geometry.frame_width,
                height: geometry.frame_height,
                x: geometry.offset_x,
                y: geometry.offset_y,
                color: background.color,
            },
            rounded,
            "framed",
        );
    }

    let palette_source = StreamLabel::new("pal_src");
    let palette_frames = StreamLabel::new("pal_in");
    graph.push(
        "palette split",
        Operation::Split { outputs: 2 },
        vec![stream],
        vec![palette_source.clone(), palette_frames.clone()],
    );
    let palette = graph.chain(
        "palette generate",
        Operation::PaletteGen {
            max_colors: export.colors(),
        },
        palette_source,
        "palette",
    );
    let output = StreamLabel::new("out");
    graph.push(
        "palette apply",
        Operation::PaletteUse {
            bayer_scale: export.dither(),
        },
        vec![palette_frames, palette],
        vec![output.clone()],
    );

    tracing::debug!(
        shape = ?shape,
        segments = segments.len(),
        stages = graph.stages.len(),
        width = geometry.frame_width,
        height = geometry.frame_height,
        "Compiled filter pipeline"
    );

    PipelineDescription {
        shape,
        segments,
        stages: graph.stages,
        inputs,
        geometry,
        loop_count: export.loop_count(),
        fps: export.fps(),
        output,
    }
}

/// Choose the shape and split the trim range into segments.
fn plan_segments(spec: &EditSpecification) -> (PipelineShape, Vec<Segment>) {
    let trim = spec.trim();
    let zoom = spec.zoom();
    let span = |kind, start, end| Segment { kind, start, end };

    let (shape, planned) = match (spec.crop(), zoom.start, zoom.end) {
        (Some(_), Some(zoom_in), None) if zoom_in != 0.0 => (
            PipelineShape::TwoPart,
            vec![
                span(SegmentKind::Full, trim.start(), zoom_in),
                span(SegmentKind::Cropped, zoom_in, trim.end()),
            ],
        ),
        (Some(_), Some(zoom_in), Some(zoom_out)) if zoom_in != 0.0 => (
            PipelineShape::ThreePart,
            vec![
                span(SegmentKind::Full, trim.start(), zoom_in),
                span(SegmentKind::Cropped, zoom_in, zoom_out),
                span(SegmentKind::Full, zoom_out, trim.end()),
            ],
        ),
        _ => (
            PipelineShape::Simple,
            vec![span(SegmentKind::Full, trim.start(), trim.end())],
        ),
    };

    let segments = planned
        .into_iter()
        .filter(|s| s.duration() > MIN_SEGMENT_SECS)
        .collect();
    (shape, segments)
}

/// Even output size derived from the configured width and the source
/// aspect ratio, plus background padding.
fn output_geometry(spec: &EditSpecification) -> OutputGeometry {
    let video_width = floor_even(spec.export().width()).max(2);
    let aspect = spec.source().aspect_ratio();
    let video_height = floor_even((video_width as f64 / aspect).round() as u32).max(2);

    let background = spec.background();
    let (pad_x, pad_y) = if background.enabled {
        (
            (video_width as f64 * background.padding).round() as u32,
            (video_height as f64 * background.padding).round() as u32,
        )
    } else {
        (0, 0)
    };

    OutputGeometry {
        video_width,
        video_height,
        frame_width: video_width + 2 * pad_x,
        frame_height: video_height + 2 * pad_y,
        offset_x: pad_x,
        offset_y: pad_y,
    }
}

/// Accumulates stages in emission order.
#[derive(Default)]
struct GraphBuilder {
    stages: Vec<Stage>,
}

impl GraphBuilder {
    fn push(
        &mut self,
        name: impl Into<String>,
        operation: Operation,
        inputs: Vec<StreamLabel>,
        outputs: Vec<StreamLabel>,
    ) {
        self.stages.push(Stage {
            name: name.into(),
            operation,
            inputs,
            outputs,
        });
    }

    /// Single-input, single-output stage; returns the new output label.
    fn chain(
        &mut self,
        name: impl Into<String>,
        operation: Operation,
        input: StreamLabel,
        output: impl Into<String>,
    ) -> StreamLabel {
        let output = StreamLabel::new(output);
        self.push(name, operation, vec![input], vec![output.clone()]);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use togif_edit_model::{
        BackgroundSettings, ExportSettings, LoopCount, SourceRect, SourceVideo, TrimRange,
        ZoomWindow,
    };

    fn spec(trim: (f64, f64), crop: Option<SourceRect>, zoom: ZoomWindow) -> EditSpecification {
        EditSpecification::new(
            SourceVideo::new("clip.mp4", 10.0, 1920, 1080),
            TrimRange::new(trim.0, trim.1, 10.0).unwrap(),
            crop,
            zoom,
            ExportSettings::default(),
            BackgroundSettings::default(),
        )
        .unwrap()
    }

    const CROP: SourceRect = SourceRect {
        x: 480,
        y: 270,
        width: 960,
        height: 540,
    };

    #[test]
    fn test_geometry_from_width_and_aspect() {
        let geometry = output_geometry(&spec((0.0, 10.0), None, ZoomWindow::none()));
        assert_eq!(geometry.video_width, 600);
        assert_eq!(geometry.video_height, 338);
        assert_eq!((geometry.frame_width, geometry.frame_height), (600, 338));
    }

    #[test]
    fn test_odd_width_rounds_down() {
        let mut export = ExportSettings::default();
        export.set_width(601);
        let spec = EditSpecification::new(
            SourceVideo::new("clip.mp4", 10.0, 1920, 1080),
            TrimRange::full(10.0).unwrap(),
            None,
            ZoomWindow::none(),
            export,
            BackgroundSettings::default(),
        )
        .unwrap();
        assert_eq!(output_geometry(&spec).video_width, 600);
    }

    #[test]
    fn test_zoom_in_at_zero_is_simple() {
        let spec = spec((0.0, 10.0), Some(CROP), ZoomWindow::starting_at(0.0));
        let (shape, segments) = plan_segments(&spec);
        assert_eq!(shape, PipelineShape::Simple);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Full);
    }

    #[test]
    fn test_zoom_in_at_trim_start_drops_empty_segment() {
        let pipeline = compile(&spec((2.0, 8.0), Some(CROP), ZoomWindow::starting_at(2.0)));
        assert_eq!(pipeline.shape, PipelineShape::TwoPart);
        assert_eq!(pipeline.segments.len(), 1);
        assert_eq!(pipeline.segments[0].kind, SegmentKind::Cropped);
        assert!(pipeline.position_of("concat").is_none());
        assert_eq!(pipeline.stages[0].operation.kind(), "trim");
        assert!(pipeline.position_of("crop").is_some());
    }

    #[test]
    fn test_zoom_out_at_trim_end_drops_tail() {
        let zoom = ZoomWindow {
            start: Some(3.0),
            end: Some(10.0),
        };
        let pipeline = compile(&spec((0.0, 10.0), Some(CROP), zoom));
        assert_eq!(pipeline.segments.len(), 2);
        assert_eq!(pipeline.stages[0].operation, Operation::Split { outputs: 2 });
    }

    #[test]
    fn test_loop_and_fps_carried() {
        let mut export = ExportSettings::default();
        export.set_loop_count(LoopCount::new(3).unwrap());
        export.set_fps(10);
        let spec = EditSpecification::new(
            SourceVideo::new("clip.mp4", 10.0, 1920, 1080),
            TrimRange::full(10.0).unwrap(),
            None,
            ZoomWindow::none(),
            export,
            BackgroundSettings::default(),
        )
        .unwrap();
        let pipeline = compile(&spec);
        assert_eq!(pipeline.loop_count.get(), 3);
        assert_eq!(pipeline.total_frames(), 100);
        assert!(pipeline.filter_complex().contains("fps=10"));
    }
}
