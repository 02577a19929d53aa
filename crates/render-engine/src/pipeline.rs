//! Pipeline descriptions: labelled filter stages plus engine inputs and
//! muxer options.
//!
//! A description is plain data. [`PipelineDescription::filter_complex`]
//! renders it into ffmpeg filtergraph syntax and
//! [`PipelineDescription::ffmpeg_args`] into a full argument vector.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use togif_edit_model::{LoopCount, RgbColor, SourceRect};

/// A named edge between stages, rendered as `[label]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StreamLabel(String);

impl StreamLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Video stream of engine input 0.
    pub fn source_video() -> Self {
        Self::new("0:v")
    }

    /// Video stream of engine input 1.
    pub fn mask_image() -> Self {
        Self::new("1:v")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

/// One filter with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Duplicate one stream into `outputs` identical streams.
    Split { outputs: usize },
    /// Keep `[start, end)` seconds.
    Trim { start: f64, end: f64 },
    /// Rebase timestamps so the stream starts at zero.
    ResetTimestamps,
    /// Resample to a constant frame rate.
    Fps { fps: u32 },
    Crop { rect: SourceRect },
    /// Lanczos scale to an exact size.
    Scale { width: u32, height: u32 },
    /// Join `segments` video streams end to end.
    Concat { segments: usize },
    /// Turn a mask's alpha channel into a grayscale stream.
    AlphaExtract,
    /// Use the second input as the alpha channel of the first.
    AlphaMerge,
    /// Grow the frame to `width`x`height`, placing the input at `x`,`y`.
    Pad {
        width: u32,
        height: u32,
        x: u32,
        y: u32,
        color: RgbColor,
    },
    PaletteGen { max_colors: u32 },
    /// Map frames onto the palette with ordered (Bayer) dithering.
    PaletteUse { bayer_scale: u32 },
}

impl Operation {
    /// Short kind name, stable across parameters.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Split { .. } => "split",
            Self::Trim { .. } => "trim",
            Self::ResetTimestamps => "reset-timestamps",
            Self::Fps { .. } => "resample",
            Self::Crop { .. } => "crop",
            Self::Scale { .. } => "scale",
            Self::Concat { .. } => "concat",
            Self::AlphaExtract => "alpha-extract",
            Self::AlphaMerge => "mask-merge",
            Self::Pad { .. } => "pad",
            Self::PaletteGen { .. } => "palettegen",
            Self::PaletteUse { .. } => "paletteuse",
        }
    }

    /// The ffmpeg filter invocation, e.g. `scale=600:338:flags=lanczos`.
    pub fn filter(&self) -> String {
        match self {
            Self::Split { outputs } => format!("split={outputs}"),
            Self::Trim { start, end } => {
                format!("trim=start={}:end={}", seconds(*start), seconds(*end))
            }
            Self::ResetTimestamps => "setpts=PTS-STARTPTS".to_string(),
            Self::Fps { fps } => format!("fps={fps}"),
            Self::Crop { rect } => {
                format!("crop={}:{}:{}:{}", rect.width, rect.height, rect.x, rect.y)
            }
            Self::Scale { width, height } => format!("scale={width}:{height}:flags=lanczos"),
            Self::Concat { segments } => format!("concat=n={segments}:v=1:a=0"),
            Self::AlphaExtract => "alphaextract".to_string(),
            Self::AlphaMerge => "alphamerge".to_string(),
            Self::Pad {
                width,
                height,
                x,
                y,
                color,
            } => format!("pad={width}:{height}:{x}:{y}:color={}", color.ffmpeg_hex()),
            Self::PaletteGen { max_colors } => format!("palettegen=max_colors={max_colors}"),
            Self::PaletteUse { bayer_scale } => {
                format!("paletteuse=dither=bayer:bayer_scale={bayer_scale}")
            }
        }
    }
}

/// Seconds with millisecond precision and no trailing zeros.
fn seconds(t: f64) -> String {
    let s = format!("{t:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// A filter stage with explicit input and output labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stage {
    /// Human-readable stage name, unique within a pipeline.
    pub name: String,
    pub operation: Operation,
    pub inputs: Vec<StreamLabel>,
    pub outputs: Vec<StreamLabel>,
}

impl Stage {
    /// `[in]filter=args[out]`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for label in &self.inputs {
            out.push_str(&label.to_string());
        }
        out.push_str(&self.operation.filter());
        for label in &self.outputs {
            out.push_str(&label.to_string());
        }
        out
    }
}

/// Whether a timeline segment shows the full frame or the crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Full,
    Cropped,
}

/// A span of source time rendered one way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub start: f64,
    pub end: f64,
}

impl Segment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Which timeline layout the compiler chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineShape {
    /// One full-frame span.
    Simple,
    /// Full frame, then cropped from zoom-in to the end.
    TwoPart,
    /// Full frame, cropped between the zoom markers, full frame again.
    ThreePart,
}

/// Sizes of the rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutputGeometry {
    /// Scaled video size, both even.
    pub video_width: u32,
    pub video_height: u32,
    /// Final frame size after any background padding.
    pub frame_width: u32,
    pub frame_height: u32,
    /// Position of the video inside the frame.
    pub offset_x: u32,
    pub offset_y: u32,
}

/// A file the engine reads, in input-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineInput {
    SourceVideo,
    /// Rounded-corner alpha mask to generate at this size.
    MaskImage { width: u32, height: u32, radius: u32 },
}

/// Everything the external engine needs to produce the GIF.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineDescription {
    pub shape: PipelineShape,
    pub segments: Vec<Segment>,
    pub stages: Vec<Stage>,
    pub inputs: Vec<EngineInput>,
    pub geometry: OutputGeometry,
    pub loop_count: LoopCount,
    pub fps: u32,
    /// Label of the final stream.
    pub output: StreamLabel,
}

impl PipelineDescription {
    /// Total output duration in seconds.
    pub fn duration(&self) -> f64 {
        self.segments.iter().map(Segment::duration).sum()
    }

    /// Expected number of output frames.
    pub fn total_frames(&self) -> u64 {
        (self.duration() * self.fps as f64).round().max(0.0) as u64
    }

    /// Stage kinds in order, e.g. `["trim", "reset-timestamps", ...]`.
    pub fn stage_kinds(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.operation.kind()).collect()
    }

    pub fn position_of(&self, kind: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.operation.kind() == kind)
    }

    pub fn mask(&self) -> Option<EngineInput> {
        self.inputs
            .iter()
            .copied()
            .find(|input| matches!(input, EngineInput::MaskImage { .. }))
    }

    /// The `-filter_complex` argument.
    pub fn filter_complex(&self) -> String {
        self.stages
            .iter()
            .map(Stage::render)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Full ffmpeg argument vector (without the program name).
    ///
    /// `mask` is required when the pipeline declares a mask input and
    /// ignored otherwise.
    pub fn ffmpeg_args(&self, source: &Path, mask: Option<&Path>, output: &Path) -> Vec<String> {
        let mut args = vec!["-y".to_string(), "-hide_banner".to_string()];

        for input in &self.inputs {
            let path = match input {
                EngineInput::SourceVideo => Some(source),
                EngineInput::MaskImage { .. } => mask,
            };
            if let Some(path) = path {
                args.push("-i".to_string());
                args.push(path.display().to_string());
            }
        }

        args.extend([
            "-filter_complex".to_string(),
            self.filter_complex(),
            "-map".to_string(),
            self.output.to_string(),
            "-loop".to_string(),
            self.loop_count.get().to_string(),
            output.display().to_string(),
        ]);
        args
    }
}
