//! Export jobs and the ffmpeg render backend.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use togif_common::config::EngineConfig;
use togif_common::error::{TogifError, TogifResult};
use togif_edit_model::{gif_file_name, EditSpecification};

use crate::filter_graph::compile;
use crate::mask::write_mask;
use crate::pipeline::{EngineInput, PipelineDescription};

/// An export job ready to be rendered.
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// Source video file.
    pub source_path: PathBuf,

    /// Output GIF path.
    pub output_path: PathBuf,

    /// Snapshot of the edit to render.
    pub edit: EditSpecification,

    /// External binaries to use.
    pub engine: EngineConfig,
}

impl ExportJob {
    /// Job writing next to the source, named after it with a `.gif` extension.
    pub fn new(source_path: impl Into<PathBuf>, edit: EditSpecification, engine: EngineConfig) -> Self {
        let source_path = source_path.into();
        let output_path = default_output_path(&source_path);
        Self {
            source_path,
            output_path,
            edit,
            engine,
        }
    }

    pub fn with_output(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }
}

/// `dir/clip.final.mp4` -> `dir/clip.final.gif`.
pub fn default_output_path(source: &Path) -> PathBuf {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(gif_file_name(&name))
}

/// Progress callback for export rendering.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send>;

/// Export progress report.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Frames rendered so far.
    pub frames_rendered: u64,

    /// Total frames to render.
    pub total_frames: u64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current stage.
    pub stage: ExportStage,
}

impl ExportProgress {
    fn at_stage(stage: ExportStage, total_frames: u64) -> Self {
        let done = matches!(stage, ExportStage::Complete);
        Self {
            progress: if done { 1.0 } else { 0.0 },
            frames_rendered: if done { total_frames } else { 0 },
            total_frames,
            eta_secs: 0.0,
            stage,
        }
    }
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    Rendering,
    Finalizing,
    Complete,
    Failed,
}

/// Something that can turn an [`ExportJob`] into a file.
pub trait RenderBackend: Send {
    /// Execute the export job. Blocking.
    fn render(&mut self, job: &ExportJob, progress: Option<&ProgressCallback>) -> TogifResult<()>;

    /// Check if this backend is available on the system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Render `job` with ffmpeg.
///
/// This is the main entry point for rendering.
pub async fn export_project(
    job: ExportJob,
    progress: Option<ProgressCallback>,
) -> TogifResult<PathBuf> {
    let backend = FfmpegBackend::new(job.engine.ffmpeg.clone());
    export_with_backend(job, Box::new(backend), progress).await
}

/// Render `job` with an explicit backend.
///
/// The backend runs on tokio's blocking pool. On failure a `Failed`
/// progress report is sent and `job.output_path` is left as it was.
pub async fn export_with_backend(
    job: ExportJob,
    mut backend: Box<dyn RenderBackend>,
    progress: Option<ProgressCallback>,
) -> TogifResult<PathBuf> {
    tracing::info!(
        source = %job.source_path.display(),
        output = %job.output_path.display(),
        fps = job.edit.export().fps(),
        width = job.edit.export().width(),
        "Starting export"
    );

    if !job.source_path.exists() {
        return Err(TogifError::FileNotFound {
            path: job.source_path.clone(),
        });
    }

    if let Some(parent) = job.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    if let Some(cb) = &progress {
        cb(ExportProgress::at_stage(ExportStage::Preparing, 0));
    }

    if !backend.is_available() {
        return Err(TogifError::unsupported(format!(
            "Render backend '{}' is not available (is {} in PATH?)",
            backend.name(),
            job.engine.ffmpeg
        )));
    }
    tracing::info!(backend = backend.name(), "Using render backend");

    let outcome = tokio::task::spawn_blocking(move || {
        let result = backend.render(&job, progress.as_ref());
        if result.is_err() {
            if let Some(cb) = &progress {
                cb(ExportProgress::at_stage(ExportStage::Failed, 0));
            }
        }
        result.map(|()| job.output_path)
    })
    .await
    .map_err(|e| TogifError::render(format!("Export task panicked: {e}")))?;

    match &outcome {
        Ok(path) => tracing::info!(output = %path.display(), "Export finished"),
        Err(err) => tracing::error!(error = %err, "Export failed"),
    }
    outcome
}

/// Move a finished render from the scratch directory onto `target`.
///
/// `rename` fails across filesystems, so fall back to copying.
fn persist_output(rendered: &Path, target: &Path) -> TogifResult<()> {
    if let Err(err) = std::fs::rename(rendered, target) {
        tracing::debug!(error = %err, "rename failed, copying output instead");
        std::fs::copy(rendered, target)?;
        std::fs::remove_file(rendered)?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct ExportPlan {
    pipeline: PipelineDescription,
    ffmpeg_args: Vec<String>,
    /// Where ffmpeg writes; only moved onto the job's output on success.
    scratch_output: PathBuf,
    total_frames: u64,
    expected_duration_secs: f64,
}

/// Runs the compiled pipeline through an `ffmpeg` child process.
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    ffmpeg: String,
}

impl FfmpegBackend {
    pub fn new(ffmpeg: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    /// Compile the edit and write any mask image into `workdir`.
    fn build_plan(&self, job: &ExportJob, workdir: &Path) -> TogifResult<ExportPlan> {
        let pipeline = compile(&job.edit);

        let mask_path = match pipeline.mask() {
            Some(EngineInput::MaskImage {
                width,
                height,
                radius,
            }) => {
                let path = workdir.join("mask.png");
                write_mask(&path, width, height, radius)?;
                Some(path)
            }
            _ => None,
        };

        let scratch_output = workdir.join("out.gif");
        let mut ffmpeg_args = vec![
            "-progress".to_string(),
            "pipe:1".to_string(),
            "-nostats".to_string(),
        ];
        ffmpeg_args.extend(pipeline.ffmpeg_args(
            &job.source_path,
            mask_path.as_deref(),
            &scratch_output,
        ));

        tracing::info!(
            shape = ?pipeline.shape,
            segments = pipeline.segments.len(),
            stages = pipeline.stages.len(),
            width = pipeline.geometry.frame_width,
            height = pipeline.geometry.frame_height,
            "Export plan ready"
        );

        Ok(ExportPlan {
            total_frames: pipeline.total_frames(),
            expected_duration_secs: pipeline.duration(),
            pipeline,
            ffmpeg_args,
            scratch_output,
        })
    }

    fn run_ffmpeg(&self, plan: &ExportPlan, progress: Option<&ProgressCallback>) -> TogifResult<()> {
        tracing::debug!(args = ?plan.ffmpeg_args, "Running ffmpeg");
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(&plan.ffmpeg_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let start = std::time::Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|e| TogifError::engine(format!("Failed to start {}: {e}", self.ffmpeg)))?;

        tracing::info!(
            pid = child.id(),
            total_frames = plan.total_frames,
            "ffmpeg process started"
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TogifError::engine("Failed to capture ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| TogifError::engine("Failed to capture ffmpeg stderr"))?;

        // ffmpeg blocks once the stderr pipe fills, so drain it on its own thread.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let mut reader = BufReader::new(stdout);
        let mut line = String::new();

        let mut latest_progress = ProgressState::default();
        let mut last_progress_secs = 0.0f64;
        let mut last_progress_wall = std::time::Instant::now();
        loop {
            line.clear();
            let bytes = reader
                .read_line(&mut line)
                .map_err(|e| TogifError::engine(format!("Failed reading ffmpeg progress: {e}")))?;
            if bytes == 0 {
                break;
            }

            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            latest_progress.update(key, value);
            if key != "progress" {
                continue;
            }

            if latest_progress.out_time_secs > last_progress_secs + 0.001 {
                last_progress_secs = latest_progress.out_time_secs;
                last_progress_wall = std::time::Instant::now();
            }
            if let Some(cb) = progress {
                cb(progress_report(
                    &latest_progress,
                    plan.total_frames,
                    plan.expected_duration_secs,
                    start.elapsed().as_secs_f64(),
                ));
            }
            if last_progress_wall.elapsed().as_secs() >= 10 {
                tracing::warn!(
                    out_time_secs = latest_progress.out_time_secs,
                    elapsed_secs = start.elapsed().as_secs_f64(),
                    "No ffmpeg progress advancement for 10s"
                );
                last_progress_wall = std::time::Instant::now();
            }
        }

        let status = child
            .wait()
            .map_err(|e| TogifError::engine(format!("Failed to wait on ffmpeg: {e}")))?;

        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            return Err(TogifError::engine(format!(
                "ffmpeg export failed (status {}): {}",
                status,
                stderr_output.trim()
            )));
        }

        tracing::debug!(
            elapsed_secs = start.elapsed().as_secs_f64(),
            "ffmpeg exited cleanly"
        );
        Ok(())
    }
}

impl RenderBackend for FfmpegBackend {
    fn render(&mut self, job: &ExportJob, progress: Option<&ProgressCallback>) -> TogifResult<()> {
        // Removed with everything in it when this function returns.
        let workdir = tempfile::Builder::new().prefix("togif-").tempdir()?;
        let plan = self.build_plan(job, workdir.path())?;

        if let Some(cb) = progress {
            cb(ExportProgress::at_stage(ExportStage::Preparing, plan.total_frames));
        }

        self.run_ffmpeg(&plan, progress)?;

        if !plan.scratch_output.exists() {
            return Err(TogifError::engine(format!(
                "ffmpeg reported success but {} was not written",
                plan.scratch_output.display()
            )));
        }
        persist_output(&plan.scratch_output, &job.output_path)?;
        let bytes = std::fs::metadata(&job.output_path).map(|m| m.len()).unwrap_or(0);
        tracing::info!(
            output = %job.output_path.display(),
            bytes,
            frames = plan.total_frames,
            loop_count = plan.pipeline.loop_count.get(),
            "GIF written"
        );

        if let Some(cb) = progress {
            cb(ExportProgress::at_stage(ExportStage::Complete, plan.total_frames));
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        command_exists(&self.ffmpeg)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Whether `binary` can be run: it must start and exit cleanly on `-version`.
///
/// The name is executed directly, never through a shell.
pub fn command_exists(binary: &str) -> bool {
    Command::new(binary)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            // Despite the name, ffmpeg reports out_time_ms in microseconds.
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }
}

fn progress_report(
    state: &ProgressState,
    total_frames: u64,
    expected_duration_secs: f64,
    elapsed_secs: f64,
) -> ExportProgress {
    let progress = if expected_duration_secs <= 0.0 {
        0.0
    } else {
        (state.out_time_secs / expected_duration_secs).clamp(0.0, 1.0)
    };

    let frames_rendered = (progress * total_frames as f64).round() as u64;
    let eta_secs = if progress > 0.0 {
        (elapsed_secs / progress) - elapsed_secs
    } else {
        0.0
    }
    .max(0.0);

    ExportProgress {
        progress: if state.complete { 1.0 } else { progress },
        frames_rendered,
        total_frames,
        eta_secs,
        stage: if state.complete {
            ExportStage::Finalizing
        } else {
            ExportStage::Rendering
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use togif_edit_model::{
        BackgroundSettings, ExportSettings, SourceRect, SourceVideo, TrimRange, ZoomWindow,
    };

    fn edit(background: bool) -> EditSpecification {
        let mut bg = BackgroundSettings::default();
        bg.enabled = background;
        EditSpecification::new(
            SourceVideo::new("clip.mp4", 10.0, 1920, 1080),
            TrimRange::new(1.0, 9.0, 10.0).unwrap(),
            Some(SourceRect::new(480, 270, 960, 540)),
            ZoomWindow::starting_at(3.0),
            ExportSettings::default(),
            bg,
        )
        .unwrap()
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/tmp/rec/clip.final.mp4")),
            PathBuf::from("/tmp/rec/clip.final.gif")
        );
        assert_eq!(default_output_path(Path::new("clip")), PathBuf::from("clip.gif"));
    }

    #[test]
    fn test_progress_state_parses_keys() {
        let mut state = ProgressState::default();
        state.update("out_time_us", "2500000");
        assert!((state.out_time_secs - 2.5).abs() < 1e-9);
        state.update("out_time_ms", "4000000");
        assert!((state.out_time_secs - 4.0).abs() < 1e-9);
        state.update("out_time_us", "N/A");
        assert!((state.out_time_secs - 4.0).abs() < 1e-9);
        state.update("progress", "continue");
        assert!(!state.complete);
        state.update("progress", "end");
        assert!(state.complete);
    }

    #[test]
    fn test_progress_report_midway() {
        let state = ProgressState {
            out_time_secs: 4.0,
            complete: false,
        };
        let report = progress_report(&state, 120, 8.0, 2.0);
        assert!((report.progress - 0.5).abs() < 1e-9);
        assert_eq!(report.frames_rendered, 60);
        assert!((report.eta_secs - 2.0).abs() < 1e-9);
        assert_eq!(report.stage, ExportStage::Rendering);
    }

    #[test]
    fn test_progress_report_complete() {
        let state = ProgressState {
            out_time_secs: 7.9,
            complete: true,
        };
        let report = progress_report(&state, 120, 8.0, 3.0);
        assert_eq!(report.progress, 1.0);
        assert_eq!(report.stage, ExportStage::Finalizing);
    }

    #[test]
    fn test_build_plan_without_mask() {
        let dir = tempfile::tempdir().unwrap();
        let job = ExportJob::new("/videos/clip.mp4", edit(false), EngineConfig::default());
        let plan = FfmpegBackend::new("ffmpeg").build_plan(&job, dir.path()).unwrap();

        assert_eq!(&plan.ffmpeg_args[..3], ["-progress", "pipe:1", "-nostats"]);
        assert_eq!(plan.ffmpeg_args.iter().filter(|a| *a == "-i").count(), 1);
        let scratch = dir.path().join("out.gif");
        assert_eq!(plan.scratch_output, scratch);
        assert_eq!(plan.ffmpeg_args.last().unwrap(), &scratch.display().to_string());
        assert!(!plan.ffmpeg_args.iter().any(|a| a == "/videos/clip.gif"));
        assert_eq!(plan.total_frames, 120);
        assert!(!dir.path().join("mask.png").exists());
    }

    #[test]
    fn test_build_plan_writes_mask() {
        let dir = tempfile::tempdir().unwrap();
        let job = ExportJob::new("/videos/clip.mp4", edit(true), EngineConfig::default());
        let plan = FfmpegBackend::new("ffmpeg").build_plan(&job, dir.path()).unwrap();

        let mask = dir.path().join("mask.png");
        assert!(mask.exists());
        assert!(plan.ffmpeg_args.contains(&mask.display().to_string()));
        assert_eq!(plan.ffmpeg_args.iter().filter(|a| *a == "-i").count(), 2);
    }

    struct FailingBackend;

    impl RenderBackend for FailingBackend {
        fn render(&mut self, _: &ExportJob, _: Option<&ProgressCallback>) -> TogifResult<()> {
            Err(TogifError::engine("decoder crashed"))
        }

        fn is_available(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct UnavailableBackend;

    impl RenderBackend for UnavailableBackend {
        fn render(&mut self, _: &ExportJob, _: Option<&ProgressCallback>) -> TogifResult<()> {
            unreachable!("unavailable backends are never run")
        }

        fn is_available(&self) -> bool {
            false
        }

        fn name(&self) -> &str {
            "missing"
        }
    }

    #[tokio::test]
    async fn test_failed_render_reports_failure_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("clip.mp4");
        std::fs::write(&source, b"not really a video").unwrap();
        let job = ExportJob::new(&source, edit(false), EngineConfig::default());
        let output = job.output_path.clone();

        let stages = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&stages);
        let callback: ProgressCallback = Box::new(move |p| seen.lock().unwrap().push(p.stage));

        let err = export_with_backend(job, Box::new(FailingBackend), Some(callback))
            .await
            .unwrap_err();
        assert!(err.is_engine_failure());
        assert!(!output.exists());
        assert_eq!(
            *stages.lock().unwrap(),
            vec![ExportStage::Preparing, ExportStage::Failed]
        );
    }

    #[tokio::test]
    async fn test_failed_render_keeps_previous_export() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("clip.mp4");
        std::fs::write(&source, b"not really a video").unwrap();
        let job = ExportJob::new(&source, edit(false), EngineConfig::default());
        let output = job.output_path.clone();
        std::fs::write(&output, b"GIF89a previous good export").unwrap();

        let err = export_with_backend(job, Box::new(FailingBackend), None)
            .await
            .unwrap_err();
        assert!(err.is_engine_failure());
        assert_eq!(std::fs::read(&output).unwrap(), b"GIF89a previous good export");
    }

    #[test]
    fn test_persist_output_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("out.gif");
        let target = dir.path().join("clip.gif");
        std::fs::write(&scratch, b"GIF89a new").unwrap();
        std::fs::write(&target, b"GIF89a old").unwrap();

        persist_output(&scratch, &target).unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"GIF89a new");
        assert!(!scratch.exists());
    }

    #[test]
    fn test_command_exists_rejects_missing_binary() {
        assert!(!command_exists("togif-no-such-binary-here"));
        assert!(!command_exists("/nonexistent/bin/ffmpeg"));
    }

    #[test]
    fn test_command_exists_does_not_use_a_shell() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("created");
        let hostile = format!("ffmpeg; touch {}", marker.display());

        assert!(!command_exists(&hostile));
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_missing_source_is_rejected() {
        let job = ExportJob::new("/nope/clip.mp4", edit(false), EngineConfig::default());
        let err = export_with_backend(job, Box::new(FailingBackend), None)
            .await
            .unwrap_err();
        assert!(matches!(err, TogifError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_unavailable_backend() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("clip.mp4");
        std::fs::write(&source, b"").unwrap();
        let job = ExportJob::new(&source, edit(false), EngineConfig::default());
        let err = export_with_backend(job, Box::new(UnavailableBackend), None)
            .await
            .unwrap_err();
        assert!(matches!(err, TogifError::Unsupported { .. }));
    }
}
