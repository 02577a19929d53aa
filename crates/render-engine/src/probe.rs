//! Source metadata via `ffprobe`.

use std::path::Path;
use std::process::Command;

use serde::Deserialize;

use togif_common::error::{TogifError, TogifResult};
use togif_edit_model::SourceVideo;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Read duration and dimensions of the first video stream of `path`.
pub fn probe_source(ffprobe: &str, path: &Path) -> TogifResult<SourceVideo> {
    if !path.exists() {
        return Err(TogifError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,duration:format=duration",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|e| TogifError::engine(format!("Failed to start {ffprobe}: {e}")))?;

    if !output.status.success() {
        return Err(TogifError::engine(format!(
            "{ffprobe} failed (status {}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let source = parse_probe_output(&name, &output.stdout)?;
    tracing::debug!(
        path = %path.display(),
        width = source.width,
        height = source.height,
        duration_secs = source.duration_secs,
        "Probed source video"
    );
    Ok(source)
}

fn parse_probe_output(name: &str, json: &[u8]) -> TogifResult<SourceVideo> {
    let probe: ProbeOutput = serde_json::from_slice(json)?;
    let stream = probe
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| TogifError::render(format!("{name} has no video stream")))?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(TogifError::render(format!(
                "{name} reports no usable video dimensions"
            )))
        }
    };

    // Container duration first; some streams omit their own.
    let duration_secs = probe
        .format
        .and_then(|f| f.duration)
        .or(stream.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| TogifError::render(format!("{name} reports no duration")))?;

    Ok(SourceVideo::new(name, duration_secs, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_output() {
        let json = br#"{
            "programs": [],
            "streams": [{ "width": 1920, "height": 1080 }],
            "format": { "duration": "12.480000" }
        }"#;
        let source = parse_probe_output("clip.mp4", json).unwrap();
        assert_eq!(source, SourceVideo::new("clip.mp4", 12.48, 1920, 1080));
    }

    #[test]
    fn test_stream_duration_fallback() {
        let json = br#"{ "streams": [{ "width": 640, "height": 480, "duration": "3.5" }] }"#;
        let source = parse_probe_output("a.webm", json).unwrap();
        assert_eq!(source.duration_secs, 3.5);
    }

    #[test]
    fn test_no_video_stream() {
        let json = br#"{ "streams": [], "format": { "duration": "1.0" } }"#;
        assert!(matches!(
            parse_probe_output("audio.m4a", json),
            Err(TogifError::Render { .. })
        ));
    }

    #[test]
    fn test_missing_duration() {
        let json = br#"{ "streams": [{ "width": 640, "height": 480 }], "format": {} }"#;
        assert!(parse_probe_output("x.mp4", json).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = probe_source("ffprobe", Path::new("/definitely/not/here.mp4")).unwrap_err();
        assert!(matches!(err, TogifError::FileNotFound { .. }));
    }
}
