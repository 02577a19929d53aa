//! Replay a gesture script against an edit document.

use std::path::PathBuf;

use togif_common::config::AppConfig;
use togif_common::timecode::format_span;
use togif_edit_model::DisplaySize;
use togif_interaction::gesture::parse_script;
use togif_interaction::{EditorSession, TrackGeometry};

use super::load_document;

pub fn run(
    config: &AppConfig,
    path: PathBuf,
    script: PathBuf,
    canvas: (f64, f64),
    track: (f64, f64),
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut document = load_document(&path)?;

    let jsonl = std::fs::read_to_string(&script)
        .map_err(|e| anyhow::anyhow!("Failed to read script {}: {e}", script.display()))?;
    let steps = parse_script(&jsonl)
        .map_err(|e| anyhow::anyhow!("Failed to parse script {}: {e}", script.display()))?;

    let mut session = EditorSession::from_specification(
        &document.edit,
        config,
        DisplaySize::new(canvas.0, canvas.1),
        TrackGeometry::new(track.0, track.1),
    )?;

    let mut commits = 0usize;
    for step in &steps {
        let outcome = session.apply(step);
        if outcome.commit.is_some() {
            commits += 1;
        }
    }
    tracing::info!(steps = steps.len(), commits, "Script replayed");

    let edit = session.snapshot()?;
    let trim = edit.trim();
    println!("Replayed {} steps ({} crop commits)", steps.len(), commits);
    println!("  Trim: {}", format_span(trim.start(), trim.end()));
    match edit.crop() {
        Some(rect) => println!(
            "  Crop: {}x{} at ({}, {})",
            rect.width, rect.height, rect.x, rect.y
        ),
        None => println!("  Crop: none"),
    }
    let zoom = edit.zoom();
    println!("  Zoom: in {:?}, out {:?}", zoom.start, zoom.end);

    document.update(edit);
    let target = output.unwrap_or(path);
    document
        .save(&target)
        .map_err(|e| anyhow::anyhow!("Failed to save edit document: {e}"))?;
    println!("Saved: {}", target.display());

    Ok(())
}
