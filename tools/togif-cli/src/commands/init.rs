//! Probe a clip and create an edit document for it.

use std::path::PathBuf;

use togif_common::config::AppConfig;
use togif_common::timecode::format_time;
use togif_edit_model::EditDocument;
use togif_interaction::session::{background_from_config, export_from_config};
use togif_render_engine::probe_source;

use super::{default_document_path, parse_quality, source_reference};

pub fn run(
    config: &AppConfig,
    source: PathBuf,
    output: Option<PathBuf>,
    quality: Option<String>,
    background: bool,
) -> anyhow::Result<()> {
    let video = probe_source(&config.engine.ffprobe, &source)
        .map_err(|e| anyhow::anyhow!("Failed to probe {}: {e}", source.display()))?;

    let mut export = export_from_config(config)?;
    if let Some(q) = quality {
        export.apply_preset(parse_quality(&q)?);
    }
    let mut bg = background_from_config(config)?;
    bg.enabled |= background;

    let document_path = output.unwrap_or_else(|| default_document_path(&source));
    let document = EditDocument::create(
        source_reference(&source, &document_path),
        video,
        export,
        bg,
    )
    .map_err(|e| anyhow::anyhow!("Failed to create edit document: {e}"))?;
    document
        .save(&document_path)
        .map_err(|e| anyhow::anyhow!("Failed to save edit document: {e}"))?;

    let src = document.edit.source();
    println!("Created edit document: {}", document_path.display());
    println!("  Source: {} ({}x{})", src.name, src.width, src.height);
    println!("  Duration: {}", format_time(src.duration_secs));
    println!(
        "  Export: {:?} ({}fps, {}px, {} colors)",
        export.quality(),
        export.fps(),
        export.width(),
        export.colors()
    );
    println!("  Background: {}", if bg.enabled { "on" } else { "off" });

    Ok(())
}
