//! Render an edit document to a GIF.

use std::io::Write;
use std::path::PathBuf;

use togif_common::config::AppConfig;
use togif_common::timecode::format_span;
use togif_edit_model::EditSpecification;
use togif_render_engine::export::{export_project, ExportJob, ExportProgress, ExportStage};

use super::{load_document, parse_quality};

pub async fn run(
    config: &AppConfig,
    path: PathBuf,
    output: Option<PathBuf>,
    quality: Option<String>,
) -> anyhow::Result<()> {
    let document = load_document(&path)?;
    let source_path = document.resolve_source(&path);
    println!("Exporting: {}", source_path.display());

    let edit = match quality {
        Some(q) => with_preset(&document.edit, &q)?,
        None => document.edit.clone(),
    };

    let trim = edit.trim();
    let settings = *edit.export();
    println!("  Trim: {}", format_span(trim.start(), trim.end()));
    println!(
        "  Settings: {:?} ({}fps, {}px, {} colors, dither {}, loop {})",
        settings.quality(),
        settings.fps(),
        settings.width(),
        settings.colors(),
        settings.dither(),
        settings.loop_count()
    );

    let mut job = ExportJob::new(source_path, edit, config.engine.clone());
    if let Some(output) = output {
        job = job.with_output(output);
    }
    println!("  Output: {}", job.output_path.display());

    let progress_cb: Box<dyn Fn(ExportProgress) + Send> = Box::new(|p| {
        if p.stage == ExportStage::Rendering || p.stage == ExportStage::Finalizing {
            print!(
                "\r  Progress: {:.1}% ({}/{} frames, ETA: {:.0}s)  ",
                p.progress * 100.0,
                p.frames_rendered,
                p.total_frames,
                p.eta_secs,
            );
            let _ = std::io::stdout().flush();
        }
    });

    let written = export_project(job, Some(progress_cb))
        .await
        .map_err(|e| anyhow::anyhow!("\nExport failed: {e}"))?;
    let bytes = std::fs::metadata(&written).map(|m| m.len()).unwrap_or(0);
    println!("\nExport complete: {} ({} KiB)", written.display(), bytes / 1024);

    Ok(())
}

fn with_preset(edit: &EditSpecification, quality: &str) -> anyhow::Result<EditSpecification> {
    let mut export = *edit.export();
    export.apply_preset(parse_quality(quality)?);
    Ok(EditSpecification::new(
        edit.source().clone(),
        edit.trim(),
        edit.crop(),
        edit.zoom(),
        export,
        *edit.background(),
    )?)
}
