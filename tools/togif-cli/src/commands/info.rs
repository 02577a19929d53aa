//! Show an edit document.

use std::path::PathBuf;

use togif_common::timecode::{format_span, format_time};

use super::load_document;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let document = load_document(&path)?;
    let edit = &document.edit;
    let source = edit.source();

    println!("Edit document: {}", path.display());
    println!("  Version: {}", document.version);
    println!("  Created: {}", document.created_at);
    println!("  Modified: {}", document.modified_at);
    println!();

    println!("Source:");
    println!("  Path: {}", document.resolve_source(&path).display());
    println!(
        "  Video: {}x{}, {}",
        source.width,
        source.height,
        format_time(source.duration_secs)
    );
    println!();

    let trim = edit.trim();
    println!("Edit:");
    println!("  Trim: {}", format_span(trim.start(), trim.end()));
    match edit.crop() {
        Some(rect) => println!(
            "  Crop: {}x{} at ({}, {})",
            rect.width, rect.height, rect.x, rect.y
        ),
        None => println!("  Crop: none"),
    }
    let zoom = edit.zoom();
    match (zoom.start, zoom.end) {
        (Some(zin), Some(out)) => println!("  Zoom: {}", format_span(zin, out)),
        (Some(zin), None) => println!("  Zoom: from {} to end", format_time(zin)),
        _ => println!("  Zoom: none"),
    }
    println!();

    let export = edit.export();
    println!("Export:");
    println!("  Quality: {:?}", export.quality());
    println!(
        "  {}fps, {}px wide, {} colors, dither {}, loop {}",
        export.fps(),
        export.width(),
        export.colors(),
        export.dither(),
        export.loop_count()
    );

    let background = edit.background();
    if background.enabled {
        println!(
            "  Background: {} padding {:.0}%, radius {}px",
            background.color,
            background.padding * 100.0,
            background.border_radius
        );
    } else {
        println!("  Background: off");
    }

    Ok(())
}
