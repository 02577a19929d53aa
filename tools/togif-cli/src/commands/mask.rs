//! Write a rounded-corner mask image.

use std::path::PathBuf;

use togif_render_engine::write_mask;

pub fn run(output: PathBuf, width: u32, height: u32, radius: u32) -> anyhow::Result<()> {
    write_mask(&output, width, height, radius)?;
    println!(
        "Wrote {width}x{height} mask (radius {radius}px) to {}",
        output.display()
    );
    Ok(())
}
