//! Print the pipeline an export would run.

use std::path::{Path, PathBuf};

use togif_render_engine::{compile, default_output_path};

use super::load_document;

pub fn run(path: PathBuf, json: bool) -> anyhow::Result<()> {
    let document = load_document(&path)?;
    let pipeline = compile(&document.edit);

    if json {
        println!("{}", serde_json::to_string_pretty(&pipeline)?);
        return Ok(());
    }

    let g = pipeline.geometry;
    println!("Shape: {:?}", pipeline.shape);
    println!(
        "Output: {}x{} ({} frames at {}fps, loop {})",
        g.frame_width,
        g.frame_height,
        pipeline.total_frames(),
        pipeline.fps,
        pipeline.loop_count
    );
    println!();

    println!("Segments:");
    for segment in &pipeline.segments {
        println!(
            "  {:?}: {:.3}s - {:.3}s",
            segment.kind, segment.start, segment.end
        );
    }
    println!();

    println!("Stages:");
    for (i, stage) in pipeline.stages.iter().enumerate() {
        println!("  {i:>2}. {:<28} {}", stage.name, stage.render());
    }
    println!();

    let source = document.resolve_source(&path);
    let mask = pipeline.mask().map(|_| Path::new("mask.png"));
    let args = pipeline.ffmpeg_args(&source, mask, &default_output_path(&source));
    println!("Command:");
    println!("  ffmpeg {}", shell_join(&args));

    Ok(())
}

fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|arg| {
            if arg.chars().any(|c| c.is_whitespace() || "[];'\"".contains(c)) {
                format!("'{}'", arg.replace('\'', r"'\''"))
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_join_quotes_filtergraphs() {
        let args = vec![
            "-filter_complex".to_string(),
            "[0:v]fps=15[out]".to_string(),
            "-y".to_string(),
        ];
        assert_eq!(shell_join(&args), "-filter_complex '[0:v]fps=15[out]' -y");
    }
}
