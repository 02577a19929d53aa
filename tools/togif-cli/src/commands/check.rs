//! Check external tools and configuration.

use std::path::Path;

use togif_common::config::{config_file_path, AppConfig};
use togif_render_engine::command_exists;

pub fn run(config: &AppConfig, explicit: Option<&Path>) -> anyhow::Result<()> {
    println!("togif System Check");
    println!("{}", "=".repeat(50));

    let mut ready = true;
    for (role, binary) in [
        ("Encoder", config.engine.ffmpeg.as_str()),
        ("Prober", config.engine.ffprobe.as_str()),
    ] {
        if command_exists(binary) {
            println!("[OK] {role}: {binary}");
        } else {
            println!("[MISSING] {role}: {binary} could not be run");
            ready = false;
        }
    }

    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);
    if path.exists() {
        match config.validate() {
            Ok(()) => println!("[OK] Config: {}", path.display()),
            Err(e) => {
                println!("[WARN] Config {}: {e}", path.display());
                ready = false;
            }
        }
    } else {
        println!("[OK] Config: built-in defaults ({} not present)", path.display());
    }

    let e = &config.export;
    println!(
        "     Export defaults: {}fps, {}px, {} colors, dither {}, loop {}",
        e.fps, e.width, e.colors, e.dither, e.loop_count
    );

    println!();
    if ready {
        println!("All required tools are available. togif is ready.");
    } else {
        println!("Some requirements are missing. See above for fixes.");
    }

    Ok(())
}
