//! Check system capabilities.

use vidmark_pipeline::ffmpeg::FfmpegToolkit;

pub fn run() -> anyhow::Result<()> {
    println!("vidmark System Check");
    println!("{}", "=".repeat(50));

    let toolkit = FfmpegToolkit::new();
    let checks = [
        ("ffmpeg", toolkit.ffmpeg_available(), "needed to export"),
        ("ffprobe", toolkit.ffprobe_available(), "needed to load tracks"),
    ];
    for (binary, available, purpose) in &checks {
        if *available {
            println!("[OK] {binary} found in PATH");
        } else {
            println!("[MISSING] {binary} not found in PATH ({purpose})");
        }
    }

    let config_path = vidmark_common::config::config_file_path();
    if config_path.exists() {
        println!("[OK] Config: {}", config_path.display());
    } else {
        println!("[INFO] No config at {} (defaults in use)", config_path.display());
    }

    println!();
    if checks.iter().all(|(_, available, _)| *available) {
        println!("All required tools are available. vidmark is ready.");
    } else {
        println!("Install ffmpeg (which ships ffprobe) and try again.");
    }

    Ok(())
}
