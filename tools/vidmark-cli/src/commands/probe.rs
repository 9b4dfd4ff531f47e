//! Show what the pipeline sees in a source video.

use std::path::PathBuf;

use vidmark_common::config::AppConfig;
use vidmark_media_model::asset::SourceAsset;
use vidmark_media_model::geometry::FrameGeometry;
use vidmark_pipeline::ffmpeg::FfmpegToolkit;
use vidmark_pipeline::track_loader::{load_audio_track, load_video_track};
use vidmark_pipeline::PipelineOptions;

pub async fn run(config: &AppConfig, source: PathBuf) -> anyhow::Result<()> {
    if !source.is_file() {
        return Err(anyhow::anyhow!("Source not found: {}", source.display()));
    }
    let toolkit = FfmpegToolkit::new();
    if !toolkit.ffprobe_available() {
        return Err(anyhow::anyhow!("ffprobe must be in PATH (run `vidmark check`)"));
    }

    let asset = SourceAsset::new(&source);
    let video = load_video_track(&toolkit, &asset).await?;
    let audio = load_audio_track(&toolkit, &asset).await?;

    let options = PipelineOptions::from(&config.export);
    let geometry = FrameGeometry::resolve(
        video.natural_size,
        &video.preferred_transform,
        options.classifier.as_ref(),
    );

    println!("Source: {}", source.display());
    println!();
    println!("Video track #{}", video.track_id);
    println!(
        "  Natural size: {}x{}",
        video.natural_size.width, video.natural_size.height
    );
    println!("  Duration: {}", video.duration());
    if let Some(fps) = video.nominal_frame_rate {
        println!("  Frame rate: {fps:.3}");
    }
    let t = video.preferred_transform;
    println!(
        "  Transform: [{} {} {} {} | {} {}]",
        t.a, t.b, t.c, t.d, t.tx, t.ty
    );
    println!(
        "  Orientation: {}{}",
        geometry.orientation.as_str(),
        if geometry.is_portrait { " (portrait)" } else { "" }
    );
    println!(
        "  Render size: {}x{}",
        geometry.render_size.width, geometry.render_size.height
    );

    println!();
    match audio {
        Some(audio) => {
            println!("Audio track #{}", audio.track_id);
            println!("  Duration: {}", audio.duration());
        }
        None => println!("No audio track"),
    }

    let watermark_frame = options
        .placement
        .frame_for(geometry.render_size, 1.0);
    println!();
    println!(
        "Square watermark would land at ({}, {}) size {}x{}",
        watermark_frame.x, watermark_frame.y, watermark_frame.width, watermark_frame.height
    );

    Ok(())
}
