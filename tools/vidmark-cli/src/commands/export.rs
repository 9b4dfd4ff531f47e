//! Watermark a video.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use vidmark_common::clock::format_elapsed;
use vidmark_common::config::AppConfig;
use vidmark_media_model::export::{ContainerFormat, ExportPreset, ExportProgress};
use vidmark_media_model::geometry::PlacementRule;
use vidmark_pipeline::ffmpeg::FfmpegToolkit;
use vidmark_pipeline::{PipelineOptions, ProgressSink, Resources, WatermarkPipeline};

pub struct ExportArgs {
    pub source: PathBuf,
    pub watermark: PathBuf,
    pub output: Option<PathBuf>,
    pub name: Option<String>,
    pub placement: Option<String>,
    pub fraction: Option<f64>,
    pub container: Option<String>,
    pub preset: Option<String>,
}

pub async fn run(config: &AppConfig, args: ExportArgs) -> anyhow::Result<()> {
    let mut defaults = config.export.clone();
    if let Some(preset) = &args.preset {
        defaults.preset = preset
            .parse::<ExportPreset>()
            .map_err(anyhow::Error::msg)?;
    }
    if let Some(container) = &args.container {
        defaults.container = container
            .parse::<ContainerFormat>()
            .map_err(anyhow::Error::msg)?;
    }
    defaults.placement = placement_rule(
        args.placement.as_deref(),
        args.fraction,
        defaults.placement,
    )?;

    let file_name = match args.name {
        Some(name) => name,
        None if args.container.is_some() => PathBuf::from(&defaults.output_file_name)
            .with_extension(defaults.container.extension())
            .to_string_lossy()
            .into_owned(),
        None => defaults.output_file_name.clone(),
    };
    let output_dir = args.output.unwrap_or_else(|| config.output_dir.clone());

    let resources = Resources::locate(&args.source, &args.watermark, &output_dir, &file_name)?;

    println!("Watermarking: {}", resources.source.location().display());
    println!("  Watermark: {}", resources.watermark.path().display());
    println!("  Output: {}", resources.output_path.display());
    println!(
        "  Preset: {}  Container: {}",
        defaults.preset.as_str(),
        defaults.container.extension()
    );

    let toolkit = FfmpegToolkit::new();
    if !toolkit.is_available() {
        return Err(anyhow::anyhow!(
            "ffmpeg and ffprobe must be in PATH (run `vidmark check`)"
        ));
    }

    let pipeline = WatermarkPipeline::new(Arc::new(toolkit), PipelineOptions::from(&defaults));
    let progress: ProgressSink = Arc::new(|p: ExportProgress| {
        print!("\r  Progress: {:.1}%  ", p.fraction * 100.0);
        let _ = std::io::stdout().flush();
    });

    match pipeline
        .run(
            &resources.source,
            &resources.watermark,
            &resources.output_path,
            Some(progress),
        )
        .await
    {
        Ok(outcome) => {
            println!();
            println!(
                "Export {}: {} ({}x{}, {})",
                outcome.status,
                outcome.output_path.display(),
                outcome.geometry.render_size.width,
                outcome.geometry.render_size.height,
                outcome.geometry.orientation.as_str(),
            );
            println!("Processing time: {}", format_elapsed(outcome.elapsed));
            Ok(())
        }
        Err(e) => {
            println!();
            Err(anyhow::anyhow!("Export failed: {e}"))
        }
    }
}

fn placement_rule(
    name: Option<&str>,
    fraction: Option<f64>,
    configured: PlacementRule,
) -> anyhow::Result<PlacementRule> {
    let rule = match (name, fraction) {
        (None, None) => configured,
        (None, Some(f)) | (Some("centered"), Some(f)) => PlacementRule::centered(f),
        (Some("centered"), None) => PlacementRule::centered(0.25),
        (Some("quarter"), _) => PlacementRule::quarter_width(),
        (Some("full-width"), _) => PlacementRule::full_width_top(),
        (Some(other), _) => {
            return Err(anyhow::anyhow!(
                "Unknown placement: {other}. Use: quarter, full-width, centered"
            ));
        }
    };
    if !rule.is_valid() {
        return Err(anyhow::anyhow!("Watermark fraction must be in (0, 1]"));
    }
    Ok(rule)
}
