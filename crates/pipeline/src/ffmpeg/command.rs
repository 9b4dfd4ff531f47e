//! ffmpeg argument construction for an export job.

use std::path::PathBuf;

use vidmark_common::error::ToolkitError;
use vidmark_media_model::asset::MediaKind;
use vidmark_media_model::composition::{Composition, CompositionSegment};
use vidmark_media_model::export::{ContainerFormat, ExportPreset};
use vidmark_media_model::geometry::Rect;
use vidmark_media_model::render_graph::LayerContents;

use crate::export::ExportJob;

/// A fully resolved ffmpeg invocation.
#[derive(Debug, Clone)]
pub(crate) struct ExportPlan {
    pub args: Vec<String>,

    /// Length of the rendered output, used to turn `out_time` into a
    /// fraction.
    pub expected_duration_secs: f64,
}

/// x264 speed preset and CRF for a quality preset.
pub(crate) fn encoder_settings(preset: ExportPreset) -> (&'static str, u8) {
    match preset {
        ExportPreset::HighestQuality => ("slow", 18),
        ExportPreset::MediumQuality => ("medium", 23),
        ExportPreset::LowQuality => ("veryfast", 28),
    }
}

fn muxer_args(container: ContainerFormat) -> Vec<String> {
    match container {
        ContainerFormat::Mp4 => vec![
            "-movflags".to_string(),
            "+faststart".to_string(),
            "-f".to_string(),
            "mp4".to_string(),
        ],
        ContainerFormat::Mov => vec!["-f".to_string(), "mov".to_string()],
    }
}

fn first_segment(composition: &Composition, kind: MediaKind) -> Option<&CompositionSegment> {
    composition
        .track_of_kind(kind)
        .and_then(|track| track.segments.first())
}

/// Round down to an even pixel count of at least 2; x264 rejects odd
/// dimensions for 4:2:0 output.
fn even_dimension(value: f64) -> u32 {
    let rounded = value.round().max(2.0) as u32;
    rounded - rounded % 2
}

fn pixel(value: f64) -> i64 {
    value.round() as i64
}

/// Filter graph scaling the decoded video to the render size and drawing
/// the watermark at `frame`.
///
/// ffmpeg applies the source's display rotation while decoding, so the
/// base video already matches the render orientation.
fn filter_graph(video_stream: u32, render: (u32, u32), frame: Rect) -> String {
    let (render_width, render_height) = render;
    let mark_width = pixel(frame.width).max(1);
    let mark_height = pixel(frame.height).max(1);
    format!(
        "[0:{video_stream}]scale={render_width}:{render_height},setsar=1[base];\
         [1:v]scale={mark_width}:{mark_height},format=rgba[mark];\
         [base][mark]overlay={x}:{y}:shortest=1:format=auto[vout]",
        x = pixel(frame.x),
        y = pixel(frame.y),
    )
}

/// Build the ffmpeg arguments rendering `job`.
pub(crate) fn build_export_plan(job: &ExportJob) -> Result<ExportPlan, ToolkitError> {
    let video = first_segment(&job.composition, MediaKind::Video)
        .ok_or_else(|| ToolkitError::new("composition has no video segment"))?;
    let audio = first_segment(&job.composition, MediaKind::Audio);

    let graph = &job.video_composition.render_graph;
    let watermark = graph
        .watermark_layer()
        .ok_or_else(|| ToolkitError::new("render graph has no watermark layer"))?;
    let LayerContents::Image { path: watermark_path } = &watermark.contents else {
        return Err(ToolkitError::new("watermark layer has no image"));
    };

    let render = job.video_composition.render_size;
    if render.is_empty() {
        return Err(ToolkitError::new(format!(
            "render size {}x{} is empty",
            render.width, render.height
        )));
    }
    let render_px = (even_dimension(render.width), even_dimension(render.height));

    let duration_secs = job.composition.duration().as_secs_f64();
    let (speed, crf) = encoder_settings(job.preset);

    let mut args: Vec<String> = vec![
        "-y".into(),
        "-hide_banner".into(),
        "-nostats".into(),
        "-progress".into(),
        "pipe:1".into(),
        "-i".into(),
        path_arg(video.source_asset.location().to_path_buf()),
        "-loop".into(),
        "1".into(),
        "-i".into(),
        path_arg(watermark_path.clone()),
        "-filter_complex".into(),
        filter_graph(video.source_track_id, render_px, watermark.frame),
        "-map".into(),
        "[vout]".into(),
    ];

    if let Some(audio) = audio {
        args.extend([
            "-map".into(),
            format!("0:{}", audio.source_track_id),
            "-c:a".into(),
            "aac".into(),
            "-b:a".into(),
            "192k".into(),
        ]);
    }

    args.extend([
        "-c:v".into(),
        "libx264".into(),
        "-preset".into(),
        speed.into(),
        "-crf".into(),
        crf.to_string(),
        "-pix_fmt".into(),
        "yuv420p".into(),
    ]);
    if let Some(fps) = job.video_composition.frame_rate() {
        args.extend(["-r".into(), format!("{fps:.3}")]);
    }
    if duration_secs.is_finite() && duration_secs > 0.0 {
        args.extend(["-t".into(), format!("{duration_secs:.3}")]);
    }
    args.extend(muxer_args(job.container));
    args.push(path_arg(job.output_path.clone()));

    Ok(ExportPlan {
        args,
        expected_duration_secs: duration_secs.max(0.0),
    })
}

fn path_arg(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vidmark_media_model::asset::{AssetTrack, SourceAsset, WatermarkImage};
    use vidmark_media_model::geometry::{PlacementRule, Size};
    use vidmark_media_model::time::{MediaTime, TimeRange};
    use vidmark_media_model::transform::{AffineTransform, ExactMatchClassifier};

    use crate::render_graph::RenderGraphBuilder;
    use crate::timeline::ComposedTimeline;

    fn track(kind: MediaKind, track_id: u32) -> AssetTrack {
        AssetTrack {
            asset: SourceAsset::new("/media/donut.mp4"),
            track_id,
            kind,
            natural_size: if kind == MediaKind::Video {
                Size::new(1920.0, 1080.0)
            } else {
                Size::default()
            },
            preferred_transform: AffineTransform::IDENTITY,
            time_range: TimeRange::from_zero(MediaTime::new(8, 1)),
            nominal_frame_rate: None,
        }
    }

    fn job(with_audio: bool, preset: ExportPreset, container: ContainerFormat) -> ExportJob {
        let video = track(MediaKind::Video, 0);
        let mut composition = Composition::new();
        let video_id = composition.add_mutable_track(MediaKind::Video).unwrap();
        composition
            .insert_time_range(video_id, video.time_range, &video, MediaTime::ZERO)
            .unwrap();
        let audio_id = if with_audio {
            let audio = track(MediaKind::Audio, 1);
            let id = composition.add_mutable_track(MediaKind::Audio).unwrap();
            composition
                .insert_time_range(id, audio.time_range, &audio, MediaTime::ZERO)
                .unwrap();
            Some(id)
        } else {
            None
        };
        let timeline = ComposedTimeline {
            composition,
            video_track: video,
            video_track_id: video_id,
            audio_track_id: audio_id,
        };
        let watermark = WatermarkImage::new("/media/seal.png", Size::new(100.0, 50.0)).unwrap();
        let plan = RenderGraphBuilder::new(
            PlacementRule::quarter_width(),
            Arc::new(ExactMatchClassifier),
            30,
        )
        .build(&timeline, &watermark);

        ExportJob {
            composition: timeline.composition,
            video_composition: plan.video_composition,
            output_path: PathBuf::from("/tmp/out/watermarked.mp4"),
            preset,
            container,
        }
    }

    fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|arg| arg == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn test_video_only_plan() {
        let plan = build_export_plan(&job(false, ExportPreset::HighestQuality, ContainerFormat::Mp4))
            .unwrap();
        let args = &plan.args;

        assert_eq!(value_after(args, "-progress"), Some("pipe:1"));
        assert_eq!(value_after(args, "-i"), Some("/media/donut.mp4"));
        assert_eq!(value_after(args, "-loop"), Some("1"));
        assert_eq!(value_after(args, "-crf"), Some("18"));
        assert_eq!(value_after(args, "-preset"), Some("slow"));
        assert_eq!(value_after(args, "-t"), Some("8.000"));
        assert_eq!(value_after(args, "-r"), Some("30.000"));
        assert_eq!(value_after(args, "-movflags"), Some("+faststart"));
        assert_eq!(args.iter().filter(|arg| *arg == "-map").count(), 1);
        assert!(!args.iter().any(|arg| arg == "aac"));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/out/watermarked.mp4"));
        assert_eq!(plan.expected_duration_secs, 8.0);
    }

    #[test]
    fn test_filter_places_watermark() {
        let plan = build_export_plan(&job(false, ExportPreset::HighestQuality, ContainerFormat::Mp4))
            .unwrap();
        let filter = value_after(&plan.args, "-filter_complex").unwrap();

        assert!(filter.starts_with("[0:0]scale=1920:1080,setsar=1[base];"));
        assert!(filter.contains("[1:v]scale=480:240"));
        assert!(filter.contains("overlay=480:0"));
        assert!(filter.ends_with("[vout]"));
    }

    #[test]
    fn test_audio_is_mapped() {
        let plan = build_export_plan(&job(true, ExportPreset::LowQuality, ContainerFormat::Mov))
            .unwrap();
        let args = &plan.args;

        assert_eq!(args.iter().filter(|arg| *arg == "-map").count(), 2);
        assert!(args.iter().any(|arg| arg == "0:1"));
        assert_eq!(value_after(args, "-c:a"), Some("aac"));
        assert_eq!(value_after(args, "-crf"), Some("28"));
        assert_eq!(value_after(args, "-f"), Some("mov"));
        assert!(!args.iter().any(|arg| arg == "-movflags"));
    }

    #[test]
    fn test_even_dimension() {
        assert_eq!(even_dimension(1080.0), 1080);
        assert_eq!(even_dimension(721.0), 720);
        assert_eq!(even_dimension(0.4), 2);
    }

    #[test]
    fn test_missing_video_segment_is_rejected() {
        let mut job = job(false, ExportPreset::MediumQuality, ContainerFormat::Mp4);
        job.composition = Composition::new();
        assert!(build_export_plan(&job).is_err());
    }
}
