//! ffprobe output parsing.

use std::collections::HashMap;

use serde::Deserialize;
use vidmark_common::error::ToolkitError;
use vidmark_media_model::asset::{AssetTrack, MediaKind, SourceAsset};
use vidmark_media_model::geometry::Size;
use vidmark_media_model::time::{MediaTime, TimeRange, DEFAULT_TIMESCALE};
use vidmark_media_model::transform::AffineTransform;

/// Arguments that make ffprobe describe every stream as JSON.
pub(crate) const PROBE_ARGS: [&str; 7] = [
    "-v",
    "error",
    "-print_format",
    "json",
    "-show_streams",
    "-show_format",
    "-hide_banner",
];

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    index: u32,
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
    #[serde(default)]
    side_data_list: Vec<SideData>,
    #[serde(default)]
    disposition: Disposition,
}

#[derive(Debug, Default, Deserialize)]
struct Disposition {
    #[serde(default)]
    attached_pic: i32,
}

#[derive(Debug, Deserialize)]
struct SideData {
    rotation: Option<f64>,
}

impl ProbeStream {
    fn kind(&self) -> Option<MediaKind> {
        match self.codec_type.as_deref()? {
            // Cover art shows up as a single-frame video stream.
            "video" if self.disposition.attached_pic == 0 => Some(MediaKind::Video),
            "audio" => Some(MediaKind::Audio),
            "subtitle" => Some(MediaKind::Subtitle),
            _ => None,
        }
    }

    /// Clockwise display rotation in degrees.
    fn rotation_degrees(&self) -> i32 {
        if let Some(rotate) = self.tags.get("rotate").and_then(|v| v.trim().parse::<i32>().ok()) {
            return rotate;
        }
        // Display matrix rotation is counter-clockwise.
        self.side_data_list
            .iter()
            .find_map(|side| side.rotation)
            .map(|rotation| -(rotation.round() as i32))
            .unwrap_or(0)
    }

    fn frame_rate(&self) -> Option<f64> {
        [&self.avg_frame_rate, &self.r_frame_rate]
            .into_iter()
            .flatten()
            .find_map(|rate| parse_rational(rate))
    }
}

/// Parse `ffprobe -show_streams -show_format` JSON into the tracks of
/// `kind`, in stream order.
pub fn parse_tracks(
    json: &str,
    asset: &SourceAsset,
    kind: MediaKind,
) -> Result<Vec<AssetTrack>, ToolkitError> {
    let output: ProbeOutput = serde_json::from_str(json)
        .map_err(|e| ToolkitError::new(format!("unreadable ffprobe output: {e}")))?;
    let container_duration = output
        .format
        .as_ref()
        .and_then(|format| format.duration.as_deref())
        .and_then(parse_seconds);

    let mut tracks = Vec::new();
    for stream in output.streams.iter().filter(|s| s.kind() == Some(kind)) {
        let Some(seconds) = stream
            .duration
            .as_deref()
            .and_then(parse_seconds)
            .or(container_duration)
        else {
            tracing::debug!(index = stream.index, "Skipping stream without duration");
            continue;
        };

        let natural_size = match kind {
            MediaKind::Video => Size::new(
                stream.width.unwrap_or(0) as f64,
                stream.height.unwrap_or(0) as f64,
            ),
            _ => Size::default(),
        };
        let rotation = stream.rotation_degrees();
        let preferred_transform = AffineTransform::from_rotation_degrees(rotation, natural_size)
            .unwrap_or_else(|| {
                tracing::warn!(index = stream.index, rotation, "Unsupported rotation, keeping upright");
                AffineTransform::IDENTITY
            });

        tracks.push(AssetTrack {
            asset: asset.clone(),
            track_id: stream.index,
            kind,
            natural_size,
            preferred_transform,
            time_range: TimeRange::from_zero(MediaTime::from_secs_f64(seconds, DEFAULT_TIMESCALE)),
            nominal_frame_rate: if kind == MediaKind::Video {
                stream.frame_rate()
            } else {
                None
            },
        });
    }
    Ok(tracks)
}

fn parse_seconds(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs > 0.0)
}

/// Parse an ffprobe rational such as `30000/1001`.
fn parse_rational(raw: &str) -> Option<f64> {
    let (num, den) = raw.split_once('/')?;
    let num = num.trim().parse::<f64>().ok()?;
    let den = den.trim().parse::<f64>().ok()?;
    if den == 0.0 || num <= 0.0 {
        return None;
    }
    Some(num / den)
}
