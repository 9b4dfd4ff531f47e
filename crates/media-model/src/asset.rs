//! Source assets, their tracks, and the watermark image.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::geometry::Size;
use crate::time::{MediaTime, TimeRange};
use crate::transform::AffineTransform;

/// Kind of media stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Subtitle,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Subtitle => "subtitle",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to decodable media. Cheap to clone; the media itself is owned by
/// whichever toolkit opens it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceAsset {
    location: Arc<Path>,
}

impl SourceAsset {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: Arc::from(location.into()),
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }
}

/// Identifier of a track within its asset or composition.
pub type TrackId = u32;

/// One media stream inside a [`SourceAsset`]. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetTrack {
    /// Asset the track belongs to.
    pub asset: SourceAsset,

    /// Toolkit-assigned track identifier (container stream index).
    pub track_id: TrackId,

    pub kind: MediaKind,

    /// Encoded frame size before orientation. Zero for audio.
    pub natural_size: Size,

    /// Display transform for video tracks.
    pub preferred_transform: AffineTransform,

    /// Range of the track in its asset's timeline.
    pub time_range: TimeRange,

    /// Nominal frame rate, if the toolkit reports one.
    pub nominal_frame_rate: Option<f64>,
}

impl AssetTrack {
    pub fn duration(&self) -> MediaTime {
        self.time_range.duration
    }
}

/// The still image overlaid on the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkImage {
    path: PathBuf,
    size: Size,
}

impl WatermarkImage {
    /// Returns `None` when `size` has a zero, negative, or non-finite side.
    pub fn new(path: impl Into<PathBuf>, size: Size) -> Option<Self> {
        if size.is_empty() {
            return None;
        }
        Some(Self {
            path: path.into(),
            size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Width over height. Always positive and finite.
    pub fn aspect_ratio(&self) -> f64 {
        self.size.width / self.size.height
    }
}
