//! Editable in-memory timeline assembled from source tracks.
//!
//! A composition holds at most one track per media kind (one video, one
//! optional audio). Each track is a list of segments, each mapping a range
//! of a source track onto the composition timeline.

use crate::asset::{AssetTrack, MediaKind, SourceAsset, TrackId};
use crate::geometry::Size;
use crate::time::{MediaTime, TimeRange};
use crate::transform::AffineTransform;

/// Failure while editing a composition.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompositionError {
    #[error("composition already has a {0} track")]
    DuplicateKind(MediaKind),

    #[error("{0} tracks are not supported in compositions")]
    UnsupportedKind(MediaKind),

    #[error("no composition track with id {0}")]
    UnknownTrack(TrackId),

    #[error("cannot insert a {found} track into a {expected} composition track")]
    KindMismatch { expected: MediaKind, found: MediaKind },

    #[error("malformed time range {range}")]
    MalformedRange { range: String },

    #[error("insertion point {at} is not a valid non-negative time")]
    InvalidInsertionPoint { at: String },
}

/// A source range placed on a composition track.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionSegment {
    pub source_asset: SourceAsset,

    /// Track of `source_asset` the media comes from.
    pub source_track_id: TrackId,

    /// Range read from the source track.
    pub source_range: TimeRange,

    /// Range covered on the composition timeline.
    pub target_range: TimeRange,
}

/// One mutable track of a [`Composition`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionTrack {
    pub track_id: TrackId,
    pub kind: MediaKind,
    pub segments: Vec<CompositionSegment>,
    /// Display transform carried into the export.
    pub preferred_transform: AffineTransform,
    /// Natural size of the first inserted video source.
    pub natural_size: Size,
}

impl CompositionTrack {
    /// End of the last segment, or zero for an empty track.
    pub fn end(&self) -> MediaTime {
        self.segments
            .iter()
            .filter_map(|segment| segment.target_range.end())
            .fold(MediaTime::ZERO, |latest, end| {
                if end > latest {
                    end
                } else {
                    latest
                }
            })
    }

    /// Range from zero to the end of the last segment.
    pub fn time_range(&self) -> TimeRange {
        TimeRange::from_zero(self.end())
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// An editable timeline. Lives for one export and is then dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    tracks: Vec<CompositionTrack>,
    next_track_id: TrackId,
}

impl Composition {
    pub fn new() -> Self {
        Self {
            tracks: Vec::new(),
            next_track_id: 1,
        }
    }

    /// Allocate an empty track of `kind`.
    pub fn add_mutable_track(&mut self, kind: MediaKind) -> Result<TrackId, CompositionError> {
        if kind == MediaKind::Subtitle {
            return Err(CompositionError::UnsupportedKind(kind));
        }
        if self.tracks.iter().any(|track| track.kind == kind) {
            return Err(CompositionError::DuplicateKind(kind));
        }
        let track_id = self.next_track_id;
        self.next_track_id = track_id + 1;
        self.tracks.push(CompositionTrack {
            track_id,
            kind,
            segments: Vec::new(),
            preferred_transform: AffineTransform::IDENTITY,
            natural_size: Size::default(),
        });
        Ok(track_id)
    }

    /// Place `range` of `source` on track `track_id` starting at `at`.
    pub fn insert_time_range(
        &mut self,
        track_id: TrackId,
        range: TimeRange,
        source: &AssetTrack,
        at: MediaTime,
    ) -> Result<(), CompositionError> {
        if !range.is_well_formed() {
            return Err(CompositionError::MalformedRange {
                range: range.to_string(),
            });
        }
        if !at.is_valid() || at.is_negative() {
            return Err(CompositionError::InvalidInsertionPoint { at: at.to_string() });
        }

        let track = self
            .track_mut(track_id)
            .ok_or(CompositionError::UnknownTrack(track_id))?;
        if track.kind != source.kind {
            return Err(CompositionError::KindMismatch {
                expected: track.kind,
                found: source.kind,
            });
        }

        if track.segments.is_empty() && track.kind == MediaKind::Video {
            track.natural_size = source.natural_size;
        }
        track.segments.push(CompositionSegment {
            source_asset: source.asset.clone(),
            source_track_id: source.track_id,
            source_range: range,
            target_range: TimeRange::new(at, range.duration),
        });
        Ok(())
    }

    /// Set the display transform of a track.
    pub fn set_preferred_transform(
        &mut self,
        track_id: TrackId,
        transform: AffineTransform,
    ) -> Result<(), CompositionError> {
        let track = self
            .track_mut(track_id)
            .ok_or(CompositionError::UnknownTrack(track_id))?;
        track.preferred_transform = transform;
        Ok(())
    }

    pub fn tracks(&self) -> &[CompositionTrack] {
        &self.tracks
    }

    pub fn track(&self, track_id: TrackId) -> Option<&CompositionTrack> {
        self.tracks.iter().find(|track| track.track_id == track_id)
    }

    fn track_mut(&mut self, track_id: TrackId) -> Option<&mut CompositionTrack> {
        self.tracks
            .iter_mut()
            .find(|track| track.track_id == track_id)
    }

    /// Track of `kind`, if one was added.
    pub fn track_of_kind(&self, kind: MediaKind) -> Option<&CompositionTrack> {
        self.tracks.iter().find(|track| track.kind == kind)
    }

    /// End of the longest track.
    pub fn duration(&self) -> MediaTime {
        self.tracks
            .iter()
            .map(CompositionTrack::end)
            .fold(MediaTime::ZERO, |longest, end| {
                if end > longest {
                    end
                } else {
                    longest
                }
            })
    }
}

impl Default for Composition {
    fn default() -> Self {
        Self::new()
    }
}
