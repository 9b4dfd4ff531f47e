//! Timeline composition: copy source video (and audio) into a new
//! composition.

use vidmark_common::error::{VidmarkError, VidmarkResult};
use vidmark_media_model::asset::{AssetTrack, MediaKind, SourceAsset, TrackId};
use vidmark_media_model::composition::{Composition, CompositionError};
use vidmark_media_model::time::{MediaTime, TimeRange};

use crate::toolkit::MediaToolkit;
use crate::track_loader::{load_audio_track, load_video_track};

/// A composition holding the full source video, plus audio if present.
#[derive(Debug, Clone)]
pub struct ComposedTimeline {
    pub composition: Composition,

    /// The source video track that was copied.
    pub video_track: AssetTrack,

    /// Composition track carrying the video.
    pub video_track_id: TrackId,

    /// Composition track carrying the audio, when the source has one.
    pub audio_track_id: Option<TrackId>,
}

impl ComposedTimeline {
    /// Range copied from the source, `[0, source duration)`.
    pub fn source_range(&self) -> TimeRange {
        TimeRange::from_zero(self.video_track.duration())
    }
}

/// Build a composition from `asset`.
///
/// The video track's full range is inserted at time zero; an audio track,
/// if the asset has one, gets the same range at the same offset. Any
/// failure aborts the build and no composition is returned.
pub async fn build_composition(
    toolkit: &dyn MediaToolkit,
    asset: &SourceAsset,
) -> VidmarkResult<ComposedTimeline> {
    let mut composition = Composition::new();
    let video_track_id = add_track(&mut composition, MediaKind::Video)?;

    let video_track = load_video_track(toolkit, asset).await?;
    let range = TimeRange::from_zero(video_track.duration());
    insert_full_range(&mut composition, video_track_id, range, &video_track)?;

    let audio_track_id = match load_audio_track(toolkit, asset).await? {
        Some(audio_track) => {
            let audio_track_id = add_track(&mut composition, MediaKind::Audio)?;
            insert_full_range(&mut composition, audio_track_id, range, &audio_track)?;
            Some(audio_track_id)
        }
        None => {
            tracing::debug!(asset = %asset.location().display(), "Source has no audio track");
            None
        }
    };

    tracing::info!(
        duration = %range.duration,
        with_audio = audio_track_id.is_some(),
        natural_width = video_track.natural_size.width,
        natural_height = video_track.natural_size.height,
        "Composition built"
    );

    Ok(ComposedTimeline {
        composition,
        video_track,
        video_track_id,
        audio_track_id,
    })
}

fn add_track(composition: &mut Composition, kind: MediaKind) -> VidmarkResult<TrackId> {
    composition.add_mutable_track(kind).map_err(|e| {
        tracing::warn!(%kind, error = %e, "Failed to add composition track");
        VidmarkError::TrackCreationFailed { kind }
    })
}

fn insert_full_range(
    composition: &mut Composition,
    track_id: TrackId,
    range: TimeRange,
    source: &AssetTrack,
) -> VidmarkResult<()> {
    composition
        .insert_time_range(track_id, range, source, MediaTime::ZERO)
        .map_err(|e: CompositionError| {
            tracing::warn!(kind = %source.kind, %range, error = %e, "Failed to copy source track");
            VidmarkError::audio_video_copy_failed(e)
        })
}
