//! Asynchronous track loading.

use vidmark_common::error::{VidmarkError, VidmarkResult};
use vidmark_media_model::asset::{AssetTrack, MediaKind, SourceAsset};

use crate::bridge::suspend;
use crate::toolkit::{MediaToolkit, TrackLoadResult};

/// Load the first track of `kind`, or `None` if the asset has none.
///
/// Issues exactly one request to the toolkit. A toolkit error, or a
/// handler the toolkit drops without answering, fails with
/// [`VidmarkError::TrackLoadFailed`].
pub async fn load_first_track(
    toolkit: &dyn MediaToolkit,
    asset: &SourceAsset,
    kind: MediaKind,
) -> VidmarkResult<Option<AssetTrack>> {
    tracing::debug!(asset = %asset.location().display(), %kind, "Loading tracks");

    let result: TrackLoadResult = suspend("track load", |completion| {
        toolkit.load_tracks(asset, kind, completion)
    })
    .await
    .map_err(VidmarkError::track_load_failed)?;

    let tracks = result.map_err(|cause| {
        tracing::warn!(%kind, error = %cause, "Toolkit failed to load tracks");
        VidmarkError::track_load_failed(cause)
    })?;

    tracing::debug!(%kind, count = tracks.len(), "Tracks loaded");
    Ok(tracks.into_iter().next())
}

/// Load the first video track; an asset without one is fatal.
pub async fn load_video_track(
    toolkit: &dyn MediaToolkit,
    asset: &SourceAsset,
) -> VidmarkResult<AssetTrack> {
    load_first_track(toolkit, asset, MediaKind::Video)
        .await?
        .ok_or(VidmarkError::NoVideoTrack)
}

/// Load the first audio track; absence is not an error.
pub async fn load_audio_track(
    toolkit: &dyn MediaToolkit,
    asset: &SourceAsset,
) -> VidmarkResult<Option<AssetTrack>> {
    load_first_track(toolkit, asset, MediaKind::Audio).await
}
