//! Contract for the media decode/encode engine.
//!
//! Toolkits expose completion-callback APIs. Each completion handler is an
//! `FnOnce`, so a toolkit can resume a waiting caller at most once; a
//! handler that is dropped without being called surfaces as an error on
//! the caller side.

use std::sync::Arc;

use vidmark_common::error::ToolkitError;
use vidmark_media_model::asset::{AssetTrack, MediaKind, SourceAsset};
use vidmark_media_model::export::{ContainerFormat, ExportPreset, ExportProgress, ExportStatus};

use crate::export::ExportJob;

/// One-shot completion handler.
pub type Completion<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// Outcome of a track load request.
pub type TrackLoadResult = Result<Vec<AssetTrack>, ToolkitError>;

/// Receiver of intermediate export progress. Must not block.
pub type ProgressSink = Arc<dyn Fn(ExportProgress) + Send + Sync>;

/// Terminal event of an export job.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportCompletion {
    pub status: ExportStatus,
    pub error: Option<ToolkitError>,
}

impl ExportCompletion {
    pub fn completed() -> Self {
        Self {
            status: ExportStatus::Completed,
            error: None,
        }
    }

    pub fn failed(error: ToolkitError) -> Self {
        Self {
            status: ExportStatus::Failed,
            error: Some(error),
        }
    }

    pub fn cancelled(error: Option<ToolkitError>) -> Self {
        Self {
            status: ExportStatus::Cancelled,
            error,
        }
    }
}

/// Asynchronous media engine used by the pipeline.
pub trait MediaToolkit: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Load every track of `kind` in `asset`, in the toolkit's stable
    /// order, and call `completion` exactly once.
    fn load_tracks(
        &self,
        asset: &SourceAsset,
        kind: MediaKind,
        completion: Completion<TrackLoadResult>,
    );

    /// Whether an export job with this preset and container can be built.
    fn supports_export(&self, preset: ExportPreset, container: ContainerFormat) -> bool;

    /// Start rendering `job` to its output path. `progress`, when given,
    /// receives values in `[0.0, 1.0]`. `completion` is called once with
    /// the terminal status.
    fn export(
        &self,
        job: ExportJob,
        progress: Option<ProgressSink>,
        completion: Completion<ExportCompletion>,
    );
}
