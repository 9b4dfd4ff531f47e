//! Error types shared across vidmark crates.

use vidmark_media_model::asset::MediaKind;
use vidmark_media_model::composition::CompositionError;

/// Error reported by a media toolkit backend.
///
/// The pipeline never inspects it beyond logging; it is carried as the
/// `source` of the pipeline error that wraps it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ToolkitError {
    /// Human-readable description from the toolkit.
    pub message: String,

    /// Toolkit-specific error code, when one is available.
    pub code: Option<i32>,
}

impl ToolkitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(message: impl Into<String>, code: i32) -> Self {
        Self {
            message: message.into(),
            code: Some(code),
        }
    }
}

impl From<CompositionError> for ToolkitError {
    fn from(err: CompositionError) -> Self {
        Self::new(err.to_string())
    }
}

/// Top-level error type for vidmark operations.
#[derive(Debug, thiserror::Error)]
pub enum VidmarkError {
    #[error("Resource unavailable: {message}")]
    ResourceUnavailable { message: String },

    #[error("Composition could not allocate a track of kind {kind}")]
    TrackCreationFailed { kind: MediaKind },

    #[error("Failed to load tracks: {source}")]
    TrackLoadFailed {
        #[source]
        source: ToolkitError,
    },

    #[error("Source asset has no video track")]
    NoVideoTrack,

    #[error("Failed to copy source audio/video into composition: {source}")]
    AudioVideoCopyFailed {
        #[source]
        source: ToolkitError,
    },

    #[error("Export session cannot be created: {message}")]
    ExportSessionUnavailable { message: String },

    #[error("Export failed: {source}")]
    ExportFailed {
        #[source]
        source: ToolkitError,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using VidmarkError.
pub type VidmarkResult<T> = Result<T, VidmarkError>;

impl VidmarkError {
    pub fn resource_unavailable(msg: impl Into<String>) -> Self {
        Self::ResourceUnavailable {
            message: msg.into(),
        }
    }

    pub fn track_load_failed(cause: impl Into<ToolkitError>) -> Self {
        Self::TrackLoadFailed {
            source: cause.into(),
        }
    }

    pub fn audio_video_copy_failed(cause: impl Into<ToolkitError>) -> Self {
        Self::AudioVideoCopyFailed {
            source: cause.into(),
        }
    }

    pub fn export_session_unavailable(msg: impl Into<String>) -> Self {
        Self::ExportSessionUnavailable {
            message: msg.into(),
        }
    }

    pub fn export_failed(cause: impl Into<ToolkitError>) -> Self {
        Self::ExportFailed {
            source: cause.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
