//! Export presets, containers, and status values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Encoder quality preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPreset {
    HighestQuality,
    MediumQuality,
    LowQuality,
}

impl ExportPreset {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighestQuality => "highest",
            Self::MediumQuality => "medium",
            Self::LowQuality => "low",
        }
    }
}

impl FromStr for ExportPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "highest" | "highest_quality" => Ok(Self::HighestQuality),
            "medium" | "medium_quality" => Ok(Self::MediumQuality),
            "low" | "low_quality" => Ok(Self::LowQuality),
            other => Err(format!("Unknown preset: {other}. Use: highest, medium, low")),
        }
    }
}

/// Output container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Mp4,
    Mov,
}

impl ContainerFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mov => "mov",
        }
    }
}

impl FromStr for ContainerFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mp4" => Ok(Self::Mp4),
            "mov" => Ok(Self::Mov),
            other => Err(format!("Unknown container: {other}. Use: mp4, mov")),
        }
    }
}

/// Lifecycle status of an export job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStatus {
    Unknown,
    Waiting,
    Exporting,
    Completed,
    Failed,
    Cancelled,
}

impl ExportStatus {
    /// Completed, failed, or cancelled.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unknown => "unknown",
            Self::Waiting => "waiting",
            Self::Exporting => "exporting",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Intermediate export progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExportProgress {
    /// Fraction done in `[0.0, 1.0]`.
    pub fraction: f64,
}
