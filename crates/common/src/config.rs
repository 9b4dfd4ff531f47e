//! Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vidmark_media_model::export::{ContainerFormat, ExportPreset};
use vidmark_media_model::geometry::PlacementRule;

use crate::error::{VidmarkError, VidmarkResult};

/// Global application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory where watermarked files are written.
    pub output_dir: PathBuf,

    /// Default export settings.
    #[serde(default)]
    pub export: ExportDefaults,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Highest accepted `export.frame_rate`.
pub const MAX_FRAME_RATE: u32 = 240;

/// Default export parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    /// Quality preset handed to the toolkit.
    pub preset: ExportPreset,

    /// Output container.
    pub container: ContainerFormat,

    /// Frames per second of the rendered video composition.
    pub frame_rate: u32,

    /// Where the watermark lands on the frame.
    pub placement: PlacementRule,

    /// File name used when the caller gives only an output directory.
    pub output_file_name: String,

    /// Tolerance for orientation classification. `None` keeps exact
    /// coefficient matching.
    pub orientation_tolerance: Option<f64>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "vidmark_pipeline=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: dirs_default_output(),
            export: ExportDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            preset: ExportPreset::HighestQuality,
            container: ContainerFormat::Mp4,
            frame_rate: 30,
            placement: PlacementRule::quarter_width(),
            output_file_name: "watermarked.mp4".to_string(),
            orientation_tolerance: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit file.
    pub fn load_from(path: &Path) -> VidmarkResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> VidmarkResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit file.
    pub fn save_to(&self, path: &Path) -> VidmarkResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> VidmarkResult<()> {
        if self.export.frame_rate == 0 || self.export.frame_rate > MAX_FRAME_RATE {
            return Err(VidmarkError::config(format!(
                "export.frame_rate must be between 1 and {MAX_FRAME_RATE}"
            )));
        }
        if !self.export.placement.is_valid() {
            return Err(VidmarkError::config(format!(
                "export.placement is out of range: {:?}",
                self.export.placement
            )));
        }
        if let Some(tolerance) = self.export.orientation_tolerance {
            if !(tolerance.is_finite() && tolerance >= 0.0) {
                return Err(VidmarkError::config(
                    "export.orientation_tolerance must be a non-negative number",
                ));
            }
        }
        if self.export.output_file_name.trim().is_empty() {
            return Err(VidmarkError::config("export.output_file_name is empty"));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("vidmark").join("config.json")
}

/// Default output directory.
fn dirs_default_output() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("vidmark").join("output")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_export() {
        let config = AppConfig::default();
        assert_eq!(config.export.preset, ExportPreset::HighestQuality);
        assert_eq!(config.export.container, ContainerFormat::Mp4);
        assert_eq!(config.export.frame_rate, 30);
        assert_eq!(config.export.placement, PlacementRule::quarter_width());
        assert!(config.export.orientation_tolerance.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.export.placement = PlacementRule::full_width_top();
        config.export.orientation_tolerance = Some(1e-6);
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "output_dir": "/tmp/out", "export": { "frame_rate": 60 } }"#,
        )
        .unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(loaded.export.frame_rate, 60);
        assert_eq!(loaded.export.placement, PlacementRule::quarter_width());
        assert_eq!(loaded.logging.level, "info");
    }

    #[test]
    fn test_zero_frame_rate_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "output_dir": "/tmp/out", "export": { "frame_rate": 0 } }"#,
        )
        .unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, VidmarkError::Config { .. }));
    }

    #[test]
    fn test_frame_rate_upper_bound() {
        let mut config = AppConfig::default();
        config.export.frame_rate = MAX_FRAME_RATE;
        assert!(config.validate().is_ok());

        config.export.frame_rate = u32::MAX;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, VidmarkError::Config { .. }));
    }
}
