//! Media toolkit backed by the `ffmpeg` and `ffprobe` binaries.
//!
//! Each request runs the binary on a worker thread and calls the
//! completion handler from there.

mod command;
mod probe;
mod progress;

use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use vidmark_common::error::ToolkitError;
use vidmark_media_model::asset::{MediaKind, SourceAsset};
use vidmark_media_model::export::{ContainerFormat, ExportPreset, ExportProgress};

use crate::export::ExportJob;
use crate::toolkit::{Completion, ExportCompletion, MediaToolkit, ProgressSink, TrackLoadResult};

pub use probe::parse_tracks;

use command::{build_export_plan, ExportPlan};
use progress::ProgressState;

/// Toolkit that shells out to ffmpeg/ffprobe.
#[derive(Debug, Clone)]
pub struct FfmpegToolkit {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl Default for FfmpegToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegToolkit {
    /// Use `ffmpeg` and `ffprobe` from `PATH`.
    pub fn new() -> Self {
        Self::with_binaries("ffmpeg", "ffprobe")
    }

    pub fn with_binaries(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Whether both binaries can be found.
    pub fn is_available(&self) -> bool {
        command_exists(&self.ffmpeg) && command_exists(&self.ffprobe)
    }

    pub fn ffmpeg_available(&self) -> bool {
        command_exists(&self.ffmpeg)
    }

    pub fn ffprobe_available(&self) -> bool {
        command_exists(&self.ffprobe)
    }

    fn probe(&self, asset: &SourceAsset, kind: MediaKind) -> TrackLoadResult {
        let output = Command::new(&self.ffprobe)
            .args(probe::PROBE_ARGS)
            .arg(asset.location())
            .output()
            .map_err(|e| ToolkitError::new(format!("failed to start ffprobe: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = format!("ffprobe failed ({}): {}", output.status, stderr.trim());
            return Err(match output.status.code() {
                Some(code) => ToolkitError::with_code(message, code),
                None => ToolkitError::new(message),
            });
        }

        let json = String::from_utf8_lossy(&output.stdout);
        probe::parse_tracks(&json, asset, kind)
    }

    fn run_ffmpeg(&self, plan: &ExportPlan, progress: Option<&ProgressSink>) -> ExportCompletion {
        tracing::debug!(args = ?plan.args, "Running ffmpeg");
        let mut child = match Command::new(&self.ffmpeg)
            .args(&plan.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                return ExportCompletion::failed(ToolkitError::new(format!(
                    "failed to start ffmpeg: {e}"
                )))
            }
        };
        tracing::info!(pid = child.id(), args_len = plan.args.len(), "ffmpeg process started");

        let stderr_task = child.stderr.take().map(|stderr| {
            // Drain stderr so ffmpeg never blocks on a full pipe.
            std::thread::spawn(move || -> String {
                let mut output = String::new();
                match BufReader::new(stderr).read_to_string(&mut output) {
                    Ok(_) => output,
                    Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
                }
            })
        });

        if let Some(stdout) = child.stdout.take() {
            let mut state = ProgressState::default();
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if state.update_line(&line) {
                    if let Some(sink) = progress {
                        sink(ExportProgress {
                            fraction: state.fraction(plan.expected_duration_secs),
                        });
                    }
                }
            }
        }

        let status = match child.wait() {
            Ok(status) => status,
            Err(e) => {
                return ExportCompletion::failed(ToolkitError::new(format!(
                    "failed to wait on ffmpeg: {e}"
                )))
            }
        };
        let stderr_output = stderr_task
            .and_then(|task| task.join().ok())
            .unwrap_or_default();

        if status.success() {
            return ExportCompletion::completed();
        }
        let message = format!("ffmpeg export failed ({status}): {}", stderr_output.trim());
        ExportCompletion::failed(match status.code() {
            Some(code) => ToolkitError::with_code(message, code),
            None => ToolkitError::new(message),
        })
    }
}

impl MediaToolkit for FfmpegToolkit {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn load_tracks(
        &self,
        asset: &SourceAsset,
        kind: MediaKind,
        completion: Completion<TrackLoadResult>,
    ) {
        let toolkit = self.clone();
        let asset = asset.clone();
        std::thread::spawn(move || completion(toolkit.probe(&asset, kind)));
    }

    fn supports_export(&self, _preset: ExportPreset, _container: ContainerFormat) -> bool {
        self.ffmpeg_available()
    }

    fn export(
        &self,
        job: ExportJob,
        progress: Option<ProgressSink>,
        completion: Completion<ExportCompletion>,
    ) {
        let plan = match build_export_plan(&job) {
            Ok(plan) => plan,
            Err(e) => {
                completion(ExportCompletion::failed(e));
                return;
            }
        };
        let toolkit = self.clone();
        std::thread::spawn(move || completion(toolkit.run_ffmpeg(&plan, progress.as_ref())));
    }
}

fn command_exists(binary: &std::path::Path) -> bool {
    if binary.components().count() > 1 {
        return binary.is_file();
    }
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {} >/dev/null 2>&1", binary.display()))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
