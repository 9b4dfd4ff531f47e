//! Scripted in-memory toolkit for driving the pipeline in tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vidmark_common::error::ToolkitError;
use vidmark_media_model::asset::{AssetTrack, MediaKind, SourceAsset, WatermarkImage};
use vidmark_media_model::export::{ContainerFormat, ExportPreset, ExportProgress};
use vidmark_media_model::geometry::Size;
use vidmark_media_model::time::{MediaTime, TimeRange};
use vidmark_media_model::transform::AffineTransform;
use vidmark_pipeline::{
    Completion, ExportCompletion, ExportJob, MediaToolkit, ProgressSink, TrackLoadResult,
};

/// How a track load request is answered.
#[derive(Debug, Clone)]
pub enum LoadScript {
    Tracks(Vec<AssetTrack>),
    Fail(ToolkitError),
}

/// How an export request ends.
#[derive(Debug, Clone)]
pub enum ExportScript {
    /// Write the output file and report `Completed`.
    Complete,
    /// Report `Failed` with the given error and write nothing.
    Fail(ToolkitError),
    /// Report `Cancelled` without an error.
    CancelSilently,
    /// Drop the completion handler without calling it.
    Abandon,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    LoadTracks(MediaKind),
    Export(PathBuf),
}

pub struct ScriptedToolkit {
    video: LoadScript,
    audio: LoadScript,
    export: ExportScript,
    supports_export: bool,
    progress_steps: Vec<f64>,
    export_delay: Duration,

    calls: Mutex<Vec<Call>>,
    jobs: Mutex<Vec<ExportJob>>,
    output_existed_at_export: Mutex<Vec<bool>>,
    active_exports: Arc<AtomicUsize>,
    max_active_exports: Arc<AtomicUsize>,
}

impl ScriptedToolkit {
    pub fn new(video: LoadScript, audio: LoadScript) -> Self {
        Self {
            video,
            audio,
            export: ExportScript::Complete,
            supports_export: true,
            progress_steps: Vec::new(),
            export_delay: Duration::from_millis(5),
            calls: Mutex::new(Vec::new()),
            jobs: Mutex::new(Vec::new()),
            output_existed_at_export: Mutex::new(Vec::new()),
            active_exports: Arc::new(AtomicUsize::new(0)),
            max_active_exports: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Source with one video track and, optionally, one audio track.
    pub fn with_source(video: AssetTrack, audio: Option<AssetTrack>) -> Self {
        Self::new(
            LoadScript::Tracks(vec![video]),
            LoadScript::Tracks(audio.into_iter().collect()),
        )
    }

    pub fn export_script(mut self, script: ExportScript) -> Self {
        self.export = script;
        self
    }

    pub fn unsupported(mut self) -> Self {
        self.supports_export = false;
        self
    }

    pub fn progress_steps(mut self, steps: &[f64]) -> Self {
        self.progress_steps = steps.to_vec();
        self
    }

    pub fn export_delay(mut self, delay: Duration) -> Self {
        self.export_delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn export_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Export(_)))
            .count()
    }

    pub fn jobs(&self) -> Vec<ExportJob> {
        self.jobs.lock().unwrap().clone()
    }

    pub fn output_existed_at_export(&self) -> Vec<bool> {
        self.output_existed_at_export.lock().unwrap().clone()
    }

    pub fn max_active_exports(&self) -> usize {
        self.max_active_exports.load(Ordering::SeqCst)
    }
}

impl MediaToolkit for ScriptedToolkit {
    fn name(&self) -> &str {
        "scripted"
    }

    fn load_tracks(
        &self,
        _asset: &SourceAsset,
        kind: MediaKind,
        completion: Completion<TrackLoadResult>,
    ) {
        self.calls.lock().unwrap().push(Call::LoadTracks(kind));
        let script = match kind {
            MediaKind::Video => self.video.clone(),
            _ => self.audio.clone(),
        };
        // Answer from another thread, the way a real engine does.
        std::thread::spawn(move || {
            completion(match script {
                LoadScript::Tracks(tracks) => Ok(tracks),
                LoadScript::Fail(error) => Err(error),
            })
        });
    }

    fn supports_export(&self, _preset: ExportPreset, _container: ContainerFormat) -> bool {
        self.supports_export
    }

    fn export(
        &self,
        job: ExportJob,
        progress: Option<ProgressSink>,
        completion: Completion<ExportCompletion>,
    ) {
        let output_path = job.output_path.clone();
        self.calls
            .lock()
            .unwrap()
            .push(Call::Export(output_path.clone()));
        self.output_existed_at_export
            .lock()
            .unwrap()
            .push(output_path.exists());
        self.jobs.lock().unwrap().push(job);

        let script = self.export.clone();
        let steps = self.progress_steps.clone();
        let delay = self.export_delay;
        let active = Arc::clone(&self.active_exports);
        let max_active = Arc::clone(&self.max_active_exports);

        std::thread::spawn(move || {
            let now_active = active.fetch_add(1, Ordering::SeqCst) + 1;
            max_active.fetch_max(now_active, Ordering::SeqCst);

            for fraction in steps {
                if let Some(sink) = &progress {
                    sink(ExportProgress { fraction });
                }
            }
            std::thread::sleep(delay);

            let outcome = match script {
                ExportScript::Complete => {
                    std::fs::write(&output_path, b"watermarked frames").unwrap();
                    Some(ExportCompletion::completed())
                }
                ExportScript::Fail(error) => Some(ExportCompletion::failed(error)),
                ExportScript::CancelSilently => Some(ExportCompletion::cancelled(None)),
                ExportScript::Abandon => None,
            };
            active.fetch_sub(1, Ordering::SeqCst);

            match outcome {
                Some(outcome) => completion(outcome),
                None => drop(completion),
            }
        });
    }
}

pub fn source() -> SourceAsset {
    SourceAsset::new("/media/donut.mp4")
}

pub fn video_track(natural_size: Size, transform: AffineTransform, secs: i64) -> AssetTrack {
    AssetTrack {
        asset: source(),
        track_id: 0,
        kind: MediaKind::Video,
        natural_size,
        preferred_transform: transform,
        time_range: TimeRange::from_zero(MediaTime::new(secs * 600, 600)),
        nominal_frame_rate: Some(30.0),
    }
}

pub fn landscape_video() -> AssetTrack {
    video_track(Size::new(1920.0, 1080.0), AffineTransform::IDENTITY, 8)
}

pub fn audio_track(secs: i64) -> AssetTrack {
    AssetTrack {
        asset: source(),
        track_id: 1,
        kind: MediaKind::Audio,
        natural_size: Size::default(),
        preferred_transform: AffineTransform::IDENTITY,
        time_range: TimeRange::from_zero(MediaTime::new(secs * 44_100, 44_100)),
        nominal_frame_rate: None,
    }
}

pub fn square_watermark() -> WatermarkImage {
    WatermarkImage::new("/media/seal.png", Size::new(256.0, 256.0)).unwrap()
}

pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();
    files
}
