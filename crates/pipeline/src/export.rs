//! Export execution.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use vidmark_common::error::{VidmarkError, VidmarkResult};
use vidmark_media_model::asset::MediaKind;
use vidmark_media_model::composition::Composition;
use vidmark_media_model::export::{ContainerFormat, ExportPreset, ExportProgress, ExportStatus};
use vidmark_media_model::render_graph::VideoComposition;

use crate::bridge::suspend;
use crate::toolkit::{Completion, ExportCompletion, MediaToolkit, ProgressSink};

/// An export job ready to be handed to a toolkit.
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// Timeline to render.
    pub composition: Composition,

    /// Layer stack and instructions applied while rendering.
    pub video_composition: VideoComposition,

    /// Output file path.
    pub output_path: PathBuf,

    /// Quality preset.
    pub preset: ExportPreset,

    /// Output container.
    pub container: ContainerFormat,
}

/// Forwards progress to a sink, dropping values that would move it
/// backwards.
///
/// Values are clamped to `[0.0, 1.0]`; NaN is ignored.
pub struct MonotonicProgress {
    sink: ProgressSink,
    last_bits: AtomicU64,
}

impl MonotonicProgress {
    pub fn new(sink: ProgressSink) -> Self {
        Self {
            sink,
            last_bits: AtomicU64::new((-1.0f64).to_bits()),
        }
    }

    /// Forward `progress` if it does not regress. Returns whether it was
    /// forwarded.
    pub fn report(&self, progress: ExportProgress) -> bool {
        if progress.fraction.is_nan() {
            return false;
        }
        let fraction = progress.fraction.clamp(0.0, 1.0);
        let mut current = self.last_bits.load(Ordering::Acquire);
        loop {
            if fraction < f64::from_bits(current) {
                return false;
            }
            match self.last_bits.compare_exchange_weak(
                current,
                fraction.to_bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
        (self.sink)(ExportProgress { fraction });
        true
    }

    /// Wrap into a sink that can be handed to a toolkit.
    pub fn into_sink(self) -> ProgressSink {
        let filter = Arc::new(self);
        Arc::new(move |progress| {
            filter.report(progress);
        })
    }
}

/// Run `job` on `toolkit` and wait for its terminal status.
///
/// Returns `Completed` on success. A non-completed terminal status with a
/// toolkit error attached fails with [`VidmarkError::ExportFailed`]; one
/// without an error is returned as-is for the caller to judge.
pub async fn run_export(
    toolkit: &dyn MediaToolkit,
    job: ExportJob,
    progress: Option<ProgressSink>,
) -> VidmarkResult<ExportStatus> {
    run_export_holding(toolkit, job, progress, ()).await
}

/// Like [`run_export`], but keeps `held` alive until the toolkit reports
/// the terminal event or drops its completion handler. `held` is released
/// before the waiting caller resumes.
///
/// `held` outlives the returned future if the caller stops waiting while
/// the job is still running.
pub async fn run_export_holding<H>(
    toolkit: &dyn MediaToolkit,
    job: ExportJob,
    progress: Option<ProgressSink>,
    held: H,
) -> VidmarkResult<ExportStatus>
where
    H: Send + 'static,
{
    if !toolkit.supports_export(job.preset, job.container) {
        return Err(VidmarkError::export_session_unavailable(format!(
            "{} cannot export preset {} to {}",
            toolkit.name(),
            job.preset.as_str(),
            job.container.extension()
        )));
    }
    if job.composition.track_of_kind(MediaKind::Video).is_none() {
        return Err(VidmarkError::export_session_unavailable(
            "composition has no video track",
        ));
    }

    tracing::info!(
        backend = toolkit.name(),
        output = %job.output_path.display(),
        preset = job.preset.as_str(),
        container = job.container.extension(),
        "Starting export"
    );

    let progress = progress.map(|sink| MonotonicProgress::new(sink).into_sink());
    let completion: ExportCompletion = suspend("export", |done: Completion<ExportCompletion>| {
        let release: Completion<ExportCompletion> = Box::new(move |completion: ExportCompletion| {
            drop(held);
            done(completion);
        });
        toolkit.export(job, progress, release)
    })
    .await
    .map_err(VidmarkError::export_failed)?;

    match (completion.status, completion.error) {
        (ExportStatus::Completed, error) => {
            if let Some(error) = error {
                tracing::warn!(%error, "Export completed but toolkit reported an error");
            }
            tracing::info!("Export completed");
            Ok(ExportStatus::Completed)
        }
        (status, Some(error)) => {
            tracing::warn!(%status, %error, "Export did not complete");
            Err(VidmarkError::export_failed(error))
        }
        (status, None) => {
            tracing::warn!(%status, "Export ended without completing");
            Ok(status)
        }
    }
}
