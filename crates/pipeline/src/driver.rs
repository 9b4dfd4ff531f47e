//! Pipeline driver: runs the stages in order and times the whole run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::OwnedMutexGuard;

use vidmark_common::clock::{format_elapsed, ProcessingClock};
use vidmark_common::config::ExportDefaults;
use vidmark_common::error::{VidmarkError, VidmarkResult};
use vidmark_media_model::asset::{SourceAsset, WatermarkImage};
use vidmark_media_model::export::{ContainerFormat, ExportPreset, ExportStatus};
use vidmark_media_model::geometry::{FrameGeometry, PlacementRule};
use vidmark_media_model::transform::{
    ExactMatchClassifier, OrientationClassifier, ToleranceClassifier,
};

use crate::export::{run_export_holding, ExportJob};
use crate::render_graph::RenderGraphBuilder;
use crate::timeline::build_composition;
use crate::toolkit::{MediaToolkit, ProgressSink};

/// Tunables for a pipeline instance.
#[derive(Clone)]
pub struct PipelineOptions {
    pub placement: PlacementRule,
    pub preset: ExportPreset,
    pub container: ContainerFormat,
    pub frame_rate: u32,
    pub classifier: Arc<dyn OrientationClassifier>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            placement: PlacementRule::quarter_width(),
            preset: ExportPreset::HighestQuality,
            container: ContainerFormat::Mp4,
            frame_rate: 30,
            classifier: Arc::new(ExactMatchClassifier),
        }
    }
}

impl From<&ExportDefaults> for PipelineOptions {
    fn from(defaults: &ExportDefaults) -> Self {
        let classifier: Arc<dyn OrientationClassifier> = match defaults.orientation_tolerance {
            Some(epsilon) => Arc::new(ToleranceClassifier::new(epsilon)),
            None => Arc::new(ExactMatchClassifier),
        };
        Self {
            placement: defaults.placement,
            preset: defaults.preset,
            container: defaults.container,
            frame_rate: defaults.frame_rate,
            classifier,
        }
    }
}

impl std::fmt::Debug for PipelineOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineOptions")
            .field("placement", &self.placement)
            .field("preset", &self.preset)
            .field("container", &self.container)
            .field("frame_rate", &self.frame_rate)
            .finish_non_exhaustive()
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct WatermarkOutcome {
    /// Wall-clock time from start of the run to the export's terminal event.
    pub elapsed: Duration,

    /// Terminal export status. `Completed` unless the toolkit ended the
    /// job without reporting an error.
    pub status: ExportStatus,

    pub output_path: PathBuf,

    /// Orientation and render size used for the export.
    pub geometry: FrameGeometry,
}

type PathLocks = Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>;

/// Watermarks source videos with one toolkit and one set of options.
///
/// Runs against the same output path through one pipeline are serialized;
/// runs against different paths proceed independently.
pub struct WatermarkPipeline {
    toolkit: Arc<dyn MediaToolkit>,
    options: PipelineOptions,
    output_locks: PathLocks,
}

impl WatermarkPipeline {
    pub fn new(toolkit: Arc<dyn MediaToolkit>, options: PipelineOptions) -> Self {
        Self {
            toolkit,
            options,
            output_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn toolkit(&self) -> &dyn MediaToolkit {
        self.toolkit.as_ref()
    }

    /// Overlay `watermark` on `asset` and write the result to `output_path`.
    ///
    /// Any file already at `output_path` is removed first; failing to remove
    /// it is logged and ignored. Stage errors are returned unchanged.
    ///
    /// Once the export has started, the path stays locked until the toolkit
    /// reports its terminal event, even if this future is dropped first.
    pub async fn run(
        &self,
        asset: &SourceAsset,
        watermark: &WatermarkImage,
        output_path: &Path,
        progress: Option<ProgressSink>,
    ) -> VidmarkResult<WatermarkOutcome> {
        let _prune = PruneOnDrop(&self.output_locks);
        let guard = self.path_lock(output_path)?.lock_owned().await;
        self.run_locked(asset, watermark, output_path, progress, guard)
            .await
    }

    async fn run_locked(
        &self,
        asset: &SourceAsset,
        watermark: &WatermarkImage,
        output_path: &Path,
        progress: Option<ProgressSink>,
        guard: OwnedMutexGuard<()>,
    ) -> VidmarkResult<WatermarkOutcome> {
        let clock = ProcessingClock::start();
        tracing::info!(
            source = %asset.location().display(),
            watermark = %watermark.path().display(),
            output = %output_path.display(),
            started = clock.started_wall(),
            "Starting watermark run"
        );

        remove_stale_output(output_path).await;

        let mut timeline = build_composition(self.toolkit.as_ref(), asset).await?;

        let builder = RenderGraphBuilder::new(
            self.options.placement,
            Arc::clone(&self.options.classifier),
            self.options.frame_rate,
        );
        let plan = builder.build(&timeline, watermark);

        timeline
            .composition
            .set_preferred_transform(
                timeline.video_track_id,
                timeline.video_track.preferred_transform,
            )
            .map_err(VidmarkError::audio_video_copy_failed)?;

        let job = ExportJob {
            composition: timeline.composition,
            video_composition: plan.video_composition,
            output_path: output_path.to_path_buf(),
            preset: self.options.preset,
            container: self.options.container,
        };
        let status = run_export_holding(self.toolkit.as_ref(), job, progress, guard).await?;

        let elapsed = clock.elapsed();
        tracing::info!(
            %status,
            elapsed = %format_elapsed(elapsed),
            output = %output_path.display(),
            "Watermark run finished"
        );

        Ok(WatermarkOutcome {
            elapsed,
            status,
            output_path: output_path.to_path_buf(),
            geometry: plan.geometry,
        })
    }

    fn path_lock(&self, output_path: &Path) -> VidmarkResult<Arc<tokio::sync::Mutex<()>>> {
        let mut locks = self
            .output_locks
            .lock()
            .map_err(|_| anyhow::anyhow!("output lock registry poisoned"))?;
        prune_idle(&mut locks);
        Ok(Arc::clone(
            locks.entry(output_path.to_path_buf()).or_default(),
        ))
    }
}

/// Forget locks nobody is holding or waiting on.
fn prune_idle(locks: &mut HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>) {
    locks.retain(|_, lock| Arc::strong_count(lock) > 1);
}

/// Prunes the lock registry when a run ends, including when its future is
/// dropped mid-flight.
struct PruneOnDrop<'a>(&'a PathLocks);

impl Drop for PruneOnDrop<'_> {
    fn drop(&mut self) {
        if let Ok(mut locks) = self.0.lock() {
            prune_idle(&mut locks);
        }
    }
}

async fn remove_stale_output(output_path: &Path) {
    match tokio::fs::remove_file(output_path).await {
        Ok(()) => tracing::debug!(path = %output_path.display(), "Removed stale output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %output_path.display(), error = %e, "Could not remove stale output")
        }
    }
}
