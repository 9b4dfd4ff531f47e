//! Render graph construction: video layer, watermark overlay, and the
//! compositing instruction that keeps the source orientation.

use std::sync::Arc;

use vidmark_media_model::asset::WatermarkImage;
use vidmark_media_model::geometry::{FrameGeometry, PlacementRule, Rect};
use vidmark_media_model::render_graph::{
    CompositionInstruction, Layer, LayerContents, LayerInstruction, LayerRole, RenderGraph,
    VideoComposition,
};
use vidmark_media_model::time::{MediaTime, TimeRange};
use vidmark_media_model::transform::{ExactMatchClassifier, OrientationClassifier};

use crate::timeline::ComposedTimeline;

/// Geometry and render description for one export.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    pub geometry: FrameGeometry,
    pub video_composition: VideoComposition,
}

/// Builds the layer stack for a composed timeline.
#[derive(Clone)]
pub struct RenderGraphBuilder {
    placement: PlacementRule,
    classifier: Arc<dyn OrientationClassifier>,
    frame_duration: MediaTime,
}

impl RenderGraphBuilder {
    pub fn new(
        placement: PlacementRule,
        classifier: Arc<dyn OrientationClassifier>,
        frame_rate: u32,
    ) -> Self {
        let timescale = i32::try_from(frame_rate.max(1)).unwrap_or(i32::MAX);
        Self {
            placement,
            classifier,
            frame_duration: MediaTime::new(1, timescale),
        }
    }

    pub fn placement(&self) -> PlacementRule {
        self.placement
    }

    /// Resolve orientation, lay out the layers, and emit one instruction
    /// spanning the whole composition.
    pub fn build(&self, timeline: &ComposedTimeline, watermark: &WatermarkImage) -> RenderPlan {
        let video_track = &timeline.video_track;
        let geometry = FrameGeometry::resolve(
            video_track.natural_size,
            &video_track.preferred_transform,
            self.classifier.as_ref(),
        );
        let render_size = geometry.render_size;
        let full_frame = Rect::from_size(render_size);

        let watermark_frame = self
            .placement
            .frame_for(render_size, watermark.aspect_ratio());

        let video_layer = Layer::new(LayerRole::Video, full_frame, LayerContents::VideoFrames);
        let mut overlay_layer = Layer::new(LayerRole::Overlay, full_frame, LayerContents::Empty);
        overlay_layer.add_sublayer(Layer::new(
            LayerRole::Watermark,
            watermark_frame,
            LayerContents::Image {
                path: watermark.path().to_path_buf(),
            },
        ));

        let mut root = Layer::new(LayerRole::Root, full_frame, LayerContents::Empty);
        root.add_sublayer(video_layer);
        root.add_sublayer(overlay_layer);

        let instruction = CompositionInstruction {
            time_range: TimeRange::from_zero(timeline.composition.duration()),
            layer_instructions: vec![LayerInstruction {
                track_id: timeline.video_track_id,
                transform: video_track.preferred_transform,
            }],
        };

        tracing::debug!(
            orientation = geometry.orientation.as_str(),
            portrait = geometry.is_portrait,
            render_width = render_size.width,
            render_height = render_size.height,
            watermark_x = watermark_frame.x,
            watermark_y = watermark_frame.y,
            watermark_width = watermark_frame.width,
            watermark_height = watermark_frame.height,
            "Render graph built"
        );

        RenderPlan {
            geometry,
            video_composition: VideoComposition {
                render_size,
                frame_duration: self.frame_duration,
                render_graph: RenderGraph { render_size, root },
                instructions: vec![instruction],
            },
        }
    }
}

impl Default for RenderGraphBuilder {
    fn default() -> Self {
        Self::new(PlacementRule::quarter_width(), Arc::new(ExactMatchClassifier), 30)
    }
}

impl std::fmt::Debug for RenderGraphBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderGraphBuilder")
            .field("placement", &self.placement)
            .field("frame_duration", &self.frame_duration)
            .finish_non_exhaustive()
    }
}
