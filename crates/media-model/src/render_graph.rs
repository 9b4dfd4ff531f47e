//! Layer stack and compositing instructions for export.
//!
//! ```text
//! root (render size)
//!  ├── video    (render size, receives decoded frames)
//!  └── overlay  (render size)
//!       └── watermark (placement rule frame, image contents)
//! ```
//!
//! Sublayers draw in order, so the overlay sits on top of the video.

use std::path::PathBuf;

use serde::Serialize;

use crate::asset::TrackId;
use crate::geometry::{Rect, Size};
use crate::time::{MediaTime, TimeRange};
use crate::transform::AffineTransform;

/// What a layer represents in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerRole {
    Root,
    Video,
    Overlay,
    Watermark,
}

/// What a layer draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerContents {
    /// Draws nothing itself; only its sublayers.
    Empty,
    /// Rendered video frames of the composition.
    VideoFrames,
    /// A still image scaled to the layer frame.
    Image { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub role: LayerRole,
    pub frame: Rect,
    pub contents: LayerContents,
    pub sublayers: Vec<Layer>,
}

impl Layer {
    pub fn new(role: LayerRole, frame: Rect, contents: LayerContents) -> Self {
        Self {
            role,
            frame,
            contents,
            sublayers: Vec::new(),
        }
    }

    pub fn add_sublayer(&mut self, layer: Layer) {
        self.sublayers.push(layer);
    }

    /// Depth-first search for the first layer with `role`.
    pub fn find(&self, role: LayerRole) -> Option<&Layer> {
        if self.role == role {
            return Some(self);
        }
        self.sublayers.iter().find_map(|layer| layer.find(role))
    }
}

/// The complete layer stack for one export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderGraph {
    pub render_size: Size,
    pub root: Layer,
}

impl RenderGraph {
    pub fn video_layer(&self) -> Option<&Layer> {
        self.root.find(LayerRole::Video)
    }

    pub fn overlay_layer(&self) -> Option<&Layer> {
        self.root.find(LayerRole::Overlay)
    }

    pub fn watermark_layer(&self) -> Option<&Layer> {
        self.root.find(LayerRole::Watermark)
    }

    /// Rectangle of the watermark image in render coordinates.
    pub fn watermark_frame(&self) -> Option<Rect> {
        self.watermark_layer().map(|layer| layer.frame)
    }
}

/// Transform applied to one composition track while rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayerInstruction {
    pub track_id: TrackId,
    /// Transform set at time zero, held for the whole instruction.
    pub transform: AffineTransform,
}

/// Layer instructions active over a time range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionInstruction {
    pub time_range: TimeRange,
    pub layer_instructions: Vec<LayerInstruction>,
}

/// How the composition's video is rendered: frame geometry, timing, layer
/// stack, and per-range instructions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoComposition {
    pub render_size: Size,
    pub frame_duration: MediaTime,
    pub render_graph: RenderGraph,
    pub instructions: Vec<CompositionInstruction>,
}

impl VideoComposition {
    /// Frames per second implied by `frame_duration`.
    pub fn frame_rate(&self) -> Option<f64> {
        let secs = self.frame_duration.as_secs_f64();
        (secs.is_finite() && secs > 0.0).then(|| 1.0 / secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> RenderGraph {
        let size = Size::new(1920.0, 1080.0);
        let mut overlay = Layer::new(LayerRole::Overlay, Rect::from_size(size), LayerContents::Empty);
        overlay.add_sublayer(Layer::new(
            LayerRole::Watermark,
            Rect::new(480.0, 0.0, 480.0, 480.0),
            LayerContents::Image {
                path: PathBuf::from("seal.png"),
            },
        ));
        let mut root = Layer::new(LayerRole::Root, Rect::from_size(size), LayerContents::Empty);
        root.add_sublayer(Layer::new(
            LayerRole::Video,
            Rect::from_size(size),
            LayerContents::VideoFrames,
        ));
        root.add_sublayer(overlay);
        RenderGraph {
            render_size: size,
            root,
        }
    }

    #[test]
    fn test_find_layers_by_role() {
        let graph = sample_graph();
        assert_eq!(graph.video_layer().unwrap().contents, LayerContents::VideoFrames);
        assert_eq!(graph.overlay_layer().unwrap().sublayers.len(), 1);
        assert_eq!(
            graph.watermark_frame(),
            Some(Rect::new(480.0, 0.0, 480.0, 480.0))
        );
    }

    #[test]
    fn test_graph_serializes_for_debug_dumps() {
        let json = serde_json::to_value(sample_graph()).unwrap();
        assert_eq!(json["root"]["sublayers"][0]["role"], "video");
        assert_eq!(json["root"]["sublayers"][1]["sublayers"][0]["contents"]["type"], "image");
    }

    #[test]
    fn test_frame_rate_from_duration() {
        let composition = VideoComposition {
            render_size: Size::new(1920.0, 1080.0),
            frame_duration: MediaTime::new(1, 30),
            render_graph: sample_graph(),
            instructions: Vec::new(),
        };
        assert!((composition.frame_rate().unwrap() - 30.0).abs() < 1e-9);
    }
}
