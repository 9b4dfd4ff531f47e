//! Frame geometry and watermark placement.
//!
//! All values are in render-size pixels with a top-left origin.

use serde::{Deserialize, Serialize};

use crate::transform::{AffineTransform, Orientation, OrientationClassifier};

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width and height exchanged.
    pub fn swapped(&self) -> Size {
        Size {
            width: self.height,
            height: self.width,
        }
    }

    /// Width over height. `None` when either side is not a positive,
    /// finite number.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.width / self.height)
    }

    /// True unless both sides are positive and finite.
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin covering `size`.
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether `other` lies entirely inside this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Orientation-corrected geometry of one video track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub orientation: Orientation,
    pub is_portrait: bool,
    /// Display size: the natural size, swapped when portrait.
    pub render_size: Size,
}

impl FrameGeometry {
    /// Classify `transform` and derive the render size from `natural_size`.
    pub fn resolve(
        natural_size: Size,
        transform: &AffineTransform,
        classifier: &dyn OrientationClassifier,
    ) -> Self {
        let info = classifier.classify(transform);
        let render_size = if info.is_portrait {
            natural_size.swapped()
        } else {
            natural_size
        };
        Self {
            orientation: info.orientation,
            is_portrait: info.is_portrait,
            render_size,
        }
    }
}

/// Fixed fractional layout for the watermark.
///
/// The watermark is `render.width * width_fraction` wide and keeps its
/// aspect ratio. Its origin is expressed in multiples of its own size:
/// `x = width * x_offset`, `y = height * y_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementRule {
    pub width_fraction: f64,
    pub x_offset: f64,
    pub y_offset: f64,
}

impl PlacementRule {
    pub const fn new(width_fraction: f64, x_offset: f64, y_offset: f64) -> Self {
        Self {
            width_fraction,
            x_offset,
            y_offset,
        }
    }

    /// Quarter of the frame wide, one watermark-width in from the left,
    /// flush with the top.
    pub const fn quarter_width() -> Self {
        Self::new(0.25, 1.0, 0.0)
    }

    /// Spans the full frame width at the top.
    pub const fn full_width_top() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Horizontally centred at the top, `width_fraction` of the frame wide.
    pub fn centered(width_fraction: f64) -> Self {
        let offset = if width_fraction > 0.0 {
            (1.0 - width_fraction) / (2.0 * width_fraction)
        } else {
            0.0
        };
        Self::new(width_fraction, offset, 0.0)
    }

    /// Fractions must be finite, the width fraction in `(0, 1]`, offsets
    /// non-negative.
    pub fn is_valid(&self) -> bool {
        self.width_fraction.is_finite()
            && self.x_offset.is_finite()
            && self.y_offset.is_finite()
            && self.width_fraction > 0.0
            && self.width_fraction <= 1.0
            && self.x_offset >= 0.0
            && self.y_offset >= 0.0
    }

    /// Watermark rectangle inside a frame of `render_size` for an image of
    /// width/height ratio `aspect`.
    pub fn frame_for(&self, render_size: Size, aspect: f64) -> Rect {
        let width = render_size.width * self.width_fraction;
        let height = width / aspect;
        Rect::new(
            width * self.x_offset,
            height * self.y_offset,
            width,
            height,
        )
    }
}

impl Default for PlacementRule {
    fn default() -> Self {
        Self::quarter_width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{ExactMatchClassifier, ToleranceClassifier};
    use proptest::prelude::*;

    #[test]
    fn test_portrait_swaps_render_size() {
        let natural = Size::new(1920.0, 1080.0);
        let transform = AffineTransform::new(0.0, 1.0, -1.0, 0.0, 1080.0, 0.0);
        let geometry = FrameGeometry::resolve(natural, &transform, &ExactMatchClassifier);
        assert!(geometry.is_portrait);
        assert_eq!(geometry.orientation, Orientation::Right);
        assert_eq!(geometry.render_size, Size::new(1080.0, 1920.0));
    }

    #[test]
    fn test_landscape_keeps_render_size() {
        let natural = Size::new(1920.0, 1080.0);
        let transform = AffineTransform::new(-1.0, 0.0, 0.0, -1.0, 1920.0, 1080.0);
        let geometry = FrameGeometry::resolve(natural, &transform, &ExactMatchClassifier);
        assert!(!geometry.is_portrait);
        assert_eq!(geometry.orientation, Orientation::Down);
        assert_eq!(geometry.render_size, natural);
    }

    #[test]
    fn test_classifier_is_pluggable() {
        let natural = Size::new(1280.0, 720.0);
        let transform = AffineTransform::new(0.0, -0.999_999_99, 1.0, 0.0, 0.0, 0.0);
        let exact = FrameGeometry::resolve(natural, &transform, &ExactMatchClassifier);
        let tolerant = FrameGeometry::resolve(natural, &transform, &ToleranceClassifier::new(1e-6));
        assert_eq!(exact.render_size, natural);
        assert_eq!(tolerant.render_size, natural.swapped());
        assert_eq!(tolerant.orientation, Orientation::Left);
    }

    #[test]
    fn test_quarter_width_rule_on_landscape() {
        let rect = PlacementRule::quarter_width().frame_for(Size::new(1920.0, 1080.0), 1.0);
        assert_eq!(rect, Rect::new(480.0, 0.0, 480.0, 480.0));
    }

    #[test]
    fn test_quarter_width_rule_wide_image() {
        let rect = PlacementRule::quarter_width().frame_for(Size::new(1920.0, 1080.0), 2.0);
        assert_eq!(rect.width, 480.0);
        assert_eq!(rect.height, 240.0);
    }

    #[test]
    fn test_full_width_top_rule() {
        let rect = PlacementRule::full_width_top().frame_for(Size::new(1080.0, 1920.0), 4.0);
        assert_eq!(rect, Rect::new(0.0, 0.0, 1080.0, 270.0));
    }

    #[test]
    fn test_centered_rule() {
        let render = Size::new(1000.0, 500.0);
        let rect = PlacementRule::centered(0.2).frame_for(render, 1.0);
        assert!((rect.x - 400.0).abs() < 1e-9);
        assert!((rect.x + rect.width / 2.0 - render.width / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_rule_validation() {
        assert!(PlacementRule::quarter_width().is_valid());
        assert!(!PlacementRule::new(0.0, 0.0, 0.0).is_valid());
        assert!(!PlacementRule::new(1.5, 0.0, 0.0).is_valid());
        assert!(!PlacementRule::new(0.5, -1.0, 0.0).is_valid());
        assert!(!PlacementRule::new(f64::NAN, 0.0, 0.0).is_valid());
    }

    #[test]
    fn test_size_aspect() {
        assert_eq!(Size::new(200.0, 100.0).aspect_ratio(), Some(2.0));
        assert_eq!(Size::new(200.0, 0.0).aspect_ratio(), None);
        assert!(Size::default().is_empty());
    }

    proptest! {
        #[test]
        fn prop_placement_keeps_aspect(
            width in 16.0f64..8192.0,
            height in 16.0f64..8192.0,
            aspect in 0.1f64..10.0,
            fraction in 0.01f64..1.0,
        ) {
            let rule = PlacementRule::new(fraction, 0.0, 0.0);
            let rect = rule.frame_for(Size::new(width, height), aspect);
            prop_assert!((rect.width - width * fraction).abs() < 1e-6);
            prop_assert!((rect.width / rect.height - aspect).abs() < 1e-6);
        }
    }
}
