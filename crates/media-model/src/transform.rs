//! Display transforms and orientation classification.
//!
//! A video track stores frames in its natural (encoded) orientation and
//! carries an affine transform telling players how to rotate them for
//! display. Only the four canonical rotations are recognized; anything
//! else is treated as upright landscape.

use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// A 2x3 affine matrix `[a b 0; c d 0; tx ty 1]` (row-vector convention).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl AffineTransform {
    pub const IDENTITY: AffineTransform = AffineTransform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub const fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    /// Canonical transform for a clockwise display rotation of a frame with
    /// the given natural size. The translation keeps the rotated frame in
    /// the positive quadrant. Returns `None` for angles that are not a
    /// multiple of 90 degrees.
    pub fn from_rotation_degrees(degrees: i32, natural_size: Size) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Self::IDENTITY),
            90 => Some(Self::new(0.0, 1.0, -1.0, 0.0, natural_size.height, 0.0)),
            180 => Some(Self::new(
                -1.0,
                0.0,
                0.0,
                -1.0,
                natural_size.width,
                natural_size.height,
            )),
            270 => Some(Self::new(0.0, -1.0, 1.0, 0.0, 0.0, natural_size.width)),
            _ => None,
        }
    }

    /// Apply the linear part and translation to a point.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        )
    }

    fn linear(&self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Which way the top of the encoded image points after display rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Up,
    Down,
    Left,
    Right,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Result of classifying a display transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrientationInfo {
    pub orientation: Orientation,
    pub is_portrait: bool,
}

impl OrientationInfo {
    /// Upright, non-portrait. Returned for any unrecognized transform.
    pub const DEFAULT: OrientationInfo = OrientationInfo {
        orientation: Orientation::Up,
        is_portrait: false,
    };
}

/// Recognized linear coefficients `(a, b, c, d)` in match order.
const CANONICAL_ROTATIONS: [([f64; 4], OrientationInfo); 4] = [
    (
        [0.0, 1.0, -1.0, 0.0],
        OrientationInfo {
            orientation: Orientation::Right,
            is_portrait: true,
        },
    ),
    (
        [0.0, -1.0, 1.0, 0.0],
        OrientationInfo {
            orientation: Orientation::Left,
            is_portrait: true,
        },
    ),
    (
        [1.0, 0.0, 0.0, 1.0],
        OrientationInfo {
            orientation: Orientation::Up,
            is_portrait: false,
        },
    ),
    (
        [-1.0, 0.0, 0.0, -1.0],
        OrientationInfo {
            orientation: Orientation::Down,
            is_portrait: false,
        },
    ),
];

/// Maps a display transform to an orientation.
///
/// Translation never participates in classification.
pub trait OrientationClassifier: Send + Sync {
    fn classify(&self, transform: &AffineTransform) -> OrientationInfo;
}

/// Exact coefficient matching against the canonical rotations.
///
/// No epsilon: a coefficient of `0.9999999` does not match `1.0` and the
/// transform falls back to [`OrientationInfo::DEFAULT`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExactMatchClassifier;

impl OrientationClassifier for ExactMatchClassifier {
    fn classify(&self, transform: &AffineTransform) -> OrientationInfo {
        let linear = transform.linear();
        CANONICAL_ROTATIONS
            .iter()
            .find(|(coefficients, _)| *coefficients == linear)
            .map(|(_, info)| *info)
            .unwrap_or(OrientationInfo::DEFAULT)
    }
}

/// Canonical rotations matched within `epsilon` per coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceClassifier {
    pub epsilon: f64,
}

impl ToleranceClassifier {
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon: epsilon.abs(),
        }
    }
}

impl OrientationClassifier for ToleranceClassifier {
    fn classify(&self, transform: &AffineTransform) -> OrientationInfo {
        let linear = transform.linear();
        CANONICAL_ROTATIONS
            .iter()
            .find(|(coefficients, _)| {
                coefficients
                    .iter()
                    .zip(linear.iter())
                    .all(|(expected, actual)| (expected - actual).abs() <= self.epsilon)
            })
            .map(|(_, info)| *info)
            .unwrap_or(OrientationInfo::DEFAULT)
    }
}

/// Classify with exact matching.
pub fn resolve_orientation(transform: &AffineTransform) -> OrientationInfo {
    ExactMatchClassifier.classify(transform)
}
