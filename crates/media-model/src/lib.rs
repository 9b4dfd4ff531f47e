//! vidmark Media Model
//!
//! Defines the data contracts shared by the watermark pipeline:
//! - **Time:** Rational media time and time ranges
//! - **Transform:** Display transforms and orientation classification
//! - **Geometry:** Frame geometry and watermark placement
//! - **Asset / Composition:** Source tracks and the editable timeline built from them
//! - **Render graph:** Layer stack and compositing instructions handed to the exporter
//!
//! Pixel coordinates use a top-left origin; `x` grows right, `y` grows down.

pub mod asset;
pub mod composition;
pub mod export;
pub mod geometry;
pub mod render_graph;
pub mod time;
pub mod transform;

pub use asset::*;
pub use composition::*;
pub use export::*;
pub use geometry::*;
pub use render_graph::*;
pub use time::*;
pub use transform::*;
