//! vidmark Pipeline
//!
//! Overlays a still watermark on a source video and re-encodes it.
//!
//! # Pipeline Architecture
//!
//! ```text
//! source asset ──┐
//!                ├── Track Loader (video, optional audio)
//!                │         │
//!                │         ▼
//!                │   Timeline Composer ──► Composition
//!                │         │
//! watermark ─────┼── Render Graph Builder ◄── Orientation Resolver
//!                │         │
//!                │         ▼
//!                └── Export Executor ──► output file
//! ```
//!
//! The decode/encode engine is abstracted behind [`toolkit::MediaToolkit`];
//! [`ffmpeg::FfmpegToolkit`] drives the `ffmpeg`/`ffprobe` binaries.

mod bridge;

pub mod driver;
pub mod export;
pub mod ffmpeg;
pub mod render_graph;
pub mod resources;
pub mod timeline;
pub mod toolkit;
pub mod track_loader;

pub use driver::*;
pub use export::*;
pub use resources::*;
pub use toolkit::*;
