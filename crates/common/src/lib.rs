//! vidmark Common Utilities
//!
//! Shared infrastructure for all vidmark crates:
//! - Error taxonomy and result aliases
//! - Processing clock for wall-clock timing of a pipeline run
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
