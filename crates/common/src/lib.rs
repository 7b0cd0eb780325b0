//! Slidecast Common Utilities
//!
//! Shared infrastructure for all Slidecast crates:
//! - Error taxonomy and result aliases
//! - Frame clock used to pace rendering and export
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
