//! Slidecast Project Model
//!
//! Defines the core data contracts for Slidecast projects:
//! - **Geometry:** element frames and the pure drag/resize/rotate transforms
//! - **Elements:** positioned text and image objects with entrance animations
//! - **Pages:** ordered slides with a background and a display duration
//! - **Project:** the live page sequence with its editing cursors
//! - **Templates:** built-in page seeds
//! - **Document:** the project file on disk
//!
//! All coordinates are canvas pixels with the origin at the top-left.

pub mod document;
pub mod element;
pub mod geometry;
pub mod page;
pub mod project;
pub mod template;

pub use document::*;
pub use element::*;
pub use geometry::*;
pub use page::*;
pub use project::*;
pub use template::*;
