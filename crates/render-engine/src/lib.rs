//! Slidecast Render Engine
//!
//! Turns pages into pixels and pixels into video.
//!
//! # Pipeline Architecture
//!
//! ```text
//! Page ──┐
//!        ├── Background (color fill / cover-fit image)
//! progress                │
//!        │                ├── Elements, back to front
//!        └── Animation ───┘   (alpha, slide offset, zoom)
//!                                   │
//!                                   ▼
//!                          Frame (tiny-skia Pixmap)
//!                                   │
//!            paced at 1/fps         ▼
//!                            EncoderSink
//!                    (ffmpeg webm/mp4, PNG sequence)
//!                                   │
//!                                   ▼
//!                             project.webm
//! ```

pub mod animation;
pub mod color;
pub mod compositor;
pub mod export;
pub mod fonts;
pub mod images;
pub mod sink;
pub mod text;

pub use compositor::*;
pub use export::*;
pub use sink::*;
