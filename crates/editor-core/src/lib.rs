//! Slidecast Editor Core
//!
//! The interactive half of Slidecast. An [`EditorSession`] owns the live
//! project and routes every edit through the same path:
//!
//! ```text
//! pointer / key event
//!        │
//!        ▼
//! InteractionController ──► geometry transforms ──► Project
//!                                                     │
//!                               one commit per edit   ▼
//!                                                  History
//! ```

pub mod history;
pub mod interaction;
pub mod session;

pub use history::*;
pub use interaction::*;
pub use session::*;
