//! Error types shared across Slidecast crates.

use std::path::PathBuf;

/// Top-level error type for Slidecast operations.
#[derive(Debug, thiserror::Error)]
pub enum SlidecastError {
    /// The user asked for something the project rules forbid
    /// (for example deleting the last page). State is left unchanged.
    #[error("{message}")]
    UserConstraint { message: String },

    /// A capability the host must provide is missing (for example no
    /// video encoder). Raised before any work starts.
    #[error("Resource unavailable: {message}")]
    ResourceUnavailable { message: String },

    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Project error: {message}")]
    Project { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using SlidecastError.
pub type SlidecastResult<T> = Result<T, SlidecastError>;

impl SlidecastError {
    pub fn user_constraint(msg: impl Into<String>) -> Self {
        Self::UserConstraint {
            message: msg.into(),
        }
    }

    pub fn resource_unavailable(msg: impl Into<String>) -> Self {
        Self::ResourceUnavailable {
            message: msg.into(),
        }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn project(msg: impl Into<String>) -> Self {
        Self::Project {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error is a refused user request rather than a failure.
    pub fn is_user_constraint(&self) -> bool {
        matches!(self, Self::UserConstraint { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_constraint_message_is_shown_verbatim() {
        let err = SlidecastError::user_constraint("You must have at least one page");
        assert_eq!(err.to_string(), "You must have at least one page");
        assert!(err.is_user_constraint());
    }

    #[test]
    fn test_resource_unavailable_is_not_user_constraint() {
        let err = SlidecastError::resource_unavailable("ffmpeg not found");
        assert!(!err.is_user_constraint());
        assert!(err.to_string().contains("ffmpeg not found"));
    }
}
