//! Project files on disk.
//!
//! A project file is a single pretty-printed JSON document holding the page
//! sequence plus a little metadata. Image sources are embedded as `data:`
//! URLs so the file is self-contained.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::element::ElementKind;
use crate::page::{Background, Page};
use crate::project::{Project, ProjectError};
use crate::template::Template;

/// Current schema version.
pub const SCHEMA_VERSION: &str = "1.0";

/// Canvas size recorded with the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 450,
            height: 800,
        }
    }
}

/// Top-level project file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Schema version.
    pub version: String,

    /// Human-readable project name.
    pub name: String,

    /// Creation timestamp (RFC 3339).
    pub created_at: String,

    /// Last modified timestamp (RFC 3339).
    pub modified_at: String,

    /// Live canvas size the project was authored on.
    #[serde(default)]
    pub canvas: CanvasSize,

    /// Ordered pages.
    pub pages: Vec<Page>,
}

/// A project file together with where it lives.
#[derive(Debug, Clone)]
pub struct LoadedProject {
    pub path: PathBuf,
    pub file: ProjectFile,
}

impl ProjectFile {
    /// A new document with one page seeded from `template`.
    pub fn new(name: impl Into<String>, canvas: CanvasSize, template: &Template) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: SCHEMA_VERSION.to_string(),
            name: name.into(),
            created_at: now.clone(),
            modified_at: now,
            canvas,
            pages: vec![Page::from_template(template)],
        }
    }

    /// Build the live project from this document.
    pub fn to_project(&self) -> Result<Project, ProjectError> {
        Project::from_pages(self.pages.clone())
    }

    /// Replace the pages with the live project's and bump the modified time.
    pub fn update_from(&mut self, project: &Project) {
        self.pages = project.pages().to_vec();
        self.modified_at = chrono::Utc::now().to_rfc3339();
    }

    /// Report structural problems without failing.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];

        if self.pages.is_empty() {
            errors.push("Project has no pages".to_string());
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            errors.push(format!(
                "Canvas size {}x{} is empty",
                self.canvas.width, self.canvas.height
            ));
        }

        for (p, page) in self.pages.iter().enumerate() {
            if !page.duration.is_finite() || page.duration <= 0.0 {
                errors.push(format!("Page {}: duration {} is not positive", p + 1, page.duration));
            }
            if let Background::Image(src) = &page.background {
                if let Some(problem) = check_source(src) {
                    errors.push(format!("Page {} background: {problem}", p + 1));
                }
            }
            for (e, element) in page.elements.iter().enumerate() {
                let frame = &element.frame;
                if frame.width < crate::geometry::MIN_ELEMENT_WIDTH
                    || frame.height < crate::geometry::MIN_ELEMENT_HEIGHT
                {
                    errors.push(format!(
                        "Page {} element {}: size {}x{} below minimum",
                        p + 1,
                        e + 1,
                        frame.width,
                        frame.height
                    ));
                }
                if let ElementKind::Image(image) = &element.kind {
                    if let Some(problem) = check_source(&image.src) {
                        errors.push(format!("Page {} element {}: {problem}", p + 1, e + 1));
                    }
                }
            }
        }

        errors
    }
}

impl LoadedProject {
    /// Load a project file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let path = path.as_ref().to_path_buf();
        let json = std::fs::read_to_string(&path).map_err(|e| ProjectError::IoError {
            path: path.clone(),
            source: e,
        })?;
        let file: ProjectFile =
            serde_json::from_str(&json).map_err(|e| ProjectError::ParseError {
                path: path.clone(),
                source: e,
            })?;
        Ok(Self { path, file })
    }

    /// Save the project file, creating parent directories as needed.
    pub fn save(&self) -> Result<(), ProjectError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ProjectError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json =
            serde_json::to_string_pretty(&self.file).map_err(|e| ProjectError::ParseError {
                path: self.path.clone(),
                source: e,
            })?;
        std::fs::write(&self.path, json).map_err(|e| ProjectError::IoError {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Create and save a new project file.
    pub fn create(
        path: impl AsRef<Path>,
        name: impl Into<String>,
        canvas: CanvasSize,
        template: &Template,
    ) -> Result<Self, ProjectError> {
        let loaded = Self {
            path: path.as_ref().to_path_buf(),
            file: ProjectFile::new(name, canvas, template),
        };
        loaded.save()?;
        Ok(loaded)
    }
}

/// Cheap structural check of an image reference. Decoding is left to the
/// renderer; this only catches references that can never resolve.
fn check_source(src: &str) -> Option<String> {
    if src.trim().is_empty() {
        return Some("empty image source".to_string());
    }
    if let Some(rest) = src.strip_prefix("data:") {
        if !rest.contains(',') {
            return Some("malformed data URL".to_string());
        }
        return None;
    }
    if src.starts_with("http://") || src.starts_with("https://") {
        return None;
    }
    let path = src.strip_prefix("file://").unwrap_or(src);
    if !Path::new(path).exists() {
        return Some(format!("image file missing: {path}"));
    }
    None
}
