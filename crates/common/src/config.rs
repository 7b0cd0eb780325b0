//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory where project files are stored.
    pub projects_dir: PathBuf,

    /// Editing canvas geometry.
    pub canvas: CanvasDefaults,

    /// Default export settings.
    pub export: ExportDefaults,

    /// Editor behaviour.
    pub editor: EditorDefaults,

    /// Font discovery.
    pub fonts: FontConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Size of the live editing canvas, in CSS pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasDefaults {
    pub width: u32,
    pub height: u32,

    /// Exported frames are never smaller than this on either side.
    pub min_export_dimension: u32,
}

/// Default export parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    /// Frames per second fed to the encoder.
    pub fps: u32,

    /// Container format name (`webm`, `mp4`, `png-sequence`).
    pub format: String,

    /// Default artifact file name.
    pub file_name: String,

    /// Wait one frame interval between frames so the sink receives them
    /// at the nominal rate.
    pub pace_frames: bool,
}

/// Editor behaviour knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorDefaults {
    /// Maximum number of undo snapshots retained.
    pub history_capacity: usize,

    /// Duration given to pages that do not declare one.
    pub default_page_duration_secs: f64,

    pub zoom_min: f64,
    pub zoom_max: f64,
    pub zoom_step: f64,
}

/// Font discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Load fonts installed on the host.
    pub load_system_fonts: bool,

    /// Additional directories scanned for font files.
    pub extra_font_dirs: Vec<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "slidecast=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            projects_dir: dirs_default_projects(),
            canvas: CanvasDefaults::default(),
            export: ExportDefaults::default(),
            editor: EditorDefaults::default(),
            fonts: FontConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CanvasDefaults {
    fn default() -> Self {
        Self {
            width: 450,
            height: 800,
            min_export_dimension: 320,
        }
    }
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            fps: 30,
            format: "webm".to_string(),
            file_name: "project.webm".to_string(),
            pace_frames: true,
        }
    }
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            default_page_duration_secs: 2.0,
            zoom_min: 0.5,
            zoom_max: 2.0,
            zoom_step: 0.1,
        }
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            load_system_fonts: true,
            extra_font_dirs: vec![],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl CanvasDefaults {
    /// Export resolution for this canvas: each side floored at
    /// `min_export_dimension`.
    pub fn export_size(&self) -> (u32, u32) {
        (
            self.width.max(self.min_export_dimension),
            self.height.max(self.min_export_dimension),
        )
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("slidecast").join("config.json")
}

/// Default projects directory.
fn dirs_default_projects() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("slidecast").join("projects")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_editor_canvas() {
        let config = AppConfig::default();
        assert_eq!(config.canvas.width, 450);
        assert_eq!(config.canvas.height, 800);
        assert_eq!(config.export.fps, 30);
        assert_eq!(config.editor.history_capacity, 50);
    }

    #[test]
    fn test_export_size_floors_small_canvas() {
        let canvas = CanvasDefaults {
            width: 200,
            height: 900,
            min_export_dimension: 320,
        };
        assert_eq!(canvas.export_size(), (320, 900));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig = serde_json::from_str(r#"{"export": {"fps": 24}}"#).unwrap();
        assert_eq!(parsed.export.fps, 24);
        assert_eq!(parsed.export.file_name, "project.webm");
        assert_eq!(parsed.editor.zoom_max, 2.0);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.editor.history_capacity = 12;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.editor.history_capacity, 12);
    }

    #[test]
    fn test_unparsable_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.export.fps, 30);
    }
}
