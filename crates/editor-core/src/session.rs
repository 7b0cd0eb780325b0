//! An owned editing session.
//!
//! All editor state lives here: the live project, its history, the gesture
//! state machine, the canvas bounds, and the zoom level. Every mutating
//! operation commits exactly one history entry when it changes something;
//! gestures commit once on pointer-up.

use serde::Serialize;
use slidecast_common::{AppConfig, EditorDefaults, SlidecastError, SlidecastResult};
use slidecast_project_model::{
    find_template, Background, CanvasBounds, CanvasSize, Element, ElementPatch, Page, Point,
    Project, ProjectError, ProjectFile, Template,
};

use crate::history::History;
use crate::interaction::{hit_test, HitTarget, InteractionController};

/// Map a model error onto the shared taxonomy. Refusals become user
/// constraints so the front end can show the message as-is.
pub fn map_project_error(err: ProjectError) -> SlidecastError {
    match err {
        ProjectError::Constraint { message } => SlidecastError::user_constraint(message),
        other => SlidecastError::project(other.to_string()),
    }
}

/// Keys the session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Delete,
    Other,
}

/// Modifier state for a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    /// Cmd on macOS.
    pub meta: bool,
    pub shift: bool,
}

/// Editor action bound to a key chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Undo,
    Redo,
    DeleteSelection,
}

impl KeyAction {
    /// Resolve a key chord. Ctrl and Cmd are interchangeable.
    pub fn from_key(key: Key, modifiers: Modifiers) -> Option<Self> {
        let command = modifiers.ctrl || modifiers.meta;
        match key {
            Key::Char(c) if command && c.eq_ignore_ascii_case(&'z') => Some(Self::Undo),
            Key::Char(c) if command && c.eq_ignore_ascii_case(&'y') => Some(Self::Redo),
            Key::Delete => Some(Self::DeleteSelection),
            _ => None,
        }
    }
}

/// One entry of the preview playback schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PreviewSlot {
    pub page_index: usize,
    pub duration_secs: f64,
}

/// The editor's owned state.
#[derive(Debug)]
pub struct EditorSession {
    project: Project,
    history: History,
    interaction: InteractionController,
    bounds: CanvasBounds,
    zoom: f64,
    defaults: EditorDefaults,
}

impl EditorSession {
    /// A fresh single-page project sized from the configuration.
    pub fn new(config: &AppConfig) -> SlidecastResult<Self> {
        let bounds = CanvasBounds::new(config.canvas.width as f64, config.canvas.height as f64);
        Self::with_project(Project::new(), bounds, config.editor.clone())
    }

    /// Start a session around an existing project.
    pub fn with_project(
        project: Project,
        bounds: CanvasBounds,
        defaults: EditorDefaults,
    ) -> SlidecastResult<Self> {
        let history =
            History::new(project.pages(), defaults.history_capacity).map_err(map_project_error)?;
        let defaults = sanitize_zoom_limits(defaults);
        Ok(Self {
            project,
            history,
            interaction: InteractionController::new(),
            bounds,
            zoom: 1.0,
            defaults,
        })
    }

    /// Open a project document.
    pub fn from_project_file(file: &ProjectFile, defaults: EditorDefaults) -> SlidecastResult<Self> {
        let project = file.to_project().map_err(map_project_error)?;
        let CanvasSize { width, height } = file.canvas;
        Self::with_project(project, CanvasBounds::new(width as f64, height as f64), defaults)
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    pub fn bounds(&self) -> CanvasBounds {
        self.bounds
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    // ── Pages ───────────────────────────────────────────────────────────

    /// Append a page seeded from `template` and make it current.
    pub fn add_page(&mut self, template: &Template) -> SlidecastResult<usize> {
        let index = self.project.add_page(template);
        if template.duration.is_none() {
            self.project
                .set_page_duration(index, self.defaults.default_page_duration_secs)
                .map_err(map_project_error)?;
        }
        self.commit()?;
        Ok(index)
    }

    /// Append a page from a built-in template id.
    pub fn add_page_from(&mut self, template_id: &str) -> SlidecastResult<usize> {
        let template = find_template(template_id).ok_or_else(|| {
            SlidecastError::user_constraint(format!("Unknown template '{template_id}'"))
        })?;
        self.add_page(&template)
    }

    /// Delete a page. Deleting the only page is refused and changes nothing.
    pub fn delete_page(&mut self, index: usize) -> SlidecastResult<()> {
        self.project
            .delete_page(index)
            .map_err(|e| self.refused(e))?;
        self.commit()
    }

    pub fn duplicate_page(&mut self, index: usize) -> SlidecastResult<usize> {
        let copy = self
            .project
            .duplicate_page(index)
            .map_err(|e| self.refused(e))?;
        self.commit()?;
        Ok(copy)
    }

    /// Navigation is not an edit and is never committed.
    pub fn switch_page(&mut self, index: usize) -> bool {
        self.project.switch_page(index)
    }

    pub fn next_page(&mut self) -> bool {
        self.project.next_page()
    }

    pub fn previous_page(&mut self) -> bool {
        self.project.previous_page()
    }

    pub fn set_background(&mut self, index: usize, background: Background) -> SlidecastResult<()> {
        self.project
            .set_background(index, background)
            .map_err(|e| self.refused(e))?;
        self.commit()
    }

    pub fn set_page_duration(&mut self, index: usize, secs: f64) -> SlidecastResult<()> {
        self.project
            .set_page_duration(index, secs)
            .map_err(|e| self.refused(e))?;
        self.commit()
    }

    // ── Elements ────────────────────────────────────────────────────────

    /// Add an element to the current page and select it.
    pub fn add_element(&mut self, element: Element) -> SlidecastResult<usize> {
        let index = self.project.add_element(element);
        self.commit()?;
        Ok(index)
    }

    pub fn add_text_element(&mut self) -> SlidecastResult<usize> {
        self.add_element(Element::new_text())
    }

    pub fn add_image_element(&mut self, src: impl Into<String>) -> SlidecastResult<usize> {
        self.add_element(Element::new_image(src))
    }

    pub fn delete_element(&mut self, index: usize) -> SlidecastResult<()> {
        self.project
            .delete_element(index)
            .map_err(|e| self.refused(e))?;
        self.commit()
    }

    /// Delete the selected element. Returns `false` when nothing is selected.
    pub fn delete_selected(&mut self) -> SlidecastResult<bool> {
        match self.project.selected_element() {
            Some(index) => self.delete_element(index).map(|()| true),
            None => Ok(false),
        }
    }

    /// Apply a property edit. Empty patches are not committed.
    pub fn update_element(&mut self, index: usize, patch: &ElementPatch) -> SlidecastResult<bool> {
        if patch.is_empty() {
            return Ok(false);
        }
        self.project
            .update_element(index, patch)
            .map_err(|e| self.refused(e))?;
        self.commit()?;
        Ok(true)
    }

    pub fn select(&mut self, index: usize) {
        self.project.select(Some(index));
    }

    pub fn deselect(&mut self) {
        self.project.select(None);
    }

    // ── History ─────────────────────────────────────────────────────────

    /// Step back one entry. A gesture in progress is abandoned without a
    /// commit. Returns `false` at the oldest entry.
    pub fn undo(&mut self) -> SlidecastResult<bool> {
        self.interaction.cancel();
        match self.history.undo().map_err(map_project_error)? {
            Some(pages) => {
                self.project.replace_pages(pages).map_err(map_project_error)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Step forward one entry. Returns `false` at the newest entry.
    pub fn redo(&mut self) -> SlidecastResult<bool> {
        self.interaction.cancel();
        match self.history.redo().map_err(map_project_error)? {
            Some(pages) => {
                self.project.replace_pages(pages).map_err(map_project_error)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ── Pointer gestures ────────────────────────────────────────────────

    /// Pointer pressed at a screen position. Hitting an element selects it
    /// and starts a gesture; hitting empty canvas clears the selection.
    pub fn pointer_down(&mut self, screen: Point) -> SlidecastResult<Option<HitTarget>> {
        let canvas = self.to_canvas(screen);
        let target = hit_test(self.project.current_page(), canvas);

        let stale = match target {
            Some(target) => {
                self.project.select(Some(target.element));
                self.interaction.pointer_down(&self.project, target, canvas)
            }
            None => {
                self.project.select(None);
                self.interaction.pointer_up()
            }
        };
        if stale.is_some() {
            self.commit()?;
        }
        Ok(target)
    }

    /// Pointer moved. Returns whether the scene changed and needs a redraw.
    pub fn pointer_move(&mut self, screen: Point) -> bool {
        let canvas = self.to_canvas(screen);
        self.interaction
            .pointer_move(&mut self.project, canvas, self.bounds)
    }

    /// Pointer released. Ends the gesture with a single commit and returns
    /// whether one was made.
    pub fn pointer_up(&mut self) -> SlidecastResult<bool> {
        match self.interaction.pointer_up() {
            Some(gesture) => {
                tracing::debug!(kind = ?gesture.kind, element = gesture.element, "Gesture finished");
                self.commit()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ── Keyboard ────────────────────────────────────────────────────────

    /// Handle a key press. Returns whether the project changed.
    pub fn handle_key(&mut self, key: Key, modifiers: Modifiers) -> SlidecastResult<bool> {
        match KeyAction::from_key(key, modifiers) {
            Some(KeyAction::Undo) => self.undo(),
            Some(KeyAction::Redo) => self.redo(),
            Some(KeyAction::DeleteSelection) => self.delete_selected(),
            None => Ok(false),
        }
    }

    // ── Zoom ────────────────────────────────────────────────────────────

    /// Set the zoom level, clamped to the configured range.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        if zoom.is_finite() {
            let rounded = (zoom * 100.0).round() / 100.0;
            self.zoom = rounded.clamp(self.defaults.zoom_min, self.defaults.zoom_max);
        }
        self.zoom
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.set_zoom(self.zoom + self.defaults.zoom_step)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set_zoom(self.zoom - self.defaults.zoom_step)
    }

    // ── Playback, export, persistence ───────────────────────────────────

    /// Pages in playback order with how long each is shown.
    pub fn preview_schedule(&self) -> Vec<PreviewSlot> {
        self.project
            .pages()
            .iter()
            .enumerate()
            .map(|(page_index, page)| PreviewSlot {
                page_index,
                duration_secs: page.duration,
            })
            .collect()
    }

    /// A frozen deep copy of the pages for an export run.
    pub fn export_snapshot(&self) -> Vec<Page> {
        self.project.pages().to_vec()
    }

    pub fn serialize(&self) -> SlidecastResult<String> {
        self.project.serialize().map_err(map_project_error)
    }

    /// Replace the project with serialized pages. History starts over.
    pub fn load_serialized(&mut self, json: &str) -> SlidecastResult<()> {
        let project = Project::deserialize(json).map_err(map_project_error)?;
        self.interaction.cancel();
        self.history
            .reset(project.pages())
            .map_err(map_project_error)?;
        self.project = project;
        tracing::info!(pages = self.project.page_count(), "Project loaded");
        Ok(())
    }

    /// Copy the live pages back into a document for saving.
    pub fn store_into(&self, file: &mut ProjectFile) {
        file.update_from(&self.project);
    }

    fn commit(&mut self) -> SlidecastResult<()> {
        self.history
            .commit(self.project.pages())
            .map_err(map_project_error)
    }

    fn to_canvas(&self, screen: Point) -> Point {
        screen.scaled(1.0 / self.zoom)
    }

    fn refused(&self, err: ProjectError) -> SlidecastError {
        let err = map_project_error(err);
        tracing::warn!(error = %err, "Edit refused");
        err
    }
}

/// Replace unusable zoom limits with the built-in ones so `set_zoom` can
/// always clamp.
fn sanitize_zoom_limits(mut defaults: EditorDefaults) -> EditorDefaults {
    let fallback = EditorDefaults::default();
    let (min, max) = (defaults.zoom_min, defaults.zoom_max);
    let usable = min.is_finite() && max.is_finite() && min > 0.0 && min <= max;
    if !usable {
        tracing::warn!(
            zoom_min = min,
            zoom_max = max,
            "Invalid zoom limits in config; using {}..{}",
            fallback.zoom_min,
            fallback.zoom_max
        );
        defaults.zoom_min = fallback.zoom_min;
        defaults.zoom_max = fallback.zoom_max;
    }
    if !defaults.zoom_step.is_finite() || defaults.zoom_step <= 0.0 {
        tracing::warn!(zoom_step = defaults.zoom_step, "Invalid zoom step in config");
        defaults.zoom_step = fallback.zoom_step;
    }
    defaults
}
