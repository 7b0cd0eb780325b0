//! The live project: an ordered page sequence plus editing cursors.
//!
//! Every operation here leaves the model invariants intact (at least one
//! page, cursor in range, selection valid for the current page). None of
//! them record history; committing is the caller's job so intermediate
//! drag frames can be batched into one entry.

use std::path::PathBuf;

use crate::element::{Element, ElementPatch};
use crate::page::{Background, Page};
use crate::template::Template;

/// Ordered pages, the current page cursor, and the selected element.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pages: Vec<Page>,
    current_page_index: usize,
    selected_element: Option<usize>,
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl Project {
    /// A project with a single blank page.
    pub fn new() -> Self {
        Self {
            pages: vec![Page::blank()],
            current_page_index: 0,
            selected_element: None,
        }
    }

    /// Build a project from existing pages. Fails on an empty sequence.
    pub fn from_pages(mut pages: Vec<Page>) -> Result<Self, ProjectError> {
        if pages.is_empty() {
            return Err(ProjectError::ValidationError {
                message: "a project needs at least one page".to_string(),
            });
        }
        for page in &mut pages {
            page.enforce_invariants();
        }
        Ok(Self {
            pages,
            current_page_index: 0,
            selected_element: None,
        })
    }

    /// Serialize the page sequence (the persisted and snapshot format).
    pub fn serialize(&self) -> Result<String, ProjectError> {
        serialize_pages(&self.pages)
    }

    /// Rebuild a project from a serialized page sequence.
    pub fn deserialize(json: &str) -> Result<Self, ProjectError> {
        Self::from_pages(deserialize_pages(json)?)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn current_page_index(&self) -> usize {
        self.current_page_index
    }

    pub fn current_page(&self) -> &Page {
        &self.pages[self.current_page_index]
    }

    pub fn current_page_mut(&mut self) -> &mut Page {
        &mut self.pages[self.current_page_index]
    }

    pub fn selected_element(&self) -> Option<usize> {
        self.selected_element
    }

    /// The selected element on the current page, if any.
    pub fn selected(&self) -> Option<&Element> {
        self.selected_element
            .and_then(|i| self.current_page().elements.get(i))
    }

    /// Mutable access to an element on the current page.
    pub fn element_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.current_page_mut().elements.get_mut(index)
    }

    /// Select an element of the current page, or clear the selection.
    /// Out-of-range indices clear the selection.
    pub fn select(&mut self, index: Option<usize>) {
        self.selected_element = index.filter(|i| *i < self.current_page().elements.len());
    }

    /// Append a page seeded from `template` and make it current.
    pub fn add_page(&mut self, template: &Template) -> usize {
        self.pages.push(Page::from_template(template));
        self.current_page_index = self.pages.len() - 1;
        self.selected_element = None;
        self.current_page_index
    }

    /// Remove a page. Refuses to remove the last remaining page.
    pub fn delete_page(&mut self, index: usize) -> Result<Page, ProjectError> {
        if self.pages.len() <= 1 {
            return Err(ProjectError::Constraint {
                message: "You must have at least one page".to_string(),
            });
        }
        self.check_page(index)?;

        let removed = self.pages.remove(index);
        if self.current_page_index >= self.pages.len() {
            self.current_page_index = self.pages.len() - 1;
        }
        self.selected_element = None;
        Ok(removed)
    }

    /// Deep-copy a page (new identity) right after the source and make the
    /// copy current.
    pub fn duplicate_page(&mut self, index: usize) -> Result<usize, ProjectError> {
        self.check_page(index)?;
        let copy = self.pages[index].duplicate();
        self.pages.insert(index + 1, copy);
        self.current_page_index = index + 1;
        self.selected_element = None;
        Ok(self.current_page_index)
    }

    /// Move the page cursor. Out-of-range indices are ignored.
    pub fn switch_page(&mut self, index: usize) -> bool {
        if index >= self.pages.len() {
            return false;
        }
        self.current_page_index = index;
        self.selected_element = None;
        true
    }

    pub fn can_go_previous(&self) -> bool {
        self.current_page_index > 0
    }

    pub fn can_go_next(&self) -> bool {
        self.current_page_index + 1 < self.pages.len()
    }

    pub fn previous_page(&mut self) -> bool {
        self.can_go_previous() && self.switch_page(self.current_page_index - 1)
    }

    pub fn next_page(&mut self) -> bool {
        self.can_go_next() && self.switch_page(self.current_page_index + 1)
    }

    /// Append an element to the current page and select it.
    pub fn add_element(&mut self, mut element: Element) -> usize {
        element.enforce_invariants();
        let page = self.current_page_mut();
        page.elements.push(element);
        let index = page.elements.len() - 1;
        self.selected_element = Some(index);
        index
    }

    /// Remove an element from the current page and clear the selection.
    pub fn delete_element(&mut self, index: usize) -> Result<Element, ProjectError> {
        let len = self.current_page().elements.len();
        if index >= len {
            return Err(ProjectError::OutOfRange {
                what: "element",
                index,
                len,
            });
        }
        let removed = self.current_page_mut().elements.remove(index);
        self.selected_element = None;
        Ok(removed)
    }

    /// Apply a partial update to an element of the current page.
    pub fn update_element(&mut self, index: usize, patch: &ElementPatch) -> Result<(), ProjectError> {
        let len = self.current_page().elements.len();
        let element = self
            .element_mut(index)
            .ok_or(ProjectError::OutOfRange {
                what: "element",
                index,
                len,
            })?;
        patch.apply(element);
        Ok(())
    }

    pub fn set_background(&mut self, index: usize, background: Background) -> Result<(), ProjectError> {
        self.check_page(index)?;
        self.pages[index].background = background;
        Ok(())
    }

    /// Set a page's duration. Non-positive or non-finite values are refused.
    pub fn set_page_duration(&mut self, index: usize, secs: f64) -> Result<(), ProjectError> {
        self.check_page(index)?;
        if !secs.is_finite() || secs <= 0.0 {
            return Err(ProjectError::Constraint {
                message: format!("Page duration must be a positive number of seconds, got {secs}"),
            });
        }
        self.pages[index].duration = secs;
        Ok(())
    }

    /// Replace the whole page sequence (undo/redo, load). Cursors are
    /// clamped so they stay valid; an empty sequence is refused.
    pub fn replace_pages(&mut self, pages: Vec<Page>) -> Result<(), ProjectError> {
        let replacement = Self::from_pages(pages)?;
        self.pages = replacement.pages;
        if self.current_page_index >= self.pages.len() {
            self.current_page_index = self.pages.len() - 1;
        }
        let selected = self.selected_element;
        self.select(selected);
        Ok(())
    }

    /// Sum of all page durations.
    pub fn total_duration_secs(&self) -> f64 {
        self.pages.iter().map(|p| p.duration).sum()
    }

    fn check_page(&self, index: usize) -> Result<(), ProjectError> {
        if index >= self.pages.len() {
            return Err(ProjectError::OutOfRange {
                what: "page",
                index,
                len: self.pages.len(),
            });
        }
        Ok(())
    }
}

/// Serialize a page sequence to JSON.
pub fn serialize_pages(pages: &[Page]) -> Result<String, ProjectError> {
    serde_json::to_string(pages).map_err(|source| ProjectError::InvalidData { source })
}

/// Parse a page sequence from JSON, re-establishing invariants.
pub fn deserialize_pages(json: &str) -> Result<Vec<Page>, ProjectError> {
    let mut pages: Vec<Page> =
        serde_json::from_str(json).map_err(|source| ProjectError::InvalidData { source })?;
    for page in &mut pages {
        page.enforce_invariants();
    }
    Ok(pages)
}

/// Errors that can occur when working with projects.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid project data: {source}")]
    InvalidData { source: serde_json::Error },

    /// A user request the project rules refuse; nothing was changed.
    #[error("{message}")]
    Constraint { message: String },

    #[error("No {what} at index {index} (have {len})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invalid project: {message}")]
    ValidationError { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::find_template;

    fn three_pages() -> Project {
        let mut project = Project::new();
        project.add_page(&Template::blank());
        project.add_page(&Template::blank());
        project
    }

    #[test]
    fn test_new_project_has_one_page() {
        let project = Project::new();
        assert_eq!(project.page_count(), 1);
        assert_eq!(project.current_page_index(), 0);
        assert!(project.selected().is_none());
    }

    #[test]
    fn test_delete_only_page_is_refused() {
        let mut project = Project::new();
        let err = project.delete_page(0).unwrap_err();
        assert!(matches!(err, ProjectError::Constraint { .. }));
        assert_eq!(project.page_count(), 1);
    }

    #[test]
    fn test_delete_last_page_clamps_cursor() {
        let mut project = three_pages();
        assert_eq!(project.current_page_index(), 2);
        project.delete_page(2).unwrap();
        assert_eq!(project.current_page_index(), 1);
    }

    #[test]
    fn test_duplicate_inserts_after_source() {
        let mut project = three_pages();
        project.switch_page(0);
        project.add_element(Element::new_text());
        let source_id = project.pages()[0].id.clone();

        let copy_index = project.duplicate_page(0).unwrap();
        assert_eq!(copy_index, 1);
        assert_eq!(project.page_count(), 4);
        assert_ne!(project.pages()[1].id, source_id);
        assert_eq!(project.pages()[1].elements, project.pages()[0].elements);
        assert_eq!(project.current_page_index(), 1);
    }

    #[test]
    fn test_add_page_from_template_becomes_current() {
        let mut project = Project::new();
        let template = find_template("simple-text").unwrap();
        let index = project.add_page(&template);
        assert_eq!(index, 1);
        assert_eq!(project.current_page().elements.len(), 1);
        assert_eq!(
            project.current_page().background,
            Background::Color("#f0f0f0".into())
        );
    }

    #[test]
    fn test_switch_page_clears_selection_and_ignores_out_of_range() {
        let mut project = three_pages();
        project.add_element(Element::new_text());
        assert!(project.selected().is_some());
        assert!(project.switch_page(0));
        assert!(project.selected().is_none());
        assert!(!project.switch_page(9));
        assert_eq!(project.current_page_index(), 0);
    }

    #[test]
    fn test_navigation_bounds() {
        let mut project = three_pages();
        project.switch_page(0);
        assert!(!project.can_go_previous());
        assert!(!project.previous_page());
        assert!(project.next_page());
        assert!(project.next_page());
        assert!(!project.can_go_next());
    }

    #[test]
    fn test_delete_element_out_of_range() {
        let mut project = Project::new();
        let err = project.delete_element(0).unwrap_err();
        assert!(matches!(err, ProjectError::OutOfRange { .. }));
    }

    #[test]
    fn test_set_page_duration_rejects_non_positive() {
        let mut project = Project::new();
        assert!(project.set_page_duration(0, 0.0).is_err());
        assert!(project.set_page_duration(0, f64::INFINITY).is_err());
        project.set_page_duration(0, 3.5).unwrap();
        assert_eq!(project.current_page().duration, 3.5);
    }

    #[test]
    fn test_mixed_elements_round_trip() {
        let mut project = Project::new();
        project.add_element(Element::new_text());
        project.add_element(Element::new_image(
            "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==",
        ));
        project
            .set_background(0, Background::Image("data:image/png;base64,AAAA".into()))
            .unwrap();

        let json = project.serialize().unwrap();
        let loaded = Project::deserialize(&json).unwrap();
        assert_eq!(loaded.pages(), project.pages());
    }

    #[test]
    fn test_deserialize_empty_sequence_is_refused() {
        assert!(Project::deserialize("[]").is_err());
    }

    #[test]
    fn test_replace_pages_clamps_cursor_and_selection() {
        let mut project = three_pages();
        project.add_element(Element::new_text());
        project
            .replace_pages(vec![Page::blank()])
            .unwrap();
        assert_eq!(project.current_page_index(), 0);
        assert_eq!(project.selected_element(), None);
    }
}
