//! Built-in page templates.
//!
//! A template is a `{background, elements}` seed used when adding a page.

use serde::{Deserialize, Serialize};

use crate::element::{Animation, Element, TextAlign, TextProps, DEFAULT_LINE_HEIGHT};
use crate::geometry::ElementFrame;
use crate::page::Background;

/// Id of the template used for new projects and plain "add page".
pub const BLANK_TEMPLATE_ID: &str = "blank";

/// A page seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub background: Background,
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Page duration; the page default applies when absent.
    #[serde(default)]
    pub duration: Option<f64>,
}

impl Template {
    /// An empty white page.
    pub fn blank() -> Self {
        Self {
            id: BLANK_TEMPLATE_ID.to_string(),
            name: "Blank Canvas".to_string(),
            background: Background::Color("#ffffff".to_string()),
            elements: vec![],
            duration: None,
        }
    }

    fn simple_text() -> Self {
        Self {
            id: "simple-text".to_string(),
            name: "Simple Text".to_string(),
            background: Background::Color("#f0f0f0".to_string()),
            elements: vec![Element::text(
                ElementFrame::new(100.0, 350.0, 250.0, 100.0, 0.0),
                TextProps {
                    content: "Your Text Here".to_string(),
                    font_size: 32.0,
                    font_family: "Arial, sans-serif".to_string(),
                    color: "#333333".to_string(),
                    text_align: TextAlign::Center,
                    line_height: DEFAULT_LINE_HEIGHT,
                },
                Animation::SlideInUp,
            )],
            duration: None,
        }
    }

    fn blessing_invite() -> Self {
        Self {
            id: "blessing-invite".to_string(),
            name: "Blessing Invitation".to_string(),
            background: Background::Color("#f9e79f".to_string()),
            elements: vec![Element::text(
                ElementFrame::new(50.0, 100.0, 350.0, 120.0, 0.0),
                TextProps {
                    content: "We invite you and your family's\ngracious presence and blessing"
                        .to_string(),
                    font_size: 26.0,
                    font_family: "Charm, cursive".to_string(),
                    color: "#8b6914".to_string(),
                    text_align: TextAlign::Center,
                    line_height: DEFAULT_LINE_HEIGHT,
                },
                Animation::FadeIn,
            )],
            duration: None,
        }
    }
}

/// All built-in templates, in catalog order.
pub fn builtin_templates() -> Vec<Template> {
    vec![
        Template::blessing_invite(),
        Template::blank(),
        Template::simple_text(),
    ]
}

/// Look up a built-in template by id.
pub fn find_template(id: &str) -> Option<Template> {
    builtin_templates().into_iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_are_unique() {
        let templates = builtin_templates();
        let mut ids: Vec<_> = templates.iter().map(|t| t.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), templates.len());
    }

    #[test]
    fn test_find_template() {
        assert_eq!(find_template("blank").unwrap(), Template::blank());
        assert_eq!(find_template("simple-text").unwrap().elements.len(), 1);
        assert!(find_template("nope").is_none());
    }
}
