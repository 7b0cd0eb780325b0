//! Pages: one slide of the authored sequence.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::element::Element;
use crate::template::Template;

/// Duration given to pages that do not declare one.
pub const DEFAULT_PAGE_DURATION_SECS: f64 = 2.0;

/// Opaque page identity.
///
/// New pages get a UUID v4. Older saved files used millisecond timestamps;
/// those numeric ids are accepted and kept as their decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    /// Generate a fresh identity.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Number(n) => Self(n.to_string()),
        })
    }
}

/// Page background: a CSS color or an image reference.
///
/// Persisted as a single string, either the color (`"#f0f0f0"`) or a CSS
/// `url(...)` wrapper around the image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Background {
    Color(String),
    Image(String),
}

impl Default for Background {
    fn default() -> Self {
        Self::Color("#ffffff".to_string())
    }
}

impl From<String> for Background {
    fn from(raw: String) -> Self {
        let trimmed = raw.trim();
        if let Some(inner) = trimmed
            .strip_prefix("url(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let src = inner.trim().trim_matches(|c| c == '"' || c == '\'');
            return Self::Image(src.to_string());
        }
        if trimmed.is_empty() {
            return Self::default();
        }
        Self::Color(trimmed.to_string())
    }
}

impl From<Background> for String {
    fn from(bg: Background) -> Self {
        match bg {
            Background::Color(c) => c,
            Background::Image(src) => format!("url({src})"),
        }
    }
}

/// One slide: background, ordered elements (back to front), and how long
/// it is shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,

    #[serde(default)]
    pub background: Background,

    #[serde(default)]
    pub elements: Vec<Element>,

    /// Display duration in seconds; always positive.
    #[serde(default = "default_duration")]
    pub duration: f64,
}

fn default_duration() -> f64 {
    DEFAULT_PAGE_DURATION_SECS
}

impl Page {
    /// An empty white page.
    pub fn blank() -> Self {
        Self {
            id: PageId::new(),
            background: Background::default(),
            elements: vec![],
            duration: DEFAULT_PAGE_DURATION_SECS,
        }
    }

    /// A new page seeded from a template (deep copy of its elements).
    pub fn from_template(template: &Template) -> Self {
        let mut page = Self {
            id: PageId::new(),
            background: template.background.clone(),
            elements: template.elements.clone(),
            duration: template.duration.unwrap_or(DEFAULT_PAGE_DURATION_SECS),
        };
        page.enforce_invariants();
        page
    }

    /// Deep copy with a fresh identity.
    pub fn duplicate(&self) -> Self {
        Self {
            id: PageId::new(),
            ..self.clone()
        }
    }

    /// Re-establish element and duration invariants.
    pub fn enforce_invariants(&mut self) {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            self.duration = DEFAULT_PAGE_DURATION_SECS;
        }
        for element in &mut self.elements {
            element.enforce_invariants();
        }
    }
}
