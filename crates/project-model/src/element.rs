//! Page elements: positioned, sized, rotatable text and image objects.

use serde::{Deserialize, Serialize};

use crate::geometry::ElementFrame;

/// Default line height multiplier for text.
pub const DEFAULT_LINE_HEIGHT: f64 = 1.15;

/// Entrance animation played while a page is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Animation {
    #[default]
    None,
    FadeIn,
    SlideInLeft,
    SlideInRight,
    SlideInUp,
    SlideInDown,
    ZoomIn,
    Rotate,
}

impl Animation {
    pub const ALL: [Animation; 8] = [
        Self::None,
        Self::FadeIn,
        Self::SlideInLeft,
        Self::SlideInRight,
        Self::SlideInUp,
        Self::SlideInDown,
        Self::ZoomIn,
        Self::Rotate,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::FadeIn => "Fade In",
            Self::SlideInLeft => "Slide Left",
            Self::SlideInRight => "Slide Right",
            Self::SlideInUp => "Slide Up",
            Self::SlideInDown => "Slide Down",
            Self::ZoomIn => "Zoom In",
            Self::Rotate => "Rotate",
        }
    }
}

/// Horizontal alignment of text lines inside the element box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A text or image object placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(flatten)]
    pub frame: ElementFrame,

    #[serde(default)]
    pub animation: Animation,

    #[serde(flatten)]
    pub kind: ElementKind,
}

/// Variant-specific element data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Text(TextProps),
    Image(ImageProps),
}

/// Text element properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    /// Multi-line content; lines are separated by `\n`.
    #[serde(default)]
    pub content: String,

    #[serde(default = "default_font_size")]
    pub font_size: f64,

    /// CSS font-family list, e.g. `"Charm, cursive"`.
    #[serde(default = "default_font_family")]
    pub font_family: String,

    #[serde(default = "default_text_color")]
    pub color: String,

    #[serde(default)]
    pub text_align: TextAlign,

    #[serde(default = "default_line_height")]
    pub line_height: f64,
}

/// Image element properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageProps {
    /// Image reference: a `data:` URL, `file://` URL, or filesystem path.
    pub src: String,
}

fn default_font_size() -> f64 {
    24.0
}

fn default_font_family() -> String {
    "Arial, sans-serif".to_string()
}

fn default_text_color() -> String {
    "#000000".to_string()
}

fn default_line_height() -> f64 {
    DEFAULT_LINE_HEIGHT
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            content: String::new(),
            font_size: default_font_size(),
            font_family: default_font_family(),
            color: default_text_color(),
            text_align: TextAlign::Left,
            line_height: DEFAULT_LINE_HEIGHT,
        }
    }
}

impl Element {
    /// Create a text element.
    pub fn text(frame: ElementFrame, props: TextProps, animation: Animation) -> Self {
        let mut element = Self {
            frame,
            animation,
            kind: ElementKind::Text(props),
        };
        element.enforce_invariants();
        element
    }

    /// Create an image element.
    pub fn image(frame: ElementFrame, src: impl Into<String>, animation: Animation) -> Self {
        let mut element = Self {
            frame,
            animation,
            kind: ElementKind::Image(ImageProps { src: src.into() }),
        };
        element.enforce_invariants();
        element
    }

    /// The text element inserted by the "add text" action.
    pub fn new_text() -> Self {
        Self::text(
            ElementFrame::new(100.0, 100.0, 250.0, 80.0, 0.0),
            TextProps {
                content: "New Text".to_string(),
                font_size: 24.0,
                font_family: "Arial, sans-serif".to_string(),
                color: "#333333".to_string(),
                text_align: TextAlign::Center,
                line_height: DEFAULT_LINE_HEIGHT,
            },
            Animation::FadeIn,
        )
    }

    /// The image element inserted by the "add image" action.
    pub fn new_image(src: impl Into<String>) -> Self {
        Self::image(
            ElementFrame::new(100.0, 200.0, 200.0, 200.0, 0.0),
            src,
            Animation::ZoomIn,
        )
    }

    /// Re-establish size minimums, rotation range, and sane text metrics.
    pub fn enforce_invariants(&mut self) {
        self.frame.enforce_invariants();
        if let ElementKind::Text(text) = &mut self.kind {
            if !text.font_size.is_finite() || text.font_size <= 0.0 {
                text.font_size = default_font_size();
            }
            if !text.line_height.is_finite() || text.line_height <= 0.0 {
                text.line_height = DEFAULT_LINE_HEIGHT;
            }
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ElementKind::Text(_))
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, ElementKind::Image(_))
    }
}

/// A partial update of element fields. `None` leaves a field untouched;
/// variant-specific fields are ignored on the other variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub animation: Option<Animation>,
    pub content: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub color: Option<String>,
    pub text_align: Option<TextAlign>,
    pub line_height: Option<f64>,
    pub src: Option<String>,
}

impl ElementPatch {
    /// Whether applying this patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply to an element, then re-establish its invariants.
    pub fn apply(&self, element: &mut Element) {
        let frame = &mut element.frame;
        if let Some(v) = self.x {
            frame.x = v;
        }
        if let Some(v) = self.y {
            frame.y = v;
        }
        if let Some(v) = self.width {
            frame.width = v;
        }
        if let Some(v) = self.height {
            frame.height = v;
        }
        if let Some(v) = self.rotation {
            frame.rotation = v;
        }
        if let Some(v) = self.animation {
            element.animation = v;
        }

        match &mut element.kind {
            ElementKind::Text(text) => {
                if let Some(v) = &self.content {
                    text.content = v.clone();
                }
                if let Some(v) = self.font_size {
                    text.font_size = v;
                }
                if let Some(v) = &self.font_family {
                    text.font_family = v.clone();
                }
                if let Some(v) = &self.color {
                    text.color = v.clone();
                }
                if let Some(v) = self.text_align {
                    text.text_align = v;
                }
                if let Some(v) = self.line_height {
                    text.line_height = v;
                }
            }
            ElementKind::Image(image) => {
                if let Some(v) = &self.src {
                    image.src = v.clone();
                }
            }
        }

        element.enforce_invariants();
    }
}
