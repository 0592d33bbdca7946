//! Text element.

use super::{Element, ElementId, ElementKind, ElementPatch, Outline, SceneItem};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// A text label on the card.
///
/// Text has no stored width or height; the painted size comes from font
/// metrics. [`TextElement::estimated_size`] gives a layout-free estimate used
/// for hit testing and handle placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub(crate) id: ElementId,
    pub text: String,
    /// Top-left anchor.
    pub position: Point,
    /// Font size in pixels.
    pub font_size: f64,
    /// CSS color string.
    pub color: String,
    /// CSS font-family string.
    pub font_family: String,
    /// Rotation in degrees, clockwise.
    pub rotation: f64,
    pub outline: Option<Outline>,
    pub corner_radius: Option<f64>,
}

impl TextElement {
    /// Text given to a freshly added element.
    pub const DEFAULT_TEXT: &'static str = "Double click to edit";
    pub const DEFAULT_FONT_SIZE: f64 = 24.0;
    pub const DEFAULT_COLOR: &'static str = "#000000";
    pub const DEFAULT_FONT_FAMILY: &'static str = "Arial";

    /// Fixed offset from the anchor to the rotation pivot.
    pub const ROTATION_PIVOT: Vec2 = Vec2::new(50.0, 20.0);

    /// Create a new text element with the default style.
    pub fn new(position: Point, text: impl Into<String>) -> Self {
        Self {
            id: ElementId::generate(ElementKind::Text),
            text: text.into(),
            position,
            font_size: Self::DEFAULT_FONT_SIZE,
            color: Self::DEFAULT_COLOR.to_string(),
            font_family: Self::DEFAULT_FONT_FAMILY.to_string(),
            rotation: 0.0,
            outline: None,
            corner_radius: None,
        }
    }

    /// Create a text element from a style preset.
    pub fn from_template(template: &TextTemplate, position: Point) -> Self {
        Self {
            font_size: template.font_size,
            color: template.color.to_string(),
            font_family: template.font_family.to_string(),
            ..Self::new(position, template.text)
        }
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    /// Approximate rendered size of the longest line.
    pub fn estimated_size(&self) -> Size {
        let lines: Vec<&str> = self.text.lines().collect();
        let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0).max(1);
        let rows = lines.len().max(1);
        Size::new(
            longest as f64 * self.font_size * 0.6,
            rows as f64 * self.font_size * 1.2,
        )
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.estimated_size())
    }

    /// Pivot used while rotating.
    pub fn rotation_center(&self) -> Point {
        self.position + Self::ROTATION_PIVOT
    }

    /// Label shown in the layer list.
    pub fn label(&self) -> &str {
        if self.text.is_empty() { "Text" } else { &self.text }
    }
}

impl SceneItem for TextElement {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn apply(&mut self, patch: &ElementPatch) {
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(outline) = &patch.outline {
            self.outline = outline.clone();
        }
        if let Some(radius) = patch.corner_radius {
            self.corner_radius = radius;
        }
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(size) = patch.font_size {
            self.font_size = size;
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(family) = &patch.font_family {
            self.font_family = family.clone();
        }
    }

    fn into_element(self) -> Element {
        Element::Text(self)
    }
}

/// A text style preset offered by the text palette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextTemplate {
    pub text: &'static str,
    pub font_size: f64,
    pub color: &'static str,
    pub font_family: &'static str,
}

impl TextTemplate {
    /// Where template text is dropped on the card.
    pub const PLACEMENT: Point = Point::new(250.0, 300.0);

    /// The built-in presets.
    pub fn catalog() -> &'static [TextTemplate] {
        TEXT_TEMPLATES
    }
}

const fn preset(
    text: &'static str,
    font_size: f64,
    color: &'static str,
    font_family: &'static str,
) -> TextTemplate {
    TextTemplate {
        text,
        font_size,
        color,
        font_family,
    }
}

const TEXT_TEMPLATES: &[TextTemplate] = &[
    preset("I Love You", 48.0, "#ec4899", "'Great Vibes', cursive"),
    preset("Be Mine", 42.0, "#ef4444", "'Pacifico', cursive"),
    preset("Happy Valentine's", 36.0, "#f43f5e", "'Dancing Script', cursive"),
    preset("Forever Yours", 40.0, "#db2777", "'Allura', cursive"),
    preset("XOXO", 52.0, "#e11d48", "'Lobster', cursive"),
    preset("You & Me", 38.0, "#be185d", "'Satisfy', cursive"),
    preset("My Valentine", 36.0, "#f472b6", "'Tangerine', cursive"),
    preset("Love Always", 40.0, "#ec4899", "'Cinzel', serif"),
    preset("Together Forever", 32.0, "#f43f5e", "'Playfair Display', serif"),
    preset("With Love", 38.0, "#fb7185", "'Indie Flower', cursive"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let text = TextElement::new(Point::new(250.0, 250.0), TextElement::DEFAULT_TEXT);
        assert_eq!(text.font_size, 24.0);
        assert_eq!(text.color, "#000000");
        assert_eq!(text.font_family, "Arial");
        assert!(text.id().as_str().starts_with("text-"));
    }

    #[test]
    fn test_rotation_center_is_fixed_offset() {
        let text = TextElement::new(Point::new(10.0, 10.0), "hello");
        assert_eq!(text.rotation_center(), Point::new(60.0, 30.0));
    }

    #[test]
    fn test_estimated_size() {
        let mut text = TextElement::new(Point::ZERO, "abcd\nab");
        text.font_size = 10.0;
        let size = text.estimated_size();
        assert!((size.width - 24.0).abs() < 1e-9);
        assert!((size.height - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text_label() {
        let text = TextElement::new(Point::ZERO, "");
        assert_eq!(text.label(), "Text");
    }

    #[test]
    fn test_from_template() {
        let template = &TextTemplate::catalog()[0];
        let text = TextElement::from_template(template, TextTemplate::PLACEMENT);
        assert_eq!(text.text, "I Love You");
        assert_eq!(text.font_size, 48.0);
        assert_eq!(text.position, Point::new(250.0, 300.0));
    }
}
