//! Element definitions for the card canvas.
//!
//! A card holds three kinds of placed elements: stickers, text and user
//! images. Each kind lives in its own ordered collection on the
//! [`Scene`](crate::scene::Scene); the [`Element`] enum is the tagged union
//! used wherever an element has to travel on its own (clipboard, history
//! lookups, layer listings).

mod image;
mod sticker;
mod text;

pub use image::{PanOffset, UserImage};
pub use sticker::Sticker;
pub use text::{TextElement, TextTemplate};

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque, process-unique element identifier.
///
/// Ids are `<kind>-<uuid>` strings. Callers must treat them as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Generate a fresh id for an element of the given kind.
    pub fn generate(kind: ElementKind) -> Self {
        Self(format!("{}-{}", kind.as_str(), Uuid::new_v4().simple()))
    }

    /// Wrap an existing id string.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// The three element collections of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Sticker,
    Text,
    Image,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Sticker => "sticker",
            ElementKind::Text => "text",
            ElementKind::Image => "image",
        }
    }

    /// Smallest width/height a corner resize may produce.
    ///
    /// Images are deliberately floored higher than stickers.
    pub fn min_size(&self) -> f64 {
        match self {
            ElementKind::Image => IMAGE_MIN_SIZE,
            ElementKind::Sticker | ElementKind::Text => STICKER_MIN_SIZE,
        }
    }
}

/// Minimum resize extent for stickers.
pub const STICKER_MIN_SIZE: f64 = 30.0;
/// Minimum resize extent for user images.
pub const IMAGE_MIN_SIZE: f64 = 100.0;

/// Mask shape applied to a sticker or image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Circle,
    Heart,
    Star,
    Rounded,
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Heart => "heart",
            ShapeKind::Star => "star",
            ShapeKind::Rounded => "rounded",
        }
    }

    /// How corner resizes treat the aspect ratio for this shape.
    pub fn aspect_lock(&self) -> AspectLock {
        match self {
            ShapeKind::Rectangle => AspectLock::Free,
            ShapeKind::Rounded => AspectLock::Preserve,
            ShapeKind::Circle | ShapeKind::Heart | ShapeKind::Star => AspectLock::Square,
        }
    }
}

/// Aspect-ratio policy used by corner resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectLock {
    /// Width and height follow the pointer independently.
    Free,
    /// Keep the aspect ratio the element had when the resize started.
    Preserve,
    /// Force `width == height`.
    Square,
}

/// Optional outline drawn behind the element, inset by `-width`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// CSS color string.
    pub color: String,
    /// Outline thickness in canvas pixels.
    pub width: f64,
}

impl Outline {
    /// Color used when an outline has a width but no color was chosen.
    pub const DEFAULT_COLOR: &'static str = "#000000";

    pub fn new(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
        }
    }

    /// Only outlines with a positive width are painted.
    pub fn is_visible(&self) -> bool {
        self.width > 0.0
    }
}

/// Any element placed on the card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Sticker(Sticker),
    Text(TextElement),
    Image(UserImage),
}

impl Element {
    pub fn id(&self) -> &ElementId {
        match self {
            Element::Sticker(s) => &s.id,
            Element::Text(t) => &t.id,
            Element::Image(i) => &i.id,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Sticker(_) => ElementKind::Sticker,
            Element::Text(_) => ElementKind::Text,
            Element::Image(_) => ElementKind::Image,
        }
    }

    pub fn position(&self) -> Point {
        match self {
            Element::Sticker(s) => s.position,
            Element::Text(t) => t.position,
            Element::Image(i) => i.position,
        }
    }

    pub fn rotation(&self) -> f64 {
        match self {
            Element::Sticker(s) => s.rotation,
            Element::Text(t) => t.rotation,
            Element::Image(i) => i.rotation,
        }
    }

    /// Unrotated bounding box on the canvas.
    pub fn bounds(&self) -> Rect {
        match self {
            Element::Sticker(s) => s.bounds(),
            Element::Text(t) => t.bounds(),
            Element::Image(i) => i.bounds(),
        }
    }

    /// Point the element rotates around.
    pub fn rotation_center(&self) -> Point {
        match self {
            Element::Text(t) => t.rotation_center(),
            _ => self.bounds().center(),
        }
    }

    /// Replace the id (used when pasting or duplicating).
    pub fn with_fresh_id(mut self) -> Self {
        let id = ElementId::generate(self.kind());
        match &mut self {
            Element::Sticker(s) => s.id = id,
            Element::Text(t) => t.id = id,
            Element::Image(i) => i.id = id,
        }
        self
    }

    /// Move by a delta.
    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Element::Sticker(s) => s.position += delta,
            Element::Text(t) => t.position += delta,
            Element::Image(i) => i.position += delta,
        }
    }

    /// Check if a canvas point hits the element body.
    pub fn hit_test(&self, point: Point) -> bool {
        let bounds = self.bounds();
        let rotation = self.rotation();
        if rotation.abs() < f64::EPSILON {
            return bounds.contains(point);
        }
        // Undo the rotation around the rotation center before testing.
        let center = self.rotation_center();
        let local = kurbo::Affine::rotate_about(-rotation.to_radians(), center) * point;
        bounds.contains(local)
    }
}

/// Partial update applied by [`Scene::update`](crate::scene::Scene::update).
///
/// Fields that don't apply to the targeted kind are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub rotation: Option<f64>,
    pub shape: Option<ShapeKind>,
    /// `Some(None)` removes the outline.
    pub outline: Option<Option<Outline>>,
    /// `Some(None)` removes the corner radius.
    pub corner_radius: Option<Option<f64>>,
    pub offset: Option<PanOffset>,
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub color: Option<String>,
    pub font_family: Option<String>,
}

impl ElementPatch {
    pub fn position(point: Point) -> Self {
        Self {
            position: Some(point),
            ..Self::default()
        }
    }

    pub fn frame(rect: Rect) -> Self {
        Self {
            position: Some(rect.origin()),
            size: Some(rect.size()),
            ..Self::default()
        }
    }

    pub fn rotation(degrees: f64) -> Self {
        Self {
            rotation: Some(degrees),
            ..Self::default()
        }
    }

    pub fn offset(offset: PanOffset) -> Self {
        Self {
            offset: Some(offset),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Common access used by the scene's per-kind collections.
pub trait SceneItem: Clone {
    fn id(&self) -> &ElementId;
    fn apply(&mut self, patch: &ElementPatch);
    fn into_element(self) -> Element;
}
