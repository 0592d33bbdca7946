//! Sticker element.

use super::{Element, ElementId, ElementKind, ElementPatch, Outline, SceneItem, ShapeKind};
use crate::source::StickerSource;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// A decorative sticker (image path, icon glyph or emoji).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sticker {
    pub(crate) id: ElementId,
    /// What the sticker shows.
    pub source: StickerSource,
    /// Top-left corner.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees, clockwise.
    pub rotation: f64,
    /// Clip mask shape.
    pub shape: ShapeKind,
    pub outline: Option<Outline>,
    pub corner_radius: Option<f64>,
}

impl Sticker {
    /// Default edge length for emoji stickers.
    pub const EMOJI_SIZE: f64 = 80.0;
    /// Default edge length for icon stickers.
    pub const ICON_SIZE: f64 = 60.0;
    /// Default edge length for image stickers.
    pub const IMAGE_SIZE: f64 = 100.0;

    /// Create a new sticker.
    pub fn new(source: StickerSource, position: Point, size: Size) -> Self {
        Self {
            id: ElementId::generate(ElementKind::Sticker),
            source,
            position,
            width: size.width,
            height: size.height,
            rotation: 0.0,
            shape: ShapeKind::Rectangle,
            outline: None,
            corner_radius: None,
        }
    }

    /// Create a sticker with the default size for its source kind.
    pub fn with_default_size(source: StickerSource, position: Point) -> Self {
        let edge = Self::default_edge(&source);
        Self::new(source, position, Size::new(edge, edge))
    }

    /// Default square edge length for a source.
    pub fn default_edge(source: &StickerSource) -> f64 {
        match source {
            StickerSource::Emoji(_) => Self::EMOJI_SIZE,
            StickerSource::Icon { .. } => Self::ICON_SIZE,
            StickerSource::Path(_) => Self::IMAGE_SIZE,
        }
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size())
    }
}

impl SceneItem for Sticker {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn apply(&mut self, patch: &ElementPatch) {
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(size) = patch.size {
            self.width = size.width;
            self.height = size.height;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(shape) = patch.shape {
            self.shape = shape;
        }
        if let Some(outline) = &patch.outline {
            self.outline = outline.clone();
        }
        if let Some(radius) = patch.corner_radius {
            self.corner_radius = radius;
        }
    }

    fn into_element(self) -> Element {
        Element::Sticker(self)
    }
}
