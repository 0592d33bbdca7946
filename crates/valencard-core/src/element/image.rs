//! User image element.

use super::{Element, ElementId, ElementKind, ElementPatch, Outline, SceneItem, ShapeKind};
use crate::source::ImageSource;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Pan offset of the visible crop window, in percent of the frame.
///
/// `(0, 0)` centres the picture. Each axis is kept within `[-50, 50]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PanOffset {
    pub x: f64,
    pub y: f64,
}

impl PanOffset {
    pub const LIMIT: f64 = 50.0;

    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: x.clamp(-Self::LIMIT, Self::LIMIT),
            y: y.clamp(-Self::LIMIT, Self::LIMIT),
        }
    }

    /// Offset after dragging the picture by `delta` pixels inside a frame.
    pub fn panned(self, delta: Vec2, frame: Size) -> Self {
        let dx = if frame.width > 0.0 { 100.0 * delta.x / frame.width } else { 0.0 };
        let dy = if frame.height > 0.0 { 100.0 * delta.y / frame.height } else { 0.0 };
        Self::new(self.x + dx, self.y + dy)
    }

    /// Horizontal and vertical object position, in percent.
    pub fn object_position(&self) -> (f64, f64) {
        (50.0 + self.x, 50.0 + self.y)
    }
}

/// A picture supplied by the user (file, phone upload or template).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserImage {
    pub(crate) id: ElementId,
    pub source: ImageSource,
    /// Top-left corner of the frame.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees, clockwise.
    pub rotation: f64,
    pub shape: ShapeKind,
    /// Crop window position inside the frame.
    pub offset: PanOffset,
    pub outline: Option<Outline>,
    pub corner_radius: Option<f64>,
}

impl UserImage {
    /// Frame used when no template image area is active.
    pub const DEFAULT_FRAME: Rect = Rect::new(150.0, 150.0, 450.0, 450.0);
    /// Diagonal step between images added in one batch.
    pub const CASCADE_STEP: f64 = 20.0;

    /// Create a new image framed by `frame`.
    pub fn new(source: ImageSource, frame: Rect) -> Self {
        Self {
            id: ElementId::generate(ElementKind::Image),
            source,
            position: frame.origin(),
            width: frame.width(),
            height: frame.height(),
            rotation: 0.0,
            shape: ShapeKind::Rectangle,
            offset: PanOffset::default(),
            outline: None,
            corner_radius: None,
        }
    }

    /// Frame for the `index`-th image of a batch, cascading down-right.
    pub fn cascaded_frame(area: Rect, index: usize) -> Rect {
        let step = Self::CASCADE_STEP * index as f64;
        area + Vec2::new(step, step)
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

impl SceneItem for UserImage {
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
        if let Some(offset) = patch.offset {
            self.offset = PanOffset::new(offset.x, offset.y);
        }
        if let Some(outline) = &patch.outline {
            self.outline = outline.clone();
        }
        if let Some(radius) = patch.corner_radius {
            self.corner_radius = radius;
        }
    }

    fn into_element(self) -> Element {
        Element::Image(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pan_is_percent_of_frame_and_clamped() {
        let offset = PanOffset::default().panned(Vec2::new(30.0, -15.0), Size::new(300.0, 300.0));
        assert!((offset.x - 10.0).abs() < 1e-9);
        assert!((offset.y + 5.0).abs() < 1e-9);

        let far = offset.panned(Vec2::new(1000.0, -1000.0), Size::new(300.0, 300.0));
        assert_eq!(far, PanOffset::new(50.0, -50.0));
        assert_eq!(far.object_position(), (100.0, 0.0));
    }

    #[test]
    fn test_cascade() {
        let frame = UserImage::cascaded_frame(UserImage::DEFAULT_FRAME, 2);
        assert_eq!(frame.origin(), Point::new(190.0, 190.0));
        assert_eq!(frame.size(), Size::new(300.0, 300.0));
    }

    #[test]
    fn test_new_image_defaults() {
        let image =
            UserImage::new(ImageSource::parse("/uploads/s/1-a.png"), UserImage::DEFAULT_FRAME);
        assert_eq!(image.shape, ShapeKind::Rectangle);
        assert_eq!(image.offset, PanOffset::default());
        assert_eq!(image.bounds(), UserImage::DEFAULT_FRAME);
    }
}
