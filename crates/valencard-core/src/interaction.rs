//! Pointer gesture state machine.
//!
//! At most one gesture runs at a time. A pointer-down starts one only when
//! the machine is idle; moves apply geometry to the scene directly; the
//! pointer-up returns to idle and reports whether a gesture ended so the
//! caller can commit a single history entry.

use crate::element::{AspectLock, Element, ElementId, ElementKind, ElementPatch, PanOffset};
use crate::geometry::{compute_resize, pointer_angle, rotation_from_angles};
use crate::handles::{Corner, HandleKind, hit_test_handles};
use crate::layers::HiddenSet;
use crate::scene::Scene;
use crate::selection::{ElementRef, Selection};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// What a pointer-down landed on.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerTarget {
    /// The body of an element.
    Body(ElementRef),
    /// A corner resize handle of the selected element.
    Handle(ElementRef, Corner),
    /// The rotate handle of the selected element.
    RotateHandle(ElementRef),
    /// Empty canvas.
    Background,
}

impl PointerTarget {
    pub fn element(&self) -> Option<&ElementRef> {
        match self {
            PointerTarget::Body(r)
            | PointerTarget::Handle(r, _)
            | PointerTarget::RotateHandle(r) => Some(r),
            PointerTarget::Background => None,
        }
    }
}

/// Work out what lies under `point`. Handles of the selected element win
/// over element bodies. Hidden elements take no pointer input.
pub fn resolve_target(
    scene: &Scene,
    hidden: &HiddenSet,
    selection: &Selection,
    point: Point,
) -> PointerTarget {
    if let Some(selected) = selection.get().filter(|r| !hidden.is_hidden(&r.id)) {
        if let Some(element) = scene.element(selected.kind, &selected.id) {
            match hit_test_handles(&element, point) {
                Some(HandleKind::Corner(corner)) => {
                    return PointerTarget::Handle(selected.clone(), corner);
                }
                Some(HandleKind::Rotate) => return PointerTarget::RotateHandle(selected.clone()),
                None => {}
            }
        }
    }
    match scene.element_at(point, hidden) {
        Some((kind, id)) => PointerTarget::Body(ElementRef::new(kind, id)),
        None => PointerTarget::Background,
    }
}

/// The active gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    Dragging {
        target: ElementRef,
        /// Pointer position relative to the element origin at grab time.
        pointer_offset: Vec2,
    },
    Resizing {
        target: ElementRef,
        corner: Corner,
        /// Frame at grab time.
        origin: Rect,
        lock: AspectLock,
    },
    Rotating {
        target: ElementRef,
        center: Point,
        start_angle: f64,
        base_rotation: f64,
    },
    PanningImageCrop {
        id: ElementId,
        pointer_start: Point,
        base_offset: PanOffset,
        frame: Size,
    },
}

impl Interaction {
    pub fn is_active(&self) -> bool {
        !matches!(self, Interaction::Idle)
    }

    /// Element the gesture is acting on.
    pub fn target_id(&self) -> Option<&ElementId> {
        match self {
            Interaction::Idle => None,
            Interaction::Dragging { target, .. }
            | Interaction::Resizing { target, .. }
            | Interaction::Rotating { target, .. } => Some(&target.id),
            Interaction::PanningImageCrop { id, .. } => Some(id),
        }
    }

    /// Start a gesture for a pointer-down.
    ///
    /// Returns `false` (and stays as is) when a gesture is already running,
    /// the pointer hit the background, or the element is gone.
    pub fn begin(
        &mut self,
        scene: &Scene,
        target: &PointerTarget,
        pointer: Point,
        modifiers: Modifiers,
    ) -> bool {
        if self.is_active() {
            return false;
        }
        let Some(element_ref) = target.element() else {
            return false;
        };
        let Some(element) = scene.element(element_ref.kind, &element_ref.id) else {
            return false;
        };

        let next = match target {
            PointerTarget::Body(r) if r.kind == ElementKind::Image && modifiers.alt => {
                let Some(image) = scene.image(&r.id) else {
                    return false;
                };
                Interaction::PanningImageCrop {
                    id: r.id.clone(),
                    pointer_start: pointer,
                    base_offset: image.offset,
                    frame: image.size(),
                }
            }
            PointerTarget::Body(r) => Interaction::Dragging {
                target: r.clone(),
                pointer_offset: pointer - element.position(),
            },
            PointerTarget::Handle(r, corner) => {
                let lock = match &element {
                    Element::Sticker(s) => s.shape.aspect_lock(),
                    Element::Image(i) => i.shape.aspect_lock(),
                    // Text is sized by its font, not by handles.
                    Element::Text(_) => return false,
                };
                Interaction::Resizing {
                    target: r.clone(),
                    corner: *corner,
                    origin: element.bounds(),
                    lock,
                }
            }
            PointerTarget::RotateHandle(r) => {
                let center = element.rotation_center();
                Interaction::Rotating {
                    target: r.clone(),
                    center,
                    start_angle: pointer_angle(center, pointer),
                    base_rotation: element.rotation(),
                }
            }
            PointerTarget::Background => return false,
        };
        *self = next;
        true
    }

    /// Apply a pointer move to the scene.
    ///
    /// Returns `true` if the scene changed. A vanished element leaves the
    /// scene untouched.
    pub fn update(&self, scene: &mut Scene, pointer: Point) -> bool {
        match self {
            Interaction::Idle => false,
            Interaction::Dragging {
                target,
                pointer_offset,
            } => scene.update(
                target.kind,
                &target.id,
                &ElementPatch::position(pointer - *pointer_offset),
            ),
            Interaction::Resizing {
                target,
                corner,
                origin,
                lock,
            } => {
                let min_size = target.kind.min_size();
                let frame = compute_resize(*origin, *corner, pointer, *lock, min_size);
                scene.update(target.kind, &target.id, &ElementPatch::frame(frame))
            }
            Interaction::Rotating {
                target,
                center,
                start_angle,
                base_rotation,
            } => {
                let current = pointer_angle(*center, pointer);
                let rotation = rotation_from_angles(*start_angle, current, *base_rotation);
                scene.update(target.kind, &target.id, &ElementPatch::rotation(rotation))
            }
            Interaction::PanningImageCrop {
                id,
                pointer_start,
                base_offset,
                frame,
            } => {
                let offset = base_offset.panned(pointer - *pointer_start, *frame);
                scene.update(ElementKind::Image, id, &ElementPatch::offset(offset))
            }
        }
    }

    /// Return to idle. Returns whether a gesture was running.
    pub fn end(&mut self) -> bool {
        let was_active = self.is_active();
        *self = Interaction::Idle;
        was_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ShapeKind, Sticker, TextElement, UserImage};
    use crate::source::{ImageSource, StickerSource};

    fn heart_scene() -> (Scene, ElementRef) {
        let mut scene = Scene::new();
        let mut sticker = Sticker::new(
            StickerSource::parse("💖"),
            Point::new(100.0, 100.0),
            Size::new(100.0, 100.0),
        );
        sticker.shape = ShapeKind::Heart;
        let id = scene.add(Element::Sticker(sticker));
        (scene, ElementRef::new(ElementKind::Sticker, id))
    }

    #[test]
    fn test_drag_moves_by_pointer_offset() {
        let (mut scene, r) = heart_scene();
        let mut interaction = Interaction::default();
        let body = PointerTarget::Body(r.clone());
        assert!(interaction.begin(&scene, &body, Point::new(110.0, 120.0), Modifiers::NONE));
        assert!(interaction.update(&mut scene, Point::new(160.0, 170.0)));
        assert_eq!(scene.sticker(&r.id).unwrap().position, Point::new(150.0, 150.0));
        assert!(interaction.end());
        assert!(!interaction.end());
    }

    #[test]
    fn test_first_gesture_wins() {
        let (scene, r) = heart_scene();
        let mut interaction = Interaction::default();
        let rotate = PointerTarget::RotateHandle(r.clone());
        assert!(interaction.begin(&scene, &rotate, Point::new(150.0, 68.0), Modifiers::NONE));
        let body = PointerTarget::Body(r);
        assert!(!interaction.begin(&scene, &body, Point::new(150.0, 150.0), Modifiers::NONE));
        assert!(matches!(interaction, Interaction::Rotating { .. }));
    }

    #[test]
    fn test_resize_heart_from_se() {
        let (mut scene, r) = heart_scene();
        let mut interaction = Interaction::default();
        let target = PointerTarget::Handle(r.clone(), Corner::Se);
        assert!(interaction.begin(&scene, &target, Point::new(200.0, 200.0), Modifiers::NONE));
        interaction.update(&mut scene, Point::new(240.0, 240.0));
        let sticker = scene.sticker(&r.id).unwrap();
        assert_eq!((sticker.width, sticker.height), (140.0, 140.0));
        assert_eq!(sticker.position, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_resize_image_respects_larger_floor() {
        let mut scene = Scene::new();
        let id = scene.add(Element::Image(UserImage::new(
            ImageSource::parse("/uploads/s/a.png"),
            UserImage::DEFAULT_FRAME,
        )));
        let r = ElementRef::new(ElementKind::Image, id.clone());
        let mut interaction = Interaction::default();
        let handle = PointerTarget::Handle(r, Corner::Se);
        interaction.begin(&scene, &handle, Point::new(450.0, 450.0), Modifiers::NONE);
        interaction.update(&mut scene, Point::new(0.0, 0.0));
        let image = scene.image(&id).unwrap();
        assert_eq!((image.width, image.height), (100.0, 100.0));
    }

    #[test]
    fn test_text_cannot_be_resized() {
        let mut scene = Scene::new();
        let id = scene.add(Element::Text(TextElement::new(Point::new(0.0, 0.0), "hi")));
        let mut interaction = Interaction::default();
        let target = PointerTarget::Handle(ElementRef::new(ElementKind::Text, id), Corner::Se);
        assert!(!interaction.begin(&scene, &target, Point::ZERO, Modifiers::NONE));
        assert!(!interaction.is_active());
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let (mut scene, r) = heart_scene();
        let mut interaction = Interaction::default();
        // Centre is (150, 150); grab to the right, move below.
        let rotate = PointerTarget::RotateHandle(r.clone());
        interaction.begin(&scene, &rotate, Point::new(200.0, 150.0), Modifiers::NONE);
        interaction.update(&mut scene, Point::new(150.0, 200.0));
        assert!((scene.sticker(&r.id).unwrap().rotation - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_alt_on_image_pans() {
        let mut scene = Scene::new();
        let id = scene.add(Element::Image(UserImage::new(
            ImageSource::parse("/uploads/s/a.png"),
            UserImage::DEFAULT_FRAME,
        )));
        let r = ElementRef::new(ElementKind::Image, id.clone());
        let mut interaction = Interaction::default();
        let body = PointerTarget::Body(r);
        assert!(interaction.begin(&scene, &body, Point::new(300.0, 300.0), Modifiers::alt()));
        assert!(matches!(interaction, Interaction::PanningImageCrop { .. }));
        interaction.update(&mut scene, Point::new(330.0, 300.0));
        let image = scene.image(&id).unwrap();
        assert!((image.offset.x - 10.0).abs() < 1e-9);
        assert_eq!(image.position, UserImage::DEFAULT_FRAME.origin());
    }

    #[test]
    fn test_vanished_element_update_is_noop() {
        let (mut scene, r) = heart_scene();
        let mut interaction = Interaction::default();
        let body = PointerTarget::Body(r.clone());
        interaction.begin(&scene, &body, Point::new(120.0, 120.0), Modifiers::NONE);
        scene.remove(r.kind, &r.id);
        let before = scene.clone();
        assert!(!interaction.update(&mut scene, Point::new(300.0, 300.0)));
        assert_eq!(scene, before);
        assert!(interaction.end());
    }

    #[test]
    fn test_resolve_prefers_selected_handles() {
        let (scene, r) = heart_scene();
        let mut hidden = HiddenSet::new();
        let mut selection = Selection::default();
        let corner = Point::new(199.0, 199.0);
        assert_eq!(
            resolve_target(&scene, &hidden, &selection, corner),
            PointerTarget::Body(r.clone())
        );
        selection.select(r.kind, r.id.clone());
        assert_eq!(
            resolve_target(&scene, &hidden, &selection, corner),
            PointerTarget::Handle(r.clone(), Corner::Se)
        );
        assert_eq!(
            resolve_target(&scene, &hidden, &selection, Point::new(500.0, 700.0)),
            PointerTarget::Background
        );

        // A hidden selection exposes neither handles nor body.
        hidden.toggle(&r.id);
        assert_eq!(resolve_target(&scene, &hidden, &selection, corner), PointerTarget::Background);
    }
}
