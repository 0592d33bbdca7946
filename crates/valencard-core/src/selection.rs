//! Single-element selection and the clipboard.

use crate::element::{Element, ElementId, ElementKind};
use kurbo::Vec2;

/// Offset applied to pasted and duplicated elements.
pub const PASTE_OFFSET: f64 = 20.0;

/// A reference to an element by kind and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub kind: ElementKind,
    pub id: ElementId,
}

impl ElementRef {
    pub fn new(kind: ElementKind, id: ElementId) -> Self {
        Self { kind, id }
    }
}

/// At most one selected element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    current: Option<ElementRef>,
}

impl Selection {
    /// Select an element, replacing any previous selection.
    pub fn select(&mut self, kind: ElementKind, id: ElementId) {
        self.current = Some(ElementRef::new(kind, id));
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn get(&self) -> Option<&ElementRef> {
        self.current.as_ref()
    }

    pub fn is_selected(&self, id: &ElementId) -> bool {
        self.current.as_ref().is_some_and(|r| &r.id == id)
    }

    /// Selected id if it is of the given kind.
    pub fn selected_of(&self, kind: ElementKind) -> Option<&ElementId> {
        self.current
            .as_ref()
            .filter(|r| r.kind == kind)
            .map(|r| &r.id)
    }
}

/// Holds at most one copied element.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    entry: Option<Element>,
}

impl Clipboard {
    /// Replace the clipboard content.
    pub fn store(&mut self, element: Element) {
        self.entry = Some(element);
    }

    pub fn peek(&self) -> Option<&Element> {
        self.entry.as_ref()
    }

    pub fn kind(&self) -> Option<ElementKind> {
        self.entry.as_ref().map(Element::kind)
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }

    /// A pasteable copy: fresh id, shifted by [`PASTE_OFFSET`].
    pub fn paste_copy(&self) -> Option<Element> {
        self.entry.as_ref().map(offset_copy)
    }
}

/// Copy of `element` with a new id, moved by [`PASTE_OFFSET`] on both axes.
pub fn offset_copy(element: &Element) -> Element {
    let mut copy = element.clone().with_fresh_id();
    copy.translate(Vec2::new(PASTE_OFFSET, PASTE_OFFSET));
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::TextElement;
    use kurbo::Point;

    #[test]
    fn test_select_replaces_previous() {
        let mut selection = Selection::default();
        selection.select(ElementKind::Sticker, ElementId::from_raw("sticker-1"));
        selection.select(ElementKind::Text, ElementId::from_raw("text-1"));
        assert_eq!(selection.selected_of(ElementKind::Sticker), None);
        assert_eq!(
            selection.selected_of(ElementKind::Text),
            Some(&ElementId::from_raw("text-1"))
        );
    }

    #[test]
    fn test_paste_copy_offsets_and_renames() {
        let mut clipboard = Clipboard::default();
        assert!(clipboard.paste_copy().is_none());
        let text = Element::Text(TextElement::new(Point::new(250.0, 250.0), "hi"));
        clipboard.store(text.clone());
        let pasted = clipboard.paste_copy().unwrap();
        assert_ne!(pasted.id(), text.id());
        assert_eq!(pasted.position(), Point::new(270.0, 270.0));
        assert_eq!(clipboard.kind(), Some(ElementKind::Text));
    }
}
