//! The card scene: three ordered element collections plus a background.
//!
//! Kind decides coarse stacking (images under stickers under text); the
//! position inside a collection decides stacking within that kind. Every
//! mutation addressed by id silently does nothing when the id is gone, so a
//! late poll result or a stale gesture can never fail.

use crate::background::Background;
use crate::element::{
    Element, ElementId, ElementKind, ElementPatch, SceneItem, Sticker, TextElement, UserImage,
};
use crate::layers::{HiddenSet, ZOrder};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Canvas width in pixels.
pub const CANVAS_WIDTH: f64 = 600.0;
/// Canvas height in pixels.
pub const CANVAS_HEIGHT: f64 = 800.0;

/// Complete card content.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub stickers: Vec<Sticker>,
    pub text_elements: Vec<TextElement>,
    pub user_images: Vec<UserImage>,
    pub background: Background,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(background: Background) -> Self {
        Self {
            background,
            ..Self::default()
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Total number of elements across all kinds.
    pub fn len(&self) -> usize {
        self.stickers.len() + self.text_elements.len() + self.user_images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append an element to its collection, returning its id.
    pub fn add(&mut self, element: Element) -> ElementId {
        let id = element.id().clone();
        match element {
            Element::Sticker(s) => self.stickers.push(s),
            Element::Text(t) => self.text_elements.push(t),
            Element::Image(i) => self.user_images.push(i),
        }
        id
    }

    /// Which collection holds `id`, if any.
    pub fn locate(&self, id: &ElementId) -> Option<ElementKind> {
        if self.stickers.iter().any(|s| s.id() == id) {
            Some(ElementKind::Sticker)
        } else if self.text_elements.iter().any(|t| t.id() == id) {
            Some(ElementKind::Text)
        } else if self.user_images.iter().any(|i| i.id() == id) {
            Some(ElementKind::Image)
        } else {
            None
        }
    }

    pub fn contains(&self, kind: ElementKind, id: &ElementId) -> bool {
        match kind {
            ElementKind::Sticker => self.sticker(id).is_some(),
            ElementKind::Text => self.text(id).is_some(),
            ElementKind::Image => self.image(id).is_some(),
        }
    }

    pub fn sticker(&self, id: &ElementId) -> Option<&Sticker> {
        self.stickers.iter().find(|s| s.id() == id)
    }

    pub fn text(&self, id: &ElementId) -> Option<&TextElement> {
        self.text_elements.iter().find(|t| t.id() == id)
    }

    pub fn image(&self, id: &ElementId) -> Option<&UserImage> {
        self.user_images.iter().find(|i| i.id() == id)
    }

    /// Owned copy of an element.
    pub fn element(&self, kind: ElementKind, id: &ElementId) -> Option<Element> {
        match kind {
            ElementKind::Sticker => self.sticker(id).cloned().map(Element::Sticker),
            ElementKind::Text => self.text(id).cloned().map(Element::Text),
            ElementKind::Image => self.image(id).cloned().map(Element::Image),
        }
    }

    /// Apply a patch. Returns `false` when the id is gone.
    pub fn update(&mut self, kind: ElementKind, id: &ElementId, patch: &ElementPatch) -> bool {
        let applied = match kind {
            ElementKind::Sticker => update_in(&mut self.stickers, id, patch),
            ElementKind::Text => update_in(&mut self.text_elements, id, patch),
            ElementKind::Image => update_in(&mut self.user_images, id, patch),
        };
        if !applied {
            log::debug!("Dropped update for missing {} {}", kind.as_str(), id);
        }
        applied
    }

    /// Remove an element, returning it if it existed.
    pub fn remove(&mut self, kind: ElementKind, id: &ElementId) -> Option<Element> {
        let removed = match kind {
            ElementKind::Sticker => remove_from(&mut self.stickers, id),
            ElementKind::Text => remove_from(&mut self.text_elements, id),
            ElementKind::Image => remove_from(&mut self.user_images, id),
        };
        if removed.is_none() {
            log::debug!("Nothing to remove for {} {}", kind.as_str(), id);
        }
        removed
    }

    /// Move an element within its own collection. Returns `true` if the order changed.
    pub fn reorder_within_type(
        &mut self,
        kind: ElementKind,
        id: &ElementId,
        order: ZOrder,
    ) -> bool {
        match kind {
            ElementKind::Sticker => reorder_in(&mut self.stickers, id, order),
            ElementKind::Text => reorder_in(&mut self.text_elements, id, order),
            ElementKind::Image => reorder_in(&mut self.user_images, id, order),
        }
    }

    /// Move an element between two paint-order positions.
    ///
    /// Both indices must fall within the same kind's segment; moves that
    /// would cross from one kind to another are ignored.
    pub fn reorder_across_layers(&mut self, from: usize, to: usize) -> bool {
        let (Some((from_kind, from_local)), Some((to_kind, to_local))) =
            (self.split_flat_index(from), self.split_flat_index(to))
        else {
            return false;
        };
        if from_kind != to_kind {
            log::debug!(
                "Ignoring cross-layer move from {} to {}",
                from_kind.as_str(),
                to_kind.as_str()
            );
            return false;
        }
        match from_kind {
            ElementKind::Sticker => move_in(&mut self.stickers, from_local, to_local),
            ElementKind::Text => move_in(&mut self.text_elements, from_local, to_local),
            ElementKind::Image => move_in(&mut self.user_images, from_local, to_local),
        }
    }

    /// Split a paint-order index into `(kind, index within kind)`.
    pub fn split_flat_index(&self, flat: usize) -> Option<(ElementKind, usize)> {
        let images = self.user_images.len();
        let stickers = self.stickers.len();
        if flat < images {
            Some((ElementKind::Image, flat))
        } else if flat < images + stickers {
            Some((ElementKind::Sticker, flat - images))
        } else if flat < self.len() {
            Some((ElementKind::Text, flat - images - stickers))
        } else {
            None
        }
    }

    /// Every element, bottom to top.
    pub fn paint_order(&self) -> Vec<Element> {
        self.user_images
            .iter()
            .cloned()
            .map(Element::Image)
            .chain(self.stickers.iter().cloned().map(Element::Sticker))
            .chain(self.text_elements.iter().cloned().map(Element::Text))
            .collect()
    }

    /// Topmost visible element whose body contains `point`.
    pub fn element_at(&self, point: Point, hidden: &HiddenSet) -> Option<(ElementKind, ElementId)> {
        self.paint_order()
            .into_iter()
            .rev()
            .filter(|element| !hidden.is_hidden(element.id()))
            .find(|element| element.hit_test(point))
            .map(|element| (element.kind(), element.id().clone()))
    }

    /// Sources of all user images, for deduplicating remote uploads.
    pub fn image_sources(&self) -> impl Iterator<Item = &str> {
        self.user_images.iter().map(|i| i.source.as_str())
    }
}

fn update_in<T: SceneItem>(items: &mut [T], id: &ElementId, patch: &ElementPatch) -> bool {
    match items.iter_mut().find(|item| item.id() == id) {
        Some(item) => {
            item.apply(patch);
            true
        }
        None => false,
    }
}

fn remove_from<T: SceneItem>(items: &mut Vec<T>, id: &ElementId) -> Option<Element> {
    let index = items.iter().position(|item| item.id() == id)?;
    Some(items.remove(index).into_element())
}

fn reorder_in<T: SceneItem>(items: &mut Vec<T>, id: &ElementId, order: ZOrder) -> bool {
    let Some(index) = items.iter().position(|item| item.id() == id) else {
        return false;
    };
    let last = items.len() - 1;
    match order {
        ZOrder::Forward if index < last => items.swap(index, index + 1),
        ZOrder::Backward if index > 0 => items.swap(index, index - 1),
        ZOrder::ToFront if index < last => {
            let item = items.remove(index);
            items.push(item);
        }
        ZOrder::ToBack if index > 0 => {
            let item = items.remove(index);
            items.insert(0, item);
        }
        _ => return false,
    }
    true
}

fn move_in<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}
