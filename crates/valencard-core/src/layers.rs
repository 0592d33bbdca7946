//! Layer panel model.
//!
//! The panel lists every element topmost-first: the reverse of paint order
//! (images, then stickers, then text). Hidden flags live here rather than on
//! the elements, so toggling visibility never touches the scene or history.

use crate::element::{Element, ElementId, ElementKind};
use crate::scene::Scene;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Longest label shown for a text layer, in characters.
pub const MAX_LABEL_CHARS: usize = 24;

/// Direction for reordering an element within its own collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZOrder {
    /// Swap with the next element (no-op at the top).
    Forward,
    /// Swap with the previous element (no-op at the bottom).
    Backward,
    /// Move to the end of the collection.
    ToFront,
    /// Move to the start of the collection.
    ToBack,
}

/// One row of the layer panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerEntry {
    pub id: ElementId,
    pub kind: ElementKind,
    pub label: String,
    /// Image reference used as preview, absent for text.
    pub thumbnail: Option<String>,
    pub hidden: bool,
}

/// Per-id visibility toggles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HiddenSet {
    ids: HashSet<ElementId>,
}

impl HiddenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip visibility; returns the new hidden state.
    pub fn toggle(&mut self, id: &ElementId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    pub fn is_hidden(&self, id: &ElementId) -> bool {
        self.ids.contains(id)
    }

    /// Forget an id (after the element is deleted).
    pub fn forget(&mut self, id: &ElementId) {
        self.ids.remove(id);
    }

    /// Drop ids that no longer exist in the scene.
    pub fn retain_existing(&mut self, scene: &Scene) {
        self.ids.retain(|id| scene.locate(id).is_some());
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Map a panel (topmost-first) index to a paint-order index.
pub fn panel_to_paint_index(total: usize, panel_index: usize) -> Option<usize> {
    (panel_index < total).then(|| total - 1 - panel_index)
}

/// Build the layer panel rows.
pub fn layer_list(scene: &Scene, hidden: &HiddenSet) -> Vec<LayerEntry> {
    let mut entries: Vec<LayerEntry> = scene
        .paint_order()
        .into_iter()
        .map(|element| entry_for(&element, hidden))
        .collect();
    entries.reverse();
    entries
}

fn entry_for(element: &Element, hidden: &HiddenSet) -> LayerEntry {
    let (label, thumbnail) = match element {
        Element::Image(image) => ("Image".to_string(), Some(image.source.to_string())),
        Element::Sticker(sticker) => ("Sticker".to_string(), Some(sticker.source.to_string())),
        Element::Text(text) => (truncate_label(text.label()), None),
    };
    LayerEntry {
        id: element.id().clone(),
        kind: element.kind(),
        label,
        thumbnail,
        hidden: hidden.is_hidden(element.id()),
    }
}

fn truncate_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_CHARS {
        return label.to_string();
    }
    let mut short: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
    short.push('…');
    short
}
