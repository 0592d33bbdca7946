//! Editor session: scene, history, selection and gestures in one place.
//!
//! Every user-visible mutation goes through [`Editor`], which commits one
//! history entry per completed action. Pointer moves during a gesture are
//! applied live and committed once on pointer-up.

use crate::background::Background;
use crate::element::{
    Element, ElementId, ElementKind, ElementPatch, Sticker, TextElement, TextTemplate, UserImage,
};
use crate::history::History;
use crate::interaction::{Interaction, Modifiers, PointerTarget, resolve_target};
use crate::layers::{HiddenSet, LayerEntry, ZOrder, layer_list, panel_to_paint_index};
use crate::scene::Scene;
use crate::selection::{Clipboard, ElementRef, Selection, offset_copy};
use crate::shortcuts::EditorCommand;
use crate::source::{ImageSource, normalize_sticker_source};
use crate::templates::{ImageArea, template};
use kurbo::{Point, Rect, Vec2};
use std::collections::HashSet;
use std::ops::Deref;

/// Where click-added stickers land.
pub const STICKER_PLACEMENT: Point = Point::new(200.0, 200.0);
/// Where new text lands.
pub const TEXT_PLACEMENT: Point = Point::new(250.0, 250.0);

/// An editing session over one card.
#[derive(Debug)]
pub struct Editor {
    scene: Scene,
    history: History,
    selection: Selection,
    clipboard: Clipboard,
    interaction: Interaction,
    hidden: HiddenSet,
    image_area: Option<ImageArea>,
    exporting: bool,
    pending_upload_deletes: Vec<String>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Background::default())
    }
}

impl Editor {
    /// Start a session on an empty card.
    pub fn new(background: Background) -> Self {
        let scene = Scene::with_background(background);
        Self {
            history: History::new(scene.clone()),
            scene,
            selection: Selection::default(),
            clipboard: Clipboard::default(),
            interaction: Interaction::default(),
            hidden: HiddenSet::new(),
            image_area: None,
            exporting: false,
            pending_upload_deletes: Vec::new(),
        }
    }

    /// Start a session from a template id.
    pub fn from_template(id: &str) -> Self {
        let Some(t) = template(id) else {
            return Self::default();
        };
        let mut editor = Self::new(t.background());
        editor.image_area = t.image_area;
        editor
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn hidden(&self) -> &HiddenSet {
        &self.hidden
    }

    pub fn image_area(&self) -> Option<&ImageArea> {
        self.image_area.as_ref()
    }

    /// Whether an export is running; painters suppress decorations meanwhile.
    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    fn commit(&mut self) -> bool {
        self.history.commit(&self.scene)
    }

    // --- Selection ---------------------------------------------------------

    /// Select an existing element. Returns `false` for unknown ids.
    pub fn select(&mut self, kind: ElementKind, id: &ElementId) -> bool {
        if !self.scene.contains(kind, id) {
            return false;
        }
        self.selection.select(kind, id.clone());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Click on empty canvas.
    pub fn click_background(&mut self) {
        self.selection.clear();
    }

    pub fn selected_element(&self) -> Option<Element> {
        let r = self.selection.get()?;
        self.scene.element(r.kind, &r.id)
    }

    // --- Creation ----------------------------------------------------------

    /// Add an element, select it and commit.
    pub fn add_element(&mut self, element: Element) -> ElementId {
        let kind = element.kind();
        let id = self.scene.add(element);
        self.selection.select(kind, id.clone());
        self.commit();
        id
    }

    /// Add a palette sticker at the default spot.
    pub fn add_sticker(&mut self, raw: &str, as_icon: bool) -> ElementId {
        let source = normalize_sticker_source(raw, as_icon);
        self.add_element(Element::Sticker(Sticker::with_default_size(source, STICKER_PLACEMENT)))
    }

    /// Add a palette sticker centred on a drop point.
    pub fn drop_sticker_at(&mut self, raw: &str, as_icon: bool, point: Point) -> ElementId {
        let source = normalize_sticker_source(raw, as_icon);
        let half = Sticker::default_edge(&source) / 2.0;
        let position = point - Vec2::new(half, half);
        self.add_element(Element::Sticker(Sticker::with_default_size(source, position)))
    }

    /// Move an existing element dropped on the canvas.
    ///
    /// Stickers centre on the drop point; text anchors its origin there.
    pub fn drop_existing_at(&mut self, kind: ElementKind, id: &ElementId, point: Point) -> bool {
        let position = match kind {
            ElementKind::Sticker => match self.scene.sticker(id) {
                Some(s) => point - Vec2::new(s.width / 2.0, s.height / 2.0),
                None => return false,
            },
            ElementKind::Text => point,
            ElementKind::Image => return false,
        };
        self.update_element(kind, id, &ElementPatch::position(position))
    }

    pub fn add_text(&mut self) -> ElementId {
        self.add_element(Element::Text(TextElement::new(
            TEXT_PLACEMENT,
            TextElement::DEFAULT_TEXT,
        )))
    }

    pub fn add_text_template(&mut self, template: &TextTemplate) -> ElementId {
        self.add_element(Element::Text(TextElement::from_template(
            template,
            TextTemplate::PLACEMENT,
        )))
    }

    /// Add a batch of images, cascading from the active image area.
    ///
    /// Selects the last one and commits once.
    pub fn add_images<I>(&mut self, sources: I) -> Vec<ElementId>
    where
        I: IntoIterator<Item = ImageSource>,
    {
        let area = self
            .image_area
            .map(|a| a.frame)
            .unwrap_or(UserImage::DEFAULT_FRAME);
        let base_index = self.scene.user_images.len();
        let ids: Vec<ElementId> = sources
            .into_iter()
            .enumerate()
            .map(|(i, source)| {
                let frame = UserImage::cascaded_frame(area, base_index + i);
                self.scene.add(Element::Image(UserImage::new(source, frame)))
            })
            .collect();
        if let Some(last) = ids.last() {
            self.selection.select(ElementKind::Image, last.clone());
            self.commit();
        }
        ids
    }

    /// Merge image URLs reported by the upload relay.
    ///
    /// URLs already on the card are skipped, so repeated polls are harmless.
    /// Returns how many images were added; selection and history are left
    /// alone when nothing is new.
    pub fn merge_remote_uploads(&mut self, urls: &[String]) -> usize {
        let mut known: HashSet<String> = self.scene.image_sources().map(str::to_string).collect();
        let fresh: Vec<ImageSource> = urls
            .iter()
            .filter(|url| known.insert((*url).clone()))
            .map(|url| ImageSource::parse(url))
            .collect();
        let added = self.add_images(fresh).len();
        if added > 0 {
            log::info!("Merged {} uploaded image(s)", added);
        }
        added
    }

    // --- Editing -----------------------------------------------------------

    /// Patch an element and commit. Stale ids are ignored.
    pub fn update_element(
        &mut self,
        kind: ElementKind,
        id: &ElementId,
        patch: &ElementPatch,
    ) -> bool {
        if !self.scene.update(kind, id, patch) {
            return false;
        }
        self.commit();
        true
    }

    /// Replace an image's source (after cropping, for instance).
    pub fn set_image_source(&mut self, id: &ElementId, source: ImageSource) -> bool {
        let Some(image) = self.scene.user_images.iter_mut().find(|i| i.id() == id) else {
            return false;
        };
        image.source = source;
        self.commit();
        true
    }

    /// Remove an element and commit. Clears the selection if it pointed there.
    pub fn delete_element(&mut self, kind: ElementKind, id: &ElementId) -> bool {
        let Some(removed) = self.scene.remove(kind, id) else {
            return false;
        };
        if self.selection.is_selected(id) {
            self.selection.clear();
        }
        self.hidden.forget(id);
        if let Element::Image(image) = &removed {
            if image.source.looks_like_upload() {
                self.pending_upload_deletes.push(image.source.to_string());
            }
        }
        self.commit();
        true
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.selection.get().cloned() {
            Some(ElementRef { kind, id }) => self.delete_element(kind, &id),
            None => false,
        }
    }

    /// Upload URLs deleted from the card that the relay must forget.
    pub fn take_pending_upload_deletes(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_upload_deletes)
    }

    /// Put back deletes the relay did not acknowledge, for the next flush.
    pub fn requeue_upload_deletes<I>(&mut self, urls: I)
    where
        I: IntoIterator<Item = String>,
    {
        for url in urls {
            if !self.pending_upload_deletes.contains(&url) {
                self.pending_upload_deletes.push(url);
            }
        }
    }

    // --- Clipboard ---------------------------------------------------------

    pub fn copy(&mut self) -> bool {
        match self.selected_element() {
            Some(element) => {
                self.clipboard.store(element);
                true
            }
            None => false,
        }
    }

    pub fn cut(&mut self) -> bool {
        let Some(element) = self.selected_element() else {
            return false;
        };
        let (kind, id) = (element.kind(), element.id().clone());
        self.clipboard.store(element);
        self.delete_element(kind, &id)
    }

    pub fn paste(&mut self) -> Option<ElementId> {
        let copy = self.clipboard.paste_copy()?;
        Some(self.add_element(copy))
    }

    /// Copy the selected element in place, offset, without the clipboard.
    pub fn duplicate(&mut self) -> Option<ElementId> {
        let element = self.selected_element()?;
        Some(self.add_element(offset_copy(&element)))
    }

    // --- Layers ------------------------------------------------------------

    pub fn reorder(&mut self, kind: ElementKind, id: &ElementId, order: ZOrder) -> bool {
        if !self.scene.reorder_within_type(kind, id, order) {
            return false;
        }
        self.commit();
        true
    }

    pub fn bring_forward(&mut self, kind: ElementKind, id: &ElementId) -> bool {
        self.reorder(kind, id, ZOrder::Forward)
    }

    pub fn send_backward(&mut self, kind: ElementKind, id: &ElementId) -> bool {
        self.reorder(kind, id, ZOrder::Backward)
    }

    pub fn bring_to_front(&mut self, kind: ElementKind, id: &ElementId) -> bool {
        self.reorder(kind, id, ZOrder::ToFront)
    }

    pub fn send_to_back(&mut self, kind: ElementKind, id: &ElementId) -> bool {
        self.reorder(kind, id, ZOrder::ToBack)
    }

    /// Rows of the layer panel, topmost first.
    pub fn layers(&self) -> Vec<LayerEntry> {
        layer_list(&self.scene, &self.hidden)
    }

    /// Drag-reorder in the layer panel, using panel (topmost-first) indices.
    pub fn reorder_layer_panel(&mut self, from: usize, to: usize) -> bool {
        let total = self.scene.len();
        let (Some(from), Some(to)) = (
            panel_to_paint_index(total, from),
            panel_to_paint_index(total, to),
        ) else {
            return false;
        };
        if !self.scene.reorder_across_layers(from, to) {
            return false;
        }
        self.commit();
        true
    }

    /// Flip an element's visibility. Returns the new hidden state.
    pub fn toggle_hidden(&mut self, id: &ElementId) -> bool {
        self.hidden.toggle(id)
    }

    pub fn is_hidden(&self, id: &ElementId) -> bool {
        self.hidden.is_hidden(id)
    }

    // --- Background and templates -----------------------------------------

    pub fn set_background(&mut self, background: Background) -> bool {
        if self.scene.background == background {
            return false;
        }
        self.scene.background = background;
        self.commit();
        true
    }

    /// Switch to a template's background and image area.
    pub fn apply_template(&mut self, id: &str) -> bool {
        let Some(t) = template(id) else {
            log::warn!("Unknown template {}", id);
            return false;
        };
        self.image_area = t.image_area;
        self.scene.background = t.background();
        self.commit();
        true
    }

    // --- Pointer gestures --------------------------------------------------

    /// Pointer pressed on the canvas.
    ///
    /// Hitting an element selects it and starts the matching gesture;
    /// hitting empty canvas clears the selection.
    pub fn pointer_down(&mut self, point: Point, modifiers: Modifiers) -> PointerTarget {
        let target = resolve_target(&self.scene, &self.hidden, &self.selection, point);
        match target.element() {
            Some(r) => {
                if !self.interaction.is_active() {
                    self.selection.select(r.kind, r.id.clone());
                }
                self.interaction.begin(&self.scene, &target, point, modifiers);
            }
            None => self.click_background(),
        }
        target
    }

    /// Pointer moved; applies the running gesture.
    pub fn pointer_move(&mut self, point: Point) -> bool {
        self.interaction.update(&mut self.scene, point)
    }

    /// Pointer released. Commits one history entry if a gesture ended.
    pub fn pointer_up(&mut self) -> bool {
        if self.interaction.end() {
            self.commit();
            true
        } else {
            false
        }
    }

    // --- History -----------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.scene = snapshot.clone();
        self.selection.clear();
        self.hidden.retain_existing(&self.scene);
        self.interaction.end();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.scene = snapshot.clone();
        self.selection.clear();
        self.hidden.retain_existing(&self.scene);
        self.interaction.end();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Run a keyboard command.
    pub fn apply_command(&mut self, command: EditorCommand) -> bool {
        match command {
            EditorCommand::Undo => self.undo(),
            EditorCommand::Redo => self.redo(),
            EditorCommand::Cut => self.cut(),
            EditorCommand::Copy => self.copy(),
            EditorCommand::Paste => self.paste().is_some(),
            EditorCommand::Duplicate => self.duplicate().is_some(),
            EditorCommand::DeleteSelected => self.delete_selected(),
        }
    }

    // --- Export ------------------------------------------------------------

    /// Mark the editor as exporting until the guard drops.
    pub fn begin_export(&mut self) -> ExportGuard<'_> {
        self.exporting = true;
        ExportGuard { editor: self }
    }

    /// Frame of the element currently selected, for painting decorations.
    pub fn selection_frame(&self) -> Option<Rect> {
        if self.exporting {
            return None;
        }
        self.selected_element().map(|e| e.bounds())
    }
}

/// Keeps the exporting flag set while alive.
pub struct ExportGuard<'a> {
    editor: &'a mut Editor,
}

impl Deref for ExportGuard<'_> {
    type Target = Editor;

    fn deref(&self) -> &Editor {
        self.editor
    }
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        self.editor.exporting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ShapeKind;
    use crate::handles::Corner;

    #[test]
    fn test_add_text_scenario() {
        let mut editor = Editor::default();
        let id = editor.add_text();
        let text = editor.scene().text(&id).unwrap();
        assert_eq!(text.position, Point::new(250.0, 250.0));
        assert_eq!(text.font_size, 24.0);
        assert!(editor.selection().is_selected(&id));
        assert_eq!(editor.history().index(), 1);

        assert!(editor.delete_element(ElementKind::Text, &id));
        assert!(editor.scene().text_elements.is_empty());
        assert!(editor.selection().get().is_none());
        assert_eq!(editor.history().index(), 2);
    }

    #[test]
    fn test_added_element_is_sole_selection() {
        let mut editor = Editor::default();
        let sticker = editor.add_sticker("💖", false);
        let image = editor.add_images([ImageSource::parse("data:image/png;base64,AAAA")]);
        assert!(!editor.selection().is_selected(&sticker));
        assert!(editor.selection().is_selected(&image[0]));
        assert_eq!(editor.scene().locate(&image[0]), Some(ElementKind::Image));
    }

    #[test]
    fn test_sticker_defaults_and_drop_centering() {
        let mut editor = Editor::default();
        let id = editor.add_sticker("1", false);
        let sticker = editor.scene().sticker(&id).unwrap();
        assert_eq!(sticker.source.to_string(), "icon:Star:#fbbf24");
        assert_eq!(sticker.position, STICKER_PLACEMENT);
        assert_eq!(sticker.width, 60.0);

        let dropped = editor.drop_sticker_at("🌹", false, Point::new(300.0, 300.0));
        assert_eq!(editor.scene().sticker(&dropped).unwrap().position, Point::new(260.0, 260.0));
    }

    #[test]
    fn test_images_cascade_from_template_area() {
        let mut editor = Editor::from_template("hearts-bg");
        let ids = editor.add_images([
            ImageSource::parse("data:image/png;base64,AAAA"),
            ImageSource::parse("data:image/png;base64,BBBB"),
        ]);
        assert_eq!(editor.history().index(), 1);
        let second = editor.scene().image(&ids[1]).unwrap();
        assert_eq!(second.position, Point::new(170.0, 170.0));
        assert_eq!((second.width, second.height), (300.0, 300.0));
        assert!(editor.selection().is_selected(&ids[1]));
    }

    #[test]
    fn test_merge_remote_uploads_is_idempotent() {
        let mut editor = Editor::default();
        let urls = vec!["/uploads/s/1-a.png".to_string(), "/uploads/s/2-b.png".to_string()];
        assert_eq!(editor.merge_remote_uploads(&urls), 2);
        let index = editor.history().index();
        editor.click_background();
        assert_eq!(editor.merge_remote_uploads(&urls), 0);
        assert_eq!(editor.scene().user_images.len(), 2);
        assert_eq!(editor.history().index(), index);
        assert!(editor.selection().get().is_none());
    }

    #[test]
    fn test_drag_commits_once() {
        let mut editor = Editor::default();
        let id = editor.add_sticker("/stickers/8.png", false);
        let index = editor.history().index();
        let target = editor.pointer_down(Point::new(210.0, 210.0), Modifiers::NONE);
        assert!(matches!(target, PointerTarget::Body(_)));
        for step in 1..=10 {
            editor.pointer_move(Point::new(210.0 + step as f64, 210.0));
        }
        assert_eq!(editor.history().index(), index);
        assert!(editor.pointer_up());
        assert_eq!(editor.history().index(), index + 1);
        assert_eq!(editor.scene().sticker(&id).unwrap().position, Point::new(210.0, 200.0));
        assert!(!editor.pointer_up());
    }

    #[test]
    fn test_noop_gesture_does_not_grow_history() {
        let mut editor = Editor::default();
        editor.add_sticker("/stickers/8.png", false);
        let len = editor.history().len();
        editor.pointer_down(Point::new(210.0, 210.0), Modifiers::NONE);
        editor.pointer_up();
        assert_eq!(editor.history().len(), len);
    }

    #[test]
    fn test_resize_through_pointer_events() {
        let mut editor = Editor::default();
        let id = editor.add_sticker("/stickers/8.png", false);
        editor.update_element(
            ElementKind::Sticker,
            &id,
            &ElementPatch {
                shape: Some(ShapeKind::Circle),
                ..Default::default()
            },
        );
        // Sticker spans (200,200)-(300,300) and is selected, so the se handle is live.
        let target = editor.pointer_down(Point::new(300.0, 300.0), Modifiers::NONE);
        assert!(matches!(target, PointerTarget::Handle(_, Corner::Se)));
        editor.pointer_move(Point::new(350.0, 320.0));
        editor.pointer_up();
        let sticker = editor.scene().sticker(&id).unwrap();
        assert_eq!((sticker.width, sticker.height), (150.0, 150.0));
    }

    #[test]
    fn test_background_click_clears_selection() {
        let mut editor = Editor::default();
        editor.add_text();
        let target = editor.pointer_down(Point::new(10.0, 780.0), Modifiers::NONE);
        assert_eq!(target, PointerTarget::Background);
        assert!(editor.selection().get().is_none());
        assert!(!editor.interaction().is_active());
    }

    #[test]
    fn test_hidden_element_lets_pointer_through() {
        let mut editor = Editor::default();
        let sticker = editor.add_sticker("💖", false);
        let image = editor.add_images([ImageSource::parse("/uploads/s/1-a.png")]).remove(0);
        assert!(editor.toggle_hidden(&sticker));

        let target = editor.pointer_down(Point::new(210.0, 210.0), Modifiers::NONE);
        assert_eq!(target, PointerTarget::Body(ElementRef::new(ElementKind::Image, image.clone())));
        editor.pointer_move(Point::new(260.0, 260.0));
        assert!(editor.pointer_up());

        assert!(editor.selection().is_selected(&image));
        assert!(!editor.selection().is_selected(&sticker));
        assert_eq!(editor.scene().sticker(&sticker).unwrap().position, STICKER_PLACEMENT);
        assert_eq!(editor.scene().image(&image).unwrap().position, Point::new(200.0, 200.0));
    }

    #[test]
    fn test_undo_prunes_hidden_ids() {
        let mut editor = Editor::default();
        let sticker = editor.add_sticker("💖", false);
        editor.toggle_hidden(&sticker);
        assert!(editor.undo());
        assert!(editor.hidden().is_empty());
        assert!(editor.redo());
        assert!(!editor.is_hidden(&sticker));
    }

    #[test]
    fn test_undo_restores_and_clears_selection() {
        let mut editor = Editor::default();
        editor.add_text();
        editor.add_sticker("💖", false);
        assert!(editor.undo());
        assert!(editor.scene().stickers.is_empty());
        assert_eq!(editor.scene().text_elements.len(), 1);
        assert!(editor.selection().get().is_none());
        assert!(editor.undo());
        assert!(editor.scene().is_empty());
        assert!(!editor.undo());
        assert!(editor.redo());
        assert_eq!(editor.scene().text_elements.len(), 1);
    }

    #[test]
    fn test_cut_paste_duplicate() {
        let mut editor = Editor::default();
        let id = editor.add_sticker("💖", false);
        assert!(editor.apply_command(EditorCommand::Cut));
        assert!(editor.scene().stickers.is_empty());
        assert!(editor.selection().get().is_none());

        let pasted = editor.paste().unwrap();
        assert_ne!(pasted, id);
        assert_eq!(editor.scene().sticker(&pasted).unwrap().position, Point::new(220.0, 220.0));
        assert!(editor.selection().is_selected(&pasted));

        let dup = editor.duplicate().unwrap();
        assert_eq!(editor.scene().sticker(&dup).unwrap().position, Point::new(240.0, 240.0));
        assert_eq!(editor.scene().stickers.len(), 2);
        // Duplicate leaves the clipboard untouched.
        assert_eq!(editor.clipboard().peek().map(|e| e.id().clone()), Some(id));
    }

    #[test]
    fn test_deleting_upload_queues_relay_delete() {
        let mut editor = Editor::default();
        let ids = editor.add_images([
            ImageSource::parse("/uploads/s/1-a.png"),
            ImageSource::parse("data:image/png;base64,AAAA"),
        ]);
        editor.delete_element(ElementKind::Image, &ids[0]);
        editor.delete_element(ElementKind::Image, &ids[1]);
        assert_eq!(editor.take_pending_upload_deletes(), vec!["/uploads/s/1-a.png".to_string()]);
        assert!(editor.take_pending_upload_deletes().is_empty());
    }

    #[test]
    fn test_layer_panel_reorder() {
        let mut editor = Editor::default();
        editor.add_images([ImageSource::parse("/uploads/s/1-a.png")]);
        let a = editor.add_sticker("a", false);
        let b = editor.add_sticker("b", false);
        // Panel: [b, a, image]. Move b below a.
        assert!(editor.reorder_layer_panel(0, 1));
        let ids: Vec<_> = editor.scene().stickers.iter().map(|s| s.id().clone()).collect();
        assert_eq!(ids, vec![b, a]);
        // Sticker onto the image row is ignored.
        let before = editor.scene().clone();
        assert!(!editor.reorder_layer_panel(0, 2));
        assert_eq!(editor.scene(), &before);
    }

    #[test]
    fn test_export_guard_resets_flag() {
        let mut editor = Editor::default();
        editor.add_text();
        assert!(editor.selection_frame().is_some());
        {
            let guard = editor.begin_export();
            assert!(guard.is_exporting());
            assert!(guard.selection_frame().is_none());
        }
        assert!(!editor.is_exporting());
    }

    #[test]
    fn test_apply_template_sets_area() {
        let mut editor = Editor::default();
        assert!(editor.apply_template("cute-bear"));
        assert!(matches!(editor.scene().background, Background::SvgData(_)));
        assert_eq!(editor.image_area().map(|a| a.frame.origin()), Some(Point::new(200.0, 200.0)));
        assert!(!editor.apply_template("missing"));
    }
}
