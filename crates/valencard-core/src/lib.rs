//! Valencard Core Library
//!
//! Platform-agnostic scene model, editing history and pointer interaction
//! for the Valencard greeting-card editor.

pub mod background;
pub mod editor;
pub mod element;
pub mod geometry;
pub mod handles;
pub mod history;
pub mod interaction;
pub mod layers;
pub mod relay;
pub mod scene;
pub mod selection;
pub mod shortcuts;
pub mod source;
pub mod templates;

pub use background::Background;
pub use editor::{Editor, ExportGuard};
pub use element::{
    AspectLock, Element, ElementId, ElementKind, ElementPatch, Outline, PanOffset, SceneItem,
    ShapeKind, Sticker, TextElement, TextTemplate, UserImage,
};
pub use geometry::{ClipMask, clip_mask_for, compute_resize, compute_rotation};
pub use handles::{Corner, Handle, HandleKind};
pub use history::{History, MAX_UNDO_HISTORY};
pub use interaction::{Interaction, Modifiers, PointerTarget};
pub use layers::{HiddenSet, LayerEntry, ZOrder};
pub use relay::{
    FeedError, FeedResult, MemoryFeed, UploadFeed, UploadPoller, create_upload_session,
    upload_page_url,
};
pub use scene::{CANVAS_HEIGHT, CANVAS_WIDTH, Scene};
pub use selection::{Clipboard, ElementRef, Selection};
pub use shortcuts::{EditorCommand, Shortcut, ShortcutRegistry};
pub use source::{DataUrl, DataUrlError, ImageSource, StickerSource};
pub use templates::{ImageArea, Template, TemplateCategory};

// Re-export kurbo for convenience
pub use kurbo;
