//! Rasterizer trait abstraction.

use crate::assets::AssetCache;
use image::RgbaImage;
use thiserror::Error;
use valencard_core::element::Element;
use valencard_core::layers::HiddenSet;
use valencard_core::scene::{CANVAS_HEIGHT, CANVAS_WIDTH, Scene};

/// Rasterizer errors.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Rasterizer unavailable: {0}")]
    Unsupported(String),
    #[error("SVG error: {0}")]
    Svg(String),
    #[error("Asset error: {0}")]
    Asset(String),
    #[error("Encode error: {0}")]
    Encode(String),
}

/// Result type for rasterizer operations.
pub type RasterResult<T> = Result<T, RasterError>;

/// Output geometry of an export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    /// Card width in canvas units.
    pub width: f64,
    /// Card height in canvas units.
    pub height: f64,
    /// Device pixels per canvas unit.
    pub pixel_ratio: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            pixel_ratio: Self::DEFAULT_PIXEL_RATIO,
        }
    }
}

impl ExportOptions {
    pub const DEFAULT_PIXEL_RATIO: f64 = 2.0;

    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    /// Size of the output raster in device pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let w = (self.width * self.pixel_ratio).round().max(1.0) as u32;
        let h = (self.height * self.pixel_ratio).round().max(1.0) as u32;
        (w, h)
    }
}

/// Everything a rasterizer needs for one export.
pub struct ExportContext<'a> {
    /// The card to paint.
    pub scene: &'a Scene,
    /// Elements switched off in the layer panel.
    pub hidden: &'a HiddenSet,
    /// Pre-resolved artwork for every source the scene references.
    pub assets: &'a AssetCache,
    pub options: ExportOptions,
}

impl<'a> ExportContext<'a> {
    pub fn new(scene: &'a Scene, hidden: &'a HiddenSet, assets: &'a AssetCache) -> Self {
        Self {
            scene,
            hidden,
            assets,
            options: ExportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Elements to paint, bottom first, without hidden ones.
    pub fn visible_elements(&self) -> Vec<Element> {
        self.scene
            .paint_order()
            .into_iter()
            .filter(|e| !self.hidden.is_hidden(e.id()))
            .collect()
    }

    /// Background color handed to the rasterizer. Only flat colors pass.
    pub fn background_color(&self) -> Option<&str> {
        self.scene.background.flat_color()
    }
}

/// Trait for export backends.
///
/// Implementations turn a scene into straight-alpha RGBA pixels at
/// `options.pixel_size()`. Selection decoration is never part of the input.
pub trait Rasterizer: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn rasterize(&self, ctx: &ExportContext<'_>) -> RasterResult<RgbaImage>;
}
