//! Export pipeline: primary rasterizer, fallback, PNG output.

use crate::assets::{AssetCache, AssetResolver, FsAssetResolver};
use crate::renderer::{ExportContext, ExportOptions, RasterError, RasterResult, Rasterizer};
use crate::sampling::SamplingRasterizer;
use crate::vector::SvgRasterizer;
use image::RgbaImage;
use std::time::{SystemTime, UNIX_EPOCH};
use valencard_core::editor::Editor;
use valencard_core::layers::HiddenSet;
use valencard_core::scene::Scene;
use valencard_core::source::DataUrl;

/// Result of an export: PNG bytes plus the pixel size.
#[derive(Debug, Clone)]
pub struct ExportedImage {
    /// Encoded PNG file.
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Milliseconds since the Unix epoch when the export finished.
    pub created_ms: u128,
}

impl ExportedImage {
    fn new(png: Vec<u8>, width: u32, height: u32) -> Self {
        let created_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self {
            png,
            width,
            height,
            created_ms,
        }
    }

    /// `data:image/png;base64,...`, the form email delivery expects.
    pub fn to_data_url(&self) -> String {
        DataUrl::new("image/png", self.png.clone()).encode()
    }

    /// Suggested download name.
    pub fn file_name(&self) -> String {
        format!("valencard-{}.png", self.created_ms)
    }
}

/// Encode straight-alpha RGBA pixels as PNG.
pub fn encode_png(image: &RgbaImage) -> RasterResult<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| RasterError::Encode(e.to_string()))?;
        writer
            .write_image_data(image.as_raw())
            .map_err(|e| RasterError::Encode(e.to_string()))?;
        writer.finish().map_err(|e| RasterError::Encode(e.to_string()))?;
    }
    Ok(out)
}

/// Two-tier export: primary rasterizer, then the fallback, then nothing.
pub struct ExportPipeline {
    primary: Box<dyn Rasterizer>,
    fallback: Box<dyn Rasterizer>,
    resolver: Box<dyn AssetResolver>,
    options: ExportOptions,
}

impl ExportPipeline {
    /// Vector rasterizer first, pixel sampling as fallback.
    pub fn new(resolver: impl AssetResolver + 'static) -> Self {
        Self::with_rasterizers(SvgRasterizer::new(), SamplingRasterizer, resolver)
    }

    pub fn with_rasterizers(
        primary: impl Rasterizer + 'static,
        fallback: impl Rasterizer + 'static,
        resolver: impl AssetResolver + 'static,
    ) -> Self {
        Self {
            primary: Box::new(primary),
            fallback: Box::new(fallback),
            resolver: Box::new(resolver),
            options: ExportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ExportOptions {
        self.options
    }

    /// Export the editor's card.
    ///
    /// The editor reports itself as exporting for the duration, so a UI
    /// painting from it drops selection decoration. `None` means the card
    /// cannot be exported.
    pub fn export(&self, editor: &mut Editor) -> Option<ExportedImage> {
        let guard = editor.begin_export();
        self.export_scene(guard.scene(), guard.hidden())
    }

    /// Export a scene directly.
    pub fn export_scene(&self, scene: &Scene, hidden: &HiddenSet) -> Option<ExportedImage> {
        let assets = AssetCache::collect(scene, hidden, self.resolver.as_ref());
        let ctx = ExportContext::new(scene, hidden, &assets).with_options(self.options);

        let pixels = if assets.has_opaque() {
            log::warn!(
                "{} asset(s) not readable locally, using {} rasterizer",
                assets.opaque().len(),
                self.fallback.name()
            );
            self.run_fallback(&ctx)?
        } else {
            match self.primary.rasterize(&ctx) {
                Ok(pixels) => pixels,
                Err(e) => {
                    log::warn!(
                        "{} rasterizer failed ({}), using {}",
                        self.primary.name(),
                        e,
                        self.fallback.name()
                    );
                    self.run_fallback(&ctx)?
                }
            }
        };

        match encode_png(&pixels) {
            Ok(png) => Some(ExportedImage::new(png, pixels.width(), pixels.height())),
            Err(e) => {
                log::error!("Export failed: {}", e);
                None
            }
        }
    }

    fn run_fallback(&self, ctx: &ExportContext<'_>) -> Option<RgbaImage> {
        match self.fallback.rasterize(ctx) {
            Ok(pixels) => Some(pixels),
            Err(e) => {
                log::error!("Export failed: {} rasterizer: {}", self.fallback.name(), e);
                None
            }
        }
    }
}

impl Default for ExportPipeline {
    fn default() -> Self {
        Self::new(FsAssetResolver::new("public"))
    }
}
