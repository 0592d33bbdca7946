//! Primary rasterizer: SVG document rendered with resvg.

use crate::renderer::{ExportContext, RasterError, RasterResult, Rasterizer};
use crate::svg::build_svg;
use image::{Rgba, RgbaImage};
use std::sync::Arc;
use usvg::fontdb;

/// Vector rasterizer backed by usvg/resvg/tiny-skia.
pub struct SvgRasterizer {
    /// Font database (loaded once and shared by every export).
    fontdb: Arc<fontdb::Database>,
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgRasterizer {
    /// Create a rasterizer using the system fonts.
    pub fn new() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        log::debug!("Loaded {} font faces for export", db.len());
        Self { fontdb: Arc::new(db) }
    }

    /// Create a rasterizer with a custom font database.
    pub fn with_fonts(db: fontdb::Database) -> Self {
        Self { fontdb: Arc::new(db) }
    }

    fn options(&self) -> usvg::Options<'static> {
        let mut options = usvg::Options::default();
        options.fontdb = self.fontdb.clone();
        options
    }
}

impl Rasterizer for SvgRasterizer {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn rasterize(&self, ctx: &ExportContext<'_>) -> RasterResult<RgbaImage> {
        let document = build_svg(ctx);
        let tree = usvg::Tree::from_str(&document, &self.options())
            .map_err(|e| RasterError::Svg(e.to_string()))?;
        let (width, height) = ctx.options.pixel_size();
        let scale = ctx.options.pixel_ratio as f32;
        render_tree(&tree, width, height, scale)
    }
}

/// Intrinsic size of an SVG image, rounded up to whole pixels.
pub(crate) fn svg_size(bytes: &[u8]) -> RasterResult<(u32, u32)> {
    let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())
        .map_err(|e| RasterError::Svg(e.to_string()))?;
    let size = tree.size();
    Ok((size.width().ceil().max(1.0) as u32, size.height().ceil().max(1.0) as u32))
}

/// Rasterize standalone SVG bytes at their intrinsic size.
pub(crate) fn render_svg_bytes(bytes: &[u8]) -> RasterResult<RgbaImage> {
    let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())
        .map_err(|e| RasterError::Svg(e.to_string()))?;
    let size = tree.size();
    let width = size.width().ceil().max(1.0) as u32;
    let height = size.height().ceil().max(1.0) as u32;
    render_tree(&tree, width, height, 1.0)
}

fn render_tree(tree: &usvg::Tree, width: u32, height: u32, scale: f32) -> RasterResult<RgbaImage> {
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| {
            RasterError::Unsupported(format!("Invalid raster size {}x{}", width, height))
        })?;
    resvg::render(
        tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap_to_image(&pixmap))
}

/// tiny-skia keeps premultiplied alpha; the rest of the pipeline does not.
fn pixmap_to_image(pixmap: &tiny_skia::Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::tests::solid_png_url;
    use crate::assets::{AssetCache, FsAssetResolver};
    use crate::renderer::ExportOptions;
    use kurbo::Rect;
    use valencard_core::background::Background;
    use valencard_core::element::{Element, UserImage};
    use valencard_core::layers::HiddenSet;
    use valencard_core::scene::Scene;
    use valencard_core::source::ImageSource;

    fn rasterize(scene: &Scene, hidden: &HiddenSet, ratio: f64) -> RgbaImage {
        let resolver = FsAssetResolver::new("does-not-exist");
        let assets = AssetCache::collect(scene, hidden, &resolver);
        let ctx = ExportContext::new(scene, hidden, &assets)
            .with_options(ExportOptions::default().with_pixel_ratio(ratio));
        SvgRasterizer::with_fonts(fontdb::Database::new())
            .rasterize(&ctx)
            .unwrap()
    }

    #[test]
    fn test_flat_background_fills_canvas() {
        let scene = Scene::with_background(Background::sniff("#ff0000"));
        let image = rasterize(&scene, &HiddenSet::new(), 0.1);
        assert_eq!(image.dimensions(), (60, 80));
        assert_eq!(image.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(image.get_pixel(59, 79), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_image_painted_at_double_density() {
        let mut scene = Scene::new();
        let id = scene.add(Element::Image(UserImage::new(
            ImageSource::parse(&solid_png_url(2, 2, [0, 0, 255, 255])),
            Rect::new(0.0, 0.0, 300.0, 400.0),
        )));
        let image = rasterize(&scene, &HiddenSet::new(), 0.2);
        assert_eq!(image.dimensions(), (120, 160));
        assert_eq!(image.get_pixel(30, 40), &Rgba([0, 0, 255, 255]));
        assert_eq!(image.get_pixel(100, 140), &Rgba([255, 255, 255, 255]));

        let mut hidden = HiddenSet::new();
        hidden.toggle(&id);
        let image = rasterize(&scene, &hidden, 0.2);
        assert_eq!(image.get_pixel(30, 40), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_svg_size() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="600" height="800"></svg>"#;
        assert_eq!(svg_size(svg).unwrap(), (600, 800));
        assert!(svg_size(b"not svg").is_err());
    }
}
