//! Fallback rasterizer: per-pixel sampling with the `image` crate.
//!
//! It needs nothing but decoded pixels, so it still works when the vector
//! path cannot run. Glyph rendering is out of its reach: text and emoji
//! stickers are skipped.

use crate::assets::AssetCache;
use crate::paint::{Gradient, WHITE, clip_path, contain_rect, cover_rect, icon_path, parse_color};
use crate::renderer::{ExportContext, RasterResult, Rasterizer};
use image::{Rgba, RgbaImage};
use kurbo::{Affine, BezPath, Point, Rect, Shape as _, Size};
use valencard_core::background::Background;
use valencard_core::element::{Element, Outline, ShapeKind, Sticker, UserImage};
use valencard_core::source::StickerSource;

/// Pixel-sampling rasterizer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SamplingRasterizer;

impl SamplingRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl Rasterizer for SamplingRasterizer {
    fn name(&self) -> &'static str {
        "sampling"
    }

    fn rasterize(&self, ctx: &ExportContext<'_>) -> RasterResult<RgbaImage> {
        let (width, height) = ctx.options.pixel_size();
        let mut canvas = Canvas {
            pixels: RgbaImage::from_pixel(width, height, WHITE),
            ratio: ctx.options.pixel_ratio,
        };
        let card = Size::new(ctx.options.width, ctx.options.height);
        canvas.background(&ctx.scene.background, ctx.assets, card);
        for element in ctx.visible_elements() {
            match &element {
                Element::Image(image) => canvas.image(image, ctx.assets),
                Element::Sticker(sticker) => {
                    canvas.sticker(sticker, ctx.assets, element.rotation_center())
                }
                Element::Text(_) => {
                    log::debug!("Sampling rasterizer skips text {}", element.id())
                }
            }
        }
        Ok(canvas.pixels)
    }
}

struct Canvas {
    pixels: RgbaImage,
    ratio: f64,
}

/// Where and how an element is painted.
struct Region {
    frame: Rect,
    /// Canvas to element-local transform (undoes rotation).
    to_local: Affine,
    /// Element-local to canvas transform.
    to_canvas: Affine,
    mask: Option<BezPath>,
}

impl Region {
    fn new(frame: Rect, rotation: f64, center: Point, mask: Option<BezPath>) -> Self {
        let to_canvas = Affine::rotate_about(rotation.to_radians(), center);
        Self {
            frame,
            to_local: to_canvas.inverse(),
            to_canvas,
            mask,
        }
    }

    fn contains(&self, local: Point) -> bool {
        self.frame.contains(local) && self.mask.as_ref().is_none_or(|m| m.contains(local))
    }
}

impl Canvas {
    fn background(&mut self, background: &Background, assets: &AssetCache, size: Size) {
        let full = Rect::from_origin_size(Point::ORIGIN, size);
        match background {
            Background::Color(color) => {
                let fill = parse_color(color).unwrap_or(WHITE);
                self.fill(&Region::new(full, 0.0, Point::ORIGIN, None), |_| Some(fill));
            }
            Background::Gradient(raw) => {
                if let Some(gradient) = Gradient::parse(raw) {
                    self.fill(&Region::new(full, 0.0, Point::ORIGIN, None), |p| {
                        Some(gradient.color_at(size, p))
                    });
                }
            }
            Background::Pattern(_) | Background::SvgData(_) | Background::Url(_) => {
                let Some(asset) = background.image_href().and_then(|href| assets.get(href)) else {
                    return;
                };
                match asset.decode() {
                    Ok(src) => {
                        let placed = cover_rect(full, intrinsic(&src), (50.0, 50.0));
                        let region = Region::new(full, 0.0, Point::ORIGIN, None);
                        self.fill(&region, |p| sample(&src, placed, p));
                    }
                    Err(e) => log::warn!("Failed to decode background: {}", e),
                }
            }
        }
    }

    fn outline(
        &mut self,
        outline: Option<&Outline>,
        shape: ShapeKind,
        corner_radius: Option<f64>,
        frame: Rect,
        rotation: f64,
        center: Point,
    ) {
        let Some(outline) = outline.filter(|o| o.is_visible()) else {
            return;
        };
        let Some(color) = parse_color(&outline.color) else {
            return;
        };
        let grown = frame.inflate(outline.width, outline.width);
        let mask = clip_path(shape, corner_radius.map(|r| r + outline.width), grown);
        self.fill(&Region::new(grown, rotation, center, mask), |_| Some(color));
    }

    fn image(&mut self, image: &UserImage, assets: &AssetCache) {
        let frame = image.bounds();
        let center = frame.center();
        self.outline(
            image.outline.as_ref(),
            image.shape,
            image.corner_radius,
            frame,
            image.rotation,
            center,
        );
        let mask = clip_path(image.shape, image.corner_radius, frame);
        let region = Region::new(frame, image.rotation, center, mask);
        let Some(asset) = assets.get(image.source.as_str()) else {
            log::debug!("No pixels for image {}", image.source);
            return;
        };
        match asset.decode() {
            Ok(src) => {
                let placed = cover_rect(frame, intrinsic(&src), image.offset.object_position());
                self.fill(&region, |p| sample(&src, placed, p));
            }
            Err(e) => log::warn!("Failed to decode image {}: {}", image.source, e),
        }
    }

    fn sticker(&mut self, sticker: &Sticker, assets: &AssetCache, center: Point) {
        let frame = sticker.bounds();
        self.outline(
            sticker.outline.as_ref(),
            sticker.shape,
            sticker.corner_radius,
            frame,
            sticker.rotation,
            center,
        );
        let mask = clip_path(sticker.shape, sticker.corner_radius, frame);
        match &sticker.source {
            StickerSource::Path(path) => {
                let Some(src) = assets.get(path).and_then(|asset| asset.decode().ok()) else {
                    log::debug!("No pixels for sticker {}", path);
                    return;
                };
                let placed = contain_rect(frame, intrinsic(&src));
                let region = Region::new(frame, sticker.rotation, center, mask);
                self.fill(&region, |p| sample(&src, placed, p));
            }
            StickerSource::Icon { name, color } => {
                let fill = color
                    .as_deref()
                    .or_else(|| sticker.source.icon().map(|icon| icon.color))
                    .and_then(parse_color)
                    .unwrap_or(Rgba([0, 0, 0, 255]));
                let glyph = icon_path(name, frame);
                let region = Region::new(frame, sticker.rotation, center, mask);
                self.fill(&region, |p| glyph.contains(p).then_some(fill));
            }
            StickerSource::Emoji(_) => {
                log::debug!("Sampling rasterizer skips emoji {}", sticker.id())
            }
        }
    }

    /// Paint every device pixel whose center falls inside the region.
    fn fill(&mut self, region: &Region, shader: impl Fn(Point) -> Option<Rgba<u8>>) {
        let (width, height) = self.pixels.dimensions();
        let device = region.to_canvas.transform_rect_bbox(region.frame);
        let x0 = (device.x0 * self.ratio).floor().max(0.0) as u32;
        let y0 = (device.y0 * self.ratio).floor().max(0.0) as u32;
        let x1 = ((device.x1 * self.ratio).ceil().max(0.0) as u32).min(width);
        let y1 = ((device.y1 * self.ratio).ceil().max(0.0) as u32).min(height);
        for y in y0..y1 {
            for x in x0..x1 {
                let canvas_point =
                    Point::new((x as f64 + 0.5) / self.ratio, (y as f64 + 0.5) / self.ratio);
                let local = region.to_local * canvas_point;
                if !region.contains(local) {
                    continue;
                }
                if let Some(color) = shader(local) {
                    blend(self.pixels.get_pixel_mut(x, y), color);
                }
            }
        }
    }
}

fn intrinsic(src: &RgbaImage) -> Size {
    Size::new(src.width() as f64, src.height() as f64)
}

/// Nearest-neighbour lookup of `src` drawn into `placed`.
fn sample(src: &RgbaImage, placed: Rect, point: Point) -> Option<Rgba<u8>> {
    if placed.width() <= 0.0 || placed.height() <= 0.0 || !placed.contains(point) {
        return None;
    }
    let u = (point.x - placed.x0) / placed.width();
    let v = (point.y - placed.y0) / placed.height();
    let sx = ((u * src.width() as f64) as u32).min(src.width().saturating_sub(1));
    let sy = ((v * src.height() as f64) as u32).min(src.height().saturating_sub(1));
    Some(*src.get_pixel(sx, sy))
}

/// Source-over compositing of straight-alpha colors.
fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = src[3] as f64 / 255.0;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f64 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for i in 0..3 {
        let c = (src[i] as f64 * sa + dst[i] as f64 * da * (1.0 - sa)) / out_a;
        dst[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::FsAssetResolver;
    use crate::assets::tests::solid_png_url;
    use crate::renderer::ExportOptions;
    use valencard_core::element::{ElementKind, ElementPatch};
    use valencard_core::layers::HiddenSet;
    use valencard_core::scene::Scene;
    use valencard_core::source::ImageSource;

    fn rasterize(scene: &Scene) -> RgbaImage {
        let resolver = FsAssetResolver::new("does-not-exist");
        let hidden = HiddenSet::new();
        let assets = AssetCache::collect(scene, &hidden, &resolver);
        let ctx = ExportContext::new(scene, &hidden, &assets)
            .with_options(ExportOptions::default().with_pixel_ratio(0.1));
        SamplingRasterizer.rasterize(&ctx).unwrap()
    }

    #[test]
    fn test_flat_and_gradient_backgrounds() {
        let image = rasterize(&Scene::with_background(Background::sniff("#00ff00")));
        assert_eq!(image.dimensions(), (60, 80));
        assert_eq!(image.get_pixel(10, 10), &Rgba([0, 255, 0, 255]));

        let image = rasterize(&Scene::with_background(Background::sniff(
            "linear-gradient(to bottom, #000000, #ffffff)",
        )));
        assert!(image.get_pixel(30, 0)[0] < 10);
        assert!(image.get_pixel(30, 79)[0] > 245);
    }

    #[test]
    fn test_circle_mask_keeps_corners_clear() {
        let mut scene = Scene::new();
        let id = scene.add(Element::Image(UserImage::new(
            ImageSource::parse(&solid_png_url(2, 2, [255, 0, 0, 255])),
            Rect::new(0.0, 0.0, 400.0, 400.0),
        )));
        scene.update(
            ElementKind::Image,
            &id,
            &ElementPatch {
                shape: Some(ShapeKind::Circle),
                ..Default::default()
            },
        );
        let image = rasterize(&scene);
        assert_eq!(image.get_pixel(20, 20), &Rgba([255, 0, 0, 255]));
        assert_eq!(image.get_pixel(0, 0), &WHITE);
    }

    #[test]
    fn test_icon_sticker_is_filled() {
        let mut scene = Scene::new();
        scene.add(Element::Sticker(Sticker::new(
            StickerSource::parse("icon:Moon:#0000ff"),
            Point::new(100.0, 100.0),
            Size::new(200.0, 200.0),
        )));
        let image = rasterize(&scene);
        assert_eq!(image.get_pixel(20, 20), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_blend_half_transparent() {
        let mut dst = WHITE;
        blend(&mut dst, Rgba([0, 0, 0, 128]));
        assert!((126..=128).contains(&dst[0]));
        assert_eq!(dst[3], 255);
    }
}
