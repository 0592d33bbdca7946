//! Crop an image to a rectangle chosen on its displayed copy.

use crate::assets::AssetResolver;
use crate::export::encode_png;
use crate::renderer::{RasterError, RasterResult};
use image::imageops;
use kurbo::{Rect, Size};
use valencard_core::source::{DataUrl, ImageSource};

/// Source-pixel rectangle `(x, y, width, height)`.
pub type PixelRect = (u32, u32, u32, u32);

/// Map a crop rectangle in displayed coordinates to source pixels.
///
/// Returns `None` when the displayed or natural size is empty.
pub fn source_crop(crop: Rect, displayed: Size, natural: (u32, u32)) -> Option<PixelRect> {
    let (nat_w, nat_h) = natural;
    if displayed.width <= 0.0 || displayed.height <= 0.0 || nat_w == 0 || nat_h == 0 {
        return None;
    }
    let scale_x = nat_w as f64 / displayed.width;
    let scale_y = nat_h as f64 / displayed.height;
    let crop = crop.abs();

    let sx = ((crop.x0 * scale_x).round().max(0.0) as u32).min(nat_w - 1);
    let sy = ((crop.y0 * scale_y).round().max(0.0) as u32).min(nat_h - 1);
    let sw = ((crop.width() * scale_x).round().max(1.0) as u32).min(nat_w - sx);
    let sh = ((crop.height() * scale_y).round().max(1.0) as u32).min(nat_h - sy);
    Some((sx, sy, sw, sh))
}

/// Crop encoded image bytes, returning a PNG data URL.
pub fn crop_to_data_url(bytes: &[u8], crop: Rect, displayed: Size) -> RasterResult<String> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| RasterError::Asset(e.to_string()))?
        .to_rgba8();
    let (sx, sy, sw, sh) = source_crop(crop, displayed, img.dimensions())
        .ok_or_else(|| RasterError::Unsupported("Nothing to crop".to_string()))?;
    let cropped = imageops::crop_imm(&img, sx, sy, sw, sh).to_image();
    let png = encode_png(&cropped)?;
    Ok(DataUrl::new("image/png", png).encode())
}

/// Crop an image source, producing the inline source that replaces it.
pub fn crop_source(
    source: &ImageSource,
    resolver: &dyn AssetResolver,
    crop: Rect,
    displayed: Size,
) -> RasterResult<ImageSource> {
    let asset = resolver
        .resolve(source.as_str())?
        .ok_or_else(|| RasterError::Unsupported(format!("Cannot read pixels of {}", source)))?;
    crop_to_data_url(&asset.bytes, crop, displayed).map(ImageSource::Data)
}
