//! Valencard Render Library
//!
//! Export pipeline for Valencard cards. The primary path builds an SVG
//! document from the scene and rasterizes it with resvg; a pixel-sampling
//! rasterizer built on `image` takes over when the primary path cannot run.

mod assets;
mod crop;
mod export;
mod paint;
mod renderer;
mod sampling;
mod svg;
mod vector;

pub use assets::{Asset, AssetCache, AssetResolver, FsAssetResolver, mime_for_path};
pub use crop::{PixelRect, crop_source, crop_to_data_url, source_crop};
pub use export::{ExportPipeline, ExportedImage, encode_png};
pub use paint::{Gradient, GradientStop, parse_color};
pub use renderer::{ExportContext, ExportOptions, RasterError, RasterResult, Rasterizer};
pub use sampling::SamplingRasterizer;
pub use svg::build_svg;
pub use vector::SvgRasterizer;
