//! Artwork lookup for export.
//!
//! Every image the scene references is resolved once before rasterizing.
//! Inline data URLs and files under the public directory can be read; remote
//! URLs are opaque from here and force the fallback rasterizer, the same way a
//! cross-origin stylesheet taints a DOM capture.

use crate::renderer::{RasterError, RasterResult};
use crate::vector;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageReader, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Component, Path, PathBuf};
use valencard_core::element::Element;
use valencard_core::layers::HiddenSet;
use valencard_core::scene::Scene;
use valencard_core::source::{DataUrl, StickerSource};

const SVG_MIME: &str = "image/svg+xml";

/// Raw bytes of one image plus its intrinsic size.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub mime: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Asset {
    /// Wrap encoded image bytes, reading the intrinsic size.
    pub fn from_bytes(mime: impl Into<String>, bytes: Vec<u8>) -> RasterResult<Self> {
        let mime = mime.into();
        let (width, height) = if mime.starts_with(SVG_MIME) {
            vector::svg_size(&bytes)?
        } else {
            ImageReader::new(Cursor::new(&bytes))
                .with_guessed_format()
                .map_err(|e| RasterError::Asset(e.to_string()))?
                .into_dimensions()
                .map_err(|e| RasterError::Asset(e.to_string()))?
        };
        Ok(Self {
            mime,
            bytes,
            width,
            height,
        })
    }

    pub fn is_svg(&self) -> bool {
        self.mime.starts_with(SVG_MIME)
    }

    /// Inline form for embedding into the export document.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }

    /// Decode to straight-alpha pixels at intrinsic size.
    pub fn decode(&self) -> RasterResult<RgbaImage> {
        if self.is_svg() {
            return vector::render_svg_bytes(&self.bytes);
        }
        image::load_from_memory(&self.bytes)
            .map(|img| img.to_rgba8())
            .map_err(|e| RasterError::Asset(e.to_string()))
    }
}

/// Maps an href from the scene to readable bytes.
pub trait AssetResolver: Send + Sync {
    /// `Ok(None)` means the asset exists but cannot be read from here.
    fn resolve(&self, href: &str) -> RasterResult<Option<Asset>>;
}

/// Resolver for data URLs and files served from a public directory.
#[derive(Debug, Clone)]
pub struct FsAssetResolver {
    public_dir: PathBuf,
}

impl FsAssetResolver {
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
        }
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    fn local_path(&self, relative: &str) -> Option<PathBuf> {
        let relative = relative.split(['?', '#']).next().unwrap_or_default();
        let relative = Path::new(relative);
        // Only plain path segments; no escaping the public directory.
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return None;
        }
        Some(self.public_dir.join(relative))
    }
}

impl AssetResolver for FsAssetResolver {
    fn resolve(&self, href: &str) -> RasterResult<Option<Asset>> {
        if href.starts_with("data:") {
            let url = DataUrl::parse(href).map_err(|e| RasterError::Asset(e.to_string()))?;
            return Asset::from_bytes(url.mime, url.data).map(Some);
        }
        if let Some(relative) = href.strip_prefix('/') {
            let path = self
                .local_path(relative)
                .ok_or_else(|| RasterError::Asset(format!("Refusing path {}", href)))?;
            let bytes = std::fs::read(&path)
                .map_err(|e| RasterError::Asset(format!("{}: {}", path.display(), e)))?;
            return Asset::from_bytes(mime_for_path(&path), bytes).map(Some);
        }
        Ok(None)
    }
}

/// Guess a mime type from a file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("svg") => SVG_MIME,
        _ => "application/octet-stream",
    }
}

/// All assets of one export, keyed by the href used in the scene.
#[derive(Debug, Default)]
pub struct AssetCache {
    assets: HashMap<String, Asset>,
    opaque: Vec<String>,
    broken: Vec<String>,
}

impl AssetCache {
    /// Resolve every href the visible part of the scene uses.
    pub fn collect(scene: &Scene, hidden: &HiddenSet, resolver: &dyn AssetResolver) -> Self {
        let mut cache = Self::default();
        for href in referenced_hrefs(scene, hidden) {
            if cache.assets.contains_key(&href)
                || cache.opaque.contains(&href)
                || cache.broken.contains(&href)
            {
                continue;
            }
            match resolver.resolve(&href) {
                Ok(Some(asset)) => {
                    cache.assets.insert(href, asset);
                }
                Ok(None) => {
                    log::debug!("Asset is not readable locally: {}", href);
                    cache.opaque.push(href);
                }
                Err(e) => {
                    log::warn!("Failed to load asset: {}", e);
                    cache.broken.push(href);
                }
            }
        }
        cache
    }

    pub fn insert(&mut self, href: impl Into<String>, asset: Asset) {
        self.assets.insert(href.into(), asset);
    }

    pub fn get(&self, href: &str) -> Option<&Asset> {
        self.assets.get(href)
    }

    /// Whether some referenced asset could not be read from here.
    pub fn has_opaque(&self) -> bool {
        !self.opaque.is_empty()
    }

    pub fn opaque(&self) -> &[String] {
        &self.opaque
    }

    pub fn broken(&self) -> &[String] {
        &self.broken
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

fn referenced_hrefs(scene: &Scene, hidden: &HiddenSet) -> Vec<String> {
    let mut hrefs = Vec::new();
    if let Some(href) = scene.background.image_href() {
        hrefs.push(href.to_string());
    }
    for element in scene.paint_order() {
        if hidden.is_hidden(element.id()) {
            continue;
        }
        match element {
            Element::Image(image) => hrefs.push(image.source.as_str().to_string()),
            Element::Sticker(sticker) => {
                if let StickerSource::Path(path) = sticker.source {
                    hrefs.push(path);
                }
            }
            Element::Text(_) => {}
        }
    }
    hrefs
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::export::encode_png;
    use image::Rgba;
    use kurbo::Rect;
    use valencard_core::element::UserImage;
    use valencard_core::source::ImageSource;

    /// Solid-color PNG as a data URL.
    pub(crate) fn solid_png_url(width: u32, height: u32, color: [u8; 4]) -> String {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let png = encode_png(&img).unwrap();
        DataUrl::new("image/png", png).encode()
    }

    #[test]
    fn test_resolve_data_url() {
        let resolver = FsAssetResolver::new("does-not-exist");
        let asset = resolver
            .resolve(&solid_png_url(3, 2, [255, 0, 0, 255]))
            .unwrap()
            .unwrap();
        assert_eq!((asset.width, asset.height), (3, 2));
        assert_eq!(asset.mime, "image/png");
        let pixels = asset.decode().unwrap();
        assert_eq!(pixels.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_remote_urls_are_opaque() {
        let resolver = FsAssetResolver::new("does-not-exist");
        assert!(resolver.resolve("https://res.cloudinary.com/x.png").unwrap().is_none());
    }

    #[test]
    fn test_local_files_and_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255]));
        let uploads = dir.path().join("uploads").join("s1");
        std::fs::create_dir_all(&uploads).unwrap();
        std::fs::write(uploads.join("1-a.png"), encode_png(&img).unwrap()).unwrap();

        let resolver = FsAssetResolver::new(dir.path());
        let asset = resolver.resolve("/uploads/s1/1-a.png?v=2").unwrap().unwrap();
        assert_eq!((asset.width, asset.height), (2, 2));
        assert!(resolver.resolve("/../secret.png").is_err());
        assert!(resolver.resolve("/uploads/s1/missing.png").is_err());
    }

    #[test]
    fn test_collect_skips_hidden_and_tracks_opaque() {
        let mut scene = Scene::new();
        let local = solid_png_url(1, 1, [0, 255, 0, 255]);
        scene.add(Element::Image(UserImage::new(
            ImageSource::parse(&local),
            Rect::new(0.0, 0.0, 100.0, 100.0),
        )));
        let remote = scene.add(Element::Image(UserImage::new(
            ImageSource::parse("https://example.com/a.png"),
            Rect::new(0.0, 0.0, 100.0, 100.0),
        )));
        let resolver = FsAssetResolver::new("does-not-exist");

        let cache = AssetCache::collect(&scene, &HiddenSet::new(), &resolver);
        assert_eq!(cache.len(), 1);
        assert!(cache.has_opaque());

        let mut hidden = HiddenSet::new();
        hidden.toggle(&remote);
        let cache = AssetCache::collect(&scene, &hidden, &resolver);
        assert!(!cache.has_opaque());
        assert!(cache.get(&local).is_some());
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a/b.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("a/b.svg")), "image/svg+xml");
        assert_eq!(mime_for_path(Path::new("a/b")), "application/octet-stream");
    }
}
