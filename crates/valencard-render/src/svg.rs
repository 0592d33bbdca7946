//! Scene to SVG document.
//!
//! The document is the input of the primary rasterizer. It carries no
//! selection decoration; clip masks, outlines, pan offsets and rotation are
//! expressed with plain SVG so any conforming renderer reproduces the card.

use crate::assets::AssetCache;
use crate::paint::{Gradient, clip_path, contain_rect, cover_rect, icon_path};
use crate::renderer::ExportContext;
use image::Rgba;
use kurbo::{BezPath, Rect, Shape as _, Size};
use valencard_core::background::Background;
use valencard_core::element::{Element, Outline, ShapeKind, Sticker, TextElement, UserImage};
use valencard_core::source::StickerSource;

const PLACEHOLDER_FILL: &str = "#c8c8c8";
const PLACEHOLDER_STROKE: &str = "#969696";

/// Build the export document for a scene.
pub fn build_svg(ctx: &ExportContext<'_>) -> String {
    let mut doc = SvgDocument::new(ctx.options.width, ctx.options.height);
    doc.background(&ctx.scene.background, ctx.assets);
    for element in ctx.visible_elements() {
        doc.element(&element, ctx.assets);
    }
    doc.finish()
}

struct SvgDocument {
    width: f64,
    height: f64,
    defs: String,
    body: String,
    next_id: usize,
}

impl SvgDocument {
    fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            defs: String::new(),
            body: String::new(),
            next_id: 0,
        }
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }

    fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\"><defs>{}</defs>{}</svg>",
            self.defs,
            self.body,
            w = self.width,
            h = self.height,
        )
    }

    fn full_rect(&mut self, fill: &str) {
        self.body.push_str(&format!(
            "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
            self.width,
            self.height,
            escape(fill)
        ));
    }

    fn background(&mut self, background: &Background, assets: &AssetCache) {
        match background {
            Background::Color(color) => self.full_rect(color),
            Background::Gradient(raw) => match Gradient::parse(raw) {
                Some(gradient) => {
                    let id = self.gradient_def(&gradient);
                    self.full_rect(&format!("url(#{})", id));
                }
                None => {
                    log::debug!("Unsupported gradient background: {}", raw);
                    self.full_rect(Background::DEFAULT_COLOR);
                }
            },
            Background::Pattern(_) | Background::SvgData(_) | Background::Url(_) => {
                self.full_rect(Background::DEFAULT_COLOR);
                if let Some(asset) = background.image_href().and_then(|href| assets.get(href)) {
                    self.body.push_str(&format!(
                        "<image x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"xMidYMid slice\" href=\"{}\"/>",
                        self.width,
                        self.height,
                        asset.data_url()
                    ));
                }
            }
        }
    }

    fn gradient_def(&mut self, gradient: &Gradient) -> String {
        let id = self.fresh_id("bg-gradient-");
        let size = Size::new(self.width, self.height);
        let stops: String = gradient
            .stops
            .iter()
            .map(|s| {
                format!(
                    "<stop offset=\"{}\" stop-color=\"{}\" stop-opacity=\"{}\"/>",
                    s.offset,
                    rgb(s.rgba),
                    s.rgba[3] as f64 / 255.0
                )
            })
            .collect();
        if gradient.radial {
            self.defs.push_str(&format!(
                "<radialGradient id=\"{}\" gradientUnits=\"userSpaceOnUse\" cx=\"{}\" cy=\"{}\" r=\"{}\">{}</radialGradient>",
                id,
                size.width / 2.0,
                size.height / 2.0,
                Gradient::radius(size),
                stops
            ));
        } else {
            let (start, end) = gradient.line(size);
            self.defs.push_str(&format!(
                "<linearGradient id=\"{}\" gradientUnits=\"userSpaceOnUse\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\">{}</linearGradient>",
                id, start.x, start.y, end.x, end.y, stops
            ));
        }
        id
    }

    /// Register a clip path and return its id.
    fn clip_def(&mut self, path: &BezPath) -> String {
        let id = self.fresh_id("clip-");
        self.defs.push_str(&format!(
            "<clipPath id=\"{}\"><path d=\"{}\"/></clipPath>",
            id,
            path.to_svg()
        ));
        id
    }

    fn element(&mut self, element: &Element, assets: &AssetCache) {
        let rotation = element.rotation();
        if rotation.abs() > f64::EPSILON {
            let c = element.rotation_center();
            self.body
                .push_str(&format!("<g transform=\"rotate({} {} {})\">", rotation, c.x, c.y));
        } else {
            self.body.push_str("<g>");
        }
        match element {
            Element::Image(image) => self.image(image, assets),
            Element::Sticker(sticker) => self.sticker(sticker, assets),
            Element::Text(text) => self.text(text),
        }
        self.body.push_str("</g>");
    }

    fn outline(
        &mut self,
        outline: Option<&Outline>,
        shape: ShapeKind,
        corner_radius: Option<f64>,
        frame: Rect,
    ) {
        let Some(outline) = outline.filter(|o| o.is_visible()) else {
            return;
        };
        let grown = frame.inflate(outline.width, outline.width);
        let path = clip_path(shape, corner_radius.map(|r| r + outline.width), grown)
            .unwrap_or_else(|| grown.to_path(0.1));
        self.body.push_str(&format!(
            "<path d=\"{}\" fill=\"{}\"/>",
            path.to_svg(),
            escape(&outline.color)
        ));
    }

    fn image(&mut self, image: &UserImage, assets: &AssetCache) {
        let frame = image.bounds();
        self.outline(image.outline.as_ref(), image.shape, image.corner_radius, frame);
        // Cover placement overflows the frame, so images always clip.
        let mask = clip_path(image.shape, image.corner_radius, frame)
            .unwrap_or_else(|| frame.to_path(0.1));
        let clip = self.clip_def(&mask);
        self.body.push_str(&format!("<g clip-path=\"url(#{})\">", clip));
        match assets.get(image.source.as_str()) {
            Some(asset) => {
                let placed = cover_rect(
                    frame,
                    Size::new(asset.width as f64, asset.height as f64),
                    image.offset.object_position(),
                );
                self.image_tag(placed, &asset.data_url());
            }
            None => self.placeholder(frame),
        }
        self.body.push_str("</g>");
    }

    fn sticker(&mut self, sticker: &Sticker, assets: &AssetCache) {
        let frame = sticker.bounds();
        self.outline(sticker.outline.as_ref(), sticker.shape, sticker.corner_radius, frame);
        let clip = clip_path(sticker.shape, sticker.corner_radius, frame)
            .map(|path| self.clip_def(&path));
        match &clip {
            Some(id) => self.body.push_str(&format!("<g clip-path=\"url(#{})\">", id)),
            None => self.body.push_str("<g>"),
        }
        match &sticker.source {
            StickerSource::Path(path) => match assets.get(path) {
                Some(asset) => {
                    let intrinsic = Size::new(asset.width as f64, asset.height as f64);
                    let placed = contain_rect(frame, intrinsic);
                    self.image_tag(placed, &asset.data_url());
                }
                None => self.placeholder(frame),
            },
            StickerSource::Icon { name, color } => {
                let fill = color
                    .as_deref()
                    .or_else(|| sticker.source.icon().map(|icon| icon.color))
                    .unwrap_or("#000000");
                self.body.push_str(&format!(
                    "<path d=\"{}\" fill=\"{}\"/>",
                    icon_path(name, frame).to_svg(),
                    escape(fill)
                ));
            }
            StickerSource::Emoji(glyph) => {
                let center = frame.center();
                self.body.push_str(&format!(
                    "<text x=\"{}\" y=\"{}\" font-size=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>",
                    center.x,
                    center.y,
                    frame.height() * 0.75,
                    escape(glyph)
                ));
            }
        }
        self.body.push_str("</g>");
    }

    fn text(&mut self, text: &TextElement) {
        let stroke = match text.outline.as_ref().filter(|o| o.is_visible()) {
            Some(o) => format!(
                " stroke=\"{}\" stroke-width=\"{}\" paint-order=\"stroke\"",
                escape(&o.color),
                o.width * 2.0
            ),
            None => String::new(),
        };
        self.body.push_str(&format!(
            "<text font-size=\"{}\" font-family=\"{}\" fill=\"{}\"{}>",
            text.font_size,
            escape(&text.font_family),
            escape(&text.color),
            stroke
        ));
        for (i, line) in text.text.lines().enumerate() {
            let baseline = text.position.y + text.font_size * (0.9 + 1.2 * i as f64);
            self.body.push_str(&format!(
                "<tspan x=\"{}\" y=\"{}\">{}</tspan>",
                text.position.x,
                baseline,
                escape(line)
            ));
        }
        self.body.push_str("</text>");
    }

    fn image_tag(&mut self, rect: Rect, href: &str) {
        self.body.push_str(&format!(
            "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" href=\"{}\"/>",
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height(),
            href
        ));
    }

    /// Gray box with an X for artwork that could not be loaded.
    fn placeholder(&mut self, frame: Rect) {
        self.body.push_str(&format!(
            "<rect x=\"{x0}\" y=\"{y0}\" width=\"{w}\" height=\"{h}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"2\"/>\
             <path d=\"M{x0} {y0}L{x1} {y1}M{x1} {y0}L{x0} {y1}\" stroke=\"{stroke}\" stroke-width=\"2\"/>",
            x0 = frame.x0,
            y0 = frame.y0,
            x1 = frame.x1,
            y1 = frame.y1,
            w = frame.width(),
            h = frame.height(),
            fill = PLACEHOLDER_FILL,
            stroke = PLACEHOLDER_STROKE,
        ));
    }
}

fn rgb(color: Rgba<u8>) -> String {
    format!("rgb({},{},{})", color[0], color[1], color[2])
}

/// Escape text for XML content and attribute values.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::tests::solid_png_url;
    use crate::assets::{AssetResolver, FsAssetResolver};
    use kurbo::Point;
    use valencard_core::element::{ElementKind, ElementPatch};
    use valencard_core::layers::HiddenSet;
    use valencard_core::scene::Scene;
    use valencard_core::source::ImageSource;

    fn render(scene: &Scene, hidden: &HiddenSet) -> String {
        let resolver = FsAssetResolver::new("does-not-exist");
        let assets = AssetCache::collect(scene, hidden, &resolver as &dyn AssetResolver);
        build_svg(&ExportContext::new(scene, hidden, &assets))
    }

    #[test]
    fn test_empty_scene_has_white_background() {
        let svg = render(&Scene::new(), &HiddenSet::new());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("viewBox=\"0 0 600 800\""));
        assert!(svg.contains("fill=\"#ffffff\""));
    }

    #[test]
    fn test_heart_image_is_clipped_and_rotated() {
        let mut scene = Scene::new();
        let url = solid_png_url(4, 2, [255, 0, 0, 255]);
        let id = scene.add(Element::Image(UserImage::new(
            ImageSource::parse(&url),
            Rect::new(100.0, 100.0, 200.0, 200.0),
        )));
        let patch = ElementPatch {
            shape: Some(ShapeKind::Heart),
            rotation: Some(45.0),
            ..Default::default()
        };
        scene.update(ElementKind::Image, &id, &patch);

        let svg = render(&scene, &HiddenSet::new());
        assert!(svg.contains("<clipPath"));
        assert!(svg.contains("rotate(45 150 150)"));
        assert!(svg.contains("href=\"data:image/png;base64,"));
        // 4x2 picture covering a 100x100 frame is 200 wide, centered.
        assert!(svg.contains("x=\"50\" y=\"100\" width=\"200\" height=\"100\""));
    }

    #[test]
    fn test_hidden_and_unreadable_elements() {
        let mut scene = Scene::new();
        let sticker = scene.add(Element::Sticker(Sticker::new(
            StickerSource::parse("🌹"),
            Point::new(10.0, 10.0),
            Size::new(80.0, 80.0),
        )));
        scene.add(Element::Image(UserImage::new(
            ImageSource::parse("https://example.com/a.png"),
            Rect::new(0.0, 0.0, 100.0, 100.0),
        )));
        let mut hidden = HiddenSet::new();
        hidden.toggle(&sticker);

        let svg = render(&scene, &hidden);
        assert!(!svg.contains("🌹"));
        assert!(svg.contains(PLACEHOLDER_FILL));
    }

    #[test]
    fn test_text_lines_and_escaping() {
        let mut scene = Scene::new();
        scene.add(Element::Text(TextElement::new(Point::new(20.0, 40.0), "Be mine\n<3 & more")));
        let svg = render(&scene, &HiddenSet::new());
        assert_eq!(svg.matches("<tspan").count(), 2);
        assert!(svg.contains("&lt;3 &amp; more"));
        assert!(svg.contains("font-family=\"Arial\""));
    }

    #[test]
    fn test_gradient_background_and_icon() {
        let background = Background::sniff("linear-gradient(to bottom, #ffe4e6, #fbcfe8)");
        let mut scene = Scene::with_background(background);
        scene.add(Element::Sticker(Sticker::new(
            StickerSource::parse("icon:Heart:#ec4899"),
            Point::new(0.0, 0.0),
            Size::new(60.0, 60.0),
        )));
        let svg = render(&scene, &HiddenSet::new());
        assert!(svg.contains("<linearGradient"));
        assert!(svg.contains("fill=\"url(#bg-gradient-1)\""));
        assert!(svg.contains("fill=\"#ec4899\""));
    }

    #[test]
    fn test_document_parses() {
        let mut scene = Scene::new();
        scene.add(Element::Text(TextElement::new(Point::new(20.0, 40.0), "Hi \"you\"")));
        let svg = render(&scene, &HiddenSet::new());
        assert!(usvg::Tree::from_str(&svg, &usvg::Options::default()).is_ok());
    }
}
