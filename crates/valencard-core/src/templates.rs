//! Built-in card templates.
//!
//! A template is a generated SVG background plus an optional image area that
//! decides where uploaded pictures land.

use crate::background::Background;
use crate::scene::{CANVAS_HEIGHT, CANVAS_WIDTH};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use kurbo::Rect;
use std::fmt::Write as _;

/// Template grouping shown in the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateCategory {
    Alpha,
    Love,
    Romantic,
    Cute,
}

/// Region reserved for the main picture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageArea {
    pub frame: Rect,
    pub border_radius: f64,
}

impl ImageArea {
    const fn new(x: f64, y: f64, width: f64, height: f64, border_radius: f64) -> Self {
        Self {
            frame: Rect::new(x, y, x + width, y + height),
            border_radius,
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub category: TemplateCategory,
    pub description: &'static str,
    pub image_area: Option<ImageArea>,
}

impl Template {
    /// Background for this template as an SVG data URL.
    pub fn background(&self) -> Background {
        template_background(self.id)
    }
}

const TEMPLATES: &[Template] = &[
    Template {
        id: "blank",
        name: "Blank Canvas",
        category: TemplateCategory::Love,
        description: "Start from scratch with a blank canvas",
        image_area: None,
    },
    Template {
        id: "hearts-bg",
        name: "Hearts Background",
        category: TemplateCategory::Love,
        description: "Beautiful pink and red hearts pattern",
        image_area: Some(ImageArea::new(150.0, 150.0, 300.0, 300.0, 150.0)),
    },
    Template {
        id: "romantic-rose",
        name: "Romantic Rose",
        category: TemplateCategory::Romantic,
        description: "Elegant rose design for your loved one",
        image_area: Some(ImageArea::new(100.0, 100.0, 400.0, 300.0, 20.0)),
    },
    Template {
        id: "cute-bear",
        name: "Cute Teddy Bear",
        category: TemplateCategory::Cute,
        description: "Adorable teddy bear with hearts",
        image_area: Some(ImageArea::new(200.0, 200.0, 200.0, 200.0, 100.0)),
    },
    Template {
        id: "alpha-love",
        name: "ALPHA Love",
        category: TemplateCategory::Alpha,
        description: "ALPHA organization special edition",
        image_area: Some(ImageArea::new(125.0, 125.0, 350.0, 350.0, 20.0)),
    },
    Template {
        id: "alpha-valentine",
        name: "ALPHA Valentine",
        category: TemplateCategory::Alpha,
        description: "Exclusive ALPHA Valentine design",
        image_area: Some(ImageArea::new(100.0, 150.0, 400.0, 400.0, 200.0)),
    },
];

/// Every template, in picker order.
pub fn templates() -> &'static [Template] {
    TEMPLATES
}

pub fn template(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

/// Background for a template id. Unknown ids get the blank card.
pub fn template_background(id: &str) -> Background {
    let svg = template_svg(id);
    Background::SvgData(format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(svg.as_bytes())
    ))
}

fn svg_open() -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = CANVAS_WIDTH,
        h = CANVAS_HEIGHT
    )
}

fn heart_path(x: f64, y: f64, fill: &str) -> String {
    format!(
        r#"<path d="M {x},{y0} C {x},{y1} {x20},{y} {x25},{y} S {x50},{y1} {x50},{y0} C {x50},{y35} {x25},{y50} {x25},{y70} C {x25},{y50} {x},{y35} {x},{y0} Z" fill="{fill}"/>"#,
        y0 = y + 20.0,
        y1 = y + 10.0,
        y35 = y + 35.0,
        y50 = y + 50.0,
        y70 = y + 70.0,
        x20 = x + 20.0,
        x25 = x + 25.0,
        x50 = x + 50.0,
    )
}

/// SVG source for a template id.
pub fn template_svg(id: &str) -> String {
    let mut svg = svg_open();
    match id {
        "hearts-bg" => {
            svg.push_str(
                r##"<defs><linearGradient id="grad1" x1="0%" y1="0%" x2="100%" y2="100%"><stop offset="0%" stop-color="#FFE5E5"/><stop offset="100%" stop-color="#FFB3C1"/></linearGradient></defs><rect width="600" height="800" fill="url(#grad1)"/><g opacity="0.3">"##,
            );
            for i in 0..20 {
                let x = (i % 5) as f64 * 120.0 + 60.0;
                let y = (i / 5) as f64 * 200.0 + 100.0;
                svg.push_str(&heart_path(x, y, "#FF6B9D"));
            }
            svg.push_str("</g>");
        }
        "romantic-rose" => svg.push_str(concat!(
            r##"<rect width="600" height="800" fill="#FFF5F7"/>"##,
            r##"<ellipse cx="300" cy="400" rx="150" ry="150" fill="#FF1744" opacity="0.1"/>"##,
            r##"<path d="M 300 200 Q 250 250 250 300 Q 250 350 300 400 Q 350 350 350 300 Q 350 250 300 200 Z" fill="#E91E63" opacity="0.3"/>"##,
            r##"<circle cx="280" cy="280" r="30" fill="#F06292" opacity="0.4"/>"##,
            r##"<circle cx="320" cy="280" r="25" fill="#F48FB1" opacity="0.4"/>"##,
            r##"<text x="300" y="650" text-anchor="middle" font-size="48" font-family="serif" fill="#C2185B" font-style="italic">Love</text>"##,
        )),
        "cute-bear" => svg.push_str(concat!(
            r##"<rect width="600" height="800" fill="#FFF9C4"/>"##,
            r##"<circle cx="200" cy="200" r="50" fill="#8D6E63"/>"##,
            r##"<circle cx="400" cy="200" r="50" fill="#8D6E63"/>"##,
            r##"<circle cx="300" cy="280" r="100" fill="#A1887F"/>"##,
            r##"<circle cx="270" cy="260" r="15" fill="#3E2723"/>"##,
            r##"<circle cx="330" cy="260" r="15" fill="#3E2723"/>"##,
            r##"<ellipse cx="300" cy="300" rx="25" ry="15" fill="#6D4C41"/>"##,
            r##"<path d="M 260 320 Q 300 340 340 320" stroke="#3E2723" stroke-width="3" fill="none"/>"##,
            r##"<path d="M 280 380 C 280 360 285 350 300 350 C 315 350 320 360 320 380 C 320 400 310 410 300 415 C 290 410 280 400 280 380 Z" fill="#E91E63"/>"##,
            r##"<text x="300" y="700" text-anchor="middle" font-size="36" font-family="cursive" fill="#FF6090">Be Mine! 💕</text>"##,
        )),
        "alpha-love" => {
            svg.push_str(concat!(
                r##"<defs><linearGradient id="alphaGrad" x1="0%" y1="0%" x2="100%" y2="100%"><stop offset="0%" stop-color="#667EEA"/><stop offset="100%" stop-color="#764BA2"/></linearGradient></defs>"##,
                r##"<rect width="600" height="800" fill="url(#alphaGrad)"/>"##,
                r##"<text x="300" y="150" text-anchor="middle" font-size="72" font-family="Arial Black" fill="#FFFFFF" font-weight="bold">ALPHA</text>"##,
            ));
            for (x, y, opacity) in [(300.0, 230.0, 0.9), (250.0, 280.0, 0.7), (350.0, 280.0, 0.7)] {
                let heart = heart_path(x, y, "#FFFFFF");
                let _ = write!(svg, r#"<g opacity="{opacity}">{}</g>"#, heart);
            }
            svg.push_str(
                r##"<text x="300" y="700" text-anchor="middle" font-size="32" font-family="Arial" fill="#FFFFFF">Happy Valentine's Day!</text>"##,
            );
        }
        "alpha-valentine" => {
            svg.push_str(concat!(
                r##"<rect width="600" height="800" fill="#1A1A2E"/>"##,
                r##"<circle cx="300" cy="400" r="200" fill="#16213E" opacity="0.5"/>"##,
                r##"<text x="300" y="250" text-anchor="middle" font-size="64" font-family="Arial Black" fill="#E94560" font-weight="bold">ALPHA</text>"##,
                r##"<text x="300" y="320" text-anchor="middle" font-size="28" font-family="Arial" fill="#EAEAEA">Organization</text>"##,
                r##"<rect x="200" y="380" width="200" height="4" fill="#E94560" opacity="0.6"/>"##,
                r##"<path d="M 300 450 L 280 470 L 290 480 L 300 470 L 310 480 L 320 470 Z" fill="#E94560"/>"##,
                r##"<text x="300" y="580" text-anchor="middle" font-size="36" font-family="Arial" fill="#EAEAEA" font-style="italic">Together Forever</text>"##,
            ));
            for (cx, cy, r, opacity) in [
                (150, 150, 5, 0.6),
                (450, 200, 7, 0.4),
                (100, 600, 6, 0.5),
                (500, 650, 8, 0.5),
            ] {
                let _ = write!(
                    svg,
                    r##"<circle cx="{cx}" cy="{cy}" r="{r}" fill="#E94560" opacity="{opacity}"/>"##
                );
            }
        }
        _ => svg.push_str(r##"<rect width="600" height="800" fill="#ffffff"/>"##),
    }
    svg.push_str("</svg>");
    svg
}
