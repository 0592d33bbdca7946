//! CSS paint values and box layout shared by both rasterizers.

use image::Rgba;
use kurbo::{BezPath, Point, Rect, RoundedRect, Shape as _, Size, Vec2};
use valencard_core::element::ShapeKind;
use valencard_core::geometry::{ClipMask, HEART_POLYGON, STAR_POLYGON, clip_mask_for};

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

const NAMED_COLORS: &[(&str, [u8; 4])] = &[
    ("transparent", [0, 0, 0, 0]),
    ("white", [255, 255, 255, 255]),
    ("black", [0, 0, 0, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 128, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("orange", [255, 165, 0, 255]),
    ("purple", [128, 0, 128, 255]),
    ("pink", [255, 192, 203, 255]),
    ("hotpink", [255, 105, 180, 255]),
    ("gold", [255, 215, 0, 255]),
    ("gray", [128, 128, 128, 255]),
    ("grey", [128, 128, 128, 255]),
];

/// Parse a CSS color: hex, `rgb()`, `rgba()` or a common name.
pub fn parse_color(raw: &str) -> Option<Rgba<u8>> {
    let value = raw.trim().to_ascii_lowercase();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let parts: Vec<&str> = args
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() < 3 {
            return None;
        }
        let channel = |s: &str| -> Option<u8> {
            match s.strip_suffix('%') {
                Some(pct) => pct.parse::<f64>().ok().map(|v| to_byte(v * 2.55)),
                None => s.parse::<f64>().ok().map(to_byte),
            }
        };
        let alpha = match parts.get(3) {
            Some(a) => match a.strip_suffix('%') {
                Some(pct) => pct.parse::<f64>().ok()? / 100.0,
                None => a.parse::<f64>().ok()?,
            },
            None => 1.0,
        };
        return Some(Rgba([
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]));
    }
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == value)
        .map(|(_, rgba)| Rgba(*rgba))
}

fn to_byte(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn parse_hex(hex: &str) -> Option<Rgba<u8>> {
    let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 | 4 => {
            let a = if hex.len() == 4 { digit(3)? * 17 } else { 255 };
            Some(Rgba([digit(0)? * 17, digit(1)? * 17, digit(2)? * 17, a]))
        }
        6 | 8 => {
            let a = if hex.len() == 8 { pair(6)? } else { 255 };
            Some(Rgba([pair(0)?, pair(2)?, pair(4)?, a]))
        }
        _ => None,
    }
}

/// One stop of a gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    /// Color as written, for the SVG document.
    pub color: String,
    pub rgba: Rgba<u8>,
    /// Position along the gradient line, 0..=1.
    pub offset: f64,
}

/// A CSS gradient reduced to what both rasterizers can paint.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub radial: bool,
    /// CSS angle in degrees, 0 = towards the top, clockwise.
    pub angle: f64,
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    /// Parse `linear-gradient(..)`, `radial-gradient(..)` and their
    /// `repeating-` variants. Repetition is painted once.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let open = raw.find("gradient(")? + "gradient(".len();
        let close = raw.rfind(')')?;
        if close < open {
            return None;
        }
        let radial = raw[..open].contains("radial");
        let mut args = split_top_level(&raw[open..close]);
        let mut angle = 180.0;
        if let Some(first) = args.first() {
            if let Some(a) = parse_direction(first) {
                angle = a;
                args.remove(0);
            } else if radial && parse_color(first_token(first)).is_none() {
                // Shape and size of a radial gradient; always painted as a
                // centered farthest-corner circle.
                args.remove(0);
            }
        }

        let mut stops: Vec<(String, Rgba<u8>, Option<f64>)> = Vec::new();
        for arg in args {
            let (color, offset) = split_stop(arg);
            match parse_color(color) {
                Some(rgba) => stops.push((color.to_string(), rgba, offset)),
                None => log::debug!("Skipping unsupported gradient stop: {}", arg),
            }
        }
        if stops.is_empty() {
            return None;
        }
        if stops.len() == 1 {
            stops.push(stops[0].clone());
        }
        let last = stops.len() - 1;
        let stops = stops
            .into_iter()
            .enumerate()
            .map(|(i, (color, rgba, offset))| GradientStop {
                color,
                rgba,
                offset: offset.unwrap_or(i as f64 / last as f64).clamp(0.0, 1.0),
            })
            .collect();
        Some(Self {
            radial,
            angle,
            stops,
        })
    }

    /// Start and end of the gradient line across a box, as CSS lays it out.
    pub fn line(&self, size: Size) -> (Point, Point) {
        let rad = self.angle.to_radians();
        let dir = Vec2::new(rad.sin(), -rad.cos());
        let len = (size.width * rad.sin()).abs() + (size.height * rad.cos()).abs();
        let center = Point::new(size.width / 2.0, size.height / 2.0);
        (center - dir * (len / 2.0), center + dir * (len / 2.0))
    }

    /// Radius of a farthest-corner radial gradient.
    pub fn radius(size: Size) -> f64 {
        (size.width.powi(2) + size.height.powi(2)).sqrt() / 2.0
    }

    /// Color at a point of a box of `size`.
    pub fn color_at(&self, size: Size, point: Point) -> Rgba<u8> {
        let t = if self.radial {
            let center = Point::new(size.width / 2.0, size.height / 2.0);
            point.distance(center) / Self::radius(size)
        } else {
            let (start, end) = self.line(size);
            let axis = end - start;
            let len2 = axis.hypot2();
            if len2 <= f64::EPSILON {
                0.0
            } else {
                (point - start).dot(axis) / len2
            }
        };
        self.sample(t)
    }

    fn sample(&self, t: f64) -> Rgba<u8> {
        let t = t.clamp(0.0, 1.0);
        let first = &self.stops[0];
        if t <= first.offset {
            return first.rgba;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if t <= b.offset {
                let span = b.offset - a.offset;
                let k = if span <= f64::EPSILON { 1.0 } else { (t - a.offset) / span };
                return lerp(a.rgba, b.rgba, k);
            }
        }
        self.stops[self.stops.len() - 1].rgba
    }
}

fn lerp(a: Rgba<u8>, b: Rgba<u8>, k: f64) -> Rgba<u8> {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * k).round() as u8;
    Rgba([mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2]), mix(a[3], b[3])])
}

fn parse_direction(arg: &str) -> Option<f64> {
    let arg = arg.trim();
    if let Some(deg) = arg.strip_suffix("deg") {
        return deg.trim().parse().ok();
    }
    if let Some(turn) = arg.strip_suffix("turn") {
        return turn.trim().parse::<f64>().ok().map(|t| t * 360.0);
    }
    let angle = match arg {
        "to top" => 0.0,
        "to top right" | "to right top" => 45.0,
        "to right" => 90.0,
        "to bottom right" | "to right bottom" => 135.0,
        "to bottom" => 180.0,
        "to bottom left" | "to left bottom" => 225.0,
        "to left" => 270.0,
        "to top left" | "to left top" => 315.0,
        _ => return None,
    };
    Some(angle)
}

fn first_token(arg: &str) -> &str {
    arg.split_whitespace().next().unwrap_or_default()
}

/// Split `"#fff 20%"` into color and offset. Colors may contain spaces
/// inside parentheses, so only a trailing percentage is peeled off.
fn split_stop(arg: &str) -> (&str, Option<f64>) {
    let arg = arg.trim();
    if let Some((color, pos)) = arg.rsplit_once(char::is_whitespace) {
        if let Some(pct) = pos.strip_suffix('%') {
            if let Ok(v) = pct.parse::<f64>() {
                return (color.trim(), Some(v / 100.0));
            }
        }
    }
    (arg, None)
}

/// Split on commas that are not inside parentheses.
fn split_top_level(inner: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let tail = inner[start..].trim();
    if !tail.is_empty() {
        parts.push(tail);
    }
    parts
}

/// `object-fit: cover` placement of a picture inside a frame.
///
/// `object_position` is in percent, 50/50 centers the picture.
pub fn cover_rect(frame: Rect, intrinsic: Size, object_position: (f64, f64)) -> Rect {
    if intrinsic.width <= 0.0 || intrinsic.height <= 0.0 {
        return frame;
    }
    let scale = (frame.width() / intrinsic.width).max(frame.height() / intrinsic.height);
    place(frame, intrinsic * scale, object_position)
}

/// `object-fit: contain` placement, centered.
pub fn contain_rect(frame: Rect, intrinsic: Size) -> Rect {
    if intrinsic.width <= 0.0 || intrinsic.height <= 0.0 {
        return frame;
    }
    let scale = (frame.width() / intrinsic.width).min(frame.height() / intrinsic.height);
    place(frame, intrinsic * scale, (50.0, 50.0))
}

fn place(frame: Rect, size: Size, (px, py): (f64, f64)) -> Rect {
    let x = frame.x0 + (frame.width() - size.width) * px / 100.0;
    let y = frame.y0 + (frame.height() - size.height) * py / 100.0;
    Rect::from_origin_size((x, y), size)
}

/// Clip outline of an element frame, if it needs one.
///
/// An explicit corner radius on a rectangular element rounds its corners.
pub fn clip_path(shape: ShapeKind, corner_radius: Option<f64>, frame: Rect) -> Option<BezPath> {
    match (shape, corner_radius) {
        (ShapeKind::Rectangle, Some(radius)) if radius > 0.0 => {
            Some(RoundedRect::from_rect(frame, radius).to_path(0.1))
        }
        _ => clip_mask_for(shape).to_path(frame),
    }
}

/// Silhouette drawn for an icon sticker.
pub fn icon_path(name: &str, frame: Rect) -> BezPath {
    let mask = match name.to_ascii_lowercase().as_str() {
        "heart" => ClipMask::Polygon(HEART_POLYGON),
        "star" | "sparkles" => ClipMask::Polygon(STAR_POLYGON),
        _ => ClipMask::Circle,
    };
    // Icons are drawn with some padding, like a glyph in its box.
    let pad = frame.width().min(frame.height()) * 0.1;
    let inset = frame.inflate(-pad, -pad);
    mask.to_path(inset).unwrap_or_else(|| inset.to_path(0.1))
}
