//! Clip masks and transform math for placed elements.

use crate::element::{AspectLock, ShapeKind};
use crate::handles::Corner;
use kurbo::{BezPath, Point, Rect, RoundedRect, Shape as _, Size};

/// Heart outline, in percent of the element box.
pub const HEART_POLYGON: &[(f64, f64)] = &[
    (50.0, 15.0),
    (61.0, 6.0),
    (72.0, 3.0),
    (81.0, 6.0),
    (88.0, 13.0),
    (93.0, 22.0),
    (95.0, 32.0),
    (94.0, 42.0),
    (90.0, 52.0),
    (83.0, 61.0),
    (72.0, 71.0),
    (62.0, 80.0),
    (50.0, 95.0),
    (38.0, 80.0),
    (28.0, 71.0),
    (17.0, 61.0),
    (10.0, 52.0),
    (6.0, 42.0),
    (5.0, 32.0),
    (7.0, 22.0),
    (12.0, 13.0),
    (19.0, 6.0),
    (28.0, 3.0),
    (39.0, 6.0),
];

/// Five-pointed star outline, in percent of the element box.
pub const STAR_POLYGON: &[(f64, f64)] = &[
    (50.0, 0.0),
    (61.0, 35.0),
    (98.0, 35.0),
    (68.0, 57.0),
    (79.0, 91.0),
    (50.0, 70.0),
    (21.0, 91.0),
    (32.0, 57.0),
    (2.0, 35.0),
    (39.0, 35.0),
];

/// Corner rounding of the `rounded` shape, in percent of the box.
pub const ROUNDED_RADIUS_PERCENT: f64 = 20.0;

/// A clip region expressed relative to the element box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipMask {
    /// No clipping.
    None,
    /// Centered circle with a 50% radius.
    Circle,
    /// Closed polygon with points in percent.
    Polygon(&'static [(f64, f64)]),
    /// Full box with rounded corners, radius in percent.
    Inset { round: f64 },
}

/// Mask for a shape.
pub fn clip_mask_for(shape: ShapeKind) -> ClipMask {
    match shape {
        ShapeKind::Rectangle => ClipMask::None,
        ShapeKind::Circle => ClipMask::Circle,
        ShapeKind::Heart => ClipMask::Polygon(HEART_POLYGON),
        ShapeKind::Star => ClipMask::Polygon(STAR_POLYGON),
        ShapeKind::Rounded => ClipMask::Inset {
            round: ROUNDED_RADIUS_PERCENT,
        },
    }
}

impl ClipMask {
    /// CSS `clip-path` value.
    pub fn to_css(&self) -> String {
        match self {
            ClipMask::None => "none".to_string(),
            ClipMask::Circle => "circle(50% at 50% 50%)".to_string(),
            ClipMask::Polygon(points) => {
                let body = points
                    .iter()
                    .map(|(x, y)| format!("{}% {}%", x, y))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("polygon({body})")
            }
            ClipMask::Inset { round } => format!("inset(0% 0% 0% 0% round {}%)", round),
        }
    }

    /// Clip outline in canvas coordinates for an element box.
    ///
    /// Returns `None` when nothing has to be clipped.
    pub fn to_path(&self, rect: Rect) -> Option<BezPath> {
        match self {
            ClipMask::None => None,
            ClipMask::Circle => {
                // 50% of the box diagonal normalised by sqrt(2), as CSS resolves it.
                let radius = (rect.width().powi(2) + rect.height().powi(2)).sqrt()
                    / std::f64::consts::SQRT_2
                    / 2.0;
                Some(kurbo::Circle::new(rect.center(), radius).to_path(0.1))
            }
            ClipMask::Polygon(points) => {
                let mut path = BezPath::new();
                for (i, (px, py)) in points.iter().enumerate() {
                    let p = Point::new(
                        rect.x0 + rect.width() * px / 100.0,
                        rect.y0 + rect.height() * py / 100.0,
                    );
                    if i == 0 {
                        path.move_to(p);
                    } else {
                        path.line_to(p);
                    }
                }
                path.close_path();
                Some(path)
            }
            ClipMask::Inset { round } => {
                let radius = rect.width().min(rect.height()) * round / 100.0;
                Some(RoundedRect::from_rect(rect, radius).to_path(0.1))
            }
        }
    }

    /// Whether a canvas point inside `rect` survives the mask.
    pub fn contains(&self, rect: Rect, point: Point) -> bool {
        if !rect.contains(point) {
            return false;
        }
        match self.to_path(rect) {
            Some(path) => path.contains(point),
            None => true,
        }
    }
}

/// Resize a box by dragging one of its corners to `pointer`.
///
/// The opposite corner stays fixed. The result never flips and never drops
/// below `min_size` on either axis. With an aspect lock, whichever axis moved
/// further drives the other.
pub fn compute_resize(
    origin: Rect,
    corner: Corner,
    pointer: Point,
    lock: AspectLock,
    min_size: f64,
) -> Rect {
    let anchor = corner.opposite().point_of(origin);
    let raw = Size::new(
        match corner {
            Corner::Ne | Corner::Se => pointer.x - anchor.x,
            Corner::Nw | Corner::Sw => anchor.x - pointer.x,
        },
        match corner {
            Corner::Se | Corner::Sw => pointer.y - anchor.y,
            Corner::Ne | Corner::Nw => anchor.y - pointer.y,
        },
    );

    let size = match lock {
        AspectLock::Free => Size::new(raw.width.max(min_size), raw.height.max(min_size)),
        AspectLock::Square => {
            let side = dominant_extent(origin.size(), raw, 1.0).max(min_size);
            Size::new(side, side)
        }
        AspectLock::Preserve => {
            let aspect = if origin.height() > 0.0 {
                origin.width() / origin.height()
            } else {
                1.0
            };
            let width = dominant_extent(origin.size(), raw, aspect);
            let mut size = Size::new(width, width / aspect);
            let shortest = size.width.min(size.height);
            if shortest < min_size {
                let scale = min_size / shortest.max(f64::EPSILON);
                size = Size::new(size.width * scale, size.height * scale);
            }
            size
        }
    };

    place_from_anchor(anchor, corner, size)
}

/// Width chosen by the axis with the larger change; height follows `aspect`.
fn dominant_extent(original: Size, raw: Size, aspect: f64) -> f64 {
    let dw = (raw.width - original.width).abs();
    let dh = (raw.height - original.height).abs();
    if dw >= dh {
        raw.width
    } else {
        raw.height * aspect
    }
}

fn place_from_anchor(anchor: Point, corner: Corner, size: Size) -> Rect {
    let x0 = match corner {
        Corner::Ne | Corner::Se => anchor.x,
        Corner::Nw | Corner::Sw => anchor.x - size.width,
    };
    let y0 = match corner {
        Corner::Se | Corner::Sw => anchor.y,
        Corner::Ne | Corner::Nw => anchor.y - size.height,
    };
    Rect::from_origin_size(Point::new(x0, y0), size)
}

/// Angle of `point` around `center`, in degrees.
pub fn pointer_angle(center: Point, point: Point) -> f64 {
    (point.y - center.y).atan2(point.x - center.x).to_degrees()
}

/// New rotation after the pointer moved from `start` to `current`.
///
/// The result is normalised to `[0, 360)`.
pub fn compute_rotation(center: Point, start: Point, current: Point, base_rotation: f64) -> f64 {
    let start_angle = pointer_angle(center, start);
    rotation_from_angles(start_angle, pointer_angle(center, current), base_rotation)
}

/// Same as [`compute_rotation`] with a precomputed start angle.
pub fn rotation_from_angles(start_angle: f64, current_angle: f64, base_rotation: f64) -> f64 {
    normalize_degrees(base_rotation + (current_angle - start_angle))
}

pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if normalized >= 360.0 { 0.0 } else { normalized }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, side: f64) -> Rect {
        Rect::from_origin_size(Point::new(x, y), Size::new(side, side))
    }

    #[test]
    fn test_polygon_point_counts() {
        assert_eq!(HEART_POLYGON.len(), 24);
        assert_eq!(STAR_POLYGON.len(), 10);
    }

    #[test]
    fn test_css_strings() {
        assert_eq!(clip_mask_for(ShapeKind::Rectangle).to_css(), "none");
        assert_eq!(clip_mask_for(ShapeKind::Circle).to_css(), "circle(50% at 50% 50%)");
        assert_eq!(
            clip_mask_for(ShapeKind::Rounded).to_css(),
            "inset(0% 0% 0% 0% round 20%)"
        );
        assert_eq!(
            clip_mask_for(ShapeKind::Star).to_css(),
            "polygon(50% 0%, 61% 35%, 98% 35%, 68% 57%, 79% 91%, 50% 70%, 21% 91%, 32% 57%, 2% 35%, 39% 35%)"
        );
        assert!(clip_mask_for(ShapeKind::Heart).to_css().starts_with("polygon(50% 15%, 61% 6%"));
    }

    #[test]
    fn test_mask_contains() {
        let rect = square(0.0, 0.0, 100.0);
        let circle = clip_mask_for(ShapeKind::Circle);
        assert!(circle.contains(rect, Point::new(50.0, 50.0)));
        assert!(!circle.contains(rect, Point::new(2.0, 2.0)));
        let heart = clip_mask_for(ShapeKind::Heart);
        // The notch between the lobes is outside the heart.
        assert!(!heart.contains(rect, Point::new(50.0, 8.0)));
        assert!(heart.contains(rect, Point::new(50.0, 50.0)));
        assert!(clip_mask_for(ShapeKind::Rectangle).contains(rect, Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_heart_se_resize_keeps_anchor() {
        let origin = square(200.0, 200.0, 100.0);
        let out = compute_resize(
            origin,
            Corner::Se,
            Point::new(340.0, 340.0),
            ShapeKind::Heart.aspect_lock(),
            30.0,
        );
        assert_eq!(out.origin(), Point::new(200.0, 200.0));
        assert_eq!(out.size(), Size::new(140.0, 140.0));
    }

    #[test]
    fn test_square_lock_for_any_delta() {
        let origin = square(100.0, 100.0, 100.0);
        for corner in [Corner::Ne, Corner::Nw, Corner::Se, Corner::Sw] {
            for (dx, dy) in [(40.0, -10.0), (-300.0, 25.0), (7.0, 90.0), (-60.0, -60.0)] {
                let start = corner.point_of(origin);
                let out = compute_resize(
                    origin,
                    corner,
                    Point::new(start.x + dx, start.y + dy),
                    AspectLock::Square,
                    30.0,
                );
                assert!((out.width() - out.height()).abs() < 1e-9);
                assert!(out.width() >= 30.0);
            }
        }
    }

    #[test]
    fn test_min_size_clamp_without_flip() {
        let origin = square(100.0, 100.0, 300.0);
        let out = compute_resize(
            origin,
            Corner::Nw,
            Point::new(1000.0, 1000.0),
            AspectLock::Free,
            100.0,
        );
        // Anchor is the bottom-right corner.
        assert_eq!(out.x1, 400.0);
        assert_eq!(out.y1, 400.0);
        assert_eq!(out.size(), Size::new(100.0, 100.0));
    }

    #[test]
    fn test_preserve_aspect() {
        let origin = Rect::new(0.0, 0.0, 200.0, 100.0);
        let out = compute_resize(
            origin,
            Corner::Se,
            Point::new(300.0, 110.0),
            AspectLock::Preserve,
            30.0,
        );
        assert!((out.width() - 300.0).abs() < 1e-9);
        assert!((out.height() - 150.0).abs() < 1e-9);

        let tiny =
            compute_resize(origin, Corner::Se, Point::new(10.0, 10.0), AspectLock::Preserve, 30.0);
        assert!((tiny.height() - 30.0).abs() < 1e-9);
        assert!((tiny.width() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_free_resize_from_ne() {
        let origin = Rect::new(100.0, 100.0, 200.0, 200.0);
        let out =
            compute_resize(origin, Corner::Ne, Point::new(260.0, 50.0), AspectLock::Free, 30.0);
        assert_eq!(out, Rect::new(100.0, 50.0, 260.0, 200.0));
    }

    #[test]
    fn test_rotation_delta_and_normalization() {
        let center = Point::new(0.0, 0.0);
        let r = compute_rotation(center, Point::new(10.0, 0.0), Point::new(0.0, 10.0), 0.0);
        assert!((r - 90.0).abs() < 1e-9);
        let r = compute_rotation(center, Point::new(0.0, 10.0), Point::new(10.0, 0.0), 30.0);
        assert!((r - 300.0).abs() < 1e-9);
        assert_eq!(normalize_degrees(720.0), 0.0);
        assert!((normalize_degrees(-45.0) - 315.0).abs() < 1e-9);
    }
}
