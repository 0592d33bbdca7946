//! Resize and rotate handles drawn around the selected element.

use crate::element::{Element, ElementKind};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Handle hit radius in canvas pixels.
pub const HANDLE_HIT_RADIUS: f64 = 8.0;
/// Distance from the top edge to the rotation handle.
pub const ROTATE_HANDLE_OFFSET: f64 = 32.0;

/// Corner of an element box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corner {
    Ne,
    Nw,
    Se,
    Sw,
}

impl Corner {
    pub fn opposite(&self) -> Corner {
        match self {
            Corner::Ne => Corner::Sw,
            Corner::Nw => Corner::Se,
            Corner::Se => Corner::Nw,
            Corner::Sw => Corner::Ne,
        }
    }

    /// Position of this corner on `rect`.
    pub fn point_of(&self, rect: Rect) -> Point {
        match self {
            Corner::Ne => Point::new(rect.x1, rect.y0),
            Corner::Nw => Point::new(rect.x0, rect.y0),
            Corner::Se => Point::new(rect.x1, rect.y1),
            Corner::Sw => Point::new(rect.x0, rect.y1),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Corner::Ne => "ne",
            Corner::Nw => "nw",
            Corner::Se => "se",
            Corner::Sw => "sw",
        }
    }
}

impl FromStr for Corner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ne" => Ok(Corner::Ne),
            "nw" => Ok(Corner::Nw),
            "se" => Ok(Corner::Se),
            "sw" => Ok(Corner::Sw),
            other => Err(format!("unknown corner: {other}")),
        }
    }
}

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Corner(Corner),
    Rotate,
}

/// A handle with its canvas position.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    pub fn hit_test(&self, point: Point, radius: f64) -> bool {
        self.position.distance(point) <= radius
    }
}

/// Handles for an element, rotated with it.
///
/// Text can be rotated but not resized, so it only gets the rotate handle.
pub fn handles_for(element: &Element) -> Vec<Handle> {
    let bounds = element.bounds();
    let pivot = element.rotation_center();
    let rotate = kurbo::Affine::rotate_about(element.rotation().to_radians(), pivot);
    let top_center = Point::new(bounds.center().x, bounds.y0 - ROTATE_HANDLE_OFFSET);

    let mut handles = Vec::with_capacity(5);
    if element.kind() != ElementKind::Text {
        for corner in [Corner::Nw, Corner::Ne, Corner::Sw, Corner::Se] {
            handles.push(Handle::new(
                rotate * corner.point_of(bounds),
                HandleKind::Corner(corner),
            ));
        }
    }
    handles.push(Handle::new(rotate * top_center, HandleKind::Rotate));
    handles
}

/// Find which handle (if any) of `element` is under `point`.
pub fn hit_test_handles(element: &Element, point: Point) -> Option<HandleKind> {
    handles_for(element)
        .into_iter()
        .find(|h| h.hit_test(point, HANDLE_HIT_RADIUS))
        .map(|h| h.kind)
}
