//! Geometry: points, sizes, and the pure math behind placement, drag, resize,
//! rotate, and scale.
//!
//! Every function here is side-effect free. Callers read a fresh copy of the
//! element, compute the new values here, and submit the result as an
//! `UpdateElement` action. All coordinates are logical pixels relative to the
//! canvas top-left corner.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{ENLARGE_FACTOR, MIN_ELEMENT_SIZE, REDUCE_FACTOR, ROTATION_STEP_DEG};

/// A point or offset in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn delta_from(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// Width and height in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.right() && pt.y >= self.y && pt.y <= self.bottom()
    }
}

/// One of the eight resize grips around an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeHandle {
    /// All handles, clockwise from north.
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::N,
        ResizeHandle::Ne,
        ResizeHandle::E,
        ResizeHandle::Se,
        ResizeHandle::S,
        ResizeHandle::Sw,
        ResizeHandle::W,
        ResizeHandle::Nw,
    ];

    #[must_use]
    pub fn moves_north(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    #[must_use]
    pub fn moves_south(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    #[must_use]
    pub fn moves_east(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    #[must_use]
    pub fn moves_west(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    /// Where this handle sits on `rect`.
    #[must_use]
    pub fn anchor(self, rect: &Rect) -> Point {
        let x = if self.moves_west() {
            rect.x
        } else if self.moves_east() {
            rect.right()
        } else {
            rect.x + rect.width / 2.0
        };
        let y = if self.moves_north() {
            rect.y
        } else if self.moves_south() {
            rect.bottom()
        } else {
            rect.y + rect.height / 2.0
        };
        Point::new(x, y)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::N => "n",
            Self::Ne => "ne",
            Self::E => "e",
            Self::Se => "se",
            Self::S => "s",
            Self::Sw => "sw",
            Self::W => "w",
            Self::Nw => "nw",
        }
    }
}

impl fmt::Display for ResizeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a resize handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resize handle: {0}")]
pub struct UnknownHandle(pub String);

impl FromStr for ResizeHandle {
    type Err = UnknownHandle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResizeHandle::ALL
            .into_iter()
            .find(|h| h.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownHandle(s.to_owned()))
    }
}

/// Direction of a 90-degree rotate step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

/// Enlarge or reduce by the fixed scale factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Enlarge,
    Reduce,
}

impl Scale {
    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            Self::Enlarge => ENLARGE_FACTOR,
            Self::Reduce => REDUCE_FACTOR,
        }
    }
}

// =============================================================================
// PLACEMENT
// =============================================================================

/// Pick a random top-left position that keeps `element` inside `canvas`.
///
/// Each axis samples an integer offset in `[0, canvas - element)`. When the
/// element is at least as large as the canvas on an axis, that axis is pinned
/// to 0 instead of handing a non-positive bound to the sampler.
pub fn random_position<R: Rng + ?Sized>(rng: &mut R, canvas: Size, element: Size) -> Point {
    Point::new(
        sample_offset(rng, canvas.width - element.width),
        sample_offset(rng, canvas.height - element.height),
    )
}

fn sample_offset<R: Rng + ?Sized>(rng: &mut R, span: f64) -> f64 {
    // NaN and sub-pixel spans both land here.
    if span.is_nan() || span < 1.0 {
        return 0.0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let upper = span.floor().min(f64::from(u32::MAX)) as u32;
    f64::from(rng.random_range(0..upper))
}

// =============================================================================
// DRAG
// =============================================================================

/// New top-left after dragging by `offset` from `origin`, clamped so the
/// element stays inside `container`.
///
/// `container` must be the currently measured rendered bounds, not the stored
/// config size, so a stale config cannot let elements drift outside.
#[must_use]
pub fn drag(origin: Point, offset: Point, element: Size, container: Size) -> Point {
    Point::new(
        clamp_axis(origin.x + offset.x, container.width - element.width),
        clamp_axis(origin.y + offset.y, container.height - element.height),
    )
}

fn clamp_axis(value: f64, span: f64) -> f64 {
    value.clamp(0.0, span.max(0.0))
}

// =============================================================================
// RESIZE
// =============================================================================

/// Floor a width or height at [`MIN_ELEMENT_SIZE`].
#[must_use]
pub fn clamp_size(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_ELEMENT_SIZE;
    }
    value.max(MIN_ELEMENT_SIZE)
}

/// Resize `start` by dragging `handle` by `delta` (pointer movement since the
/// gesture began).
///
/// Every handle adds the signed delta on its axis to the size, so a negative
/// delta shrinks on any side. West/north handles then shift the position so
/// the opposite edge stays put. The shift is derived from the clamped size,
/// so once the size floor is hit the anchored edge still does not move.
#[must_use]
pub fn resize(start: Rect, handle: ResizeHandle, delta: Point) -> Rect {
    let mut out = start;

    if handle.moves_east() || handle.moves_west() {
        out.width = clamp_size(start.width + delta.x);
        if handle.moves_west() {
            out.x = start.right() - out.width;
        }
    }

    if handle.moves_south() || handle.moves_north() {
        out.height = clamp_size(start.height + delta.y);
        if handle.moves_north() {
            out.y = start.bottom() - out.height;
        }
    }

    out
}

// =============================================================================
// ROTATE / SCALE
// =============================================================================

/// Add or remove one 90-degree step. The result is deliberately not
/// normalized into `[0, 360)`.
#[must_use]
pub fn rotate(rotation: i32, direction: Rotation) -> i32 {
    match direction {
        Rotation::Clockwise => rotation.saturating_add(ROTATION_STEP_DEG),
        Rotation::CounterClockwise => rotation.saturating_sub(ROTATION_STEP_DEG),
    }
}

/// Multiply both dimensions by the scale factor, then floor-clamp.
#[must_use]
pub fn scale(size: Size, direction: Scale) -> Size {
    let factor = direction.factor();
    Size::new(clamp_size(size.width * factor), clamp_size(size.height * factor))
}

/// Bounds as drawn on screen. Quarter-turn rotations about the center swap
/// width and height; half turns leave the box unchanged.
#[must_use]
pub fn visual_bounds(rect: Rect, rotation: i32) -> Rect {
    if rotation.rem_euclid(180) == 90 {
        let c = rect.center();
        Rect::new(c.x - rect.height / 2.0, c.y - rect.width / 2.0, rect.height, rect.width)
    } else {
        rect
    }
}
