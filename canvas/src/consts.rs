//! Shared numeric constants for the canvas crate.

// ── Geometry ────────────────────────────────────────────────────

/// Smallest width or height any element may have after a geometry operation.
pub const MIN_ELEMENT_SIZE: f64 = 8.0;

/// Degrees added or removed by one rotate step.
pub const ROTATION_STEP_DEG: i32 = 90;

/// Size multiplier applied by "enlarge".
pub const ENLARGE_FACTOR: f64 = 1.2;

/// Size multiplier applied by "reduce".
pub const REDUCE_FACTOR: f64 = 0.8;

// ── Canvas defaults ─────────────────────────────────────────────

/// Default rendered canvas width in logical pixels.
pub const DEFAULT_CANVAS_WIDTH: f64 = 800.0;

/// Default rendered canvas height in logical pixels.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 800.0;

/// Default aspect ratio string used before any background image is loaded.
pub const DEFAULT_ASPECT_RATIO: &str = "1:1";

/// Number of label segments on each side of the canvas perimeter.
pub const LABELS_PER_SIDE: usize = 4;

// ── Hit-testing ─────────────────────────────────────────────────

/// Hit slop in pixels around a resize handle's anchor point.
pub const HANDLE_RADIUS_PX: f64 = 6.0;
