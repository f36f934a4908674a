//! Canvas-wide configuration: size, aspect ratio, background image, and the
//! perimeter corner labels.
//!
//! Config changes flow through [`CanvasConfigPatch`], which is shallow-merged
//! by the reducer: only the fields a patch carries are written. The helpers
//! here build patches for the two common flows, loading a background image and
//! editing a corner label, without touching the live config.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_ASPECT_RATIO, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, LABELS_PER_SIDE};

/// Errors from config helpers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("image dimensions must be non-zero, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("label index {index} out of range for side {side} (max {max})")]
    LabelIndex { side: Side, index: usize, max: usize },
    #[error("unknown canvas side: {0}")]
    UnknownSide(String),
    #[error("invalid aspect ratio: {0}")]
    InvalidAspect(String),
}

/// One side of the canvas perimeter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Side::ALL
            .into_iter()
            .find(|side| side.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownSide(s.to_owned()))
    }
}

/// Labels along each side of the canvas, four segments per side.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CornerLabels {
    pub top: [String; LABELS_PER_SIDE],
    pub right: [String; LABELS_PER_SIDE],
    pub bottom: [String; LABELS_PER_SIDE],
    pub left: [String; LABELS_PER_SIDE],
}

impl CornerLabels {
    /// Four blank strings on every side.
    #[must_use]
    pub fn blank() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        Side::ALL
            .into_iter()
            .all(|side| self.side(side).iter().all(String::is_empty))
    }

    #[must_use]
    pub fn side(&self, side: Side) -> &[String; LABELS_PER_SIDE] {
        match side {
            Side::Top => &self.top,
            Side::Right => &self.right,
            Side::Bottom => &self.bottom,
            Side::Left => &self.left,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut [String; LABELS_PER_SIDE] {
        match side {
            Side::Top => &mut self.top,
            Side::Right => &mut self.right,
            Side::Bottom => &mut self.bottom,
            Side::Left => &mut self.left,
        }
    }

    /// Replace the label at `(side, index)`.
    ///
    /// # Errors
    ///
    /// Returns `LabelIndex` when `index` is not in `0..4`.
    pub fn set(&mut self, side: Side, index: usize, text: impl Into<String>) -> Result<(), ConfigError> {
        let slot = self
            .side_mut(side)
            .get_mut(index)
            .ok_or(ConfigError::LabelIndex { side, index, max: LABELS_PER_SIDE - 1 })?;
        *slot = text.into();
        Ok(())
    }
}

/// Canvas-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CanvasConfig {
    /// `"W:H"` from the background image's original pixel size, unreduced.
    pub aspect_ratio: String,
    /// Rendered width in logical pixels.
    pub width: f64,
    /// Rendered height in logical pixels.
    pub height: f64,
    /// URL or `data:` URI of the background image.
    pub layout_image: Option<String>,
    pub corner_labels: CornerLabels,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: DEFAULT_ASPECT_RATIO.to_owned(),
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            layout_image: None,
            corner_labels: CornerLabels::blank(),
        }
    }
}

/// Sparse config update. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasConfigPatch {
    pub aspect_ratio: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// `Some(None)` clears the background image.
    pub layout_image: Option<Option<String>>,
    pub corner_labels: Option<CornerLabels>,
}

impl CanvasConfigPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Patch that replaces every field, used where wholesale replacement is
    /// wanted through the same merge path.
    #[must_use]
    pub fn replace_all(config: CanvasConfig) -> Self {
        Self {
            aspect_ratio: Some(config.aspect_ratio),
            width: Some(config.width),
            height: Some(config.height),
            layout_image: Some(config.layout_image),
            corner_labels: Some(config.corner_labels),
        }
    }

    /// Shallow-merge into `config`. Returns whether anything changed.
    pub fn apply_to(&self, config: &mut CanvasConfig) -> bool {
        let before = config.clone();
        if let Some(ref aspect) = self.aspect_ratio {
            config.aspect_ratio.clone_from(aspect);
        }
        if let Some(w) = self.width {
            config.width = w;
        }
        if let Some(h) = self.height {
            config.height = h;
        }
        if let Some(ref image) = self.layout_image {
            config.layout_image.clone_from(image);
        }
        if let Some(ref labels) = self.corner_labels {
            config.corner_labels.clone_from(labels);
        }
        *config != before
    }
}

/// Format an aspect ratio from original pixel dimensions, e.g. `1920x1080`
/// becomes `"1920:1080"`. The fraction is not reduced.
#[must_use]
pub fn aspect_ratio_string(width: u32, height: u32) -> String {
    format!("{width}:{height}")
}

/// Parse `"W:H"` into the ratio `W / H`.
///
/// # Errors
///
/// Returns `InvalidAspect` for malformed input or non-positive parts.
pub fn parse_aspect_ratio(aspect: &str) -> Result<f64, ConfigError> {
    let invalid = || ConfigError::InvalidAspect(aspect.to_owned());
    let (w, h) = aspect.split_once(':').ok_or_else(invalid)?;
    let w: f64 = w.trim().parse().map_err(|_| invalid())?;
    let h: f64 = h.trim().parse().map_err(|_| invalid())?;
    if !(w > 0.0 && h > 0.0) || !w.is_finite() || !h.is_finite() {
        return Err(invalid());
    }
    Ok(w / h)
}

/// Height of a canvas `width` pixels wide at `aspect`.
///
/// # Errors
///
/// Returns `InvalidAspect` if `aspect` does not parse.
pub fn height_for_width(width: f64, aspect: &str) -> Result<f64, ConfigError> {
    Ok(width / parse_aspect_ratio(aspect)?)
}

/// Patch applied once a background image's intrinsic size is known.
///
/// Aspect ratio, rendered size, and the final image reference are written
/// together so a reader never observes the new image with the old ratio.
///
/// # Errors
///
/// Returns `InvalidDimensions` if either dimension is zero.
pub fn background_patch(
    reference: impl Into<String>,
    image_width: u32,
    image_height: u32,
    container_width: f64,
) -> Result<CanvasConfigPatch, ConfigError> {
    if image_width == 0 || image_height == 0 {
        return Err(ConfigError::InvalidDimensions { width: image_width, height: image_height });
    }
    let ratio = f64::from(image_width) / f64::from(image_height);
    Ok(CanvasConfigPatch {
        aspect_ratio: Some(aspect_ratio_string(image_width, image_height)),
        width: Some(container_width),
        height: Some(container_width / ratio),
        layout_image: Some(Some(reference.into())),
        corner_labels: None,
    })
}

/// Patch that refits the canvas to a new container width at the current
/// aspect ratio.
///
/// # Errors
///
/// Returns `InvalidAspect` if the stored aspect ratio does not parse.
pub fn fit_to_container(config: &CanvasConfig, container_width: f64) -> Result<CanvasConfigPatch, ConfigError> {
    let height = height_for_width(container_width, &config.aspect_ratio)?;
    Ok(CanvasConfigPatch { width: Some(container_width), height: Some(height), ..Default::default() })
}

/// Patch that writes a single corner label back into the config.
///
/// # Errors
///
/// Returns `LabelIndex` when `index` is out of range.
pub fn label_patch(
    config: &CanvasConfig,
    side: Side,
    index: usize,
    text: impl Into<String>,
) -> Result<CanvasConfigPatch, ConfigError> {
    let mut labels = config.corner_labels.clone();
    labels.set(side, index, text)?;
    Ok(CanvasConfigPatch { corner_labels: Some(labels), ..Default::default() })
}
