//! Document model: floor-plan elements, table presets, and the element store.
//!
//! This module defines what can be placed on a canvas (`Element`,
//! `ElementKind`, `TablePreset`), the table-only attributes that ride along on
//! table elements, and the runtime store that owns all live elements
//! (`ElementStore`).
//!
//! Data flows into this layer from persisted snapshots (JSON deserialization)
//! and from the reducer in [`crate::engine`]. The store is never mutated
//! directly by callers; every change goes through an action.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::geometry::{Point, Rect, Size};

/// Unique identifier for an element.
pub type ElementId = Uuid;

/// The kind of a placed element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// A seating table; carries the table-only attributes.
    Table,
    /// A window on a wall.
    Window,
    /// A door on a wall.
    Door,
    /// A partition line between sections.
    Separator,
}

impl ElementKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Window => "window",
            Self::Door => "door",
            Self::Separator => "separator",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drawing hint for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Square,
    Circle,
    Rectangle,
    Line,
    Arc,
}

/// Occupancy status of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
}

impl TableStatus {
    /// Whether reservation details may be attached in this status.
    #[must_use]
    pub fn holds_reservation(self) -> bool {
        matches!(self, Self::Occupied | Self::Reserved)
    }
}

/// Table subtype. Drives the default size and shape of a new table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TablePreset {
    #[serde(rename = "square-2")]
    Square2,
    #[default]
    #[serde(rename = "square-4")]
    Square4,
    #[serde(rename = "round-2")]
    Round2,
    #[serde(rename = "round-4")]
    Round4,
    #[serde(rename = "round-8")]
    Round8,
    #[serde(rename = "rect-6")]
    Rect6,
    #[serde(rename = "rect-8")]
    Rect8,
}

impl TablePreset {
    pub const ALL: [TablePreset; 7] = [
        TablePreset::Square2,
        TablePreset::Square4,
        TablePreset::Round2,
        TablePreset::Round4,
        TablePreset::Round8,
        TablePreset::Rect6,
        TablePreset::Rect8,
    ];

    /// Wire key, e.g. `"round-4"`.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Square2 => "square-2",
            Self::Square4 => "square-4",
            Self::Round2 => "round-2",
            Self::Round4 => "round-4",
            Self::Round8 => "round-8",
            Self::Rect6 => "rect-6",
            Self::Rect8 => "rect-8",
        }
    }

    #[must_use]
    pub fn shape(self) -> Shape {
        match self {
            Self::Square2 | Self::Square4 => Shape::Square,
            Self::Round2 | Self::Round4 | Self::Round8 => Shape::Circle,
            Self::Rect6 | Self::Rect8 => Shape::Rectangle,
        }
    }

    #[must_use]
    pub fn size(self) -> Size {
        match self {
            Self::Square2 | Self::Round2 => Size::new(40.0, 40.0),
            Self::Square4 | Self::Round4 => Size::new(60.0, 60.0),
            Self::Round8 => Size::new(100.0, 100.0),
            Self::Rect6 => Size::new(90.0, 50.0),
            Self::Rect8 => Size::new(120.0, 60.0),
        }
    }

    #[must_use]
    pub fn seats(self) -> u32 {
        match self {
            Self::Square2 | Self::Round2 => 2,
            Self::Square4 | Self::Round4 => 4,
            Self::Rect6 => 6,
            Self::Round8 | Self::Rect8 => 8,
        }
    }
}

impl fmt::Display for TablePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Returned when a string does not name a known kind, preset, or status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown element kind: {0}")]
    Kind(String),
    #[error("unknown table preset: {0}")]
    Preset(String),
    #[error("unknown table status: {0}")]
    Status(String),
}

impl FromStr for ElementKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "window" => Ok(Self::Window),
            "door" => Ok(Self::Door),
            "separator" => Ok(Self::Separator),
            _ => Err(ParseError::Kind(s.to_owned())),
        }
    }
}

impl FromStr for TablePreset {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TablePreset::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::Preset(s.to_owned()))
    }
}

impl FromStr for TableStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "occupied" => Ok(Self::Occupied),
            "reserved" => Ok(Self::Reserved),
            _ => Err(ParseError::Status(s.to_owned())),
        }
    }
}

/// What to create when the user adds a new element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Table(TablePreset),
    Window,
    Door,
    Separator,
}

impl Template {
    #[must_use]
    pub fn kind(self) -> ElementKind {
        match self {
            Self::Table(_) => ElementKind::Table,
            Self::Window => ElementKind::Window,
            Self::Door => ElementKind::Door,
            Self::Separator => ElementKind::Separator,
        }
    }

    /// Default size for a freshly created element.
    #[must_use]
    pub fn size(self) -> Size {
        match self {
            Self::Table(preset) => preset.size(),
            Self::Window => Size::new(60.0, 8.0),
            Self::Door => Size::new(40.0, 40.0),
            Self::Separator => Size::new(100.0, 8.0),
        }
    }

    #[must_use]
    pub fn shape(self) -> Shape {
        match self {
            Self::Table(preset) => preset.shape(),
            Self::Window | Self::Separator => Shape::Line,
            Self::Door => Shape::Arc,
        }
    }

    /// Default fill colour as a CSS colour string.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Table(_) => "#C8A27A",
            Self::Window => "#7EC8E3",
            Self::Door => "#8B5A2B",
            Self::Separator => "#4A4A4A",
        }
    }
}

/// An element as stored in the canvas and in persisted snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Unique identifier, fixed at creation.
    pub id: ElementId,
    /// What kind of furniture this is.
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Top-left corner in canvas coordinates.
    pub position: Point,
    /// Accumulated rotation in degrees. Not normalized.
    #[serde(default)]
    pub rotation: i32,
    pub width: f64,
    pub height: f64,
    /// Fill colour chosen at creation.
    pub color: String,
    pub shape: Shape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_type: Option<TablePreset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_status: Option<TableStatus>,
    /// Opaque reservation payload; only present while reserved or occupied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_details: Option<serde_json::Value>,
}

impl Element {
    /// Create an element from `template` with a fresh id.
    ///
    /// `table_number` is only used for tables; pass the value from
    /// [`ElementStore::next_table_number`].
    #[must_use]
    pub fn from_template(template: Template, table_number: u32, position: Point) -> Self {
        let size = template.size();
        let mut element = Self {
            id: Uuid::new_v4(),
            kind: template.kind(),
            position,
            rotation: 0,
            width: size.width,
            height: size.height,
            color: template.color().to_owned(),
            shape: template.shape(),
            table_number: None,
            table_label: None,
            table_type: None,
            table_status: None,
            reservation_details: None,
        };
        if let Template::Table(preset) = template {
            element.table_number = Some(table_number);
            element.table_label = Some(format!("T{table_number}"));
            element.table_type = Some(preset);
            element.table_status = Some(TableStatus::Available);
        }
        element
    }

    #[must_use]
    pub fn is_table(&self) -> bool {
        self.kind == ElementKind::Table
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.width, self.height)
    }

    /// Copy position and size from `rect`.
    pub fn set_rect(&mut self, rect: Rect) {
        self.position = rect.position();
        self.width = rect.width;
        self.height = rect.height;
    }

    /// Change table status. Reservation details are kept only for reserved or
    /// occupied tables and dropped otherwise. Returns `false` for non-tables.
    pub fn set_table_status(&mut self, status: TableStatus, details: Option<serde_json::Value>) -> bool {
        if !self.is_table() {
            return false;
        }
        self.table_status = Some(status);
        self.reservation_details = if status.holds_reservation() { details } else { None };
        true
    }

    /// Change the free-text table label. Returns `false` for non-tables.
    pub fn set_table_label(&mut self, label: impl Into<String>) -> bool {
        if !self.is_table() {
            return false;
        }
        self.table_label = Some(label.into());
        true
    }
}

/// In-memory store of elements, unique by id, in insertion order.
///
/// Serializes as a plain JSON array. Duplicate ids in incoming data keep the
/// first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Element>", into = "Vec<Element>")]
pub struct ElementStore {
    elements: Vec<Element>,
}

impl ElementStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { elements: Vec::new() }
    }

    /// Add an element. A duplicate id is rejected and logged, never
    /// overwritten. Returns whether the element was inserted.
    pub fn add(&mut self, element: Element) -> bool {
        if self.contains(&element.id) {
            warn!(id = %element.id, "duplicate element id; add ignored");
            return false;
        }
        self.elements.push(element);
        true
    }

    /// Replace the element with the same id. Absent ids are ignored.
    pub fn update(&mut self, element: Element) -> bool {
        let Some(slot) = self.elements.iter_mut().find(|e| e.id == element.id) else {
            warn!(id = %element.id, "update for unknown element ignored");
            return false;
        };
        *slot = element;
        true
    }

    /// Remove an element by id, returning it if it was present.
    pub fn remove(&mut self, id: &ElementId) -> Option<Element> {
        let Some(index) = self.elements.iter().position(|e| &e.id == id) else {
            warn!(%id, "remove for unknown element ignored");
            return None;
        };
        Some(self.elements.remove(index))
    }

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| &e.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.elements.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Element] {
        &self.elements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of table elements currently placed.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.elements.iter().filter(|e| e.is_table()).count()
    }

    /// Number for the next table: current table count plus one.
    ///
    /// This follows the count, not the highest existing number, so removing a
    /// table and adding another can reuse a number.
    #[must_use]
    pub fn next_table_number(&self) -> u32 {
        u32::try_from(self.table_count())
            .unwrap_or(u32::MAX)
            .saturating_add(1)
    }
}

impl From<Vec<Element>> for ElementStore {
    fn from(elements: Vec<Element>) -> Self {
        let mut store = Self::new();
        for element in elements {
            store.add(element);
        }
        store
    }
}

impl From<ElementStore> for Vec<Element> {
    fn from(store: ElementStore) -> Self {
        store.elements
    }
}
