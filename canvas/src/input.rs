//! Input model: the gesture tracked between pointer-down and pointer-up.
//!
//! A gesture holds exclusive mutation rights over its target element for its
//! whole lifetime. Each active variant carries the snapshot taken at
//! pointer-down, so every pointer-move frame is computed from the start state
//! plus the accumulated delta rather than from the previous frame.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::doc::ElementId;
use crate::geometry::{Point, Rect, ResizeHandle};

/// The active pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is moving an element across the canvas.
    Dragging {
        /// Id of the element being dragged.
        id: ElementId,
        /// Pointer position at pointer-down.
        start: Point,
        /// Element top-left at pointer-down.
        origin: Point,
    },
    /// The user is resizing an element by one of its eight handles.
    Resizing {
        /// Id of the element being resized.
        id: ElementId,
        /// Which handle is being dragged.
        handle: ResizeHandle,
        /// Pointer position at pointer-down.
        start: Point,
        /// Element bounds at pointer-down.
        origin: Rect,
    },
}

impl Gesture {
    /// The element this gesture is acting on, if any.
    #[must_use]
    pub fn target(&self) -> Option<ElementId> {
        match self {
            Self::Idle => None,
            Self::Dragging { id, .. } | Self::Resizing { id, .. } => Some(*id),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
