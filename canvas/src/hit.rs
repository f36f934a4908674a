#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::HANDLE_RADIUS_PX;
use crate::doc::{ElementId, ElementStore};
use crate::geometry::{Point, ResizeHandle, visual_bounds};

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeHandle),
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
}

/// Test which element (if any) is under `pt`, checking the selected element's
/// handles first.
///
/// Handles are only offered for unrotated elements (rotation a multiple of
/// 360), since the stored width/height axes no longer line up with the drawn
/// box otherwise. Bodies are tested against their drawn bounds, topmost
/// (most recently added) first.
#[must_use]
pub fn hit_test(pt: Point, store: &ElementStore, selected: Option<ElementId>) -> Option<Hit> {
    if let Some(element) = selected.and_then(|id| store.get(&id)) {
        if element.rotation.rem_euclid(360) == 0 {
            let rect = element.rect();
            let handle = ResizeHandle::ALL.into_iter().find(|h| {
                let anchor = h.anchor(&rect);
                (pt.x - anchor.x).abs() <= HANDLE_RADIUS_PX && (pt.y - anchor.y).abs() <= HANDLE_RADIUS_PX
            });
            if let Some(handle) = handle {
                return Some(Hit { element_id: element.id, part: HitPart::ResizeHandle(handle) });
            }
        }
    }

    store
        .iter()
        .rev()
        .find(|e| visual_bounds(e.rect(), e.rotation).contains(pt))
        .map(|e| Hit { element_id: e.id, part: HitPart::Body })
}
