//! State-transition engine: the action set, the canvas state, and the reducer.
//!
//! `reduce(state, action)` is a pure, deterministic function. It touches at
//! most one element per action, never reads the clock, and never draws random
//! numbers; callers that need a random placement compute it first (see
//! [`Editor::place`]) and submit the finished element.
//!
//! [`Editor`] wraps a `CanvasState` with the pointer-gesture machine. Every
//! input handler applies its actions locally and returns them so the host can
//! persist them.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{CanvasConfig, CanvasConfigPatch, ConfigError, CornerLabels, Side, label_patch};
use crate::doc::{Element, ElementId, ElementStore, TableStatus, Template};
use crate::geometry::{self, Point, ResizeHandle, Rotation, Scale, Size};
use crate::hit::{HitPart, hit_test};
use crate::input::Gesture;

// =============================================================================
// STATE
// =============================================================================

/// One editable canvas.
///
/// Fields are private so the invariants (unique ids, selection always names a
/// live element) can only be changed through [`CanvasState::apply`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CanvasState {
    /// Remote scope id (zone). Absent for locally persisted canvases.
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    elements: ElementStore,
    canvas_config: CanvasConfig,
    selected_element: Option<ElementId>,
    initial_elements: Vec<Element>,
}

impl CanvasState {
    /// Empty canvas with default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty canvas addressed by a remote scope id.
    #[must_use]
    pub fn with_scope(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()), ..Self::default() }
    }

    /// Empty canvas using `config`.
    #[must_use]
    pub fn with_config(config: CanvasConfig) -> Self {
        Self { canvas_config: config, ..Self::default() }
    }

    #[must_use]
    pub fn scope_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Set the scope id if none is present. Returns whether it was set.
    ///
    /// Snapshots fetched by zone carry no id of their own; the zone they were
    /// fetched from fills it in.
    pub fn ensure_scope(&mut self, id: impl Into<String>) -> bool {
        if self.id.is_some() {
            return false;
        }
        self.id = Some(id.into());
        true
    }

    #[must_use]
    pub fn elements(&self) -> &ElementStore {
        &self.elements
    }

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    #[must_use]
    pub fn canvas_config(&self) -> &CanvasConfig {
        &self.canvas_config
    }

    #[must_use]
    pub fn selected_element(&self) -> Option<ElementId> {
        self.selected_element
    }

    #[must_use]
    pub fn initial_elements(&self) -> &[Element] {
        &self.initial_elements
    }

    /// Stored canvas size from the config.
    #[must_use]
    pub fn canvas_size(&self) -> Size {
        Size::new(self.canvas_config.width, self.canvas_config.height)
    }

    /// Apply one action in place. Returns whether the state changed.
    pub fn apply(&mut self, action: Action) -> bool {
        debug!(action = action.name(), "apply");
        match action {
            Action::AddElement(element) => self.elements.add(element),
            Action::UpdateElement(element) => {
                if self.elements.get(&element.id) == Some(&element) {
                    return false;
                }
                self.elements.update(element)
            }
            Action::RemoveElement(id) => {
                let removed = self.elements.remove(&id).is_some();
                if removed && self.selected_element == Some(id) {
                    self.selected_element = None;
                }
                removed
            }
            Action::SetCanvasConfig(patch) => patch.apply_to(&mut self.canvas_config),
            Action::SetSelectedElement(selection) => self.select(selection),
            Action::ResetCanvas => self.reset(),
            Action::ClearCanvas => self.clear(),
            Action::SetInitialElements(elements) => {
                let baseline: Vec<Element> = ElementStore::from(elements).into();
                if self.initial_elements == baseline {
                    return false;
                }
                self.initial_elements = baseline;
                true
            }
            Action::LoadState(state) => {
                let mut incoming = *state;
                incoming.sanitize_selection();
                if *self == incoming {
                    return false;
                }
                *self = incoming;
                true
            }
        }
    }

    fn select(&mut self, selection: Option<ElementId>) -> bool {
        if let Some(id) = selection {
            if !self.elements.contains(&id) {
                warn!(%id, "select for unknown element ignored");
                return false;
            }
        }
        if self.selected_element == selection {
            return false;
        }
        self.selected_element = selection;
        true
    }

    fn reset(&mut self) -> bool {
        let before = self.clone();
        self.elements = ElementStore::from(self.initial_elements.clone());
        self.selected_element = None;
        self.canvas_config.layout_image = None;
        self.canvas_config.corner_labels = CornerLabels::blank();
        *self != before
    }

    fn clear(&mut self) -> bool {
        let cleared = Self {
            id: self.id.clone(),
            canvas_config: CanvasConfig {
                width: self.canvas_config.width,
                height: self.canvas_config.height,
                ..CanvasConfig::default()
            },
            ..Self::default()
        };
        if *self == cleared {
            return false;
        }
        *self = cleared;
        true
    }

    fn sanitize_selection(&mut self) {
        if let Some(id) = self.selected_element {
            if !self.elements.contains(&id) {
                warn!(%id, "loaded selection names a missing element; cleared");
                self.selected_element = None;
            }
        }
    }
}

// =============================================================================
// ACTIONS
// =============================================================================

/// Every state transition the engine understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Insert a new element. Duplicate ids are ignored.
    AddElement(Element),
    /// Replace the element with the same id. Unknown ids are ignored.
    UpdateElement(Element),
    /// Remove an element, clearing the selection if it was selected.
    RemoveElement(ElementId),
    /// Shallow-merge the patch into the canvas config.
    SetCanvasConfig(CanvasConfigPatch),
    /// Select an element, or clear the selection with `None`.
    SetSelectedElement(Option<ElementId>),
    /// Restore the baseline elements, clear selection, background, and labels.
    ResetCanvas,
    /// Reinitialize to defaults, keeping pixel size and scope id.
    ClearCanvas,
    /// Replace the baseline snapshot.
    SetInitialElements(Vec<Element>),
    /// Replace the entire state; used for hydration.
    LoadState(Box<CanvasState>),
}

impl Action {
    /// Stable name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddElement(_) => "ADD_ELEMENT",
            Self::UpdateElement(_) => "UPDATE_ELEMENT",
            Self::RemoveElement(_) => "REMOVE_ELEMENT",
            Self::SetCanvasConfig(_) => "SET_CANVAS_CONFIG",
            Self::SetSelectedElement(_) => "SET_SELECTED_ELEMENT",
            Self::ResetCanvas => "RESET_CANVAS",
            Self::ClearCanvas => "CLEAR_CANVAS",
            Self::SetInitialElements(_) => "SET_INITIAL_ELEMENTS",
            Self::LoadState(_) => "LOAD_STATE",
        }
    }
}

/// Pure reducer: `(state, action) -> state'`.
#[must_use]
pub fn reduce(state: CanvasState, action: Action) -> CanvasState {
    let mut next = state;
    next.apply(action);
    next
}

// =============================================================================
// EDITOR
// =============================================================================

/// A canvas plus the pointer gesture currently acting on it.
///
/// Every method applies the actions it produces before returning them, so the
/// returned list is what the host should persist. An empty list means nothing
/// changed.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    state: CanvasState,
    gesture: Gesture,
}

impl Editor {
    #[must_use]
    pub fn new(state: CanvasState) -> Self {
        Self { state, gesture: Gesture::Idle }
    }

    #[must_use]
    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    #[must_use]
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Consume the editor, returning its canvas.
    #[must_use]
    pub fn into_state(self) -> CanvasState {
        self.state
    }

    /// Apply one action. Returns it in a single-element list if it changed
    /// the state.
    pub fn apply(&mut self, action: Action) -> Vec<Action> {
        if self.state.apply(action.clone()) { vec![action] } else { Vec::new() }
    }

    // --- Element creation ---

    /// Create an element from `template` at a random position inside the
    /// stored canvas size, and add it.
    pub fn place<R: Rng + ?Sized>(&mut self, template: Template, rng: &mut R) -> (ElementId, Vec<Action>) {
        let position = geometry::random_position(rng, self.state.canvas_size(), template.size());
        let number = self.state.elements.next_table_number();
        let element = Element::from_template(template, number, position);
        let id = element.id;
        (id, self.apply(Action::AddElement(element)))
    }

    // --- Geometry on a fresh copy ---

    /// Run `edit` on a copy of the element and submit it as an update.
    fn edit_element(&mut self, id: &ElementId, edit: impl FnOnce(&mut Element)) -> Vec<Action> {
        let Some(mut element) = self.state.element(id).cloned() else {
            warn!(%id, "edit for unknown element ignored");
            return Vec::new();
        };
        edit(&mut element);
        self.apply(Action::UpdateElement(element))
    }

    pub fn rotate(&mut self, id: &ElementId, direction: Rotation) -> Vec<Action> {
        self.edit_element(id, |e| e.rotation = geometry::rotate(e.rotation, direction))
    }

    pub fn scale(&mut self, id: &ElementId, direction: Scale) -> Vec<Action> {
        self.edit_element(id, |e| {
            let size = geometry::scale(e.size(), direction);
            e.width = size.width;
            e.height = size.height;
        })
    }

    /// Move by `offset`, clamped into `container`.
    pub fn move_by(&mut self, id: &ElementId, offset: Point, container: Size) -> Vec<Action> {
        self.edit_element(id, |e| e.position = geometry::drag(e.position, offset, e.size(), container))
    }

    pub fn resize(&mut self, id: &ElementId, handle: ResizeHandle, delta: Point) -> Vec<Action> {
        self.edit_element(id, |e| e.set_rect(geometry::resize(e.rect(), handle, delta)))
    }

    pub fn set_table_status(
        &mut self,
        id: &ElementId,
        status: TableStatus,
        details: Option<serde_json::Value>,
    ) -> Vec<Action> {
        self.edit_element(id, |e| {
            if !e.set_table_status(status, details) {
                warn!(id = %e.id, kind = %e.kind, "table status on non-table ignored");
            }
        })
    }

    pub fn set_table_label(&mut self, id: &ElementId, label: &str) -> Vec<Action> {
        self.edit_element(id, |e| {
            if !e.set_table_label(label) {
                warn!(id = %e.id, kind = %e.kind, "table label on non-table ignored");
            }
        })
    }

    pub fn remove(&mut self, id: &ElementId) -> Vec<Action> {
        self.apply(Action::RemoveElement(*id))
    }

    pub fn select(&mut self, id: Option<ElementId>) -> Vec<Action> {
        self.apply(Action::SetSelectedElement(id))
    }

    /// Edit one corner label in place.
    ///
    /// # Errors
    ///
    /// Returns `LabelIndex` when `index` is out of range.
    pub fn set_corner_label(&mut self, side: Side, index: usize, text: &str) -> Result<Vec<Action>, ConfigError> {
        let patch = label_patch(&self.state.canvas_config, side, index, text)?;
        Ok(self.apply(Action::SetCanvasConfig(patch)))
    }

    /// Snapshot the current elements as the reset baseline.
    pub fn capture_baseline(&mut self) -> Vec<Action> {
        let elements = self.state.elements.as_slice().to_vec();
        self.apply(Action::SetInitialElements(elements))
    }

    // --- Pointer input ---

    /// Start a gesture at `pt`: select what is under the pointer and begin a
    /// drag (body) or resize (handle). Empty space clears the selection.
    pub fn pointer_down(&mut self, pt: Point) -> Vec<Action> {
        let Some(hit) = hit_test(pt, &self.state.elements, self.state.selected_element) else {
            self.gesture = Gesture::Idle;
            return self.select(None);
        };
        let Some(element) = self.state.element(&hit.element_id) else {
            return Vec::new();
        };
        self.gesture = match hit.part {
            HitPart::Body => Gesture::Dragging { id: element.id, start: pt, origin: element.position },
            HitPart::ResizeHandle(handle) => {
                Gesture::Resizing { id: element.id, handle, start: pt, origin: element.rect() }
            }
        };
        self.select(Some(hit.element_id))
    }

    /// Continue the active gesture. Each frame commits an update computed
    /// from the gesture's start snapshot plus the accumulated pointer delta.
    ///
    /// `container` is the measured size of the rendered canvas.
    pub fn pointer_move(&mut self, pt: Point, container: Size) -> Vec<Action> {
        match self.gesture {
            Gesture::Idle => Vec::new(),
            Gesture::Dragging { id, start, origin } => {
                let offset = pt.delta_from(start);
                let alive = self.state.elements.contains(&id);
                if !alive {
                    self.gesture = Gesture::Idle;
                }
                self.edit_element(&id, |e| e.position = geometry::drag(origin, offset, e.size(), container))
            }
            Gesture::Resizing { id, handle, start, origin } => {
                let delta = pt.delta_from(start);
                let alive = self.state.elements.contains(&id);
                if !alive {
                    self.gesture = Gesture::Idle;
                }
                self.edit_element(&id, |e| e.set_rect(geometry::resize(origin, handle, delta)))
            }
        }
    }

    /// End the active gesture. The last committed frame stands; there is no
    /// cancel.
    pub fn pointer_up(&mut self) {
        self.gesture = Gesture::Idle;
    }
}
