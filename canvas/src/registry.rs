//! Area registry: a named collection of independent canvases.
//!
//! An operator may keep several layout variants for one outlet (indoor,
//! terrace, private room). Each area wraps its own [`CanvasState`]; the
//! registry only tracks which one is active and guarantees there is always at
//! least one.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::engine::{Action, CanvasState};

/// Unique identifier for an area.
pub type AreaId = Uuid;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("area not found: {0}")]
    NotFound(AreaId),
    #[error("cannot remove the last remaining area: {0}")]
    LastArea(AreaId),
    #[error("registry has no areas")]
    Empty,
}

/// One named canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    pub state: CanvasState,
}

#[derive(Deserialize)]
struct RawRegistry {
    areas: Vec<Area>,
    active: AreaId,
}

/// The set of areas plus the active one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRegistry")]
pub struct AreaRegistry {
    areas: Vec<Area>,
    active: AreaId,
}

impl TryFrom<RawRegistry> for AreaRegistry {
    type Error = RegistryError;

    fn try_from(raw: RawRegistry) -> Result<Self, Self::Error> {
        let Some(first) = raw.areas.first() else {
            return Err(RegistryError::Empty);
        };
        // Fall back to the first area rather than rejecting the whole file.
        let active = if raw.areas.iter().any(|a| a.id == raw.active) { raw.active } else { first.id };
        Ok(Self { areas: raw.areas, active })
    }
}

impl AreaRegistry {
    /// Registry with a single empty area named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_state(name, CanvasState::new())
    }

    /// Registry with a single area wrapping `state`.
    #[must_use]
    pub fn with_state(name: impl Into<String>, state: CanvasState) -> Self {
        let area = Area { id: Uuid::new_v4(), name: name.into(), state };
        let active = area.id;
        Self { areas: vec![area], active }
    }

    /// Add an area whose config is cloned from the active one. Elements,
    /// selection, and baseline start empty.
    pub fn create(&mut self, name: impl Into<String>) -> AreaId {
        let config = self.active().state.canvas_config().clone();
        let area = Area { id: Uuid::new_v4(), name: name.into(), state: CanvasState::with_config(config) };
        let id = area.id;
        info!(%id, name = %area.name, "area created");
        self.areas.push(area);
        id
    }

    /// Make `id` the active area.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no area has that id.
    pub fn switch_active(&mut self, id: AreaId) -> Result<(), RegistryError> {
        if !self.areas.iter().any(|a| a.id == id) {
            return Err(RegistryError::NotFound(id));
        }
        self.active = id;
        Ok(())
    }

    /// Remove an area. Removing the active area activates the first one left.
    ///
    /// # Errors
    ///
    /// Returns `LastArea` when `id` is the only area, `NotFound` if unknown.
    pub fn remove(&mut self, id: AreaId) -> Result<Area, RegistryError> {
        let index = self
            .areas
            .iter()
            .position(|a| a.id == id)
            .ok_or(RegistryError::NotFound(id))?;
        if self.areas.len() == 1 {
            return Err(RegistryError::LastArea(id));
        }
        let removed = self.areas.remove(index);
        if self.active == id {
            if let Some(first) = self.areas.first() {
                self.active = first.id;
            }
        }
        info!(%id, name = %removed.name, "area removed");
        Ok(removed)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no area has that id.
    pub fn rename(&mut self, id: AreaId, name: impl Into<String>) -> Result<(), RegistryError> {
        let area = self
            .areas
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(RegistryError::NotFound(id))?;
        area.name = name.into();
        Ok(())
    }

    #[must_use]
    pub fn active_id(&self) -> AreaId {
        self.active
    }

    /// The active area. The registry is never empty, so this always exists.
    #[must_use]
    pub fn active(&self) -> &Area {
        let index = self.active_index();
        &self.areas[index]
    }

    #[must_use]
    pub fn active_mut(&mut self) -> &mut Area {
        let index = self.active_index();
        &mut self.areas[index]
    }

    fn active_index(&self) -> usize {
        self.areas
            .iter()
            .position(|a| a.id == self.active)
            .unwrap_or(0)
    }

    #[must_use]
    pub fn get(&self, id: AreaId) -> Option<&Area> {
        self.areas.iter().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Area> {
        self.areas.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Never true for a registry built through this API.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Apply an action to the active area's canvas.
    pub fn dispatch(&mut self, action: Action) -> bool {
        self.active_mut().state.apply(action)
    }

    /// Replace the state of area `id`, e.g. after loading it from storage.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no area has that id.
    pub fn replace_state(&mut self, id: AreaId, state: CanvasState) -> Result<(), RegistryError> {
        let area = self
            .areas
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(RegistryError::NotFound(id))?;
        area.state = state;
        Ok(())
    }
}
