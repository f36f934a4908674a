//! Store that reads and writes the active area of an outlet's registry.
//!
//! The registry file for the key's tenant and outlet holds every area; this
//! store exposes only the active one as a `CanvasStore`, so a session opened
//! on it edits whichever area `switch_active` last selected. A missing
//! registry loads as `None` and is created with a single "Main" area on the
//! first save.

#[cfg(test)]
#[path = "areas_test.rs"]
mod areas_test;

use canvas::engine::CanvasState;
use canvas::registry::AreaRegistry;
use tracing::debug;

use super::{CanvasStore, LocalStore, SaveMode, ScopeKey, StoreError};

/// Name given to the first area of a new registry.
pub const DEFAULT_AREA_NAME: &str = "Main";

#[derive(Debug, Clone)]
pub struct AreaStore {
    local: LocalStore,
}

impl AreaStore {
    #[must_use]
    pub fn new(local: LocalStore) -> Self {
        Self { local }
    }

    #[must_use]
    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    /// The outlet's registry, or a fresh one with a single default area.
    ///
    /// # Errors
    ///
    /// Returns `Io` or `Serde` on unreadable or corrupt registry files.
    pub async fn registry(&self, key: &ScopeKey) -> Result<AreaRegistry, StoreError> {
        Ok(self
            .local
            .load_registry(key)
            .await?
            .unwrap_or_else(|| AreaRegistry::new(DEFAULT_AREA_NAME)))
    }
}

#[async_trait::async_trait]
impl CanvasStore for AreaStore {
    async fn load(&self, key: &ScopeKey) -> Result<Option<CanvasState>, StoreError> {
        let registry = self.local.load_registry(key).await?;
        Ok(registry.map(|r| r.active().state.clone()))
    }

    async fn save(&self, key: &ScopeKey, state: &CanvasState) -> Result<(), StoreError> {
        let mut registry = self.registry(key).await?;
        let active = registry.active_id();
        registry.replace_state(active, state.clone())?;
        self.local.save_registry(key, &registry).await?;
        debug!(%key, area = %active, elements = state.elements().len(), "area snapshot written");
        Ok(())
    }

    fn save_mode(&self) -> SaveMode {
        SaveMode::EveryMutation
    }
}
