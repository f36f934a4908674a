//! File-backed store: one JSON snapshot per scope key.
//!
//! Writes go to a uniquely named sibling file first and are then renamed over
//! the target, so a reader sees either the previous snapshot or the new one,
//! never a torn write.

#[cfg(test)]
#[path = "local_test.rs"]
mod local_test;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use canvas::engine::CanvasState;
use canvas::registry::AreaRegistry;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use super::{CanvasStore, SaveMode, ScopeKey, StoreError};

const AREAS_DIR: &str = "areas";

#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshot file for `key`.
    #[must_use]
    pub fn path_for(&self, key: &ScopeKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.file_stem()))
    }

    fn registry_path(&self, key: &ScopeKey) -> PathBuf {
        let outlet_key = ScopeKey::new(key.tenant.clone(), key.outlet.clone());
        self.dir
            .join(AREAS_DIR)
            .join(format!("{}.json", outlet_key.file_stem()))
    }

    /// Load the area registry for the key's tenant and outlet. The zone is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `Io` or `Serde` on unreadable or corrupt files.
    pub async fn load_registry(&self, key: &ScopeKey) -> Result<Option<AreaRegistry>, StoreError> {
        read_json(&self.registry_path(key)).await
    }

    /// # Errors
    ///
    /// Returns `Io` or `Serde` if the registry cannot be written.
    pub async fn save_registry(&self, key: &ScopeKey, registry: &AreaRegistry) -> Result<(), StoreError> {
        write_json(&self.registry_path(key), registry).await
    }
}

#[async_trait::async_trait]
impl CanvasStore for LocalStore {
    async fn load(&self, key: &ScopeKey) -> Result<Option<CanvasState>, StoreError> {
        read_json(&self.path_for(key)).await
    }

    async fn save(&self, key: &ScopeKey, state: &CanvasState) -> Result<(), StoreError> {
        write_json(&self.path_for(key), state).await?;
        debug!(%key, elements = state.elements().len(), "local snapshot written");
        Ok(())
    }

    fn save_mode(&self) -> SaveMode {
        SaveMode::EveryMutation
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
    if let Err(e) = tokio::fs::write(&tmp, &bytes).await {
        remove_quietly(&tmp).await;
        return Err(e.into());
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        remove_quietly(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        debug!(path = %path.display(), error = %e, "temp file cleanup failed");
    }
}
