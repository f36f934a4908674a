//! Persistence contract shared by the local and remote backends.
//!
//! DESIGN
//! ======
//! One trait, two implementations. Both carry the full `CanvasState`
//! snapshot; they differ only in *when* a session should write. The local
//! store is cheap and is written on every change, the remote store is written
//! on an explicit save. Sessions ask [`CanvasStore::save_mode`] rather than
//! matching on the backend.
//!
//! ERROR HANDLING
//! ==============
//! Stores return [`StoreError`] and never touch the session's state. Callers
//! decide whether a failed load degrades to an empty canvas.

pub mod areas;
pub mod local;
pub mod remote;


use std::fmt;
use std::sync::Arc;

use canvas::engine::CanvasState;
use canvas::registry::RegistryError;

pub use areas::AreaStore;
pub use local::LocalStore;
pub use remote::RemoteStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encode/decode failed: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("remote returned status {status}")]
    Status { status: u16, body: String },
    #[error("a save for {0} is already in flight")]
    SaveInFlight(ScopeKey),
    #[error("scope {0} has no zone; remote layouts are addressed by zone")]
    MissingZone(ScopeKey),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("invalid remote base URL: {0}")]
    InvalidBaseUrl(String),
}

/// When a session should write its snapshot back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// After every state-changing action.
    EveryMutation,
    /// Only when [`crate::session::CanvasSession::save`] is called.
    Explicit,
}

/// Addresses one canvas: tenant, outlet, and (for remote layouts) zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeKey {
    pub tenant: String,
    pub outlet: String,
    pub zone: Option<String>,
}

impl ScopeKey {
    #[must_use]
    pub fn new(tenant: impl Into<String>, outlet: impl Into<String>) -> Self {
        Self { tenant: tenant.into(), outlet: outlet.into(), zone: None }
    }

    #[must_use]
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    /// Filesystem-safe name, e.g. `acme+downtown+terrace`.
    ///
    /// Each part is percent-encoded, which always escapes `+`, so distinct
    /// keys never share a stem.
    #[must_use]
    pub fn file_stem(&self) -> String {
        let mut parts = vec![urlencoding::encode(&self.tenant), urlencoding::encode(&self.outlet)];
        if let Some(zone) = &self.zone {
            parts.push(urlencoding::encode(zone));
        }
        parts.join(STEM_SEPARATOR)
    }

    /// Zone id, required by the remote API.
    ///
    /// # Errors
    ///
    /// Returns `MissingZone` when the key has no zone.
    pub fn require_zone(&self) -> Result<&str, StoreError> {
        self.zone
            .as_deref()
            .ok_or_else(|| StoreError::MissingZone(self.clone()))
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tenant, self.outlet)?;
        if let Some(zone) = &self.zone {
            write!(f, "/{zone}")?;
        }
        Ok(())
    }
}

const STEM_SEPARATOR: &str = "+";

/// Load/save a canvas snapshot by scope key.
#[async_trait::async_trait]
pub trait CanvasStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved for `key` yet.
    async fn load(&self, key: &ScopeKey) -> Result<Option<CanvasState>, StoreError>;

    async fn save(&self, key: &ScopeKey, state: &CanvasState) -> Result<(), StoreError>;

    fn save_mode(&self) -> SaveMode;
}

#[async_trait::async_trait]
impl<T: CanvasStore + ?Sized> CanvasStore for Arc<T> {
    async fn load(&self, key: &ScopeKey) -> Result<Option<CanvasState>, StoreError> {
        (**self).load(key).await
    }

    async fn save(&self, key: &ScopeKey, state: &CanvasState) -> Result<(), StoreError> {
        (**self).save(key, state).await
    }

    fn save_mode(&self) -> SaveMode {
        (**self).save_mode()
    }
}
