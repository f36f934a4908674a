//! Scoped state container: one canvas, its store, and its save status.
//!
//! DESIGN
//! ======
//! A `CanvasSession` lives exactly as long as the canvas it edits and is
//! passed around explicitly. It owns an [`Editor`] (state plus gesture) and a
//! store. Every edit goes through [`CanvasSession::dispatch`] or
//! [`CanvasSession::edit`], which apply the actions and then, for stores in
//! `EveryMutation` mode, write the full snapshot back.
//!
//! Hydration is ordered by `await`: the load completes and is applied before
//! the baseline snapshot is taken, so the baseline always reflects the
//! persisted elements.
//!
//! ERROR HANDLING
//! ==============
//! A failed or corrupt load degrades to the default canvas with a warning.
//! Save failures are published through the status channel and returned; the
//! in-memory state is never rolled back.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use canvas::engine::{Action, CanvasState, Editor};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::store::{CanvasStore, SaveMode, ScopeKey, StoreError};

/// Progress of the most recent save.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Pending,
    Saved,
    Failed(String),
}

/// What to do with the reset baseline once hydration finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Baseline {
    /// Snapshot the hydrated elements as the new baseline.
    #[default]
    Capture,
    /// Keep the baseline stored in the loaded snapshot.
    KeepStored,
}

pub struct CanvasSession<S> {
    store: S,
    key: ScopeKey,
    editor: Editor,
    hydrated: bool,
    pending_background: Option<String>,
    status: watch::Sender<SaveStatus>,
}

impl<S: CanvasStore> CanvasSession<S> {
    /// Unhydrated session holding the default canvas for `key`.
    #[must_use]
    pub fn new(store: S, key: ScopeKey) -> Self {
        let state = match &key.zone {
            Some(zone) => CanvasState::with_scope(zone.clone()),
            None => CanvasState::new(),
        };
        let (status, _) = watch::channel(SaveStatus::Idle);
        Self { store, key, editor: Editor::new(state), hydrated: false, pending_background: None, status }
    }

    /// Create a session, load its snapshot, and capture the baseline.
    pub async fn open(store: S, key: ScopeKey) -> Self {
        Self::open_with(store, key, Baseline::Capture).await
    }

    pub async fn open_with(store: S, key: ScopeKey, baseline: Baseline) -> Self {
        let mut session = Self::new(store, key);
        session.hydrate(baseline).await;
        session
    }

    /// Load the persisted snapshot into this session. Hydration does not
    /// trigger an autosave.
    pub async fn hydrate(&mut self, baseline: Baseline) {
        match self.store.load(&self.key).await {
            Ok(Some(mut state)) => {
                if let Some(zone) = &self.key.zone {
                    state.ensure_scope(zone.as_str());
                }
                info!(key = %self.key, elements = state.elements().len(), "canvas hydrated");
                self.editor.apply(Action::LoadState(Box::new(state)));
            }
            Ok(None) => debug!(key = %self.key, "no saved canvas; starting empty"),
            Err(e) => warn!(key = %self.key, error = %e, "canvas load failed; starting empty"),
        }
        if baseline == Baseline::Capture {
            self.editor.capture_baseline();
        }
        self.hydrated = true;
    }

    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    #[must_use]
    pub fn key(&self) -> &ScopeKey {
        &self.key
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn state(&self) -> &CanvasState {
        self.editor.state()
    }

    #[must_use]
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    #[must_use]
    pub fn into_state(self) -> CanvasState {
        self.editor.into_state()
    }

    /// Apply one action, autosaving if it changed the state.
    pub async fn dispatch(&mut self, action: Action) -> Vec<Action> {
        self.edit(|editor| editor.apply(action)).await
    }

    /// Run an editor operation, autosaving if it produced any actions.
    ///
    /// ```ignore
    /// session.edit(|e| e.rotate(&id, Rotation::Clockwise)).await;
    /// ```
    pub async fn edit<F>(&mut self, op: F) -> Vec<Action>
    where
        F: FnOnce(&mut Editor) -> Vec<Action>,
    {
        let applied = op(&mut self.editor);
        if !applied.is_empty() && self.store.save_mode() == SaveMode::EveryMutation {
            // Failure is already logged and published on the status channel.
            if let Err(e) = self.save().await {
                debug!(key = %self.key, error = %e, "autosave failed");
            }
        }
        applied
    }

    /// Snapshot the current elements as the reset baseline.
    pub async fn capture_baseline(&mut self) -> Vec<Action> {
        self.edit(Editor::capture_baseline).await
    }

    /// Reinitialize the canvas, keeping its size and scope.
    pub async fn clear(&mut self) -> Vec<Action> {
        self.dispatch(Action::ClearCanvas).await
    }

    /// Write the current snapshot to the store.
    ///
    /// # Errors
    ///
    /// Returns the store's error. A rejected concurrent save (`SaveInFlight`)
    /// leaves the status at `Pending` for the save already running.
    pub async fn save(&self) -> Result<(), StoreError> {
        self.status.send_replace(SaveStatus::Pending);
        match self.store.save(&self.key, self.editor.state()).await {
            Ok(()) => {
                self.status.send_replace(SaveStatus::Saved);
                Ok(())
            }
            Err(e @ StoreError::SaveInFlight(_)) => {
                debug!(key = %self.key, "save already in flight");
                Err(e)
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "canvas save failed");
                self.status.send_replace(SaveStatus::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    #[must_use]
    pub fn save_status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<SaveStatus> {
        self.status.subscribe()
    }

    /// Reference of a background image still being measured, if any.
    #[must_use]
    pub fn pending_background(&self) -> Option<&str> {
        self.pending_background.as_deref()
    }

    pub(crate) fn set_pending_background(&mut self, reference: Option<String>) {
        self.pending_background = reference;
    }
}
