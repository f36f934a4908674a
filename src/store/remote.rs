//! HTTP-backed store for zone layouts.
//!
//! DESIGN
//! ======
//! - `GET  {base}/zones/{zone}/layout` loads a snapshot; 404 means none yet.
//! - `POST {base}/zones/{zone}/layout` saves
//!   `{id, elements, canvasConfig, selectedElement, initialElements}`.
//!
//! Loads are cached per key for `cache_ttl`; a successful save drops the
//! key's entry so the next load refetches. At most one save per key is in
//! flight; a second concurrent save is rejected with `SaveInFlight` instead of
//! racing the first.

#[cfg(test)]
#[path = "remote_test.rs"]
mod remote_test;

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use canvas::config::CanvasConfig;
use canvas::doc::{Element, ElementId, ElementStore};
use canvas::engine::CanvasState;
use reqwest::{StatusCode, Url};
use serde::Serialize;
use tracing::{debug, info};

use super::{CanvasStore, SaveMode, ScopeKey, StoreError};
use crate::settings::RemoteSettings;

pub struct RemoteStore {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    cache_ttl: Duration,
    cache: Mutex<HashMap<ScopeKey, CachedLayout>>,
    in_flight: Mutex<HashSet<ScopeKey>>,
}

struct CachedLayout {
    fetched_at: Instant,
    state: Option<CanvasState>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveBody<'a> {
    id: &'a str,
    elements: &'a ElementStore,
    canvas_config: &'a CanvasConfig,
    selected_element: Option<ElementId>,
    initial_elements: &'a [Element],
}

/// Marks a key as saving until dropped.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<ScopeKey>>,
    key: ScopeKey,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(set: &'a Mutex<HashSet<ScopeKey>>, key: &ScopeKey) -> Option<Self> {
        let inserted = set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone());
        inserted.then(|| Self { set, key: key.clone() })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

impl RemoteStore {
    /// # Errors
    ///
    /// Returns `Http` if the HTTP client cannot be built, and `InvalidBaseUrl`
    /// if the base URL does not parse as a hierarchical URL.
    pub fn new(settings: &RemoteSettings) -> Result<Self, StoreError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| StoreError::InvalidBaseUrl(format!("{}: {e}", settings.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidBaseUrl(settings.base_url.clone()));
        }
        let http = reqwest::Client::builder()
            .timeout(settings.timeouts.request())
            .connect_timeout(settings.timeouts.connect())
            .build()?;
        Ok(Self {
            http,
            base_url,
            token: settings.token.clone(),
            cache_ttl: settings.cache_ttl,
            cache: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashSet::new()),
        })
    }

    /// `{base}/zones/{zone}/layout`, with `zone` escaped as one path segment.
    fn layout_url(&self, zone: &str) -> Url {
        let mut url = self.base_url.clone();
        // Checked hierarchical in `new`.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["zones", zone, "layout"]);
        }
        url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn cached(&self, key: &ScopeKey) -> Option<Option<CanvasState>> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.cache_ttl)
            .map(|entry| entry.state.clone())
    }

    /// Drop the cached load for `key`, if any.
    pub fn invalidate(&self, key: &ScopeKey) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    async fn fetch(&self, zone: &str) -> Result<Option<CanvasState>, StoreError> {
        let response = self
            .authorize(self.http.get(self.layout_url(zone)))
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let text = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::Status { status: status.as_u16(), body: text });
        }
        Ok(Some(serde_json::from_str(&text)?))
    }
}

#[async_trait::async_trait]
impl CanvasStore for RemoteStore {
    async fn load(&self, key: &ScopeKey) -> Result<Option<CanvasState>, StoreError> {
        let zone = key.require_zone()?;
        if let Some(hit) = self.cached(key) {
            debug!(%key, "layout cache hit");
            return Ok(hit);
        }
        let state = self.fetch(zone).await?;
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), CachedLayout { fetched_at: Instant::now(), state: state.clone() });
        Ok(state)
    }

    async fn save(&self, key: &ScopeKey, state: &CanvasState) -> Result<(), StoreError> {
        let zone = key.require_zone()?;
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, key) else {
            return Err(StoreError::SaveInFlight(key.clone()));
        };

        let body = SaveBody {
            id: zone,
            elements: state.elements(),
            canvas_config: state.canvas_config(),
            selected_element: state.selected_element(),
            initial_elements: state.initial_elements(),
        };
        let response = self
            .authorize(self.http.post(self.layout_url(zone)))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(StoreError::Status { status: status.as_u16(), body: text });
        }

        self.invalidate(key);
        info!(%key, elements = state.elements().len(), "layout saved");
        Ok(())
    }

    fn save_mode(&self) -> SaveMode {
        SaveMode::Explicit
    }
}
