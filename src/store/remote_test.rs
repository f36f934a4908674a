use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode as HttpStatus};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use canvas::doc::Template;
use canvas::engine::Action;
use canvas::geometry::Point;
use serde_json::Value;

use super::*;

// =============================================================
// Mock layout API
// =============================================================

#[derive(Default)]
struct MockApi {
    layouts: Mutex<HashMap<String, Value>>,
    gets: AtomicUsize,
    posts: AtomicUsize,
    last_auth: Mutex<Option<String>>,
    fail_posts: bool,
    post_delay: Option<Duration>,
}

async fn get_layout(State(api): State<Arc<MockApi>>, Path(zone): Path<String>, headers: HeaderMap) -> Response {
    api.gets.fetch_add(1, Ordering::SeqCst);
    record_auth(&api, &headers);
    let layout = api.layouts.lock().unwrap().get(&zone).cloned();
    match layout {
        Some(body) => Json(body).into_response(),
        None => HttpStatus::NOT_FOUND.into_response(),
    }
}

async fn post_layout(
    State(api): State<Arc<MockApi>>,
    Path(zone): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    api.posts.fetch_add(1, Ordering::SeqCst);
    record_auth(&api, &headers);
    if let Some(delay) = api.post_delay {
        tokio::time::sleep(delay).await;
    }
    if api.fail_posts {
        return (HttpStatus::INTERNAL_SERVER_ERROR, "database unavailable").into_response();
    }
    api.layouts.lock().unwrap().insert(zone, body);
    HttpStatus::NO_CONTENT.into_response()
}

fn record_auth(api: &MockApi, headers: &HeaderMap) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    *api.last_auth.lock().unwrap() = auth;
}

async fn spawn_api(api: Arc<MockApi>) -> String {
    let app = Router::new()
        .route("/zones/{zone}/layout", get(get_layout).post(post_layout))
        .with_state(api);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn store_for(api: Arc<MockApi>) -> RemoteStore {
    let base = spawn_api(api).await;
    RemoteStore::new(&RemoteSettings::new(&base)).unwrap()
}

fn zone_key() -> ScopeKey {
    ScopeKey::new("acme", "downtown").with_zone("terrace")
}

fn sample_state() -> CanvasState {
    let mut state = CanvasState::with_scope("terrace");
    state.apply(Action::AddElement(Element::from_template(Template::Door, 0, Point::new(1.0, 2.0))));
    state
}

// =============================================================
// Load
// =============================================================

#[tokio::test]
async fn load_404_is_none() {
    let store = store_for(Arc::new(MockApi::default())).await;
    assert!(store.load(&zone_key()).await.unwrap().is_none());
}

#[tokio::test]
async fn load_without_zone_fails_fast() {
    let api = Arc::new(MockApi::default());
    let store = store_for(api.clone()).await;
    let result = store.load(&ScopeKey::new("acme", "downtown")).await;
    assert!(matches!(result, Err(StoreError::MissingZone(_))));
    assert_eq!(api.gets.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn load_is_cached_within_ttl() {
    let api = Arc::new(MockApi::default());
    api.layouts
        .lock()
        .unwrap()
        .insert("terrace".into(), serde_json::to_value(sample_state()).unwrap());
    let store = store_for(api.clone()).await;

    let first = store.load(&zone_key()).await.unwrap();
    let second = store.load(&zone_key()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.map(|s| s.elements().len()), Some(1));
    assert_eq!(api.gets.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn zero_ttl_always_refetches() {
    let api = Arc::new(MockApi::default());
    let base = spawn_api(api.clone()).await;
    let mut settings = RemoteSettings::new(&base);
    settings.cache_ttl = Duration::ZERO;
    let store = RemoteStore::new(&settings).unwrap();

    store.load(&zone_key()).await.unwrap();
    store.load(&zone_key()).await.unwrap();
    assert_eq!(api.gets.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn load_accepts_payload_without_id() {
    let api = Arc::new(MockApi::default());
    api.layouts.lock().unwrap().insert(
        "terrace".into(),
        serde_json::json!({ "elements": [], "canvasConfig": { "width": 500.0 } }),
    );
    let store = store_for(api).await;
    let state = store.load(&zone_key()).await.unwrap().unwrap();
    assert_eq!(state.canvas_config().width, 500.0);
    assert!(state.scope_id().is_none());
}

// =============================================================
// Save
// =============================================================

#[tokio::test]
async fn save_posts_full_snapshot_with_bearer() {
    let api = Arc::new(MockApi::default());
    let base = spawn_api(api.clone()).await;
    let mut settings = RemoteSettings::new(&base);
    settings.token = Some("secret".into());
    let store = RemoteStore::new(&settings).unwrap();

    store.save(&zone_key(), &sample_state()).await.unwrap();

    let body = api.layouts.lock().unwrap().get("terrace").cloned().unwrap();
    assert_eq!(body["id"], "terrace");
    assert_eq!(body["elements"].as_array().map(Vec::len), Some(1));
    assert!(body.get("canvasConfig").is_some());
    assert!(body["selectedElement"].is_null());
    assert!(body["initialElements"].is_array());
    assert_eq!(api.last_auth.lock().unwrap().as_deref(), Some("Bearer secret"));
}

#[tokio::test]
async fn save_invalidates_cache() {
    let api = Arc::new(MockApi::default());
    let store = store_for(api.clone()).await;

    assert!(store.load(&zone_key()).await.unwrap().is_none());
    store.save(&zone_key(), &sample_state()).await.unwrap();
    let reloaded = store.load(&zone_key()).await.unwrap();

    assert_eq!(reloaded.map(|s| s.elements().len()), Some(1));
    assert_eq!(api.gets.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_save_reports_status() {
    let api = Arc::new(MockApi { fail_posts: true, ..MockApi::default() });
    let store = store_for(api).await;
    let err = store.save(&zone_key(), &sample_state()).await.unwrap_err();
    match err {
        StoreError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "database unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn concurrent_save_for_same_key_is_rejected() {
    let api = Arc::new(MockApi { post_delay: Some(Duration::from_millis(200)), ..MockApi::default() });
    let store = store_for(api.clone()).await;
    let state = sample_state();
    let key = zone_key();

    let (first, second) = tokio::join!(store.save(&key, &state), store.save(&key, &state));

    assert!(first.is_ok());
    assert!(matches!(second, Err(StoreError::SaveInFlight(_))));
    assert_eq!(api.posts.load(Ordering::SeqCst), 1);

    // The guard is released once the first save finishes.
    store.save(&key, &state).await.unwrap();
}

#[tokio::test]
async fn saves_for_different_zones_run_together() {
    let api = Arc::new(MockApi { post_delay: Some(Duration::from_millis(50)), ..MockApi::default() });
    let store = store_for(api.clone()).await;
    let state = sample_state();
    let terrace = zone_key();
    let bar = ScopeKey::new("acme", "downtown").with_zone("bar");

    let (a, b) = tokio::join!(store.save(&terrace, &state), store.save(&bar, &state));
    assert!(a.is_ok() && b.is_ok());
    assert_eq!(api.posts.load(Ordering::SeqCst), 2);
}

#[test]
fn remote_store_saves_explicitly() {
    let store = RemoteStore::new(&RemoteSettings::new("http://127.0.0.1:1")).unwrap();
    assert_eq!(store.save_mode(), SaveMode::Explicit);
}

// =============================================================
// URLs
// =============================================================

#[test]
fn layout_url_escapes_zone_as_one_segment() {
    let store = RemoteStore::new(&RemoteSettings::new("http://layouts.test/api/")).unwrap();
    assert_eq!(
        store.layout_url("east/wing?x#1").as_str(),
        "http://layouts.test/api/zones/east%2Fwing%3Fx%231/layout"
    );
    assert_eq!(store.layout_url("terrace").path(), "/api/zones/terrace/layout");
}

#[test]
fn unparseable_base_url_rejected() {
    let result = RemoteStore::new(&RemoteSettings::new("not a url"));
    assert!(matches!(result, Err(StoreError::InvalidBaseUrl(_))));
}

#[tokio::test]
async fn zone_with_reserved_characters_round_trips() {
    let api = Arc::new(MockApi::default());
    let store = store_for(api.clone()).await;
    let key = ScopeKey::new("acme", "downtown").with_zone("east/wing?x#1");

    store.save(&key, &sample_state()).await.unwrap();
    assert!(api.layouts.lock().unwrap().contains_key("east/wing?x#1"));
    let loaded = store.load(&key).await.unwrap();
    assert_eq!(loaded.map(|s| s.elements().len()), Some(1));
}
