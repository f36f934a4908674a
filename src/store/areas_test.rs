use canvas::doc::{Element, Template};
use canvas::engine::Action;
use canvas::geometry::Point;

use super::*;
use crate::session::CanvasSession;

fn key() -> ScopeKey {
    ScopeKey::new("acme", "downtown")
}

fn door() -> Element {
    Element::from_template(Template::Door, 0, Point::new(5.0, 5.0))
}

#[tokio::test]
async fn missing_registry_loads_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = AreaStore::new(LocalStore::new(dir.path()));
    assert!(store.load(&key()).await.unwrap().is_none());
}

#[tokio::test]
async fn first_save_creates_default_area() {
    let dir = tempfile::tempdir().unwrap();
    let store = AreaStore::new(LocalStore::new(dir.path()));
    let mut state = CanvasState::new();
    state.apply(Action::AddElement(door()));
    store.save(&key(), &state).await.unwrap();

    let registry = store.local().load_registry(&key()).await.unwrap().unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.active().name, DEFAULT_AREA_NAME);
    assert_eq!(registry.active().state, state);
}

#[tokio::test]
async fn saves_land_in_active_area_only() {
    let dir = tempfile::tempdir().unwrap();
    let store = AreaStore::new(LocalStore::new(dir.path()));
    let mut registry = AreaRegistry::new("Main");
    let main = registry.active_id();
    let patio = registry.create("Patio");
    registry.switch_active(patio).unwrap();
    store.local().save_registry(&key(), &registry).await.unwrap();

    let d = door();
    let mut session = CanvasSession::open(store.clone(), key()).await;
    session.dispatch(Action::AddElement(d.clone())).await;

    let saved = store.registry(&key()).await.unwrap();
    assert_eq!(saved.get(patio).unwrap().state.elements().as_slice(), &[d]);
    assert!(saved.get(main).unwrap().state.elements().is_empty());
    assert_eq!(saved.active_id(), patio);
}

#[tokio::test]
async fn switching_changes_what_loads() {
    let dir = tempfile::tempdir().unwrap();
    let store = AreaStore::new(LocalStore::new(dir.path()));
    let mut state = CanvasState::new();
    state.apply(Action::AddElement(door()));
    store.save(&key(), &state).await.unwrap();

    let mut registry = store.registry(&key()).await.unwrap();
    let patio = registry.create("Patio");
    registry.switch_active(patio).unwrap();
    store.local().save_registry(&key(), &registry).await.unwrap();

    let loaded = store.load(&key()).await.unwrap().unwrap();
    assert!(loaded.elements().is_empty());
}

#[test]
fn area_store_saves_every_mutation() {
    let store = AreaStore::new(LocalStore::new("unused"));
    assert_eq!(store.save_mode(), SaveMode::EveryMutation);
}
