#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::config::CanvasConfigPatch;
use crate::doc::{Element, Template};
use crate::geometry::Point;

fn door() -> Element {
    Element::from_template(Template::Door, 0, Point::new(0.0, 0.0))
}

#[test]
fn new_registry_has_one_active_area() {
    let reg = AreaRegistry::new("Main hall");
    assert_eq!(reg.len(), 1);
    assert!(!reg.is_empty());
    assert_eq!(reg.active().name, "Main hall");
    assert_eq!(reg.active().id, reg.active_id());
}

#[test]
fn create_copies_config_but_not_elements() {
    let mut reg = AreaRegistry::new("Main");
    reg.dispatch(Action::AddElement(door()));
    reg.dispatch(Action::SetCanvasConfig(CanvasConfigPatch { width: Some(1200.0), ..Default::default() }));

    let terrace = reg.create("Terrace");
    let area = reg.get(terrace).unwrap();
    assert_eq!(area.state.canvas_config().width, 1200.0);
    assert!(area.state.elements().is_empty());
    assert_ne!(reg.active_id(), terrace);
}

#[test]
fn dispatch_targets_active_area_only() {
    let mut reg = AreaRegistry::new("Main");
    let main = reg.active_id();
    let other = reg.create("Other");
    reg.switch_active(other).unwrap();
    assert!(reg.dispatch(Action::AddElement(door())));
    assert_eq!(reg.get(other).map(|a| a.state.elements().len()), Some(1));
    assert_eq!(reg.get(main).map(|a| a.state.elements().len()), Some(0));
}

#[test]
fn switch_to_unknown_fails() {
    let mut reg = AreaRegistry::new("Main");
    let bogus = Uuid::new_v4();
    assert_eq!(reg.switch_active(bogus), Err(RegistryError::NotFound(bogus)));
}

#[test]
fn cannot_remove_last_area() {
    let mut reg = AreaRegistry::new("Main");
    let only = reg.active_id();
    assert_eq!(reg.remove(only), Err(RegistryError::LastArea(only)));
    assert_eq!(reg.len(), 1);
}

#[test]
fn removing_active_activates_first_remaining() {
    let mut reg = AreaRegistry::new("A");
    let a = reg.active_id();
    let b = reg.create("B");
    let c = reg.create("C");
    reg.switch_active(b).unwrap();
    let removed = reg.remove(b).unwrap();
    assert_eq!(removed.name, "B");
    assert_eq!(reg.active_id(), a);
    reg.remove(a).unwrap();
    assert_eq!(reg.active_id(), c);
}

#[test]
fn rename_and_replace_state() {
    let mut reg = AreaRegistry::new("A");
    let id = reg.active_id();
    reg.rename(id, "Dining").unwrap();
    assert_eq!(reg.active().name, "Dining");

    let replacement = CanvasState::with_scope("zone-1");
    reg.replace_state(id, replacement.clone()).unwrap();
    assert_eq!(reg.active().state, replacement);
    assert!(reg.rename(Uuid::new_v4(), "x").is_err());
}

#[test]
fn serde_round_trip_keeps_active() {
    let mut reg = AreaRegistry::new("A");
    let b = reg.create("B");
    reg.switch_active(b).unwrap();
    let json = serde_json::to_string(&reg).unwrap();
    let back: AreaRegistry = serde_json::from_str(&json).unwrap();
    assert_eq!(back, reg);
    assert_eq!(back.active_id(), b);
}

#[test]
fn deserialize_unknown_active_falls_back_to_first() {
    let reg = AreaRegistry::new("A");
    let first = reg.active_id();
    let mut v = serde_json::to_value(&reg).unwrap();
    v["active"] = json!(Uuid::new_v4());
    let back: AreaRegistry = serde_json::from_value(v).unwrap();
    assert_eq!(back.active_id(), first);
}

#[test]
fn deserialize_empty_is_rejected() {
    let raw = json!({ "areas": [], "active": Uuid::new_v4() });
    assert!(serde_json::from_value::<AreaRegistry>(raw).is_err());
}
