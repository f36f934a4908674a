#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

// =============================================================
// Defaults and serde
// =============================================================

#[test]
fn default_config_is_square_800() {
    let c = CanvasConfig::default();
    assert_eq!(c.aspect_ratio, "1:1");
    assert_eq!(c.width, 800.0);
    assert_eq!(c.height, 800.0);
    assert!(c.layout_image.is_none());
    assert!(c.corner_labels.is_blank());
}

#[test]
fn config_serializes_camel_case() {
    let v = serde_json::to_value(CanvasConfig::default()).unwrap();
    assert_eq!(v["aspectRatio"], "1:1");
    assert!(v["layoutImage"].is_null());
    assert_eq!(v["cornerLabels"]["top"].as_array().map(Vec::len), Some(4));
}

#[test]
fn config_missing_fields_take_defaults() {
    let c: CanvasConfig = serde_json::from_str(r#"{"width": 1024}"#).unwrap();
    assert_eq!(c.width, 1024.0);
    assert_eq!(c.height, 800.0);
    assert_eq!(c.aspect_ratio, "1:1");
}

#[test]
fn labels_missing_side_defaults_blank() {
    let labels: CornerLabels = serde_json::from_str(r#"{"top": ["A", "B", "C", "D"]}"#).unwrap();
    assert_eq!(labels.top[2], "C");
    assert!(labels.left.iter().all(String::is_empty));
}

#[test]
fn labels_wrong_length_rejected() {
    assert!(serde_json::from_str::<CornerLabels>(r#"{"top": ["A"]}"#).is_err());
}

// =============================================================
// Sides and labels
// =============================================================

#[test]
fn side_from_str() {
    assert_eq!("Left".parse::<Side>().unwrap(), Side::Left);
    assert!(matches!("middle".parse::<Side>(), Err(ConfigError::UnknownSide(_))));
}

#[test]
fn label_set_in_range() {
    let mut labels = CornerLabels::blank();
    labels.set(Side::Bottom, 3, "Kitchen").unwrap();
    assert_eq!(labels.side(Side::Bottom)[3], "Kitchen");
    assert!(!labels.is_blank());
}

#[test]
fn label_set_out_of_range() {
    let mut labels = CornerLabels::blank();
    let err = labels.set(Side::Top, 4, "x").unwrap_err();
    assert_eq!(err, ConfigError::LabelIndex { side: Side::Top, index: 4, max: 3 });
    assert!(labels.is_blank());
}

#[test]
fn label_patch_touches_only_labels() {
    let mut config = CanvasConfig::default();
    config.corner_labels.set(Side::Right, 0, "Bar").unwrap();
    let patch = label_patch(&config, Side::Top, 1, "Entrance").unwrap();
    assert!(patch.width.is_none());
    assert!(patch.layout_image.is_none());
    let labels = patch.corner_labels.unwrap();
    assert_eq!(labels.top[1], "Entrance");
    assert_eq!(labels.right[0], "Bar");
}

// =============================================================
// Patch merge
// =============================================================

#[test]
fn empty_patch_changes_nothing() {
    let mut c = CanvasConfig::default();
    let patch = CanvasConfigPatch::default();
    assert!(patch.is_empty());
    assert!(!patch.apply_to(&mut c));
    assert_eq!(c, CanvasConfig::default());
}

#[test]
fn patch_merges_only_present_fields() {
    let mut c = CanvasConfig::default();
    c.layout_image = Some("https://example.test/a.png".into());
    let patch = CanvasConfigPatch { width: Some(640.0), ..Default::default() };
    assert!(patch.apply_to(&mut c));
    assert_eq!(c.width, 640.0);
    assert_eq!(c.height, 800.0);
    assert_eq!(c.layout_image.as_deref(), Some("https://example.test/a.png"));
}

#[test]
fn patch_can_clear_image() {
    let mut c = CanvasConfig::default();
    c.layout_image = Some("x".into());
    let patch = CanvasConfigPatch { layout_image: Some(None), ..Default::default() };
    assert!(patch.apply_to(&mut c));
    assert!(c.layout_image.is_none());
}

#[test]
fn patch_with_same_values_reports_unchanged() {
    let mut c = CanvasConfig::default();
    let patch = CanvasConfigPatch { width: Some(800.0), ..Default::default() };
    assert!(!patch.apply_to(&mut c));
}

#[test]
fn replace_all_overwrites_everything() {
    let mut target = CanvasConfig::default();
    let mut source = CanvasConfig::default();
    source.aspect_ratio = "4:3".into();
    source.width = 400.0;
    source.height = 300.0;
    source.layout_image = Some("bg".into());
    CanvasConfigPatch::replace_all(source.clone()).apply_to(&mut target);
    assert_eq!(target, source);
}

// =============================================================
// Aspect ratio and background
// =============================================================

#[test]
fn aspect_string_is_unreduced() {
    assert_eq!(aspect_ratio_string(1920, 1080), "1920:1080");
}

#[test]
fn parse_aspect_valid_and_invalid() {
    assert_eq!(parse_aspect_ratio("4:2").unwrap(), 2.0);
    assert_eq!(parse_aspect_ratio(" 16 : 8 ").unwrap(), 2.0);
    for bad in ["", "4", "4:0", "a:b", "-1:2", "4:2:1"] {
        assert!(parse_aspect_ratio(bad).is_err(), "{bad} should be rejected");
    }
}

#[test]
fn height_for_width_uses_ratio() {
    assert_eq!(height_for_width(800.0, "1920:1080").unwrap(), 450.0);
}

#[test]
fn background_patch_sets_all_fields_together() {
    let patch = background_patch("data:image/png;base64,AAAA", 1600, 1200, 800.0).unwrap();
    assert_eq!(patch.aspect_ratio.as_deref(), Some("1600:1200"));
    assert_eq!(patch.width, Some(800.0));
    assert_eq!(patch.height, Some(600.0));
    assert_eq!(patch.layout_image, Some(Some("data:image/png;base64,AAAA".to_owned())));
    assert!(patch.corner_labels.is_none());
}

#[test]
fn background_patch_rejects_zero_dimension() {
    let err = background_patch("x", 0, 100, 800.0).unwrap_err();
    assert_eq!(err, ConfigError::InvalidDimensions { width: 0, height: 100 });
}

#[test]
fn fit_to_container_keeps_ratio() {
    let mut c = CanvasConfig::default();
    c.aspect_ratio = "2:1".into();
    let patch = fit_to_container(&c, 500.0).unwrap();
    assert_eq!(patch.width, Some(500.0));
    assert_eq!(patch.height, Some(250.0));
    assert!(patch.aspect_ratio.is_none());
}
