//! Integration tests against a realistic animation document.
//!
//! The fixture mixes shape layers, a precomposition, an image asset, a solid
//! layer, null shape slots, non-editable shape types and an animated fill.

use std::collections::BTreeSet;

use lte_core::*;
use pretty_assertions::assert_eq;
use serde_json::Value;

const BADGE: &str = include_str!("fixtures/badge.json");

const RED: RgbaColor = RgbaColor::new(255, 0, 0, 1.0);
const GREEN: RgbaColor = RgbaColor::new(0, 255, 0, 1.0);
const BLUE: RgbaColor = RgbaColor::new(0, 0, 255, 1.0);

// ─── Helpers ─────────────────────────────────────────────────────────────

fn badge() -> Document {
    Document::from_json(BADGE).expect("fixture should load")
}

fn p(s: &str) -> NodePath {
    s.parse().expect("valid path")
}

fn collect_shapes<'a>(shapes: &'a [ShapeInfo], out: &mut Vec<&'a ShapeInfo>) {
    for shape in shapes {
        out.push(shape);
        collect_shapes(&shape.children, out);
    }
}

fn collect_layer_shapes<'a>(layers: &'a [LayerInfo], out: &mut Vec<&'a ShapeInfo>) {
    for layer in layers {
        collect_shapes(&layer.shapes, out);
        collect_layer_shapes(&layer.children, out);
    }
}

fn listed_shapes(doc: &Document) -> Vec<ShapeInfo> {
    let layers = list_layers(doc);
    let mut out = Vec::new();
    collect_layer_shapes(&layers, &mut out);
    out.into_iter().cloned().collect()
}

fn object_keys(value: &Value) -> Vec<&str> {
    value
        .as_object()
        .map(|obj| obj.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

// ─── Loading ─────────────────────────────────────────────────────────────

#[test]
fn fixture_roundtrips_without_loss() {
    let doc = badge();
    let original: Value = serde_json::from_str(BADGE).unwrap();
    let emitted: Value = serde_json::from_str(&doc.to_json()).unwrap();
    assert_eq!(emitted, original);
    assert_eq!(object_keys(&emitted), object_keys(&original));
    assert_eq!(
        object_keys(&emitted["layers"][0]),
        object_keys(&original["layers"][0])
    );
    assert_eq!(
        object_keys(&emitted["layers"][0]["shapes"][2]["c"]["k"][0]),
        object_keys(&original["layers"][0]["shapes"][2]["c"]["k"][0])
    );
}

#[test]
fn header_fields() {
    let doc = badge();
    assert_eq!(doc.dimensions(), (512, 512));
    assert_eq!(doc.framerate(), 30.0);
    assert_eq!(doc.assets().len(), 2);
}

// ─── Listing ─────────────────────────────────────────────────────────────

#[test]
fn layer_listing_shape() {
    let layers = list_layers(&badge());
    let names: Vec<&str> = layers.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Ring", "Sparkle Precomp", "Backdrop"]);
    assert_eq!(
        layers.iter().map(|l| l.hidden).collect::<Vec<_>>(),
        vec![false, false, true]
    );

    let ring = &layers[0];
    assert_eq!(
        ring.shapes.iter().map(|s| s.path.to_string()).collect::<Vec<_>>(),
        vec!["layers.0.shapes.0", "layers.0.shapes.2"]
    );
    let group = &ring.shapes[0];
    assert!(group.is_group());
    assert_eq!(
        group.children.iter().map(|s| s.kind).collect::<Vec<_>>(),
        vec![ShapeKind::Other, ShapeKind::Stroke, ShapeKind::Fill, ShapeKind::Other]
    );
    assert_eq!(group.children[1].color, GREEN);
    assert_eq!(group.children[2].name, "Unnamed Shape");
    assert_eq!(ring.shapes[1].color, RED);

    let precomp = &layers[1];
    assert!(precomp.shapes.is_empty());
    assert_eq!(precomp.children.len(), 1);
    assert_eq!(precomp.children[0].path.to_string(), "assets.0.layers.0");
    assert_eq!(
        precomp.children[0].shapes[0].path.to_string(),
        "assets.0.layers.0.shapes.0"
    );
}

#[test]
fn direct_resolution_agrees_with_listing() {
    let doc = badge();
    for listed in listed_shapes(&doc) {
        assert_eq!(resolve_shape(&doc, &listed.path), listed, "{}", listed.path);
    }
}

#[test]
fn groups_cover_exactly_the_decodable_paints() {
    let doc = badge();
    let grouped: BTreeSet<String> = group_colors(&doc)
        .iter()
        .flat_map(|g| g.shape_paths.iter().map(ToString::to_string))
        .collect();
    let painted: BTreeSet<String> = listed_shapes(&doc)
        .iter()
        .filter(|s| matches!(s.kind, ShapeKind::Fill | ShapeKind::Stroke))
        .map(|s| s.path.to_string())
        .collect();
    assert_eq!(grouped, painted);
}

#[test]
fn color_groups_in_first_seen_order() {
    let groups = group_colors(&badge());
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].color, GREEN);
    assert_eq!(groups[0].count, 1);
    assert_eq!(groups[1].color, RED);
    assert_eq!(groups[1].count, 3);
    assert_eq!(
        groups[1]
            .shape_paths
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
        vec![
            "layers.0.shapes.0.it.2",
            "layers.0.shapes.2",
            "assets.0.layers.0.shapes.0"
        ]
    );
    for group in &groups {
        assert_eq!(group.count, group.shape_paths.len());
    }
}

// ─── Editing ─────────────────────────────────────────────────────────────

#[test]
fn global_replace_reaches_precomps_and_keyframes() {
    let before = badge();
    let after = replace_color_globally(&before, RED, BLUE);

    let groups = group_colors(&after);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[1].color, BLUE);
    assert_eq!(groups[1].count, 3);

    let emitted: Value = serde_json::from_str(&after.to_json()).unwrap();
    let keys = &emitted["layers"][0]["shapes"][2]["c"]["k"];
    let blue = serde_json::json!([0, 0, 1, 1]);
    assert_eq!(keys[0]["s"], blue);
    assert_eq!(keys[0]["e"], blue);
    assert_eq!(keys[1]["s"], blue);
    assert_eq!(keys[1]["e"], blue);
    assert_eq!(keys[2], serde_json::json!({"t": 90}));
    // Untouched members survive.
    assert_eq!(keys[0]["i"], serde_json::json!({"x": [0.5], "y": [1]}));
    assert_eq!(emitted["layers"][0]["shapes"][0]["it"][1]["c"]["ix"], 3);

    // The input is never modified.
    assert_eq!(before, badge());
}

#[test]
fn replace_then_replace_back_restores_groups() {
    let doc = badge();
    let there = replace_color_globally(&doc, RED, BLUE);
    let back = replace_color_globally(&there, BLUE, RED);
    assert_eq!(group_colors(&back), group_colors(&doc));
}

#[test]
fn set_color_collapses_animated_fill() {
    let doc = badge();
    let path = p("layers.0.shapes.2");
    let after = set_shape_color(&doc, &path, RgbaColor::new(18, 52, 86, 0.5));
    assert_eq!(resolve_shape(&after, &path).color, RgbaColor::new(18, 52, 86, 0.5));
    let emitted: Value = serde_json::from_str(&after.to_json()).unwrap();
    let c = &emitted["layers"][0]["shapes"][2]["c"];
    assert!(c["k"][0].is_number());
    assert_eq!(c["ix"], 4);
}

#[test]
fn hide_show_roundtrip_is_lossless() {
    let doc = badge();
    let path = p("layers.1");
    let hidden = set_layer_hidden(&doc, &path, true);
    assert!(layer_hidden(&hidden, &path));
    assert_eq!(set_layer_hidden(&hidden, &path, false), doc);
    assert_eq!(toggle_layer_hidden(&hidden, &path), doc);
}

#[test]
fn hiding_nested_layer_addresses_the_asset() {
    let doc = badge();
    let path = p("assets.0.layers.0");
    let hidden = set_layer_hidden(&doc, &path, true);
    assert!(layer_hidden(&hidden, &path));
    assert!(list_layers(&hidden)[1].children[0].hidden);
}

#[test]
fn delete_layer_keeps_order() {
    let doc = badge();
    let after = delete_layer(&doc, 1).unwrap();
    let names: Vec<String> = list_layers(&after).into_iter().map(|l| l.name).collect();
    assert_eq!(names, vec!["Ring", "Backdrop"]);
    // The asset stays even without a referencing layer.
    assert_eq!(after.assets().len(), 2);
    assert_eq!(
        delete_layer(&doc, 3),
        Err(EditError::LayerOutOfRange { index: 3, len: 3 })
    );
}

#[test]
fn scalar_edits_touch_only_their_field() {
    let doc = badge();
    let resized = set_dimensions(&doc, 1080, 1920);
    let emitted: Value = serde_json::from_str(&resized.to_json()).unwrap();
    assert_eq!(emitted["w"], 1080);
    assert_eq!(emitted["h"], 1920);
    assert_eq!(emitted["nm"], "Badge");

    let faster = set_framerate(&doc, 59.94).unwrap();
    assert_eq!(faster.framerate(), 59.94);
    assert_eq!(faster.layers, doc.layers);
}
