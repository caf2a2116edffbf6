//! Integration tests: editor session end to end.
//!
//! Drives `EditorSession` the way a host would (load, select, type into the
//! hex field, undo, reload) and checks what ends up in the store.

use lte_core::*;
use lte_editor::input::{HexField, NumberField};
use lte_editor::*;
use pretty_assertions::assert_eq;

const TWO_LAYERS: &str = include_str!("fixtures/two_layers.json");

fn fixture() -> Document {
    Document::from_json(TWO_LAYERS).expect("fixture should load")
}

fn p(s: &str) -> NodePath {
    s.parse().expect("valid path")
}

fn memory_session() -> EditorSession<MemoryStore> {
    let mut session = EditorSession::new(MemoryStore::new(), EditorConfig::default());
    session.set_document(fixture()).unwrap();
    session
}

// ─── Hex input ──────────────────────────────────────────────────────────

#[test]
fn hex_field_drives_selected_color() {
    let mut session = memory_session();
    session.select_shape(p("layers.1.shapes.0.it.0"));
    let current = session.selected_shape().unwrap().color;
    assert_eq!(current, RgbaColor::new(0, 255, 0, 0.5));

    let mut field = HexField::new(current);
    field.focus(current);
    field.edit("f00");
    let committed = field.commit(current).unwrap();
    assert!(session.update_selected_shape_color(committed).unwrap());
    assert_eq!(
        session.selected_shape().unwrap().color,
        RgbaColor::new(255, 0, 0, 0.5)
    );

    let before = session.document().cloned();
    let current = session.selected_shape().unwrap().color;
    field.focus(current);
    field.edit("zzz");
    assert_eq!(field.commit(current), None);
    assert_eq!(field.text(), "#ff0000");
    assert_eq!(session.document().cloned(), before);
}

#[test]
fn number_field_rejects_before_the_document() {
    let mut session = memory_session();
    let mut width = NumberField::new(session.document().unwrap().width).with_min(1);
    width.edit("wide");
    assert_eq!(width.commit(), None);
    assert!(!session.can_undo());

    width.edit("1280");
    let w = width.commit().unwrap();
    assert!(session.update_dimensions(w, 720).unwrap());
    assert_eq!(session.document().unwrap().dimensions(), (1280, 720));
}

// ─── Global color edits ─────────────────────────────────────────────────

#[test]
fn global_replace_and_undo() {
    let mut session = memory_session();
    let red = RgbaColor::new(255, 0, 0, 1.0);
    let blue = RgbaColor::new(0, 0, 255, 1.0);

    assert!(session.update_color_globally(red, blue).unwrap());
    let groups = group_colors(session.document().unwrap());
    assert_eq!(groups[0].color, blue);
    assert_eq!(groups[0].count, 2);

    assert_eq!(
        session.undo().unwrap().as_deref(),
        Some("Replace #ff0000 with #0000ff")
    );
    assert_eq!(session.document(), Some(&fixture()));
    assert!(session.can_redo());
    session.redo().unwrap();
    assert_eq!(group_colors(session.document().unwrap())[0].color, blue);
}

#[test]
fn picker_drag_is_one_undo_step() {
    let mut session = memory_session();
    session.select_shape(p("layers.0.shapes.0"));

    session.begin_gesture();
    for r in [10u8, 20, 30, 40] {
        session
            .update_selected_shape_color(RgbaColor::new(r, 0, 0, 1.0))
            .unwrap();
    }
    session.end_gesture();

    assert_eq!(session.selected_shape().unwrap().color.r, 40);
    session.undo().unwrap();
    assert_eq!(session.document(), Some(&fixture()));
    assert!(!session.can_undo());
}

// ─── Layers ─────────────────────────────────────────────────────────────

#[test]
fn toggle_hidden_twice_restores_document() {
    let mut session = memory_session();
    session.toggle_layer_hidden(p("layers.0")).unwrap();
    assert!(list_layers(session.document().unwrap())[0].hidden);
    session.toggle_layer_hidden(p("layers.0")).unwrap();
    assert_eq!(session.document(), Some(&fixture()));
}

#[test]
fn delete_layer_then_undo() {
    let mut session = memory_session();
    assert!(session.delete_layer(0).unwrap());
    let names: Vec<String> = list_layers(session.document().unwrap())
        .into_iter()
        .map(|l| l.name)
        .collect();
    assert_eq!(names, vec!["Cool"]);
    session.undo().unwrap();
    assert_eq!(session.document().unwrap().layers.len(), 2);
}

// ─── Persistence ────────────────────────────────────────────────────────

#[test]
fn file_store_survives_reload() {
    let dir = tempfile::tempdir().unwrap();

    let mut first = EditorSession::new(FileStore::new(dir.path()), EditorConfig::default());
    first.set_document(fixture()).unwrap();
    first.update_framerate(60.0).unwrap();
    let saved = first.document().cloned().unwrap();
    drop(first);

    let mut second = EditorSession::new(FileStore::new(dir.path()), EditorConfig::default());
    assert!(second.load_from_store().unwrap());
    assert_eq!(second.document(), Some(&saved));
    assert_eq!(second.document().unwrap().framerate(), 60.0);
    assert!(!second.can_undo());

    second.remove_document().unwrap();
    assert!(second.document().is_none());
    assert!(!dir.path().join("animationJson.json").exists());
}

#[test]
fn corrupt_store_is_treated_as_empty() {
    let mut store = MemoryStore::new();
    store.set("animationJson", "{not json").unwrap();
    let mut session = EditorSession::new(store, EditorConfig::default());
    assert!(!session.load_from_store().unwrap());
    assert!(session.document().is_none());
    assert!(!session.is_loading());
}

#[test]
fn custom_storage_key() {
    let config: EditorConfig = serde_json::from_str(r#"{"storage_key": "draft"}"#).unwrap();
    let mut session = EditorSession::new(MemoryStore::new(), config);
    session.set_document(fixture()).unwrap();
    assert!(session.store().get("draft").unwrap().is_some());
    assert!(session.store().get("animationJson").unwrap().is_none());
}
