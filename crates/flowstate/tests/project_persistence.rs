//! Saving and loading projects in all three formats.

use chrono::{DateTime, Utc};
use flowstate::document::empty_document;
use flowstate::{Action, Path, ProjectError, Store, StoreConfig, StoreError};
use serde_json::{json, Value};
use tempfile::TempDir;

fn t(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_700_000_000_000 + ms).unwrap()
}

fn p(s: &str) -> Path {
    s.parse().unwrap()
}

fn gesture(store: &mut Store, actions: Vec<Action>, at: i64) {
    for action in actions {
        store.enqueue(action);
    }
    store.drain_and_apply_at(t(at));
    store.finalize_gesture_at(t(at));
}

/// Three committed gestures, the last one undone.
fn session() -> Store {
    let mut store = Store::new();
    gesture(
        &mut store,
        vec![
            Action::SetValue { path: p("/audio/volume"), value: json!(0.25) },
            Action::SetValue { path: p("/audio/volume"), value: json!(0.5) },
        ],
        0,
    );
    gesture(&mut store, vec![Action::SetColorPreset { preset: 3 }, Action::ToggleMetricsWindow], 1000);
    gesture(
        &mut store,
        vec![Action::SetValues {
            values: vec![(p("/audio/muted"), json!(true)), (p("/audio/device"), json!("hw:1"))],
        }],
        2000,
    );
    store.enqueue(Action::Undo);
    store.drain_and_apply_at(t(3000));
    store
}

#[test]
fn every_format_reloads_the_same_document() {
    let dir = TempDir::new().unwrap();
    let mut store = session();
    let expected = store.document().clone();

    for name in ["project.fss", "project.fsd", "project.fsa"] {
        let path = dir.path().join(name);
        store.save_project(&path).unwrap();
        let mut fresh = Store::new();
        fresh.open_project(&path).unwrap();
        assert_eq!(*fresh.document(), expected, "{name}");
        assert_eq!(fresh.current_project_path(), Some(path.as_path()));
        assert!(!fresh.project_has_changes());
    }
}

#[test]
fn state_file_is_the_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.fss");
    let mut store = session();
    store.save_project(&path).unwrap();
    let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, *store.document());

    let mut fresh = Store::new();
    fresh.open_project(&path).unwrap();
    assert!(fresh.history().is_empty());
}

#[test]
fn diff_file_restores_history_and_cursor() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.fsd");
    let mut store = session();
    store.save_project(&path).unwrap();

    let mut fresh = Store::new();
    fresh.open_project(&path).unwrap();
    assert_eq!(fresh.history().len(), 3);
    assert_eq!(fresh.history().current_index(), 1);
    for (a, b) in fresh.history().records().iter().zip(store.history().records()) {
        assert_eq!(a.diff, b.diff);
    }
    assert_eq!(fresh.stats().committed_count(&p("/audio/volume")), 1);

    fresh.enqueue(Action::Redo);
    fresh.drain_and_apply_at(t(10_000));
    assert_eq!(fresh.document()["audio"]["device"], json!("hw:1"));
}

#[test]
fn action_log_replay_rebuilds_identical_history() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("actions.fsa");
    let mut store = session();
    store.save_project(&path).unwrap();

    let log: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let gestures = log.as_array().unwrap();
    assert_eq!(gestures.len(), 4);
    assert_eq!(gestures[0]["actions"], json!([{"type": "set_value", "path": "/audio/volume", "value": 0.5}]));
    assert_eq!(gestures[3]["actions"], json!([{"type": "set_history_index", "index": 1}]));

    let mut fresh = Store::new();
    fresh.open_project(&path).unwrap();
    assert_eq!(fresh.history().current_index(), store.history().current_index());
    assert_eq!(fresh.history().records(), store.history().records());
    assert_eq!(fresh.stats().committed_count(&p("/audio/muted")), 0);
    assert_eq!(fresh.stats().committed_count(&p("/style/color_preset")), 1);
}

#[test]
fn long_keys_survive_every_format() {
    let dir = TempDir::new().unwrap();
    let key = "k".repeat(1100);
    let mut store = Store::new();
    gesture(&mut store, vec![Action::SetValue { path: p("/audio/device"), value: json!({"x": 1}) }], 0);
    gesture(&mut store, vec![Action::SetValue { path: p("/audio/device"), value: json!({key.as_str(): 1}) }], 1000);
    assert_eq!(store.history().records()[1].diff.forward.len(), 2);
    let expected = store.document().clone();

    for name in ["long.fss", "long.fsd", "long.fsa"] {
        let path = dir.path().join(name);
        store.save_project(&path).unwrap();
        let mut fresh = Store::new();
        fresh.open_project(&path).unwrap();
        assert_eq!(*fresh.document(), expected, "{name}");
    }
}

#[test]
fn diff_file_with_broken_redo_fails_to_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.fsd");
    std::fs::write(
        &path,
        json!({
            "diffs": [{
                "forward": [{"op": "remove", "path": "/no/such"}],
                "reverse": [],
                "timestamp": "2024-01-01T00:00:00Z"
            }],
            "current_index": -1
        })
        .to_string(),
    )
    .unwrap();
    let mut store = Store::new();
    assert!(matches!(store.open_project(&path), Err(StoreError::Project(ProjectError::Patch(_)))));
    assert!(store.history().is_empty());
    assert_eq!(store.current_project_path(), None);
}

#[test]
fn action_log_without_undo_has_no_trailing_jump() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("actions.fsa");
    let mut store = Store::new();
    gesture(&mut store, vec![Action::ToggleDebugOverlay], 0);
    store.save_project(&path).unwrap();
    let log: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(log.as_array().unwrap().len(), 1);
}

#[test]
fn failed_load_leaves_store_untouched() {
    let dir = TempDir::new().unwrap();
    let mut store = session();
    let doc = store.document().clone();
    let records = store.history().records().to_vec();

    let stale = dir.path().join("stale.fsd");
    std::fs::write(
        &stale,
        json!({
            "diffs": [{
                "forward": [{"op": "replace", "path": "/no/such/path", "value": 1}],
                "reverse": [],
                "timestamp": "2024-01-01T00:00:00Z"
            }],
            "current_index": 0
        })
        .to_string(),
    )
    .unwrap();
    assert!(matches!(store.open_project(&stale), Err(StoreError::Project(ProjectError::Patch(_)))));

    let bad_log = dir.path().join("bad.fsa");
    std::fs::write(
        &bad_log,
        json!([{"actions": [{"type": "close_file_dialog"}], "committed_at": "2024-01-01T00:00:00Z"}]).to_string(),
    )
    .unwrap();
    assert!(matches!(store.open_project(&bad_log), Err(StoreError::Project(ProjectError::Format(_)))));

    let garbage = dir.path().join("garbage.fss");
    std::fs::write(&garbage, "{not json").unwrap();
    assert!(matches!(store.open_project(&garbage), Err(StoreError::Project(ProjectError::Json(_)))));

    let unknown = dir.path().join("project.txt");
    std::fs::write(&unknown, "{}").unwrap();
    assert!(matches!(store.open_project(&unknown), Err(StoreError::Project(ProjectError::UnknownExtension(_)))));

    assert_eq!(*store.document(), doc);
    assert_eq!(store.history().records(), records.as_slice());
}

#[test]
fn action_log_refuses_foreign_base() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("custom.fss");
    std::fs::write(&state, json!({"custom": {"flag": false}}).to_string()).unwrap();

    let mut store = Store::new();
    store.open_project(&state).unwrap();
    gesture(&mut store, vec![Action::ToggleValue { path: p("/custom/flag") }], 0);

    let log = dir.path().join("custom.fsa");
    assert!(matches!(store.save_project(&log), Err(StoreError::Project(ProjectError::Format(_)))));
    assert!(!log.exists());

    let diffs = dir.path().join("custom.fsd");
    store.save_project(&diffs).unwrap();
    let mut fresh = Store::new();
    fresh.open_project(&diffs).unwrap();
    assert_eq!(fresh.document(), &json!({"custom": {"flag": true}}));
}

#[test]
fn project_actions_track_current_path() {
    let dir = TempDir::new().unwrap();
    let default_path = dir.path().join("default.fsa");
    let config = StoreConfig::default().with_default_project_path(&default_path);
    let mut store = Store::with_config(config).unwrap();

    store.enqueue(Action::OpenDefaultProject);
    assert_eq!(store.drain_and_apply_at(t(0)).rejected, 1);

    gesture(&mut store, vec![Action::SetColorPreset { preset: 5 }], 0);
    assert!(store.project_has_changes());
    store.enqueue(Action::SaveDefaultProject);
    store.drain_and_apply_at(t(10));
    assert!(default_path.exists());
    assert_eq!(store.current_project_path(), Some(default_path.as_path()));
    assert!(!store.project_has_changes());

    store.enqueue(Action::SaveCurrentProject);
    assert_eq!(store.drain_and_apply_at(t(20)).rejected, 1);

    store.enqueue(Action::OpenEmptyProject);
    let report = store.drain_and_apply_at(t(30));
    assert_eq!(report.changed_paths, vec![Path::root()]);
    assert_eq!(*store.document(), empty_document());
    assert_eq!(store.current_project_path(), None);

    store.enqueue(Action::OpenDefaultProject);
    store.drain_and_apply_at(t(40));
    assert_eq!(store.document()["style"]["color_preset"], json!(5));
    assert_eq!(store.history().len(), 1);
}

#[test]
fn save_action_with_unknown_extension_fails() {
    let dir = TempDir::new().unwrap();
    let mut store = Store::new();
    store.enqueue(Action::SaveProject { path: dir.path().join("project.doc") });
    let report = store.drain_and_apply_at(t(0));
    assert_eq!(report.failed, 1);
    assert_eq!(store.current_project_path(), None);
}

#[test]
fn empty_project_file_from_config() {
    let dir = TempDir::new().unwrap();
    let empty = dir.path().join("empty.fss");
    let mut template = empty_document();
    template["style"]["color_preset"] = json!(7);
    std::fs::write(&empty, template.to_string()).unwrap();

    let mut store = Store::with_config(StoreConfig::default().with_empty_project_path(&empty)).unwrap();
    store.open_empty_project().unwrap();
    assert_eq!(store.document()["style"]["color_preset"], json!(7));
}
