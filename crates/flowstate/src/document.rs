//! The default application document and the well-known paths the built-in
//! actions write to.

use flowstate_json_pointer::Path;
use serde_json::{json, Value};

pub fn file_dialog_path() -> Path {
    Path::root().child("file_dialog")
}

pub fn file_dialog_visible_path() -> Path {
    file_dialog_path().child("visible")
}

pub fn color_preset_path() -> Path {
    Path::root().child("style").child("color_preset")
}

pub fn metrics_window_path() -> Path {
    Path::root().child("windows").child("metrics")
}

pub fn debug_overlay_path() -> Path {
    Path::root().child("windows").child("debug_overlay")
}

/// The file dialog state when no dialog is showing.
pub fn closed_file_dialog() -> Value {
    json!({"visible": false, "config": null})
}

/// The file dialog state while showing `config`.
pub fn open_file_dialog(config: &Value) -> Value {
    json!({"visible": true, "config": config})
}

/// The document every session and empty project starts from.
pub fn empty_document() -> Value {
    json!({
        "audio": {
            "volume": 1.0,
            "muted": false,
            "sample_rate": 48000,
            "device": null
        },
        "file_dialog": closed_file_dialog(),
        "style": {
            "color_preset": 0
        },
        "windows": {
            "metrics": false,
            "debug_overlay": false
        }
    })
}

/// True when the file dialog in `doc` is showing.
pub fn is_file_dialog_visible(doc: &Value) -> bool {
    flowstate_json_pointer::get(doc, &file_dialog_visible_path())
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
