//! The pure state transition `(document, action) -> document`.

use flowstate_json_patch::{apply_ops, PatchError};
use flowstate_json_pointer::{get_mut, parse_index, Path};
use serde_json::Value;
use tracing::debug;

use crate::action::Action;
use crate::document;

/// Apply `action` to `doc` and return the resulting document.
///
/// Deterministic and total. Store-level actions (undo, redo, project IO)
/// and writes whose target cannot be reached return `doc` unchanged.
///
/// # Example
///
/// ```
/// use flowstate::{document::empty_document, reducer, Action};
/// use serde_json::json;
///
/// let doc = empty_document();
/// let next = reducer::update(&doc, &Action::SetColorPreset { preset: 2 });
/// assert_eq!(next["style"]["color_preset"], json!(2));
/// ```
pub fn update(doc: &Value, action: &Action) -> Value {
    if !action.kind().is_reducible() {
        return doc.clone();
    }
    let mut next = doc.clone();
    match reduce(&mut next, action) {
        Ok(()) => next,
        Err(err) => {
            debug!(action = action.name(), %err, "action left document unchanged");
            doc.clone()
        }
    }
}

fn reduce(doc: &mut Value, action: &Action) -> Result<(), PatchError> {
    match action {
        Action::SetValue { path, value } => set_value(doc, path, value.clone()),
        Action::SetValues { values } => {
            for (path, value) in values {
                set_value(doc, path, value.clone())?;
            }
            Ok(())
        }
        Action::ToggleValue { path } => toggle(doc, path),
        Action::ApplyPatch { patch } => apply_ops(doc, patch),
        Action::OpenFileDialog { config } => {
            set_value(doc, &document::file_dialog_path(), document::open_file_dialog(config))
        }
        Action::CloseFileDialog => set_value(doc, &document::file_dialog_path(), document::closed_file_dialog()),
        Action::SetColorPreset { preset } => set_value(doc, &document::color_preset_path(), Value::from(*preset)),
        Action::ToggleMetricsWindow => toggle(doc, &document::metrics_window_path()),
        Action::ToggleDebugOverlay => toggle(doc, &document::debug_overlay_path()),
        Action::Undo
        | Action::Redo
        | Action::SetHistoryIndex { .. }
        | Action::OpenProject { .. }
        | Action::OpenEmptyProject
        | Action::OpenDefaultProject
        | Action::SaveProject { .. }
        | Action::SaveCurrentProject
        | Action::SaveDefaultProject => Ok(()),
    }
}

// ── Writers ───────────────────────────────────────────────────────────────

/// Write `value` at `path`. Object members may be created; array elements
/// must already exist.
fn set_value(doc: &mut Value, path: &Path, value: Value) -> Result<(), PatchError> {
    let Some((parent, key)) = path.split_last() else {
        *doc = value;
        return Ok(());
    };
    match get_mut(doc, &parent) {
        Some(Value::Object(map)) => {
            map.insert(key.to_string(), value);
            Ok(())
        }
        Some(Value::Array(arr)) => {
            let idx = parse_index(key).map_err(|_| PatchError::InvalidIndex(path.clone()))?;
            let slot = arr.get_mut(idx).ok_or_else(|| PatchError::NotFound(path.clone()))?;
            *slot = value;
            Ok(())
        }
        Some(_) => Err(PatchError::InvalidTarget(path.clone())),
        None => Err(PatchError::NotFound(path.clone())),
    }
}

fn toggle(doc: &mut Value, path: &Path) -> Result<(), PatchError> {
    match get_mut(doc, path) {
        Some(Value::Bool(b)) => {
            *b = !*b;
            Ok(())
        }
        Some(_) => Err(PatchError::InvalidTarget(path.clone())),
        None => Err(PatchError::NotFound(path.clone())),
    }
}
