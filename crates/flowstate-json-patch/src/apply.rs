//! Patch application.

use flowstate_json_pointer::{find, get, get_mut, parse_index};
use serde_json::Value;

use super::types::{Op, PatchError, Path};

// ── Path navigation ───────────────────────────────────────────────────────

/// Mutable navigation to the container at `parent` (must exist).
fn container_mut<'a>(doc: &'a mut Value, parent: &Path, target: &Path) -> Result<&'a mut Value, PatchError> {
    get_mut(doc, parent).ok_or_else(|| PatchError::NotFound(target.clone()))
}

fn array_index(key: &str, path: &Path) -> Result<usize, PatchError> {
    parse_index(key).map_err(|e| PatchError::from_pointer(e, path))
}

// ── Individual operation applicators ─────────────────────────────────────

fn apply_add(doc: &mut Value, path: &Path, value: Value) -> Result<Option<Value>, PatchError> {
    let Some((parent_path, key)) = path.split_last() else {
        return Ok(Some(std::mem::replace(doc, value)));
    };
    match container_mut(doc, &parent_path, path)? {
        Value::Object(map) => Ok(map.insert(key.to_string(), value)),
        Value::Array(arr) => {
            if key == "-" {
                arr.push(value);
                return Ok(None);
            }
            let idx = array_index(key, path)?;
            if idx > arr.len() {
                return Err(PatchError::InvalidIndex(path.clone()));
            }
            arr.insert(idx, value);
            Ok(None)
        }
        _ => Err(PatchError::InvalidTarget(path.clone())),
    }
}

fn apply_remove(doc: &mut Value, path: &Path) -> Result<Value, PatchError> {
    let Some((parent_path, key)) = path.split_last() else {
        return Err(PatchError::InvalidTarget(path.clone()));
    };
    match container_mut(doc, &parent_path, path)? {
        // shift_remove keeps the remaining keys in insertion order
        Value::Object(map) => map.shift_remove(key).ok_or_else(|| PatchError::NotFound(path.clone())),
        Value::Array(arr) => {
            let idx = array_index(key, path)?;
            if idx >= arr.len() {
                return Err(PatchError::NotFound(path.clone()));
            }
            Ok(arr.remove(idx))
        }
        _ => Err(PatchError::InvalidTarget(path.clone())),
    }
}

fn apply_replace(doc: &mut Value, path: &Path, value: Value) -> Result<Value, PatchError> {
    let target = get_mut(doc, path).ok_or_else(|| PatchError::NotFound(path.clone()))?;
    Ok(std::mem::replace(target, value))
}

fn apply_copy(doc: &mut Value, path: &Path, from: &Path) -> Result<Option<Value>, PatchError> {
    let src = get(doc, from).ok_or_else(|| PatchError::NotFound(from.clone()))?.clone();
    apply_add(doc, path, src)
}

fn apply_move(doc: &mut Value, path: &Path, from: &Path) -> Result<Option<Value>, PatchError> {
    if path == from {
        return Ok(None);
    }
    // A value cannot be moved into one of its own descendants
    if from.is_ancestor_of(path) {
        return Err(PatchError::InvalidTarget(path.clone()));
    }
    let value = apply_remove(doc, from)?;
    apply_add(doc, path, value)
}

fn apply_test(doc: &Value, path: &Path, value: &Value) -> Result<(), PatchError> {
    let actual = find(doc, path).map_err(|e| PatchError::from_pointer(e, path))?;
    if actual == value {
        Ok(())
    } else {
        Err(PatchError::Test(path.clone()))
    }
}

// ── Main apply functions ──────────────────────────────────────────────────

/// Apply a single operation to the document (in-place mutation).
///
/// Returns the value previously stored at the target path, if any.
pub fn apply_op(doc: &mut Value, op: &Op) -> Result<Option<Value>, PatchError> {
    match op {
        Op::Add { path, value } => apply_add(doc, path, value.clone()),
        Op::Remove { path } => apply_remove(doc, path).map(Some),
        Op::Replace { path, value } => apply_replace(doc, path, value.clone()).map(Some),
        Op::Copy { path, from } => apply_copy(doc, path, from),
        Op::Move { path, from } => apply_move(doc, path, from),
        Op::Test { path, value } => {
            apply_test(doc, path, value)?;
            Ok(None)
        }
    }
}

/// Apply operations in order, mutating `doc`.
///
/// Stops at the first failing operation; earlier operations stay applied.
/// Use [`apply_patch`] when the document must stay untouched on failure.
pub fn apply_ops(doc: &mut Value, ops: &[Op]) -> Result<(), PatchError> {
    for op in ops {
        apply_op(doc, op)?;
    }
    Ok(())
}

/// Apply operations to a copy of `doc` and return the result.
///
/// All-or-nothing: on error the caller's document is unchanged.
pub fn apply_patch(doc: &Value, ops: &[Op]) -> Result<Value, PatchError> {
    let mut working = doc.clone();
    apply_ops(&mut working, ops)?;
    Ok(working)
}

// ── Tests ─────────────────────────────────────────────────────────────────
