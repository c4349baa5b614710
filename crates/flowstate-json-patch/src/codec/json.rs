//! JSON codec for patch operations.
//!
//! Converts operations to/from `serde_json::Value` in the RFC 6902 format.

use serde_json::{json, Map, Value};

use crate::types::{Op, OpType, PatchError, Path};

// ── Path helpers ──────────────────────────────────────────────────────────

fn encode_path(path: &Path) -> Value {
    Value::String(path.to_pointer())
}

fn decode_path(v: &Value, key: &str) -> Result<Path, PatchError> {
    let s = v
        .as_str()
        .ok_or_else(|| PatchError::InvalidOp(format!("'{key}' must be a string")))?;
    Path::parse_unlimited(s).map_err(|e| PatchError::InvalidOp(format!("'{key}': {e}")))
}

fn required_path(obj: &Map<String, Value>, key: &str, op: OpType) -> Result<Path, PatchError> {
    let v = obj
        .get(key)
        .ok_or_else(|| PatchError::InvalidOp(format!("{} requires '{key}'", op.as_str())))?;
    decode_path(v, key)
}

fn required_value(obj: &Map<String, Value>, op: OpType) -> Result<Value, PatchError> {
    obj.get("value")
        .cloned()
        .ok_or_else(|| PatchError::InvalidOp(format!("{} requires 'value'", op.as_str())))
}

// ── Serialization ─────────────────────────────────────────────────────────

/// Serialize an `Op` to a `serde_json::Value` in the JSON Patch format.
pub fn to_json(op: &Op) -> Value {
    match op {
        Op::Add { path, value } => json!({
            "op": "add",
            "path": encode_path(path),
            "value": value
        }),
        Op::Remove { path } => json!({ "op": "remove", "path": encode_path(path) }),
        Op::Replace { path, value } => json!({
            "op": "replace",
            "path": encode_path(path),
            "value": value
        }),
        Op::Copy { path, from } => json!({
            "op": "copy",
            "path": encode_path(path),
            "from": encode_path(from)
        }),
        Op::Move { path, from } => json!({
            "op": "move",
            "path": encode_path(path),
            "from": encode_path(from)
        }),
        Op::Test { path, value } => json!({
            "op": "test",
            "path": encode_path(path),
            "value": value
        }),
    }
}

// ── Deserialization ───────────────────────────────────────────────────────

/// Deserialize a single operation from its JSON Patch form.
///
/// # Errors
///
/// [`PatchError::InvalidOp`] for a non-object, an unknown `op`, a missing
/// member, or a malformed pointer.
pub fn from_json(v: &Value) -> Result<Op, PatchError> {
    let obj = v
        .as_object()
        .ok_or_else(|| PatchError::InvalidOp("operation must be an object".into()))?;
    let op_str = obj
        .get("op")
        .and_then(|v| v.as_str())
        .ok_or_else(|| PatchError::InvalidOp("missing 'op' field".into()))?;
    let op_type = OpType::from_str(op_str)?;
    let path = required_path(obj, "path", op_type)?;

    match op_type {
        OpType::Add => Ok(Op::Add { path, value: required_value(obj, op_type)? }),
        OpType::Remove => Ok(Op::Remove { path }),
        OpType::Replace => Ok(Op::Replace { path, value: required_value(obj, op_type)? }),
        OpType::Copy => Ok(Op::Copy { path, from: required_path(obj, "from", op_type)? }),
        OpType::Move => Ok(Op::Move { path, from: required_path(obj, "from", op_type)? }),
        OpType::Test => Ok(Op::Test { path, value: required_value(obj, op_type)? }),
    }
}

/// Serialize a list of operations to a JSON array.
pub fn to_json_patch(ops: &[Op]) -> Value {
    Value::Array(ops.iter().map(to_json).collect())
}

/// Deserialize a JSON array into a list of operations.
pub fn from_json_patch(v: &Value) -> Result<Vec<Op>, PatchError> {
    let arr = v
        .as_array()
        .ok_or_else(|| PatchError::InvalidOp("patch must be an array".into()))?;
    arr.iter().map(from_json).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Path {
        s.parse().unwrap()
    }

    #[test]
    fn encodes_rfc6902_members() {
        let op = Op::Move { path: p("/b"), from: p("/a~1x") };
        assert_eq!(to_json(&op), json!({"op": "move", "path": "/b", "from": "/a~1x"}));
        let op = Op::Replace { path: Path::root(), value: json!({}) };
        assert_eq!(to_json(&op), json!({"op": "replace", "path": "", "value": {}}));
    }

    #[test]
    fn decodes_every_op() {
        let patch = json!([
            {"op": "add", "path": "/a", "value": 1},
            {"op": "remove", "path": "/a"},
            {"op": "replace", "path": "/b", "value": null},
            {"op": "copy", "path": "/c", "from": "/b"},
            {"op": "move", "path": "/d", "from": "/c"},
            {"op": "test", "path": "/d", "value": null}
        ]);
        let ops = from_json_patch(&patch).unwrap();
        assert_eq!(ops.len(), 6);
        assert_eq!(ops[2], Op::Replace { path: p("/b"), value: Value::Null });
        assert_eq!(ops[4], Op::Move { path: p("/d"), from: p("/c") });
        assert_eq!(to_json_patch(&ops), patch);
    }

    #[test]
    fn rejects_malformed_ops() {
        assert!(from_json(&json!("add")).is_err());
        assert!(from_json(&json!({"path": "/a"})).is_err());
        assert!(from_json(&json!({"op": "flip", "path": "/a"})).is_err());
        assert!(from_json(&json!({"op": "add", "path": "/a"})).is_err());
        assert!(from_json(&json!({"op": "remove"})).is_err());
        assert!(from_json(&json!({"op": "remove", "path": "a"})).is_err());
        assert!(from_json(&json!({"op": "copy", "path": "/a"})).is_err());
        assert!(from_json_patch(&json!({})).is_err());
    }

    #[test]
    fn decodes_paths_past_pointer_limits() {
        let key = "k".repeat(1100);
        let op = Op::Add { path: Path::root().child("audio").child(key.as_str()), value: json!(1) };
        assert_eq!(from_json(&to_json(&op)).unwrap(), op);
    }
}
