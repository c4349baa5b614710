//! Core types for patches.

use serde_json::Value;
use thiserror::Error;

pub use flowstate_json_pointer::Path;
use flowstate_json_pointer::JsonPointerError;

// ── Error ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    #[error("NOT_FOUND: {0}")]
    NotFound(Path),
    #[error("TEST: {0}")]
    Test(Path),
    #[error("INVALID_INDEX: {0}")]
    InvalidIndex(Path),
    #[error("INVALID_TARGET: {0}")]
    InvalidTarget(Path),
    #[error("INVALID_OP: {0}")]
    InvalidOp(String),
}

impl PatchError {
    pub(crate) fn from_pointer(err: JsonPointerError, path: &Path) -> Self {
        match err {
            JsonPointerError::InvalidIndex => PatchError::InvalidIndex(path.clone()),
            JsonPointerError::NotFound => PatchError::NotFound(path.clone()),
            other => PatchError::InvalidOp(other.to_string()),
        }
    }
}

// ── Op enum ───────────────────────────────────────────────────────────────

/// A single patch operation (RFC 6902).
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Add { path: Path, value: Value },
    Remove { path: Path },
    Replace { path: Path, value: Value },
    Copy { path: Path, from: Path },
    Move { path: Path, from: Path },
    Test { path: Path, value: Value },
}

/// An ordered list of operations.
pub type Patch = Vec<Op>;

/// Fieldless mirror of [`Op`] for matching and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpType {
    Add,
    Remove,
    Replace,
    Copy,
    Move,
    Test,
}

impl OpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpType::Add => "add",
            OpType::Remove => "remove",
            OpType::Replace => "replace",
            OpType::Copy => "copy",
            OpType::Move => "move",
            OpType::Test => "test",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, PatchError> {
        match s {
            "add" => Ok(OpType::Add),
            "remove" => Ok(OpType::Remove),
            "replace" => Ok(OpType::Replace),
            "copy" => Ok(OpType::Copy),
            "move" => Ok(OpType::Move),
            "test" => Ok(OpType::Test),
            other => Err(PatchError::InvalidOp(format!("unknown op: {other}"))),
        }
    }
}

impl Op {
    pub fn op_type(&self) -> OpType {
        match self {
            Op::Add { .. } => OpType::Add,
            Op::Remove { .. } => OpType::Remove,
            Op::Replace { .. } => OpType::Replace,
            Op::Copy { .. } => OpType::Copy,
            Op::Move { .. } => OpType::Move,
            Op::Test { .. } => OpType::Test,
        }
    }

    /// Returns the operation name string as used in the JSON form.
    pub fn op_name(&self) -> &'static str {
        self.op_type().as_str()
    }

    /// Returns the target path of the operation.
    pub fn path(&self) -> &Path {
        match self {
            Op::Add { path, .. }
            | Op::Remove { path }
            | Op::Replace { path, .. }
            | Op::Copy { path, .. }
            | Op::Move { path, .. }
            | Op::Test { path, .. } => path,
        }
    }

    /// Returns the source path for `copy` / `move`.
    pub fn from(&self) -> Option<&Path> {
        match self {
            Op::Copy { from, .. } | Op::Move { from, .. } => Some(from),
            _ => None,
        }
    }

    /// Returns the carried value for `add` / `replace` / `test`.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Op::Add { value, .. } | Op::Replace { value, .. } | Op::Test { value, .. } => Some(value),
            _ => None,
        }
    }

    /// The path whose value this operation changes.
    ///
    /// Operations that insert or delete a member change the containing
    /// object/array, so `add`, `remove`, `copy` and `move` report the parent
    /// of their target path. `replace` and `test` report the target itself.
    pub fn changed_path(&self) -> Path {
        match self {
            Op::Add { path, .. } | Op::Remove { path } | Op::Copy { path, .. } | Op::Move { path, .. } => {
                path.parent_or_root()
            }
            Op::Replace { path, .. } | Op::Test { path, .. } => path.clone(),
        }
    }
}
