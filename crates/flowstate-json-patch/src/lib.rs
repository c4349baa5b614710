//! JSON Patch (RFC 6902) for flowstate documents.
//!
//! # Operations
//!
//! The six standard operations are supported:
//! `add`, `remove`, `replace`, `copy`, `move`, `test`.
//!
//! [`diff`] produces a patch between two documents; [`apply_patch`] applies
//! one without touching the input; the [`codec::json`] module converts
//! patches to and from their JSON form.

pub mod types;
pub mod apply;
pub mod diff;
pub mod codec;

pub use types::{Op, OpType, Patch, PatchError, Path};
pub use apply::{apply_op, apply_ops, apply_patch};
pub use diff::diff;
pub use codec::json::{from_json, from_json_patch, to_json, to_json_patch};
