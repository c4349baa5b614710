//! Structured document paths.
//!
//! A [`Path`] is an ordered list of object keys / array indices addressing a
//! node inside a `serde_json::Value` tree. Its text form is a
//! [JSON Pointer (RFC 6901)](https://tools.ietf.org/html/rfc6901).
//!
//! # Example
//!
//! ```
//! use flowstate_json_pointer::{get, Path};
//! use serde_json::json;
//!
//! let doc = json!({"audio": {"volume": 0.8}});
//! let path: Path = "/audio/volume".parse().unwrap();
//! assert_eq!(get(&doc, &path), Some(&json!(0.8)));
//! ```

use serde_json::Value;
use thiserror::Error;

pub mod types;
pub use types::{Path, PathStep};

pub mod validate;
pub use validate::{validate_json_pointer, validate_path};

/// Decode one pointer segment: `~1` becomes `/`, then `~0` becomes `~`.
///
/// ```
/// use flowstate_json_pointer::unescape_component;
///
/// assert_eq!(unescape_component("io~1out"), "io/out");
/// assert_eq!(unescape_component("~01"), "~1");
/// ```
pub fn unescape_component(component: &str) -> String {
    match component.find('~') {
        None => component.to_owned(),
        Some(_) => component.replace("~1", "/").replace("~0", "~"),
    }
}

/// Encode one step as a pointer segment, the inverse of [`unescape_component`].
pub fn escape_component(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for ch in component.chars() {
        match ch {
            '~' => out.push_str("~0"),
            '/' => out.push_str("~1"),
            _ => out.push(ch),
        }
    }
    out
}

/// Split a JSON Pointer string into unescaped steps.
///
/// Text without the leading `/`, the empty root pointer included, yields no
/// steps. No validation happens here; use [`Path::parse`] for checked parsing.
pub fn parse_json_pointer(pointer: &str) -> Vec<PathStep> {
    match pointer.strip_prefix('/') {
        Some(rest) => rest.split('/').map(unescape_component).collect(),
        None => Vec::new(),
    }
}

/// Join steps into a JSON Pointer string.
pub fn format_json_pointer(steps: &[PathStep]) -> String {
    steps.iter().fold(String::new(), |mut out, step| {
        out.push('/');
        out.push_str(&escape_component(step));
        out
    })
}

/// True for canonical decimal indices: digits only, no leading zero.
///
/// ```
/// use flowstate_json_pointer::is_valid_index;
///
/// assert!(is_valid_index("0") && is_valid_index("42"));
/// assert!(!is_valid_index("042") && !is_valid_index("-") && !is_valid_index(""));
/// ```
pub fn is_valid_index(step: &str) -> bool {
    match step.as_bytes() {
        [] => false,
        [b'0'] => true,
        [b'0', ..] => false,
        digits => digits.iter().all(u8::is_ascii_digit),
    }
}

/// Parse an array index step.
///
/// # Errors
///
/// [`JsonPointerError::InvalidIndex`] when the step is not a canonical
/// decimal index.
pub fn parse_index(step: &str) -> Result<usize, JsonPointerError> {
    if !is_valid_index(step) {
        return Err(JsonPointerError::InvalidIndex);
    }
    step.parse().map_err(|_| JsonPointerError::InvalidIndex)
}

/// Get a value from a document by path.
///
/// Returns `None` if the path doesn't exist or is invalid.
pub fn get<'a>(val: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut current = val;
    for step in path.steps() {
        current = match current {
            Value::Array(arr) => arr.get(parse_index(step).ok()?)?,
            Value::Object(map) => map.get(step)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Get a mutable reference to a value in a document by path.
pub fn get_mut<'a>(val: &'a mut Value, path: &Path) -> Option<&'a mut Value> {
    let mut current = val;
    for step in path.steps() {
        current = match current {
            Value::Array(arr) => arr.get_mut(parse_index(step).ok()?)?,
            Value::Object(map) => map.get_mut(step)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Find a value by path, distinguishing why a lookup failed.
///
/// # Errors
///
/// - `NotFound` when a step is missing or traverses a scalar
/// - `InvalidIndex` when an array step is not a valid index
pub fn find<'a>(val: &'a Value, path: &Path) -> Result<&'a Value, JsonPointerError> {
    let mut current = val;
    for step in path.steps() {
        current = match current {
            Value::Array(arr) => arr.get(parse_index(step)?).ok_or(JsonPointerError::NotFound)?,
            Value::Object(map) => map.get(step).ok_or(JsonPointerError::NotFound)?,
            _ => return Err(JsonPointerError::NotFound),
        };
    }
    Ok(current)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonPointerError {
    #[error("NOT_FOUND")]
    NotFound,
    #[error("INVALID_INDEX")]
    InvalidIndex,
    #[error("POINTER_INVALID")]
    PointerInvalid,
    #[error("POINTER_TOO_LONG")]
    PointerTooLong,
    #[error("PATH_TOO_LONG")]
    PathTooLong,
}
