//! The structured [`Path`] type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{format_json_pointer, parse_json_pointer, validate_json_pointer, validate_path, JsonPointerError};

/// A single step in a [`Path`]: an object key or a decimal array index.
pub type PathStep = String;

/// An address into a document tree.
///
/// Steps are stored unescaped; the RFC 6901 escaping only exists in the
/// textual form produced by [`Path::to_pointer`] and `Display`.
///
/// # Example
///
/// ```
/// use flowstate_json_pointer::Path;
///
/// let volume = Path::root().child("audio").child("volume");
/// assert_eq!(volume.to_pointer(), "/audio/volume");
/// assert_eq!(volume.parent(), Some(Path::root().child("audio")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path(Vec<PathStep>);

impl Path {
    /// The empty path, addressing the whole document.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_steps<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathStep>,
    {
        Self(steps.into_iter().map(Into::into).collect())
    }

    /// Parse a JSON Pointer string.
    ///
    /// # Errors
    ///
    /// Fails when the pointer is non-empty and lacks the leading `/`, or
    /// exceeds the length or depth limits.
    pub fn parse(pointer: &str) -> Result<Self, JsonPointerError> {
        validate_json_pointer(pointer)?;
        let path = Self(parse_json_pointer(pointer));
        validate_path(&path)?;
        Ok(path)
    }

    /// Parse a pointer without the length and depth limits.
    ///
    /// For pointers this crate wrote itself, such as stored patches, where
    /// a path built with [`Path::child`] may exceed the limits.
    ///
    /// # Errors
    ///
    /// Fails only when the pointer is non-empty and lacks the leading `/`.
    pub fn parse_unlimited(pointer: &str) -> Result<Self, JsonPointerError> {
        if !pointer.is_empty() && !pointer.starts_with('/') {
            return Err(JsonPointerError::PointerInvalid);
        }
        Ok(Self(parse_json_pointer(pointer)))
    }

    /// Returns a new path with `step` appended.
    pub fn child(&self, step: impl Into<PathStep>) -> Self {
        let mut steps = self.0.clone();
        steps.push(step.into());
        Self(steps)
    }

    /// Returns a new path with an array index appended.
    pub fn index(&self, index: usize) -> Self {
        self.child(index.to_string())
    }

    /// The containing path, or `None` for the root.
    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// The parent path, or the root itself when this is the root.
    pub fn parent_or_root(&self) -> Path {
        self.parent().unwrap_or_default()
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `self` is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    /// True when `other` equals `self` or lies beneath it.
    pub fn contains(&self, other: &Path) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Split into the parent path and the final step.
    pub fn split_last(&self) -> Option<(Path, &str)> {
        let (last, init) = self.0.split_last()?;
        Some((Self(init.to_vec()), last.as_str()))
    }

    /// The RFC 6901 text form. The root is the empty string.
    pub fn to_pointer(&self) -> String {
        format_json_pointer(&self.0)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pointer())
    }
}

impl FromStr for Path {
    type Err = JsonPointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl From<Vec<PathStep>> for Path {
    fn from(steps: Vec<PathStep>) -> Self {
        Self(steps)
    }
}

impl AsRef<[PathStep]> for Path {
    fn as_ref(&self) -> &[PathStep] {
        &self.0
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_pointer())
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pointer = String::deserialize(deserializer)?;
        Path::parse_unlimited(&pointer).map_err(serde::de::Error::custom)
    }
}
