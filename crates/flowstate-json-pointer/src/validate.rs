//! Validation for pointer strings and paths.

use crate::{JsonPointerError, Path};

/// Maximum allowed pointer string length.
const MAX_POINTER_LENGTH: usize = 1024;

/// Maximum allowed path depth.
const MAX_PATH_LENGTH: usize = 256;

/// Validate a JSON Pointer string.
///
/// # Errors
///
/// Returns an error if:
/// - The pointer is non-empty but doesn't start with `/`
/// - The pointer exceeds the maximum length (1024 characters)
///
/// # Example
///
/// ```
/// use flowstate_json_pointer::validate_json_pointer;
///
/// validate_json_pointer("").unwrap();
/// validate_json_pointer("/audio/volume").unwrap();
/// validate_json_pointer("audio").unwrap_err();
/// ```
pub fn validate_json_pointer(pointer: &str) -> Result<(), JsonPointerError> {
    if pointer.is_empty() {
        return Ok(());
    }
    if !pointer.starts_with('/') {
        return Err(JsonPointerError::PointerInvalid);
    }
    if pointer.len() > MAX_POINTER_LENGTH {
        return Err(JsonPointerError::PointerTooLong);
    }
    Ok(())
}

/// Validate a path's depth.
///
/// # Errors
///
/// Returns [`JsonPointerError::PathTooLong`] past 256 steps.
pub fn validate_path(path: &Path) -> Result<(), JsonPointerError> {
    if path.len() > MAX_PATH_LENGTH {
        return Err(JsonPointerError::PathTooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_empty_pointer() {
        assert!(validate_json_pointer("").is_ok());
    }

    #[test]
    fn test_validate_absolute_pointer() {
        assert!(validate_json_pointer("/").is_ok());
        assert!(validate_json_pointer("/foo/bar").is_ok());
    }

    #[test]
    fn test_validate_relative_pointer() {
        assert_eq!(validate_json_pointer("foo"), Err(JsonPointerError::PointerInvalid));
    }

    #[test]
    fn test_validate_long_pointer() {
        let long_pointer = "/".to_string() + &"a".repeat(2000);
        assert_eq!(validate_json_pointer(&long_pointer), Err(JsonPointerError::PointerTooLong));
    }

    #[test]
    fn test_validate_path_depth() {
        let ok = Path::from_steps((0..256).map(|i| i.to_string()));
        assert!(validate_path(&ok).is_ok());
        let deep = Path::from_steps((0..300).map(|i| i.to_string()));
        assert_eq!(validate_path(&deep), Err(JsonPointerError::PathTooLong));
    }
}
