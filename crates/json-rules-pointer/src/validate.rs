//! Validation functions for pointer paths.

use crate::PointerError;

/// Maximum allowed pointer string length.
pub const MAX_POINTER_LENGTH: usize = 1024;

/// Maximum allowed path depth.
pub const MAX_PATH_LENGTH: usize = 256;

/// Validate a pointer string before tokenizing it.
///
/// # Errors
///
/// - the pointer exceeds [`MAX_POINTER_LENGTH`] characters
/// - a `~` is not followed by `0` or `1`
///
/// ```
/// use json_rules_pointer::validate_pointer;
///
/// validate_pointer("").unwrap();
/// validate_pointer("/foo/a~1b").unwrap();
/// validate_pointer("relative/../x").unwrap();
/// validate_pointer("/foo~").unwrap_err();
/// ```
pub fn validate_pointer(pointer: &str) -> Result<(), PointerError> {
    if pointer.len() > MAX_POINTER_LENGTH {
        return Err(PointerError::PointerTooLong);
    }
    let mut chars = pointer.chars();
    while let Some(c) = chars.next() {
        if c == '~' && !matches!(chars.next(), Some('0') | Some('1')) {
            return Err(PointerError::InvalidEscape(pointer.to_string()));
        }
    }
    Ok(())
}

/// Validate a tokenized path.
///
/// # Errors
///
/// Returns an error if the path exceeds [`MAX_PATH_LENGTH`] steps.
pub fn validate_path(path: &[String]) -> Result<(), PointerError> {
    if path.len() > MAX_PATH_LENGTH {
        return Err(PointerError::PathTooLong);
    }
    Ok(())
}
