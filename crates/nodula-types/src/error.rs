//! Shared error conventions.
//!
//! Every nodula error enum implements [`ErrorCode`] so callers can branch on
//! a stable, machine-readable code instead of matching display strings.
//!
//! # Code Format
//!
//! - UPPER_SNAKE_CASE
//! - Prefixed with the owning layer (`PRIORITY_`, `EVENT_`)
//! - Stable once published
//!
//! # Example
//!
//! ```
//! use nodula_types::{ErrorCode, PriorityError};
//!
//! let err = PriorityError::NameConflict("UI".into());
//! assert_eq!(err.code(), "PRIORITY_NAME_CONFLICT");
//! assert!(!err.is_recoverable());
//! ```

/// Machine-readable error code interface.
pub trait ErrorCode {
    /// Returns the stable error code.
    fn code(&self) -> &'static str;

    /// Returns whether retrying the operation could succeed.
    ///
    /// Naming conflicts and unknown references are programming errors
    /// and never recover on retry.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code is non-empty, UPPER_SNAKE_CASE and carries
/// the expected prefix.
///
/// # Panics
///
/// Panics with a descriptive message if any check fails.
///
/// # Example
///
/// ```
/// use nodula_types::{assert_error_code, PriorityError};
///
/// assert_error_code(&PriorityError::UnknownBlock("X".into()), "PRIORITY_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "Error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );
    assert!(
        is_upper_snake_case(code),
        "Error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Runs [`assert_error_code`] over every given error.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
