use std::fmt;

use crate::principal::NameClass;

/// Returned when a rendered name is longer than its class allows.
///
/// Names are never shortened to fit: exceeding the limit always fails.
///
/// # Examples
///
/// ```
/// use principal_naming::{validate_length, NameClass};
///
/// let err = validate_length(&"x".repeat(33), NameClass::Sts).unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "the username generated by the template exceeds the STS username length limits of 32 chars"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthExceeded {
    class: NameClass,
    actual: usize,
}

impl LengthExceeded {
    /// Naming class whose limit was exceeded.
    pub fn class(&self) -> NameClass {
        self.class
    }

    /// The limit that applied.
    pub fn limit(&self) -> usize {
        self.class.limit()
    }

    /// Length of the rejected name.
    pub fn actual(&self) -> usize {
        self.actual
    }
}

impl fmt::Display for LengthExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "the username generated by the template exceeds the {} username length limits of {} chars",
            self.class,
            self.limit()
        )
    }
}

impl std::error::Error for LengthExceeded {}

/// Checks `name` against the limit for `class`.
///
/// Length is counted in bytes, which equals the character count for the
/// ASCII alphabet provider names are built from.
///
/// # Errors
///
/// Returns [`LengthExceeded`] when `name` is longer than `class.limit()`.
pub fn validate_length(name: &str, class: NameClass) -> Result<(), LengthExceeded> {
    if name.len() > class.limit() {
        return Err(LengthExceeded {
            class,
            actual: name.len(),
        });
    }
    Ok(())
}
