//! Display-name normalization.
//!
//! Caller-supplied display names may contain anything. Before they are
//! embedded in a generated principal name every character outside
//! `[A-Za-z0-9-_,.@]` is replaced by a single `_`.
//!
//! The mapping is one-to-one: runs of disallowed characters are NOT collapsed,
//! so the output always has the same number of characters as the input.

use std::convert::Infallible;

use crate::{Tainted, Verified};

/// Returns `true` if `c` may appear in a normalized name.
pub fn is_permitted(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ',' | '.' | '@')
}

/// Replaces every character outside `[A-Za-z0-9-_,.@]` with `_`.
///
/// Total function: already-valid input comes back unchanged and the result
/// has exactly as many characters as `input`.
///
/// # Examples
///
/// ```
/// use principal_naming::normalize_display_name;
///
/// assert_eq!(
///     normalize_display_name("^#$test name\nshould be normalized)(*"),
///     "___test_name_should_be_normalized___"
/// );
/// assert_eq!(normalize_display_name("ops@example.com"), "ops@example.com");
/// ```
pub fn normalize_display_name(input: &str) -> String {
    input
        .chars()
        .map(|c| if is_permitted(c) { c } else { '_' })
        .collect()
}

/// Trait for turning caller-supplied values into values safe to embed in a name.
///
/// Implementations MUST only call `Verified::new_unchecked` on output that
/// satisfies their rules.
pub trait Sanitizer<T> {
    /// Why sanitization can fail. Normalizers that never fail use [`Infallible`].
    type Error;

    /// Sanitizes a tainted value, returning a verified value on success.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` if the input cannot be made safe.
    fn sanitize(&self, input: Tainted<T>) -> Result<Verified<T>, Self::Error>;
}

/// Normalizes display and policy names into the template-safe alphabet.
///
/// # Examples
///
/// ```
/// use principal_naming::{DisplayNameNormalizer, Sanitizer, Tainted};
///
/// let verified = DisplayNameNormalizer
///     .sanitize(Tainted::new("token-ci runner".to_string()))
///     .unwrap_or_else(|never| match never {});
/// assert_eq!(verified.as_str(), "token-ci_runner");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayNameNormalizer;

impl DisplayNameNormalizer {
    /// Normalizes `input`; never fails.
    pub fn normalize(&self, input: Tainted<String>) -> Verified<String> {
        let raw = input.into_inner();
        let normalized = normalize_display_name(&raw);

        if normalized != raw {
            tracing::trace!(chars = raw.chars().count(), "display name normalized");
        }

        Verified::new_unchecked(normalized)
    }
}

impl Sanitizer<String> for DisplayNameNormalizer {
    type Error = Infallible;

    fn sanitize(&self, input: Tainted<String>) -> Result<Verified<String>, Self::Error> {
        Ok(self.normalize(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_required() {
        let cases = [
            (
                "^#$test name\nshould be normalized)(*",
                "___test_name_should_be_normalized___",
            ),
            (
                "^#$test name1 should be normalized)(*",
                "___test_name1_should_be_normalized___",
            ),
            (
                "^#$test name  should be normalized)(*",
                "___test_name__should_be_normalized___",
            ),
            (
                "^#$test name__should be normalized)(*",
                "___test_name__should_be_normalized___",
            ),
        ];

        for (input, expected) in cases {
            assert_eq!(normalize_display_name(input), expected, "input: {input:?}");
        }
    }

    #[test]
    fn normalization_not_required() {
        let valid = [
            "test_name_should_normalize_to_itself@example.com",
            "test1_name_should_normalize_to_itself@example.com",
            "UPPERlower0123456789-_,.@example.com",
        ];

        for name in valid {
            assert_eq!(normalize_display_name(name), name);
        }
    }

    #[test]
    fn consecutive_disallowed_chars_are_not_collapsed() {
        assert_eq!(normalize_display_name("a   b"), "a___b");
        assert_eq!(normalize_display_name("!!!"), "___");
    }

    #[test]
    fn multibyte_chars_map_to_one_underscore_each() {
        assert_eq!(normalize_display_name("José 世界"), "Jos____");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize_display_name(""), "");
    }

    #[test]
    fn sanitizer_wraps_normalized_value() {
        let verified = DisplayNameNormalizer
            .sanitize(Tainted::new("dev team/alpha".to_string()))
            .unwrap_or_else(|never| match never {});

        assert_eq!(verified.as_str(), "dev_team_alpha");
    }

    mod proptests {
        use super::*;
        use crate::test_utils::{arb_any_name, arb_permitted_name};
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn proptest_normalize_preserves_char_count(input in arb_any_name(128)) {
                let output = normalize_display_name(&input);
                prop_assert_eq!(output.chars().count(), input.chars().count());
            }

            #[test]
            fn proptest_normalize_is_identity_on_permitted(input in arb_permitted_name(128)) {
                prop_assert_eq!(normalize_display_name(&input), input);
            }

            #[test]
            fn proptest_normalize_output_is_permitted(input in arb_any_name(128)) {
                let output = normalize_display_name(&input);
                prop_assert!(output.chars().all(is_permitted), "output: {:?}", output);
            }

            #[test]
            fn proptest_normalize_is_idempotent(input in arb_any_name(128)) {
                let once = normalize_display_name(&input);
                prop_assert_eq!(normalize_display_name(&once), once);
            }
        }
    }
}
