//! Shared proptest strategies for unit tests.

use proptest::prelude::*;

/// Arbitrary strings, including whitespace, control and multi-byte characters.
pub(crate) fn arb_any_name(max_len: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<char>(), 0..=max_len).prop_map(|chars| chars.into_iter().collect())
}

/// Strings built only from the normalized alphabet.
pub(crate) fn arb_permitted_name(max_len: usize) -> impl Strategy<Value = String> {
    prop::string::string_regex(&format!("[A-Za-z0-9,.@_-]{{0,{max_len}}}"))
        .expect("valid regex")
}

/// Short display or policy names typical of real requests.
pub(crate) fn arb_short_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9_-]{1,12}").expect("valid regex")
}
