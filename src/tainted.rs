use std::fmt;

/// A caller-supplied string that has not been normalized yet.
///
/// Display names and policy names arrive from request callers and may hold
/// any character at all. `Tainted<T>` keeps them out of the name generator
/// until a [`Sanitizer`](crate::Sanitizer) has mapped them onto the permitted
/// alphabet.
///
/// # Examples
///
/// ```
/// use principal_naming::Tainted;
///
/// let display_name = Tainted::new("alice smith (ops)".to_string());
///
/// // Debug output shows it's tainted
/// println!("{:?}", display_name);
///
/// // The raw value is not reachable from outside the crate:
/// // let raw: String = display_name.into_inner();
/// ```
// BREAKING CHANGE WARNING: Do NOT remove Clone - a request may embed the same name twice.
#[derive(Clone)]
pub struct Tainted<T> {
    // BREAKING CHANGE WARNING: This field MUST remain private.
    // External code must go through the Sanitizer trait to reach the value.
    inner: T,
}

impl<T> Tainted<T> {
    /// Wraps an untrusted value in `Tainted`.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Extracts the inner value for normalization.
    ///
    /// Only sanitizer implementations inside this crate call this, right
    /// before wrapping the result in `Verified<T>`.
    pub(crate) fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: fmt::Debug> fmt::Debug for Tainted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tainted")
            .field("inner", &self.inner)
            .finish()
    }
}

impl From<&str> for Tainted<String> {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}
