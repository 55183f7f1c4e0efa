/// A string that has been normalized and may be embedded in a generated name.
///
/// `Verified<T>` cannot be built by external code. The only way to obtain
/// one is through a [`Sanitizer`](crate::Sanitizer), which guarantees every
/// character is in the template-safe alphabet.
///
/// # Examples
///
/// ```compile_fail
/// use principal_naming::Verified;
///
/// // This will not compile - no public constructor:
/// let verified = Verified::new("data".to_string());
/// ```
///
/// ```
/// use principal_naming::{DisplayNameNormalizer, Tainted};
///
/// let verified = DisplayNameNormalizer.normalize(Tainted::new("a b".to_string()));
/// assert_eq!(verified.as_str(), "a_b");
/// assert_eq!(verified.into_inner(), "a_b");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified<T> {
    inner: T,
}

impl<T> Verified<T> {
    /// Creates a `Verified<T>` without performing validation.
    ///
    /// Callers inside the crate are responsible for normalizing the value first.
    pub(crate) fn new_unchecked(value: T) -> Self {
        Self { inner: value }
    }

    /// Consumes the `Verified<T>` and returns the inner value.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl Verified<String> {
    /// Borrows the verified string.
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl<T> AsRef<T> for Verified<T> {
    fn as_ref(&self) -> &T {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verified_as_ref_does_not_consume() {
        let verified = Verified::new_unchecked("policy1".to_string());

        let ref1: &String = verified.as_ref();
        let ref2: &String = verified.as_ref();
        assert_eq!(ref1, ref2);

        assert_eq!(verified.into_inner(), "policy1");
    }

    #[test]
    fn verified_derives_work() {
        let v1 = Verified::new_unchecked("name1".to_string());
        let v2 = v1.clone();

        assert_eq!(v1, v2);
        assert!(format!("{:?}", v1).contains("Verified"));
    }
}
