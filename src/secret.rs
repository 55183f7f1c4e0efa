use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A wrapper that keeps the backend's root credential out of logs.
///
/// The configuration store holds the password used to reach the cloud
/// provider. `Secret<T>` makes sure it never shows up in Debug or Display
/// output, including the `tracing` events emitted by this crate. The value is
/// only reachable through [`expose_secret`](Self::expose_secret).
///
/// Serialization writes the real value: the storage collaborator is the one
/// place the credential has to survive.
///
/// # Examples
///
/// ```
/// use principal_naming::Secret;
///
/// let password = Secret::new("guest".to_string());
///
/// println!("{:?}", password); // Prints: [REDACTED]
/// assert_eq!(password.to_string(), "[REDACTED]");
/// assert_eq!(password.expose_secret(), "guest");
/// ```
///
/// Secrets cannot be compared without exposing them first:
///
/// ```compile_fail
/// use principal_naming::Secret;
///
/// let a = Secret::new("guest".to_string());
/// let b = Secret::new("guest".to_string());
/// let _ = a == b;
/// ```
// BREAKING CHANGE WARNING: Do NOT add Clone, Copy, Default, or PartialEq.
pub struct Secret<T> {
    // BREAKING CHANGE WARNING: This field MUST remain private (CWE-532).
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps a sensitive value in a `Secret`.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Explicitly exposes the secret value.
    ///
    /// # Security Warning
    ///
    /// The verbose name is intentional. Do not log or display the result.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T: Serialize> Serialize for Secret<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inner.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Secret<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Secret::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_redacts_debug() {
        let password = Secret::new("hunter2".to_string());
        let debug_output = format!("{:?}", password);

        assert_eq!(debug_output, "[REDACTED]");
        assert!(!debug_output.contains("hunter2"));
        assert!(!debug_output.contains("String"));
    }

    #[test]
    fn secret_redacts_display() {
        let password = Secret::new("guest");
        assert_eq!(format!("{}", password), "[REDACTED]");
    }

    #[test]
    fn secret_redacted_inside_containing_struct() {
        #[derive(Debug)]
        struct Root {
            #[allow(dead_code)]
            username: String,
            #[allow(dead_code)]
            password: Secret<String>,
        }

        let root = Root {
            username: "guest".to_string(),
            password: Secret::new("s3cr3t".to_string()),
        };

        let output = format!("{:?}", root);
        assert!(output.contains("guest"));
        assert!(!output.contains("s3cr3t"));
    }

    #[test]
    fn secret_serializes_real_value() {
        let password = Secret::new("guest".to_string());

        let json = serde_json::to_string(&password).expect("serializes");
        assert_eq!(json, "\"guest\"");

        let back: Secret<String> = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back.expose_secret(), password.expose_secret());
    }
}
