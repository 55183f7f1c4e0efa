//! Key-value storage the configuration store persists through.
//!
//! The real storage engine belongs to the host. This crate only needs
//! get/put/delete by key; atomicity and concurrent-writer semantics are
//! whatever the implementation provides.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Error raised by a storage implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageError {
    kind: StorageErrorKind,
    message: String,
}

impl StorageError {
    /// Creates a new storage error.
    pub fn new(kind: StorageErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> StorageErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "storage error ({}): {}", self.kind, self.message)
    }
}

impl std::error::Error for StorageError {}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::new(StorageErrorKind::Serialization, err.to_string())
    }
}

/// Kind of storage error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// The backing store failed to read or write.
    Io,
    /// A stored value could not be encoded or decoded.
    Serialization,
}

impl fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "I/O error"),
            Self::Serialization => write!(f, "serialization error"),
        }
    }
}

/// A stored value and the key it lives under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    /// Storage key.
    pub key: String,
    /// Raw stored bytes.
    pub value: Vec<u8>,
}

impl StorageEntry {
    /// Encodes `value` as JSON under `key`.
    ///
    /// # Errors
    ///
    /// Returns a `Serialization` error if `value` cannot be encoded.
    pub fn json<T: Serialize>(key: impl Into<String>, value: &T) -> Result<Self, StorageError> {
        Ok(Self {
            key: key.into(),
            value: serde_json::to_vec(value)?,
        })
    }

    /// Decodes the stored JSON.
    ///
    /// # Errors
    ///
    /// Returns a `Serialization` error if the bytes are not valid JSON for `T`.
    pub fn decode_json<T: DeserializeOwned>(&self) -> Result<T, StorageError> {
        Ok(serde_json::from_slice(&self.value)?)
    }
}

/// Get/put/delete by key.
pub trait Storage: Send + Sync {
    /// Returns the entry stored under `key`, or `None`.
    fn get(&self, key: &str) -> Result<Option<StorageEntry>, StorageError>;

    /// Stores `entry`, replacing any previous value under the same key.
    fn put(&self, entry: StorageEntry) -> Result<(), StorageError>;

    /// Removes the entry under `key`. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<StorageEntry>, StorageError> {
        (**self).get(key)
    }

    fn put(&self, entry: StorageEntry) -> Result<(), StorageError> {
        (**self).put(entry)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        (**self).delete(key)
    }
}

/// In-memory storage, last writer wins.
///
/// Suitable for tests and for hosts that keep configuration in process.
///
/// # Examples
///
/// ```
/// use principal_naming::{InMemoryStorage, Storage, StorageEntry};
///
/// let storage = InMemoryStorage::new();
/// storage.put(StorageEntry { key: "k".into(), value: b"v".to_vec() }).unwrap();
/// assert_eq!(storage.get("k").unwrap().unwrap().value, b"v");
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    ///
    /// Unlike the [`Storage`] methods, this still answers after a writer
    /// panicked while holding the lock.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored keys in order. Like [`len`](Self::len), ignores lock poisoning.
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

fn poisoned() -> StorageError {
    StorageError::new(StorageErrorKind::Io, "in-memory storage lock poisoned")
}

impl Storage for InMemoryStorage {
    fn get(&self, key: &str) -> Result<Option<StorageEntry>, StorageError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).map(|value| StorageEntry {
            key: key.to_string(),
            value: value.clone(),
        }))
    }

    fn put(&self, entry: StorageEntry) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(entry.key, entry.value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }
}
