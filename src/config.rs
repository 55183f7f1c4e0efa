//! Backend naming configuration and its persistence.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::generator::NamingDefaults;
use crate::secret::Secret;
use crate::storage::{Storage, StorageEntry};

/// Storage key the backend configuration lives under.
pub const CONFIG_ROOT_KEY: &str = "config/root";

/// Root configuration of the secrets backend.
///
/// `connection_uri`, `username` and `password` are passed through untouched.
/// `username_template` is never empty once written: [`ConfigStore::write`]
/// substitutes the default template for an empty value.
#[derive(Debug, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Provider connection URI.
    pub connection_uri: String,
    /// Root account name.
    pub username: String,
    /// Root account password; redacted in Debug output.
    pub password: Secret<String>,
    /// Template used to generate principal names.
    #[serde(default)]
    pub username_template: String,
}

impl BackendConfig {
    /// Creates a configuration.
    pub fn new(
        connection_uri: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        username_template: impl Into<String>,
    ) -> Self {
        Self {
            connection_uri: connection_uri.into(),
            username: username.into(),
            password: Secret::new(password.into()),
            username_template: username_template.into(),
        }
    }
}

/// Reads and writes [`BackendConfig`] through a [`Storage`].
///
/// No locking of its own: concurrent writers get whatever semantics the
/// storage provides.
///
/// # Examples
///
/// ```
/// use principal_naming::{BackendConfig, ConfigStore, InMemoryStorage, DEFAULT_USERNAME_TEMPLATE};
///
/// let storage = InMemoryStorage::new();
/// let store = ConfigStore::default();
///
/// store.write(&storage, BackendConfig::new("test_uri", "guest", "guest", "")).unwrap();
/// let config = store.read(&storage).unwrap();
/// assert_eq!(config.username_template, DEFAULT_USERNAME_TEMPLATE);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    defaults: NamingDefaults,
}

impl ConfigStore {
    /// Creates a store that substitutes `defaults` for empty templates.
    pub fn new(defaults: NamingDefaults) -> Self {
        Self { defaults }
    }

    /// Persists `config` under [`CONFIG_ROOT_KEY`].
    ///
    /// An empty `username_template` is replaced by the default template
    /// before serialization. Any other value is stored exactly as given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if encoding or the storage write fails.
    pub fn write(&self, storage: &dyn Storage, mut config: BackendConfig) -> Result<(), Error> {
        let default_template_applied = config.username_template.is_empty();
        if default_template_applied {
            config.username_template = self.defaults.username_template().to_string();
        }

        let entry = StorageEntry::json(CONFIG_ROOT_KEY, &config)?;
        storage.put(entry)?;

        tracing::debug!(
            key = CONFIG_ROOT_KEY,
            default_template_applied,
            "backend configuration written"
        );
        Ok(())
    }

    /// Loads the stored configuration, exactly as written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no configuration was ever written, or
    /// [`Error::Storage`] if the read or decoding fails.
    pub fn read(&self, storage: &dyn Storage) -> Result<BackendConfig, Error> {
        self.read_optional(storage)?.ok_or_else(|| Error::NotFound {
            key: CONFIG_ROOT_KEY.to_string(),
        })
    }

    /// Like [`read`](Self::read), but returns `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the read or decoding fails.
    pub fn read_optional(&self, storage: &dyn Storage) -> Result<Option<BackendConfig>, Error> {
        match storage.get(CONFIG_ROOT_KEY)? {
            Some(entry) => Ok(Some(entry.decode_json()?)),
            None => Ok(None),
        }
    }

    /// Removes the stored configuration, on backend teardown.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the delete fails.
    pub fn delete(&self, storage: &dyn Storage) -> Result<(), Error> {
        storage.delete(CONFIG_ROOT_KEY)?;
        tracing::debug!(key = CONFIG_ROOT_KEY, "backend configuration deleted");
        Ok(())
    }
}

/// Writes `config` with the built-in defaults.
///
/// # Errors
///
/// See [`ConfigStore::write`].
pub fn write_config(storage: &dyn Storage, config: BackendConfig) -> Result<(), Error> {
    ConfigStore::default().write(storage, config)
}

/// Reads the stored configuration.
///
/// # Errors
///
/// See [`ConfigStore::read`].
pub fn read_config(storage: &dyn Storage) -> Result<BackendConfig, Error> {
    ConfigStore::default().read(storage)
}
