//! Request handling for the `config/root` path.
//!
//! Request bodies arrive as loosely typed JSON objects. Every value read from
//! one is [`Tainted`] until it has been checked here. Problems with the
//! request itself come back as [`Response::Error`] inside `Ok`; only faults
//! in the storage collaborator are returned as `Err`.

use std::fmt;

use serde_json::{Map, Value};

use crate::config::{BackendConfig, ConfigStore};
use crate::error::Error;
use crate::generator::NamingDefaults;
use crate::storage::Storage;
use crate::tainted::Tainted;
use crate::template::Template;

/// Request body type accepted by [`ConfigPath`].
pub type RequestData = Map<String, Value>;

const REQUIRED_FIELDS: [&str; 3] = ["connection_uri", "username", "password"];
const TEMPLATE_FIELD: &str = "username_template";

/// A problem with the request that the caller must fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    field: Option<String>,
    message: String,
}

impl RequestError {
    fn missing(field: &str) -> Self {
        Self {
            field: Some(field.to_string()),
            message: format!("missing required field '{}'", field),
        }
    }

    fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.to_string()),
            message: message.into(),
        }
    }

    /// The offending field, if the error is tied to one.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Human-readable description.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RequestError {}

/// Body returned by a request handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Response data.
    Data(RequestData),
    /// The request was rejected.
    Error(RequestError),
}

impl Response {
    /// Returns `true` for [`Response::Error`].
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }
}

/// Handler for create, update, read and delete on `config/root`.
///
/// # Examples
///
/// ```
/// use principal_naming::{ConfigPath, InMemoryStorage};
/// use serde_json::json;
///
/// let storage = InMemoryStorage::new();
/// let path = ConfigPath::default();
///
/// let body = json!({
///     "connection_uri": "test_uri",
///     "username": "guest",
///     "password": "guest",
/// });
/// let resp = path.handle_write(&storage, body.as_object().unwrap()).unwrap();
/// assert!(resp.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigPath {
    store: ConfigStore,
}

impl ConfigPath {
    /// Creates a handler whose store substitutes `defaults` for empty templates.
    pub fn new(defaults: NamingDefaults) -> Self {
        Self {
            store: ConfigStore::new(defaults),
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Handles a create or update request.
    ///
    /// Returns `Ok(None)` on success. A missing or non-string field, or a
    /// `username_template` that does not parse, yields
    /// `Ok(Some(Response::Error(..)))` and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if persisting the configuration fails.
    pub fn handle_write(
        &self,
        storage: &dyn Storage,
        data: &RequestData,
    ) -> Result<Option<Response>, Error> {
        let config = match extract_config(data) {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!(field = ?err.field(), error = %err, "rejected config request");
                return Ok(Some(Response::Error(err)));
            }
        };

        self.store.write(storage, config)?;
        Ok(None)
    }

    /// Handles a read request.
    ///
    /// Returns `Ok(None)` when no configuration has been written. The
    /// password is never included in the response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the read fails.
    pub fn handle_read(&self, storage: &dyn Storage) -> Result<Option<Response>, Error> {
        let Some(config) = self.store.read_optional(storage)? else {
            return Ok(None);
        };

        let mut data = Map::new();
        data.insert("connection_uri".into(), Value::String(config.connection_uri));
        data.insert("username".into(), Value::String(config.username));
        data.insert(
            TEMPLATE_FIELD.into(),
            Value::String(config.username_template),
        );
        Ok(Some(Response::Data(data)))
    }

    /// Handles a delete request. Always returns `Ok(None)` on success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the delete fails.
    pub fn handle_delete(&self, storage: &dyn Storage) -> Result<Option<Response>, Error> {
        self.store.delete(storage)?;
        Ok(None)
    }
}

fn string_field(data: &RequestData, field: &str) -> Result<Option<Tainted<String>>, RequestError> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(Tainted::new(s.clone()))),
        Some(_) => Err(RequestError::invalid(
            field,
            format!("field '{}' must be a string", field),
        )),
    }
}

fn required_field(data: &RequestData, field: &str) -> Result<String, RequestError> {
    string_field(data, field)?
        .map(Tainted::into_inner)
        .ok_or_else(|| RequestError::missing(field))
}

fn extract_config(data: &RequestData) -> Result<BackendConfig, RequestError> {
    let [connection_uri, username, password] = REQUIRED_FIELDS;
    let connection_uri = required_field(data, connection_uri)?;
    let username = required_field(data, username)?;
    let password = required_field(data, password)?;

    let username_template = string_field(data, TEMPLATE_FIELD)?
        .map(Tainted::into_inner)
        .unwrap_or_default();

    // Empty means "use the default", which the store fills in.
    if !username_template.is_empty() {
        Template::parse(&username_template).map_err(|err| {
            RequestError::invalid(
                TEMPLATE_FIELD,
                format!("unable to initialize username template: {}", err),
            )
        })?;
    }

    Ok(BackendConfig::new(
        connection_uri,
        username,
        password,
        username_template,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::read_config;
    use crate::generator::DEFAULT_USERNAME_TEMPLATE;
    use crate::storage::{InMemoryStorage, StorageEntry, StorageError, StorageErrorKind};
    use serde_json::json;

    fn body(value: Value) -> RequestData {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    fn config_data(template: &str) -> RequestData {
        body(json!({
            "connection_uri": "test_uri",
            "username": "guest",
            "password": "guest",
            "username_template": template,
        }))
    }

    #[test]
    fn read_config_default_template() {
        let storage = InMemoryStorage::new();
        let resp = ConfigPath::default()
            .handle_write(&storage, &config_data(""))
            .unwrap();
        assert!(resp.is_none(), "expected no response body, got {:?}", resp);

        let config = read_config(&storage).unwrap();
        assert_eq!(config.username_template, DEFAULT_USERNAME_TEMPLATE);
    }

    #[test]
    fn read_config_custom_template() {
        let storage = InMemoryStorage::new();
        let template = "`foo-{{ .DisplayName }}`";
        let resp = ConfigPath::default()
            .handle_write(&storage, &config_data(template))
            .unwrap();
        assert!(resp.is_none());

        let config = read_config(&storage).unwrap();
        assert_eq!(config.username_template, template);
    }

    #[test]
    fn omitted_template_uses_default() {
        let storage = InMemoryStorage::new();
        let data = body(json!({
            "connection_uri": "test_uri",
            "username": "guest",
            "password": "guest",
        }));
        assert!(ConfigPath::default()
            .handle_write(&storage, &data)
            .unwrap()
            .is_none());
        assert_eq!(
            read_config(&storage).unwrap().username_template,
            DEFAULT_USERNAME_TEMPLATE
        );
    }

    #[test]
    fn missing_required_field_is_request_error() {
        let storage = InMemoryStorage::new();
        for field in REQUIRED_FIELDS {
            let mut data = config_data("");
            data.remove(field);

            let resp = ConfigPath::default()
                .handle_write(&storage, &data)
                .unwrap()
                .unwrap();
            let Response::Error(err) = resp else {
                panic!("expected request error");
            };
            assert_eq!(err.field(), Some(field));
            assert!(err.message().contains(field));
        }
        assert!(storage.is_empty());
    }

    #[test]
    fn non_string_field_is_request_error() {
        let storage = InMemoryStorage::new();
        let mut data = config_data("");
        data.insert("password".into(), json!(1234));

        let resp = ConfigPath::default()
            .handle_write(&storage, &data)
            .unwrap()
            .unwrap();
        assert!(resp.is_error());
        assert!(storage.is_empty());
    }

    #[test]
    fn unparseable_template_is_request_error() {
        let storage = InMemoryStorage::new();
        for template in ["{{ .Nope }}", "{{ nope }}", "{{ if .Type }}x"] {
            let resp = ConfigPath::default()
                .handle_write(&storage, &config_data(template))
                .unwrap()
                .unwrap();
            let Response::Error(err) = resp else {
                panic!("expected request error for {:?}", template);
            };
            assert_eq!(err.field(), Some(TEMPLATE_FIELD));
            assert!(err
                .to_string()
                .starts_with("unable to initialize username template"));
        }
        assert!(storage.is_empty());
    }

    #[test]
    fn deeply_nested_template_is_request_error() {
        let storage = InMemoryStorage::new();
        let deep_parens = format!("{{{{ {}.Type{} }}}}", "(".repeat(10_000), ")".repeat(10_000));
        let deep_ifs = format!(
            "{}x{}",
            "{{ if .Type }}".repeat(10_000),
            "{{ end }}".repeat(10_000)
        );

        for template in [deep_parens, deep_ifs] {
            let resp = ConfigPath::default()
                .handle_write(&storage, &config_data(&template))
                .unwrap()
                .unwrap();
            let Response::Error(err) = resp else {
                panic!("expected request error");
            };
            assert_eq!(err.field(), Some(TEMPLATE_FIELD));
            assert!(err.message().contains("nesting too deep"), "{}", err);
        }
        assert!(storage.is_empty());
    }

    #[test]
    fn read_returns_config_without_password() {
        let storage = InMemoryStorage::new();
        let path = ConfigPath::default();
        assert_eq!(path.handle_read(&storage).unwrap(), None);

        path.handle_write(&storage, &config_data("foo-{{.DisplayName}}"))
            .unwrap();
        let Some(Response::Data(data)) = path.handle_read(&storage).unwrap() else {
            panic!("expected data");
        };
        assert_eq!(data["connection_uri"], "test_uri");
        assert_eq!(data["username"], "guest");
        assert_eq!(data["username_template"], "foo-{{.DisplayName}}");
        assert!(!data.contains_key("password"));
    }

    #[test]
    fn delete_clears_config() {
        let storage = InMemoryStorage::new();
        let path = ConfigPath::default();
        path.handle_write(&storage, &config_data("")).unwrap();
        assert!(path.handle_delete(&storage).unwrap().is_none());
        assert_eq!(path.handle_read(&storage).unwrap(), None);
    }

    #[test]
    fn injected_defaults_apply() {
        let storage = InMemoryStorage::new();
        let path = ConfigPath::new(NamingDefaults::new("alt-{{ .PolicyName }}"));
        path.handle_write(&storage, &config_data("")).unwrap();
        assert_eq!(
            path.store().read(&storage).unwrap().username_template,
            "alt-{{ .PolicyName }}"
        );
    }

    #[test]
    fn storage_fault_is_err() {
        struct ReadOnly;

        impl Storage for ReadOnly {
            fn get(&self, _key: &str) -> Result<Option<StorageEntry>, StorageError> {
                Ok(None)
            }

            fn put(&self, _entry: StorageEntry) -> Result<(), StorageError> {
                Err(StorageError::new(StorageErrorKind::Io, "read-only"))
            }

            fn delete(&self, _key: &str) -> Result<(), StorageError> {
                Err(StorageError::new(StorageErrorKind::Io, "read-only"))
            }
        }

        let err = ConfigPath::default()
            .handle_write(&ReadOnly, &config_data(""))
            .unwrap_err();
        assert_eq!(
            err,
            Error::Storage(StorageError::new(StorageErrorKind::Io, "read-only"))
        );
        assert!(ConfigPath::default().handle_delete(&ReadOnly).is_err());
    }
}
