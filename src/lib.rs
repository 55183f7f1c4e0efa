//! Principal name generation for a cloud credentials backend.
//!
//! Dynamic IAM users and STS sessions get provider-facing names built from a
//! configurable template. This crate provides:
//! - **Normalization**: caller-supplied display names are reduced to the
//!   provider's permitted alphabet before they reach a template
//! - **Templates**: a closed `{{ }}` template language with a fixed set of
//!   fields and functions, resolved when the template is parsed
//! - **Length limits**: names over 64 (IAM) or 32 (STS) characters are
//!   rejected, never shortened
//! - **Configuration**: the backend's template is persisted through a
//!   pluggable [`Storage`], with the default template filled in on write
//!
//! # Core Types
//!
//! - [`Tainted<T>`]: caller-supplied input that has not been normalized
//! - [`Verified<T>`]: input that has passed through a [`Sanitizer`]
//! - [`NameGenerator`]: renders a template and enforces the length limit
//! - [`ConfigStore`]: reads and writes [`BackendConfig`]
//! - [`Secret<T>`]: keeps the backend password out of logs
//!
//! # Examples
//!
//! ```
//! use principal_naming::{NameGenerator, NameRequest, PrincipalType, Tainted};
//!
//! let request = NameRequest::new(
//!     Tainted::new("alice smith".to_string()),
//!     Tainted::new("readonly".to_string()),
//!     PrincipalType::IamUser,
//! );
//! assert_eq!(request.display_name(), "alice_smith");
//!
//! let name = NameGenerator::default()
//!     .generate_for_request(&request, "app-{{ .DisplayName }}-{{ .PolicyName }}")
//!     .unwrap();
//! assert_eq!(name, "app-alice_smith-readonly");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod error;
mod generator;
mod limits;
mod normalize;
mod path_config;
mod principal;
mod request;
mod secret;
mod storage;
mod tainted;
pub mod template;
mod verified;

#[cfg(test)]
mod test_utils;

pub use config::{read_config, write_config, BackendConfig, ConfigStore, CONFIG_ROOT_KEY};
pub use context::{Field, TemplateContext};
pub use error::Error;
pub use generator::{generate_username, NameGenerator, NamingDefaults, DEFAULT_USERNAME_TEMPLATE};
pub use limits::{validate_length, LengthExceeded};
pub use normalize::{is_permitted, normalize_display_name, DisplayNameNormalizer, Sanitizer};
pub use path_config::{ConfigPath, RequestData, RequestError, Response};
pub use principal::{NameClass, PrincipalType, UnknownPrincipalType};
pub use request::NameRequest;
pub use secret::Secret;
pub use storage::{InMemoryStorage, Storage, StorageEntry, StorageError, StorageErrorKind};
pub use tainted::Tainted;
pub use verified::Verified;
