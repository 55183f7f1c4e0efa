use std::fmt;

use crate::limits::LengthExceeded;
use crate::principal::UnknownPrincipalType;
use crate::storage::StorageError;
use crate::template::TemplateError;

/// Errors returned by name generation and the configuration store.
///
/// Template and length errors render exactly as their inner error so the
/// caller sees the same message the generator produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The template is malformed or references an undefined symbol.
    Template(TemplateError),
    /// The rendered name is longer than the principal type allows.
    LengthExceeded(LengthExceeded),
    /// The raw principal type is outside the fixed mapping.
    UnknownPrincipalType(UnknownPrincipalType),
    /// Nothing is stored under the requested key.
    NotFound {
        /// The key that was looked up
        key: String,
    },
    /// The storage collaborator failed.
    Storage(StorageError),
}

impl Error {
    /// Returns `true` for [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Template(e) => write!(f, "{}", e),
            Error::LengthExceeded(e) => write!(f, "{}", e),
            Error::UnknownPrincipalType(e) => write!(f, "{}", e),
            Error::NotFound { key } => write!(f, "no configuration stored at '{}'", key),
            Error::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(e) => Some(e),
            Error::LengthExceeded(e) => Some(e),
            Error::UnknownPrincipalType(e) => Some(e),
            Error::NotFound { .. } => None,
            Error::Storage(e) => Some(e),
        }
    }
}

impl From<TemplateError> for Error {
    fn from(e: TemplateError) -> Self {
        Error::Template(e)
    }
}

impl From<LengthExceeded> for Error {
    fn from(e: LengthExceeded) -> Self {
        Error::LengthExceeded(e)
    }
}

impl From<UnknownPrincipalType> for Error {
    fn from(e: UnknownPrincipalType) -> Self {
        Error::UnknownPrincipalType(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::Storage(e)
    }
}
