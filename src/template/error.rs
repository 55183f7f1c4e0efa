use std::fmt;

/// Error returned when a template cannot be parsed or rendered.
///
/// Carries the byte offset into the template source where the problem was
/// found, when one is known.
///
/// # Examples
///
/// ```
/// use principal_naming::template::{Template, TemplateErrorKind};
///
/// let err = Template::parse("{{ .Owner }}").unwrap_err();
/// assert_eq!(err.kind(), TemplateErrorKind::UndefinedField);
/// assert_eq!(err.position(), Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateError {
    kind: TemplateErrorKind,
    message: String,
    position: Option<usize>,
}

impl TemplateError {
    /// Creates a new template error.
    pub fn new(kind: TemplateErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            position: None,
        }
    }

    pub(crate) fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::new(TemplateErrorKind::Syntax, message).at(position)
    }

    pub(crate) fn bad_argument(function: &str, message: impl fmt::Display) -> Self {
        Self::new(
            TemplateErrorKind::BadArgument,
            format!("{function}: {message}"),
        )
    }

    /// Returns the error kind.
    pub fn kind(&self) -> TemplateErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Byte offset into the template source, if known.
    pub fn position(&self) -> Option<usize> {
        self.position
    }
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "template {}: {}", self.kind, self.message)?;
        if let Some(pos) = self.position {
            write!(f, " (at byte {pos})")?;
        }
        Ok(())
    }
}

impl std::error::Error for TemplateError {}

/// Kind of template error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateErrorKind {
    /// Malformed template text.
    Syntax,
    /// Reference to a field the context does not expose.
    UndefinedField,
    /// Call to a function outside the registry.
    UndefinedFunction,
    /// A function received the wrong number or type of arguments.
    BadArgument,
    /// Rendering failed for another reason.
    Execution,
}

impl fmt::Display for TemplateErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax error"),
            Self::UndefinedField => write!(f, "undefined field"),
            Self::UndefinedFunction => write!(f, "undefined function"),
            Self::BadArgument => write!(f, "bad argument"),
            Self::Execution => write!(f, "execution error"),
        }
    }
}
