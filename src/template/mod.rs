//! A closed template language for composing principal names.
//!
//! Templates use the familiar `{{ }}` action syntax:
//!
//! - `{{ .DisplayName }}`, `{{ .PolicyName }}`, `{{ .Type }}` read the context
//! - `{{ if (eq .Type "STS") }}..{{ else if .. }}..{{ else }}..{{ end }}`
//! - `{{ printf "%s-%s" (unix_time) (random 20) | truncate 32 }}` calls
//!   functions, with `|` passing the left result as the final argument
//! - `{{/* comments */}}` and `{{-`/`-}}` whitespace trimming
//!
//! Every field and function is resolved while parsing, against
//! [`Field::ALL`](crate::Field::ALL) and [`Function::ALL`]. There is no
//! reflection and no way to reach the environment, files or network.
//!
//! # Examples
//!
//! ```
//! use principal_naming::{NameClass, TemplateContext};
//! use principal_naming::template::Template;
//!
//! let src = r#"{{ if eq .Type "IAM" }}u-{{ .DisplayName }}{{ else }}s{{ end }}"#;
//! let template = Template::parse(src)?;
//! let ctx = TemplateContext::new("alice", "admin", NameClass::Iam);
//! assert_eq!(template.render(&ctx)?, "u-alice");
//! # Ok::<(), principal_naming::template::TemplateError>(())
//! ```

mod error;
mod eval;
mod funcs;
mod lexer;
mod parser;

pub use error::{TemplateError, TemplateErrorKind};
pub use funcs::{registered_functions, Function, Value, MAX_RANDOM_LENGTH, MAX_VALUE_LENGTH};

use crate::context::TemplateContext;
use parser::Node;

/// A parsed template, ready to render any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Parses `source`.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] for malformed syntax, unknown fields, or
    /// calls to functions outside the registry.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let tokens = lexer::lex(source)?;
        let nodes = parser::parse(tokens, source.len())?;
        Ok(Self {
            source: source.to_string(),
            nodes,
        })
    }

    /// The original template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Renders the template against `ctx`.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] if a function rejects its arguments.
    pub fn render(&self, ctx: &TemplateContext) -> Result<String, TemplateError> {
        let mut out = String::new();
        eval::render_nodes(&self.nodes, ctx, &mut out)?;
        Ok(out)
    }
}

/// Parses and renders `source` in one step.
///
/// # Errors
///
/// See [`Template::parse`] and [`Template::render`].
pub fn render(source: &str, ctx: &TemplateContext) -> Result<String, TemplateError> {
    Template::parse(source)?.render(ctx)
}
