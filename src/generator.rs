//! Username generation: render the configured template, then enforce the
//! length limit of the principal's naming class.

use std::sync::Arc;

use crate::config::ConfigStore;
use crate::context::TemplateContext;
use crate::error::Error;
use crate::limits::validate_length;
use crate::request::NameRequest;
use crate::storage::Storage;
use crate::template::{Template, TemplateError, TemplateErrorKind};

/// Template used when the backend configuration leaves `username_template` unset.
///
/// STS names are `vault-<unix_time>-<random>` cut to 32 chars. IAM names embed
/// the display and policy names, each truncated, and are cut to 64 chars.
pub const DEFAULT_USERNAME_TEMPLATE: &str = r#"{{ if (eq .Type "STS") }}{{ printf "vault-%s-%s" (unix_time) (random 20) | truncate 32 }}{{ else }}{{ printf "vault-%s-%s-%s-%s" (printf "%s" .DisplayName | truncate 42) (printf "%s" .PolicyName | truncate 32) (unix_time) (random 20) | truncate 64 }}{{ end }}"#;

/// Immutable naming defaults shared by the generator and the config store.
///
/// Built once and passed in, so tests can use an alternate default template
/// without touching shared state.
///
/// # Examples
///
/// ```
/// use principal_naming::{NamingDefaults, DEFAULT_USERNAME_TEMPLATE};
///
/// assert_eq!(NamingDefaults::default().username_template(), DEFAULT_USERNAME_TEMPLATE);
///
/// let custom = NamingDefaults::new("svc-{{ random 8 }}");
/// assert_eq!(custom.username_template(), "svc-{{ random 8 }}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingDefaults {
    username_template: Arc<str>,
}

impl NamingDefaults {
    /// Defaults with a custom username template.
    pub fn new(username_template: impl Into<Arc<str>>) -> Self {
        Self {
            username_template: username_template.into(),
        }
    }

    /// The template substituted whenever none is configured.
    pub fn username_template(&self) -> &str {
        &self.username_template
    }
}

impl Default for NamingDefaults {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME_TEMPLATE)
    }
}

/// Renders username templates and validates the result.
///
/// Holds no mutable state; one generator can serve concurrent callers.
///
/// # Examples
///
/// ```
/// use principal_naming::{DEFAULT_USERNAME_TEMPLATE, NameGenerator};
///
/// let generator = NameGenerator::default();
/// let name = generator
///     .generate("name1", "policy1", "iam_user", DEFAULT_USERNAME_TEMPLATE)
///     .unwrap();
/// assert!(name.starts_with("vault-name1-policy1-"));
/// assert!(name.len() <= 64);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NameGenerator {
    defaults: NamingDefaults,
}

impl NameGenerator {
    /// Creates a generator using `defaults` for empty templates.
    pub fn new(defaults: NamingDefaults) -> Self {
        Self { defaults }
    }

    /// The injected defaults.
    pub fn defaults(&self) -> &NamingDefaults {
        &self.defaults
    }

    /// Generates a username for `principal_type` from `template`.
    ///
    /// An empty `template` means the default template. `display_name` and
    /// `policy_name` are embedded as given; normalize caller-supplied values
    /// first, or use [`generate_for_request`](Self::generate_for_request).
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownPrincipalType`] if `principal_type` is not mapped
    /// - [`Error::Template`] if the template fails to parse or render, or
    ///   renders an empty name
    /// - [`Error::LengthExceeded`] if the result is over the type's limit
    pub fn generate(
        &self,
        display_name: &str,
        policy_name: &str,
        principal_type: &str,
        template: &str,
    ) -> Result<String, Error> {
        let ctx = TemplateContext::build(display_name, policy_name, principal_type)?;
        self.render(&self.parse(template)?, &ctx)
    }

    /// Generates a username for a request whose names are already normalized.
    ///
    /// # Errors
    ///
    /// See [`generate`](Self::generate).
    pub fn generate_for_request(
        &self,
        request: &NameRequest,
        template: &str,
    ) -> Result<String, Error> {
        let ctx = TemplateContext::from_request(request);
        self.render(&self.parse(template)?, &ctx)
    }

    /// Generates a username using the template stored in the backend
    /// configuration, or the default template if nothing is configured.
    ///
    /// # Errors
    ///
    /// Storage errors are returned unchanged; otherwise see [`generate`](Self::generate).
    pub fn generate_for_config(
        &self,
        storage: &dyn Storage,
        request: &NameRequest,
    ) -> Result<String, Error> {
        let template = match ConfigStore::new(self.defaults.clone()).read(storage) {
            Ok(config) => config.username_template,
            Err(err) if err.is_not_found() => self.defaults.username_template().to_string(),
            Err(err) => return Err(err),
        };
        self.generate_for_request(request, &template)
    }

    /// Renders a parsed template and checks the result against the context's limit.
    ///
    /// # Errors
    ///
    /// [`Error::Template`] if rendering fails or produces an empty name;
    /// [`Error::LengthExceeded`] if the name is too long.
    pub fn render(&self, template: &Template, ctx: &TemplateContext) -> Result<String, Error> {
        let class = ctx.class();

        let name = template.render(ctx).inspect_err(|err| {
            tracing::warn!(class = %class, error = %err, "username template failed to render");
        })?;

        if name.is_empty() {
            tracing::warn!(class = %class, "username template rendered an empty name");
            return Err(TemplateError::new(
                TemplateErrorKind::Execution,
                format!("template rendered an empty {class} username"),
            )
            .into());
        }

        validate_length(&name, class).inspect_err(|err| {
            tracing::warn!(
                class = %class,
                length = err.actual(),
                limit = err.limit(),
                "generated username exceeds length limit"
            );
        })?;

        tracing::debug!(class = %class, length = name.len(), "generated username");
        Ok(name)
    }

    fn parse(&self, template: &str) -> Result<Template, Error> {
        let source = if template.is_empty() {
            self.defaults.username_template()
        } else {
            template
        };

        Template::parse(source).map_err(|err| {
            tracing::warn!(error = %err, "username template failed to parse");
            Error::from(err)
        })
    }
}

/// Generates a username with the built-in defaults.
///
/// # Errors
///
/// See [`NameGenerator::generate`].
pub fn generate_username(
    display_name: &str,
    policy_name: &str,
    principal_type: &str,
    template: &str,
) -> Result<String, Error> {
    NameGenerator::default().generate(display_name, policy_name, principal_type, template)
}
