//! Per-call context a username template is rendered against.

use chrono::{DateTime, Utc};

use crate::principal::{NameClass, PrincipalType, UnknownPrincipalType};
use crate::request::NameRequest;

/// The closed set of fields a template may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// `.DisplayName`
    DisplayName,
    /// `.PolicyName`
    PolicyName,
    /// `.Type`, either `"IAM"` or `"STS"`
    Type,
}

impl Field {
    /// Every field exposed to templates.
    pub const ALL: [Field; 3] = [Field::DisplayName, Field::PolicyName, Field::Type];

    /// Name as written after the leading dot.
    pub const fn name(self) -> &'static str {
        match self {
            Field::DisplayName => "DisplayName",
            Field::PolicyName => "PolicyName",
            Field::Type => "Type",
        }
    }

    /// Resolves a field name, without the leading dot.
    pub fn lookup(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }
}

/// Values available to a template during one render.
///
/// Built fresh for every generation call and never shared. The render time
/// is captured once at construction so `unix_time` is stable within a render.
///
/// # Examples
///
/// ```
/// use principal_naming::TemplateContext;
///
/// let ctx = TemplateContext::build("name1", "policy1", "sts").unwrap();
/// assert_eq!(ctx.type_name(), "STS");
/// ```
#[derive(Debug, Clone)]
pub struct TemplateContext {
    display_name: String,
    policy_name: String,
    class: NameClass,
    now: DateTime<Utc>,
}

impl TemplateContext {
    /// Creates a context for an already-resolved naming class.
    pub fn new(
        display_name: impl Into<String>,
        policy_name: impl Into<String>,
        class: NameClass,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            policy_name: policy_name.into(),
            class,
            now: Utc::now(),
        }
    }

    /// Resolves `raw_type` through the principal-type mapping and builds a context.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownPrincipalType`] if `raw_type` is not in the mapping.
    pub fn build(
        display_name: impl Into<String>,
        policy_name: impl Into<String>,
        raw_type: &str,
    ) -> Result<Self, UnknownPrincipalType> {
        let principal_type: PrincipalType = raw_type.parse()?;
        Ok(Self::new(display_name, policy_name, principal_type.class()))
    }

    /// Builds a context from a request whose names were already normalized.
    pub fn from_request(request: &NameRequest) -> Self {
        Self::new(
            request.display_name(),
            request.policy_name(),
            request.principal_type().class(),
        )
    }

    /// Pins the render time. Used to make `unix_time` deterministic.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// `.DisplayName`
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// `.PolicyName`
    pub fn policy_name(&self) -> &str {
        &self.policy_name
    }

    /// Naming class the name is generated for.
    pub fn class(&self) -> NameClass {
        self.class
    }

    /// `.Type`
    pub fn type_name(&self) -> &'static str {
        self.class.as_str()
    }

    /// Time the context was built, or the pinned time.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub(crate) fn field(&self, field: Field) -> &str {
        match field {
            Field::DisplayName => &self.display_name,
            Field::PolicyName => &self.policy_name,
            Field::Type => self.type_name(),
        }
    }
}
