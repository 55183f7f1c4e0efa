use crate::normalize::DisplayNameNormalizer;
use crate::principal::{PrincipalType, UnknownPrincipalType};
use crate::{Tainted, Verified};

/// A request to name a new principal.
///
/// Display and policy names come from callers, so they are accepted as
/// [`Tainted`] and normalized on construction.
///
/// # Examples
///
/// ```
/// use principal_naming::{NameRequest, PrincipalType, Tainted};
///
/// let request = NameRequest::new(
///     Tainted::new("token ci".to_string()),
///     Tainted::new("deploy".to_string()),
///     PrincipalType::IamUser,
/// );
/// assert_eq!(request.display_name(), "token_ci");
/// ```
#[derive(Debug, Clone)]
pub struct NameRequest {
    display_name: Verified<String>,
    policy_name: Verified<String>,
    principal_type: PrincipalType,
}

impl NameRequest {
    /// Normalizes both names and records the principal type.
    pub fn new(
        display_name: Tainted<String>,
        policy_name: Tainted<String>,
        principal_type: PrincipalType,
    ) -> Self {
        let normalizer = DisplayNameNormalizer;
        Self {
            display_name: normalizer.normalize(display_name),
            policy_name: normalizer.normalize(policy_name),
            principal_type,
        }
    }

    /// Like [`new`](Self::new), resolving a raw principal type string.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownPrincipalType`] if `raw_type` is not in the mapping.
    pub fn parse(
        display_name: Tainted<String>,
        policy_name: Tainted<String>,
        raw_type: &str,
    ) -> Result<Self, UnknownPrincipalType> {
        Ok(Self::new(display_name, policy_name, raw_type.parse()?))
    }

    /// Normalized display name.
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Normalized policy name.
    pub fn policy_name(&self) -> &str {
        self.policy_name.as_str()
    }

    /// Principal type being named.
    pub fn principal_type(&self) -> PrincipalType {
        self.principal_type
    }
}
