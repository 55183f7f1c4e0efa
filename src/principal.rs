//! Principal types and the naming class each one resolves to.
//!
//! The mapping is a fixed table: IAM users and assumed roles get IAM-class
//! names (64 chars), STS sessions get STS-class names (32 chars).

use std::fmt;
use std::str::FromStr;

/// Provider-side naming class. Drives the `.Type` template field and the
/// length limit a generated name must respect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameClass {
    /// Long-lived IAM identities.
    Iam,
    /// Short-lived STS sessions.
    Sts,
}

impl NameClass {
    /// Maximum length of a name in this class.
    pub const fn limit(self) -> usize {
        match self {
            NameClass::Iam => 64,
            NameClass::Sts => 32,
        }
    }

    /// Value exposed to templates as `.Type`.
    pub const fn as_str(self) -> &'static str {
        match self {
            NameClass::Iam => "IAM",
            NameClass::Sts => "STS",
        }
    }
}

impl fmt::Display for NameClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of cloud identity being named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrincipalType {
    /// `iam_user`
    IamUser,
    /// `assume_role`
    AssumeRole,
    /// `federation_token`, an STS session issued for a federated user
    FederationToken,
    /// `sts`
    Sts,
}

impl PrincipalType {
    /// Every supported principal type.
    pub const ALL: [PrincipalType; 4] = [
        PrincipalType::IamUser,
        PrincipalType::AssumeRole,
        PrincipalType::FederationToken,
        PrincipalType::Sts,
    ];

    /// Raw identifier as it appears in requests.
    pub const fn as_str(self) -> &'static str {
        match self {
            PrincipalType::IamUser => "iam_user",
            PrincipalType::AssumeRole => "assume_role",
            PrincipalType::FederationToken => "federation_token",
            PrincipalType::Sts => "sts",
        }
    }

    /// Resolves the naming class for this principal type.
    pub const fn class(self) -> NameClass {
        match self {
            PrincipalType::IamUser | PrincipalType::AssumeRole => NameClass::Iam,
            PrincipalType::FederationToken | PrincipalType::Sts => NameClass::Sts,
        }
    }
}

impl fmt::Display for PrincipalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrincipalType {
    type Err = UnknownPrincipalType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrincipalType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownPrincipalType(s.to_string()))
    }
}

/// Returned when a raw principal type is outside the fixed mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPrincipalType(pub String);

impl fmt::Display for UnknownPrincipalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown principal type '{}'", self.0)
    }
}

impl std::error::Error for UnknownPrincipalType {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_table() {
        assert_eq!("iam_user".parse::<PrincipalType>().unwrap().class(), NameClass::Iam);
        assert_eq!("assume_role".parse::<PrincipalType>().unwrap().class(), NameClass::Iam);
        assert_eq!("sts".parse::<PrincipalType>().unwrap().class(), NameClass::Sts);
        assert_eq!(
            "federation_token".parse::<PrincipalType>().unwrap().class(),
            NameClass::Sts
        );
    }

    #[test]
    fn limits() {
        assert_eq!(NameClass::Iam.limit(), 64);
        assert_eq!(NameClass::Sts.limit(), 32);
    }

    #[test]
    fn type_field_values() {
        assert_eq!(NameClass::Iam.to_string(), "IAM");
        assert_eq!(NameClass::Sts.to_string(), "STS");
    }

    #[test]
    fn unknown_type_rejected() {
        let err = "root".parse::<PrincipalType>().unwrap_err();
        assert_eq!(err, UnknownPrincipalType("root".to_string()));
        assert_eq!(err.to_string(), "unknown principal type 'root'");
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert!("IAM_USER".parse::<PrincipalType>().is_err());
    }

    #[test]
    fn as_str_round_trips() {
        for t in PrincipalType::ALL {
            assert_eq!(t.as_str().parse::<PrincipalType>().unwrap(), t);
        }
    }
}
