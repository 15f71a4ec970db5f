use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Top-level namespace of a session (typically the client application).
///
/// Sources are compared as exact, case-sensitive strings: `msk_portal` and
/// `MSK_portal` are different namespaces.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Source(String);

impl Source {
    /// Create a source, rejecting the empty string.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TypeError::EmptySource);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Source {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Source> for String {
    fn from(source: Source) -> Self {
        source.0
    }
}

impl FromStr for Source {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Source({:?})", self.0)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sub-namespace of a session.
///
/// The set is closed: the routing layer rejects anything else before the
/// repository is reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    MainSession,
    VirtualStudy,
    Group,
    ComparisonSession,
    Settings,
    CustomData,
    GenomicChart,
    CustomGeneList,
}

impl SessionType {
    /// Every known session type, in declaration order.
    pub const ALL: [SessionType; 8] = [
        Self::MainSession,
        Self::VirtualStudy,
        Self::Group,
        Self::ComparisonSession,
        Self::Settings,
        Self::CustomData,
        Self::GenomicChart,
        Self::CustomGeneList,
    ];

    /// Wire name of the type (as it appears in URLs and stored documents).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MainSession => "main_session",
            Self::VirtualStudy => "virtual_study",
            Self::Group => "group",
            Self::ComparisonSession => "comparison_session",
            Self::Settings => "settings",
            Self::CustomData => "custom_data",
            Self::GenomicChart => "genomic_chart",
            Self::CustomGeneList => "custom_gene_list",
        }
    }
}

impl FromStr for SessionType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| TypeError::UnknownSessionType(s.to_string()))
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `(source, type)` namespace every repository operation is bound to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Scope {
    pub source: Source,
    #[serde(rename = "type")]
    pub kind: SessionType,
}

impl Scope {
    pub fn new(source: Source, kind: SessionType) -> Self {
        Self { source, kind }
    }

    /// Parse both halves from raw strings (e.g. URL path segments).
    pub fn parse(source: &str, kind: &str) -> Result<Self, TypeError> {
        Ok(Self {
            source: source.parse()?,
            kind: kind.parse()?,
        })
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_rejected() {
        assert_eq!(Source::new(""), Err(TypeError::EmptySource));
    }

    #[test]
    fn source_is_case_sensitive() {
        let a = Source::new("msk_portal").unwrap();
        let b = Source::new("MSK_portal").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn session_type_parse_roundtrip() {
        for t in SessionType::ALL {
            assert_eq!(t.as_str().parse::<SessionType>().unwrap(), t);
        }
    }

    #[test]
    fn unknown_session_type_rejected() {
        assert_eq!(
            "invalid_type".parse::<SessionType>(),
            Err(TypeError::UnknownSessionType("invalid_type".into()))
        );
    }

    #[test]
    fn session_type_parse_is_case_sensitive() {
        assert!("Main_Session".parse::<SessionType>().is_err());
    }

    #[test]
    fn serde_name_matches_as_str() {
        for t in SessionType::ALL {
            let json = serde_json::to_value(t).unwrap();
            assert_eq!(json, serde_json::Value::String(t.as_str().into()));
        }
    }

    #[test]
    fn source_deserialize_rejects_empty() {
        let result: Result<Source, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn scope_parse_and_display() {
        let scope = Scope::parse("msk_portal", "virtual_study").unwrap();
        assert_eq!(scope.kind, SessionType::VirtualStudy);
        assert_eq!(scope.to_string(), "msk_portal/virtual_study");
    }

    #[test]
    fn scope_parse_reports_first_failure() {
        assert_eq!(
            Scope::parse("", "main_session"),
            Err(TypeError::EmptySource)
        );
        assert!(matches!(
            Scope::parse("msk_portal", "nope"),
            Err(TypeError::UnknownSessionType(_))
        ));
    }
}
