use std::fmt;

use crate::error::{QueryError, QueryResult};

/// Why a field path was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathRejection {
    #[error("field path is empty")]
    Empty,

    /// NUL character at the given byte offset.
    #[error("field path contains a NUL character at byte {position}")]
    NulCharacter { position: usize },

    /// A segment starts with `$`.
    #[error("segment {segment:?} starts with '$'")]
    OperatorSegment { segment: String },

    /// Two consecutive dots, or a leading/trailing dot.
    #[error("segment {index} is empty")]
    EmptySegment { index: usize },
}

/// A dotted field path that has passed validation.
///
/// Only [`validate_path`] constructs this type.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The dot-separated segments of the path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl fmt::Debug for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldPath({:?})", self.0)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of validating a single field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathCheck {
    Valid(FieldPath),
    Rejected(PathRejection),
}

impl PathCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Convert into a [`QueryResult`], attributing a rejection to `raw`
    /// found at `location`.
    pub fn into_result(self, raw: &str, location: &str) -> QueryResult<FieldPath> {
        match self {
            Self::Valid(path) => Ok(path),
            Self::Rejected(reason) => Err(QueryError::InvalidPath {
                path: raw.to_string(),
                location: location.to_string(),
                reason,
            }),
        }
    }
}

/// Validate a field path.
///
/// The path is returned unchanged on success.
pub fn validate_path(raw: &str) -> PathCheck {
    if let Err(reason) = screen_key(raw) {
        return PathCheck::Rejected(reason);
    }
    if raw.is_empty() {
        return PathCheck::Rejected(PathRejection::Empty);
    }
    if let Some(index) = raw.split('.').position(str::is_empty) {
        return PathCheck::Rejected(PathRejection::EmptySegment { index });
    }
    PathCheck::Valid(FieldPath(raw.to_string()))
}

/// Screen a key nested inside a filter value.
///
/// Nested keys are literal document keys, not paths: empty keys and empty
/// segments are allowed. Only NUL characters and `$`-prefixed segments are
/// rejected.
pub fn screen_key(raw: &str) -> Result<(), PathRejection> {
    if let Some(position) = raw.find('\0') {
        return Err(PathRejection::NulCharacter { position });
    }
    match raw.split('.').find(|segment| segment.starts_with('$')) {
        Some(segment) => Err(PathRejection::OperatorSegment {
            segment: segment.to_string(),
        }),
        None => Ok(()),
    }
}
