use thiserror::Error;

use crate::path::PathRejection;

/// Errors raised when a query cannot be turned into a store filter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A field path failed validation.
    #[error("invalid field path {path:?} at {location}: {reason}")]
    InvalidPath {
        /// The offending key, exactly as submitted.
        path: String,
        /// Where the key sits in the submitted query (`<field>` for a
        /// single-field query, a dotted breadcrumb inside a filter document).
        location: String,
        reason: PathRejection,
    },

    /// The filter document is valid JSON but not an object.
    #[error("filter must be a JSON object, found {0}")]
    NotAnObject(&'static str),

    /// The filter document is not valid JSON.
    #[error("malformed filter document: {0}")]
    Malformed(String),
}

pub type QueryResult<T> = Result<T, QueryError>;
