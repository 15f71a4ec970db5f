use sess_query::QueryError;
use sess_store::StoreError;
use sess_types::Scope;
use thiserror::Error;

/// Why a session payload was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidPayload {
    /// No body was supplied at all. Distinct from an empty object, which is
    /// a valid payload.
    #[error("payload is missing")]
    Missing,

    #[error("payload is not valid JSON: {0}")]
    Malformed(String),

    #[error("payload must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// No session with this id exists in the scope. An id that exists in a
    /// different scope is reported the same way.
    #[error("session not found: {id} in {scope}")]
    NotFound { scope: Scope, id: String },

    #[error("invalid session: {0}")]
    Invalid(#[from] InvalidPayload),

    #[error("invalid session query: {0}")]
    QueryInvalid(#[from] QueryError),

    /// Infrastructure failure; not caused by the caller's input.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl SessionError {
    pub fn not_found(scope: &Scope, id: impl Into<String>) -> Self {
        Self::NotFound {
            scope: scope.clone(),
            id: id.into(),
        }
    }

    /// Stable name of the failure kind, used in error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "SessionNotFound",
            Self::Invalid(_) => "SessionInvalid",
            Self::QueryInvalid(_) => "SessionQueryInvalid",
            Self::Store(_) => "StoreFailure",
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
