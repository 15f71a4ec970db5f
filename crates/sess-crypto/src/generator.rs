use sess_types::{Scope, SessionData, SessionId};

use crate::canonical::write_canonical_object;
use crate::hasher::ContentHasher;

/// Derives content-addressed session identifiers.
///
/// `generate(scope, data)` is a pure function of the exact source string,
/// the type name, and the canonical encoding of `data`. It is computed once,
/// when a session is created; later replaces keep the original id.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionIdGenerator;

impl SessionIdGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Identifier for `data` stored under `scope`.
    pub fn generate(&self, scope: &Scope, data: &SessionData) -> SessionId {
        let mut encoded = Vec::new();
        write_canonical_object(data, &mut encoded);
        self.generate_raw(scope.source.as_str(), scope.kind.as_str(), &encoded)
    }

    /// Identifier over already-encoded parts.
    ///
    /// `data` must be the canonical encoding (see [`crate::canonical_bytes`]).
    pub fn generate_raw(&self, source: &str, kind: &str, data: &[u8]) -> SessionId {
        SessionId::from_hash(ContentHasher::SESSION_ID.hash_parts(&[
            source.as_bytes(),
            kind.as_bytes(),
            data,
        ]))
    }
}
