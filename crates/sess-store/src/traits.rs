use sess_types::{Session, SessionData};

use crate::error::StoreResult;
use crate::filter::Filter;

/// Result of [`DocumentStore::insert_if_absent`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The document was stored.
    Inserted,
    /// A document with the same key already existed and was left untouched.
    Existing(Session),
}

/// Scoped document store.
///
/// All implementations must satisfy these invariants:
/// - Documents are keyed by `(source, type, id)`; at most one per key.
/// - `insert_if_absent` is atomic: concurrent inserts of the same key store
///   exactly one document and every caller sees the same stored value.
/// - Reads never cross the filter's scope.
/// - `find` returns documents in insertion order.
/// - All I/O errors are propagated, never silently ignored.
pub trait DocumentStore: Send + Sync {
    /// Store `session` unless its key is already taken.
    fn insert_if_absent(&self, session: &Session) -> StoreResult<InsertOutcome>;

    /// All documents matching `filter`, in insertion order.
    fn find(&self, filter: &Filter) -> StoreResult<Vec<Session>>;

    /// Replace the data of the first document matching `filter`.
    ///
    /// Returns the updated document, or `None` if nothing matched. The id
    /// and scope of the document are never changed.
    fn replace_one(&self, filter: &Filter, data: SessionData) -> StoreResult<Option<Session>>;

    /// Delete the first document matching `filter`. Returns `true` if one
    /// was removed.
    fn delete_one(&self, filter: &Filter) -> StoreResult<bool>;

    /// The first document matching `filter`.
    ///
    /// Default implementation calls `find()`. Backends should override when
    /// the filter pins a key.
    fn find_one(&self, filter: &Filter) -> StoreResult<Option<Session>> {
        Ok(self.find(filter)?.into_iter().next())
    }
}
