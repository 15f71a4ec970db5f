use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use sess_types::{Scope, Session, SessionData, SessionId};

use crate::error::StoreResult;
use crate::filter::{DocumentKey, Filter};
use crate::traits::{DocumentStore, InsertOutcome};

/// Documents of one `(source, type)` scope.
#[derive(Default)]
struct ScopeDocs {
    by_id: HashMap<SessionId, u64>,
    by_seq: BTreeMap<u64, Session>,
}

impl ScopeDocs {
    /// Sequence number of the first document matching `filter`.
    fn locate(&self, filter: &Filter) -> Option<u64> {
        match filter.id() {
            Some(id) => self
                .by_id
                .get(id)
                .copied()
                .filter(|seq| self.by_seq.get(seq).is_some_and(|s| filter.matches(s))),
            None => self
                .by_seq
                .iter()
                .find(|(_, s)| filter.matches(s))
                .map(|(seq, _)| *seq),
        }
    }
}

#[derive(Default)]
struct Inner {
    scopes: HashMap<Scope, ScopeDocs>,
    next_seq: u64,
}

impl Inner {
    fn remove(&mut self, scope: &Scope, seq: u64) -> Option<Session> {
        let docs = self.scopes.get_mut(scope)?;
        let removed = docs.by_seq.remove(&seq)?;
        docs.by_id.remove(&removed.id);
        if docs.by_seq.is_empty() {
            self.scopes.remove(scope);
        }
        Some(removed)
    }

    /// Remove the first document matching `filter`. Returns `true` if one
    /// was removed.
    fn remove_matching(&mut self, filter: &Filter) -> bool {
        let Some(seq) = self
            .scopes
            .get(filter.scope())
            .and_then(|docs| docs.locate(filter))
        else {
            return false;
        };
        self.remove(filter.scope(), seq).is_some()
    }
}

/// In-memory document store.
///
/// Intended for tests and embedding, and used as the live state of
/// [`JournaledDocumentStore`](crate::JournaledDocumentStore). Documents are
/// grouped per scope behind a single `RwLock`; each carries an insertion
/// sequence number that fixes result order.
pub struct InMemoryDocumentStore {
    inner: RwLock<Inner>,
}

impl InMemoryDocumentStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Number of documents currently stored, across all scopes.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .expect("lock poisoned")
            .scopes
            .values()
            .map(|docs| docs.by_seq.len())
            .sum()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().expect("lock poisoned").scopes.is_empty()
    }

    /// Every stored document across all scopes, in insertion order.
    pub fn snapshot(&self) -> Vec<Session> {
        let inner = self.inner.read().expect("lock poisoned");
        let mut all: Vec<(u64, Session)> = inner
            .scopes
            .values()
            .flat_map(|docs| docs.by_seq.iter().map(|(seq, s)| (*seq, s.clone())))
            .collect();
        all.sort_unstable_by_key(|(seq, _)| *seq);
        all.into_iter().map(|(_, s)| s).collect()
    }

    /// Store `session` unconditionally, overwriting any document with the
    /// same key in place (its position in insertion order is kept).
    pub fn put(&self, session: Session) {
        let mut inner = self.inner.write().expect("lock poisoned");
        let seq = inner.next_seq;
        let docs = inner.scopes.entry(session.scope()).or_default();
        match docs.by_id.get(&session.id) {
            Some(existing) => {
                docs.by_seq.insert(*existing, session);
            }
            None => {
                docs.by_id.insert(session.id, seq);
                docs.by_seq.insert(seq, session);
                inner.next_seq += 1;
            }
        }
    }

    /// Remove the document at `key`. Returns `true` if it existed.
    pub fn remove(&self, key: &DocumentKey) -> bool {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.remove_matching(&Filter::by_key(key.clone()))
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn insert_if_absent(&self, session: &Session) -> StoreResult<InsertOutcome> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let seq = inner.next_seq;
        let docs = inner.scopes.entry(session.scope()).or_default();
        if let Some(existing) = docs.by_id.get(&session.id) {
            let current = docs.by_seq[existing].clone();
            return Ok(InsertOutcome::Existing(current));
        }
        docs.by_id.insert(session.id, seq);
        docs.by_seq.insert(seq, session.clone());
        inner.next_seq += 1;
        Ok(InsertOutcome::Inserted)
    }

    fn find(&self, filter: &Filter) -> StoreResult<Vec<Session>> {
        let inner = self.inner.read().expect("lock poisoned");
        let Some(docs) = inner.scopes.get(filter.scope()) else {
            return Ok(Vec::new());
        };
        let found = match filter.id() {
            Some(_) => docs
                .locate(filter)
                .map(|seq| vec![docs.by_seq[&seq].clone()])
                .unwrap_or_default(),
            None => docs
                .by_seq
                .values()
                .filter(|s| filter.matches(s))
                .cloned()
                .collect(),
        };
        Ok(found)
    }

    fn find_one(&self, filter: &Filter) -> StoreResult<Option<Session>> {
        let inner = self.inner.read().expect("lock poisoned");
        Ok(inner
            .scopes
            .get(filter.scope())
            .and_then(|docs| docs.locate(filter).map(|seq| docs.by_seq[&seq].clone())))
    }

    fn replace_one(&self, filter: &Filter, data: SessionData) -> StoreResult<Option<Session>> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let Some(docs) = inner.scopes.get_mut(filter.scope()) else {
            return Ok(None);
        };
        let Some(seq) = docs.locate(filter) else {
            return Ok(None);
        };
        let Some(session) = docs.by_seq.get_mut(&seq) else {
            return Ok(None);
        };
        session.data = data;
        Ok(Some(session.clone()))
    }

    fn delete_one(&self, filter: &Filter) -> StoreResult<bool> {
        let mut inner = self.inner.write().expect("lock poisoned");
        Ok(inner.remove_matching(filter))
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryDocumentStore")
            .field("document_count", &count)
            .finish()
    }
}
