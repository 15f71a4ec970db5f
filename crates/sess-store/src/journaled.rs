use std::path::Path;
use std::sync::Mutex;

use sess_types::{Session, SessionData};
use tracing::{debug, info};

use crate::error::StoreResult;
use crate::filter::{DocumentKey, Filter};
use crate::journal::{Journal, JournalConfig, JournalRecord};
use crate::memory::InMemoryDocumentStore;
use crate::traits::{DocumentStore, InsertOutcome};

/// Durable document store.
///
/// Live state is an [`InMemoryDocumentStore`]; every mutation is appended to
/// a [`Journal`] before it is applied. Opening the store replays the journal.
///
/// Mutations are serialized by a single write mutex so that the
/// check-journal-apply sequence of each one is atomic. Reads go straight to
/// the in-memory state and never wait on the journal.
pub struct JournaledDocumentStore {
    state: InMemoryDocumentStore,
    journal: Journal,
    write_lock: Mutex<()>,
}

impl JournaledDocumentStore {
    /// Open the journal at `path`, creating it if needed, and replay it.
    pub fn open(path: &Path, config: JournalConfig) -> StoreResult<Self> {
        let journal = Journal::open(path, config)?;
        let state = InMemoryDocumentStore::new();

        let records = journal.recover()?;
        for record in &records {
            match record.to_session()? {
                Some(session) => state.put(session),
                None => {
                    state.remove(&record.key());
                }
            }
        }
        info!(
            path = %path.display(),
            records = records.len(),
            documents = state.len(),
            "session journal replayed"
        );

        Ok(Self {
            state,
            journal,
            write_lock: Mutex::new(()),
        })
    }

    /// Number of live documents.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Returns `true` if no documents are stored.
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Every live document, in insertion order.
    pub fn snapshot(&self) -> Vec<Session> {
        self.state.snapshot()
    }

    /// Rewrite the journal so it holds one `Put` per live document.
    ///
    /// Returns the number of bytes reclaimed.
    pub fn compact(&self) -> StoreResult<u64> {
        let _guard = self.write_lock.lock().expect("write lock poisoned");
        let before = self.journal.offset();
        let records = self
            .state
            .snapshot()
            .iter()
            .map(JournalRecord::put)
            .collect::<StoreResult<Vec<_>>>()?;
        self.journal.rewrite(&records)?;
        let after = self.journal.offset();
        info!(before, after, documents = records.len(), "session journal compacted");
        Ok(before.saturating_sub(after))
    }

    /// The underlying journal.
    pub fn journal(&self) -> &Journal {
        &self.journal
    }
}

impl DocumentStore for JournaledDocumentStore {
    fn insert_if_absent(&self, session: &Session) -> StoreResult<InsertOutcome> {
        let _guard = self.write_lock.lock().expect("write lock poisoned");
        if let Some(existing) = self.state.find_one(&Filter::by_key(DocumentKey::of(session)))? {
            return Ok(InsertOutcome::Existing(existing));
        }
        self.journal.append(&JournalRecord::put(session)?)?;
        self.state.put(session.clone());
        debug!(scope = %session.scope(), id = %session.id.short_hex(), "journaled insert");
        Ok(InsertOutcome::Inserted)
    }

    fn find(&self, filter: &Filter) -> StoreResult<Vec<Session>> {
        self.state.find(filter)
    }

    fn find_one(&self, filter: &Filter) -> StoreResult<Option<Session>> {
        self.state.find_one(filter)
    }

    fn replace_one(&self, filter: &Filter, data: SessionData) -> StoreResult<Option<Session>> {
        let _guard = self.write_lock.lock().expect("write lock poisoned");
        let Some(mut current) = self.state.find_one(filter)? else {
            return Ok(None);
        };
        current.data = data;
        self.journal.append(&JournalRecord::put(&current)?)?;
        self.state.put(current.clone());
        debug!(scope = %current.scope(), id = %current.id.short_hex(), "journaled replace");
        Ok(Some(current))
    }

    fn delete_one(&self, filter: &Filter) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().expect("write lock poisoned");
        let Some(current) = self.state.find_one(filter)? else {
            return Ok(false);
        };
        let key = DocumentKey::of(&current);
        self.journal.append(&JournalRecord::delete(&key))?;
        let removed = self.state.remove(&key);
        debug!(scope = %key.scope, id = %key.id.short_hex(), "journaled delete");
        Ok(removed)
    }
}

impl std::fmt::Debug for JournaledDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournaledDocumentStore")
            .field("journal", &self.journal.path())
            .field("document_count", &self.state.len())
            .finish()
    }
}
