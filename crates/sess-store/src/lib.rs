//! Document storage for the session store.
//!
//! Sessions are stored as whole documents keyed by `(source, type, id)`.
//! The store never interprets session payloads: it matches filters against
//! the document shape and otherwise treats data as opaque JSON.
//!
//! # Storage Backends
//!
//! All backends implement the [`DocumentStore`] trait:
//!
//! - [`InMemoryDocumentStore`] -- map-based store for tests and embedding
//! - [`JournaledDocumentStore`] -- in-memory state recovered from, and
//!   written through to, an append-only [`Journal`]
//!
//! # Design Rules
//!
//! 1. Every filter carries a [`Scope`](sess_types::Scope); there is no unscoped read.
//! 2. Filter conditions only accept screened [`FieldPath`](sess_query::FieldPath)s.
//! 3. `insert_if_absent` is atomic per key: racing identical inserts store one document.
//! 4. Results come back in insertion order.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod filter;
pub mod journal;
pub mod journaled;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use filter::{DocumentKey, Filter};
pub use journal::{Journal, JournalConfig, JournalRecord, SyncMode};
pub use journaled::JournaledDocumentStore;
pub use memory::InMemoryDocumentStore;
pub use traits::{DocumentStore, InsertOutcome};
