//! Session repository.
//!
//! [`SessionRepository`] is the create/read/query/replace/delete engine over
//! a [`DocumentStore`](sess_store::DocumentStore). Every operation is bound
//! to a [`Scope`](sess_types::Scope); a session is never visible, replaceable
//! or deletable from any scope but its own.
//!
//! Failures are reported through [`SessionError`], which separates the three
//! kinds of caller-input rejection (not found, invalid payload, invalid
//! query) from infrastructure failures of the store.

pub mod error;
pub mod payload;
pub mod repository;

pub use error::{InvalidPayload, SessionError, SessionResult};
pub use payload::parse_payload;
pub use repository::SessionRepository;

// Re-export key types
pub use sess_store::{DocumentStore, InMemoryDocumentStore, JournalConfig, JournaledDocumentStore, SyncMode};
pub use sess_types::{Scope, Session, SessionData, SessionId, SessionType, Source};
