//! Foundation types for the session store.
//!
//! Every other `sess-*` crate depends on `sess-types`.
//!
//! # Key Types
//!
//! - [`SessionId`]: Content-addressed session identifier (BLAKE3 hash, hex rendered)
//! - [`Source`]: Top-level namespace (client application)
//! - [`SessionType`]: Sub-namespace drawn from a fixed set
//! - [`Scope`]: The `(source, type)` pair every operation is bound to
//! - [`Session`]: The stored document: `id`, `data`, `source`, `type`

pub mod error;
pub mod id;
pub mod scope;
pub mod session;

pub use error::TypeError;
pub use id::SessionId;
pub use scope::{Scope, SessionType, Source};
pub use session::{Session, SessionData};
