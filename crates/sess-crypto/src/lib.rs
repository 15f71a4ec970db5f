//! Content hashing for the session store.
//!
//! Provides domain-separated BLAKE3 hashing, a canonical JSON encoding, and
//! [`SessionIdGenerator`], which derives a session's identifier from its
//! `(source, type, data)` triple.
//!
//! All hashing goes through BLAKE3; there is no custom cryptography.

pub mod canonical;
pub mod generator;
pub mod hasher;

pub use canonical::{canonical_bytes, write_canonical, write_canonical_object};
pub use generator::SessionIdGenerator;
pub use hasher::ContentHasher;
