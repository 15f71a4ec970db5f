//! Query screening for the session store.
//!
//! Every field path that reaches a store filter passes through this crate
//! first. A path is rejected if it contains a NUL character, or if any of
//! its dot-separated segments starts with `$` (store operator syntax such as
//! `$where` or `$ne`). Condition paths must also be non-empty with no empty
//! segments; keys nested inside filter values are literal keys and may be
//! empty.
//!
//! Validation is a pure function returning a tagged [`PathCheck`]; the only
//! way to obtain a [`FieldPath`] is through a `Valid` result, so any value of
//! that type has already been screened.
//!
//! Structured filter documents are screened by [`screen_filter`], which walks
//! every key at every nesting level, not just the top one.

pub mod error;
pub mod filter;
pub mod path;

pub use error::{QueryError, QueryResult};
pub use filter::{parse_filter, screen_filter, Condition};
pub use path::{screen_key, validate_path, FieldPath, PathCheck, PathRejection};
