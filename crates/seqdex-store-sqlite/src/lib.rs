//! SQLite backend for the seqdex sequence index.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! connection thread without blocking the async runtime. Index rebuilds run
//! on that same thread, inside one exclusive transaction.

mod encode;
mod rebuild;
mod schema;
mod search;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
