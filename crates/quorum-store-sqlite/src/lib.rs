//! SQLite backend for the Quorum peer-review engine.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. One store implements both
//! [`quorum_core::store::ReviewStore`] and
//! [`quorum_core::store::ReminderLedger`]; the reminder ledger lives in its
//! own table and is never touched by review writes.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
