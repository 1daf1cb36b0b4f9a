//! Editorial workflow engine for Quorum.
//!
//! [`ReviewService`] wraps a [`quorum_core::store::ReviewStore`] and enforces
//! the editorial rules: who may assign reviewers, when a verdict may land,
//! and which decisions an editor can take. [`ReminderScanner`] walks overdue
//! assignments and nags reviewers by mail, deduplicating against the store's
//! reminder ledger. Neither type knows anything about HTTP.

pub mod mail;
pub mod scanner;
pub mod service;
pub mod ticker;

mod assign;
mod decide;
mod submit;

#[cfg(test)]
pub(crate) mod testutil;

pub use decide::Decision;
pub use scanner::{ReminderScanner, ScanReport, ScannerConfig};
pub use service::ReviewService;

/// How many times a versioned write is retried after losing a race before
/// the operation is reported as transient.
pub(crate) const WRITE_RETRY_LIMIT: usize = 3;
