//! Error type for `quorum-store-sqlite`.
//!
//! Domain outcomes (version conflicts, missing rows, submit-once violations)
//! are reported through the outcome enums in `quorum_core::store`, so this
//! type covers infrastructure failures only.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("decode error: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
