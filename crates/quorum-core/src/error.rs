//! Error types for `quorum-core`.
//!
//! This is the domain taxonomy shared by every layer. Storage and mail
//! failures are collapsed into [`Error::Transient`]; everything else is a
//! terminal domain outcome that retrying cannot change.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("article not found: {0}")]
  ArticleNotFound(Uuid),

  #[error("reviewer not found: {0}")]
  ReviewerNotFound(Uuid),

  #[error("journal not found: {0}")]
  JournalNotFound(Uuid),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("constraint violation: {0}")]
  ConstraintViolation(String),

  #[error("review already submitted for article {article} by reviewer {reviewer}")]
  AlreadySubmitted { article: Uuid, reviewer: Uuid },

  #[error("transient failure: {0}")]
  Transient(String),
}

impl Error {
  /// Wrap an infrastructure failure (storage I/O, mail dispatch, retry
  /// exhaustion) as retryable.
  pub fn transient(err: impl std::fmt::Display) -> Self {
    Self::Transient(err.to_string())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
