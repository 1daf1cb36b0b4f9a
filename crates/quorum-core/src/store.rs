//! The `ReviewStore` and `ReminderLedger` traits and supporting types.
//!
//! The traits are implemented by storage backends (e.g.
//! `quorum-store-sqlite`). Higher layers (`quorum-engine`, `quorum-api`)
//! depend on these abstractions, not on any concrete backend.
//!
//! Writes that can race (assignment appends, deletion, review submission)
//! report their domain outcome through dedicated enums. `Self::Error` is
//! reserved for infrastructure failures and maps to
//! [`Transient`](crate::Error::Transient) upstream.

use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
  article::{Article, ArticleStatus, NewArticle},
  party::{Journal, NewJournal, NewReviewer, Reviewer},
  review::{NewAssignment, ReviewSubmission},
};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Result of a version-gated assignment append.
#[derive(Debug, Clone)]
pub enum AppendOutcome {
  /// The rows were written; the refreshed aggregate is returned.
  Applied(Article),
  /// The article changed since the caller loaded it; reload and retry.
  VersionConflict,
  /// The article no longer exists.
  ArticleMissing,
}

/// Result of a conditional review write.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
  Recorded(Article),
  /// No assignment row exists for this (article, reviewer) pair.
  NotAssigned,
  /// The assignment already carries a verdict; reviews are submit-once.
  AlreadyReviewed,
  ArticleMissing,
}

/// Result of a version-gated delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
  Deleted,
  VersionConflict,
  Missing,
}

// ─── Scanner row ─────────────────────────────────────────────────────────────

/// One unreviewed (article, reviewer) pair, denormalised with everything a
/// reminder mail needs so the scanner does no further lookups.
#[derive(Debug, Clone)]
pub struct PendingReview {
  pub article_id:     Uuid,
  pub article_title:  String,
  pub journal_title:  String,
  pub reviewer_id:    Uuid,
  pub reviewer_name:  String,
  pub reviewer_email: String,
  pub assigned_at:    DateTime<Utc>,
}

// ─── Review store ────────────────────────────────────────────────────────────

/// Abstraction over a Quorum storage backend.
///
/// Every write that touches an article bumps its `version`, so the
/// version-gated operations form a compare-and-swap loop for callers that
/// validated against a loaded aggregate.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ReviewStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Directory ─────────────────────────────────────────────────────────

  /// Create and persist a reviewer. `created_at` is set by the store.
  fn add_reviewer(
    &self,
    input: NewReviewer,
  ) -> impl Future<Output = Result<Reviewer, Self::Error>> + Send + '_;

  /// Retrieve a reviewer by UUID. Returns `None` if not found.
  fn get_reviewer(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Reviewer>, Self::Error>> + Send + '_;

  /// Create and persist a journal. `created_at` is set by the store.
  fn add_journal(
    &self,
    input: NewJournal,
  ) -> impl Future<Output = Result<Journal, Self::Error>> + Send + '_;

  /// Retrieve a journal by UUID. Returns `None` if not found.
  fn get_journal(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Journal>, Self::Error>> + Send + '_;

  // ── Articles ──────────────────────────────────────────────────────────

  /// Persist a new article in `submitted` status with no assignments and
  /// version 0.
  fn create_article(
    &self,
    input: NewArticle,
  ) -> impl Future<Output = Result<Article, Self::Error>> + Send + '_;

  /// Load the full aggregate (article plus assignments). Returns `None` if
  /// not found.
  fn get_article(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Article>, Self::Error>> + Send + '_;

  /// Delete the article and everything hanging off it (assignments, reminder
  /// history), but only while its version still matches `expected_version`.
  fn delete_article(
    &self,
    id: Uuid,
    expected_version: i64,
  ) -> impl Future<Output = Result<DeleteOutcome, Self::Error>> + Send + '_;

  // ── Assignments ───────────────────────────────────────────────────────

  /// Append assignment rows atomically, gated on `expected_version`.
  ///
  /// The caller validates the batch (ceiling, duplicates, reviewer
  /// existence) against the aggregate it loaded at `expected_version`; the
  /// gate guarantees that validation still holds when the rows land. Either
  /// every row is written or none is.
  fn append_assignments(
    &self,
    article_id: Uuid,
    expected_version: i64,
    assignments: Vec<NewAssignment>,
  ) -> impl Future<Output = Result<AppendOutcome, Self::Error>> + Send + '_;

  /// Attach a verdict to one pending assignment.
  ///
  /// The write is conditional on the assignment still being pending, so two
  /// racing submissions cannot both be recorded.
  fn record_review(
    &self,
    article_id: Uuid,
    reviewer_id: Uuid,
    submission: ReviewSubmission,
  ) -> impl Future<Output = Result<SubmitOutcome, Self::Error>> + Send + '_;

  // ── Decisions ─────────────────────────────────────────────────────────

  /// Overwrite status and/or comment unconditionally. `None` leaves the
  /// field as it was. Returns the refreshed aggregate, or `None` if the
  /// article does not exist.
  fn set_decision(
    &self,
    article_id: Uuid,
    status: Option<ArticleStatus>,
    comment: Option<String>,
  ) -> impl Future<Output = Result<Option<Article>, Self::Error>> + Send + '_;

  // ── Scanner ───────────────────────────────────────────────────────────

  /// All assignments still pending whose `assigned_at` is at or before
  /// `assigned_before`, oldest first.
  fn list_pending_assignments(
    &self,
    assigned_before: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<PendingReview>, Self::Error>> + Send + '_;
}

// ─── Reminder ledger ─────────────────────────────────────────────────────────

/// Durable record of when each (reviewer, article) pair was last reminded.
///
/// Kept behind its own trait so that recording a reminder never touches
/// review state, and so the ledger could move to a different backend without
/// disturbing [`ReviewStore`].
pub trait ReminderLedger: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// When this pair was last reminded, if ever.
  fn reminder_last_sent(
    &self,
    reviewer_id: Uuid,
    article_id: Uuid,
  ) -> impl Future<Output = Result<Option<DateTime<Utc>>, Self::Error>> + Send + '_;

  /// Record a reminder sent at `sent_at`, but only if the previous entry is
  /// at least `cooldown` old (or absent). Returns `true` if the write was
  /// applied; `false` means another sender got there inside the window.
  fn reminder_mark_sent(
    &self,
    reviewer_id: Uuid,
    article_id: Uuid,
    sent_at: DateTime<Utc>,
    cooldown: Duration,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
