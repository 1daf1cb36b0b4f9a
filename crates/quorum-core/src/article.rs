//! Article types: the unit of work moving through peer review.
//!
//! An article owns its review assignments outright: they are value objects
//! with no identity outside the parent, loaded and persisted with it. The
//! editorial status is a closed vocabulary; movement between statuses is left
//! to editorial discretion rather than encoded in a transition table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::review::ReviewAssignment;

// ─── Limits ──────────────────────────────────────────────────────────────────

/// Hard ceiling on concurrent review assignments per article.
pub const REVIEWER_CEILING: usize = 3;

/// Assignment count below which an editorial decision carries the
/// under-reviewed advisory flag. Advisory only; the decision lands regardless.
pub const RECOMMENDED_REVIEWERS: usize = 3;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Editorial status of an article. The wire strings (also stored verbatim in
/// the database) are the lowercase forms, including the embedded space in
/// `under review`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
  Submitted,
  Pending,
  #[serde(rename = "under review")]
  UnderReview,
  Approved,
  Rejected,
}

impl ArticleStatus {
  /// The string stored in the `status` column and used on the wire.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Submitted => "submitted",
      Self::Pending => "pending",
      Self::UnderReview => "under review",
      Self::Approved => "approved",
      Self::Rejected => "rejected",
    }
  }

  /// Inverse of [`as_str`](Self::as_str). Returns `None` for anything outside
  /// the closed vocabulary.
  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "submitted" => Some(Self::Submitted),
      "pending" => Some(Self::Pending),
      "under review" => Some(Self::UnderReview),
      "approved" => Some(Self::Approved),
      "rejected" => Some(Self::Rejected),
      _ => None,
    }
  }
}

// ─── Article ─────────────────────────────────────────────────────────────────

/// A submitted article together with its embedded review assignments.
///
/// `version` increments on every write to the aggregate and gates
/// read-modify-write operations; see
/// [`crate::store::ReviewStore::append_assignments`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
  pub article_id:   Uuid,
  pub journal_id:   Uuid,
  pub submitter_id: Uuid,
  pub title:        String,
  pub status:       ArticleStatus,
  /// Free-text editorial remark; replaced whole on each decision.
  pub comment:      Option<String>,
  /// At most [`REVIEWER_CEILING`] entries, unique per reviewer, in assignment
  /// order.
  pub reviewers:    Vec<ReviewAssignment>,
  /// Store-assigned timestamp; never changes after creation.
  pub submitted_at: DateTime<Utc>,
  pub version:      i64,
}

impl Article {
  /// The assignment held by `reviewer_id`, if any.
  pub fn assignment_for(&self, reviewer_id: Uuid) -> Option<&ReviewAssignment> {
    self.reviewers.iter().find(|a| a.reviewer_id == reviewer_id)
  }

  pub fn is_assigned(&self, reviewer_id: Uuid) -> bool {
    self.assignment_for(reviewer_id).is_some()
  }

  /// Whether a decision on this article should carry the under-reviewed
  /// advisory flag.
  pub fn under_reviewed(&self) -> bool {
    self.reviewers.len() < RECOMMENDED_REVIEWERS
  }
}

// ─── NewArticle ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::ReviewStore::create_article`].
/// Status starts at [`ArticleStatus::Submitted`]; `submitted_at` and `version`
/// are set by the store.
#[derive(Debug, Clone)]
pub struct NewArticle {
  pub journal_id:   Uuid,
  pub submitter_id: Uuid,
  pub title:        String,
}
