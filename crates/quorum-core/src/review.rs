//! Review assignment types, value objects embedded in an article.
//!
//! An assignment has no identity of its own; it is keyed by the
//! (article, reviewer) pair and lives and dies with its article. Submission
//! is one-way: once a verdict lands the assignment never returns to pending.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── State ───────────────────────────────────────────────────────────────────

/// Whether the reviewer has delivered a verdict yet. The two-armed shape makes
/// "submitted but verdict missing" unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ReviewState {
  Pending,
  Submitted {
    /// Free-text recommendation chosen in the reviewer's portal, e.g.
    /// "accept" or "major revision". Not interpreted by the engine.
    verdict:     String,
    comment:     String,
    reviewed_at: DateTime<Utc>,
  },
}

impl ReviewState {
  pub fn is_pending(&self) -> bool { matches!(self, Self::Pending) }
}

// ─── Assignment ──────────────────────────────────────────────────────────────

/// One reviewer's slot on one article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewAssignment {
  pub reviewer_id: Uuid,
  pub assigned_at: DateTime<Utc>,
  #[serde(flatten)]
  pub state:       ReviewState,
}

impl ReviewAssignment {
  pub fn is_pending(&self) -> bool { self.state.is_pending() }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::ReviewStore::append_assignments`]. The timestamp
/// is caller-supplied so every entry in one batch shares a single instant.
#[derive(Debug, Clone)]
pub struct NewAssignment {
  pub reviewer_id: Uuid,
  pub assigned_at: DateTime<Utc>,
}

/// Input to [`crate::store::ReviewStore::record_review`].
#[derive(Debug, Clone)]
pub struct ReviewSubmission {
  pub verdict:     String,
  pub comment:     String,
  pub reviewed_at: DateTime<Utc>,
}
