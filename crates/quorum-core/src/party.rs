//! Reviewer and journal records, the directory the engine resolves
//! assignments against.
//!
//! Accounts and authentication live upstream; these rows carry only what the
//! engine itself needs (routing reminder mail, knowing which editor owns a
//! journal).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person who can hold review assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reviewer {
  pub reviewer_id: Uuid,
  pub name:        String,
  pub email:       String,
  pub created_at:  DateTime<Utc>,
}

/// A journal accepting submissions. `editor_id` is the sole authority for
/// assignment and decision calls on the journal's articles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journal {
  pub journal_id: Uuid,
  pub title:      String,
  pub editor_id:  Uuid,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::ReviewStore::add_reviewer`].
#[derive(Debug, Clone)]
pub struct NewReviewer {
  pub name:  String,
  pub email: String,
}

/// Input to [`crate::store::ReviewStore::add_journal`].
#[derive(Debug, Clone)]
pub struct NewJournal {
  pub title:     String,
  pub editor_id: Uuid,
}
