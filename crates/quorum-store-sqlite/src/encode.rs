//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings, UUIDs as hyphenated
//! lowercase strings, and the article status as its wire string. A pending
//! assignment is a row whose verdict triple is NULL.

use chrono::{DateTime, Utc};
use quorum_core::{
  article::{Article, ArticleStatus},
  party::{Journal, Reviewer},
  review::{ReviewAssignment, ReviewState},
  store::PendingReview,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(e.to_string()))
}

// ─── ArticleStatus
// ────────────────────────────────────────────────────────────

pub fn decode_status(s: &str) -> Result<ArticleStatus> {
  ArticleStatus::parse(s)
    .ok_or_else(|| Error::Decode(format!("unknown article status: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `articles` row.
pub struct RawArticle {
  pub article_id:   String,
  pub journal_id:   String,
  pub submitter_id: String,
  pub title:        String,
  pub status:       String,
  pub comment:      Option<String>,
  pub submitted_at: String,
  pub version:      i64,
}

impl RawArticle {
  pub fn into_article(self, assignments: Vec<RawAssignment>) -> Result<Article> {
    let reviewers = assignments
      .into_iter()
      .map(RawAssignment::into_assignment)
      .collect::<Result<Vec<_>>>()?;

    Ok(Article {
      article_id:   decode_uuid(&self.article_id)?,
      journal_id:   decode_uuid(&self.journal_id)?,
      submitter_id: decode_uuid(&self.submitter_id)?,
      title:        self.title,
      status:       decode_status(&self.status)?,
      comment:      self.comment,
      reviewers,
      submitted_at: decode_dt(&self.submitted_at)?,
      version:      self.version,
    })
  }
}

/// Raw strings read directly from a `review_assignments` row.
pub struct RawAssignment {
  pub reviewer_id: String,
  pub assigned_at: String,
  pub verdict:     Option<String>,
  pub comment:     Option<String>,
  pub reviewed_at: Option<String>,
}

impl RawAssignment {
  pub fn into_assignment(self) -> Result<ReviewAssignment> {
    let reviewer_id = decode_uuid(&self.reviewer_id)?;
    let assigned_at = decode_dt(&self.assigned_at)?;

    let state = match (self.verdict, self.reviewed_at) {
      (None, None) => ReviewState::Pending,
      (Some(verdict), Some(at_str)) => ReviewState::Submitted {
        verdict,
        comment: self.comment.unwrap_or_default(),
        reviewed_at: decode_dt(&at_str)?,
      },
      _ => {
        return Err(Error::Decode(format!(
          "assignment row for reviewer {reviewer_id} has a partial verdict"
        )));
      }
    };

    Ok(ReviewAssignment { reviewer_id, assigned_at, state })
  }
}

/// Raw strings read directly from a `reviewers` row.
pub struct RawReviewer {
  pub reviewer_id: String,
  pub name:        String,
  pub email:       String,
  pub created_at:  String,
}

impl RawReviewer {
  pub fn into_reviewer(self) -> Result<Reviewer> {
    Ok(Reviewer {
      reviewer_id: decode_uuid(&self.reviewer_id)?,
      name:        self.name,
      email:       self.email,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `journals` row.
pub struct RawJournal {
  pub journal_id: String,
  pub title:      String,
  pub editor_id:  String,
  pub created_at: String,
}

impl RawJournal {
  pub fn into_journal(self) -> Result<Journal> {
    Ok(Journal {
      journal_id: decode_uuid(&self.journal_id)?,
      title:      self.title,
      editor_id:  decode_uuid(&self.editor_id)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings from the scanner join across assignments, articles, journals
/// and reviewers.
pub struct RawPendingReview {
  pub article_id:     String,
  pub article_title:  String,
  pub journal_title:  String,
  pub reviewer_id:    String,
  pub reviewer_name:  String,
  pub reviewer_email: String,
  pub assigned_at:    String,
}

impl RawPendingReview {
  pub fn into_pending(self) -> Result<PendingReview> {
    Ok(PendingReview {
      article_id:     decode_uuid(&self.article_id)?,
      article_title:  self.article_title,
      journal_title:  self.journal_title,
      reviewer_id:    decode_uuid(&self.reviewer_id)?,
      reviewer_name:  self.reviewer_name,
      reviewer_email: self.reviewer_email,
      assigned_at:    decode_dt(&self.assigned_at)?,
    })
  }
}
