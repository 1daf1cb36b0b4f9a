//! [`SqliteStore`] — the SQLite implementation of [`ReviewStore`] and
//! [`ReminderLedger`].
//!
//! Version-gated statements (`... AND version = ?`) stand in for row locks:
//! the single writer thread serialises statements, and the version column
//! catches stale read-modify-write cycles that span multiple calls.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use quorum_core::{
  article::{Article, ArticleStatus, NewArticle},
  party::{Journal, NewJournal, NewReviewer, Reviewer},
  review::{NewAssignment, ReviewSubmission},
  store::{
    AppendOutcome, DeleteOutcome, PendingReview, ReminderLedger, ReviewStore,
    SubmitOutcome,
  },
};

use crate::{
  encode::{
    decode_dt, encode_dt, encode_uuid, RawArticle, RawAssignment, RawJournal,
    RawPendingReview, RawReviewer,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Row helpers ─────────────────────────────────────────────────────────────

/// Load an article row plus its assignment rows. Shared by every operation
/// that returns the refreshed aggregate, including mid-transaction re-reads
/// (a [`rusqlite::Transaction`] derefs to a connection).
fn load_article_rows(
  conn: &rusqlite::Connection,
  id_str: &str,
) -> rusqlite::Result<Option<(RawArticle, Vec<RawAssignment>)>> {
  let article = conn
    .query_row(
      "SELECT article_id, journal_id, submitter_id, title, status, comment,
              submitted_at, version
       FROM articles WHERE article_id = ?1",
      rusqlite::params![id_str],
      |row| {
        Ok(RawArticle {
          article_id:   row.get(0)?,
          journal_id:   row.get(1)?,
          submitter_id: row.get(2)?,
          title:        row.get(3)?,
          status:       row.get(4)?,
          comment:      row.get(5)?,
          submitted_at: row.get(6)?,
          version:      row.get(7)?,
        })
      },
    )
    .optional()?;

  let Some(article) = article else {
    return Ok(None);
  };

  let mut stmt = conn.prepare(
    "SELECT reviewer_id, assigned_at, verdict, comment, reviewed_at
     FROM review_assignments
     WHERE article_id = ?1
     ORDER BY assigned_at, rowid",
  )?;
  let assignments = stmt
    .query_map(rusqlite::params![id_str], |row| {
      Ok(RawAssignment {
        reviewer_id: row.get(0)?,
        assigned_at: row.get(1)?,
        verdict:     row.get(2)?,
        comment:     row.get(3)?,
        reviewed_at: row.get(4)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(Some((article, assignments)))
}

fn article_exists(
  conn: &rusqlite::Connection,
  id_str: &str,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM articles WHERE article_id = ?1",
        rusqlite::params![id_str],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

// Closure-side results; decoded into the core outcome enums once back on the
// async side.
enum RawAppend {
  Applied(RawArticle, Vec<RawAssignment>),
  Conflict,
  Missing,
}

enum RawSubmit {
  Recorded(RawArticle, Vec<RawAssignment>),
  NotAssigned,
  AlreadyReviewed,
  Missing,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Quorum review store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ReviewStore impl ────────────────────────────────────────────────────────

impl ReviewStore for SqliteStore {
  type Error = Error;

  // ── Directory ─────────────────────────────────────────────────────────────

  async fn add_reviewer(&self, input: NewReviewer) -> Result<Reviewer> {
    let reviewer = Reviewer {
      reviewer_id: Uuid::new_v4(),
      name:        input.name,
      email:       input.email,
      created_at:  Utc::now(),
    };

    let id_str = encode_uuid(reviewer.reviewer_id);
    let at_str = encode_dt(reviewer.created_at);
    let name   = reviewer.name.clone();
    let email  = reviewer.email.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reviewers (reviewer_id, name, email, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, email, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(reviewer)
  }

  async fn get_reviewer(&self, id: Uuid) -> Result<Option<Reviewer>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawReviewer> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT reviewer_id, name, email, created_at
               FROM reviewers WHERE reviewer_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawReviewer {
                  reviewer_id: row.get(0)?,
                  name:        row.get(1)?,
                  email:       row.get(2)?,
                  created_at:  row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReviewer::into_reviewer).transpose()
  }

  async fn add_journal(&self, input: NewJournal) -> Result<Journal> {
    let journal = Journal {
      journal_id: Uuid::new_v4(),
      title:      input.title,
      editor_id:  input.editor_id,
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(journal.journal_id);
    let editor_str = encode_uuid(journal.editor_id);
    let at_str     = encode_dt(journal.created_at);
    let title      = journal.title.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO journals (journal_id, title, editor_id, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, title, editor_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(journal)
  }

  async fn get_journal(&self, id: Uuid) -> Result<Option<Journal>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawJournal> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT journal_id, title, editor_id, created_at
               FROM journals WHERE journal_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawJournal {
                  journal_id: row.get(0)?,
                  title:      row.get(1)?,
                  editor_id:  row.get(2)?,
                  created_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawJournal::into_journal).transpose()
  }

  // ── Articles ──────────────────────────────────────────────────────────────

  async fn create_article(&self, input: NewArticle) -> Result<Article> {
    let article = Article {
      article_id:   Uuid::new_v4(),
      journal_id:   input.journal_id,
      submitter_id: input.submitter_id,
      title:        input.title,
      status:       ArticleStatus::Submitted,
      comment:      None,
      reviewers:    Vec::new(),
      submitted_at: Utc::now(),
      version:      0,
    };

    let id_str        = encode_uuid(article.article_id);
    let journal_str   = encode_uuid(article.journal_id);
    let submitter_str = encode_uuid(article.submitter_id);
    let title         = article.title.clone();
    let status_str    = article.status.as_str().to_owned();
    let at_str        = encode_dt(article.submitted_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO articles
             (article_id, journal_id, submitter_id, title, status, comment,
              submitted_at, version)
           VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, 0)",
          rusqlite::params![
            id_str,
            journal_str,
            submitter_str,
            title,
            status_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(article)
  }

  async fn get_article(&self, id: Uuid) -> Result<Option<Article>> {
    let id_str = encode_uuid(id);

    let rows: Option<(RawArticle, Vec<RawAssignment>)> = self
      .conn
      .call(move |conn| Ok(load_article_rows(conn, &id_str)?))
      .await?;

    rows
      .map(|(article, assignments)| article.into_article(assignments))
      .transpose()
  }

  async fn delete_article(
    &self,
    id: Uuid,
    expected_version: i64,
  ) -> Result<DeleteOutcome> {
    let id_str = encode_uuid(id);

    let outcome = self
      .conn
      .call(move |conn| {
        let deleted = conn.execute(
          "DELETE FROM articles WHERE article_id = ?1 AND version = ?2",
          rusqlite::params![id_str, expected_version],
        )?;
        if deleted == 1 {
          return Ok(DeleteOutcome::Deleted);
        }
        Ok(if article_exists(conn, &id_str)? {
          DeleteOutcome::VersionConflict
        } else {
          DeleteOutcome::Missing
        })
      })
      .await?;

    Ok(outcome)
  }

  // ── Assignments ───────────────────────────────────────────────────────────

  async fn append_assignments(
    &self,
    article_id: Uuid,
    expected_version: i64,
    assignments: Vec<NewAssignment>,
  ) -> Result<AppendOutcome> {
    let id_str = encode_uuid(article_id);
    let rows: Vec<(String, String)> = assignments
      .iter()
      .map(|a| (encode_uuid(a.reviewer_id), encode_dt(a.assigned_at)))
      .collect();

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // The version bump doubles as the compare-and-swap: zero rows
        // touched means the caller's snapshot is stale or gone.
        let bumped = tx.execute(
          "UPDATE articles SET version = version + 1
           WHERE article_id = ?1 AND version = ?2",
          rusqlite::params![id_str, expected_version],
        )?;
        if bumped == 0 {
          return Ok(if article_exists(&tx, &id_str)? {
            RawAppend::Conflict
          } else {
            RawAppend::Missing
          });
        }

        for (reviewer_str, at_str) in &rows {
          tx.execute(
            "INSERT INTO review_assignments (article_id, reviewer_id, assigned_at)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![id_str, reviewer_str, at_str],
          )?;
        }

        let Some((article, assignments)) = load_article_rows(&tx, &id_str)?
        else {
          return Err(rusqlite::Error::QueryReturnedNoRows.into());
        };
        tx.commit()?;
        Ok(RawAppend::Applied(article, assignments))
      })
      .await?;

    Ok(match raw {
      RawAppend::Applied(article, assignments) => {
        AppendOutcome::Applied(article.into_article(assignments)?)
      }
      RawAppend::Conflict => AppendOutcome::VersionConflict,
      RawAppend::Missing => AppendOutcome::ArticleMissing,
    })
  }

  async fn record_review(
    &self,
    article_id: Uuid,
    reviewer_id: Uuid,
    submission: ReviewSubmission,
  ) -> Result<SubmitOutcome> {
    let id_str       = encode_uuid(article_id);
    let reviewer_str = encode_uuid(reviewer_id);
    let verdict      = submission.verdict;
    let comment      = submission.comment;
    let at_str       = encode_dt(submission.reviewed_at);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if !article_exists(&tx, &id_str)? {
          return Ok(RawSubmit::Missing);
        }

        let reviewed: Option<Option<String>> = tx
          .query_row(
            "SELECT reviewed_at FROM review_assignments
             WHERE article_id = ?1 AND reviewer_id = ?2",
            rusqlite::params![id_str, reviewer_str],
            |row| row.get(0),
          )
          .optional()?;

        match reviewed {
          None => return Ok(RawSubmit::NotAssigned),
          Some(Some(_)) => return Ok(RawSubmit::AlreadyReviewed),
          Some(None) => {}
        }

        // Conditional on the row still being pending, so a raced duplicate
        // can never overwrite a landed verdict.
        tx.execute(
          "UPDATE review_assignments
           SET verdict = ?3, comment = ?4, reviewed_at = ?5
           WHERE article_id = ?1 AND reviewer_id = ?2 AND reviewed_at IS NULL",
          rusqlite::params![id_str, reviewer_str, verdict, comment, at_str],
        )?;
        tx.execute(
          "UPDATE articles SET version = version + 1 WHERE article_id = ?1",
          rusqlite::params![id_str],
        )?;

        let Some((article, assignments)) = load_article_rows(&tx, &id_str)?
        else {
          return Err(rusqlite::Error::QueryReturnedNoRows.into());
        };
        tx.commit()?;
        Ok(RawSubmit::Recorded(article, assignments))
      })
      .await?;

    Ok(match raw {
      RawSubmit::Recorded(article, assignments) => {
        SubmitOutcome::Recorded(article.into_article(assignments)?)
      }
      RawSubmit::NotAssigned => SubmitOutcome::NotAssigned,
      RawSubmit::AlreadyReviewed => SubmitOutcome::AlreadyReviewed,
      RawSubmit::Missing => SubmitOutcome::ArticleMissing,
    })
  }

  // ── Decisions ─────────────────────────────────────────────────────────────

  async fn set_decision(
    &self,
    article_id: Uuid,
    status: Option<ArticleStatus>,
    comment: Option<String>,
  ) -> Result<Option<Article>> {
    let id_str     = encode_uuid(article_id);
    let status_str = status.map(|s| s.as_str().to_owned());

    let rows = self
      .conn
      .call(move |conn| {
        let updated = conn.execute(
          "UPDATE articles SET
             status  = COALESCE(?2, status),
             comment = COALESCE(?3, comment),
             version = version + 1
           WHERE article_id = ?1",
          rusqlite::params![id_str, status_str, comment],
        )?;
        if updated == 0 {
          return Ok(None);
        }
        Ok(load_article_rows(conn, &id_str)?)
      })
      .await?;

    rows
      .map(|(article, assignments)| article.into_article(assignments))
      .transpose()
  }

  // ── Scanner ───────────────────────────────────────────────────────────────

  async fn list_pending_assignments(
    &self,
    assigned_before: DateTime<Utc>,
  ) -> Result<Vec<PendingReview>> {
    let cutoff_str = encode_dt(assigned_before);

    let raws: Vec<RawPendingReview> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT
             r.article_id, a.title, j.title,
             r.reviewer_id, v.name, v.email, r.assigned_at
           FROM review_assignments r
           JOIN articles  a ON a.article_id  = r.article_id
           JOIN journals  j ON j.journal_id  = a.journal_id
           JOIN reviewers v ON v.reviewer_id = r.reviewer_id
           WHERE r.reviewed_at IS NULL
             AND r.assigned_at <= ?1
           ORDER BY r.assigned_at",
        )?;

        let rows = stmt
          .query_map(rusqlite::params![cutoff_str], |row| {
            Ok(RawPendingReview {
              article_id:     row.get(0)?,
              article_title:  row.get(1)?,
              journal_title:  row.get(2)?,
              reviewer_id:    row.get(3)?,
              reviewer_name:  row.get(4)?,
              reviewer_email: row.get(5)?,
              assigned_at:    row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPendingReview::into_pending).collect()
  }
}

// ─── ReminderLedger impl ─────────────────────────────────────────────────────

impl ReminderLedger for SqliteStore {
  type Error = Error;

  async fn reminder_last_sent(
    &self,
    reviewer_id: Uuid,
    article_id: Uuid,
  ) -> Result<Option<DateTime<Utc>>> {
    let reviewer_str = encode_uuid(reviewer_id);
    let article_str  = encode_uuid(article_id);

    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT last_sent_at FROM reminders
               WHERE reviewer_id = ?1 AND article_id = ?2",
              rusqlite::params![reviewer_str, article_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.as_deref().map(decode_dt).transpose()
  }

  async fn reminder_mark_sent(
    &self,
    reviewer_id: Uuid,
    article_id: Uuid,
    sent_at: DateTime<Utc>,
    cooldown: Duration,
  ) -> Result<bool> {
    let reviewer_str = encode_uuid(reviewer_id);
    let article_str  = encode_uuid(article_id);
    let sent_str     = encode_dt(sent_at);
    let cutoff_str   = encode_dt(sent_at - cooldown);

    // The upsert refuses to move the timestamp while the previous entry is
    // still inside the cooldown window; zero affected rows means a competing
    // sender already recorded one.
    let applied = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT INTO reminders (reviewer_id, article_id, last_sent_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (reviewer_id, article_id) DO UPDATE
             SET last_sent_at = excluded.last_sent_at
             WHERE reminders.last_sent_at <= ?4",
          rusqlite::params![reviewer_str, article_str, sent_str, cutoff_str],
        )?;
        Ok(n == 1)
      })
      .await?;

    Ok(applied)
  }
}
