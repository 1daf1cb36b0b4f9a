//! Reviewer assignment rules.

use chrono::Utc;
use quorum_core::{
  Error, Result,
  article::{Article, REVIEWER_CEILING},
  review::NewAssignment,
  store::{AppendOutcome, ReviewStore},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{ReviewService, WRITE_RETRY_LIMIT};

impl<S: ReviewStore> ReviewService<S> {
  /// Attach reviewers to an article, up to the ceiling of three.
  ///
  /// Only the editor of the owning journal may assign. Candidates already on
  /// the article (and duplicates within the batch) are skipped; a candidate
  /// that does not exist fails the whole call; a batch that would push the
  /// article past the ceiling fails the whole call. Either every accepted
  /// candidate lands or none does.
  pub async fn assign_reviewers(
    &self,
    article_id: Uuid,
    caller_editor_id: Uuid,
    reviewer_ids: Vec<Uuid>,
  ) -> Result<Article> {
    if reviewer_ids.is_empty() {
      return Err(Error::ConstraintViolation(
        "no reviewers named in the assignment".into(),
      ));
    }

    for _ in 0..WRITE_RETRY_LIMIT {
      let article = self.get_article(article_id).await?;
      let journal = self.require_journal(article.journal_id).await?;
      if journal.editor_id != caller_editor_id {
        return Err(Error::Forbidden(
          "only the journal's editor may assign reviewers".into(),
        ));
      }
      if article.reviewers.len() >= REVIEWER_CEILING {
        return Err(Error::ConstraintViolation(format!(
          "article already has {} reviewers",
          article.reviewers.len()
        )));
      }

      let mut batch: Vec<NewAssignment> = Vec::new();
      for candidate in &reviewer_ids {
        self
          .store
          .get_reviewer(*candidate)
          .await
          .map_err(Error::transient)?
          .ok_or(Error::ReviewerNotFound(*candidate))?;

        if article.is_assigned(*candidate)
          || batch.iter().any(|a| a.reviewer_id == *candidate)
        {
          continue;
        }
        if article.reviewers.len() + batch.len() + 1 > REVIEWER_CEILING {
          return Err(Error::ConstraintViolation(format!(
            "assignment would exceed the ceiling of {REVIEWER_CEILING} \
             reviewers"
          )));
        }
        batch.push(NewAssignment {
          reviewer_id: *candidate,
          assigned_at: Utc::now(),
        });
      }

      if batch.is_empty() {
        // Every candidate was already on the article; nothing to write.
        return Ok(article);
      }

      match self
        .store
        .append_assignments(article_id, article.version, batch)
        .await
        .map_err(Error::transient)?
      {
        AppendOutcome::Applied(updated) => {
          info!(
            "article {} now has {} reviewers",
            article_id,
            updated.reviewers.len()
          );
          return Ok(updated);
        }
        AppendOutcome::VersionConflict => {
          warn!("assignment on {article_id} lost a version race, retrying");
        }
        AppendOutcome::ArticleMissing => {
          return Err(Error::ArticleNotFound(article_id));
        }
      }
    }
    Err(Error::transient("assignment kept losing version races"))
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
