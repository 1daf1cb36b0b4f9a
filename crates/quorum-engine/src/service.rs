//! [`ReviewService`], the rule-enforcing layer over a [`ReviewStore`].
//!
//! One instance serves the whole process. Operations load the aggregate,
//! validate against it, then hand the store a single conditional write gated
//! on the loaded `version`; on conflict they reload, revalidate and retry.
//! The assignment, submission and decision rules live in the sibling
//! modules; this one holds the service itself and the submission lifecycle.

use std::sync::Arc;

use quorum_core::{
  Error, Result,
  article::{Article, ArticleStatus, NewArticle},
  party::Journal,
  store::{DeleteOutcome, ReviewStore},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::WRITE_RETRY_LIMIT;

// ─── Service ──────────────────────────────────────────────────────────────────

/// Editorial operations over an article store.
pub struct ReviewService<S> {
  pub(crate) store: Arc<S>,
}

impl<S: ReviewStore> ReviewService<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  // ── Submission lifecycle ──────────────────────────────────────────────

  /// Register a new submission under an existing journal.
  pub async fn create_submission(&self, input: NewArticle) -> Result<Article> {
    self.require_journal(input.journal_id).await?;

    let article = self
      .store
      .create_article(input)
      .await
      .map_err(Error::transient)?;
    info!(
      "article {} submitted to journal {}",
      article.article_id, article.journal_id
    );
    Ok(article)
  }

  /// Load the full aggregate.
  pub async fn get_article(&self, article_id: Uuid) -> Result<Article> {
    self
      .store
      .get_article(article_id)
      .await
      .map_err(Error::transient)?
      .ok_or(Error::ArticleNotFound(article_id))
  }

  /// Withdraw a submission. Only the submitter may withdraw, and only while
  /// the article has not been approved. The delete takes the assignments and
  /// reminder history with it.
  pub async fn withdraw(&self, article_id: Uuid, caller: Uuid) -> Result<()> {
    for _ in 0..WRITE_RETRY_LIMIT {
      let article = self.get_article(article_id).await?;
      if article.submitter_id != caller {
        return Err(Error::Forbidden(
          "only the submitter may withdraw an article".into(),
        ));
      }
      if article.status == ArticleStatus::Approved {
        return Err(Error::ConstraintViolation(
          "approved articles cannot be withdrawn".into(),
        ));
      }

      match self
        .store
        .delete_article(article_id, article.version)
        .await
        .map_err(Error::transient)?
      {
        DeleteOutcome::Deleted => {
          info!("article {article_id} withdrawn by its submitter");
          return Ok(());
        }
        DeleteOutcome::VersionConflict => {
          warn!("withdrawal of {article_id} lost a version race, retrying");
        }
        DeleteOutcome::Missing => {
          return Err(Error::ArticleNotFound(article_id));
        }
      }
    }
    Err(Error::transient("withdrawal kept losing version races"))
  }

  // ── Shared lookups ────────────────────────────────────────────────────

  pub(crate) async fn require_journal(
    &self,
    journal_id: Uuid,
  ) -> Result<Journal> {
    self
      .store
      .get_journal(journal_id)
      .await
      .map_err(Error::transient)?
      .ok_or(Error::JournalNotFound(journal_id))
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use quorum_core::{Error, article::ArticleStatus, store::ReviewStore};
  use uuid::Uuid;

  use crate::testutil::{seed_article, seed_journal, service_over, store};

  #[tokio::test]
  async fn create_submission_requires_an_existing_journal() {
    let store   = store().await;
    let service = service_over(&store);

    let missing = Uuid::new_v4();
    let result  = service
      .create_submission(quorum_core::article::NewArticle {
        journal_id:   missing,
        submitter_id: Uuid::new_v4(),
        title:        "Orphan".to_string(),
      })
      .await;

    assert!(matches!(result, Err(Error::JournalNotFound(id)) if id == missing));
  }

  #[tokio::test]
  async fn create_submission_starts_in_submitted_status() {
    let store   = store().await;
    let service = service_over(&store);
    let journal = seed_journal(&store, Uuid::new_v4()).await;

    let article = service
      .create_submission(quorum_core::article::NewArticle {
        journal_id:   journal.journal_id,
        submitter_id: Uuid::new_v4(),
        title:        "A Modest Proposal".to_string(),
      })
      .await
      .unwrap();

    assert_eq!(article.status, ArticleStatus::Submitted);
    assert_eq!(article.version, 0);
    assert!(article.reviewers.is_empty());
  }

  #[tokio::test]
  async fn get_article_missing_is_not_found() {
    let store   = store().await;
    let service = service_over(&store);

    let id = Uuid::new_v4();
    assert!(matches!(
      service.get_article(id).await,
      Err(Error::ArticleNotFound(got)) if got == id
    ));
  }

  #[tokio::test]
  async fn withdraw_requires_the_submitter() {
    let store     = store().await;
    let service   = service_over(&store);
    let journal   = seed_journal(&store, Uuid::new_v4()).await;
    let submitter = Uuid::new_v4();
    let article   = seed_article(&store, &journal, submitter).await;

    let result = service.withdraw(article.article_id, Uuid::new_v4()).await;
    assert!(matches!(result, Err(Error::Forbidden(_))));

    // Still there.
    assert!(service.get_article(article.article_id).await.is_ok());
  }

  #[tokio::test]
  async fn withdraw_refuses_approved_articles() {
    let store     = store().await;
    let service   = service_over(&store);
    let journal   = seed_journal(&store, Uuid::new_v4()).await;
    let submitter = Uuid::new_v4();
    let article   = seed_article(&store, &journal, submitter).await;

    store
      .set_decision(article.article_id, Some(ArticleStatus::Approved), None)
      .await
      .unwrap();

    let result = service.withdraw(article.article_id, submitter).await;
    assert!(matches!(result, Err(Error::ConstraintViolation(_))));
  }

  #[tokio::test]
  async fn withdraw_deletes_the_aggregate() {
    let store     = store().await;
    let service   = service_over(&store);
    let journal   = seed_journal(&store, Uuid::new_v4()).await;
    let submitter = Uuid::new_v4();
    let article   = seed_article(&store, &journal, submitter).await;

    service.withdraw(article.article_id, submitter).await.unwrap();

    assert!(matches!(
      service.get_article(article.article_id).await,
      Err(Error::ArticleNotFound(_))
    ));
  }

  #[tokio::test]
  async fn withdraw_of_missing_article_is_not_found() {
    let store   = store().await;
    let service = service_over(&store);

    let result = service.withdraw(Uuid::new_v4(), Uuid::new_v4()).await;
    assert!(matches!(result, Err(Error::ArticleNotFound(_))));
  }
}
