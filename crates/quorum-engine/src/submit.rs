//! Verdict submission rules.

use chrono::Utc;
use quorum_core::{
  Error, Result,
  article::Article,
  review::ReviewSubmission,
  store::{ReviewStore, SubmitOutcome},
};
use tracing::info;
use uuid::Uuid;

use crate::ReviewService;

impl<S: ReviewStore> ReviewService<S> {
  /// Record a reviewer's verdict on their assignment.
  ///
  /// One verdict per assignment: a second submission is refused and leaves
  /// the first untouched. Callers without an assignment on the article are
  /// refused outright. The verdict vocabulary is free text; editors define
  /// it, the engine only stores it.
  pub async fn submit_review(
    &self,
    article_id: Uuid,
    caller_reviewer_id: Uuid,
    verdict: String,
    comment: String,
  ) -> Result<Article> {
    let submission = ReviewSubmission {
      verdict,
      comment,
      reviewed_at: Utc::now(),
    };

    match self
      .store
      .record_review(article_id, caller_reviewer_id, submission)
      .await
      .map_err(Error::transient)?
    {
      SubmitOutcome::Recorded(article) => {
        info!(
          "review recorded on article {} by reviewer {}",
          article_id, caller_reviewer_id
        );
        Ok(article)
      }
      SubmitOutcome::NotAssigned => Err(Error::Forbidden(
        "caller holds no assignment on this article".into(),
      )),
      SubmitOutcome::AlreadyReviewed => Err(Error::AlreadySubmitted {
        article:  article_id,
        reviewer: caller_reviewer_id,
      }),
      SubmitOutcome::ArticleMissing => Err(Error::ArticleNotFound(article_id)),
    }
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use quorum_core::{Error, review::ReviewState};
  use uuid::Uuid;

  use crate::testutil::{seed_article, seed_journal, seed_reviewer, service_over, store};

  #[tokio::test]
  async fn reviewer_submits_a_verdict() {
    let store   = store().await;
    let service = service_over(&store);
    let editor  = Uuid::new_v4();
    let journal = seed_journal(&store, editor).await;
    let article = seed_article(&store, &journal, Uuid::new_v4()).await;
    let ada     = seed_reviewer(&store, "Ada").await;
    let before  = service
      .assign_reviewers(article.article_id, editor, vec![ada.reviewer_id])
      .await
      .unwrap();

    let updated = service
      .submit_review(
        article.article_id,
        ada.reviewer_id,
        "accept".to_string(),
        "solid methodology".to_string(),
      )
      .await
      .unwrap();

    assert_eq!(updated.version, before.version + 1);
    match &updated.reviewers[0].state {
      ReviewState::Submitted { verdict, comment, .. } => {
        assert_eq!(verdict, "accept");
        assert_eq!(comment, "solid methodology");
      }
      other => panic!("expected a submitted state, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn second_submission_is_refused() {
    let store   = store().await;
    let service = service_over(&store);
    let editor  = Uuid::new_v4();
    let journal = seed_journal(&store, editor).await;
    let article = seed_article(&store, &journal, Uuid::new_v4()).await;
    let ada     = seed_reviewer(&store, "Ada").await;
    service
      .assign_reviewers(article.article_id, editor, vec![ada.reviewer_id])
      .await
      .unwrap();
    service
      .submit_review(
        article.article_id,
        ada.reviewer_id,
        "accept".to_string(),
        String::new(),
      )
      .await
      .unwrap();

    let result = service
      .submit_review(
        article.article_id,
        ada.reviewer_id,
        "reject".to_string(),
        String::new(),
      )
      .await;

    assert!(matches!(
      result,
      Err(Error::AlreadySubmitted { article: a, reviewer: r })
        if a == article.article_id && r == ada.reviewer_id
    ));

    // The first verdict stands.
    let current = service.get_article(article.article_id).await.unwrap();
    assert!(matches!(
      &current.reviewers[0].state,
      ReviewState::Submitted { verdict, .. } if verdict == "accept"
    ));
  }

  #[tokio::test]
  async fn unassigned_caller_is_forbidden() {
    let store   = store().await;
    let service = service_over(&store);
    let journal = seed_journal(&store, Uuid::new_v4()).await;
    let article = seed_article(&store, &journal, Uuid::new_v4()).await;

    let result = service
      .submit_review(
        article.article_id,
        Uuid::new_v4(),
        "accept".to_string(),
        String::new(),
      )
      .await;

    assert!(matches!(result, Err(Error::Forbidden(_))));
  }

  #[tokio::test]
  async fn submission_to_a_missing_article_is_not_found() {
    let store   = store().await;
    let service = service_over(&store);

    let result = service
      .submit_review(
        Uuid::new_v4(),
        Uuid::new_v4(),
        "accept".to_string(),
        String::new(),
      )
      .await;

    assert!(matches!(result, Err(Error::ArticleNotFound(_))));
  }

  #[tokio::test]
  async fn other_assignments_stay_pending() {
    let store   = store().await;
    let service = service_over(&store);
    let editor  = Uuid::new_v4();
    let journal = seed_journal(&store, editor).await;
    let article = seed_article(&store, &journal, Uuid::new_v4()).await;
    let ada     = seed_reviewer(&store, "Ada").await;
    let grace   = seed_reviewer(&store, "Grace").await;
    service
      .assign_reviewers(
        article.article_id,
        editor,
        vec![ada.reviewer_id, grace.reviewer_id],
      )
      .await
      .unwrap();

    let updated = service
      .submit_review(
        article.article_id,
        ada.reviewer_id,
        "accept".to_string(),
        String::new(),
      )
      .await
      .unwrap();

    let graces = updated
      .assignment_for(grace.reviewer_id)
      .expect("grace is assigned");
    assert!(graces.is_pending());
  }
}
