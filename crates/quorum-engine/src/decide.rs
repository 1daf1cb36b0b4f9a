//! Editorial decisions.

use quorum_core::{
  Error, Result,
  article::{Article, ArticleStatus, RECOMMENDED_REVIEWERS},
  store::ReviewStore,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ReviewService;

// ─── Types ────────────────────────────────────────────────────────────────────

/// Outcome of an editorial decision.
///
/// `under_reviewed` flags a decision taken with fewer than three reviewers
/// ever assigned. Advisory only; the decision stands either way.
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
  pub article:        Article,
  pub under_reviewed: bool,
}

impl<S: ReviewStore> ReviewService<S> {
  /// Apply an editorial decision: overwrite status and/or comment.
  ///
  /// Only the editor of the owning journal may decide. There is no
  /// transition table; any status may follow any other, and a `None` field
  /// leaves its counterpart untouched.
  pub async fn set_decision(
    &self,
    article_id: Uuid,
    caller_editor_id: Uuid,
    status: Option<ArticleStatus>,
    comment: Option<String>,
  ) -> Result<Decision> {
    let article = self.get_article(article_id).await?;
    let journal = self.require_journal(article.journal_id).await?;
    if journal.editor_id != caller_editor_id {
      return Err(Error::Forbidden(
        "only the journal's editor may record a decision".into(),
      ));
    }

    let under_reviewed = article.under_reviewed();

    let updated = self
      .store
      .set_decision(article_id, status, comment)
      .await
      .map_err(Error::transient)?
      .ok_or(Error::ArticleNotFound(article_id))?;

    if under_reviewed {
      warn!(
        "article {} decided with {} of {} recommended reviewers",
        article_id,
        updated.reviewers.len(),
        RECOMMENDED_REVIEWERS
      );
    }
    info!(
      "article {} status now {}",
      article_id,
      updated.status.as_str()
    );

    Ok(Decision { article: updated, under_reviewed })
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use quorum_core::{Error, article::ArticleStatus};
  use uuid::Uuid;

  use crate::testutil::{seed_article, seed_journal, seed_reviewer, service_over, store};

  #[tokio::test]
  async fn decision_requires_the_journal_editor() {
    let store   = store().await;
    let service = service_over(&store);
    let journal = seed_journal(&store, Uuid::new_v4()).await;
    let article = seed_article(&store, &journal, Uuid::new_v4()).await;

    let result = service
      .set_decision(
        article.article_id,
        Uuid::new_v4(),
        Some(ArticleStatus::Approved),
        None,
      )
      .await;

    assert!(matches!(result, Err(Error::Forbidden(_))));
  }

  #[tokio::test]
  async fn decision_overwrites_status_and_comment() {
    let store   = store().await;
    let service = service_over(&store);
    let editor  = Uuid::new_v4();
    let journal = seed_journal(&store, editor).await;
    let article = seed_article(&store, &journal, Uuid::new_v4()).await;

    let decision = service
      .set_decision(
        article.article_id,
        editor,
        Some(ArticleStatus::Approved),
        Some("camera-ready by June".to_string()),
      )
      .await
      .unwrap();

    assert_eq!(decision.article.status, ArticleStatus::Approved);
    assert_eq!(
      decision.article.comment.as_deref(),
      Some("camera-ready by June")
    );
    assert_eq!(decision.article.version, article.version + 1);
  }

  #[tokio::test]
  async fn comment_only_decision_keeps_the_status() {
    let store   = store().await;
    let service = service_over(&store);
    let editor  = Uuid::new_v4();
    let journal = seed_journal(&store, editor).await;
    let article = seed_article(&store, &journal, Uuid::new_v4()).await;

    let decision = service
      .set_decision(
        article.article_id,
        editor,
        None,
        Some("waiting on figure permissions".to_string()),
      )
      .await
      .unwrap();

    assert_eq!(decision.article.status, ArticleStatus::Submitted);
    assert_eq!(
      decision.article.comment.as_deref(),
      Some("waiting on figure permissions")
    );
  }

  #[tokio::test]
  async fn any_status_may_follow_any_other() {
    let store   = store().await;
    let service = service_over(&store);
    let editor  = Uuid::new_v4();
    let journal = seed_journal(&store, editor).await;
    let article = seed_article(&store, &journal, Uuid::new_v4()).await;

    service
      .set_decision(
        article.article_id,
        editor,
        Some(ArticleStatus::Approved),
        None,
      )
      .await
      .unwrap();
    let reversed = service
      .set_decision(
        article.article_id,
        editor,
        Some(ArticleStatus::Rejected),
        None,
      )
      .await
      .unwrap();

    assert_eq!(reversed.article.status, ArticleStatus::Rejected);
  }

  #[tokio::test]
  async fn under_reviewed_flag_follows_the_assignment_count() {
    let store   = store().await;
    let service = service_over(&store);
    let editor  = Uuid::new_v4();
    let journal = seed_journal(&store, editor).await;
    let article = seed_article(&store, &journal, Uuid::new_v4()).await;

    let sparse = service
      .set_decision(
        article.article_id,
        editor,
        Some(ArticleStatus::UnderReview),
        None,
      )
      .await
      .unwrap();
    assert!(sparse.under_reviewed);

    for name in ["Ada", "Grace", "Edsger"] {
      let r = seed_reviewer(&store, name).await;
      service
        .assign_reviewers(article.article_id, editor, vec![r.reviewer_id])
        .await
        .unwrap();
    }

    let staffed = service
      .set_decision(
        article.article_id,
        editor,
        Some(ArticleStatus::Approved),
        None,
      )
      .await
      .unwrap();
    assert!(!staffed.under_reviewed);
  }

  #[tokio::test]
  async fn decision_on_a_missing_article_is_not_found() {
    let store   = store().await;
    let service = service_over(&store);

    let result = service
      .set_decision(
        Uuid::new_v4(),
        Uuid::new_v4(),
        Some(ArticleStatus::Approved),
        None,
      )
      .await;

    assert!(matches!(result, Err(Error::ArticleNotFound(_))));
  }
}
