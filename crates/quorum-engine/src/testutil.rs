//! Shared fixtures for the engine tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use quorum_core::{
  article::{Article, NewArticle},
  party::{Journal, NewJournal, NewReviewer, Reviewer},
  review::NewAssignment,
  store::{AppendOutcome, ReviewStore},
};
use quorum_store_sqlite::SqliteStore;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::{
  ReviewService,
  mail::{MailError, MailTransport, OutboundMail},
};

// ─── Store fixtures ───────────────────────────────────────────────────────────

pub(crate) async fn store() -> Arc<SqliteStore> {
  Arc::new(SqliteStore::open_in_memory().await.unwrap())
}

pub(crate) fn service_over(store: &Arc<SqliteStore>) -> ReviewService<SqliteStore> {
  ReviewService::new(Arc::clone(store))
}

pub(crate) async fn seed_journal(store: &SqliteStore, editor: Uuid) -> Journal {
  store
    .add_journal(NewJournal {
      title:     "Annals of Improbable Results".to_string(),
      editor_id: editor,
    })
    .await
    .unwrap()
}

pub(crate) async fn seed_article(
  store: &SqliteStore,
  journal: &Journal,
  submitter: Uuid,
) -> Article {
  store
    .create_article(NewArticle {
      journal_id:   journal.journal_id,
      submitter_id: submitter,
      title:        "A Modest Proposal".to_string(),
    })
    .await
    .unwrap()
}

pub(crate) async fn seed_reviewer(store: &SqliteStore, name: &str) -> Reviewer {
  store
    .add_reviewer(NewReviewer {
      name:  name.to_string(),
      email: format!("{}@example.com", name.to_lowercase()),
    })
    .await
    .unwrap()
}

/// Assign with a chosen timestamp, bypassing the service so tests can put an
/// assignment as far in the past as they need.
pub(crate) async fn assign_at(
  store: &SqliteStore,
  article: &Article,
  reviewer: &Reviewer,
  assigned_at: DateTime<Utc>,
) -> Article {
  let current = store
    .get_article(article.article_id)
    .await
    .unwrap()
    .expect("article exists");
  let outcome = store
    .append_assignments(article.article_id, current.version, vec![
      NewAssignment {
        reviewer_id: reviewer.reviewer_id,
        assigned_at,
      },
    ])
    .await
    .unwrap();
  match outcome {
    AppendOutcome::Applied(updated) => updated,
    other => panic!("assignment not applied: {other:?}"),
  }
}

// ─── Mock mailers ─────────────────────────────────────────────────────────────

/// Mailer that records every delivery and can be told to bounce specific
/// addresses.
#[derive(Default)]
pub(crate) struct RecordingMailer {
  pub(crate) sent:     Mutex<Vec<OutboundMail>>,
  pub(crate) fail_for: Vec<String>,
}

impl RecordingMailer {
  pub(crate) fn failing_for(addresses: &[&str]) -> Self {
    Self {
      sent:     Mutex::new(Vec::new()),
      fail_for: addresses.iter().map(|a| a.to_string()).collect(),
    }
  }

  pub(crate) fn sent_to(&self) -> Vec<String> {
    self
      .sent
      .lock()
      .unwrap()
      .iter()
      .map(|m| m.to_address.clone())
      .collect()
  }
}

impl MailTransport for RecordingMailer {
  async fn send(&self, mail: &OutboundMail) -> Result<(), MailError> {
    if self.fail_for.contains(&mail.to_address) {
      return Err(MailError(format!("{} bounced", mail.to_address)));
    }
    self.sent.lock().unwrap().push(mail.clone());
    Ok(())
  }
}

/// Mailer that parks inside `send` until released, so tests can observe the
/// scanner mid-cycle.
#[derive(Default)]
pub(crate) struct HoldMailer {
  pub(crate) entered: Notify,
  pub(crate) release: Notify,
}

impl MailTransport for HoldMailer {
  async fn send(&self, _mail: &OutboundMail) -> Result<(), MailError> {
    self.entered.notify_one();
    self.release.notified().await;
    Ok(())
  }
}
