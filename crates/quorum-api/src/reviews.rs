//! Handlers for the review-workflow endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/articles/:id/reviewers` | Body: [`AssignBody`]; editor only |
//! | `POST` | `/articles/:id/review` | Body: [`SubmitBody`]; assigned reviewer only |
//! | `POST` | `/articles/:id/decision` | Body: [`DecisionBody`]; editor only |

use axum::{
  Json,
  extract::{Path, State},
};
use quorum_core::{
  article::{Article, ArticleStatus},
  store::{ReminderLedger, ReviewStore},
};
use quorum_engine::{Decision, mail::MailTransport};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── Assign ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /articles/:id/reviewers`.
#[derive(Debug, Deserialize)]
pub struct AssignBody {
  pub editor_id:    Uuid,
  pub reviewer_ids: Vec<Uuid>,
}

/// `POST /articles/:id/reviewers` — attach reviewers, editor only.
pub async fn assign<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
  Json(body): Json<AssignBody>,
) -> Result<Json<Article>, ApiError>
where
  S: ReviewStore + ReminderLedger + 'static,
  M: MailTransport + 'static,
{
  let article = state
    .service
    .assign_reviewers(id, body.editor_id, body.reviewer_ids)
    .await?;
  Ok(Json(article))
}

// ─── Submit ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /articles/:id/review`.
#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  pub reviewer_id: Uuid,
  pub verdict:     String,
  #[serde(default)]
  pub comment:     String,
}

/// `POST /articles/:id/review` — record the caller's verdict.
pub async fn submit<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
  Json(body): Json<SubmitBody>,
) -> Result<Json<Article>, ApiError>
where
  S: ReviewStore + ReminderLedger + 'static,
  M: MailTransport + 'static,
{
  let article = state
    .service
    .submit_review(id, body.reviewer_id, body.verdict, body.comment)
    .await?;
  Ok(Json(article))
}

// ─── Decide ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /articles/:id/decision`. `status` and
/// `comment` may each be omitted to leave that field untouched.
#[derive(Debug, Deserialize)]
pub struct DecisionBody {
  pub editor_id: Uuid,
  pub status:    Option<ArticleStatus>,
  pub comment:   Option<String>,
}

/// `POST /articles/:id/decision` — apply an editorial decision.
pub async fn decide<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
  Json(body): Json<DecisionBody>,
) -> Result<Json<Decision>, ApiError>
where
  S: ReviewStore + ReminderLedger + 'static,
  M: MailTransport + 'static,
{
  let decision = state
    .service
    .set_decision(id, body.editor_id, body.status, body.comment)
    .await?;
  Ok(Json(decision))
}
