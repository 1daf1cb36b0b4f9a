//! Handlers for `/articles` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/articles` | Body: [`NewArticleBody`]; returns 201 + aggregate |
//! | `GET`    | `/articles/:id` | Full aggregate with assignments |
//! | `DELETE` | `/articles/:id` | `?submitter` required; 204 on success |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use quorum_core::{
  article::{Article, NewArticle},
  store::{ReminderLedger, ReviewStore},
};
use quorum_engine::mail::MailTransport;
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /articles`.
#[derive(Debug, Deserialize)]
pub struct NewArticleBody {
  pub journal_id:   Uuid,
  pub submitter_id: Uuid,
  pub title:        String,
}

/// `POST /articles` — returns 201 + the stored aggregate.
pub async fn create<S, M>(
  State(state): State<ApiState<S, M>>,
  Json(body): Json<NewArticleBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ReviewStore + ReminderLedger + 'static,
  M: MailTransport + 'static,
{
  let article = state
    .service
    .create_submission(NewArticle {
      journal_id:   body.journal_id,
      submitter_id: body.submitter_id,
      title:        body.title,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(article)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /articles/:id`
pub async fn get_one<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Article>, ApiError>
where
  S: ReviewStore + ReminderLedger + 'static,
  M: MailTransport + 'static,
{
  let article = state.service.get_article(id).await?;
  Ok(Json(article))
}

// ─── Withdraw ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct WithdrawParams {
  /// Required: the submitter withdrawing their article.
  pub submitter: Uuid,
}

/// `DELETE /articles/:id?submitter=<id>` — 204 on success.
pub async fn withdraw<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<Uuid>,
  Query(params): Query<WithdrawParams>,
) -> Result<StatusCode, ApiError>
where
  S: ReviewStore + ReminderLedger + 'static,
  M: MailTransport + 'static,
{
  state.service.withdraw(id, params.submitter).await?;
  Ok(StatusCode::NO_CONTENT)
}
