//! JSON REST API for Quorum.
//!
//! Exposes an axum [`Router`] backed by any
//! [`quorum_core::store::ReviewStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility: handlers trust the identity parameters
//! carried by each request, and the fronting gateway authenticates them.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", quorum_api::api_router(state.clone()))
//! ```

pub mod articles;
pub mod error;
pub mod reviews;
pub mod scan;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use quorum_core::store::{ReminderLedger, ReviewStore};
use quorum_engine::{ReminderScanner, ReviewService, mail::MailTransport};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S, M> {
  pub service: Arc<ReviewService<S>>,
  pub scanner: Arc<ReminderScanner<S, M>>,
}

// A derived `Clone` would demand `S: Clone` and `M: Clone`; the handles are
// `Arc`s, so clone those directly.
impl<S, M> Clone for ApiState<S, M> {
  fn clone(&self) -> Self {
    Self {
      service: Arc::clone(&self.service),
      scanner: Arc::clone(&self.scanner),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, M>(state: ApiState<S, M>) -> Router<()>
where
  S: ReviewStore + ReminderLedger + 'static,
  M: MailTransport + 'static,
{
  Router::new()
    // Articles
    .route("/articles", post(articles::create::<S, M>))
    .route(
      "/articles/{id}",
      get(articles::get_one::<S, M>).delete(articles::withdraw::<S, M>),
    )
    // Review workflow
    .route("/articles/{id}/reviewers", post(reviews::assign::<S, M>))
    .route("/articles/{id}/review", post(reviews::submit::<S, M>))
    .route("/articles/{id}/decision", post(reviews::decide::<S, M>))
    // Reminders
    .route("/scan", post(scan::trigger::<S, M>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
