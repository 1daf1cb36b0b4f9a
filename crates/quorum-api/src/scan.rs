//! Handler for the manual reminder-scan trigger.

use axum::{Json, extract::State};
use chrono::Utc;
use quorum_core::store::{ReminderLedger, ReviewStore};
use quorum_engine::{ScanReport, mail::MailTransport};

use crate::{ApiState, error::ApiError};

/// `POST /scan` — run one reminder cycle now.
///
/// Shares the single-flight gate with the interval ticker, so a trigger that
/// lands mid-cycle reports 409 instead of scanning twice.
pub async fn trigger<S, M>(
  State(state): State<ApiState<S, M>>,
) -> Result<Json<ScanReport>, ApiError>
where
  S: ReviewStore + ReminderLedger + 'static,
  M: MailTransport + 'static,
{
  match state.scanner.run_guarded(Utc::now()).await? {
    Some(report) => Ok(Json(report)),
    None => Err(ApiError::ScanBusy),
  }
}
