//! Outbound mail seam for the reminder scanner.
//!
//! The engine renders reminder messages itself and hands finished mail to a
//! [`MailTransport`]. Real SMTP is a deployment concern; the shipped
//! [`LogMailer`] records each send through `tracing` so a single-box install
//! runs without a relay.

use std::future::Future;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use quorum_core::store::PendingReview;

// ─── Types ────────────────────────────────────────────────────────────────────

/// A rendered message, ready for a transport.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMail {
  pub from_name:  String,
  pub to_address: String,
  pub subject:    String,
  pub html_body:  String,
}

/// Transport-level failure. The scanner logs these and keeps going; one dead
/// address must not stall the rest of the sweep.
#[derive(Debug, Error)]
#[error("mail dispatch failed: {0}")]
pub struct MailError(pub String);

// ─── Transport trait ──────────────────────────────────────────────────────────

/// Anything that can deliver an [`OutboundMail`].
///
/// All methods return `Send` futures so sends can run on a multi-threaded
/// async runtime.
pub trait MailTransport: Send + Sync {
  fn send<'a>(
    &'a self,
    mail: &'a OutboundMail,
  ) -> impl Future<Output = Result<(), MailError>> + Send + 'a;
}

/// Transport that only logs. Suits deployments without an SMTP relay.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl MailTransport for LogMailer {
  async fn send(&self, mail: &OutboundMail) -> Result<(), MailError> {
    info!(
      "outbound mail to {}: {} ({} bytes)",
      mail.to_address,
      mail.subject,
      mail.html_body.len()
    );
    Ok(())
  }
}

// ─── Template ─────────────────────────────────────────────────────────────────

/// Render the overdue-review reminder for one pending assignment.
pub fn reminder_mail(
  pending:      &PendingReview,
  days_overdue: i64,
  from_name:    &str,
) -> OutboundMail {
  let subject = format!(
    "Reminder: review overdue for \"{}\"",
    pending.article_title
  );
  let html_body = format!(
    "<p>Dear {},</p>\
     <p>The manuscript <b>&quot;{}&quot;</b>, submitted to <i>{}</i>, has \
     been awaiting your review for {} days.</p>\
     <p>Please submit your verdict at your earliest convenience.</p>\
     <p>Kind regards,<br>{}</p>",
    escape_html(&pending.reviewer_name),
    escape_html(&pending.article_title),
    escape_html(&pending.journal_title),
    days_overdue,
    escape_html(from_name),
  );

  OutboundMail {
    from_name: from_name.to_string(),
    to_address: pending.reviewer_email.clone(),
    subject,
    html_body,
  }
}

/// Escape text interpolated into the HTML body: `&`, `<`, `>`.
fn escape_html(s: &str) -> String {
  s.replace('&', "&amp;")
   .replace('<', "&lt;")
   .replace('>', "&gt;")
}

// ─── Tests ────────────────────────────────────────────────────────────────────
