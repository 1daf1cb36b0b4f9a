//! The overdue-review reminder scanner.
//!
//! One cycle queries the store for every pending assignment old enough to be
//! overdue, then works through the (reviewer, article) pairs with a bounded
//! number of in-flight sends. Each pair is handled independently: the ledger
//! cooldown is checked, the mail dispatched, and the send recorded, with any
//! failure logged and counted rather than propagated. A compare-and-swap
//! flag keeps cycles single-flight no matter how they are triggered.

use std::{
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  time::Instant,
};

use chrono::{DateTime, Duration, Utc};
use quorum_core::{
  Error, Result,
  store::{PendingReview, ReminderLedger, ReviewStore},
};
use serde::Serialize;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use crate::mail::{MailTransport, reminder_mail};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Tunables for one scanner instance.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
  /// How long an assignment may stay pending before reminders start.
  pub overdue_after: Duration,
  /// Minimum gap between two reminders to the same (reviewer, article) pair.
  pub cooldown:      Duration,
  /// Upper bound on concurrently running sends.
  pub max_in_flight: usize,
  /// Name signing the reminder mails.
  pub sender_name:   String,
  /// Wall-clock budget for one cycle. Once spent, remaining pairs are
  /// deferred to the next cycle; in-flight sends still finish.
  pub cycle_budget:  Option<std::time::Duration>,
}

impl Default for ScannerConfig {
  fn default() -> Self {
    Self {
      overdue_after: Duration::days(7),
      cooldown:      Duration::days(3),
      max_in_flight: 4,
      sender_name:   "Editorial Office".to_string(),
      cycle_budget:  None,
    }
  }
}

// ─── Report ───────────────────────────────────────────────────────────────────

/// Tally of one scan cycle. `scanned` counts the overdue pairs the query
/// returned; every one of them lands in exactly one of the other buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
  pub scanned:  usize,
  pub sent:     usize,
  pub cooling:  usize,
  pub failed:   usize,
  pub deferred: usize,
}

// ─── Scanner ──────────────────────────────────────────────────────────────────

/// Walks overdue assignments and mails reminders, at most one cycle at a
/// time.
pub struct ReminderScanner<S, M> {
  store:   Arc<S>,
  mailer:  Arc<M>,
  config:  ScannerConfig,
  running: AtomicBool,
}

impl<S, M> ReminderScanner<S, M>
where
  S: ReviewStore + ReminderLedger + 'static,
  M: MailTransport + 'static,
{
  pub fn new(store: Arc<S>, mailer: Arc<M>, config: ScannerConfig) -> Self {
    Self {
      store,
      mailer,
      config,
      running: AtomicBool::new(false),
    }
  }

  /// Run one cycle unless another is already in flight.
  ///
  /// Returns `Ok(None)` without touching the store when the single-flight
  /// gate is held. The interval tick and the manual trigger both come
  /// through here, so they can never overlap.
  pub async fn run_guarded(
    &self,
    now: DateTime<Utc>,
  ) -> Result<Option<ScanReport>> {
    if self
      .running
      .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
      .is_err()
    {
      debug!("scan trigger dropped: a cycle is already running");
      return Ok(None);
    }
    let _gate = GateGuard(&self.running);

    let report = self.run_once(now).await?;
    Ok(Some(report))
  }

  /// Run one full cycle against the given clock value.
  pub async fn run_once(&self, now: DateTime<Utc>) -> Result<ScanReport> {
    let cutoff  = now - self.config.overdue_after;
    let pending = self
      .store
      .list_pending_assignments(cutoff)
      .await
      .map_err(Error::transient)?;

    let mut report = ScanReport {
      scanned: pending.len(),
      ..ScanReport::default()
    };
    let started   = Instant::now();
    let width     = self.config.max_in_flight.max(1);
    let mut tasks = JoinSet::new();
    let mut queue = pending.into_iter();

    while let Some(pair) = queue.next() {
      if let Some(budget) = self.config.cycle_budget
        && started.elapsed() >= budget
      {
        // The pair just pulled plus everything still queued.
        report.deferred = 1 + queue.len();
        warn!(
          "scan budget spent with {} pairs deferred to the next cycle",
          report.deferred
        );
        break;
      }

      while tasks.len() >= width {
        collect(&mut report, tasks.join_next().await);
      }

      let store    = Arc::clone(&self.store);
      let mailer   = Arc::clone(&self.mailer);
      let cooldown = self.config.cooldown;
      let sender   = self.config.sender_name.clone();
      tasks.spawn(remind_pair(store, mailer, cooldown, sender, pair, now));
    }
    while !tasks.is_empty() {
      collect(&mut report, tasks.join_next().await);
    }

    info!(
      "reminder scan complete: {} scanned, {} sent, {} cooling, {} failed, \
       {} deferred",
      report.scanned, report.sent, report.cooling, report.failed,
      report.deferred
    );
    Ok(report)
  }
}

// Releases the single-flight flag even when the scan errors out.
struct GateGuard<'a>(&'a AtomicBool);

impl Drop for GateGuard<'_> {
  fn drop(&mut self) {
    self.0.store(false, Ordering::SeqCst);
  }
}

// ─── Per-pair work ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum PairOutcome {
  Sent,
  Cooling,
  Failed,
}

fn collect(
  report: &mut ScanReport,
  joined: Option<std::result::Result<PairOutcome, JoinError>>,
) {
  match joined {
    Some(Ok(PairOutcome::Sent)) => report.sent += 1,
    Some(Ok(PairOutcome::Cooling)) => report.cooling += 1,
    Some(Ok(PairOutcome::Failed)) => report.failed += 1,
    Some(Err(e)) => {
      warn!("reminder task panicked: {e}");
      report.failed += 1;
    }
    None => {}
  }
}

/// Check the cooldown, send the reminder, record the send. Never errors;
/// everything that goes wrong turns into [`PairOutcome::Failed`] and a log
/// line so the rest of the cycle is unaffected.
async fn remind_pair<S, M>(
  store:    Arc<S>,
  mailer:   Arc<M>,
  cooldown: Duration,
  sender:   String,
  pair:     PendingReview,
  now:      DateTime<Utc>,
) -> PairOutcome
where
  S: ReminderLedger + 'static,
  M: MailTransport + 'static,
{
  let last = match store
    .reminder_last_sent(pair.reviewer_id, pair.article_id)
    .await
  {
    Ok(last) => last,
    Err(e) => {
      warn!(
        "reminder ledger lookup failed for reviewer {} on article {}: {e}",
        pair.reviewer_id, pair.article_id
      );
      return PairOutcome::Failed;
    }
  };
  if let Some(last) = last
    && now - last < cooldown
  {
    return PairOutcome::Cooling;
  }

  let days_overdue = (now - pair.assigned_at).num_days();
  let mail = reminder_mail(&pair, days_overdue, &sender);
  if let Err(e) = mailer.send(&mail).await {
    warn!("reminder to {} failed: {e}", pair.reviewer_email);
    return PairOutcome::Failed;
  }

  match store
    .reminder_mark_sent(pair.reviewer_id, pair.article_id, now, cooldown)
    .await
  {
    Ok(true) => PairOutcome::Sent,
    Ok(false) => {
      // A competing sender recorded one inside the window. The mail has
      // already gone out, so count it.
      debug!(
        "reminder for reviewer {} on article {} raced another sender",
        pair.reviewer_id, pair.article_id
      );
      PairOutcome::Sent
    }
    Err(e) => {
      warn!(
        "reminder ledger write failed for reviewer {} on article {}: {e}",
        pair.reviewer_id, pair.article_id
      );
      PairOutcome::Failed
    }
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
