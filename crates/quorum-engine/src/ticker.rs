//! Self-scheduling loop around the [`ReminderScanner`].
//!
//! The first tick fires immediately, so a freshly (re)started process
//! catches up on anything that came due while it was down; after that the
//! loop ticks at the configured interval. Ticks that land while a cycle is
//! still running are swallowed by the scanner's single-flight gate, and
//! missed ticks are skipped rather than bursted.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use quorum_core::store::{ReminderLedger, ReviewStore};
use tokio::{sync::watch, time::MissedTickBehavior};
use tracing::{info, warn};

use crate::{ReminderScanner, mail::MailTransport};

/// Tick the scanner every `every` until `shutdown` flips to `true` (or its
/// sender goes away).
pub async fn scan_loop<S, M>(
  scanner: Arc<ReminderScanner<S, M>>,
  every: Duration,
  mut shutdown: watch::Receiver<bool>,
) where
  S: ReviewStore + ReminderLedger + 'static,
  M: MailTransport + 'static,
{
  let mut ticker = tokio::time::interval(every);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

  loop {
    tokio::select! {
      _ = ticker.tick() => {
        if let Err(e) = scanner.run_guarded(Utc::now()).await {
          warn!("reminder scan failed: {e}");
        }
      }
      changed = shutdown.changed() => {
        if changed.is_err() || *shutdown.borrow() {
          break;
        }
      }
    }
  }
  info!("reminder scan loop stopping");
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{sync::Arc, time::Duration};

  use chrono::{Duration as ChronoDuration, Utc};
  use tokio::sync::watch;
  use uuid::Uuid;

  use super::scan_loop;
  use crate::{
    ReminderScanner, ScannerConfig,
    testutil::{
      RecordingMailer, assign_at, seed_article, seed_journal, seed_reviewer,
      store,
    },
  };

  #[tokio::test]
  async fn first_tick_scans_immediately() {
    let store    = store().await;
    let now      = Utc::now();
    let journal  = seed_journal(&store, Uuid::new_v4()).await;
    let article  = seed_article(&store, &journal, Uuid::new_v4()).await;
    let reviewer = seed_reviewer(&store, "Ada").await;
    assign_at(&store, &article, &reviewer, now - ChronoDuration::days(8)).await;

    let mailer  = Arc::new(RecordingMailer::default());
    let scanner = Arc::new(ReminderScanner::new(
      Arc::clone(&store),
      Arc::clone(&mailer),
      ScannerConfig::default(),
    ));

    let (tx, rx) = watch::channel(false);
    let loop_task =
      tokio::spawn(scan_loop(scanner, Duration::from_secs(3600), rx));

    // The interval's first tick needs no waiting, only a few polls.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while mailer.sent_to().is_empty() {
      assert!(tokio::time::Instant::now() < deadline, "no scan happened");
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(mailer.sent_to(), vec![reviewer.email.clone()]);

    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), loop_task)
      .await
      .expect("loop did not stop")
      .unwrap();
  }

  #[tokio::test]
  async fn shutdown_signal_stops_the_loop() {
    let store   = store().await;
    let mailer  = Arc::new(RecordingMailer::default());
    let scanner = Arc::new(ReminderScanner::new(
      Arc::clone(&store),
      mailer,
      ScannerConfig::default(),
    ));

    let (tx, rx) = watch::channel(false);
    let loop_task =
      tokio::spawn(scan_loop(scanner, Duration::from_secs(3600), rx));

    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), loop_task)
      .await
      .expect("loop did not stop")
      .unwrap();
  }

  #[tokio::test]
  async fn dropped_sender_stops_the_loop() {
    let store   = store().await;
    let mailer  = Arc::new(RecordingMailer::default());
    let scanner = Arc::new(ReminderScanner::new(
      Arc::clone(&store),
      mailer,
      ScannerConfig::default(),
    ));

    let (tx, rx) = watch::channel(false);
    let loop_task =
      tokio::spawn(scan_loop(scanner, Duration::from_secs(3600), rx));

    drop(tx);
    tokio::time::timeout(Duration::from_secs(5), loop_task)
      .await
      .expect("loop did not stop")
      .unwrap();
  }
}
