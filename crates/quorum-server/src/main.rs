//! quorum-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens an
//! in-process SQLite store, starts the reminder ticker, and serves the
//! review API over HTTP.
//!
//! Every setting has a default, so `quorumd` with no config file yields a
//! working single-box setup on `127.0.0.1:8700` with a `quorum.db` store.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use chrono::Duration;
use clap::Parser;
use quorum_api::{ApiState, api_router};
use quorum_engine::{
  ReminderScanner, ReviewService, ScannerConfig, mail::LogMailer,
  ticker::scan_loop,
};
use quorum_store_sqlite::SqliteStore;
use serde::Deserialize;
use tokio::{net::TcpListener, sync::watch};
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration, deserialised from `config.toml` layered with
/// `QUORUM_`-prefixed environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ServerConfig {
  host:               String,
  port:               u16,
  store_path:         PathBuf,
  overdue_days:       i64,
  cooldown_days:      i64,
  scan_interval_secs: u64,
  mail_pool:          usize,
  sender_name:        String,
  scan_budget_secs:   Option<u64>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:               "127.0.0.1".to_string(),
      port:               8700,
      store_path:         PathBuf::from("quorum.db"),
      overdue_days:       7,
      cooldown_days:      3,
      scan_interval_secs: 3600,
      mail_pool:          4,
      sender_name:        "Editorial Office".to_string(),
      scan_budget_secs:   None,
    }
  }
}

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Quorum peer-review server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("QUORUM"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open SQLite store.
  let store_path = expand_tilde(&server_cfg.store_path);
  let store = Arc::new(
    SqliteStore::open(&store_path)
      .await
      .with_context(|| format!("failed to open store at {store_path:?}"))?,
  );

  // Wire the engine.
  let service = Arc::new(ReviewService::new(Arc::clone(&store)));
  let scanner = Arc::new(ReminderScanner::new(
    Arc::clone(&store),
    Arc::new(LogMailer),
    ScannerConfig {
      overdue_after: Duration::days(server_cfg.overdue_days),
      cooldown:      Duration::days(server_cfg.cooldown_days),
      max_in_flight: server_cfg.mail_pool,
      sender_name:   server_cfg.sender_name.clone(),
      cycle_budget:  server_cfg
        .scan_budget_secs
        .map(std::time::Duration::from_secs),
    },
  ));

  // Start the reminder ticker.
  let (shutdown_tx, shutdown_rx) = watch::channel(false);
  let ticker = tokio::spawn(scan_loop(
    Arc::clone(&scanner),
    std::time::Duration::from_secs(server_cfg.scan_interval_secs),
    shutdown_rx,
  ));

  let state = ApiState { service, scanner };
  let app = api_router(state).layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  // Serve until ctrl-c, then stop the ticker and drain the listener.
  let shutdown = async move {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::warn!("ctrl-c handler failed: {e}");
    }
    tracing::info!("shutdown signal received");
    let _ = shutdown_tx.send(true);
  };
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown)
    .await
    .context("server error")?;

  ticker.await.context("reminder ticker panicked")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
