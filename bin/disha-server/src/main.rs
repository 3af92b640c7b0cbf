//! disha-server – entry point.
//!
//! Startup order:
//! 1. Load `.env` and parse configuration from environment variables.
//! 2. Initialise structured tracing (JSON or pretty; stdout or daily files).
//! 3. Check required settings.
//! 4. Open the SQLite database and run pending migrations.
//! 5. Load the base system prompt and build the Gemini client.
//! 6. Build the Axum router and start the HTTP server with graceful shutdown.

mod config;
mod error;
mod extract;
mod middleware;
mod routes;
mod schemas;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use disha_app_core::llm::GeminiClient;
use disha_app_core::prompt::load_system_prompt;
use disha_app_core::services::ChatService;
use disha_app_core::SqliteStore;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let dotenv = dotenvy::dotenv();
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    // Dropping the guard flushes buffered log lines, so it lives until exit.
    let _log_guard = init_tracing(&cfg);

    info!(version = env!("CARGO_PKG_VERSION"), "disha-server starting");
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "failed to load .env"),
    }

    // ── 3. Required settings ───────────────────────────────────────────────────
    let api_key = cfg
        .google_api_key
        .clone()
        .context("GOOGLE_API_KEY is not set")?;

    // ── 4. Database ────────────────────────────────────────────────────────────
    let store = SqliteStore::connect(&cfg.database_url, cfg.pool_settings()).await?;
    info!(database_url = %cfg.database_url, "database ready");
    let store = Arc::new(store);

    // ── 5. Prompt and model ────────────────────────────────────────────────────
    let system_prompt = load_system_prompt(&cfg.system_prompt_path).await?;
    let model = GeminiClient::new(cfg.gemini_config(&api_key))?;
    info!(model = model.model(), timeout_secs = cfg.llm_timeout_secs, "Gemini client ready");

    let chat = ChatService::new(Arc::clone(&store), Arc::new(model), system_prompt);

    // ── 6. HTTP server with graceful shutdown ──────────────────────────────────
    let addr: SocketAddr = cfg
        .bind_address
        .parse()
        .with_context(|| format!("invalid DISHA_BIND '{}'", cfg.bind_address))?;
    let state = Arc::new(AppState::new(cfg, chat, store));
    let app = routes::build(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("disha-server stopped");
    Ok(())
}

/// Install the global subscriber. The returned guard must outlive all logging.
fn init_tracing(cfg: &Config) -> WorkerGuard {
    // Build the log-level filter, warning loudly if the configured value is
    // not a valid tracing filter expression.
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: DISHA_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };

    let (writer, guard) = match &cfg.log_dir {
        Some(dir) => tracing_appender::non_blocking(tracing_appender::rolling::daily(
            dir,
            "disha-server.log",
        )),
        None => tracing_appender::non_blocking(std::io::stdout()),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_ansi(cfg.log_dir.is_none())
        .with_writer(writer);

    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    guard
}

/// Returns a future that resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
