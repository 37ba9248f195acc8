mod action;
mod app;
mod app_state;
mod callback;
mod component;
mod components;
mod inflight;
mod login;
mod playlists;
mod ranking;
mod router;
mod theme;
mod widgets;

use std::sync::Arc;
use std::time::Duration;

use rankmute_proto::{config::Config, ApiClient, SessionStore};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Load config ──────────────────────────────────────────────────────────
    let config = Config::load().unwrap_or_default();

    let log_path = config.paths.log_file.clone();
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; keep HTTP client internals quiet by default.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("rankmute log: {}", log_path.display());

    tracing::info!(backend = %config.backend.base_url, "rankmute starting…");

    // ── Backend client + stored session ──────────────────────────────────────
    let api = ApiClient::new(
        &config.backend.base_url,
        Duration::from_secs(config.backend.timeout_secs),
    )?;
    let sessions = Arc::new(SessionStore::load(&config.paths.session_file));

    // ── Login callback listener ──────────────────────────────────────────────
    let (callback_tx, callback_rx) = mpsc::channel(8);
    callback::start_server(
        config.login.bind_address.clone(),
        config.login.port,
        config.login.callback_path.clone(),
        callback_tx,
    );

    // Optional first argument: page to open on, as a path ("/playlist").
    let start = std::env::args().nth(1).map(|p| router::Route::from_path(&p));

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(&config, api, sessions, start);
    app.run(callback_rx).await?;

    tracing::info!("rankmute exiting");
    Ok(())
}
