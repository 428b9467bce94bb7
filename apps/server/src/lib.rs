//! # stocksence-server
//!
//! HTTP backend for StockSence: product catalog, stock levels, sales and
//! revenue reports behind an email/password session.
//!
//! ## Module Structure
//! ```text
//! src/
//! ├── lib.rs          ← You are here (startup + shutdown)
//! ├── main.rs         ← Binary entry, parses --config
//! ├── config.rs       ← TOML config with env overrides
//! ├── error.rs        ← ApiError + HTTP status mapping
//! ├── state/
//! │   ├── mod.rs      ← AppState
//! │   ├── session.rs  ← SessionGate (argon2 + JWT)
//! │   └── alerts.rs   ← AlertCenter (expiring notifications)
//! ├── commands/       ← One module per screen
//! └── http/           ← axum router + handlers
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize logging (tracing)
//! 2. Load configuration
//! 3. Open the SQLite database and run migrations
//! 4. Build shared state
//! 5. Spawn the expired-session sweeper
//! 6. Serve until Ctrl+C / SIGTERM

pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod state;

use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::state::AppState;
use stocksence_db::{Database, DbConfig};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Sets up the global tracing subscriber. `RUST_LOG` wins when set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stocksence=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Runs the server until a shutdown signal arrives.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let db_path = match &config.database.path {
        Some(path) => path.clone(),
        None => ServerConfig::default_database_path()
            .context("could not determine a data directory for the database")?,
    };
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    info!(path = %db_path.display(), "Opening database");

    let db = Database::new(DbConfig::new(&db_path).max_connections(config.database.max_connections))
        .await
        .context("failed to open database")?;

    let state = AppState::from_config(db.clone(), &config)?;
    spawn_session_sweeper(state.clone());

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "StockSence server listening");

    axum::serve(listener, http::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

fn spawn_session_sweeper(state: AppState) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            match state.sessions.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "Purged expired sessions"),
                Err(e) => warn!(error = %e, "Session sweep failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
