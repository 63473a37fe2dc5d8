//! # metacatd: metacat daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialise logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Start the change notifier with the HTTP callback sender
//! - Build the catalogs and the axum router
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT), then let queued callbacks
//!   drain
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context as _;
use metacat_adapter_callback_reqwest::HttpCallbackSender;
use metacat_adapter_http_axum::router;
use metacat_adapter_http_axum::state::AppState;
use metacat_adapter_storage_sqlite_sqlx::SqliteDocumentStore;
use metacat_app::catalog::Context;
use metacat_app::notifier::{ChangeNotifier, NotifierConfig};
use metacat_app::store::Limits;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    let filter = EnvFilter::try_new(&config.logging.filter)
        .with_context(|| format!("invalid log filter {:?}", config.logging.filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Database
    let db = metacat_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
        max_connections: config.database.max_connections,
    }
    .build()
    .await
    .context("opening database")?;
    let store = Arc::new(SqliteDocumentStore::new(db.pool().clone()));

    // Notifier
    let (notifier, workers) = start_notifier(&config)?;

    // Catalogs + HTTP
    let ctx = Context::new(
        store,
        Limits {
            max_results: config.limits.max_results,
        },
        notifier,
    );
    let app = router::build(AppState::new(&ctx));
    drop(ctx);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(%bind_addr, "metacatd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    // Every notifier handle went away with the router; workers exit once the
    // queue is drained.
    let grace = config.notifier.timeout() * 2;
    for worker in workers {
        if tokio::time::timeout(grace, worker).await.is_err() {
            tracing::warn!("notifier worker still busy at shutdown, abandoning");
        }
    }
    db.close().await;
    tracing::info!("metacatd stopped");

    Ok(())
}

fn start_notifier(config: &Config) -> anyhow::Result<(ChangeNotifier, Vec<JoinHandle<()>>)> {
    if !config.notifier.enabled {
        tracing::info!("change notifications disabled");
        return Ok((ChangeNotifier::disabled(), Vec::new()));
    }
    let sender = HttpCallbackSender::new(config.notifier.timeout())
        .context("building callback client")?;
    Ok(ChangeNotifier::spawn(
        Arc::new(sender),
        NotifierConfig {
            workers: config.notifier.workers,
            queue_depth: config.notifier.queue_depth,
            timeout: config.notifier.timeout(),
        },
    ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown requested");
}
