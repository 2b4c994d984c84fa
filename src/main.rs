//! Campus resource server.
//!
//! Main entry point that loads configuration, wires the backends and
//! services together and serves the HTTP API.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use campus_api::{AppState, build_app};
use campus_core::config::AppConfig;
use campus_core::error::AppError;
use campus_database::Repositories;
use campus_service::{HttpSummarizer, Summarizer};
use campus_storage::StorageManager;

#[tokio::main]
async fn main() {
    let env = std::env::var("CAMPUS_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting campus-server v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database backend (+ migrations) ─────────────────
    tracing::info!(backend = %config.database.backend, "Connecting database backend...");
    let repositories = Repositories::from_config(&config.database).await?;

    // ── Step 2: Blob storage ────────────────────────────────────
    tracing::info!(provider = %config.storage.provider, "Initializing blob storage...");
    let storage = StorageManager::from_config(&config.storage).await?;

    // ── Step 3: Optional document summarizer ────────────────────
    let summarizer: Option<Arc<dyn Summarizer>> = match HttpSummarizer::from_config(&config.summarizer)? {
        Some(client) => {
            tracing::info!(endpoint = %config.summarizer.endpoint, "Document summarizer enabled");
            Some(Arc::new(client))
        }
        None => {
            tracing::info!("Document summarizer disabled");
            None
        }
    };

    // ── Step 4: Services + HTTP app ─────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let pool = repositories.pool.clone();
    let state = AppState::build(config, repositories, storage, summarizer);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!(%addr, "campus-server listening");

    // ── Step 5: Serve until a shutdown signal ───────────────────
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            return flatten_server_result(result);
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received, draining in-flight requests...");
        }
    }

    let _ = stop_tx.send(());
    match tokio::time::timeout(grace, server).await {
        Ok(result) => flatten_server_result(result)?,
        Err(_) => tracing::warn!(
            grace_seconds = grace.as_secs(),
            "Grace period elapsed; dropping remaining connections"
        ),
    }

    if let Some(pool) = pool {
        pool.close().await;
    }

    tracing::info!("campus-server shut down gracefully");
    Ok(())
}

fn flatten_server_result(
    result: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(AppError::internal(format!("Server error: {e}"))),
        Err(e) => Err(AppError::internal(format!("Server task failed: {e}"))),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
}
