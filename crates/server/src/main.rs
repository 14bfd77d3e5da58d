//! Cash Track Server Entry Point

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use cash_track_config::{load_settings, Settings};
use cash_track_core::{Repository, SystemClock};
use cash_track_llm::{LlmConfig, OllamaBackend};
use cash_track_ocr::{HttpOcrClient, HttpOcrConfig};
use cash_track_persistence::SqliteConfig;
use cash_track_server::{create_router, init_metrics, AppState, UploadStorage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Priority: env vars > config/{env}.* > config/default.* > defaults
    let env = std::env::var("CASH_TRACK_ENV").ok();
    let (config, load_error) = match load_settings(env.as_deref()) {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };

    init_tracing(&config);

    if let Some(e) = load_error {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
    }
    tracing::info!("Starting Cash Track Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?config.environment,
        config_env = env.as_deref().unwrap_or("default"),
        database = %config.database.path,
        upload_dir = %config.storage.upload_dir,
        ocr = %config.ocr.endpoint,
        llm = %config.llm.endpoint,
        model = %config.llm.model,
        "Configuration loaded"
    );

    let metrics_handle = if config.observability.metrics_enabled {
        let handle = init_metrics();
        if handle.is_some() {
            tracing::info!("Initialized Prometheus metrics at /metrics");
        }
        handle
    } else {
        None
    };

    let storage = UploadStorage::new(&config.storage.upload_dir)?;

    let repository =
        Arc::new(cash_track_persistence::init(SqliteConfig::from(&config.database)).await?);
    let default_user = repository.ensure_default_user().await?;
    tracing::info!(user_id = default_user.id, "Database ready");

    let llm = Arc::new(OllamaBackend::new(LlmConfig::from(&config.llm))?);
    let ocr = Arc::new(HttpOcrClient::new(HttpOcrConfig::from(&config.ocr))?);
    let clock = Arc::new(SystemClock::new(config.locale.utc_offset_hours));

    let mut state = AppState::new(
        config.clone(),
        repository,
        ocr.clone(),
        llm.clone(),
        clock,
        storage,
        default_user.id,
    )
    .with_probe(llm)
    .with_probe(ocr);
    if let Some(handle) = metrics_handle {
        state = state.with_metrics(handle);
    }

    let app = create_router(state);

    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(host, config.server.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("cash_track={},tower_http=debug", level).into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}
