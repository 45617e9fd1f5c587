//! Castline Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use castline_engine::api;
use castline_engine::infrastructure::{
    catalog::load_catalog, config::EngineConfig, snapshot_store::JsonSnapshotStore,
};
use castline_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine is often run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "castline_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Castline Engine");

    let config = EngineConfig::from_env();
    tracing::info!(
        data_dir = %config.data_dir.display(),
        catalog = %config.species_path.display(),
        season_start = %config.season_start,
        "Configuration loaded"
    );

    let catalog = load_catalog(&config.species_path).await?;
    let snapshot_store = Arc::new(JsonSnapshotStore::new(config.data_dir.clone()));
    let app = Arc::new(App::new(&config, catalog, snapshot_store));

    // Inventories must be back in memory before any action is accepted
    app.use_cases.snapshots.restore().await?;

    // Spawn periodic snapshot flush
    let flush_app = app.clone();
    let snapshot_interval = config.snapshot_interval;
    let flush_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(snapshot_interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = flush_app.use_cases.snapshots.flush().await {
                tracing::warn!(error = %e, "Periodic snapshot flush failed");
            }
        }
    });

    let mut router = api::http::routes()
        .with_state(app.clone())
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer(config.cors_allowed_origins.as_deref()) {
        router = router.layer(cors);
    }

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    flush_task.abort();
    app.use_cases.snapshots.flush().await?;
    tracing::info!("Final snapshot written, shutting down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer(allowed_origins: Option<&str>) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins.map(str::trim).filter(|s| !s.is_empty())?;

    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
