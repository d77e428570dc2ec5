use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use coachdesk_api::config::ServerConfig;
use coachdesk_api::router::build_app_router;
use coachdesk_api::state::AppState;
use coachdesk_core::widgets::WidgetRegistry;
use coachdesk_db::DbPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    let host: IpAddr = config
        .host
        .parse()
        .with_context(|| format!("HOST '{}' is not an IP address", config.host))?;
    let addr = SocketAddr::new(host, config.port);

    let pool = connect().await?;

    let registry = WidgetRegistry::standard();
    tracing::info!(widgets = registry.len(), "Overview widgets registered");

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        registry: Arc::new(registry),
    };
    let app = build_app_router(state, &config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "Admin API listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    pool.close().await;
    tracing::info!("Database pool closed");
    served.context("Server error")
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coachdesk_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect, verify and migrate the database.
async fn connect() -> anyhow::Result<DbPool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = coachdesk_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    coachdesk_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    coachdesk_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database ready");
    Ok(pool)
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => tracing::info!("Ctrl-C received, shutting down"),
                    _ = terminate.recv() => tracing::info!("SIGTERM received, shutting down"),
                }
                return;
            }
            Err(err) => tracing::warn!(error = %err, "SIGTERM handler unavailable"),
        }
    }

    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Ctrl-C handler unavailable");
        std::future::pending::<()>().await;
    }
    tracing::info!("Ctrl-C received, shutting down");
}
