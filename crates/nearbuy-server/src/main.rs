mod api;
mod middleware;

use std::sync::Arc;

use nearbuy_geo::H3Grid;
use nearbuy_search::{EstimateConfig, RouteConfig, SearchConfig};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(nearbuy_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = nearbuy_db::PoolConfig::from_app_config(&config);
    let pool = nearbuy_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = nearbuy_db::run_migrations(&pool).await?;
    tracing::info!(applied, env = %config.env, "database ready");

    let state = AppState::new(
        Arc::new(H3Grid::new()),
        Arc::new(nearbuy_db::PgCatalog::new(pool)),
        SearchConfig::from_app_config(&config),
        RouteConfig::from_app_config(&config),
        EstimateConfig::from_app_config(&config),
    );
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
