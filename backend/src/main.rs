//! User API entry-point: loads settings, prepares persistence, and serves the
//! REST endpoints, health checks, and OpenAPI docs.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, build_repository, create_server};
use user_api::inbound::http::health::HealthState;
use user_api::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use user_api::settings::AppSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(bind_addr);
    if let Some(database_url) = settings.database_url() {
        if settings.run_migrations() {
            run_pending_migrations(database_url)
                .await
                .map_err(std::io::Error::other)?;
        } else {
            info!("skipping database migrations");
        }

        let max_size = settings
            .db_max_connections()
            .map_err(std::io::Error::other)?;
        let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(max_size))
            .await
            .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    let repository = build_repository(&config);
    let health_state = web::Data::new(HealthState::new(repository.clone()));
    let server = create_server(health_state.clone(), repository, config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
