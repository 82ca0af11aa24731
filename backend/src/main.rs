//! Service entry-point: loads settings, wires adapters and serves HTTP.

mod server;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use ortho_config::OrthoConfig;
use viandas::inbound::http::health::HealthState;
use viandas::outbound::persistence::{DbPool, PoolConfig};
use viandas::settings::ServiceSettings;

use server::ServerConfig;

fn settings_error(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("invalid configuration: {err}"))
}

async fn server_config(settings: &ServiceSettings) -> std::io::Result<ServerConfig> {
    let mut config = ServerConfig::new(settings.bind_addr().map_err(settings_error)?);

    if let Some(url) = settings.database_url() {
        let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_max_size()))
            .await
            .map_err(|err| std::io::Error::other(format!("database pool failed: {err}")))?;
        config = config.with_db_pool(pool);
    }

    if let Some(url) = settings.oracle_url().map_err(settings_error)? {
        config = config.with_oracle(url, settings.oracle_timeout());
    }

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(server::make_metrics()?));

    Ok(config)
}

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

    let settings = ServiceSettings::load_from_iter(std::env::args_os()).map_err(settings_error)?;
    let config = server_config(&settings).await?;
    info!(bind_addr = %config.bind_addr, "starting container lifecycle service");

    let health_state = web::Data::new(HealthState::new());
    let server = server::create_server(health_state, config).await?;
    server.await
}
