//! Backend entry-point: loads settings, wires adapters and serves the REST
//! API with OpenAPI docs.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use orbsurvey::inbound::http::health::HealthState;
use orbsurvey::inbound::http::session_config::{
    BuildMode, key_fingerprint, session_settings_from_env,
};
use orbsurvey::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{ServerConfig, ServerSettings, create_server};

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

    let settings = ServerSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
    )
    .with_identity(settings.identity().map_err(std::io::Error::other)?)
    .with_assignment(settings.assignment().map_err(std::io::Error::other)?)
    .with_admin(settings.admin().map_err(std::io::Error::other)?);

    if let Some(url) = settings.database_url.as_deref() {
        run_pending_migrations(url)
            .await
            .map_err(std::io::Error::other)?;
        let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_size()))
            .await
            .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(server::make_metrics()?));

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting server");
    create_server(health_state, config).await?.await
}
