pub mod api; // HTTP surface
pub mod auth;
pub mod config;
pub mod core_state;
pub mod dashboard;
pub mod db;
pub mod exam; // wizard ↔ record store
pub mod models;
pub mod report;
pub mod scheduling;
pub mod session;
pub mod uploads;
pub mod validation;
pub mod wizard;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Startup failures surfaced by [`run`].
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    State(#[from] core_state::CoreError),
    #[error(transparent)]
    Server(#[from] api::ServerError),
}

/// Initialize logging, open the clinic database, and serve the API until ctrl-c.
pub async fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let app_config = config::AppConfig::from_env()?;
    tracing::info!(data_dir = %app_config.data_dir.display(), "Using data directory");

    let core = Arc::new(core_state::CoreState::open(app_config)?);
    api::serve(core).await?;
    Ok(())
}
