use crate::commands::{self, Cli};
use calendar_events::components::LocalStoreHandle;
use calendar_events::config::Config;
use calendar_events::error::Error;
use calendar_events::CalendarClient;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration.
///
/// Logs go to stderr so command output on stdout stays machine readable.
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Open the local store, run one command against it and shut it down
pub async fn run(cli: Cli, config: Config) -> miette::Result<()> {
    let store = LocalStoreHandle::open(&config).await?;
    match &config.store_path {
        Some(path) => info!("Using calendar store at {}", path.display()),
        None => info!("Using in-memory calendar store"),
    }

    let client = CalendarClient::new(Arc::new(store.clone()));
    let result = commands::run(cli.command, &client).await;

    store.shutdown().await?;
    result.map_err(Into::into)
}
