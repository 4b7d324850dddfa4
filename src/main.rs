mod commands;
mod startup;

use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = commands::Cli::parse();

    // Initialize logging
    startup::init_logging()?;

    info!("Starting calendar-events");

    // Load configuration
    let config = startup::load_config()?;

    startup::run(cli, config).await
}
