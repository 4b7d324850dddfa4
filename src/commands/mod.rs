use calendar_events::{CalendarClient, CalendarProvider, CalendarResult};
use clap::{Parser, Subcommand};
use serde::Serialize;

// Export submodules
pub mod calendars;
pub mod events;
pub mod permissions;

/// Command line front end for the calendar store
#[derive(Parser, Debug)]
#[command(name = "calendar-events", version, about = "Read and write device calendars")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Calendar permission state
    Permissions {
        #[command(subcommand)]
        action: permissions::PermissionAction,
    },
    /// Calendar management
    Calendars {
        #[command(subcommand)]
        action: calendars::CalendarAction,
    },
    /// Event management
    Events {
        #[command(subcommand)]
        action: events::EventAction,
    },
    /// Print the locator of the calendar app
    Uri,
}

/// Type alias for command result
pub type CommandResult = CalendarResult<()>;

/// Dispatch one parsed command
pub async fn run<P>(command: Commands, client: &CalendarClient<P>) -> CommandResult
where
    P: CalendarProvider + ?Sized,
{
    match command {
        Commands::Permissions { action } => permissions::run(action, client).await,
        Commands::Calendars { action } => calendars::run(action, client).await,
        Commands::Events { action } => events::run(action, client).await,
        Commands::Uri => print_json(&client.uri_for_calendar().await?),
    }
}

/// Write a value to stdout as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{}", rendered);
    Ok(())
}
