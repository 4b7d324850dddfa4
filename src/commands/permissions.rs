use super::{print_json, CommandResult};
use calendar_events::{CalendarClient, CalendarProvider};
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum PermissionAction {
    /// Show the current authorization status
    Check {
        /// Only consider read access
        #[arg(long)]
        read_only: bool,
    },
    /// Ask for calendar access
    Request {
        /// Only ask for read access
        #[arg(long)]
        read_only: bool,
    },
}

pub async fn run<P>(action: PermissionAction, client: &CalendarClient<P>) -> CommandResult
where
    P: CalendarProvider + ?Sized,
{
    let status = match action {
        PermissionAction::Check { read_only } => client.check_permissions(read_only).await?,
        PermissionAction::Request { read_only } => client.request_permissions(read_only).await?,
    };
    print_json(&status)
}
