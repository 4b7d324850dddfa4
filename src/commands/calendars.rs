use super::{print_json, CommandResult};
use calendar_events::models::{CalendarOptions, CalendarSource};
use calendar_events::{CalendarClient, CalendarProvider};
use clap::Subcommand;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum CalendarAction {
    /// List every calendar
    List,
    /// Create a calendar and print its id
    Add {
        #[arg(long)]
        title: String,
        /// Internal name, defaults to the title
        #[arg(long)]
        name: Option<String>,
        /// Colour as hex, rgb()/hsl() or a CSS name
        #[arg(long, default_value = "#2196f3")]
        color: String,
        #[arg(long, default_value = "owner")]
        access_level: String,
        #[arg(long)]
        owner_account: Option<String>,
        /// Account the calendar belongs to
        #[arg(long, default_value = "local")]
        source: String,
        /// Account type, a local account when left out
        #[arg(long)]
        source_type: Option<String>,
    },
    /// Remove a calendar by id
    Remove { id: String },
    /// Remove every calendar with the given name
    RemoveByName { name: String },
    /// Print the id of the calendar with the given name
    FindId { name: String },
}

pub async fn run<P>(action: CalendarAction, client: &CalendarClient<P>) -> CommandResult
where
    P: CalendarProvider + ?Sized,
{
    match action {
        CalendarAction::List => print_json(&client.find_calendars().await?),
        CalendarAction::Add {
            title,
            name,
            color,
            access_level,
            owner_account,
            source,
            source_type,
        } => {
            let options = CalendarOptions {
                name: Some(name.unwrap_or_else(|| title.clone())),
                title: Some(title),
                color: Some(color),
                access_level: Some(access_level),
                owner_account: Some(owner_account.unwrap_or_else(|| source.clone())),
                source: Some(CalendarSource {
                    name: Some(source),
                    is_local_account: source_type.is_none(),
                    source_type,
                }),
            };
            let id = client.save_calendar(options).await?;
            info!("Created calendar {}", id);
            print_json(&id)
        }
        CalendarAction::Remove { id } => print_json(&client.remove_calendar(&id).await?),
        CalendarAction::RemoveByName { name } => {
            print_json(&client.remove_calendar_by_name(&name).await?)
        }
        CalendarAction::FindId { name } => print_json(&client.find_calendar_id(&name).await?),
    }
}
