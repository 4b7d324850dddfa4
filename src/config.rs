use crate::error::{config_error, env_error, CalendarResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Default content URI reported for the calendar app
pub const DEFAULT_CONTENT_URI: &str = "content://com.android.calendar/events";

/// Default snapshot file of the local store
pub const DEFAULT_STORE_PATH: &str = "data/calendar.json";

/// Default location of the TOML configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/calendar.toml";

/// What the local store answers when a permission prompt is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PromptOutcome {
    #[default]
    Grant,
    Deny,
    Cancel,
}

/// Initial permission grants and prompt behaviour of the local store
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PermissionConfig {
    /// Read access granted up front
    pub read: bool,
    /// Write access granted up front
    pub write: bool,
    /// Outcome of a permission request that needs a prompt
    pub prompt: PromptOutcome,
    /// Whether the platform would show a rationale after a refusal
    pub show_rationale: bool,
}

/// Sections of the TOML configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    permissions: PermissionConfig,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot file for the local store, in-memory only when unset
    pub store_path: Option<PathBuf>,
    /// Default time zone for events without one
    pub timezone: String,
    /// Locator returned by `uri_for_calendar`
    pub content_uri: String,
    /// Hand event URIs to the system handler when opening them
    pub launch_calendar_app: bool,
    /// Permission behaviour of the local store
    pub permissions: PermissionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: None,
            timezone: String::from("UTC"),
            content_uri: DEFAULT_CONTENT_URI.to_string(),
            launch_calendar_app: true,
            permissions: PermissionConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> CalendarResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // An empty value keeps the store in memory
        let store_path = match env::var("CALENDAR_STORE_PATH") {
            Ok(path) if path.is_empty() => None,
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => Some(PathBuf::from(DEFAULT_STORE_PATH)),
        };
        let timezone = env::var("TIMEZONE").unwrap_or_else(|_| String::from("UTC"));
        let content_uri =
            env::var("CALENDAR_CONTENT_URI").unwrap_or_else(|_| DEFAULT_CONTENT_URI.to_string());

        let launch_calendar_app = match env::var("CALENDAR_LAUNCH_APP") {
            Ok(value) => value
                .parse::<bool>()
                .map_err(|_| env_error("CALENDAR_LAUNCH_APP"))?,
            Err(_) => true,
        };

        let config_path =
            env::var("CALENDAR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let permissions = Self::read_permissions(Path::new(&config_path))?;

        let config = Config {
            store_path,
            timezone,
            content_uri,
            launch_calendar_app,
            permissions,
        };
        config.validate()?;

        Ok(config)
    }

    /// Read the `[permissions]` table of a config file.
    ///
    /// A missing file gives the defaults; an unreadable or broken one is an error.
    pub fn read_permissions(path: &Path) -> CalendarResult<PermissionConfig> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(PermissionConfig::default()),
            Err(e) => {
                return Err(config_error(&format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let file_config: FileConfig = toml::from_str(&content)?;
        Ok(file_config.permissions)
    }

    /// Check values that would otherwise fail later inside the store
    pub fn validate(&self) -> CalendarResult<()> {
        self.default_timezone()?;
        url::Url::parse(&self.content_uri)
            .map_err(|e| config_error(&format!("Invalid content URI {}: {}", self.content_uri, e)))?;
        Ok(())
    }

    /// Parse the configured default time zone
    pub fn default_timezone(&self) -> CalendarResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown time zone: {}", self.timezone)))
    }
}
