use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Permission denied: {0}")]
    #[diagnostic(code(calendar_events::denied))]
    PermissionDenied(String),

    /// Raised by the client when a calendar save cannot be confirmed
    #[error("saveCalendar error")]
    #[diagnostic(
        code(calendar_events::calendar_save),
        help("the provider returned no id, or the id was missing from the calendar list")
    )]
    CalendarSave,

    #[error("Invalid input: {0}")]
    #[diagnostic(code(calendar_events::invalid_input))]
    InvalidInput(String),

    #[error("{code}: {message}")]
    #[diagnostic(code(calendar_events::provider))]
    Provider { code: String, message: String },

    #[error("Calendar store error: {0}")]
    #[diagnostic(code(calendar_events::store))]
    Store(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(calendar_events::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(calendar_events::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(calendar_events::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(calendar_events::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(calendar_events::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type CalendarResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create provider errors carrying a rejection code
pub fn provider_error(code: &str, message: &str) -> Error {
    Error::Provider {
        code: code.to_string(),
        message: message.to_string(),
    }
}

/// Helper to create calendar store errors
pub fn store_error(message: &str) -> Error {
    Error::Store(message.to_string())
}

/// Helper to create invalid input errors
pub fn invalid_input(message: &str) -> Error {
    Error::InvalidInput(message.to_string())
}

/// Helper to create permission errors
pub fn permission_denied() -> Error {
    Error::PermissionDenied("no permission".to_string())
}
