//! Error types for Jornada Bot.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Sheets error: {0}")]
    Sheets(#[from] SheetsError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Credential error: {0}")]
    Credentials(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Telegram transport errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Transport failed to start: {reason}")]
    StartupFailed { reason: String },

    #[error("Failed to send to chat {chat_id}: {reason}")]
    SendFailed { chat_id: i64, reason: String },

    #[error("Failed to edit message {message_id} in chat {chat_id}: {reason}")]
    EditFailed {
        chat_id: i64,
        message_id: i64,
        reason: String,
    },

    #[error("Invalid update payload: {0}")]
    InvalidUpdate(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Tabular-store (Google Sheets) errors.
#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("Authentication failed: {reason}")]
    AuthFailed { reason: String },

    #[error("Append to sheet {sheet} failed: {reason}")]
    AppendFailed { sheet: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
