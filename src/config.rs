//! Process configuration, loaded once at startup from the environment.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Where the Google credential material comes from.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Path to an authorized-user JSON file.
    File(PathBuf),
    /// Inline JSON blob, raw or base64-encoded.
    Inline(String),
}

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token from @BotFather.
    pub bot_token: SecretString,
    /// Optional outbound proxy (http://, https:// or socks5://).
    pub proxy_url: Option<String>,
    /// Usernames or numeric user ids allowed to talk to the bot. `*` = everyone.
    pub allowed_users: Vec<String>,
    /// Target spreadsheet id.
    pub spreadsheet_id: String,
    /// Target sheet (tab) name within the spreadsheet.
    pub sheet_name: String,
    /// Google credential material.
    pub credentials: CredentialSource,
}

impl Config {
    /// Load configuration from the environment. Missing required values are
    /// fatal here rather than at first use.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = require_env("BOT_TOKEN")?;

        let proxy_url = std::env::var("PROXY_URL").ok().filter(|s| !s.is_empty());

        let allowed_users = parse_allowed_users(
            &std::env::var("TELEGRAM_ALLOWED_USERS").unwrap_or_else(|_| "*".to_string()),
        );

        let spreadsheet_id = require_env("GOOGLE_SPREADSHEET_ID")?;

        let sheet_name =
            std::env::var("GOOGLE_SHEET_NAME").unwrap_or_else(|_| "Hoja1".to_string());

        let credentials = match (
            std::env::var("GOOGLE_CREDENTIALS_FILE").ok().filter(|s| !s.is_empty()),
            std::env::var("GOOGLE_CREDENTIALS_JSON").ok().filter(|s| !s.is_empty()),
        ) {
            (Some(path), _) => CredentialSource::File(PathBuf::from(path)),
            (None, Some(blob)) => CredentialSource::Inline(blob),
            (None, None) => {
                return Err(ConfigError::MissingEnvVar(
                    "GOOGLE_CREDENTIALS_FILE or GOOGLE_CREDENTIALS_JSON".to_string(),
                ));
            }
        };

        Ok(Self {
            bot_token: SecretString::from(bot_token),
            proxy_url,
            allowed_users,
            spreadsheet_id,
            sheet_name,
            credentials,
        })
    }
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingEnvVar(key.to_string())),
    }
}

/// Split a comma-separated allowlist, dropping empty entries.
pub fn parse_allowed_users(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
