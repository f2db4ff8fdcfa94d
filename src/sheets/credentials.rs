//! Google credential loading — file path or inline (optionally base64) JSON.

use base64::Engine;
use secrecy::SecretString;
use serde::Deserialize;

use crate::config::CredentialSource;
use crate::error::ConfigError;

/// OAuth2 authorized-user credentials for the Sheets API.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: SecretString,
    pub refresh_token: SecretString,
}

/// Load credentials from the configured source. Fails loudly: a missing
/// file or an undecodable blob is a startup error, never ignored.
pub fn load(source: &CredentialSource) -> Result<AuthorizedUser, ConfigError> {
    let raw = match source {
        CredentialSource::File(path) => std::fs::read_to_string(path).map_err(|e| {
            ConfigError::Credentials(format!("cannot read {}: {e}", path.display()))
        })?,
        CredentialSource::Inline(blob) => decode_inline(blob)?,
    };

    serde_json::from_str(&raw)
        .map_err(|e| ConfigError::Credentials(format!("invalid credential JSON: {e}")))
}

/// Inline blobs may be raw JSON or base64-wrapped JSON.
fn decode_inline(blob: &str) -> Result<String, ConfigError> {
    let trimmed = blob.trim();
    if trimmed.starts_with('{') {
        return Ok(trimmed.to_string());
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(trimmed)
        .map_err(|e| ConfigError::Credentials(format!("credential blob is neither JSON nor base64: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| ConfigError::Credentials(format!("credential blob is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "client_id": "id-123.apps.googleusercontent.com",
        "client_secret": "shh",
        "refresh_token": "1//refresh"
    }"#;

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let creds = load(&CredentialSource::File(file.path().to_path_buf())).unwrap();
        assert_eq!(creds.client_id, "id-123.apps.googleusercontent.com");
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = load(&CredentialSource::File("/nonexistent/creds.json".into()));
        assert!(matches!(result, Err(ConfigError::Credentials(_))));
    }

    #[test]
    fn loads_inline_raw_json() {
        let creds = load(&CredentialSource::Inline(SAMPLE.to_string())).unwrap();
        assert_eq!(creds.client_id, "id-123.apps.googleusercontent.com");
    }

    #[test]
    fn loads_inline_base64() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(SAMPLE);
        let creds = load(&CredentialSource::Inline(encoded)).unwrap();
        assert_eq!(creds.client_id, "id-123.apps.googleusercontent.com");
    }

    #[test]
    fn garbage_blob_is_an_error() {
        let result = load(&CredentialSource::Inline("not json, not base64!!".to_string()));
        assert!(matches!(result, Err(ConfigError::Credentials(_))));
    }

    #[test]
    fn json_missing_fields_is_an_error() {
        let result = load(&CredentialSource::Inline(r#"{"client_id": "x"}"#.to_string()));
        assert!(matches!(result, Err(ConfigError::Credentials(_))));
    }
}
