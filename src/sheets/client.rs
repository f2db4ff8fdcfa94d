//! Google Sheets append client with cached OAuth2 access tokens.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::SheetsError;
use crate::sheets::credentials::AuthorizedUser;
use crate::sheets::RowSink;
use crate::wizard::row::ROW_WIDTH;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Refresh the access token this long before it actually expires.
const TOKEN_LEEWAY_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_LEEWAY_SECS) >= self.expires_at
    }
}

/// Appends rows to one sheet of one spreadsheet.
pub struct SheetsClient {
    http: reqwest::Client,
    creds: AuthorizedUser,
    spreadsheet_id: String,
    sheet_name: String,
    token: Mutex<Option<CachedToken>>,
}

impl SheetsClient {
    pub fn new(creds: AuthorizedUser, spreadsheet_id: String, sheet_name: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            creds,
            spreadsheet_id,
            sheet_name,
            token: Mutex::new(None),
        }
    }

    /// Column range covering one full report row.
    fn append_range(&self) -> String {
        format!("{}!A:{}", self.sheet_name, column_name(ROW_WIDTH))
    }

    /// Get a valid access token, exchanging the refresh token when the
    /// cached one is missing or about to expire.
    async fn access_token(&self) -> Result<String, SheetsError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if !token.is_stale(Utc::now()) {
                return Ok(token.access_token.clone());
            }
        }

        let params = [
            ("client_id", self.creds.client_id.as_str()),
            ("client_secret", self.creds.client_secret.expose_secret()),
            ("refresh_token", self.creds.refresh_token.expose_secret()),
            ("grant_type", "refresh_token"),
        ];
        let resp = self.http.post(TOKEN_URL).form(&params).send().await?;
        if !resp.status().is_success() {
            let reason = resp.text().await.unwrap_or_default();
            return Err(SheetsError::AuthFailed { reason });
        }
        let token: TokenResponse = resp.json().await?;

        let entry = CachedToken {
            access_token: token.access_token.clone(),
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        };
        *cached = Some(entry);
        tracing::debug!("refreshed Sheets access token");
        Ok(token.access_token)
    }
}

#[async_trait]
impl RowSink for SheetsClient {
    async fn append_row(&self, row: Vec<String>) -> Result<(), SheetsError> {
        let token = self.access_token().await?;
        let url = format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}:append",
            self.spreadsheet_id,
            self.append_range(),
        );
        let body = serde_json::json!({"values": [row]});

        let resp = self
            .http
            .post(&url)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let reason = resp.text().await.unwrap_or_default();
            return Err(SheetsError::AppendFailed {
                sheet: self.sheet_name.clone(),
                reason,
            });
        }

        tracing::info!(sheet = %self.sheet_name, "row appended");
        Ok(())
    }
}

/// 1-based column index to its A1-notation name (1 → A, 45 → AS).
fn column_name(mut index: usize) -> String {
    let mut name = String::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        name.insert(0, (b'A' + rem as u8) as char);
        index = (index - 1) / 26;
    }
    name
}
