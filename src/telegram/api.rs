//! Bot API client — long-polls `getUpdates` and sends/edits prompts.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream::BoxStream;
use secrecy::{ExposeSecret, SecretString};

use crate::error::TransportError;
use crate::telegram::types::{ApiResponse, InlineKeyboardMarkup, Message, Update, User};

/// Long-poll timeout handed to `getUpdates`.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Backoff after a failed poll before trying again.
const POLL_RETRY_SECS: u64 = 5;

/// Telegram Bot API client.
pub struct TelegramApi {
    token: SecretString,
    client: reqwest::Client,
}

impl TelegramApi {
    /// Build a client, routing through `proxy_url` when configured
    /// (http://, https:// or socks5://).
    pub fn new(token: SecretString, proxy_url: Option<&str>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(url) = proxy_url {
            let proxy = reqwest::Proxy::all(url).map_err(|e| TransportError::StartupFailed {
                reason: format!("invalid proxy url: {e}"),
            })?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build().map_err(|e| TransportError::StartupFailed {
            reason: e.to_string(),
        })?;
        Ok(Self { token, client })
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{method}", self.token.expose_secret())
    }

    /// Verify the token against `getMe`. Fatal at startup if rejected.
    pub async fn get_me(&self) -> Result<User, TransportError> {
        let resp = self.client.get(self.api_url("getMe")).send().await?;
        if !resp.status().is_success() {
            return Err(TransportError::StartupFailed {
                reason: format!("getMe returned {}", resp.status()),
            });
        }
        let body: ApiResponse<User> = resp.json().await?;
        body.result.ok_or_else(|| TransportError::StartupFailed {
            reason: body.description.unwrap_or_else(|| "getMe returned no user".to_string()),
        })
    }

    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TransportError> {
        let body = serde_json::json!({
            "offset": offset,
            "timeout": POLL_TIMEOUT_SECS,
            "allowed_updates": ["message", "callback_query"],
        });
        let resp = self
            .client
            .post(self.api_url("getUpdates"))
            .json(&body)
            .send()
            .await?;
        let body: ApiResponse<Vec<Update>> = resp.json().await?;
        if !body.ok {
            return Err(TransportError::InvalidUpdate(
                body.description.unwrap_or_else(|| "getUpdates not ok".to_string()),
            ));
        }
        Ok(body.result.unwrap_or_default())
    }

    /// Send a text prompt, optionally with an inline keyboard.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<Message, TransportError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(kb) = keyboard {
            body["reply_markup"] = serde_json::to_value(kb).map_err(|e| {
                TransportError::SendFailed {
                    chat_id,
                    reason: e.to_string(),
                }
            })?;
        }

        let resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            let reason = resp.text().await.unwrap_or_default();
            return Err(TransportError::SendFailed { chat_id, reason });
        }
        let body: ApiResponse<Message> = resp.json().await?;
        body.result.ok_or_else(|| TransportError::SendFailed {
            chat_id,
            reason: body.description.unwrap_or_else(|| "sendMessage returned no message".to_string()),
        })
    }

    /// Edit a previously sent prompt in place (select-state re-renders).
    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), TransportError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
        });
        if let Some(kb) = keyboard {
            body["reply_markup"] = serde_json::to_value(kb).map_err(|e| {
                TransportError::EditFailed {
                    chat_id,
                    message_id,
                    reason: e.to_string(),
                }
            })?;
        }

        let resp = self
            .client
            .post(self.api_url("editMessageText"))
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            let reason = resp.text().await.unwrap_or_default();
            return Err(TransportError::EditFailed {
                chat_id,
                message_id,
                reason,
            });
        }
        Ok(())
    }

    /// Acknowledge a callback query so the client stops its spinner.
    pub async fn answer_callback_query(&self, query_id: &str) -> Result<(), TransportError> {
        let body = serde_json::json!({"callback_query_id": query_id});
        let resp = self
            .client
            .post(self.api_url("answerCallbackQuery"))
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "answerCallbackQuery failed");
        }
        Ok(())
    }

    /// Spawn the long-poll loop and expose updates as a stream.
    ///
    /// Updates from users outside the allowlist are dropped here, before
    /// they reach any session.
    pub fn spawn_updates(
        self: &Arc<Self>,
        allowed_users: Vec<String>,
    ) -> BoxStream<'static, Update> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let api = Arc::clone(self);

        tokio::spawn(async move {
            let mut offset: i64 = 0;
            tracing::info!("Telegram transport listening for updates...");

            loop {
                let updates = match api.get_updates(offset).await {
                    Ok(u) => u,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(POLL_RETRY_SECS)).await;
                        continue;
                    }
                };

                for update in updates {
                    offset = offset.max(update.update_id + 1);

                    let Some(from) = update
                        .message
                        .as_ref()
                        .and_then(|m| m.from.as_ref())
                        .or_else(|| update.callback_query.as_ref().map(|cb| &cb.from))
                    else {
                        continue;
                    };

                    if !user_allowed(&allowed_users, from) {
                        tracing::warn!(
                            user_id = from.id,
                            username = from.username.as_deref().unwrap_or("unknown"),
                            "ignoring update from unauthorized user"
                        );
                        continue;
                    }

                    if tx.send(update).is_err() {
                        tracing::info!("Telegram update stream closed");
                        return;
                    }
                }
            }
        });

        futures::stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|u| (u, rx)) })
            .boxed()
    }
}

/// Check a user against the allowlist by username or numeric id.
fn user_allowed(allowed_users: &[String], user: &User) -> bool {
    let id = user.id.to_string();
    allowed_users.iter().any(|entry| {
        entry == "*" || *entry == id || user.username.as_deref() == Some(entry.as_str())
    })
}
