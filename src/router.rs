//! Session routing — one wizard task per (chat, user), no shared state
//! between sessions.
//!
//! The router guarantees at most one in-flight transition per session by
//! funneling each session's events through its own mpsc queue and task;
//! different sessions run fully concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::{Mutex, mpsc};

use crate::sheets::RowSink;
use crate::telegram::types::{InlineKeyboardButton, InlineKeyboardMarkup, Update};
use crate::telegram::TelegramApi;
use crate::wizard::machine::{CONFIRM_DATA, Prompt, Render, Wizard, WizardEvent};
use crate::wizard::session::SessionKey;

/// One routed event plus the callback context needed for acks and edits.
struct SessionInput {
    event: WizardEvent,
    callback: Option<CallbackRef>,
}

struct CallbackRef {
    query_id: String,
    message_id: Option<i64>,
}

type SessionMap = Arc<Mutex<HashMap<SessionKey, mpsc::UnboundedSender<SessionInput>>>>;

/// Routes transport updates into per-session wizard tasks.
pub struct SessionRouter {
    api: Arc<TelegramApi>,
    sink: Arc<dyn RowSink>,
    allowed_users: Vec<String>,
    sessions: SessionMap,
}

impl SessionRouter {
    pub fn new(api: Arc<TelegramApi>, sink: Arc<dyn RowSink>, allowed_users: Vec<String>) -> Self {
        Self {
            api,
            sink,
            allowed_users,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Consume the update stream forever.
    pub async fn run(&self) {
        let mut updates = self.api.spawn_updates(self.allowed_users.clone());
        while let Some(update) = updates.next().await {
            self.route(update).await;
        }
    }

    async fn route(&self, update: Update) {
        let Some((key, input)) = classify(update) else {
            return;
        };

        let is_start = matches!(input.event, WizardEvent::Start);

        // Fast path: hand the event to the live session.
        let existing = self.sessions.lock().await.get(&key).cloned();
        if let Some(tx) = existing {
            match tx.send(input) {
                Ok(()) => return,
                Err(mpsc::error::SendError(returned)) => {
                    // The task ended between lookup and send; drop the
                    // stale entry and fall through.
                    self.sessions.lock().await.remove(&key);
                    if is_start {
                        self.spawn_session(key, returned).await;
                    }
                    return;
                }
            }
        }

        if is_start {
            self.spawn_session(key, input).await;
        } else {
            tracing::debug!(chat_id = key.chat_id, user_id = key.user_id, "event without a session");
            let _ = self
                .api
                .send_message(key.chat_id, "Use /start para comenzar un reporte.", None)
                .await;
        }
    }

    async fn spawn_session(&self, key: SessionKey, first: SessionInput) {
        let (tx, rx) = mpsc::unbounded_channel();
        if tx.send(first).is_err() {
            return;
        }
        self.sessions.lock().await.insert(key, tx);

        let api = Arc::clone(&self.api);
        let sink = Arc::clone(&self.sink);
        let sessions = Arc::clone(&self.sessions);
        tokio::spawn(async move {
            tracing::info!(chat_id = key.chat_id, user_id = key.user_id, "session started");
            run_session(key, rx, api, sink).await;
            sessions.lock().await.remove(&key);
            tracing::info!(chat_id = key.chat_id, user_id = key.user_id, "session ended");
        });
    }
}

/// Drive one wizard until it reaches its terminal state.
async fn run_session(
    key: SessionKey,
    mut rx: mpsc::UnboundedReceiver<SessionInput>,
    api: Arc<TelegramApi>,
    sink: Arc<dyn RowSink>,
) {
    let mut wizard = Wizard::new();

    while let Some(input) = rx.recv().await {
        if let Some(cb) = &input.callback {
            if let Err(e) = api.answer_callback_query(&cb.query_id).await {
                tracing::warn!("callback ack failed: {e}");
            }
        }
        let edit_target = input.callback.as_ref().and_then(|cb| cb.message_id);

        let step = wizard.handle(input.event);

        for prompt in &step.prompts {
            if let Err(e) = deliver(&api, key.chat_id, prompt, edit_target).await {
                tracing::error!(chat_id = key.chat_id, "prompt delivery failed: {e}");
            }
        }

        if let Some(row) = step.submit {
            let outcome = match sink.append_row(row).await {
                Ok(()) => "📤 Datos enviados con éxito.".to_string(),
                Err(e) => {
                    tracing::error!(chat_id = key.chat_id, "append failed: {e}");
                    format!("❌ Error enviando los datos: {e}")
                }
            };
            if let Err(e) = api.send_message(key.chat_id, &outcome, None).await {
                tracing::error!(chat_id = key.chat_id, "result notification failed: {e}");
            }
        }

        if step.done {
            break;
        }
    }
}

/// Send or edit one prompt. Edits fall back to a fresh message when the
/// originating keyboard message is unknown.
async fn deliver(
    api: &TelegramApi,
    chat_id: i64,
    prompt: &Prompt,
    edit_target: Option<i64>,
) -> Result<(), crate::error::TransportError> {
    let keyboard = prompt.keyboard.as_ref().map(|kb| to_markup(kb));
    match (prompt.render, edit_target) {
        (Render::Edit, Some(message_id)) => {
            api.edit_message_text(chat_id, message_id, &prompt.text, keyboard).await
        }
        _ => api.send_message(chat_id, &prompt.text, keyboard).await.map(|_| ()),
    }
}

fn to_markup(rows: &[Vec<crate::wizard::machine::Button>]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|b| InlineKeyboardButton {
                        text: b.label.clone(),
                        callback_data: b.data.clone(),
                    })
                    .collect()
            })
            .collect(),
    }
}

/// Turn a transport update into a session key and wizard event.
fn classify(update: Update) -> Option<(SessionKey, SessionInput)> {
    if let Some(message) = update.message {
        let from = message.from?;
        let key = SessionKey {
            chat_id: message.chat.id,
            user_id: from.id,
        };
        let text = message.text?;
        let event = match text.trim() {
            "/start" => WizardEvent::Start,
            "/cancel" => WizardEvent::Cancel,
            other => WizardEvent::Text(other.to_string()),
        };
        return Some((key, SessionInput { event, callback: None }));
    }

    if let Some(cb) = update.callback_query {
        let chat_id = cb.message.as_ref().map(|m| m.chat.id)?;
        let key = SessionKey {
            chat_id,
            user_id: cb.from.id,
        };
        let data = cb.data?;
        let event = if data == CONFIRM_DATA {
            WizardEvent::ConfirmSelection
        } else {
            WizardEvent::Select(data)
        };
        let callback = Some(CallbackRef {
            query_id: cb.id,
            message_id: cb.message.map(|m| m.message_id),
        });
        return Some((key, SessionInput { event, callback }));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telegram::types::{CallbackQuery, Chat, Message, User};

    fn text_update(chat_id: i64, user_id: i64, text: &str) -> Update {
        Update {
            update_id: 1,
            message: Some(Message {
                message_id: 10,
                from: Some(User {
                    id: user_id,
                    username: None,
                    first_name: None,
                }),
                chat: Chat { id: chat_id },
                text: Some(text.to_string()),
            }),
            callback_query: None,
        }
    }

    fn callback_update(chat_id: i64, user_id: i64, data: &str) -> Update {
        Update {
            update_id: 2,
            message: None,
            callback_query: Some(CallbackQuery {
                id: "cb-1".to_string(),
                from: User {
                    id: user_id,
                    username: None,
                    first_name: None,
                },
                message: Some(Message {
                    message_id: 77,
                    from: None,
                    chat: Chat { id: chat_id },
                    text: None,
                }),
                data: Some(data.to_string()),
            }),
        }
    }

    #[test]
    fn classifies_commands_and_text() {
        let (key, input) = classify(text_update(5, 9, "/start")).unwrap();
        assert_eq!(key, SessionKey { chat_id: 5, user_id: 9 });
        assert!(matches!(input.event, WizardEvent::Start));

        let (_, input) = classify(text_update(5, 9, "/cancel")).unwrap();
        assert!(matches!(input.event, WizardEvent::Cancel));

        let (_, input) = classify(text_update(5, 9, "  hola  ")).unwrap();
        match input.event {
            WizardEvent::Text(t) => assert_eq!(t, "hola"),
            other => panic!("expected Text, got {other:?}"),
        }
    }

    #[test]
    fn classifies_callbacks() {
        let (key, input) = classify(callback_update(5, 9, "CATASTRO")).unwrap();
        assert_eq!(key, SessionKey { chat_id: 5, user_id: 9 });
        match input.event {
            WizardEvent::Select(data) => assert_eq!(data, "CATASTRO"),
            other => panic!("expected Select, got {other:?}"),
        }
        let cb = input.callback.unwrap();
        assert_eq!(cb.query_id, "cb-1");
        assert_eq!(cb.message_id, Some(77));

        let (_, input) = classify(callback_update(5, 9, "done")).unwrap();
        assert!(matches!(input.event, WizardEvent::ConfirmSelection));
    }

    #[test]
    fn same_chat_different_users_get_distinct_keys() {
        let (a, _) = classify(text_update(5, 9, "hola")).unwrap();
        let (b, _) = classify(text_update(5, 10, "hola")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn updates_without_payload_are_dropped() {
        let update = Update {
            update_id: 3,
            message: None,
            callback_query: None,
        };
        assert!(classify(update).is_none());
    }

    #[test]
    fn keyboard_conversion_preserves_shape() {
        use crate::wizard::machine::Button;
        let rows = vec![
            vec![Button {
                label: "CATASTRO".to_string(),
                data: "CATASTRO".to_string(),
            }],
            vec![Button {
                label: "✅ Confirmar".to_string(),
                data: "done".to_string(),
            }],
        ];
        let markup = to_markup(&rows);
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0][0].callback_data, "CATASTRO");
        assert_eq!(markup.inline_keyboard[1][0].text, "✅ Confirmar");
    }
}
