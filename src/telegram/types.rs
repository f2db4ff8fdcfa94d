//! Wire types for the Bot API — only the fields the bot reads.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// A button press on an inline keyboard.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    /// The message the keyboard was attached to; needed for in-place edits.
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

/// Generic Bot API envelope.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_message_update() {
        let raw = serde_json::json!({
            "update_id": 42,
            "message": {
                "message_id": 7,
                "from": {"id": 123, "username": "alice", "first_name": "Alice"},
                "chat": {"id": -100},
                "text": "hola"
            }
        });
        let update: Update = serde_json::from_value(raw).unwrap();
        assert_eq!(update.update_id, 42);
        let msg = update.message.unwrap();
        assert_eq!(msg.chat.id, -100);
        assert_eq!(msg.text.as_deref(), Some("hola"));
        assert_eq!(msg.from.unwrap().id, 123);
    }

    #[test]
    fn parses_callback_query_update() {
        let raw = serde_json::json!({
            "update_id": 43,
            "callback_query": {
                "id": "cb-1",
                "from": {"id": 123},
                "message": {"message_id": 9, "chat": {"id": 55}},
                "data": "CATASTRO"
            }
        });
        let update: Update = serde_json::from_value(raw).unwrap();
        let cb = update.callback_query.unwrap();
        assert_eq!(cb.id, "cb-1");
        assert_eq!(cb.data.as_deref(), Some("CATASTRO"));
        assert_eq!(cb.message.unwrap().message_id, 9);
    }

    #[test]
    fn ignores_unknown_update_kinds() {
        let raw = serde_json::json!({"update_id": 44, "edited_message": {"whatever": true}});
        let update: Update = serde_json::from_value(raw).unwrap();
        assert!(update.message.is_none());
        assert!(update.callback_query.is_none());
    }

    #[test]
    fn keyboard_serializes_to_bot_api_shape() {
        let markup = InlineKeyboardMarkup {
            inline_keyboard: vec![vec![InlineKeyboardButton {
                text: "✅ Confirmar".into(),
                callback_data: "done".into(),
            }]],
        };
        let json = serde_json::to_value(&markup).unwrap();
        assert_eq!(json["inline_keyboard"][0][0]["text"], "✅ Confirmar");
        assert_eq!(json["inline_keyboard"][0][0]["callback_data"], "done");
    }
}
