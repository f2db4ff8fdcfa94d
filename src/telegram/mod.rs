//! Telegram Bot API transport.

pub mod api;
pub mod types;

pub use api::TelegramApi;
pub use types::{
    CallbackQuery, Chat, InlineKeyboardButton, InlineKeyboardMarkup, Message, Update, User,
};
