//! Telegram update handlers.
//!
//! Each handler is a small adapter that maps a Telegram update onto a flow
//! event and lets `teambot-core` decide what happens.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use crate::router::AppState;

pub mod broadcast;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    broadcast::handle_callback(bot, q, state).await
}

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    broadcast::handle_message(bot, msg, state).await
}
