//! Telegram adapter (teloxide).
//!
//! This crate implements the `teambot-core` MessagingPort and PromptSink
//! over the Telegram Bot API and routes incoming updates into the broadcast
//! flow.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
};

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use teambot_core::{
    domain::ChatId,
    errors::Error,
    messaging::{
        port::{FormattingMode, MessagingPort, SendError},
        prompt::{Prompt, PromptSink},
    },
    Result,
};

use crate::handlers::broadcast::action_callback_data;

#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::Transport(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

#[async_trait]
impl MessagingPort for TelegramGateway {
    async fn send_text(
        &self,
        to: ChatId,
        text: &str,
        mode: FormattingMode,
    ) -> std::result::Result<(), SendError> {
        let mut req = self.bot.send_message(Self::tg_chat(to), text.to_string());
        if mode == FormattingMode::Markdown {
            req = req.parse_mode(ParseMode::Markdown);
        }
        req.await.map_err(|e| SendError(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl PromptSink for TelegramGateway {
    async fn prompt(&self, chat: ChatId, prompt: Prompt) -> Result<()> {
        let rows: Vec<Vec<InlineKeyboardButton>> = prompt
            .actions
            .iter()
            .map(|a| {
                vec![InlineKeyboardButton::callback(
                    a.label().to_string(),
                    action_callback_data(*a).to_string(),
                )]
            })
            .collect();

        self.with_retry(|| {
            let mut req = self
                .bot
                .send_message(Self::tg_chat(chat), prompt.text.clone())
                .parse_mode(ParseMode::Markdown);
            if !rows.is_empty() {
                req = req.reply_markup(InlineKeyboardMarkup::new(rows.clone()));
            }
            req
        })
        .await?;
        Ok(())
    }

    async fn alert(&self, chat: ChatId, text: &str) -> Result<()> {
        self.with_retry(|| self.bot.send_message(Self::tg_chat(chat), text.to_string()))
            .await?;
        Ok(())
    }
}
