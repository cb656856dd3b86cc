//! Telegram `SinkClient` implementation, built on `teloxide`.

use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{ChatId, ParseMode},
};

use crate::deliver::SinkClient;

pub struct TelegramSinkClient {
    bot: Bot,
}

impl TelegramSinkClient {
    /// `http` should carry the send timeout configured at startup (spec §5:
    /// "Outbound calls ... use a finite timeout") — `teloxide`'s default
    /// client has none, so the caller must build and pass one in, the same
    /// way `VkSourceClient::new` takes a pre-configured `reqwest::Client`.
    pub fn new(bot_token: String, http: reqwest::Client) -> Self {
        Self {
            bot: Bot::with_client(bot_token, http),
        }
    }
}

#[async_trait]
impl SinkClient for TelegramSinkClient {
    async fn send_message(&self, chat_id: i64, html: &str) -> anyhow::Result<()> {
        self.bot
            .send_message(ChatId(chat_id), html)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }
}
