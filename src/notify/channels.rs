// src/notify/channels.rs

//! Channel implementations: Telegram, Discord, and a log-only channel

use super::{Channel, DeliveryError};
use reqwest::blocking::{Client, Response};
use tracing::{debug, info};

/// Telegram Bot API base URL
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

/// Discord REST API base URL
pub const DEFAULT_DISCORD_API: &str = "https://discordapp.com/api";

/// Strip the URL from a transport error; request URLs may carry a bot token.
fn transport_error(e: reqwest::Error) -> DeliveryError {
    DeliveryError::Transport(e.without_url().to_string())
}

fn rejected(response: Response, detail: impl Into<String>) -> DeliveryError {
    let status = response.status().as_u16();
    let body = response.text().unwrap_or_default();
    debug!("Rejected with HTTP {}: {}", status, body);
    DeliveryError::Rejected {
        status,
        detail: detail.into(),
    }
}

/// Posts Markdown messages to a Telegram chat through a bot
pub struct TelegramChannel {
    client: Client,
    api_url: String,
    token: String,
    chat: String,
}

impl TelegramChannel {
    pub fn new(
        client: Client,
        api_url: impl Into<String>,
        token: impl Into<String>,
        chat: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            token: token.into(),
            chat: chat.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url.trim_end_matches('/'), self.token)
    }
}

impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn send(&self, text: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(self.endpoint())
            .query(&[
                ("chat_id", self.chat.as_str()),
                ("text", text),
                ("parse_mode", "Markdown"),
                ("disable_web_page_preview", "yes"),
            ])
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        match status.as_u16() {
            400 => Err(rejected(response, "bad recipient / wrong text format")),
            401 => Err(rejected(response, "wrong / unauthorized token")),
            _ => {
                let reason = status.canonical_reason().unwrap_or("unknown status");
                Err(rejected(response, format!("unknown error: {reason}")))
            }
        }
    }
}

/// Posts messages to a Discord channel through a bot
pub struct DiscordChannel {
    client: Client,
    api_url: String,
    token: String,
    channel_id: String,
}

impl DiscordChannel {
    pub fn new(
        client: Client,
        api_url: impl Into<String>,
        token: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            token: token.into(),
            channel_id: channel_id.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/channels/{}/messages",
            self.api_url.trim_end_matches('/'),
            self.channel_id
        )
    }
}

impl Channel for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    fn send(&self, text: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bot {}", self.token))
            .json(&serde_json::json!({ "content": text }))
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let reason = status.canonical_reason().unwrap_or("unknown status");
            Err(rejected(response, format!("discord error: {reason}")))
        }
    }
}

/// Writes messages to the log instead of posting them
pub struct LogChannel {
    name: String,
}

impl LogChannel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Channel for LogChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, text: &str) -> Result<(), DeliveryError> {
        info!("[{}]\n{}", self.name, text);
        Ok(())
    }
}
