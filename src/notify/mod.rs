// src/notify/mod.rs

//! Update announcements
//!
//! Each classified update is rendered once and delivered to two channels.
//! Deliveries are independent single attempts: a failure on one channel is
//! logged and recorded, and never keeps the other channel (or the next
//! update) from being served.

mod channels;
mod message;

pub use channels::{
    DEFAULT_DISCORD_API, DEFAULT_TELEGRAM_API, DiscordChannel, LogChannel, TelegramChannel,
};
pub use message::{CHANNEL_TAG, Message, SEPARATOR, derive_secondary, headline, render_primary};

use crate::model::ClassifiedUpdate;
use thiserror::Error;
use tracing::{info, warn};

/// Why a message was not delivered
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// Connection failure or timeout
    #[error("request failed: {0}")]
    Transport(String),

    /// The channel answered with a non-success status
    #[error("HTTP {status}: {detail}")]
    Rejected { status: u16, detail: String },
}

/// A message destination
pub trait Channel {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Post a message. One attempt, no retry.
    fn send(&self, text: &str) -> Result<(), DeliveryError>;
}

/// Result of one delivery
#[derive(Debug)]
pub struct DeliveryOutcome {
    pub channel: String,
    pub error: Option<DeliveryError>,
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Results of announcing one update
#[derive(Debug)]
pub struct NotifyReport {
    pub codename: String,
    pub primary: DeliveryOutcome,
    pub secondary: DeliveryOutcome,
}

impl NotifyReport {
    pub fn delivered(&self) -> usize {
        [&self.primary, &self.secondary]
            .iter()
            .filter(|outcome| outcome.is_success())
            .count()
    }

    pub fn failed(&self) -> usize {
        2 - self.delivered()
    }
}

/// Sends the primary rendering to one channel and the derived rendering
/// to the other
pub struct Notifier {
    primary: Box<dyn Channel>,
    secondary: Box<dyn Channel>,
}

impl Notifier {
    pub fn new(primary: Box<dyn Channel>, secondary: Box<dyn Channel>) -> Self {
        Self { primary, secondary }
    }

    /// Notifier that only logs messages
    pub fn dry_run() -> Self {
        Self::new(
            Box::new(LogChannel::new("telegram (dry run)")),
            Box::new(LogChannel::new("discord (dry run)")),
        )
    }

    /// Announce one update on both channels
    pub fn notify(&self, update: &ClassifiedUpdate) -> NotifyReport {
        let codename = update.canonical_codename().to_string();
        let message = Message::render(update);

        let primary = deliver(self.primary.as_ref(), &codename, &message.primary);
        let secondary = deliver(self.secondary.as_ref(), &codename, &message.secondary);

        NotifyReport {
            codename,
            primary,
            secondary,
        }
    }
}

fn deliver(channel: &dyn Channel, codename: &str, text: &str) -> DeliveryOutcome {
    let error = match channel.send(text) {
        Ok(()) => {
            info!("{}: {} message sent", codename, channel.name());
            None
        }
        Err(e) => {
            warn!("{}: {} delivery failed: {}", codename, channel.name(), e);
            Some(e)
        }
    };

    DeliveryOutcome {
        channel: channel.name().to_string(),
        error,
    }
}
