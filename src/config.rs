// src/config.rs
//! Configuration file parsing for the tracker
//!
//! Supports TOML configuration files with the following sections, all
//! optional:
//! - [storage] - State directory and tracked categories
//! - [http] - Outbound request timeout
//! - [archive] - History archive location
//! - [telegram] / [discord] - Notification channels
//! - [publish] - Git publication of snapshots
//! - [fetch] - External fetch command
//!
//! Secrets are never stored in the file; each section names the
//! environment variable that holds its token.

use crate::fetch::{CommandFetcher, FetchSource, NoopFetcher};
use crate::http::{HTTP_TIMEOUT, build_client};
use crate::model::Category;
use crate::notify::{
    DEFAULT_DISCORD_API, DEFAULT_TELEGRAM_API, DiscordChannel, Notifier, TelegramChannel,
};
use crate::publish::{GitPublisher, NoopPublisher, Publisher, github_remote};
use crate::rollback::{
    CODENAME_PLACEHOLDER, DEFAULT_ARCHIVE_URL_TEMPLATE, HttpArchive, RollbackResolver,
};
use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name
pub const DEFAULT_CONFIG_PATH: &str = "tracker.toml";

/// Looks up a secret by environment variable name
pub type SecretLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Secret lookup backed by the process environment
pub fn env_secret(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub http: HttpSection,

    #[serde(default)]
    pub archive: ArchiveSection,

    #[serde(default)]
    pub telegram: TelegramSection,

    #[serde(default)]
    pub discord: DiscordSection,

    #[serde(default)]
    pub publish: PublishSection,

    #[serde(default)]
    pub fetch: FetchSection,
}

/// State directory settings
#[derive(Debug, Deserialize)]
pub struct StorageSection {
    /// Directory holding one subdirectory per category
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Categories processed each run, in order
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            root: default_root(),
            categories: default_categories(),
        }
    }
}

/// Outbound HTTP settings
#[derive(Debug, Deserialize)]
pub struct HttpSection {
    /// Per-request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout(),
        }
    }
}

/// History archive settings
#[derive(Debug, Deserialize)]
pub struct ArchiveSection {
    /// URL of a device's history document; `{codename}` is substituted
    #[serde(default = "default_archive_url")]
    pub url_template: String,
}

impl Default for ArchiveSection {
    fn default() -> Self {
        Self {
            url_template: default_archive_url(),
        }
    }
}

/// Telegram channel settings
#[derive(Debug, Deserialize)]
pub struct TelegramSection {
    #[serde(default = "default_telegram_api")]
    pub api_url: String,

    /// Chat the bot posts to
    #[serde(default = "default_telegram_chat")]
    pub chat: String,

    /// Environment variable holding the bot token
    #[serde(default = "default_telegram_token_env")]
    pub token_env: String,
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self {
            api_url: default_telegram_api(),
            chat: default_telegram_chat(),
            token_env: default_telegram_token_env(),
        }
    }
}

/// Discord channel settings
#[derive(Debug, Deserialize)]
pub struct DiscordSection {
    #[serde(default = "default_discord_api")]
    pub api_url: String,

    #[serde(default = "default_discord_channel")]
    pub channel_id: String,

    /// Environment variable holding the bot token
    #[serde(default = "default_discord_token_env")]
    pub token_env: String,
}

impl Default for DiscordSection {
    fn default() -> Self {
        Self {
            api_url: default_discord_api(),
            channel_id: default_discord_channel(),
            token_env: default_discord_token_env(),
        }
    }
}

/// Snapshot publication settings
#[derive(Debug, Deserialize)]
pub struct PublishSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Git work tree; defaults to the storage root
    #[serde(default)]
    pub repo_dir: Option<PathBuf>,

    /// GitHub `owner/name` pushed to when no explicit remote is set
    #[serde(default = "default_repository")]
    pub repository: String,

    /// Explicit remote (name or URL); overrides `repository`
    #[serde(default)]
    pub remote: Option<String>,

    #[serde(default = "default_branch")]
    pub branch: String,

    /// Environment variable holding the push token
    #[serde(default = "default_publish_token_env")]
    pub token_env: String,

    #[serde(default = "default_author_name")]
    pub author_name: String,

    #[serde(default = "default_author_email")]
    pub author_email: String,

    /// Timeout for each git invocation in seconds
    #[serde(default = "default_publish_timeout")]
    pub timeout_secs: u64,
}

impl Default for PublishSection {
    fn default() -> Self {
        Self {
            enabled: true,
            repo_dir: None,
            repository: default_repository(),
            remote: None,
            branch: default_branch(),
            token_env: default_publish_token_env(),
            author_name: default_author_name(),
            author_email: default_author_email(),
            timeout_secs: default_publish_timeout(),
        }
    }
}

/// External fetch command settings
#[derive(Debug, Deserialize)]
pub struct FetchSection {
    /// Program and arguments; `{category}` and `{dir}` are substituted.
    /// Empty when another process fills the category directories.
    #[serde(default)]
    pub command: Vec<String>,

    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            timeout_secs: default_fetch_timeout(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_categories() -> Vec<Category> {
    Category::all().to_vec()
}

fn default_http_timeout() -> u64 {
    HTTP_TIMEOUT.as_secs()
}

fn default_archive_url() -> String {
    DEFAULT_ARCHIVE_URL_TEMPLATE.to_string()
}

fn default_telegram_api() -> String {
    DEFAULT_TELEGRAM_API.to_string()
}

fn default_telegram_chat() -> String {
    "@MIUIUpdatesTracker".to_string()
}

fn default_telegram_token_env() -> String {
    "bottoken".to_string()
}

fn default_discord_api() -> String {
    DEFAULT_DISCORD_API.to_string()
}

fn default_discord_channel() -> String {
    "484478392562089995".to_string()
}

fn default_discord_token_env() -> String {
    "DISCORD_BOT_TOKEN".to_string()
}

fn default_true() -> bool {
    true
}

fn default_repository() -> String {
    "XiaomiFirmwareUpdater/miui-updates-tracker".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_publish_token_env() -> String {
    "XFU".to_string()
}

fn default_author_name() -> String {
    "XiaomiFirmwareUpdater".to_string()
}

fn default_author_email() -> String {
    "xiaomifirmwareupdater@gmail.com".to_string()
}

fn default_publish_timeout() -> u64 {
    120
}

fn default_fetch_timeout() -> u64 {
    1800
}

impl TrackerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: TrackerConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else `tracker.toml` if present, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load(Path::new(DEFAULT_CONFIG_PATH))
            }
            None => Ok(Self::default()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.categories.is_empty() {
            bail!("storage.categories must name at least one category");
        }
        let mut seen = HashSet::new();
        for category in &self.storage.categories {
            if !seen.insert(category) {
                bail!("storage.categories lists {} twice", category);
            }
        }

        if !(1..=300).contains(&self.http.timeout_secs) {
            bail!(
                "http.timeout_secs must be between 1 and 300, got {}",
                self.http.timeout_secs
            );
        }

        if !self.archive.url_template.contains(CODENAME_PLACEHOLDER) {
            bail!(
                "archive.url_template must contain {}: {}",
                CODENAME_PLACEHOLDER,
                self.archive.url_template
            );
        }
        let sample = self.archive.url_template.replace(CODENAME_PLACEHOLDER, "cactus");
        url::Url::parse(&sample).with_context(|| {
            format!("Invalid archive.url_template: {}", self.archive.url_template)
        })?;

        url::Url::parse(&self.telegram.api_url)
            .with_context(|| format!("Invalid telegram.api_url: {}", self.telegram.api_url))?;
        url::Url::parse(&self.discord.api_url)
            .with_context(|| format!("Invalid discord.api_url: {}", self.discord.api_url))?;

        if self.publish.timeout_secs == 0 || self.fetch.timeout_secs == 0 {
            bail!("publish.timeout_secs and fetch.timeout_secs must be positive");
        }

        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    /// HTTP client shared by the archive and both channels
    pub fn http_client(&self) -> Result<Client> {
        Ok(build_client(self.http_timeout())?)
    }

    /// Rollback resolver backed by the HTTP archive
    pub fn rollback_resolver(&self, client: Client) -> RollbackResolver {
        RollbackResolver::new(Box::new(HttpArchive::new(
            client,
            self.archive.url_template.clone(),
        )))
    }

    /// Notifier posting to Telegram (primary) and Discord (secondary)
    pub fn notifier(&self, client: Client, secrets: SecretLookup<'_>) -> Result<Notifier> {
        let telegram_token = require_secret(secrets, &self.telegram.token_env, "telegram")?;
        let discord_token = require_secret(secrets, &self.discord.token_env, "discord")?;

        let telegram = TelegramChannel::new(
            client.clone(),
            self.telegram.api_url.clone(),
            telegram_token,
            self.telegram.chat.clone(),
        );
        let discord = DiscordChannel::new(
            client,
            self.discord.api_url.clone(),
            discord_token,
            self.discord.channel_id.clone(),
        );
        Ok(Notifier::new(Box::new(telegram), Box::new(discord)))
    }

    /// Publisher for the current snapshots
    pub fn publisher(&self, secrets: SecretLookup<'_>) -> Result<Box<dyn Publisher>> {
        if !self.publish.enabled {
            return Ok(Box::new(NoopPublisher));
        }

        let repo_dir = self
            .publish
            .repo_dir
            .clone()
            .unwrap_or_else(|| self.storage.root.clone());

        let publisher = match &self.publish.remote {
            Some(remote) => {
                GitPublisher::new(repo_dir, remote.clone(), self.publish.branch.clone())
            }
            None => {
                let token = require_secret(secrets, &self.publish.token_env, "publish")?;
                let remote = github_remote(&self.publish.repository, &token);
                GitPublisher::new(repo_dir, remote, self.publish.branch.clone()).with_secret(token)
            }
        };

        Ok(Box::new(
            publisher
                .with_author(self.publish.author_name.clone(), self.publish.author_email.clone())
                .with_timeout(Duration::from_secs(self.publish.timeout_secs)),
        ))
    }

    /// Fetch source for the category directories
    pub fn fetcher(&self) -> Box<dyn FetchSource> {
        let timeout = Duration::from_secs(self.fetch.timeout_secs);
        match CommandFetcher::from_argv(&self.fetch.command, timeout) {
            Some(fetcher) => Box::new(fetcher),
            None => Box::new(NoopFetcher),
        }
    }
}

fn require_secret(secrets: SecretLookup<'_>, env_name: &str, section: &str) -> Result<String> {
    match secrets(env_name) {
        Some(secret) => Ok(secret),
        None => Err(crate::Error::InitError(format!(
            "{section}: environment variable {env_name} is not set"
        ))
        .into()),
    }
}
