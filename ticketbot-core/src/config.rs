// File: ticketbot-core/src/config.rs

use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use tracing::warn;
use crate::Error;

/// Settings that are read once at startup.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub telegram_token: String,
    pub database_url: String,
    /// Where rendered tickets are kept (`ticket_<user>_<event>.png`).
    pub tickets_dir: PathBuf,
    /// Where uploaded code templates are kept.
    pub templates_dir: PathBuf,
    /// Rules document sent before payment, if any.
    pub rules_document: Option<PathBuf>,
}

impl BotSettings {
    pub fn from_env() -> Result<Self, Error> {
        let telegram_token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| Error::Config("TELEGRAM_BOT_TOKEN must be set".into()))?;

        Ok(Self {
            telegram_token,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/ticketbot".to_string()),
            tickets_dir: env::var("TICKETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("qr_code")),
            templates_dir: env::var("TEMPLATES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("qr_templates")),
            rules_document: env::var("RULES_DOCUMENT_PATH").ok().map(PathBuf::from),
        })
    }

    /// Settings rooted in a scratch directory, without a rules document.
    pub fn for_directory(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            telegram_token: String::new(),
            database_url: String::new(),
            tickets_dir: root.join("qr_code"),
            templates_dir: root.join("qr_templates"),
            rules_document: None,
        }
    }
}

/// Settings resolved at call time, once per operation.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigProvider: Send + Sync {
    /// Identities allowed to approve payments, redeem tickets and manage events.
    fn admin_ids(&self) -> HashSet<i64>;

    /// The bot's public username, used to build ticket deep links.
    fn bot_username(&self) -> String;

    /// Who buyers should contact when something needs a human.
    fn manager_contact(&self) -> String;

    /// Announcement channel shown when nothing is on sale.
    fn news_channel_url(&self) -> String;

    fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids().contains(&user_id)
    }
}

/// Reads the environment on every call so edits to the admin list take
/// effect without a restart.
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider;

impl EnvConfigProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn admin_ids(&self) -> HashSet<i64> {
        let raw = env::var("ADMIN_IDS").unwrap_or_default();
        parse_admin_ids(&raw)
    }

    fn bot_username(&self) -> String {
        env::var("BOT_USERNAME").unwrap_or_default()
    }

    fn manager_contact(&self) -> String {
        env::var("MANAGER_CONTACT").unwrap_or_else(|_| "@manager".to_string())
    }

    fn news_channel_url(&self) -> String {
        env::var("NEWS_CHANNEL_URL").unwrap_or_default()
    }
}

/// Parses a comma separated id list, skipping (and logging) junk entries.
pub fn parse_admin_ids(raw: &str) -> HashSet<i64> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<i64>() {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("ADMIN_IDS: ignoring invalid entry '{}': {}", s, e);
                None
            }
        })
        .collect()
}
