use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::Newsletter;
use crate::stats::lateness::DEFAULT_TOLERANCE_DAYS;
use crate::stats::publication::DEFAULT_SAMPLE_SIZE;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub mailbox: MailboxConfig,
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub lateness: LatenessConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub handlers: Vec<HandlerConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Defaults to `~/.n2rss/data/n2rss.db`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailboxConfig {
    pub host: String,
    #[serde(default = "default_imap_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub use_tls: bool,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_file: Option<String>,
    #[serde(default)]
    pub password_env_var: Option<String>,
    #[serde(default = "default_inbox_folder")]
    pub inbox_folder: String,
    #[serde(default = "default_processed_folder")]
    pub processed_folder: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl MailboxConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_imap_port() -> u16 {
    993
}

fn default_true() -> bool {
    true
}

fn default_inbox_folder() -> String {
    "INBOX".to_string()
}

fn default_processed_folder() -> String {
    "Processed".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub owner: String,
    pub repository: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub token_file: Option<String>,
    #[serde(default)]
    pub token_env_var: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_ingestion_interval")]
    pub ingestion_interval_secs: u64,
    #[serde(default = "default_lateness_interval")]
    pub lateness_interval_secs: u64,
}

fn default_ingestion_interval() -> u64 {
    300
}

fn default_lateness_interval() -> u64 {
    86_400
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            ingestion_interval_secs: default_ingestion_interval(),
            lateness_interval_secs: default_lateness_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatenessConfig {
    #[serde(default = "default_tolerance_days")]
    pub tolerance_days: i64,
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

fn default_tolerance_days() -> i64 {
    DEFAULT_TOLERANCE_DAYS
}

fn default_sample_size() -> usize {
    DEFAULT_SAMPLE_SIZE
}

impl Default for LatenessConfig {
    fn default() -> Self {
        Self {
            tolerance_days: default_tolerance_days(),
            sample_size: default_sample_size(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

/// A newsletter recognised by sender address and scraped with a regex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerConfig {
    pub newsletter: Newsletter,
    /// Case-insensitive substring of the sender address.
    pub sender_contains: String,
    #[serde(default)]
    pub subject_contains: Option<String>,
    /// Regex with `link` and `title` named groups.
    #[serde(default)]
    pub article_pattern: Option<String>,
    /// Links matching any of these regexes are dropped.
    #[serde(default)]
    pub ignore_links: Vec<String>,
}
