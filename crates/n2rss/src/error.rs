use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum N2rssError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Mailbox error: {0}")]
    Mailbox(#[from] crate::email::MailboxError),

    #[error("Issue tracker error: {0}")]
    Ticket(#[from] crate::notifier::TicketError),

    #[error("Secret error: {0}")]
    Secret(#[from] crate::secrets::SecretError),

    #[error("Statistics error: {0}")]
    Stats(#[from] crate::stats::StatsError),

    /// Process plumbing failed: signal handler or async runtime.
    #[error("Runtime error: {0}")]
    Runtime(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid pattern for '{name}': {reason}")]
    InvalidPattern { name: String, reason: String },

    #[error("Invalid handler '{code}': {reason}")]
    InvalidHandler { code: String, reason: String },
}

pub type Result<T> = std::result::Result<T, N2rssError>;
