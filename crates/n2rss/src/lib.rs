pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod handler;
pub mod model;
pub mod notifier;
pub mod pipeline;
pub mod scheduler;
pub mod secrets;
pub mod stats;

pub use config::{load_config, Config};
pub use db::{Database, IssueRecordStore, PublicationStore};
pub use email::{Email, ImapMailbox, MailboxClient};
pub use error::{ConfigError, N2rssError, Result};
pub use handler::{Handler, HandlerRegistry};
pub use model::{Article, Newsletter, Publication};
pub use notifier::{GitHubTicketClient, IncidentNotifier, TicketClient};
pub use pipeline::EmailIngestionPipeline;
pub use scheduler::{Job, JobScheduler};
pub use secrets::{resolve_secret, SecretError};
pub use stats::{LatenessDetector, NewsletterStats, PublicationStatistics};
