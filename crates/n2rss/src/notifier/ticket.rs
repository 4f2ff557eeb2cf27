use async_trait::async_trait;
use thiserror::Error;

use super::record::IssueId;

#[derive(Error, Debug)]
pub enum TicketError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Issue tracker returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected issue tracker response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, TicketError>;

/// Creation and commenting of tickets in an external tracker.
#[async_trait]
pub trait TicketClient: Send + Sync {
    async fn create_issue(&self, title: &str, body: &str, labels: &[&str]) -> Result<IssueId>;

    async fn add_comment(&self, issue_id: IssueId, text: &str) -> Result<()>;
}
