//! Incident reporting against an external issue tracker.

pub mod github;
pub mod incident;
pub mod record;
pub mod ticket;
pub mod url;

pub use github::GitHubTicketClient;
pub use incident::IncidentNotifier;
pub use record::{Fingerprint, IssueId, IssueKind, IssueRecord};
pub use ticket::{TicketClient, TicketError};
pub use url::normalize_newsletter_url;
