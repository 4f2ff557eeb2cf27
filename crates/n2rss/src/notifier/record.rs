//! Fingerprints of already-reported incidents.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

/// Handle of a ticket in the external tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IssueId(pub u64);

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    GenericError,
    EmailProcessingError,
    NewsletterRequest,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::GenericError => "generic_error",
            IssueKind::EmailProcessingError => "email_processing_error",
            IssueKind::NewsletterRequest => "newsletter_request",
        }
    }
}

impl FromStr for IssueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generic_error" => Ok(IssueKind::GenericError),
            "email_processing_error" => Ok(IssueKind::EmailProcessingError),
            "newsletter_request" => Ok(IssueKind::NewsletterRequest),
            other => Err(format!("unknown issue kind '{}'", other)),
        }
    }
}

/// Identity fields used to recognise a recurring incident.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    GenericError {
        error_message: String,
    },
    /// The same message from another sender is a distinct incident.
    EmailProcessingError {
        sender: String,
        error_message: String,
    },
    /// Holds an already normalised URL.
    NewsletterRequest {
        newsletter_url: String,
    },
}

impl Fingerprint {
    pub fn kind(&self) -> IssueKind {
        match self {
            Fingerprint::GenericError { .. } => IssueKind::GenericError,
            Fingerprint::EmailProcessingError { .. } => IssueKind::EmailProcessingError,
            Fingerprint::NewsletterRequest { .. } => IssueKind::NewsletterRequest,
        }
    }

    /// Primary and secondary lookup keys, as stored.
    pub fn keys(&self) -> (&str, &str) {
        match self {
            Fingerprint::GenericError { error_message } => (error_message, ""),
            Fingerprint::EmailProcessingError {
                sender,
                error_message,
            } => (sender, error_message),
            Fingerprint::NewsletterRequest { newsletter_url } => (newsletter_url, ""),
        }
    }

    /// Rebuilds a fingerprint from its stored representation.
    pub fn from_keys(kind: IssueKind, key: String, secondary_key: String) -> Self {
        match kind {
            IssueKind::GenericError => Fingerprint::GenericError { error_message: key },
            IssueKind::EmailProcessingError => Fingerprint::EmailProcessingError {
                sender: key,
                error_message: secondary_key,
            },
            IssueKind::NewsletterRequest => Fingerprint::NewsletterRequest {
                newsletter_url: key,
            },
        }
    }
}

/// A reported incident. Never closed from this side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRecord {
    pub issue_id: IssueId,
    pub fingerprint: Fingerprint,
    pub created_at: DateTime<Utc>,
}

impl IssueRecord {
    pub fn new(issue_id: IssueId, fingerprint: Fingerprint) -> Self {
        Self {
            issue_id,
            fingerprint,
            created_at: Utc::now(),
        }
    }
}
