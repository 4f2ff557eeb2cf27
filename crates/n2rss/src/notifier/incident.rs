//! Deduplicated incident reporting.
//!
//! Every notification is looked up by its [`Fingerprint`] first. A known
//! incident gets a comment on its existing ticket; a new one gets a ticket
//! and an [`IssueRecord`]. Failures are logged and never returned.

use std::error::Error;
use std::fmt::Write as _;
use std::sync::Arc;

use chrono::Utc;
use log::{error, info, warn};

use crate::db::IssueRecordStore;
use crate::email::Email;

use super::record::{Fingerprint, IssueRecord};
use super::ticket::TicketClient;
use super::url::normalize_newsletter_url;

const BOT_LABEL: &str = "n2rss-bot";
const DEFAULT_CONTEXT: &str = "UNSPECIFIED";

pub struct IncidentNotifier {
    tickets: Arc<dyn TicketClient>,
    records: Arc<dyn IssueRecordStore>,
}

struct Ticket<'a> {
    title: String,
    body: String,
    labels: &'a [&'a str],
}

impl IncidentNotifier {
    pub fn new(tickets: Arc<dyn TicketClient>, records: Arc<dyn IssueRecordStore>) -> Self {
        Self { tickets, records }
    }

    pub async fn notify_generic_error(
        &self,
        err: &(dyn Error + Send + Sync),
        context: Option<&str>,
    ) {
        let message = err.to_string();
        let ticket = Ticket {
            title: format!("An error occurred: `{}`", message),
            body: format!(
                "Context: {}\n\n{}",
                context.unwrap_or(DEFAULT_CONTEXT),
                error_trace(err)
            ),
            labels: &[BOT_LABEL, "email-client-error", "bug"],
        };
        let fingerprint = Fingerprint::GenericError {
            error_message: message,
        };
        self.report(fingerprint, ticket, occurrence_comment()).await;
    }

    pub async fn notify_email_processing_error(
        &self,
        email: &Email,
        err: &(dyn Error + Send + Sync),
        handler: Option<&str>,
    ) {
        let sender = email.sender_display();
        let mut body = format!(
            "Processing of email \"{}\" sent by \"{}\" failed with the following error:\n\n{}",
            email.subject,
            sender,
            error_trace(err)
        );
        if let Some(handler) = handler {
            let _ = write!(body, "\n\nHandler: {}", handler);
        }

        let ticket = Ticket {
            title: format!("Email processing error on \"{}\"", email.subject),
            body,
            labels: &[BOT_LABEL, "email-processing-error", "bug"],
        };
        let fingerprint = Fingerprint::EmailProcessingError {
            sender,
            error_message: err.to_string(),
        };
        self.report(fingerprint, ticket, occurrence_comment()).await;
    }

    pub async fn notify_newsletter_request(&self, newsletter_url: &str) {
        let url = normalize_newsletter_url(newsletter_url);
        let today = Utc::now().date_naive();
        let ticket = Ticket {
            title: format!("Add support for newsletter \"{}\"", url),
            body: format!("Initial request to support \"{}\" received on {}", url, today),
            labels: &[BOT_LABEL, "newsletter-request"],
        };
        let fingerprint = Fingerprint::NewsletterRequest {
            newsletter_url: url,
        };
        self.report(fingerprint, ticket, format!("New request received on {}", today))
            .await;
    }

    /// Opens a fresh digest ticket listing every late newsletter.
    pub async fn notify_missing_publications(&self, codes: &[String]) {
        if codes.is_empty() {
            return;
        }

        let mut body = String::from("The following newsletters have not published as expected:\n");
        for code in codes {
            let _ = write!(body, "\n- {}", code);
        }

        match self
            .tickets
            .create_issue(
                "Missing publications detected",
                &body,
                &[BOT_LABEL, "missing-publications"],
            )
            .await
        {
            Ok(issue_id) => info!(
                "Reported {} late newsletter(s) in issue {}",
                codes.len(),
                issue_id
            ),
            Err(e) => error!("Failed to report missing publications: {}", e),
        }
    }

    async fn report(&self, fingerprint: Fingerprint, ticket: Ticket<'_>, comment: String) {
        let kind = fingerprint.kind().as_str();

        let existing = match self.records.find(&fingerprint) {
            Ok(existing) => existing,
            Err(e) => {
                error!("Failed to look up {} incident: {}", kind, e);
                return;
            }
        };

        if let Some(record) = existing {
            if let Err(e) = self.tickets.add_comment(record.issue_id, &comment).await {
                error!("Failed to comment on issue {}: {}", record.issue_id, e);
            }
            return;
        }

        let issue_id = match self
            .tickets
            .create_issue(&ticket.title, &ticket.body, ticket.labels)
            .await
        {
            Ok(issue_id) => issue_id,
            Err(e) => {
                error!("Failed to create {} issue: {}", kind, e);
                return;
            }
        };

        match self.records.save(&IssueRecord::new(issue_id, fingerprint)) {
            Ok(true) => info!("Recorded {} incident as issue {}", kind, issue_id),
            Ok(false) => warn!(
                "Issue {} duplicates a {} incident recorded concurrently",
                issue_id, kind
            ),
            Err(e) => error!("Failed to record issue {}: {}", issue_id, e),
        }
    }
}

fn occurrence_comment() -> String {
    format!("New occurrence received on {}", Utc::now().date_naive())
}

/// The error message and its source chain, fenced.
fn error_trace(err: &dyn Error) -> String {
    let mut trace = format!("```\n{}", err);
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(trace, "\nCaused by: {}", cause);
        source = cause.source();
    }
    trace.push_str("\n```");
    trace
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DatabaseError;

    #[test]
    fn test_error_trace_includes_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = DatabaseError::Io {
            path: "/var/n2rss".into(),
            source: io,
        };

        let trace = error_trace(&err);
        assert!(trace.starts_with("```\n"));
        assert!(trace.contains("Caused by: denied"));
        assert!(trace.ends_with("\n```"));
    }
}
