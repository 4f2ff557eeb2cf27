use std::sync::Arc;

use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::db::PublicationStore;
use crate::email::{Email, MailboxClient};
use crate::handler::{self, Handler, HandlerError, HandlerRegistry, Resolution};
use crate::model::Publication;
use crate::notifier::IncidentNotifier;

/// What happened to one email during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EmailOutcome {
    Processed,
    Unrecognized,
    Ambiguous,
    /// Left unread for the next run.
    Failed,
    /// Persisted, but mailbox state could not be fully advanced.
    Persisted,
}

#[derive(Debug, Default)]
struct RunSummary {
    processed: usize,
    ignored: usize,
    failed: usize,
    partial: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: EmailOutcome) {
        match outcome {
            EmailOutcome::Processed => self.processed += 1,
            EmailOutcome::Unrecognized | EmailOutcome::Ambiguous => self.ignored += 1,
            EmailOutcome::Failed => self.failed += 1,
            EmailOutcome::Persisted => self.partial += 1,
        }
    }
}

/// Turns unread newsletter emails into stored publications.
///
/// An email is only marked read and moved once its publications are
/// stored. Failures are isolated per email and reported through the
/// [`IncidentNotifier`]; a failed email stays unread and is retried by the
/// next run.
pub struct EmailIngestionPipeline {
    mailbox: Arc<dyn MailboxClient>,
    registry: Arc<HandlerRegistry>,
    publications: Arc<dyn PublicationStore>,
    notifier: Arc<IncidentNotifier>,
}

impl EmailIngestionPipeline {
    pub fn new(
        mailbox: Arc<dyn MailboxClient>,
        registry: Arc<HandlerRegistry>,
        publications: Arc<dyn PublicationStore>,
        notifier: Arc<IncidentNotifier>,
    ) -> Self {
        Self {
            mailbox,
            registry,
            publications,
            notifier,
        }
    }

    pub async fn run(&self) {
        async {
            let listing = match self.mailbox.list_unread().await {
                Ok(listing) => listing,
                Err(e) => {
                    error!("Failed to list unread emails: {}", e);
                    self.notifier
                        .notify_generic_error(&e, Some("Checking emails"))
                        .await;
                    return;
                }
            };

            let mut summary = RunSummary::default();
            for message in &listing.unreadable {
                let context = format!("Fetching email {}", message.location());
                warn!("{}: {}", context, message.error);
                self.notifier
                    .notify_generic_error(&message.error, Some(&context))
                    .await;
                summary.failed += 1;
            }

            let emails = &listing.emails;
            for email in emails {
                let span = info_span!(
                    "email",
                    id = %email.mailbox_id,
                    sender = %email.sender.address,
                );
                let outcome = self.process_email(email).instrument(span).await;
                summary.record(outcome);
            }

            info!(
                total = emails.len() + listing.unreadable.len(),
                processed = summary.processed,
                ignored = summary.ignored,
                failed = summary.failed,
                partial = summary.partial,
                "Ingestion run finished"
            );
        }
        .instrument(info_span!("ingestion_run"))
        .await
    }

    async fn process_email(&self, email: &Email) -> EmailOutcome {
        let handler = match self.registry.resolve(email) {
            Resolution::Found(handler) => handler,
            Resolution::NoMatch => {
                debug!("No handler for email \"{}\"", email.subject);
                return EmailOutcome::Unrecognized;
            }
            Resolution::Ambiguous(names) => {
                error!(
                    handlers = ?names,
                    "Several handlers claim email \"{}\", ignoring it", email.subject
                );
                return EmailOutcome::Ambiguous;
            }
        };

        let Some(publications) = self.step_extract(handler, email).await else {
            return EmailOutcome::Failed;
        };

        if let Err(e) = self.publications.save(&publications) {
            error!("Failed to save publications: {}", e);
            self.notifier
                .notify_generic_error(&e, Some("Saving publications"))
                .await;
            return EmailOutcome::Failed;
        }
        info!(
            count = publications.len(),
            handler = handler.name(),
            "Stored publications"
        );

        self.step_advance(email).await
    }

    /// Runs the handler and keeps the publications worth storing.
    async fn step_extract(&self, handler: &Handler, email: &Email) -> Option<Vec<Publication>> {
        let result = handler::process(handler, email).and_then(|publications| {
            let publications: Vec<Publication> =
                publications.into_iter().filter(Publication::has_articles).collect();
            if publications.is_empty() {
                Err(HandlerError::NoPublicationFound)
            } else {
                Ok(publications)
            }
        });

        match result {
            Ok(publications) => Some(publications),
            Err(e) => {
                warn!(handler = handler.name(), "Email processing failed: {}", e);
                self.notifier
                    .notify_email_processing_error(email, &e, Some(handler.name()))
                    .await;
                None
            }
        }
    }

    /// Marks the email read, then moves it. A move is never attempted on an
    /// email still unread.
    async fn step_advance(&self, email: &Email) -> EmailOutcome {
        if let Err(e) = self.mailbox.mark_read(email).await {
            error!("Failed to mark email as read: {}", e);
            self.notifier
                .notify_generic_error(&e, Some("Marking email as read"))
                .await;
            return EmailOutcome::Persisted;
        }

        if let Err(e) = self.mailbox.move_to_processed(email).await {
            error!("Failed to move email to the processed folder: {}", e);
            self.notifier
                .notify_generic_error(&e, Some("Moving email to the processed folder"))
                .await;
            return EmailOutcome::Persisted;
        }

        EmailOutcome::Processed
    }
}
