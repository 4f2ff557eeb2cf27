//! In-memory collaborators recording every call.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use n2rss::db::{DatabaseError, IssueRecordStore, PublicationStore};
use n2rss::email::{Email, Listing, MailboxClient, MailboxError, UnreadableMessage};
use n2rss::model::Publication;
use n2rss::notifier::{Fingerprint, IssueId, IssueRecord, TicketClient, TicketError};

/// Mailbox serving a fixed list of unread emails.
#[derive(Default)]
pub struct FakeMailbox {
    emails: Vec<Email>,
    /// UIDs of unread messages that fail to parse.
    unparseable: Vec<u32>,
    fail_listing: bool,
    fail_mark_read: HashSet<u32>,
    fail_move: HashSet<u32>,
    pub marked_read: Mutex<Vec<u32>>,
    pub moved: Mutex<Vec<u32>>,
}

impl FakeMailbox {
    pub fn with_emails(emails: Vec<Email>) -> Self {
        Self {
            emails,
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            fail_listing: true,
            ..Default::default()
        }
    }

    pub fn with_unparseable(mut self, uid: u32) -> Self {
        self.unparseable.push(uid);
        self
    }

    pub fn failing_mark_read(mut self, uid: u32) -> Self {
        self.fail_mark_read.insert(uid);
        self
    }

    pub fn failing_move(mut self, uid: u32) -> Self {
        self.fail_move.insert(uid);
        self
    }

    pub fn marked_read(&self) -> Vec<u32> {
        self.marked_read.lock().unwrap().clone()
    }

    pub fn moved(&self) -> Vec<u32> {
        self.moved.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailboxClient for FakeMailbox {
    async fn list_unread(&self) -> Result<Listing, MailboxError> {
        if self.fail_listing {
            return Err(MailboxError::ConnectionFailed("connection refused".to_string()));
        }
        let mut listing = Listing::of(self.emails.clone());
        listing.unreadable = self
            .unparseable
            .iter()
            .map(|uid| {
                UnreadableMessage::new(
                    "INBOX",
                    Some(*uid),
                    MailboxError::ParseError(format!("Email INBOX#{} has no sender address", uid)),
                )
            })
            .collect();
        Ok(listing)
    }

    async fn mark_read(&self, email: &Email) -> Result<(), MailboxError> {
        let uid = email.mailbox_id.uid;
        if self.fail_mark_read.contains(&uid) {
            return Err(MailboxError::ProtocolError(format!("cannot flag {}", uid)));
        }
        self.marked_read.lock().unwrap().push(uid);
        Ok(())
    }

    async fn move_to_processed(&self, email: &Email) -> Result<(), MailboxError> {
        let uid = email.mailbox_id.uid;
        if self.fail_move.contains(&uid) {
            return Err(MailboxError::ProtocolError(format!("cannot move {}", uid)));
        }
        self.moved.lock().unwrap().push(uid);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketCall {
    Create {
        title: String,
        body: String,
        labels: Vec<String>,
    },
    Comment {
        issue_id: IssueId,
        text: String,
    },
}

/// Ticket tracker handing out sequential issue numbers.
pub struct RecordingTickets {
    next_id: AtomicU64,
    fail: bool,
    pub calls: Mutex<Vec<TicketCall>>,
}

impl Default for RecordingTickets {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingTickets {
    pub fn unavailable() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<TicketCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<(String, String, Vec<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TicketCall::Create {
                    title,
                    body,
                    labels,
                } => Some((title, body, labels)),
                TicketCall::Comment { .. } => None,
            })
            .collect()
    }

    pub fn comments(&self) -> Vec<(IssueId, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TicketCall::Comment { issue_id, text } => Some((issue_id, text)),
                TicketCall::Create { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl TicketClient for RecordingTickets {
    async fn create_issue(
        &self,
        title: &str,
        body: &str,
        labels: &[&str],
    ) -> Result<IssueId, TicketError> {
        if self.fail {
            return Err(TicketError::Api {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        self.calls.lock().unwrap().push(TicketCall::Create {
            title: title.to_string(),
            body: body.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        });
        Ok(IssueId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn add_comment(&self, issue_id: IssueId, text: &str) -> Result<(), TicketError> {
        if self.fail {
            return Err(TicketError::Api {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        self.calls.lock().unwrap().push(TicketCall::Comment {
            issue_id,
            text: text.to_string(),
        });
        Ok(())
    }
}

/// Publication store kept in a vector.
#[derive(Default)]
pub struct MemoryPublications {
    publications: Mutex<Vec<Publication>>,
    fail_save: bool,
    /// Querying this code panics.
    forbidden_code: Option<String>,
    pub save_calls: Mutex<usize>,
}

impl MemoryPublications {
    pub fn with(publications: Vec<Publication>) -> Self {
        Self {
            publications: Mutex::new(publications),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_save: true,
            ..Default::default()
        }
    }

    pub fn forbidding(mut self, code: &str) -> Self {
        self.forbidden_code = Some(code.to_string());
        self
    }

    pub fn stored(&self) -> Vec<Publication> {
        self.publications.lock().unwrap().clone()
    }

    pub fn save_calls(&self) -> usize {
        *self.save_calls.lock().unwrap()
    }

    fn for_code(&self, code: &str) -> Vec<Publication> {
        if self.forbidden_code.as_deref() == Some(code) {
            panic!("statistics queried for '{}'", code);
        }
        self.publications
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.newsletter_code == code)
            .cloned()
            .collect()
    }
}

impl PublicationStore for MemoryPublications {
    fn save(&self, publications: &[Publication]) -> Result<usize, DatabaseError> {
        *self.save_calls.lock().unwrap() += 1;
        if self.fail_save {
            return Err(DatabaseError::LockPoisoned);
        }
        self.publications
            .lock()
            .unwrap()
            .extend(publications.iter().cloned());
        Ok(publications.len())
    }

    fn count_by_newsletter(&self, code: &str) -> Result<u64, DatabaseError> {
        Ok(self.for_code(code).len() as u64)
    }

    fn recent_by_newsletter(
        &self,
        code: &str,
        limit: usize,
    ) -> Result<Vec<Publication>, DatabaseError> {
        let mut publications = self.for_code(code);
        publications.sort_by(|a, b| b.date.cmp(&a.date));
        publications.truncate(limit);
        Ok(publications)
    }

    fn earliest_by_newsletter(&self, code: &str) -> Result<Option<Publication>, DatabaseError> {
        Ok(self.for_code(code).into_iter().min_by_key(|p| p.date))
    }
}

/// Issue record store with a uniqueness check on the fingerprint.
#[derive(Default)]
pub struct MemoryIssueRecords {
    pub records: Mutex<Vec<IssueRecord>>,
}

impl MemoryIssueRecords {
    pub fn records(&self) -> Vec<IssueRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl IssueRecordStore for MemoryIssueRecords {
    fn find(&self, fingerprint: &Fingerprint) -> Result<Option<IssueRecord>, DatabaseError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| &r.fingerprint == fingerprint)
            .cloned())
    }

    fn save(&self, record: &IssueRecord) -> Result<bool, DatabaseError> {
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.fingerprint == record.fingerprint) {
            return Ok(false);
        }
        records.push(record.clone());
        Ok(true)
    }
}
