//! The fetched email value object.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

use super::error::MailboxError;

/// Where a message lives in the mailbox: folder plus IMAP UID.
///
/// Only used for mailbox-side operations (mark read, move). It never
/// identifies persisted content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MailboxId {
    pub folder: String,
    pub uid: u32,
}

impl MailboxId {
    pub fn new(folder: impl Into<String>, uid: u32) -> Self {
        Self {
            folder: folder.into(),
            uid,
        }
    }
}

impl fmt::Display for MailboxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.folder, self.uid)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub address: String,
    pub name: Option<String>,
}

impl Sender {
    pub fn new(address: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            address: address.into(),
            name: name.map(str::to_string),
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.address),
            None => f.write_str(&self.address),
        }
    }
}

/// Text and/or HTML variants of the message body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailBody {
    pub text: Option<String>,
    pub html: Option<String>,
}

/// A fetched newsletter email. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub mailbox_id: MailboxId,
    pub sender: Sender,
    pub reply_to: Option<String>,
    pub subject: String,
    pub received_at: DateTime<Utc>,
    pub body: EmailBody,
}

impl Email {
    /// Display form of the sender, used as part of incident fingerprints.
    pub fn sender_display(&self) -> String {
        self.sender.to_string()
    }

    pub fn received_date(&self) -> NaiveDate {
        self.received_at.date_naive()
    }

    /// HTML body when present, text body otherwise.
    pub fn content(&self) -> Option<&str> {
        self.body.html.as_deref().or(self.body.text.as_deref())
    }
}

/// An unread message that could not be fetched or parsed. It stays unread
/// in the mailbox.
#[derive(Debug)]
pub struct UnreadableMessage {
    pub folder: String,
    /// Unknown when the fetch response itself was broken.
    pub uid: Option<u32>,
    pub error: MailboxError,
}

impl UnreadableMessage {
    pub fn new(folder: impl Into<String>, uid: Option<u32>, error: MailboxError) -> Self {
        Self {
            folder: folder.into(),
            uid,
            error,
        }
    }

    /// `folder#uid`, or the bare folder when the UID is unknown.
    pub fn location(&self) -> String {
        match self.uid {
            Some(uid) => MailboxId::new(self.folder.as_str(), uid).to_string(),
            None => self.folder.clone(),
        }
    }
}

/// Outcome of listing the unread emails of a folder.
#[derive(Debug, Default)]
pub struct Listing {
    pub emails: Vec<Email>,
    pub unreadable: Vec<UnreadableMessage>,
}

impl Listing {
    pub fn of(emails: Vec<Email>) -> Self {
        Self {
            emails,
            unreadable: Vec::new(),
        }
    }
}
