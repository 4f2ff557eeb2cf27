//! Newsletter mailbox access.
//!
//! This module provides the immutable [`Email`] value object, RFC 5322
//! parsing, and the [`MailboxClient`] capability with an IMAP implementation.

pub mod client;
pub mod error;
pub mod message;
pub mod parser;

pub use client::{ImapMailbox, MailboxClient};
pub use error::MailboxError;
pub use message::{Email, EmailBody, Listing, MailboxId, Sender, UnreadableMessage};
pub use parser::parse_email;
