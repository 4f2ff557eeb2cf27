//! Conversion of raw RFC 5322 messages into [`Email`] values.

use chrono::{DateTime, Utc};
use log::debug;
use mail_parser::{MessageParser, PartType};

use super::error::{MailboxError, Result};
use super::message::{Email, EmailBody, MailboxId, Sender};

/// Parses a raw message fetched from `mailbox_id`.
///
/// A message without a `From` address is rejected; a missing `Date` header
/// falls back to the current time.
pub fn parse_email(raw: &[u8], mailbox_id: MailboxId) -> Result<Email> {
    let message = MessageParser::default()
        .parse(raw)
        .ok_or_else(|| MailboxError::ParseError("Failed to parse email message".to_string()))?;

    let from = message
        .from()
        .and_then(|addr| addr.first())
        .and_then(|addr| addr.address().map(|address| Sender::new(address, addr.name())))
        .ok_or_else(|| {
            MailboxError::ParseError(format!("Email {} has no sender address", mailbox_id))
        })?;

    let reply_to = message
        .reply_to()
        .and_then(|addr| addr.first())
        .and_then(|addr| addr.address())
        .map(str::to_string);

    let received_at = message
        .date()
        .and_then(|d| DateTime::<Utc>::from_timestamp(d.to_timestamp(), 0))
        .unwrap_or_else(Utc::now);

    // body_text/body_html convert between variants; only keep genuine parts.
    let text = message.text_bodies().find_map(|part| match &part.body {
        PartType::Text(text) => Some(text.to_string()),
        _ => None,
    });
    let html = message.html_bodies().find_map(|part| match &part.body {
        PartType::Html(html) => Some(html.to_string()),
        _ => None,
    });

    let email = Email {
        mailbox_id,
        sender: from,
        reply_to,
        subject: message.subject().unwrap_or_default().trim().to_string(),
        received_at,
        body: EmailBody { text, html },
    };

    debug!(
        "Parsed email {} from '{}' subject={:?}",
        email.mailbox_id, email.sender, email.subject
    );
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const HTML_EMAIL: &str = "From: Bytes <news@bytes.dev>\r\n\
Reply-To: reply@bytes.dev\r\n\
To: reader@example.com\r\n\
Subject: Bytes #312\r\n\
Date: Tue, 4 Jun 2024 14:30:00 +0000\r\n\
MIME-Version: 1.0\r\n\
Content-Type: text/html; charset=utf-8\r\n\
\r\n\
<html><body><a href=\"https://bytes.dev/a\">A</a></body></html>\r\n";

    const TEXT_EMAIL: &str = "From: weekly@example.org\r\n\
Subject: Weekly digest\r\n\
Date: Mon, 3 Jun 2024 08:00:00 +0200\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
Hello there\r\n";

    #[test]
    fn test_parse_html_email() {
        let email = parse_email(HTML_EMAIL.as_bytes(), MailboxId::new("INBOX", 7)).unwrap();

        assert_eq!(email.mailbox_id, MailboxId::new("INBOX", 7));
        assert_eq!(email.sender.address, "news@bytes.dev");
        assert_eq!(email.sender.name.as_deref(), Some("Bytes"));
        assert_eq!(email.reply_to.as_deref(), Some("reply@bytes.dev"));
        assert_eq!(email.subject, "Bytes #312");
        assert_eq!(
            email.received_at,
            Utc.with_ymd_and_hms(2024, 6, 4, 14, 30, 0).unwrap()
        );
        assert!(email.body.html.as_deref().unwrap().contains("https://bytes.dev/a"));
        assert_eq!(email.body.text, None);
    }

    #[test]
    fn test_parse_text_email_converts_timezone() {
        let email = parse_email(TEXT_EMAIL.as_bytes(), MailboxId::new("INBOX", 8)).unwrap();

        assert_eq!(email.sender.to_string(), "weekly@example.org");
        assert_eq!(email.received_at, Utc.with_ymd_and_hms(2024, 6, 3, 6, 0, 0).unwrap());
        assert!(email.body.text.as_deref().unwrap().contains("Hello there"));
        assert_eq!(email.body.html, None);
    }

    #[test]
    fn test_parse_email_without_sender_fails() {
        let raw = "Subject: orphan\r\n\r\nbody\r\n";
        let result = parse_email(raw.as_bytes(), MailboxId::new("INBOX", 9));
        assert!(matches!(result, Err(MailboxError::ParseError(_))));
    }
}
