//! Builders for test emails, publications and handlers.

#![allow(dead_code)]

use chrono::{Duration, NaiveDate, TimeZone, Utc};

use n2rss::email::{Email, EmailBody, MailboxId, Sender};
use n2rss::handler::{Handler, HandlerError, MultiFeedHandler, SingleFeedHandler};
use n2rss::model::{Article, Newsletter, Publication};

pub fn date(offset_days: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 5).unwrap() + Duration::days(offset_days)
}

/// Builder for creating `Email` instances.
pub struct EmailBuilder {
    uid: u32,
    address: String,
    name: Option<String>,
    subject: String,
    html: Option<String>,
    text: Option<String>,
    received: NaiveDate,
}

impl EmailBuilder {
    pub fn new(uid: u32) -> Self {
        Self {
            uid,
            address: "news@bytes.dev".to_string(),
            name: None,
            subject: format!("Issue {}", uid),
            html: Some("<p>Hello</p>".to_string()),
            text: None,
            received: date(0),
        }
    }

    pub fn from(mut self, address: &str) -> Self {
        self.address = address.to_string();
        self
    }

    pub fn sender_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    pub fn html(mut self, html: &str) -> Self {
        self.html = Some(html.to_string());
        self
    }

    pub fn received(mut self, date: NaiveDate) -> Self {
        self.received = date;
        self
    }

    pub fn build(self) -> Email {
        Email {
            mailbox_id: MailboxId::new("INBOX", self.uid),
            sender: Sender::new(self.address, self.name.as_deref()),
            reply_to: None,
            subject: self.subject,
            received_at: Utc
                .from_utc_datetime(&self.received.and_hms_opt(8, 0, 0).unwrap()),
            body: EmailBody {
                text: self.text,
                html: self.html,
            },
        }
    }
}

pub fn articles(count: usize) -> Vec<Article> {
    (0..count)
        .map(|i| Article::new(format!("Article {}", i), format!("https://example.com/{}", i), ""))
        .collect()
}

pub fn publication(code: &str, offset_days: i64, article_count: usize) -> Publication {
    Publication::new(
        format!("{} {}", code, offset_days),
        date(offset_days),
        code,
        articles(article_count),
    )
}

/// What a [`ScriptedHandler`] does when asked to extract.
#[derive(Clone)]
pub enum Script {
    Articles(usize),
    Fail(String),
}

/// Single-feed handler recognising one sender and following a script.
pub struct ScriptedHandler {
    name: String,
    newsletter: Newsletter,
    sender: String,
    script: Script,
}

impl ScriptedHandler {
    pub fn new(code: &str, sender: &str, script: Script) -> Self {
        Self {
            name: format!("scripted:{}", code),
            newsletter: Newsletter::new(code, code, "https://example.com"),
            sender: sender.to_string(),
            script,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.newsletter = self.newsletter.disabled();
        self
    }

    pub fn into_handler(self) -> Handler {
        Handler::single(self)
    }
}

impl SingleFeedHandler for ScriptedHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn newsletter(&self) -> &Newsletter {
        &self.newsletter
    }

    fn can_handle(&self, email: &Email) -> bool {
        email.sender.address == self.sender
    }

    fn extract_articles(&self, _email: &Email) -> Result<Vec<Article>, HandlerError> {
        match &self.script {
            Script::Articles(count) => Ok(articles(*count)),
            Script::Fail(message) => Err(HandlerError::Extraction(message.clone())),
        }
    }
}

/// Multi-feed handler whose feeds all receive the same articles.
pub struct FanOutHandler {
    sender: String,
    newsletters: Vec<Newsletter>,
}

impl FanOutHandler {
    pub fn new(sender: &str, codes: &[&str]) -> Self {
        Self {
            sender: sender.to_string(),
            newsletters: codes
                .iter()
                .map(|code| Newsletter::new(*code, *code, "https://example.com"))
                .collect(),
        }
    }

    pub fn into_handler(self) -> Handler {
        Handler::multi(self)
    }
}

impl MultiFeedHandler for FanOutHandler {
    fn name(&self) -> &str {
        "fan-out"
    }

    fn newsletters(&self) -> &[Newsletter] {
        &self.newsletters
    }

    fn can_handle(&self, email: &Email) -> bool {
        email.sender.address == self.sender
    }

    fn extract_feeds(&self, _email: &Email) -> Result<Vec<(String, Vec<Article>)>, HandlerError> {
        Ok(self
            .newsletters
            .iter()
            .map(|n| (n.code.clone(), articles(2)))
            .collect())
    }
}
