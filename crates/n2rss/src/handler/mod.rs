//! Newsletter content handlers.
//!
//! A handler recognises the emails of one newsletter source and extracts
//! their articles. Sources publishing one feed implement
//! [`SingleFeedHandler`]; sources split into several feeds implement
//! [`MultiFeedHandler`]. Both are unified by the [`Handler`] enum and
//! adapted to publications by [`process`].

pub mod configured;
pub mod registry;

use thiserror::Error;

use crate::email::Email;
use crate::model::{Article, Newsletter, Publication};

pub use configured::ConfiguredHandler;
pub use registry::{HandlerRegistry, Resolution};

#[derive(Error, Debug)]
pub enum HandlerError {
    /// Extraction produced no publication with articles.
    #[error("No publication found")]
    NoPublicationFound,

    #[error("Email has no text or HTML body")]
    EmptyBody,

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Handler '{handler}' produced articles for unknown feed '{code}'")]
    UnknownFeed { handler: String, code: String },
}

/// Handler for a source that publishes a single feed.
pub trait SingleFeedHandler: Send + Sync {
    fn name(&self) -> &str;
    fn newsletter(&self) -> &Newsletter;
    fn can_handle(&self, email: &Email) -> bool;
    fn extract_articles(&self, email: &Email) -> Result<Vec<Article>, HandlerError>;
}

/// Handler for a source whose emails feed several newsletters.
pub trait MultiFeedHandler: Send + Sync {
    fn name(&self) -> &str;
    /// Declared feeds; the first one is the primary feed.
    fn newsletters(&self) -> &[Newsletter];
    fn can_handle(&self, email: &Email) -> bool;
    /// Articles grouped by newsletter code.
    fn extract_feeds(&self, email: &Email) -> Result<Vec<(String, Vec<Article>)>, HandlerError>;
}

pub enum Handler {
    Single(Box<dyn SingleFeedHandler>),
    Multi(Box<dyn MultiFeedHandler>),
}

impl Handler {
    pub fn single(handler: impl SingleFeedHandler + 'static) -> Self {
        Handler::Single(Box::new(handler))
    }

    pub fn multi(handler: impl MultiFeedHandler + 'static) -> Self {
        Handler::Multi(Box::new(handler))
    }

    pub fn name(&self) -> &str {
        match self {
            Handler::Single(h) => h.name(),
            Handler::Multi(h) => h.name(),
        }
    }

    /// All declared newsletters, primary first.
    pub fn newsletters(&self) -> Vec<&Newsletter> {
        match self {
            Handler::Single(h) => vec![h.newsletter()],
            Handler::Multi(h) => h.newsletters().iter().collect(),
        }
    }

    pub fn primary_newsletter(&self) -> Option<&Newsletter> {
        match self {
            Handler::Single(h) => Some(h.newsletter()),
            Handler::Multi(h) => h.newsletters().first(),
        }
    }

    /// A handler is enabled when its primary newsletter is.
    pub fn is_enabled(&self) -> bool {
        self.primary_newsletter().is_some_and(|n| n.enabled)
    }

    pub fn can_handle(&self, email: &Email) -> bool {
        match self {
            Handler::Single(h) => h.can_handle(email),
            Handler::Multi(h) => h.can_handle(email),
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name())
            .field(
                "newsletters",
                &self.newsletters().iter().map(|n| &n.code).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Extracts the publications an email carries, one per feed.
///
/// Publications are titled after the subject and dated on the day the
/// email was received. Empty publications are returned as-is.
pub fn process(handler: &Handler, email: &Email) -> Result<Vec<Publication>, HandlerError> {
    let title = email.subject.as_str();
    let date = email.received_date();

    match handler {
        Handler::Single(h) => {
            let articles = h.extract_articles(email)?;
            Ok(vec![Publication::new(title, date, &h.newsletter().code, articles)])
        }
        Handler::Multi(h) => h
            .extract_feeds(email)?
            .into_iter()
            .map(|(code, articles)| {
                if !h.newsletters().iter().any(|n| n.code == code) {
                    return Err(HandlerError::UnknownFeed {
                        handler: h.name().to_string(),
                        code,
                    });
                }
                Ok(Publication::new(title, date, code, articles))
            })
            .collect(),
    }
}
