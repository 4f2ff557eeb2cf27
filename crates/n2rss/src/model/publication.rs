use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single entry of a publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub description: String,
}

impl Article {
    pub fn new(title: impl Into<String>, link: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            description: description.into(),
        }
    }
}

/// One dated issue of a newsletter.
///
/// The newsletter is referenced by code. A publication without articles
/// signals an extraction failure and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub title: String,
    pub date: NaiveDate,
    pub newsletter_code: String,
    pub articles: Vec<Article>,
}

impl Publication {
    pub fn new(
        title: impl Into<String>,
        date: NaiveDate,
        newsletter_code: impl Into<String>,
        articles: Vec<Article>,
    ) -> Self {
        Self {
            title: title.into(),
            date,
            newsletter_code: newsletter_code.into(),
            articles,
        }
    }

    pub fn has_articles(&self) -> bool {
        !self.articles.is_empty()
    }
}
