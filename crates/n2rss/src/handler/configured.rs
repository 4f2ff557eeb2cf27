//! Handler driven entirely by a `handlers` entry of the configuration.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::HandlerConfig;
use crate::email::Email;
use crate::error::ConfigError;
use crate::model::{Article, Newsletter};

use super::{HandlerError, SingleFeedHandler};

static ANCHOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["'](?P<link>https?://[^"']+)["'][^>]*>(?P<title>.*?)</a>"#)
        .expect("valid regex")
});

static TEXT_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?P<title>[^\n]*?)\s*[(<\[]?(?P<link>https?://[^\s)>\]]+)[)>\]]?\s*$")
        .expect("valid regex")
});

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Recognises emails by sender (and optionally subject) and extracts
/// every link of the body as an article.
#[derive(Debug)]
pub struct ConfiguredHandler {
    name: String,
    newsletter: Newsletter,
    sender_contains: String,
    subject_contains: Option<String>,
    article_pattern: Option<Regex>,
    ignore_links: Vec<Regex>,
}

impl ConfiguredHandler {
    pub fn from_config(config: &HandlerConfig) -> Result<Self, ConfigError> {
        let code = &config.newsletter.code;
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                name: code.clone(),
                reason: e.to_string(),
            })
        };

        let article_pattern = config.article_pattern.as_deref().map(compile).transpose()?;
        let ignore_links = config
            .ignore_links
            .iter()
            .map(|p| compile(p.as_str()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: format!("configured:{}", code),
            newsletter: config.newsletter.clone(),
            sender_contains: config.sender_contains.to_lowercase(),
            subject_contains: config.subject_contains.as_ref().map(|s| s.to_lowercase()),
            article_pattern,
            ignore_links,
        })
    }

    fn is_ignored(&self, link: &str) -> bool {
        self.ignore_links.iter().any(|r| r.is_match(link))
    }

    fn collect(&self, regex: &Regex, content: &str, html: bool) -> Vec<Article> {
        let mut seen = HashSet::new();
        let mut articles = Vec::new();

        for captures in regex.captures_iter(content) {
            let Some(link) = captures.name("link").map(|m| decode_entities(m.as_str().trim())) else {
                continue;
            };
            if self.is_ignored(&link) || !seen.insert(link.clone()) {
                continue;
            }

            let raw_title = captures.name("title").map(|m| m.as_str()).unwrap_or_default();
            let title = if html { clean_html(raw_title) } else { clean_text(raw_title) };
            let title = if title.is_empty() { link.clone() } else { title };
            articles.push(Article::new(title, link, ""));
        }
        articles
    }
}

impl SingleFeedHandler for ConfiguredHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn newsletter(&self) -> &Newsletter {
        &self.newsletter
    }

    fn can_handle(&self, email: &Email) -> bool {
        let sender_matches = email
            .sender
            .address
            .to_lowercase()
            .contains(&self.sender_contains);
        let subject_matches = self
            .subject_contains
            .as_ref()
            .is_none_or(|s| email.subject.to_lowercase().contains(s));
        sender_matches && subject_matches
    }

    fn extract_articles(&self, email: &Email) -> Result<Vec<Article>, HandlerError> {
        if let Some(pattern) = &self.article_pattern {
            let content = email.content().ok_or(HandlerError::EmptyBody)?;
            return Ok(self.collect(pattern, content, email.body.html.is_some()));
        }

        match (&email.body.html, &email.body.text) {
            (Some(html), _) => Ok(self.collect(&ANCHOR_REGEX, html, true)),
            (None, Some(text)) => Ok(self.collect(&TEXT_LINK_REGEX, text, false)),
            (None, None) => Err(HandlerError::EmptyBody),
        }
    }
}

fn clean_html(fragment: &str) -> String {
    clean_text(&decode_entities(&TAG_REGEX.replace_all(fragment, " ")))
}

fn clean_text(fragment: &str) -> String {
    WHITESPACE_REGEX
        .replace_all(fragment, " ")
        .trim()
        .trim_end_matches([':', '-', '|'])
        .trim()
        .to_string()
}

/// Decodes the handful of entities newsletters actually emit.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
