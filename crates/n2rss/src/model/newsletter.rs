use serde::{Deserialize, Serialize};

/// A configured newsletter feed, identified by its unique `code`.
///
/// One newsletter source may expose several feeds (e.g. "Articles" and
/// "Libraries"); each of them is its own `Newsletter` with a distinct code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Newsletter {
    pub code: String,
    pub name: String,
    pub website: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub feed_title: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub hidden: bool,
}

fn default_true() -> bool {
    true
}

impl Newsletter {
    pub fn new(code: impl Into<String>, name: impl Into<String>, website: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            website: website.into(),
            notes: None,
            feed_title: None,
            enabled: true,
            hidden: false,
        }
    }

    pub fn with_feed_title(mut self, feed_title: impl Into<String>) -> Self {
        self.feed_title = Some(feed_title.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Title used for the generated feed; falls back to the display name.
    pub fn feed_title(&self) -> &str {
        self.feed_title.as_deref().unwrap_or(&self.name)
    }
}
