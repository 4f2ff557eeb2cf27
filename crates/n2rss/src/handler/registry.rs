use crate::config::HandlerConfig;
use crate::email::Email;
use crate::error::ConfigError;
use crate::model::Newsletter;

use super::{ConfiguredHandler, Handler};

/// Outcome of routing an email to a handler.
#[derive(Debug)]
pub enum Resolution<'a> {
    Found(&'a Handler),
    NoMatch,
    /// Several enabled handlers claim the email; carries their names.
    Ambiguous(Vec<&'a str>),
}

#[derive(Debug, Default)]
pub struct HandlerRegistry {
    handlers: Vec<Handler>,
}

impl HandlerRegistry {
    pub fn new(handlers: Vec<Handler>) -> Self {
        Self { handlers }
    }

    pub fn from_config(configs: &[HandlerConfig]) -> Result<Self, ConfigError> {
        let handlers = configs
            .iter()
            .map(|c| ConfiguredHandler::from_config(c).map(Handler::single))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(handlers))
    }

    pub fn register(&mut self, handler: Handler) {
        self.handlers.push(handler);
    }

    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    pub fn enabled_handlers(&self) -> impl Iterator<Item = &Handler> {
        self.handlers.iter().filter(|h| h.is_enabled())
    }

    /// Every newsletter declared by any handler, enabled or not.
    pub fn newsletters(&self) -> impl Iterator<Item = &Newsletter> {
        self.handlers.iter().flat_map(|h| h.newsletters())
    }

    /// Finds the single enabled handler recognising `email`.
    pub fn resolve(&self, email: &Email) -> Resolution<'_> {
        let mut matching: Vec<&Handler> = self
            .enabled_handlers()
            .filter(|h| h.can_handle(email))
            .collect();

        match matching.len() {
            0 => Resolution::NoMatch,
            1 => Resolution::Found(matching.remove(0)),
            _ => Resolution::Ambiguous(matching.iter().map(|h| h.name()).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::tests::email_from;

    fn handler_config(code: &str, sender: &str, enabled: bool) -> HandlerConfig {
        serde_json::from_value(serde_json::json!({
            "newsletter": {"code": code, "name": code, "website": "https://example.com", "enabled": enabled},
            "sender_contains": sender,
        }))
        .unwrap()
    }

    #[test]
    fn test_resolve_single_match() {
        let registry = HandlerRegistry::from_config(&[
            handler_config("bytes", "bytes.dev", true),
            handler_config("tldr", "tldr", true),
        ])
        .unwrap();

        match registry.resolve(&email_from("news@bytes.dev", "Bytes")) {
            Resolution::Found(handler) => assert_eq!(handler.name(), "configured:bytes"),
            other => panic!("unexpected resolution: {:?}", other),
        }
        assert!(matches!(
            registry.resolve(&email_from("someone@gmail.com", "hi")),
            Resolution::NoMatch
        ));
    }

    #[test]
    fn test_resolve_ambiguous() {
        let registry = HandlerRegistry::from_config(&[
            handler_config("bytes", "bytes", true),
            handler_config("bytes_dev", "bytes.dev", true),
        ])
        .unwrap();

        match registry.resolve(&email_from("news@bytes.dev", "Bytes")) {
            Resolution::Ambiguous(names) => {
                assert_eq!(names, vec!["configured:bytes", "configured:bytes_dev"])
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn test_disabled_handlers_are_not_routed() {
        let registry = HandlerRegistry::from_config(&[
            handler_config("bytes", "bytes.dev", false),
            handler_config("tldr", "tldr", true),
        ])
        .unwrap();

        assert_eq!(registry.enabled_handlers().count(), 1);
        assert_eq!(registry.newsletters().count(), 2);
        assert!(matches!(
            registry.resolve(&email_from("news@bytes.dev", "Bytes")),
            Resolution::NoMatch
        ));
    }
}
