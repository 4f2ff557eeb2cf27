use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::ConfigError;
use crate::stats::publication::MIN_SAMPLE_SIZE;

const SCHEMA_JSON: &str = include_str!("../../schema/config-v1.json");

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV_VAR: &str = "N2RSS_CONFIG";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// Returns `$N2RSS_CONFIG` when set, `~/.n2rss/config.json` otherwise.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|h| h.join(".n2rss").join("config.json"))
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if !config.mailbox.use_tls {
        return Err(ConfigError::Validation {
            message: "TLS is required for the mailbox connection".to_string(),
        });
    }

    if config.mailbox.inbox_folder == config.mailbox.processed_folder {
        return Err(ConfigError::Validation {
            message: format!(
                "Inbox and processed folders must differ (both are '{}')",
                config.mailbox.inbox_folder
            ),
        });
    }

    if config.lateness.sample_size < MIN_SAMPLE_SIZE {
        return Err(ConfigError::Validation {
            message: "lateness.sample_size must be at least 2".to_string(),
        });
    }

    let mut codes = HashSet::new();
    for handler in &config.handlers {
        let code = &handler.newsletter.code;
        if !codes.insert(code) {
            return Err(ConfigError::InvalidHandler {
                code: code.clone(),
                reason: "Duplicate newsletter code".to_string(),
            });
        }

        if let Some(pattern) = &handler.article_pattern {
            let regex = regex::Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                name: code.clone(),
                reason: e.to_string(),
            })?;
            let names: HashSet<&str> = regex.capture_names().flatten().collect();
            if !names.contains("link") || !names.contains("title") {
                return Err(ConfigError::InvalidPattern {
                    name: code.clone(),
                    reason: "Pattern must contain named capture groups 'link' and 'title'"
                        .to_string(),
                });
            }
        }

        for pattern in &handler.ignore_links {
            if let Err(e) = regex::Regex::new(pattern) {
                return Err(ConfigError::InvalidPattern {
                    name: code.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(())
}
