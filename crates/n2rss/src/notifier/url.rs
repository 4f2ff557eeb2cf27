use url::Url;

/// Normalises a newsletter URL to `https://host`.
///
/// A missing scheme is treated as https. Port, path, query, fragment and
/// credentials are dropped. Input that does not parse to a URL with a
/// host is returned trimmed and lowercased.
pub fn normalize_newsletter_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let Ok(url) = Url::parse(&candidate) else {
        return trimmed.trim_end_matches('/').to_lowercase();
    };
    let Some(host) = url.host_str() else {
        return trimmed.trim_end_matches('/').to_lowercase();
    };

    format!("https://{}", host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forces_https_and_drops_path() {
        assert_eq!(normalize_newsletter_url("http://bytes.dev/path/"), "https://bytes.dev");
        assert_eq!(normalize_newsletter_url("https://bytes.dev"), "https://bytes.dev");
        assert_eq!(
            normalize_newsletter_url("https://bytes.dev/archives?page=2#top"),
            "https://bytes.dev"
        );
    }

    #[test]
    fn test_missing_scheme() {
        assert_eq!(normalize_newsletter_url("  Bytes.dev/ "), "https://bytes.dev");
    }

    #[test]
    fn test_drops_port() {
        assert_eq!(normalize_newsletter_url("http://bytes.dev:8080/path/"), "https://bytes.dev");
        assert_eq!(normalize_newsletter_url("https://bytes.dev:8443"), "https://bytes.dev");
        assert_eq!(normalize_newsletter_url("http://bytes.dev:80/"), "https://bytes.dev");
    }
}
