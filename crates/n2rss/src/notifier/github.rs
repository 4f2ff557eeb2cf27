//! GitHub issues as the incident tracker.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::TrackerConfig;

use super::record::IssueId;
use super::ticket::{Result, TicketClient, TicketError};

/// Default connect timeout for HTTP requests (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default request timeout for HTTP requests (30 seconds).
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = "n2rss-bot";

/// Longest error body kept in [`TicketError::Api`].
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Serialize)]
struct NewIssue<'a> {
    title: &'a str,
    body: &'a str,
    labels: &'a [&'a str],
}

#[derive(Serialize)]
struct NewComment<'a> {
    body: &'a str,
}

#[derive(Deserialize)]
struct CreatedIssue {
    number: u64,
}

pub struct GitHubTicketClient {
    client: Client,
    token: SecretString,
    issues_url: String,
}

impl GitHubTicketClient {
    pub fn new(config: &TrackerConfig, token: SecretString) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            token,
            issues_url: format!(
                "{}/repos/{}/{}/issues",
                config.api_url.trim_end_matches('/'),
                config.owner,
                config.repository
            ),
        })
    }

    async fn post<T: Serialize + ?Sized>(&self, url: &str, payload: &T) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(url)
            .bearer_auth(self.token.expose_secret())
            .header("Accept", "application/vnd.github+json")
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TicketError::Api {
                status,
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl TicketClient for GitHubTicketClient {
    async fn create_issue(&self, title: &str, body: &str, labels: &[&str]) -> Result<IssueId> {
        debug!("Creating issue '{}'", title);
        let response = self
            .post(&self.issues_url, &NewIssue { title, body, labels })
            .await?;

        let created: CreatedIssue = response
            .json()
            .await
            .map_err(|e| TicketError::InvalidResponse(e.to_string()))?;
        info!("Created issue #{}", created.number);
        Ok(IssueId(created.number))
    }

    async fn add_comment(&self, issue_id: IssueId, text: &str) -> Result<()> {
        let url = format!("{}/{}/comments", self.issues_url, issue_id.0);
        self.post(&url, &NewComment { body: text }).await?;
        debug!("Commented on issue {}", issue_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GitHubTicketClient {
        let config = TrackerConfig {
            owner: "n2rss".to_string(),
            repository: "n2rss".to_string(),
            token: None,
            token_file: None,
            token_env_var: None,
            api_url: server.uri(),
        };
        GitHubTicketClient::new(&config, SecretString::from("ghp_test")).unwrap()
    }

    #[tokio::test]
    async fn test_create_issue_returns_number() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/n2rss/n2rss/issues"))
            .and(header("authorization", "Bearer ghp_test"))
            .and(header("user-agent", "n2rss-bot"))
            .and(body_json(serde_json::json!({
                "title": "Missing publications detected",
                "body": "body",
                "labels": ["n2rss-bot", "missing-publications"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"number": 42})))
            .expect(1)
            .mount(&server)
            .await;

        let issue = client_for(&server)
            .create_issue("Missing publications detected", "body", &["n2rss-bot", "missing-publications"])
            .await
            .unwrap();
        assert_eq!(issue, IssueId(42));
    }

    #[tokio::test]
    async fn test_add_comment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/n2rss/n2rss/issues/7/comments"))
            .and(body_json(serde_json::json!({"body": "New occurrence"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 1})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .add_comment(IssueId(7), "New occurrence")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_api_error_body_is_truncated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("x".repeat(500)))
            .mount(&server)
            .await;

        let result = client_for(&server).create_issue("t", "b", &[]).await;
        match result {
            Err(TicketError::Api { status, body }) => {
                assert_eq!(status, 403);
                assert_eq!(body.len(), 200);
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
