use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;
use tokio::sync::Semaphore;
use url::Url;

use crate::auth::Token;
use crate::error::{CycleTimeError, Result};

use super::types::IssueEvent;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_SECONDS: u64 = 2;
// The board API rate-limits aggressively; cap the per-issue fan-out.
const MAX_CONCURRENT_REQUESTS: usize = 20;

/// Client for the board event history API.
pub struct ZenHubClient {
    client: Client,
    base_url: Url,
    token: Option<Token>,
    semaphore: Arc<Semaphore>,
}

impl ZenHubClient {
    /// Creates a client for the given API base URL (e.g. <https://api.zenhub.io>).
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be parsed or the HTTP client
    /// cannot be constructed.
    pub fn new(base_url: &str, token: Option<Token>) -> Result<Self> {
        let client = Client::builder()
            .user_agent("cycletime/0.3.0")
            .build()
            .map_err(|e| CycleTimeError::Config(format!("Failed to create HTTP client: {e}")))?;

        let base_url = Url::parse(base_url)
            .map_err(|e| CycleTimeError::Config(format!("Invalid base URL: {e}")))?;

        Ok(Self {
            client,
            base_url,
            token,
            semaphore: Arc::new(Semaphore::new(MAX_CONCURRENT_REQUESTS)),
        })
    }

    /// Fetch the full event history for one issue.
    ///
    /// Returns the raw, unordered event list; callers filter it down to the
    /// transfer events they care about. Rate-limit and server errors are
    /// retried a bounded number of times.
    pub async fn fetch_issue_events(&self, repo_id: u64, issue: u64) -> Result<Vec<IssueEvent>> {
        let url = self
            .base_url
            .join(&format!("p1/repositories/{repo_id}/issues/{issue}/events"))
            .map_err(|e| CycleTimeError::Config(format!("Invalid events URL: {e}")))?;

        // One permit per logical request, retries included.
        let _permit = self.semaphore.acquire().await.unwrap();

        let mut retry_count = 0;
        loop {
            let mut request = self.client.get(url.clone());
            if let Some(token) = &self.token {
                request = request.header("X-Authentication-Token", token.as_str());
            }

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                    if retry_count >= MAX_RETRIES {
                        return Err(e.into());
                    }
                    warn!(
                        "Network error ({}), retrying in {}s ({}/{})...",
                        e,
                        RETRY_DELAY_SECONDS,
                        retry_count + 1,
                        MAX_RETRIES
                    );
                    tokio::time::sleep(Duration::from_secs(RETRY_DELAY_SECONDS)).await;
                    retry_count += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();

            if status == 429 || status.is_server_error() {
                if retry_count >= MAX_RETRIES {
                    return Err(CycleTimeError::ApiErrorAfterRetries {
                        status: status.as_u16(),
                        retries: MAX_RETRIES,
                    });
                }

                warn!(
                    "Board API error (status {status}). Waiting {RETRY_DELAY_SECONDS} seconds before retry {}/{}...",
                    retry_count + 1,
                    MAX_RETRIES
                );

                tokio::time::sleep(Duration::from_secs(RETRY_DELAY_SECONDS)).await;
                retry_count += 1;
                continue;
            }

            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read error response".to_string());
                return Err(CycleTimeError::Api {
                    status: status.as_u16(),
                    message: error_text,
                });
            }

            let events: Vec<IssueEvent> = response.json().await?;
            debug!("Issue #{issue}: fetched {} board events", events.len());
            return Ok(events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetches_issue_events() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/p1/repositories/123/issues/42/events")
            .match_header("x-authentication-token", "zh-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {
                        "type": "transferIssue",
                        "from_pipeline": {"name": "Backlog"},
                        "to_pipeline": {"name": "In Progress"},
                        "created_at": "2026-08-24T09:00:00Z"
                    },
                    {"type": "estimateIssue", "created_at": "2026-08-24T10:00:00Z"}
                ]"#,
            )
            .create_async()
            .await;

        let client = ZenHubClient::new(&server.url(), Some(Token::from("zh-token"))).unwrap();
        let events = client.fetch_issue_events(123, 42).await.unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "transferIssue");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/p1/repositories/123/issues/42/events")
            .with_status(404)
            .with_body("not found")
            .expect(1)
            .create_async()
            .await;

        let client = ZenHubClient::new(&server.url(), None).unwrap();
        let result = client.fetch_issue_events(123, 42).await;

        assert!(matches!(
            result,
            Err(CycleTimeError::Api { status: 404, .. })
        ));
        mock.assert_async().await;
    }

    #[test]
    fn rejects_invalid_base_url() {
        let result = ZenHubClient::new("not a url", None);
        assert!(matches!(result, Err(CycleTimeError::Config(_))));
    }
}
