use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Issue as returned by the search API. Only the fields the cycle time
/// calculation needs are deserialized.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubIssue {
    pub number: u64,
    pub title: String,
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assignees: Vec<GitHubUser>,
    /// Present when the search result is actually a pull request.
    pub pull_request: Option<serde_json::Value>,
}

impl GitHubIssue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

/// Repository metadata; only the numeric id is needed, the board service
/// keys its event history on it.
#[derive(Debug, Deserialize)]
pub struct GitHubRepo {
    pub id: u64,
}

/// Envelope of the issue search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchIssuesResponse {
    pub total_count: u64,
    pub items: Vec<GitHubIssue>,
}
