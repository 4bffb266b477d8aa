use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};

use crate::auth::Token;

use super::types::{GitHubIssue, GitHubRepo, SearchIssuesResponse};

const PER_PAGE: usize = 100;

/// GitHub API client for resolving repositories and searching closed issues.
#[derive(Clone)]
pub struct GitHubClient {
    /// HTTP client
    client: reqwest::Client,
    /// Base URL for GitHub API
    base_url: String,
}

impl GitHubClient {
    /// Create a new GitHub API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - GitHub API base URL (e.g., "https://api.github.com")
    /// * `token` - Optional GitHub personal access token
    pub fn new(base_url: String, token: Option<Token>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("cycletime/1.0"));

        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .context("GitHub token contains invalid header characters")?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, base_url })
    }

    /// Resolve the numeric id of a repository (`owner/repo`).
    ///
    /// The board event service addresses repositories by this id rather
    /// than by path.
    pub async fn fetch_repo_id(&self, repo: &str) -> Result<u64> {
        let url = format!("{}/repos/{}", self.base_url, repo);

        let response: GitHubRepo = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch repository {repo}"))?
            .error_for_status()
            .with_context(|| format!("Repository lookup rejected for {repo}"))?
            .json()
            .await
            .with_context(|| format!("Failed to parse repository response for {repo}"))?;

        Ok(response.id)
    }

    /// Search for issues closed in the given inclusive date range.
    ///
    /// Pull requests are filtered out; the `type:issue` qualifier already
    /// excludes them server-side, the filter just covers search quirks.
    /// Labels in `exclude_labels` are excluded via `-label:` qualifiers.
    ///
    /// # Returns
    ///
    /// All matching issues across pages, in the search API's `updated` order.
    pub async fn search_closed_issues(
        &self,
        repo: &str,
        since: NaiveDate,
        until: NaiveDate,
        exclude_labels: &[String],
    ) -> Result<Vec<GitHubIssue>> {
        let query = build_search_query(repo, since, until, exclude_labels);
        debug!("Searching issues with query: {query}");

        let url = format!("{}/search/issues", self.base_url);
        let mut all_issues = Vec::new();
        let mut page = 1;

        loop {
            let per_page = PER_PAGE.to_string();
            let page_number = page.to_string();
            let response: SearchIssuesResponse = self
                .client
                .get(&url)
                .query(&[
                    ("q", query.as_str()),
                    ("sort", "updated"),
                    ("per_page", per_page.as_str()),
                    ("page", page_number.as_str()),
                ])
                .send()
                .await
                .context("Failed to search issues")?
                .error_for_status()
                .context("Issue search rejected")?
                .json()
                .await
                .context("Failed to parse issue search response")?;

            let page_len = response.items.len();
            debug!("Search page {page} returned {page_len} issues");

            all_issues.extend(
                response
                    .items
                    .into_iter()
                    .filter(|issue| !issue.is_pull_request()),
            );

            let fetched_all = all_issues.len() as u64 >= response.total_count;
            if page_len < PER_PAGE || fetched_all {
                break;
            }

            page += 1;
        }

        Ok(all_issues)
    }
}

fn build_search_query(
    repo: &str,
    since: NaiveDate,
    until: NaiveDate,
    exclude_labels: &[String],
) -> String {
    let mut query = format!("repo:{repo} closed:{since}..{until} type:issue");
    for label in exclude_labels {
        query.push_str(&format!(" -label:\"{label}\""));
    }
    query
}
