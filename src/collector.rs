use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use log::{info, warn};

use crate::config::ReportConfig;
use crate::dates::{end_of_week, start_of_week, sub_weeks};
use crate::metrics::{
    calculate_stage_times, group_by_week, stage_transfers, ClosedIssue, CycleTimeReport,
    IssueCycleRecord,
};
use crate::output::PhaseProgress;
use crate::providers::github::types::GitHubIssue;
use crate::providers::github::GitHubClient;
use crate::providers::zenhub::ZenHubClient;

/// Ties the issue search, the board event history and the metrics
/// computation together into one report run.
///
/// Repositories are processed concurrently, as are the per-issue event
/// fetches within a repository; no ordering is needed until the weekly
/// bucketing sorts the result.
pub struct CycleTimeCollector {
    github: GitHubClient,
    zenhub: ZenHubClient,
    config: ReportConfig,
}

impl CycleTimeCollector {
    pub fn new(github: GitHubClient, zenhub: ZenHubClient, config: ReportConfig) -> Self {
        Self {
            github,
            zenhub,
            config,
        }
    }

    /// Collects cycle times for all configured repositories.
    ///
    /// The search window spans from the Monday of the week `config.weeks`
    /// weeks before `as_of` through the Sunday of the week containing
    /// `as_of`, inclusive.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue search or repository lookup fails.
    /// Event-history failures for individual issues only degrade that
    /// issue to an empty stage map.
    pub async fn collect(&self, as_of: NaiveDate) -> Result<CycleTimeReport> {
        let since = start_of_week(sub_weeks(as_of, self.config.weeks));
        let until = end_of_week(as_of);

        info!(
            "Collecting cycle times for {} repositories, closed {since}..{until}",
            self.config.repos.len()
        );

        let progress = PhaseProgress::start_fetch();

        let repo_futures: Vec<_> = self
            .config
            .repos
            .iter()
            .map(|repo| self.collect_repo(repo, since, until))
            .collect();

        let results = futures::future::join_all(repo_futures).await;

        let mut records = Vec::new();
        for result in results {
            records.extend(result?);
        }

        let progress = progress.finish_fetch_start_compute();

        info!("Computed cycle times for {} issues", records.len());

        let report = CycleTimeReport {
            generated_at: Utc::now(),
            repos: self.config.repos.clone(),
            total_issues: records.len(),
            weeks: group_by_week(records),
        };

        progress.finish();

        Ok(report)
    }

    /// Search one repository and compute a record per closed issue.
    async fn collect_repo(
        &self,
        repo: &str,
        since: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<IssueCycleRecord>> {
        let repo_id = self
            .github
            .fetch_repo_id(repo)
            .await
            .with_context(|| format!("Failed to resolve repository id for {repo}"))?;

        let issues = self
            .github
            .search_closed_issues(repo, since, until, &self.config.exclude_labels)
            .await
            .with_context(|| format!("Issue search failed for {repo}"))?;

        info!("{repo}: {} closed issues in range", issues.len());

        let issue_futures: Vec<_> = issues
            .into_iter()
            .filter_map(to_closed_issue)
            .map(|issue| self.issue_record(repo_id, issue))
            .collect();

        Ok(futures::future::join_all(issue_futures).await)
    }

    /// Fetch one issue's board events and compute its cycle record.
    ///
    /// A failed event fetch is logged and treated as an empty history, so
    /// the issue still appears in the report with no stage durations.
    async fn issue_record(&self, repo_id: u64, issue: ClosedIssue) -> IssueCycleRecord {
        let events = match self.zenhub.fetch_issue_events(repo_id, issue.number).await {
            Ok(events) => events,
            Err(e) => {
                warn!(
                    "Failed to fetch board events for issue #{}: {e}; reporting it without stage times",
                    issue.number
                );
                vec![]
            }
        };

        let transfers = stage_transfers(events);

        calculate_stage_times(
            &issue,
            &transfers,
            &self.config.pipelines,
            &self.config.end_pipeline,
        )
    }
}

/// Drops issues the search returned without a closure timestamp; the query
/// asks for closed issues only, so this is a data oddity worth a warning.
fn to_closed_issue(issue: GitHubIssue) -> Option<ClosedIssue> {
    let Some(closed_at) = issue.closed_at else {
        warn!("Issue #{} has no closed_at timestamp, skipping", issue.number);
        return None;
    };

    Some(ClosedIssue {
        number: issue.number,
        title: issue.title,
        closed_at,
        assignees: issue.assignees.into_iter().map(|a| a.login).collect(),
    })
}
