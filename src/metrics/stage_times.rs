use indexmap::IndexMap;
use log::warn;

use crate::providers::zenhub::types::IssueEvent;

use super::{ClosedIssue, IssueCycleRecord, PipelineDef, StageDuration};

/// Computes time spent per configured pipeline for one closed issue.
///
/// For each pipeline, entry is the first transfer whose destination stage
/// name starts with the pipeline name, exit the first transfer leaving it.
/// An issue that entered a pipeline but never left it is charged up to its
/// closure time. Pipelines the issue never entered are omitted from the map.
///
/// Bucketing into weeks uses the issue's own closure timestamp; the first
/// transfer into `end_pipeline` is only recorded as an informational
/// `done_at` marker.
pub fn calculate_stage_times(
    issue: &ClosedIssue,
    transfers: &[IssueEvent],
    pipelines: &[PipelineDef],
    end_pipeline: &str,
) -> IssueCycleRecord {
    let mut stage_times = IndexMap::new();

    for pipeline in pipelines {
        let Some(entry) = find_entry(transfers, &pipeline.name) else {
            continue;
        };

        // No exit transfer means the issue was still in this stage when it
        // was closed; the closure time stands in for the exit.
        let exit_at = find_exit(transfers, &pipeline.name)
            .map(|event| event.created_at)
            .unwrap_or(issue.closed_at);

        let seconds = (exit_at - entry.created_at).num_seconds();
        if seconds < 0 {
            warn!(
                "issue #{}: negative duration ({seconds}s) in pipeline '{}', out-of-order event data; skipping stage",
                issue.number, pipeline.name
            );
            continue;
        }

        #[allow(clippy::cast_sign_loss)]
        stage_times.insert(pipeline.id.clone(), StageDuration::from_seconds(seconds as u64));
    }

    let done_at = find_entry(transfers, end_pipeline).map(|event| event.created_at);

    IssueCycleRecord {
        number: issue.number,
        title: issue.title.clone(),
        assignees: issue.assignees.clone(),
        closed_at: issue.closed_at,
        done_at,
        stage_times,
    }
}

/// First transfer into a stage whose name starts with `pipeline_name`.
/// Transfers without a destination (malformed event data) are skipped.
fn find_entry<'a>(transfers: &'a [IssueEvent], pipeline_name: &str) -> Option<&'a IssueEvent> {
    transfers.iter().find(|event| {
        event
            .to_pipeline
            .as_ref()
            .is_some_and(|p| p.name.starts_with(pipeline_name))
    })
}

/// First transfer out of a stage whose name starts with `pipeline_name`.
fn find_exit<'a>(transfers: &'a [IssueEvent], pipeline_name: &str) -> Option<&'a IssueEvent> {
    transfers.iter().find(|event| {
        event
            .from_pipeline
            .as_ref()
            .is_some_and(|p| p.name.starts_with(pipeline_name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::zenhub::types::PipelineRef;
    use chrono::{DateTime, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 24, 9, 0, 0).unwrap()
    }

    fn transfer(from: Option<&str>, to: Option<&str>, at: DateTime<Utc>) -> IssueEvent {
        IssueEvent {
            event_type: "transferIssue".to_string(),
            from_pipeline: from.map(|name| PipelineRef {
                name: name.to_string(),
            }),
            to_pipeline: to.map(|name| PipelineRef {
                name: name.to_string(),
            }),
            created_at: at,
        }
    }

    fn issue(closed_at: DateTime<Utc>) -> ClosedIssue {
        ClosedIssue {
            number: 42,
            title: "add feature".to_string(),
            assignees: vec!["alice".to_string()],
            closed_at,
        }
    }

    fn pipelines() -> Vec<PipelineDef> {
        vec![
            PipelineDef {
                name: "In Progress".to_string(),
                id: "in-progress".to_string(),
            },
            PipelineDef {
                name: "Review".to_string(),
                id: "review".to_string(),
            },
        ]
    }

    #[test]
    fn entry_and_exit_give_their_difference() {
        let entry_at = t0();
        let exit_at = t0() + chrono::Duration::seconds(3661);
        let transfers = vec![
            transfer(Some("Backlog"), Some("In Progress"), entry_at),
            transfer(Some("In Progress"), Some("Done"), exit_at),
        ];

        let record = calculate_stage_times(
            &issue(t0() + chrono::Duration::days(1)),
            &transfers,
            &pipelines(),
            "Done",
        );

        let stage = &record.stage_times["in-progress"];
        assert_eq!(stage.seconds, 3661);
        assert_eq!(stage.words, "1 hour 1 minute");
    }

    #[test]
    fn missing_exit_falls_back_to_closure_time() {
        let closed_at = t0() + chrono::Duration::seconds(7200);
        let transfers = vec![transfer(Some("Backlog"), Some("In Progress"), t0())];

        let record = calculate_stage_times(&issue(closed_at), &transfers, &pipelines(), "Done");

        assert_eq!(record.stage_times["in-progress"].seconds, 7200);
        assert_eq!(record.stage_times["in-progress"].words, "2 hours");
    }

    #[test]
    fn unvisited_pipelines_are_omitted() {
        let transfers = vec![
            transfer(Some("Backlog"), Some("In Progress"), t0()),
            transfer(Some("In Progress"), Some("Done"), t0() + chrono::Duration::hours(1)),
        ];

        let record = calculate_stage_times(&issue(t0()), &transfers, &pipelines(), "Done");

        assert!(record.stage_times.contains_key("in-progress"));
        assert!(!record.stage_times.contains_key("review"));
    }

    #[test]
    fn no_transfers_yield_empty_record() {
        let record = calculate_stage_times(&issue(t0()), &[], &pipelines(), "Done");

        assert!(record.stage_times.is_empty());
        assert_eq!(record.total_seconds(), None);
        assert!(record.done_at.is_none());
    }

    #[test]
    fn pipeline_name_matches_decorated_stage_names() {
        let transfers = vec![
            transfer(None, Some("In Progress 🚀 (3)"), t0()),
            transfer(
                Some("In Progress 🚀 (3)"),
                Some("Done"),
                t0() + chrono::Duration::minutes(30),
            ),
        ];

        let record = calculate_stage_times(&issue(t0()), &transfers, &pipelines(), "Done");

        assert_eq!(record.stage_times["in-progress"].seconds, 1800);
    }

    #[test]
    fn events_with_missing_stage_names_are_skipped() {
        let entry_at = t0() + chrono::Duration::hours(1);
        let transfers = vec![
            transfer(Some("Backlog"), None, t0()),
            transfer(None, Some("In Progress"), entry_at),
            transfer(
                Some("In Progress"),
                None,
                entry_at + chrono::Duration::hours(2),
            ),
        ];

        let record = calculate_stage_times(&issue(t0()), &transfers, &pipelines(), "Done");

        assert_eq!(record.stage_times["in-progress"].seconds, 7200);
    }

    #[test]
    fn negative_duration_is_not_reported() {
        // exit precedes entry: out-of-order data from the API
        let transfers = vec![
            transfer(Some("In Progress"), Some("Done"), t0()),
            transfer(
                Some("Backlog"),
                Some("In Progress"),
                t0() + chrono::Duration::hours(1),
            ),
        ];

        let record = calculate_stage_times(&issue(t0()), &transfers, &pipelines(), "Done");

        assert!(!record.stage_times.contains_key("in-progress"));
    }

    #[test]
    fn records_first_transfer_into_end_pipeline() {
        let done_at = t0() + chrono::Duration::hours(5);
        let transfers = vec![
            transfer(Some("Backlog"), Some("In Progress"), t0()),
            transfer(Some("In Progress"), Some("Done ✅"), done_at),
        ];

        let record = calculate_stage_times(&issue(t0()), &transfers, &pipelines(), "Done");

        assert_eq!(record.done_at, Some(done_at));
    }

    #[test]
    fn stage_map_keeps_configuration_order() {
        let transfers = vec![
            // Review visited before In Progress, config order must still win
            transfer(None, Some("Review"), t0()),
            transfer(Some("Review"), Some("In Progress"), t0() + chrono::Duration::hours(1)),
            transfer(Some("In Progress"), Some("Done"), t0() + chrono::Duration::hours(2)),
        ];

        let record = calculate_stage_times(&issue(t0()), &transfers, &pipelines(), "Done");

        let keys: Vec<_> = record.stage_times.keys().cloned().collect();
        assert_eq!(keys, vec!["in-progress", "review"]);
    }
}
