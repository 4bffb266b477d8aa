use crate::providers::zenhub::types::IssueEvent;

/// Kind tag the board service uses for stage moves.
const TRANSFER_EVENT: &str = "transferIssue";

/// Keeps only stage-transfer events, in the order the API returned them.
///
/// Board event history mixes estimate changes, epic moves and stage
/// transfers; only transfers matter for cycle times.
pub fn stage_transfers(events: Vec<IssueEvent>) -> Vec<IssueEvent> {
    events
        .into_iter()
        .filter(|event| event.event_type == TRANSFER_EVENT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::zenhub::types::PipelineRef;
    use chrono::{TimeZone, Utc};

    fn event(event_type: &str, to: &str) -> IssueEvent {
        IssueEvent {
            event_type: event_type.to_string(),
            from_pipeline: None,
            to_pipeline: Some(PipelineRef {
                name: to.to_string(),
            }),
            created_at: Utc.with_ymd_and_hms(2026, 8, 24, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn keeps_only_transfer_events() {
        let events = vec![
            event("estimateIssue", "Backlog"),
            event("transferIssue", "In Progress"),
            event("addIssueToEpic", "Backlog"),
            event("transferIssue", "Done"),
        ];

        let transfers = stage_transfers(events);

        assert_eq!(transfers.len(), 2);
        assert_eq!(
            transfers[0].to_pipeline.as_ref().unwrap().name,
            "In Progress"
        );
        assert_eq!(transfers[1].to_pipeline.as_ref().unwrap().name, "Done");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(stage_transfers(vec![]).is_empty());
    }

    #[test]
    fn preserves_source_order() {
        let events = vec![
            event("transferIssue", "Done"),
            event("transferIssue", "In Progress"),
        ];

        let transfers = stage_transfers(events);

        assert_eq!(transfers[0].to_pipeline.as_ref().unwrap().name, "Done");
        assert_eq!(
            transfers[1].to_pipeline.as_ref().unwrap().name,
            "In Progress"
        );
    }
}
