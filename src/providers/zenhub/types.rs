use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of a board's event history for an issue.
///
/// The history mixes several event kinds; only `transferIssue` events carry
/// pipeline moves. Pipeline refs are optional because live event data is
/// occasionally missing one side of a transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub from_pipeline: Option<PipelineRef>,
    pub to_pipeline: Option<PipelineRef>,
    pub created_at: DateTime<Utc>,
}

/// A board pipeline as referenced from an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRef {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_wire_event() {
        let event: IssueEvent = serde_json::from_str(
            r#"{
                "user_id": 1,
                "type": "transferIssue",
                "from_pipeline": {"name": "Backlog"},
                "to_pipeline": {"name": "In Progress"},
                "created_at": "2026-08-24T09:00:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(event.event_type, "transferIssue");
        assert_eq!(event.from_pipeline.unwrap().name, "Backlog");
        assert_eq!(event.to_pipeline.unwrap().name, "In Progress");
    }

    #[test]
    fn tolerates_missing_pipelines() {
        let event: IssueEvent = serde_json::from_str(
            r#"{"type": "estimateIssue", "created_at": "2026-08-24T09:00:00Z"}"#,
        )
        .unwrap();

        assert!(event.from_pipeline.is_none());
        assert!(event.to_pipeline.is_none());
    }
}
