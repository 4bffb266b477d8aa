mod events;
mod stage_times;
mod weekly;

pub use events::stage_transfers;
pub use stage_times::calculate_stage_times;
pub use weekly::group_by_week;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A closed issue as returned by the issue search, stripped down to the
/// fields the cycle time calculation needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedIssue {
    pub number: u64,
    pub title: String,
    pub closed_at: DateTime<Utc>,
    pub assignees: Vec<String>,
}

/// A named pipeline stage to measure, in priority order.
///
/// `name` is matched as a prefix of live stage names, since boards decorate
/// column names with emoji and numbering. `id` is the stable key used in
/// reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PipelineDef {
    pub name: String,
    pub id: String,
}

/// Seconds spent in one pipeline stage, with a human-readable rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDuration {
    pub seconds: u64,
    pub words: String,
}

impl StageDuration {
    pub fn from_seconds(seconds: u64) -> Self {
        Self {
            seconds,
            words: DurationWords::from_seconds(seconds).to_string(),
        }
    }
}

/// Per-issue cycle time breakdown.
///
/// `stage_times` is keyed by pipeline id and keeps configuration order.
/// An issue that never entered any configured pipeline has an empty map and
/// no total; it is excluded from weekly averages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueCycleRecord {
    pub number: u64,
    pub title: String,
    pub assignees: Vec<String>,
    pub closed_at: DateTime<Utc>,
    /// When the issue first entered the configured end pipeline, if it did.
    pub done_at: Option<DateTime<Utc>>,
    pub stage_times: IndexMap<String, StageDuration>,
}

impl IssueCycleRecord {
    /// Sum of all recorded stage durations. Time between stages is not
    /// charged to any pipeline and does not count towards the total.
    pub fn total_seconds(&self) -> Option<u64> {
        if self.stage_times.is_empty() {
            return None;
        }
        Some(self.stage_times.values().map(|s| s.seconds).sum())
    }
}

/// Aggregated cycle times for one ISO week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekSummary {
    /// Week key, e.g. `2026-W35`.
    pub week: String,
    /// Number of issues with at least one recorded stage duration.
    pub issue_count: usize,
    pub average_seconds: f64,
    pub average: DurationWords,
    pub issues: Vec<IssueCycleRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CycleTimeReport {
    pub generated_at: DateTime<Utc>,
    pub repos: Vec<String>,
    pub total_issues: usize,
    pub weeks: Vec<WeekSummary>,
}

/// A seconds count broken into days, hours and minutes by floor division.
/// Seconds below a full minute are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationWords {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
}

impl DurationWords {
    pub fn from_seconds(seconds: u64) -> Self {
        let days = seconds / 86_400;
        let remainder = seconds % 86_400;
        Self {
            days,
            hours: remainder / 3_600,
            minutes: remainder % 3_600 / 60,
        }
    }
}

impl std::fmt::Display for DurationWords {
    /// Compact rendering that drops zero-valued units: `1 hour 1 minute`,
    /// `2 days 5 minutes`. All-zero durations render as `0 minutes`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        for (value, unit) in [
            (self.days, "day"),
            (self.hours, "hour"),
            (self.minutes, "minute"),
        ] {
            if value > 0 {
                let plural = if value == 1 { "" } else { "s" };
                parts.push(format!("{value} {unit}{plural}"));
            }
        }
        if parts.is_empty() {
            return f.write_str("0 minutes");
        }
        f.write_str(&parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn breaks_seconds_into_units_by_floor_division() {
        let words = DurationWords::from_seconds(3661);
        assert_eq!(words.days, 0);
        assert_eq!(words.hours, 1);
        assert_eq!(words.minutes, 1);
    }

    #[test]
    fn handles_multi_day_durations() {
        // 2 days, 3 hours, 4 minutes and 5 seconds
        let words = DurationWords::from_seconds(2 * 86_400 + 3 * 3_600 + 4 * 60 + 5);
        assert_eq!(words.days, 2);
        assert_eq!(words.hours, 3);
        assert_eq!(words.minutes, 4);
    }

    #[test]
    fn renders_compact_words() {
        assert_eq!(DurationWords::from_seconds(3661).to_string(), "1 hour 1 minute");
        assert_eq!(DurationWords::from_seconds(7200).to_string(), "2 hours");
        assert_eq!(
            DurationWords::from_seconds(2 * 86_400 + 300).to_string(),
            "2 days 5 minutes"
        );
        assert_eq!(DurationWords::from_seconds(59).to_string(), "0 minutes");
        assert_eq!(DurationWords::from_seconds(0).to_string(), "0 minutes");
    }

    #[test]
    fn units_rederive_seconds_within_a_minute() {
        for seconds in [0, 59, 60, 3661, 7200, 86_399, 86_400, 1_234_567] {
            let words = DurationWords::from_seconds(seconds);
            let rederived = words.days * 86_400 + words.hours * 3_600 + words.minutes * 60;
            assert!(rederived <= seconds);
            assert!(seconds - rederived < 60);
        }
    }

    #[test]
    fn total_is_none_without_stage_times() {
        let record = IssueCycleRecord {
            number: 1,
            title: "no transitions".to_string(),
            assignees: vec![],
            closed_at: Utc.with_ymd_and_hms(2026, 8, 24, 12, 0, 0).unwrap(),
            done_at: None,
            stage_times: IndexMap::new(),
        };
        assert_eq!(record.total_seconds(), None);
    }

    #[test]
    fn total_sums_all_stages() {
        let mut stage_times = IndexMap::new();
        stage_times.insert("in-progress".to_string(), StageDuration::from_seconds(3600));
        stage_times.insert("review".to_string(), StageDuration::from_seconds(1800));
        let record = IssueCycleRecord {
            number: 2,
            title: "two stages".to_string(),
            assignees: vec!["alice".to_string()],
            closed_at: Utc.with_ymd_and_hms(2026, 8, 24, 12, 0, 0).unwrap(),
            done_at: None,
            stage_times,
        };
        assert_eq!(record.total_seconds(), Some(5400));
    }
}
