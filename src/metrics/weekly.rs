use std::collections::BTreeMap;

use crate::dates::iso_week_key;

use super::{DurationWords, IssueCycleRecord, WeekSummary};

/// Buckets issue records by the ISO week of their closure and averages the
/// total cycle time per week.
///
/// Issues without any recorded stage duration stay listed in their week but
/// count neither towards the sum nor the divisor. Weeks come out ascending
/// by week key.
pub fn group_by_week(records: Vec<IssueCycleRecord>) -> Vec<WeekSummary> {
    let mut by_week: BTreeMap<String, Vec<IssueCycleRecord>> = BTreeMap::new();
    for record in records {
        by_week
            .entry(iso_week_key(record.closed_at))
            .or_default()
            .push(record);
    }

    by_week
        .into_iter()
        .map(|(week, issues)| summarize_week(week, issues))
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn summarize_week(week: String, issues: Vec<IssueCycleRecord>) -> WeekSummary {
    let totals: Vec<u64> = issues
        .iter()
        .filter_map(IssueCycleRecord::total_seconds)
        .collect();

    // Guard the empty case instead of dividing by zero.
    let average_seconds = if totals.is_empty() {
        0.0
    } else {
        totals.iter().sum::<u64>() as f64 / totals.len() as f64
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let average = DurationWords::from_seconds(average_seconds as u64);

    WeekSummary {
        week,
        issue_count: totals.len(),
        average_seconds,
        average,
        issues,
    }
}
