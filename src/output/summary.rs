use std::fmt::Write;

use crate::dates::format_date_iso;
use crate::metrics::{CycleTimeReport, DurationWords, IssueCycleRecord, WeekSummary};

use super::styling::{bright, bright_yellow, cyan, dim};
use super::tables::{color_coded_cycle_time_cell, create_table, cyan_header};

/// Prints a human-readable cycle time report to stdout.
///
/// Shows an overview (repositories, issue count), then one line per ISO
/// week with the average cycle time. With `print_issue_details` set, each
/// week also gets a table breaking every issue down by pipeline stage.
pub fn print_summary(report: &CycleTimeReport, print_issue_details: bool) {
    println!("{}", render_summary(report, print_issue_details));
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

/// The fixed weekly sentence; keep wording stable, dashboards scrape it.
fn week_sentence(week: &WeekSummary) -> String {
    let DurationWords {
        days,
        hours,
        minutes,
    } = week.average;
    format!(
        "Average cycle time for {} issues in week {} is {} days, {} hours and {} minutes.",
        week.issue_count, week.week, days, hours, minutes
    )
}

fn render_summary(report: &CycleTimeReport, print_issue_details: bool) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "📊", "Overview");
    let _ = writeln!(
        output,
        "  {} {}\n  {} {}\n  {} {}\n",
        dim("Repositories:"),
        cyan(report.repos.join(", ")),
        dim("Closed issues analyzed:"),
        bright_yellow(report.total_issues),
        dim("Generated:"),
        bright_yellow(format_date_iso(report.generated_at)),
    );

    add_section_header(&mut output, "📅", "Weekly cycle times");
    if report.weeks.is_empty() {
        let _ = writeln!(output, "  {}", dim("No closed issues in range."));
    }
    for week in &report.weeks {
        let _ = writeln!(output, "  {}", week_sentence(week));
        if print_issue_details {
            let _ = writeln!(output, "{}", render_week_details(week));
        }
    }

    output
}

fn render_week_details(week: &WeekSummary) -> String {
    let mut table = create_table();
    table.set_header(cyan_header(&[
        "Issue",
        "Title",
        "Assignees",
        "Closed",
        "Stages",
        "Cycle time",
    ]));

    for issue in &week.issues {
        let total = issue.total_seconds().unwrap_or(0);
        let total_words = DurationWords::from_seconds(total).to_string();
        table.add_row(vec![
            comfy_table::Cell::new(format!("#{}", issue.number)),
            comfy_table::Cell::new(&issue.title),
            comfy_table::Cell::new(issue.assignees.join(", ")),
            comfy_table::Cell::new(format_date_iso(issue.closed_at)),
            comfy_table::Cell::new(render_stages(issue)),
            color_coded_cycle_time_cell(total, &total_words),
        ]);
    }

    table.to_string()
}

fn render_stages(issue: &IssueCycleRecord) -> String {
    if issue.stage_times.is_empty() {
        return "none".to_string();
    }
    issue
        .stage_times
        .iter()
        .map(|(id, stage)| format!("{id}: {}", stage.words))
        .collect::<Vec<_>>()
        .join("\n")
}
