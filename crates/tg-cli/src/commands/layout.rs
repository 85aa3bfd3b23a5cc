//! Layout command: prints the per-day layout of a range.

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use tg_core::{ColumnAssignment, Segment, Timeline, TimelineModel};

// ========== Human-Readable Output ==========

/// Width of the title column before it gets truncated.
const TITLE_WIDTH: usize = 20;

/// Wall-clock label of `t` on `day`; the closing midnight reads `24:00`.
fn clock(t: NaiveDateTime, day: NaiveDate) -> String {
    if t.date() > day {
        "24:00".to_string()
    } else {
        t.format("%H:%M").to_string()
    }
}

fn title_of(model: &TimelineModel, segment: &Segment) -> String {
    let title = model
        .event(&segment.event_id)
        .map_or("", |e| e.title.as_str());
    let title = if title.is_empty() {
        segment.event_id.as_str()
    } else {
        title
    };
    // Truncate by characters, not bytes
    if title.chars().count() > TITLE_WIDTH {
        format!("{}...", title.chars().take(TITLE_WIDTH - 3).collect::<String>())
    } else {
        title.to_string()
    }
}

fn all_day_row(model: &TimelineModel, segment: &Segment) -> String {
    let span = segment.day_span();
    let note = if span > 1 {
        format!(" ({span} days)")
    } else {
        String::new()
    };
    format!("  {:<11}  {}{note}", "all day", title_of(model, segment))
}

fn timed_row(model: &TimelineModel, assignment: &ColumnAssignment, day: NaiveDate) -> String {
    let segment = &assignment.segment;
    format!(
        "  {}-{}  {:<width$}  col {}/{}",
        clock(segment.start, day),
        clock(segment.end, day),
        title_of(model, segment),
        assignment.column + 1,
        assignment.column_count,
        width = TITLE_WIDTH,
    )
}

/// Format the timeline's current layout for the terminal.
pub fn format_layout(timeline: &Timeline) -> String {
    let model = timeline.model();
    let range = model.range();
    let mut lines = vec![
        format!(
            "TIMELINE {range}  ({} days, all-day lanes: {})",
            range.day_count(),
            model.all_day_lane_count()
        ),
        String::new(),
    ];

    for (date, day) in range.dates().zip(model.days()) {
        lines.push(date.format("%a %Y-%m-%d").to_string());
        if day.is_empty() {
            lines.push("  (no events)".to_string());
        }
        lines.extend(day.all_day.iter().map(|s| all_day_row(model, s)));
        lines.extend(day.timed.iter().map(|a| timed_row(model, a, date)));
        lines.push(String::new());
    }

    lines.join("\n")
}

// ========== JSON Output ==========

/// Format the full render frame as JSON.
pub fn format_layout_json(timeline: &Timeline) -> Result<String> {
    Ok(serde_json::to_string_pretty(&timeline.render())?)
}

// ========== Public Interface ==========

/// Runs the layout command.
pub fn run(timeline: &Timeline, json: bool) -> Result<()> {
    if json {
        println!("{}", format_layout_json(timeline)?);
    } else {
        print!("{}", format_layout(timeline));
    }
    Ok(())
}
