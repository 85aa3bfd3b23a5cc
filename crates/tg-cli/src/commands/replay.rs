//! Replay command: drives a timeline with a scripted gesture sequence.
//!
//! Each emitted intent is written to the event store and the refreshed event
//! list is handed back to the timeline, the way a real host would.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, NaiveTime};
use serde::Deserialize;
use tg_core::{Intent, Point, RecurrenceChoice, Timeline};
use tracing::debug;

use crate::store::EventStore;

use super::layout::{format_layout, format_layout_json};

/// A gesture script file.
#[derive(Debug, Deserialize)]
pub struct ReplayScript {
    pub steps: Vec<Step>,
}

/// One scripted input. Coordinates are viewport pixels.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Tap { x: f64, y: f64 },
    Press { x: f64, y: f64 },
    Drag { x: f64, y: f64 },
    Release { x: f64, y: f64 },
    Cancel,
    Choose { choice: RecurrenceChoice },
    Scroll { dx: f64, dy: f64 },
    ScrollToTime { time: NaiveTime },
    Zoom { hour_height: f64 },
    Tick { now: NaiveDateTime },
}

/// An intent produced while replaying.
#[derive(Debug, Clone, PartialEq)]
pub struct Emitted {
    /// 1-based step number.
    pub step: usize,
    pub intent: Intent,
    /// Whether the event store accepted it.
    pub stored: bool,
}

pub fn load_script(path: &Path) -> Result<ReplayScript> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid script {}", path.display()))
}

/// Runs every step against `timeline`, storing intents in `store`.
pub fn replay(timeline: &mut Timeline, store: &mut EventStore, steps: &[Step]) -> Vec<Emitted> {
    let mut emitted = Vec::new();
    for (idx, step) in steps.iter().enumerate() {
        debug!(step = idx + 1, ?step, "replaying");
        let intent = match *step {
            Step::Tap { x, y } => {
                timeline.tap(Point::new(x, y));
                None
            }
            Step::Press { x, y } => {
                timeline.begin_gesture(Point::new(x, y));
                None
            }
            Step::Drag { x, y } => {
                timeline.update_gesture(Point::new(x, y));
                None
            }
            Step::Release { x, y } => timeline.end_gesture(Point::new(x, y)),
            Step::Cancel => {
                timeline.cancel_gesture();
                None
            }
            Step::Choose { choice } => timeline.resolve_recurrence(choice),
            Step::Scroll { dx, dy } => {
                timeline.scroll_by(Point::new(dx, dy));
                None
            }
            Step::ScrollToTime { time } => {
                timeline.scroll_to_time(time);
                None
            }
            Step::Zoom { hour_height } => {
                timeline.zoom(hour_height);
                None
            }
            Step::Tick { now } => {
                timeline.tick(now);
                None
            }
        };

        if let Some(intent) = intent {
            let range = *timeline.model().range();
            let stored = store.apply(&intent, &range);
            if stored {
                timeline.set_events(store.occurrences(&range));
            }
            emitted.push(Emitted {
                step: idx + 1,
                intent,
                stored,
            });
        }
    }
    emitted
}

/// One line per emitted intent: step number, then the intent as JSON.
pub fn format_transcript(emitted: &[Emitted]) -> Result<String> {
    let mut lines = Vec::with_capacity(emitted.len());
    for entry in emitted {
        let json = serde_json::to_string(&entry.intent)?;
        let note = if entry.stored { "" } else { "  (not stored)" };
        lines.push(format!("#{} {json}{note}", entry.step));
    }
    Ok(lines.join("\n"))
}

/// Runs the replay command.
pub fn run(
    timeline: &mut Timeline,
    store: &mut EventStore,
    script: &Path,
    json: bool,
) -> Result<()> {
    let script = load_script(script)?;
    let emitted = replay(timeline, store, &script.steps);

    if json {
        println!("{}", format_layout_json(timeline)?);
        return Ok(());
    }
    if emitted.is_empty() {
        println!("No intents emitted.");
    } else {
        println!("{}", format_transcript(&emitted)?);
    }
    println!();
    print!("{}", format_layout(timeline));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use insta::assert_snapshot;
    use tg_core::{DayRange, Size, TimelineConfig};

    use crate::store::{EventRecord, Repeat};

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn record(id: &str, start: NaiveDateTime, end: NaiveDateTime) -> EventRecord {
        EventRecord {
            id: id.to_string(),
            title: id.to_string(),
            start,
            end,
            all_day: false,
            color: None,
            repeat: None,
        }
    }

    /// A week in a viewport tall enough to skip vertical scrolling: the
    /// canvas starts at (56, 68) and one pixel is one minute.
    fn setup(records: Vec<EventRecord>) -> (Timeline, EventStore) {
        let store = EventStore::from_records(records);
        let range = DayRange::starting(NaiveDate::from_ymd_opt(2025, 1, 13).unwrap(), 7).unwrap();
        let mut timeline =
            Timeline::new(TimelineConfig::default(), range, Size::new(896.0, 1600.0)).unwrap();
        timeline.set_events(store.occurrences(&range));
        (timeline, store)
    }

    fn steps(json: &str) -> Vec<Step> {
        serde_json::from_str::<ReplayScript>(json).unwrap().steps
    }

    #[test]
    fn test_move_is_stored_and_echoed_back() {
        let (mut timeline, mut store) = setup(vec![record("plan", at(13, 9, 0), at(13, 10, 0))]);

        // Grab 9:30 on Monday, drop one column right and one hour down.
        let emitted = replay(
            &mut timeline,
            &mut store,
            &steps(
                r#"{"steps": [
                    {"op": "press", "x": 100, "y": 646},
                    {"op": "drag", "x": 160, "y": 680},
                    {"op": "release", "x": 220, "y": 706}
                ]}"#,
            ),
        );

        assert_eq!(emitted.len(), 1);
        assert!(emitted[0].stored);
        let event = timeline.model().events()[0].clone();
        assert_eq!((event.start, event.end), (at(14, 10, 0), at(14, 11, 0)));
        assert_snapshot!(format_transcript(&emitted).unwrap(), @r#"#3 {"kind":"move","event_id":"plan","new_start":"2025-01-14T10:00:00","new_end":"2025-01-14T11:00:00","scope":"this_event"}"#);
    }

    #[test]
    fn test_recurring_move_waits_for_choice() {
        let mut standup = record("standup", at(13, 9, 0), at(13, 9, 30));
        standup.repeat = Some(Repeat::Daily);
        let (mut timeline, mut store) = setup(vec![standup]);

        let emitted = replay(
            &mut timeline,
            &mut store,
            &steps(
                r#"{"steps": [
                    {"op": "press", "x": 100, "y": 626},
                    {"op": "release", "x": 100, "y": 686},
                    {"op": "choose", "choice": "this_event_only"}
                ]}"#,
            ),
        );

        assert_eq!(emitted.len(), 2);
        assert!(emitted[0].intent.needs_disambiguation());
        assert!(!emitted[0].stored);
        assert!(emitted[1].stored);

        let events = timeline.model().events();
        let monday = events.iter().find(|e| e.id.as_str() == "standup@2025-01-13").unwrap();
        assert_eq!(monday.start, at(13, 10, 0));
        let tuesday = events.iter().find(|e| e.id.as_str() == "standup@2025-01-14").unwrap();
        assert_eq!(tuesday.start, at(14, 9, 0));
    }

    #[test]
    fn test_cancel_and_chrome_release_emit_nothing() {
        let (mut timeline, mut store) = setup(vec![record("plan", at(13, 9, 0), at(13, 10, 0))]);

        let emitted = replay(
            &mut timeline,
            &mut store,
            &steps(
                r#"{"steps": [
                    {"op": "press", "x": 100, "y": 646},
                    {"op": "drag", "x": 400, "y": 900},
                    {"op": "cancel"},
                    {"op": "press", "x": 100, "y": 646},
                    {"op": "release", "x": 20, "y": 300},
                    {"op": "scroll_to_time", "time": "08:00:00"},
                    {"op": "zoom", "hour_height": 90},
                    {"op": "tick", "now": "2025-01-15T12:00:00"}
                ]}"#,
            ),
        );

        assert!(emitted.is_empty());
        assert_eq!(timeline.model().events()[0].start, at(13, 9, 0));
        assert_eq!(timeline.render().now.map(|n| n.day_index), Some(2));
    }

    #[test]
    fn test_load_script_rejects_unknown_ops() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.json");
        std::fs::write(&path, r#"{"steps": [{"op": "wiggle"}]}"#).unwrap();

        let err = load_script(&path).unwrap_err();
        assert!(err.to_string().contains("invalid script"));
    }
}
