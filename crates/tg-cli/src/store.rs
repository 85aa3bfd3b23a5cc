//! In-memory event store backing the CLI.
//!
//! Events are read from a JSON array. A record may carry a naive `repeat`
//! rule; its occurrences get ids of the form `series@YYYY-MM-DD` so a single
//! occurrence can be edited on its own.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tg_core::{CalendarEvent, ChangeScope, ColorToken, DayRange, EventId, Intent};
use tracing::{debug, warn};

/// Safety stop for expanding a repeat rule.
const MAX_OCCURRENCES: u32 = 100_000;

/// How a series repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Repeat {
    /// Start of the `n`th occurrence after `anchor`.
    fn nth(self, anchor: NaiveDateTime, n: u32) -> Option<NaiveDateTime> {
        match self {
            Self::Daily => anchor.checked_add_signed(Duration::days(i64::from(n))),
            Self::Weekly => anchor.checked_add_signed(Duration::weeks(i64::from(n))),
            Self::Monthly => anchor.checked_add_months(Months::new(n)),
            Self::Yearly => anchor.checked_add_months(Months::new(n.checked_mul(12)?)),
        }
    }
}

/// One record of the events file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub repeat: Option<Repeat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Interval {
    start: NaiveDateTime,
    end: NaiveDateTime,
    all_day: bool,
}

#[derive(Debug, Clone)]
struct Series {
    id: EventId,
    title: String,
    interval: Interval,
    color: Option<ColorToken>,
    repeat: Option<Repeat>,
}

impl Series {
    fn from_record(record: EventRecord) -> Result<Self> {
        let id = EventId::new(record.id)?;
        let color = record.color.map(ColorToken::new).transpose()?;
        Ok(Self {
            id,
            title: record.title,
            interval: Interval {
                start: record.start,
                end: record.end,
                all_day: record.all_day,
            },
            color,
            repeat: record.repeat,
        })
    }

    fn occurrence(&self, id: EventId, interval: Interval) -> CalendarEvent {
        CalendarEvent {
            id,
            title: self.title.clone(),
            start: interval.start,
            end: interval.end,
            is_all_day: interval.all_day,
            color: self.color.clone(),
            is_recurring: self.repeat.is_some(),
        }
    }
}

/// Events keyed by series, plus per-occurrence overrides.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    series: Vec<Series>,
    overrides: BTreeMap<EventId, Interval>,
}

impl EventStore {
    /// Reads an events file. Unusable records are skipped with a warning.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read events from {}", path.display()))?;
        let records: Vec<EventRecord> = serde_json::from_str(&content)
            .with_context(|| format!("invalid events file {}", path.display()))?;
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<EventRecord>) -> Self {
        let mut series = Vec::with_capacity(records.len());
        for (idx, record) in records.into_iter().enumerate() {
            if record.end < record.start {
                warn!(record = idx + 1, id = %record.id, "event ends before it starts; skipped");
                continue;
            }
            match Series::from_record(record) {
                Ok(s) => series.push(s),
                Err(err) => warn!(record = idx + 1, error = %err, "invalid event skipped"),
            }
        }
        debug!(series = series.len(), "loaded events");
        Self {
            series,
            overrides: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Every occurrence touching `range`, sorted by start.
    pub fn occurrences(&self, range: &DayRange) -> Vec<CalendarEvent> {
        let (from, to) = (range.start_instant(), range.end_instant());
        let mut events = Vec::new();
        for series in &self.series {
            let Some(repeat) = series.repeat else {
                let interval = self
                    .overrides
                    .get(&series.id)
                    .copied()
                    .unwrap_or(series.interval);
                events.push(series.occurrence(series.id.clone(), interval));
                continue;
            };

            let duration = series.interval.end - series.interval.start;
            for n in 0..MAX_OCCURRENCES {
                let Some(start) = repeat.nth(series.interval.start, n) else {
                    break;
                };
                if start >= to {
                    break;
                }
                let Ok(id) = EventId::new(format!("{}@{}", series.id, start.date())) else {
                    continue;
                };
                let interval = self.overrides.get(&id).copied().unwrap_or(Interval {
                    start,
                    end: start + duration,
                    all_day: series.interval.all_day,
                });
                events.push(series.occurrence(id, interval));
            }
        }
        events.retain(|e| e.start < to && e.end >= from);
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        events
    }

    /// Persists an edit. Returns `false` when the target is unknown or the
    /// intent is a recurrence question.
    ///
    /// A single occurrence of a series is stored as an override. A change to
    /// future occurrences moves the whole series by the same offset and takes
    /// on the new duration.
    pub fn apply(&mut self, intent: &Intent, range: &DayRange) -> bool {
        if intent.needs_disambiguation() {
            return false;
        }
        let Some(current) = self
            .occurrences(range)
            .into_iter()
            .find(|e| &e.id == intent.event_id())
        else {
            warn!(event_id = %intent.event_id(), "edit for unknown event ignored");
            return false;
        };
        let before = Interval {
            start: current.start,
            end: current.end,
            all_day: current.is_all_day,
        };
        let Some(after) = edited(before, intent) else {
            return false;
        };

        let Some(idx) = self.series_index(&current.id) else {
            return false;
        };
        let series = &mut self.series[idx];

        match (series.repeat, intent.scope().unwrap_or_default()) {
            (None, _) => series.interval = after,
            (Some(_), ChangeScope::ThisEvent) => {
                self.overrides.insert(current.id.clone(), after);
            }
            (Some(_), ChangeScope::FutureEvents) => {
                let start = series.interval.start + (after.start - before.start);
                series.interval = Interval {
                    start,
                    end: start + (after.end - after.start),
                    all_day: after.all_day,
                };
            }
        }
        debug!(event_id = %current.id, ?intent, "edit stored");
        true
    }

    /// The series an occurrence id belongs to.
    ///
    /// Ids are opaque, so a plain event whose id contains `@` matches as is.
    /// Only repeating series hand out `series@date` ids.
    fn series_index(&self, id: &EventId) -> Option<usize> {
        self.series
            .iter()
            .position(|s| s.repeat.is_none() && s.id == *id)
            .or_else(|| {
                let (series_id, _) = id.as_str().rsplit_once('@')?;
                self.series
                    .iter()
                    .position(|s| s.repeat.is_some() && s.id.as_str() == series_id)
            })
    }
}

/// The interval `intent` turns `before` into.
fn edited(before: Interval, intent: &Intent) -> Option<Interval> {
    match intent {
        Intent::Move {
            new_start, new_end, ..
        } => Some(Interval {
            start: *new_start,
            end: *new_end,
            all_day: false,
        }),
        Intent::Resize {
            new_start, new_end, ..
        } => {
            let start = new_start.unwrap_or(before.start);
            let end = new_end.unwrap_or(before.end);
            (start < end).then_some(Interval {
                start,
                end,
                all_day: false,
            })
        }
        Intent::ConvertToAllDay { date, .. } => {
            let start = tg_core::types::day_start(*date);
            Some(Interval {
                start,
                end: start + Duration::days(1),
                all_day: true,
            })
        }
        Intent::RecurrenceDisambiguationNeeded { .. } => None,
    }
}
