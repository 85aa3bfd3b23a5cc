//! Splitting events into per-day layout segments.
//!
//! A timed event that crosses midnight is drawn as one piece per day column.
//! Each piece keeps the source event's ID so a drag on any piece resolves back
//! to the whole event. All-day events are never split: they become a single
//! bar in the all-day row that may span several columns.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::config::TimelineConfig;
use crate::event::CalendarEvent;
use crate::types::{DayRange, EventId, day_start};

/// One day's share of an event, clipped to the day and the visible range.
///
/// Segments are ephemeral: they are rebuilt on every layout pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub event_id: EventId,
    /// Offset of the segment's day from the first visible day.
    pub day_index: usize,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub is_all_day: bool,
    /// The segment carries the event's real start (not clipped).
    pub starts_event: bool,
    /// The segment carries the event's real end (not clipped).
    pub ends_event: bool,
}

impl Segment {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Number of day columns covered. Timed segments always cover one.
    pub fn day_span(&self) -> usize {
        if !self.is_all_day {
            return 1;
        }
        let days = (self.end.date() - self.start.date()).num_days();
        usize::try_from(days).map_or(1, |d| d.max(1))
    }

    /// Whether two segments share any instant of their half-open intervals.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Splits events into per-day segments against a visible range.
#[derive(Debug, Clone, Copy)]
pub struct EventSegmenter {
    zero_duration_display: Duration,
}

impl Default for EventSegmenter {
    fn default() -> Self {
        Self::from_config(&TimelineConfig::default())
    }
}

impl EventSegmenter {
    pub fn from_config(config: &TimelineConfig) -> Self {
        Self {
            zero_duration_display: Duration::minutes(i64::from(
                config.zero_duration_display_minutes.max(1),
            )),
        }
    }

    /// Segments every event that intersects `range`.
    ///
    /// Output order follows input order, and within an event, day order.
    /// Events with `end < start` and events outside the range are dropped.
    pub fn segment(&self, events: &[CalendarEvent], range: &DayRange) -> Vec<Segment> {
        let mut segments = Vec::new();
        for event in events {
            if event.is_degenerate() {
                continue;
            }
            if event.is_all_day {
                segments.extend(all_day_segment(event, range));
            } else if event.is_zero_duration() {
                segments.extend(self.point_segment(event, range));
            } else {
                split_timed(event, range, &mut segments);
            }
        }
        segments
    }

    /// A zero-length event gets a display length for hit testing; the event
    /// itself keeps `start == end`.
    fn point_segment(&self, event: &CalendarEvent, range: &DayRange) -> Option<Segment> {
        if event.start < range.start_instant() || event.start >= range.end_instant() {
            return None;
        }
        let date = event.start.date();
        let day_end = day_start(date) + Duration::days(1);
        Some(Segment {
            event_id: event.id.clone(),
            day_index: range.index_of(date)?,
            start: event.start,
            end: (event.start + self.zero_duration_display).min(day_end),
            is_all_day: false,
            starts_event: true,
            ends_event: true,
        })
    }
}

/// Walks the day boundaries of a timed event's clipped interval.
fn split_timed(event: &CalendarEvent, range: &DayRange, out: &mut Vec<Segment>) {
    let clipped_start = event.start.max(range.start_instant());
    let clipped_end = event.end.min(range.end_instant());
    if clipped_start >= clipped_end {
        return;
    }

    let mut date = clipped_start.date();
    loop {
        let day_begin = day_start(date);
        let day_end = day_begin + Duration::days(1);
        let start = clipped_start.max(day_begin);
        let end = clipped_end.min(day_end);
        if start < end {
            if let Some(day_index) = range.index_of(date) {
                out.push(Segment {
                    event_id: event.id.clone(),
                    day_index,
                    start,
                    end,
                    is_all_day: false,
                    starts_event: start == event.start,
                    ends_event: end == event.end,
                });
            }
        }
        if day_end >= clipped_end {
            break;
        }
        let Some(next) = date.succ_opt() else {
            break;
        };
        date = next;
    }
}

/// Day-aligned bounds of an all-day event: first day and exclusive last day.
///
/// Accepts both exclusive-midnight ends and inclusive `23:59:59` style ends.
pub(crate) fn all_day_bounds(event: &CalendarEvent) -> (NaiveDate, NaiveDate) {
    let first = event.start.date();
    let end_date = event.end.date();
    let exclusive = if event.end > day_start(end_date) {
        end_date + Duration::days(1)
    } else {
        end_date
    };
    (first, exclusive.max(first + Duration::days(1)))
}

fn all_day_segment(event: &CalendarEvent, range: &DayRange) -> Option<Segment> {
    let (first, exclusive) = all_day_bounds(event);
    let range_end = range.to() + Duration::days(1);
    let clipped_first = first.max(range.from());
    let clipped_end = exclusive.min(range_end);
    if clipped_first >= clipped_end {
        return None;
    }
    Some(Segment {
        event_id: event.id.clone(),
        day_index: range.index_of(clipped_first)?,
        start: day_start(clipped_first),
        end: day_start(clipped_end),
        is_all_day: true,
        starts_event: clipped_first == first,
        ends_event: clipped_end == exclusive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        date(day).and_hms_opt(hour, minute, 0).unwrap()
    }

    fn event(id: &str, start: NaiveDateTime, end: NaiveDateTime) -> CalendarEvent {
        CalendarEvent::new(EventId::new(id).unwrap(), id, start, end)
    }

    fn week() -> DayRange {
        DayRange::starting(date(13), 7).unwrap()
    }

    #[test]
    fn single_day_event_yields_one_segment() {
        let segments =
            EventSegmenter::default().segment(&[event("a", at(14, 9, 0), at(14, 10, 0))], &week());

        assert_eq!(segments.len(), 1);
        let s = &segments[0];
        assert_eq!(s.day_index, 1);
        assert_eq!((s.start, s.end), (at(14, 9, 0), at(14, 10, 0)));
        assert!(s.starts_event && s.ends_event);
        assert!(!s.is_all_day);
    }

    #[test]
    fn overnight_event_splits_at_midnight() {
        let segments = EventSegmenter::default()
            .segment(&[event("a", at(14, 22, 0), at(16, 2, 30))], &week());

        let days: Vec<_> = segments.iter().map(|s| s.day_index).collect();
        assert_eq!(days, vec![1, 2, 3]);
        assert_eq!(segments[0].start, at(14, 22, 0));
        assert_eq!(segments[0].end, at(15, 0, 0));
        assert_eq!(segments[1].start, at(15, 0, 0));
        assert_eq!(segments[1].end, at(16, 0, 0));
        assert_eq!(segments[2].end, at(16, 2, 30));
        assert!(segments[0].starts_event && !segments[0].ends_event);
        assert!(!segments[1].starts_event && !segments[1].ends_event);
        assert!(!segments[2].starts_event && segments[2].ends_event);
    }

    #[test]
    fn event_ending_at_midnight_stays_on_one_day() {
        let segments = EventSegmenter::default()
            .segment(&[event("a", at(14, 23, 0), at(15, 0, 0))], &week());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].day_index, 1);
    }

    #[test]
    fn clips_to_visible_range() {
        let segments = EventSegmenter::default()
            .segment(&[event("a", at(11, 12, 0), at(13, 6, 0))], &week());

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].day_index, 0);
        assert_eq!(segments[0].start, at(13, 0, 0));
        assert!(!segments[0].starts_event);
        assert!(segments[0].ends_event);
    }

    #[test]
    fn drops_events_outside_range_and_degenerate_events() {
        let segments = EventSegmenter::default().segment(
            &[
                event("before", at(10, 9, 0), at(10, 10, 0)),
                event("after", at(20, 9, 0), at(20, 10, 0)),
                event("backwards", at(14, 10, 0), at(14, 9, 0)),
                event("touching", at(12, 23, 0), at(13, 0, 0)),
            ],
            &week(),
        );
        assert!(segments.is_empty());
    }

    #[test]
    fn zero_duration_event_gets_display_length() {
        let segments =
            EventSegmenter::default().segment(&[event("a", at(14, 9, 0), at(14, 9, 0))], &week());

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, at(14, 9, 0));
        assert_eq!(segments[0].end, at(14, 9, 30));
        assert!(segments[0].starts_event && segments[0].ends_event);
    }

    #[test]
    fn zero_duration_display_stops_at_midnight() {
        let segments = EventSegmenter::default()
            .segment(&[event("a", at(14, 23, 50), at(14, 23, 50))], &week());
        assert_eq!(segments[0].end, at(15, 0, 0));
    }

    #[test]
    fn all_day_event_is_one_spanning_segment() {
        let inclusive_end = date(16).and_hms_opt(23, 59, 59).unwrap();
        let segments = EventSegmenter::default().segment(
            &[event("trip", at(14, 0, 0), inclusive_end).all_day()],
            &week(),
        );

        assert_eq!(segments.len(), 1);
        let s = &segments[0];
        assert!(s.is_all_day);
        assert_eq!(s.day_index, 1);
        assert_eq!(s.start, at(14, 0, 0));
        assert_eq!(s.end, at(17, 0, 0));
        assert_eq!(s.day_span(), 3);
    }

    #[test]
    fn zero_length_all_day_marker_covers_its_day() {
        let segments = EventSegmenter::default()
            .segment(&[event("holiday", at(15, 0, 0), at(15, 0, 0)).all_day()], &week());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].day_span(), 1);
        assert_eq!(segments[0].end, at(16, 0, 0));
    }

    #[test]
    fn all_day_event_clips_to_range() {
        let segments = EventSegmenter::default()
            .segment(&[event("trip", at(10, 0, 0), at(15, 0, 0)).all_day()], &week());
        assert_eq!(segments[0].day_index, 0);
        assert_eq!(segments[0].day_span(), 2);
        assert!(!segments[0].starts_event);
        assert!(segments[0].ends_event);
    }

    #[test]
    fn segments_cover_clipped_interval_exactly() {
        let range = week();
        let segmenter = EventSegmenter::default();
        for start_hour in [0, 5, 13, 23] {
            for length_hours in [1_i64, 7, 24, 25, 49, 100, 200] {
                let start = at(12, start_hour, 15);
                let end = start + Duration::hours(length_hours);
                let segments = segmenter.segment(&[event("a", start, end)], &range);

                let clipped_start = start.max(range.start_instant());
                let clipped_end = end.min(range.end_instant());
                if clipped_start >= clipped_end {
                    assert!(segments.is_empty());
                    continue;
                }

                let last_date = (clipped_end - Duration::nanoseconds(1)).date();
                let expected_days =
                    usize::try_from((last_date - clipped_start.date()).num_days() + 1).unwrap();
                assert_eq!(segments.len(), expected_days, "start={start} end={end}");

                assert_eq!(segments.first().unwrap().start, clipped_start);
                assert_eq!(segments.last().unwrap().end, clipped_end);
                for pair in segments.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start, "gap or overlap");
                    assert_eq!(pair[0].day_index + 1, pair[1].day_index);
                }
                assert!(segments.iter().all(|s| s.start < s.end));
            }
        }
    }
}
