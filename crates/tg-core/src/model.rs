//! Per-day layout state for the visible range.
//!
//! The model owns the current event list and the visible [`DayRange`], and
//! rebuilds segments and column assignments whenever either changes. A rebuild
//! produces a fresh [`Layout`] that replaces the old one in a single
//! assignment, so a renderer never sees a half-updated state.

use chrono::Duration;
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::TimelineConfig;
use crate::event::CalendarEvent;
use crate::geometry::{GridMetrics, Rect, day_index_to_x, time_to_y};
use crate::interaction::Intent;
use crate::packing::{ColumnAssignment, pack};
use crate::segment::{EventSegmenter, Segment};
use crate::types::{DayRange, EventId, day_start};

/// Layout of a single day column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DayLayout {
    /// All-day segments starting in this column.
    pub all_day: Vec<Segment>,
    /// Timed segments with their column placement.
    pub timed: Vec<ColumnAssignment>,
}

impl DayLayout {
    pub fn is_empty(&self) -> bool {
        self.all_day.is_empty() && self.timed.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
struct Layout {
    days: Vec<DayLayout>,
    /// All-day bars across the whole range; `column` is the lane.
    all_day_lanes: Vec<ColumnAssignment>,
}

/// Which region a segment frame lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameRegion {
    AllDay,
    Canvas,
}

/// Identifies one segment: an event has at most one segment per day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SegmentKey {
    pub event_id: EventId,
    pub day_index: usize,
}

/// A segment's rectangle in its region's content coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentFrame {
    pub key: SegmentKey,
    pub region: FrameRegion,
    pub rect: Rect,
    pub starts_event: bool,
    pub ends_event: bool,
}

/// Events, visible range and the derived per-day layout.
#[derive(Debug, Clone)]
pub struct TimelineModel {
    segmenter: EventSegmenter,
    range: DayRange,
    events: Vec<CalendarEvent>,
    layout: Layout,
}

impl TimelineModel {
    pub fn new(range: DayRange, config: &TimelineConfig) -> Self {
        let mut model = Self {
            segmenter: EventSegmenter::from_config(config),
            range,
            events: Vec::new(),
            layout: Layout::default(),
        };
        model.relayout();
        model
    }

    pub const fn range(&self) -> &DayRange {
        &self.range
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn event(&self, id: &EventId) -> Option<&CalendarEvent> {
        self.events.iter().find(|e| &e.id == id)
    }

    /// Replaces the event list and rebuilds the layout.
    pub fn set_events(&mut self, events: Vec<CalendarEvent>) {
        self.events = events;
        self.relayout();
    }

    /// Changes the visible range and re-segments against it.
    ///
    /// Returns `true` when the range actually changed.
    pub fn set_visible_range(&mut self, range: DayRange) -> bool {
        if range == self.range {
            return false;
        }
        self.range = range;
        self.relayout();
        true
    }

    /// Applies an intent locally before the event store confirms it.
    ///
    /// The next [`set_events`](Self::set_events) overwrites whatever was
    /// applied here. Returns `false` when nothing changed (unknown event,
    /// disambiguation request, or an edit that would invert the event).
    pub fn apply_intent(&mut self, intent: &Intent) -> bool {
        let range = self.range;
        let Some(event) = self.events.iter_mut().find(|e| &e.id == intent.event_id()) else {
            return false;
        };

        match intent {
            Intent::Move {
                new_start, new_end, ..
            } => {
                if new_end < new_start {
                    return false;
                }
                event.start = *new_start;
                event.end = *new_end;
            }
            Intent::Resize {
                new_start, new_end, ..
            } => {
                let start = new_start.unwrap_or(event.start);
                let end = new_end.unwrap_or(event.end);
                if start >= end {
                    return false;
                }
                event.start = start;
                event.end = end;
            }
            Intent::ConvertToAllDay { day_index, .. } => {
                let Some(date) = range.date_at(*day_index) else {
                    return false;
                };
                event.start = day_start(date);
                event.end = day_start(date) + Duration::days(1);
            }
            Intent::RecurrenceDisambiguationNeeded { .. } => return false,
        }
        event.is_all_day = matches!(intent, Intent::ConvertToAllDay { .. });
        debug!(event_id = %intent.event_id(), "applied optimistic edit");
        self.relayout();
        true
    }

    /// Layout of day `index`, if inside the range.
    pub fn day(&self, index: usize) -> Option<&DayLayout> {
        self.layout.days.get(index)
    }

    pub fn days(&self) -> &[DayLayout] {
        &self.layout.days
    }

    /// All-day bars with their lane placement.
    pub fn all_day_lanes(&self) -> &[ColumnAssignment] {
        &self.layout.all_day_lanes
    }

    /// Lanes needed to show every all-day bar: the most concurrent all-day
    /// events on any visible day.
    pub fn all_day_lane_count(&self) -> usize {
        self.layout
            .all_day_lanes
            .first()
            .map_or(0, |a| a.column_count)
    }

    /// Every segment of one event, in day order.
    pub fn segments_of(&self, id: &EventId) -> Vec<&Segment> {
        let all_day = self
            .layout
            .all_day_lanes
            .iter()
            .map(|a| &a.segment)
            .filter(|s| &s.event_id == id);
        let timed = self
            .layout
            .days
            .iter()
            .flat_map(|d| d.timed.iter().map(|a| &a.segment))
            .filter(|s| &s.event_id == id);
        let mut segments: Vec<&Segment> = all_day.chain(timed).collect();
        segments.sort_by_key(|s| s.day_index);
        segments
    }

    pub fn segment(&self, key: &SegmentKey) -> Option<&Segment> {
        self.segments_of(&key.event_id)
            .into_iter()
            .find(|s| s.day_index == key.day_index)
    }

    /// Frames of every segment in content coordinates.
    ///
    /// All-day frames come first, then timed frames by day. Later frames draw
    /// on top, so hit tests should search from the back.
    pub fn frames(&self, metrics: &GridMetrics) -> Vec<SegmentFrame> {
        let mut frames = Vec::new();
        for lane in &self.layout.all_day_lanes {
            frames.push(all_day_frame(lane, metrics));
        }
        for day in &self.layout.days {
            for assignment in &day.timed {
                frames.push(self.timed_frame(assignment, metrics));
            }
        }
        frames
    }

    /// Frame of one segment, if it is currently laid out.
    pub fn frame(&self, key: &SegmentKey, metrics: &GridMetrics) -> Option<SegmentFrame> {
        if let Some(lane) = self
            .layout
            .all_day_lanes
            .iter()
            .find(|a| a.segment.event_id == key.event_id && a.segment.day_index == key.day_index)
        {
            return Some(all_day_frame(lane, metrics));
        }
        self.layout
            .days
            .get(key.day_index)?
            .timed
            .iter()
            .find(|a| a.segment.event_id == key.event_id)
            .map(|a| self.timed_frame(a, metrics))
    }

    fn timed_frame(&self, assignment: &ColumnAssignment, metrics: &GridMetrics) -> SegmentFrame {
        let segment = &assignment.segment;
        let date = self
            .range
            .date_at(segment.day_index)
            .unwrap_or_else(|| segment.start.date());
        #[allow(clippy::cast_precision_loss)]
        let width = metrics.column_width / assignment.column_count.max(1) as f64;
        #[allow(clippy::cast_precision_loss)]
        let column = assignment.column as f64;
        let top = time_to_y(segment.start, date, metrics.hour_height);
        let bottom = time_to_y(segment.end, date, metrics.hour_height);
        SegmentFrame {
            key: key_of(segment),
            region: FrameRegion::Canvas,
            rect: Rect::new(
                column.mul_add(
                    width,
                    day_index_to_x(segment.day_index, 0.0, metrics.column_width),
                ),
                top,
                width,
                bottom - top,
            ),
            starts_event: segment.starts_event,
            ends_event: segment.ends_event,
        }
    }

    fn relayout(&mut self) {
        let segments = self.segmenter.segment(&self.events, &self.range);
        let mut days = vec![Vec::new(); self.range.day_count()];
        let mut all_day = Vec::new();
        let mut all_day_by_day = vec![Vec::new(); self.range.day_count()];
        for segment in segments {
            if segment.is_all_day {
                all_day_by_day[segment.day_index].push(segment.clone());
                all_day.push(segment);
            } else {
                days[segment.day_index].push(segment);
            }
        }

        let lanes = pack(all_day);
        trace!(
            lanes = lanes.first().map_or(0, |a| a.column_count),
            "packed all-day bars"
        );

        let layout = Layout {
            days: days
                .into_iter()
                .zip(all_day_by_day)
                .map(|(timed, all_day)| DayLayout {
                    all_day,
                    timed: pack(timed),
                })
                .collect(),
            all_day_lanes: lanes,
        };
        debug!(
            range = %self.range,
            events = self.events.len(),
            "rebuilt timeline layout"
        );
        self.layout = layout;
    }
}

fn all_day_frame(lane: &ColumnAssignment, metrics: &GridMetrics) -> SegmentFrame {
    let segment = &lane.segment;
    #[allow(clippy::cast_precision_loss)]
    let (span, row) = (segment.day_span() as f64, lane.column as f64);
    SegmentFrame {
        key: key_of(segment),
        region: FrameRegion::AllDay,
        rect: Rect::new(
            day_index_to_x(segment.day_index, 0.0, metrics.column_width),
            row * metrics.all_day_row_height,
            span * metrics.column_width,
            metrics.all_day_row_height,
        ),
        starts_event: segment.starts_event,
        ends_event: segment.ends_event,
    }
}

fn key_of(segment: &Segment) -> SegmentKey {
    SegmentKey {
        event_id: segment.event_id.clone(),
        day_index: segment.day_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::geometry::TOP_MARGIN;
    use crate::interaction::ChangeScope;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        date(day).and_hms_opt(hour, minute, 0).unwrap()
    }

    fn id(s: &str) -> EventId {
        EventId::new(s).unwrap()
    }

    fn event(s: &str, start: NaiveDateTime, end: NaiveDateTime) -> CalendarEvent {
        CalendarEvent::new(id(s), s, start, end)
    }

    fn metrics() -> GridMetrics {
        GridMetrics {
            hour_height: 60.0,
            column_width: 100.0,
            all_day_row_height: 24.0,
        }
    }

    fn model(events: Vec<CalendarEvent>) -> TimelineModel {
        let range = DayRange::starting(date(13), 7).unwrap();
        let mut model = TimelineModel::new(range, &TimelineConfig::default());
        model.set_events(events);
        model
    }

    #[test]
    fn splits_timed_and_all_day_per_day() {
        let model = model(vec![
            event("meeting", at(14, 9, 0), at(14, 10, 0)),
            event("standup", at(14, 9, 30), at(14, 10, 30)),
            event("offsite", at(14, 0, 0), at(15, 0, 0)).all_day(),
        ]);

        let day = model.day(1).unwrap();
        assert_eq!(day.timed.len(), 2);
        assert_eq!(day.all_day.len(), 1);
        assert!(day.timed.iter().all(|a| a.column_count == 2));
        assert!(model.day(0).unwrap().is_empty());
        assert_eq!(model.days().len(), 7);
        assert_eq!(model.all_day_lane_count(), 1);
    }

    #[test]
    fn all_day_lanes_count_concurrent_bars() {
        let model = model(vec![
            event("trip", at(13, 0, 0), at(16, 0, 0)).all_day(),
            event("holiday", at(14, 0, 0), at(15, 0, 0)).all_day(),
            event("deadline", at(15, 0, 0), at(16, 0, 0)).all_day(),
            event("later", at(17, 0, 0), at(18, 0, 0)).all_day(),
        ]);
        assert_eq!(model.all_day_lane_count(), 2);
        let later = model
            .all_day_lanes()
            .iter()
            .find(|a| a.segment.event_id == id("later"))
            .unwrap();
        assert_eq!(later.column, 0);
    }

    #[test]
    fn timed_frames_divide_column_width() {
        let model = model(vec![
            event("a", at(14, 9, 0), at(14, 10, 0)),
            event("b", at(14, 9, 30), at(14, 10, 30)),
        ]);
        let frames = model.frames(&metrics());
        let b = frames.iter().find(|f| f.key.event_id == id("b")).unwrap();

        assert_eq!(b.region, FrameRegion::Canvas);
        assert!((b.rect.x - 150.0).abs() < 1e-9);
        assert!((b.rect.width - 50.0).abs() < 1e-9);
        assert!((b.rect.y - (TOP_MARGIN + 570.0)).abs() < 1e-9);
        assert!((b.rect.height - 60.0).abs() < 1e-9);
    }

    #[test]
    fn all_day_frames_span_days() {
        let model = model(vec![event("trip", at(14, 0, 0), at(17, 0, 0)).all_day()]);
        let frame = model
            .frame(
                &SegmentKey {
                    event_id: id("trip"),
                    day_index: 1,
                },
                &metrics(),
            )
            .unwrap();
        assert_eq!(frame.region, FrameRegion::AllDay);
        assert_eq!(frame.rect, Rect::new(100.0, 0.0, 300.0, 24.0));
    }

    #[test]
    fn segments_of_multi_day_event() {
        let model = model(vec![event("night", at(14, 22, 0), at(15, 6, 0))]);
        let segments = model.segments_of(&id("night"));
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].day_index, 1);
        assert_eq!(segments[1].day_index, 2);
    }

    #[test]
    fn visible_range_change_resegments() {
        let mut model = model(vec![event("a", at(21, 9, 0), at(21, 10, 0))]);
        assert!(model.segments_of(&id("a")).is_empty());

        assert!(model.set_visible_range(DayRange::starting(date(20), 7).unwrap()));
        assert!(!model.set_visible_range(DayRange::starting(date(20), 7).unwrap()));
        assert_eq!(model.segments_of(&id("a"))[0].day_index, 1);
    }

    #[test]
    fn apply_move_keeps_given_interval_and_clears_all_day() {
        let mut model = model(vec![event("a", at(14, 0, 0), at(15, 0, 0)).all_day()]);
        let applied = model.apply_intent(&Intent::Move {
            event_id: id("a"),
            new_start: at(15, 9, 0),
            new_end: at(15, 10, 0),
            scope: ChangeScope::ThisEvent,
        });

        assert!(applied);
        let event = model.event(&id("a")).unwrap();
        assert_eq!((event.start, event.end), (at(15, 9, 0), at(15, 10, 0)));
        assert!(!event.is_all_day);
        assert_eq!(model.day(2).unwrap().timed.len(), 1);
        assert_eq!(model.all_day_lane_count(), 0);
    }

    #[test]
    fn apply_resize_rejects_inversion() {
        let mut model = model(vec![event("a", at(14, 9, 0), at(14, 10, 0))]);
        assert!(!model.apply_intent(&Intent::resize_start(id("a"), at(14, 10, 0))));
        assert!(model.apply_intent(&Intent::resize_end(id("a"), at(14, 11, 30))));
        assert_eq!(model.event(&id("a")).unwrap().end, at(14, 11, 30));
    }

    #[test]
    fn apply_convert_collapses_to_full_day() {
        let mut model = model(vec![event("a", at(14, 14, 0), at(14, 15, 0))]);
        assert!(model.apply_intent(&Intent::ConvertToAllDay {
            event_id: id("a"),
            day_index: 2,
            date: date(15),
            scope: ChangeScope::ThisEvent,
        }));

        let event = model.event(&id("a")).unwrap();
        assert!(event.is_all_day);
        assert_eq!((event.start, event.end), (at(15, 0, 0), at(16, 0, 0)));
        assert_eq!(model.day(2).unwrap().all_day.len(), 1);
    }

    #[test]
    fn refreshed_list_overwrites_optimistic_edit() {
        let original = event("a", at(14, 9, 0), at(14, 10, 0));
        let mut model = model(vec![original.clone()]);
        model.apply_intent(&Intent::resize_end(id("a"), at(14, 12, 0)));
        model.set_events(vec![original]);
        assert_eq!(model.event(&id("a")).unwrap().end, at(14, 10, 0));
    }

    #[test]
    fn unknown_event_and_disambiguation_are_ignored() {
        let mut model = model(vec![event("a", at(14, 9, 0), at(14, 10, 0))]);
        assert!(!model.apply_intent(&Intent::resize_end(id("missing"), at(14, 12, 0))));
        assert!(!model.apply_intent(&Intent::RecurrenceDisambiguationNeeded {
            event_id: id("a"),
            proposed_change: Box::new(Intent::resize_end(id("a"), at(14, 12, 0))),
        }));
    }
}
