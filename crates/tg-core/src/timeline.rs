//! One timeline instance: model, viewport, hour ruler and gesture handling,
//! wired together.
//!
//! [`Timeline`] owns every component and passes each one exactly the
//! collaborators it needs. Hosts feed it events and pointer input and read
//! back a [`RenderFrame`] describing everything to draw.

use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::debug;

use crate::clock::NowIndicator;
use crate::config::TimelineConfig;
use crate::event::CalendarEvent;
use crate::geometry::{Point, Rect, Size};
use crate::interaction::{
    GestureContext, HourRuler, Intent, InteractionController, InteractionState, MinuteMarker,
    RecurrenceChoice,
};
use crate::model::{FrameRegion, SegmentKey, TimelineModel};
use crate::types::{ColorToken, DayRange, EventId, ValidationError};
use crate::viewport::{AllDayRelayout, PinnedScrollCoordinator, RegionOffsets, ViewportState};

/// A segment as it should be drawn right now, in viewport coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSegment {
    pub key: SegmentKey,
    pub region: FrameRegion,
    pub rect: Rect,
    pub title: String,
    pub color: Option<ColorToken>,
    /// Hidden behind a resize ghost.
    pub hidden: bool,
    /// Follows the pointer as part of a move.
    pub dragging: bool,
    pub focused: bool,
    pub top_handle: bool,
    pub bottom_handle: bool,
}

/// Everything a host needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    pub viewport: ViewportState,
    pub offsets: RegionOffsets,
    pub content_size: Size,
    pub state: InteractionState,
    pub segments: Vec<RenderedSegment>,
    pub ghost: Option<Rect>,
    pub minute_marker: Option<MinuteMarker>,
    pub now: Option<NowIndicator>,
}

#[derive(Debug, Clone)]
pub struct Timeline {
    config: TimelineConfig,
    model: TimelineModel,
    viewport: PinnedScrollCoordinator,
    controller: InteractionController,
    ruler: HourRuler,
    now: Option<NaiveDateTime>,
}

impl Timeline {
    pub fn new(
        config: TimelineConfig,
        range: DayRange,
        viewport_size: Size,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        let mut timeline = Self {
            model: TimelineModel::new(range, &config),
            viewport: PinnedScrollCoordinator::new(&config, range, viewport_size),
            controller: InteractionController::new(&config),
            ruler: HourRuler::default(),
            now: None,
            config,
        };
        timeline.relayout_all_day();
        Ok(timeline)
    }

    pub const fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub const fn model(&self) -> &TimelineModel {
        &self.model
    }

    pub const fn viewport(&self) -> &PinnedScrollCoordinator {
        &self.viewport
    }

    pub const fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub const fn ruler(&self) -> &HourRuler {
        &self.ruler
    }

    /// Replaces the event list, typically after the event store changed.
    ///
    /// Overwrites optimistic edits and drops gesture state whose event is gone.
    pub fn set_events(&mut self, events: Vec<CalendarEvent>) {
        self.model.set_events(events);
        self.controller.reconcile(&self.model, &mut self.ruler);
        self.relayout_all_day();
    }

    /// Shows a different span of days. Returns the new content size.
    pub fn set_visible_range(&mut self, range: DayRange) -> Size {
        if self.model.set_visible_range(range) {
            self.controller.cancel(&mut self.ruler);
            self.controller.reconcile(&self.model, &mut self.ruler);
        }
        let size = self.viewport.set_visible_range(range);
        self.relayout_all_day();
        size
    }

    pub fn set_viewport_size(&mut self, size: Size) -> RegionOffsets {
        self.viewport.set_viewport_size(size)
    }

    pub fn scroll_by(&mut self, delta: Point) -> RegionOffsets {
        self.viewport.scroll_canvas_by(delta)
    }

    pub fn scroll_to(&mut self, offset: Point) -> RegionOffsets {
        self.viewport.scroll_canvas_to(offset)
    }

    pub fn scroll_to_time(&mut self, time: NaiveTime) -> RegionOffsets {
        self.viewport.scroll_to_time(time)
    }

    pub fn scroll_all_day_to(&mut self, y: f64) -> RegionOffsets {
        self.viewport.scroll_all_day_to(y)
    }

    /// Zooms the hour height. Any gesture in flight is cancelled since its
    /// captured frames no longer match the grid.
    pub fn zoom(&mut self, hour_pixel_height: f64) -> RegionOffsets {
        self.controller.cancel(&mut self.ruler);
        self.viewport.set_hour_pixel_height(hour_pixel_height)
    }

    pub fn tap(&mut self, p: Point) -> Option<EventId> {
        let ctx = GestureContext {
            model: &self.model,
            viewport: &self.viewport,
            ruler: &mut self.ruler,
        };
        self.controller.tap(&ctx, p).cloned()
    }

    pub fn begin_gesture(&mut self, p: Point) -> bool {
        let mut ctx = GestureContext {
            model: &self.model,
            viewport: &self.viewport,
            ruler: &mut self.ruler,
        };
        self.controller.begin(&mut ctx, p)
    }

    pub fn update_gesture(&mut self, p: Point) {
        let mut ctx = GestureContext {
            model: &self.model,
            viewport: &self.viewport,
            ruler: &mut self.ruler,
        };
        self.controller.update(&mut ctx, p);
    }

    /// Ends the gesture and applies the resulting edit locally.
    ///
    /// The returned intent is what the host forwards to its event store. A
    /// recurrence question is returned unapplied; answer it with
    /// [`resolve_recurrence`](Self::resolve_recurrence).
    pub fn end_gesture(&mut self, p: Point) -> Option<Intent> {
        let mut ctx = GestureContext {
            model: &self.model,
            viewport: &self.viewport,
            ruler: &mut self.ruler,
        };
        let intent = self.controller.end(&mut ctx, p)?;
        self.apply_locally(&intent);
        Some(intent)
    }

    pub fn cancel_gesture(&mut self) {
        self.controller.cancel(&mut self.ruler);
    }

    /// Answers a pending recurrence question. The resolved edit is applied
    /// locally and returned for the event store.
    pub fn resolve_recurrence(&mut self, choice: RecurrenceChoice) -> Option<Intent> {
        let intent = self.controller.resolve_recurrence(choice)?;
        self.apply_locally(&intent);
        Some(intent)
    }

    /// Moves the current-time indicator.
    pub fn tick(&mut self, now: NaiveDateTime) -> Option<NowIndicator> {
        self.now = Some(now);
        self.now_indicator()
    }

    pub fn render(&self) -> RenderFrame {
        let session = self.controller.session();
        let focus = self.controller.focus();
        let segments = self
            .viewport
            .viewport_frames(&self.model, self.config.all_day_row_pixel_height)
            .into_iter()
            .map(|frame| {
                let (title, color) = self
                    .model
                    .event(&frame.key.event_id)
                    .map(|e| (e.title.clone(), e.color.clone()))
                    .unwrap_or_default();
                let live = session.and_then(|s| s.live_frame(&frame.key));
                let focused = focus == Some(&frame.key.event_id);
                let handles = focused && frame.region == FrameRegion::Canvas;
                RenderedSegment {
                    hidden: session.is_some_and(|s| s.hides(&frame.key)),
                    dragging: live.is_some(),
                    rect: live.unwrap_or(frame.rect),
                    top_handle: handles && frame.starts_event,
                    bottom_handle: handles && frame.ends_event,
                    focused,
                    title,
                    color,
                    key: frame.key,
                    region: frame.region,
                }
            })
            .collect();

        RenderFrame {
            viewport: self.viewport.state().clone(),
            offsets: self.viewport.offsets(),
            content_size: self.viewport.content_size(),
            state: self.controller.state(),
            segments,
            ghost: session.and_then(|s| s.ghost()),
            minute_marker: self.ruler.marker().copied(),
            now: self.now_indicator(),
        }
    }

    fn now_indicator(&self) -> Option<NowIndicator> {
        NowIndicator::locate(
            self.now?,
            self.model.range(),
            self.viewport.state().hour_pixel_height,
        )
    }

    fn apply_locally(&mut self, intent: &Intent) {
        if intent.needs_disambiguation() {
            return;
        }
        if self.model.apply_intent(intent) {
            self.relayout_all_day();
        } else {
            debug!(?intent, "intent not applied locally");
        }
    }

    /// Sizes the all-day row to its lanes. An empty row still keeps one lane
    /// so there is always somewhere to drop a timed event.
    fn relayout_all_day(&mut self) -> AllDayRelayout {
        let lanes = self.model.all_day_lane_count().max(1);
        #[allow(clippy::cast_precision_loss)]
        let height = lanes as f64 * self.config.all_day_row_pixel_height;
        self.viewport.relayout_all_day(|_| height)
    }
}
