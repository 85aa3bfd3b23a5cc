//! Pointer-driven editing of scheduled events.
//!
//! The controller is a small state machine:
//!
//! - `Idle -> Dragging(Move) -> Idle` for a drag on a segment body.
//! - `Idle -> Dragging(ResizeTop | ResizeBottom) -> Idle` for a drag on a
//!   resize handle of the focused event.
//! - `Idle -> AwaitingRecurrenceChoice -> Idle` when a gesture on a recurring
//!   event ends and the host has to pick a scope.
//!
//! Edit focus is a separate slot, set by taps. The controller never mutates
//! events: it reads frames through [`GestureContext`] and emits [`Intent`]s.

mod intent;
mod ruler;
mod session;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, trace};

pub use intent::{ChangeScope, Intent, RecurrenceChoice};
pub use ruler::{HourLine, HourRuler, MinuteMarker};
pub use session::{CapturedFrame, DragMode, InteractionSession, OriginalInterval};

use crate::config::TimelineConfig;
use crate::event::CalendarEvent;
use crate::geometry::{Point, Rect, snap_to_grid, y_to_time};
use crate::model::{FrameRegion, SegmentFrame, TimelineModel};
use crate::types::{EventId, day_start};
use crate::viewport::{PinnedScrollCoordinator, Region};

/// Collaborators a gesture step reads from and writes to.
///
/// Handed in explicitly on every call so the controller never has to locate
/// its sibling regions on its own.
pub struct GestureContext<'a> {
    pub model: &'a TimelineModel,
    pub viewport: &'a PinnedScrollCoordinator,
    pub ruler: &'a mut HourRuler,
}

/// Coarse controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionState {
    Idle,
    Dragging(DragMode),
    AwaitingRecurrenceChoice,
}

/// Gesture-related subset of [`TimelineConfig`].
#[derive(Debug, Clone, Copy)]
struct GestureSettings {
    graduation_minutes: u32,
    min_segment_height: f64,
    handle_height: f64,
    all_day_row_height: f64,
    converted_duration: Duration,
}

impl GestureSettings {
    fn from_config(config: &TimelineConfig) -> Self {
        Self {
            graduation_minutes: config.graduation_minutes,
            min_segment_height: config.min_segment_pixel_height,
            handle_height: config.resize_handle_pixel_height,
            all_day_row_height: config.all_day_row_pixel_height,
            converted_duration: Duration::minutes(i64::from(
                config.converted_timed_duration_minutes,
            )),
        }
    }

    /// Snapped time on the canvas at viewport height `y` of visible day `day`.
    fn canvas_time(
        &self,
        ctx: &GestureContext<'_>,
        day: usize,
        y: f64,
    ) -> Option<(NaiveDateTime, NaiveDate)> {
        let date = ctx.model.range().date_at(day)?;
        let content_y = ctx.viewport.to_canvas(Point::new(0.0, y)).y;
        let hour_height = ctx.viewport.state().hour_pixel_height;
        let time = snap_to_grid(
            y_to_time(content_y, date, hour_height),
            self.graduation_minutes,
        );
        Some((time, date))
    }

    /// Picks move or resize for a press at `p` on `frame`.
    fn mode_for(&self, frame: &SegmentFrame, p: Point, focused: bool) -> DragMode {
        if !focused || frame.region != FrameRegion::Canvas {
            return DragMode::Move;
        }
        if frame.starts_event && p.y < frame.rect.y + self.handle_height {
            DragMode::ResizeTop
        } else if frame.ends_event && p.y >= frame.rect.bottom() - self.handle_height {
            DragMode::ResizeBottom
        } else {
            DragMode::Move
        }
    }

    /// The change a move gesture released at `p` asks for, if any.
    fn move_change(
        &self,
        ctx: &GestureContext<'_>,
        session: &InteractionSession,
        event: &CalendarEvent,
        p: Point,
    ) -> Option<Intent> {
        match ctx.viewport.region_at(p) {
            Region::AllDay => {
                let day_index = ctx.viewport.day_index_at(p)?;
                let date = ctx.model.range().date_at(day_index)?;
                let unchanged = event.is_all_day
                    && event.start == day_start(date)
                    && event.end == day_start(date) + Duration::days(1);
                (!unchanged).then(|| Intent::ConvertToAllDay {
                    event_id: event.id.clone(),
                    day_index,
                    date,
                    scope: ChangeScope::ThisEvent,
                })
            }
            Region::Canvas => {
                let day_index = ctx.viewport.day_index_at(p)?;
                let top = (p - session.pointer_anchor_offset).y;
                let (time, _) = self.canvas_time(ctx, day_index, top)?;
                let (new_start, new_end) = if event.is_all_day {
                    (time, time + self.converted_duration)
                } else {
                    let start = event.start + (time - session.grabbed_segment_start);
                    (start, start + event.duration())
                };
                let unchanged = !event.is_all_day && new_start == event.start;
                (!unchanged).then(|| Intent::Move {
                    event_id: event.id.clone(),
                    new_start,
                    new_end,
                    scope: ChangeScope::ThisEvent,
                })
            }
            Region::Corner | Region::DayHeader | Region::HourRuler | Region::Outside => None,
        }
    }

    /// The change a resize gesture asks for, if the ghost moved and the
    /// dragged edge stays on its side of the fixed one.
    fn resize_change(
        &self,
        ctx: &GestureContext<'_>,
        session: &InteractionSession,
        event: &CalendarEvent,
    ) -> Option<Intent> {
        let ghost = session.ghost()?;
        if session.grabbed_frame().is_some_and(|f| f.rect == ghost) {
            return None;
        }
        match session.mode {
            DragMode::ResizeTop => {
                let (new_start, _) = self.canvas_time(ctx, session.grabbed.day_index, ghost.y)?;
                (new_start < event.end && new_start != event.start)
                    .then(|| Intent::resize_start(event.id.clone(), new_start))
            }
            DragMode::ResizeBottom => {
                let (new_end, _) =
                    self.canvas_time(ctx, session.grabbed.day_index, ghost.bottom())?;
                (new_end > event.start && new_end != event.end)
                    .then(|| Intent::resize_end(event.id.clone(), new_end))
            }
            DragMode::Move => None,
        }
    }
}

/// Turns pointer gestures on segment frames into edit intents.
#[derive(Debug, Clone)]
pub struct InteractionController {
    settings: GestureSettings,
    session: Option<InteractionSession>,
    focus: Option<EventId>,
    pending: Option<Intent>,
}

impl InteractionController {
    pub fn new(config: &TimelineConfig) -> Self {
        Self {
            settings: GestureSettings::from_config(config),
            session: None,
            focus: None,
            pending: None,
        }
    }

    pub fn state(&self) -> InteractionState {
        if let Some(session) = &self.session {
            InteractionState::Dragging(session.mode)
        } else if self.pending.is_some() {
            InteractionState::AwaitingRecurrenceChoice
        } else {
            InteractionState::Idle
        }
    }

    pub const fn session(&self) -> Option<&InteractionSession> {
        self.session.as_ref()
    }

    /// The event in edit mode, if any.
    pub const fn focus(&self) -> Option<&EventId> {
        self.focus.as_ref()
    }

    /// The change held back until the host picks a recurrence scope.
    pub const fn pending_change(&self) -> Option<&Intent> {
        self.pending.as_ref()
    }

    /// Topmost segment frame under `p`, in viewport coordinates.
    pub fn hit_test(&self, ctx: &GestureContext<'_>, p: Point) -> Option<SegmentFrame> {
        let region = match ctx.viewport.region_at(p) {
            Region::Canvas => FrameRegion::Canvas,
            Region::AllDay => FrameRegion::AllDay,
            _ => return None,
        };
        ctx.viewport
            .viewport_frames(ctx.model, self.settings.all_day_row_height)
            .into_iter()
            .rev()
            .find(|f| f.region == region && f.rect.contains(p))
    }

    /// Focuses the event under `p`, or clears focus when nothing is there.
    ///
    /// Ignored while a gesture is in progress.
    pub fn tap(&mut self, ctx: &GestureContext<'_>, p: Point) -> Option<&EventId> {
        if self.session.is_some() {
            return self.focus.as_ref();
        }
        let hit = self.hit_test(ctx, p).map(|f| f.key.event_id);
        if self.focus.take().is_some() {
            trace!("edit focus cleared");
        }
        if let Some(id) = &hit {
            debug!(event_id = %id, "edit focus set");
        }
        self.focus = hit;
        self.focus.as_ref()
    }

    pub fn clear_focus(&mut self) {
        self.focus = None;
    }

    /// Starts a gesture at `p`.
    ///
    /// Any gesture still open is closed first without emitting anything, as is
    /// an unanswered recurrence question. Returns `false` when `p` is not on a
    /// segment, leaving the controller idle.
    pub fn begin(&mut self, ctx: &mut GestureContext<'_>, p: Point) -> bool {
        if let Some(previous) = self.session.take() {
            debug!(event_id = %previous.target_event_id, "previous gesture closed without a change");
            ctx.ruler.clear();
        }
        if self.pending.take().is_some() {
            debug!("unanswered recurrence question dropped");
        }

        let Some(frame) = self.hit_test(ctx, p) else {
            return false;
        };
        let event_id = frame.key.event_id.clone();
        let (Some(event), Some(segment)) =
            (ctx.model.event(&event_id), ctx.model.segment(&frame.key))
        else {
            return false;
        };

        let focused = self.focus.as_ref() == Some(&event_id);
        if !focused {
            self.focus = None;
        }
        let mode = self.settings.mode_for(&frame, p, focused);

        let original_frames: Vec<CapturedFrame> = if mode.is_resize() {
            vec![capture(&frame)]
        } else {
            ctx.viewport
                .viewport_frames(ctx.model, self.settings.all_day_row_height)
                .iter()
                .filter(|f| f.key.event_id == event_id)
                .map(capture)
                .collect()
        };

        debug!(%event_id, ?mode, day = frame.key.day_index, "gesture began");
        self.session = Some(InteractionSession {
            target_event_id: event_id,
            mode,
            original_interval: OriginalInterval {
                start: event.start,
                end: event.end,
                is_all_day: event.is_all_day,
            },
            pointer_anchor_offset: p - frame.rect.origin(),
            pointer_origin: p,
            grabbed: frame.key,
            grabbed_segment_start: segment.start,
            live_frames: original_frames.clone(),
            original_frames,
            provisional_time: None,
        });
        true
    }

    /// Follows the pointer to `p`.
    pub fn update(&mut self, ctx: &mut GestureContext<'_>, p: Point) {
        if self.session.is_none() {
            return;
        }
        if self.is_stale(ctx.model) {
            self.discard(ctx.ruler, "grabbed segment disappeared mid-gesture");
            return;
        }
        let settings = self.settings;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(grabbed) = session.grabbed_frame().map(|f| f.rect) else {
            return;
        };

        let feedback = match session.mode {
            DragMode::Move => {
                let origin = p - session.pointer_anchor_offset;
                session.translate_all(origin - grabbed.origin());
                if ctx.viewport.region_at(p) == Region::Canvas {
                    ctx.viewport
                        .day_index_at(p)
                        .and_then(|day| settings.canvas_time(ctx, day, origin.y))
                } else {
                    None
                }
            }
            DragMode::ResizeTop | DragMode::ResizeBottom => {
                let Some(ghost) = next_ghost(&settings, session, grabbed, p) else {
                    return;
                };
                session.set_ghost(ghost);
                let edge = if session.mode == DragMode::ResizeTop {
                    ghost.y
                } else {
                    ghost.bottom()
                };
                settings.canvas_time(ctx, session.grabbed.day_index, edge)
            }
        };

        session.provisional_time = feedback.map(|(time, _)| time);
        match feedback {
            Some((time, date)) => {
                ctx.ruler
                    .show_minute(time, date, ctx.viewport.state().hour_pixel_height);
            }
            None => ctx.ruler.clear(),
        }
    }

    /// Finishes the gesture with the pointer released at `p`.
    ///
    /// Returns the resulting change, a recurrence question, or `None` when the
    /// gesture is discarded (released over chrome, rejected resize, no change,
    /// or the target vanished).
    pub fn end(&mut self, ctx: &mut GestureContext<'_>, p: Point) -> Option<Intent> {
        self.update(ctx, p);
        let session = self.session.take()?;
        ctx.ruler.clear();

        let (Some(event), Some(_)) = (
            ctx.model.event(&session.target_event_id),
            ctx.model.segment(&session.grabbed),
        ) else {
            debug!(event_id = %session.target_event_id, "grabbed segment disappeared; discarded");
            return None;
        };
        let change = if session.mode.is_resize() {
            self.settings.resize_change(ctx, &session, event)
        } else {
            self.settings.move_change(ctx, &session, event, p)
        };
        let Some(change) = change else {
            debug!(event_id = %event.id, "gesture ended without a change");
            return None;
        };

        if event.is_recurring {
            debug!(event_id = %event.id, "recurring target; asking for scope");
            self.pending = Some(change.clone());
            return Some(Intent::RecurrenceDisambiguationNeeded {
                event_id: event.id.clone(),
                proposed_change: Box::new(change),
            });
        }
        debug!(?change, "gesture produced intent");
        Some(change)
    }

    /// Abandons the gesture; frames snap back to where they began.
    pub fn cancel(&mut self, ruler: &mut HourRuler) {
        self.discard(ruler, "gesture cancelled");
    }

    /// Applies the host's recurrence answer to the held-back change.
    pub fn resolve_recurrence(&mut self, choice: RecurrenceChoice) -> Option<Intent> {
        let change = self.pending.take()?;
        let Some(scope) = choice.scope() else {
            debug!(event_id = %change.event_id(), "recurring change cancelled");
            return None;
        };
        let change = change.with_scope(scope);
        debug!(?change, "recurring change resolved");
        Some(change)
    }

    /// Drops state that points at events or segments no longer in `model`.
    pub fn reconcile(&mut self, model: &TimelineModel, ruler: &mut HourRuler) {
        if self.focus.as_ref().is_some_and(|id| model.event(id).is_none()) {
            self.focus = None;
        }
        if self
            .pending
            .as_ref()
            .is_some_and(|change| model.event(change.event_id()).is_none())
        {
            self.pending = None;
        }
        if self.is_stale(model) {
            self.discard(ruler, "grabbed segment disappeared mid-gesture");
        }
    }

    /// Whether the open gesture points at a segment `model` no longer has.
    fn is_stale(&self, model: &TimelineModel) -> bool {
        self.session.as_ref().is_some_and(|s| {
            model.event(&s.target_event_id).is_none() || model.segment(&s.grabbed).is_none()
        })
    }

    fn discard(&mut self, ruler: &mut HourRuler, reason: &str) {
        if let Some(session) = self.session.take() {
            debug!(event_id = %session.target_event_id, reason, "gesture discarded");
            ruler.clear();
        }
    }
}

fn capture(frame: &SegmentFrame) -> CapturedFrame {
    CapturedFrame {
        key: frame.key.clone(),
        region: frame.region,
        rect: frame.rect,
    }
}

/// Ghost for the pointer at `p`, or `None` to keep the current one.
///
/// The edge opposite the handle stays where it was at gesture begin. Updates
/// that shrink the ghost below the minimum height are ignored.
fn next_ghost(
    settings: &GestureSettings,
    session: &InteractionSession,
    original: Rect,
    p: Point,
) -> Option<Rect> {
    let dy = p.y - session.pointer_origin.y;
    let ghost = if session.mode == DragMode::ResizeTop {
        let top = original.y + dy;
        Rect::new(original.x, top, original.width, original.bottom() - top)
    } else {
        Rect::new(original.x, original.y, original.width, original.height + dy)
    };
    let current = session.ghost().map_or(original.height, |g| g.height);
    if ghost.height < settings.min_segment_height && ghost.height < current {
        return None;
    }
    Some(ghost)
}
