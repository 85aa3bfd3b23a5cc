//! State of one in-progress drag or resize gesture.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::geometry::{Point, Rect};
use crate::model::{FrameRegion, SegmentKey};
use crate::types::EventId;

/// What a gesture does to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragMode {
    Move,
    ResizeTop,
    ResizeBottom,
}

impl DragMode {
    pub const fn is_resize(self) -> bool {
        matches!(self, Self::ResizeTop | Self::ResizeBottom)
    }
}

/// The event's interval when the gesture began.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OriginalInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub is_all_day: bool,
}

/// A segment frame captured at gesture begin, in viewport coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapturedFrame {
    pub key: SegmentKey,
    pub region: FrameRegion,
    pub rect: Rect,
}

/// One gesture's worth of state. Created on begin, consumed on end or cancel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionSession {
    pub target_event_id: EventId,
    pub mode: DragMode,
    pub original_interval: OriginalInterval,
    /// Pointer position minus the grabbed frame's origin.
    pub pointer_anchor_offset: Point,
    /// Pointer position at gesture begin.
    pub pointer_origin: Point,
    /// The segment under the pointer at begin.
    pub grabbed: SegmentKey,
    /// Start of the grabbed segment, used to carry a drop back to the event.
    pub grabbed_segment_start: NaiveDateTime,
    /// Frames of every segment that moves with the gesture, as captured.
    pub original_frames: Vec<CapturedFrame>,
    /// Where those frames are drawn right now. For resizes this holds the
    /// ghost, and the real segment is hidden.
    pub live_frames: Vec<CapturedFrame>,
    /// Snapped time under the leading edge, for live feedback only.
    pub provisional_time: Option<NaiveDateTime>,
}

impl InteractionSession {
    pub fn grabbed_frame(&self) -> Option<&CapturedFrame> {
        self.original_frames.iter().find(|f| f.key == self.grabbed)
    }

    /// The resize ghost, if this is a resize.
    pub fn ghost(&self) -> Option<Rect> {
        if self.mode.is_resize() {
            self.live_frames.first().map(|f| f.rect)
        } else {
            None
        }
    }

    /// Live frame of a moving segment. Resized segments have none: they are
    /// hidden behind the ghost.
    pub fn live_frame(&self, key: &SegmentKey) -> Option<Rect> {
        if self.mode.is_resize() {
            return None;
        }
        self.live_frames
            .iter()
            .find(|f| &f.key == key)
            .map(|f| f.rect)
    }

    /// Whether the real segment is hidden for the duration of the gesture.
    pub fn hides(&self, key: &SegmentKey) -> bool {
        self.mode.is_resize() && &self.grabbed == key
    }

    /// Moves every captured frame by the same delta from its original spot.
    pub(crate) fn translate_all(&mut self, delta: Point) {
        self.live_frames = self
            .original_frames
            .iter()
            .map(|f| CapturedFrame {
                rect: f.rect.translated(delta),
                ..f.clone()
            })
            .collect();
    }

    /// Replaces the ghost rectangle.
    pub(crate) fn set_ghost(&mut self, rect: Rect) {
        if let Some(ghost) = self.live_frames.first_mut() {
            ghost.rect = rect;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn key(day: usize) -> SegmentKey {
        SegmentKey {
            event_id: EventId::new("a").unwrap(),
            day_index: day,
        }
    }

    fn session(mode: DragMode) -> InteractionSession {
        let t = NaiveDate::from_ymd_opt(2025, 1, 14)
            .unwrap()
            .and_hms_opt(22, 0, 0)
            .unwrap();
        let frames = vec![
            CapturedFrame {
                key: key(1),
                region: FrameRegion::Canvas,
                rect: Rect::new(176.0, 1400.0, 120.0, 120.0),
            },
            CapturedFrame {
                key: key(2),
                region: FrameRegion::Canvas,
                rect: Rect::new(296.0, 8.0, 120.0, 360.0),
            },
        ];
        InteractionSession {
            target_event_id: EventId::new("a").unwrap(),
            mode,
            original_interval: OriginalInterval {
                start: t,
                end: t,
                is_all_day: false,
            },
            pointer_anchor_offset: Point::new(10.0, 10.0),
            pointer_origin: Point::new(186.0, 1410.0),
            grabbed: key(1),
            grabbed_segment_start: t,
            live_frames: if mode.is_resize() {
                frames[..1].to_vec()
            } else {
                frames.clone()
            },
            original_frames: frames,
            provisional_time: None,
        }
    }

    #[test]
    fn translate_moves_siblings_together() {
        let mut s = session(DragMode::Move);
        s.translate_all(Point::new(120.0, -60.0));

        assert_eq!(
            s.live_frame(&key(1)),
            Some(Rect::new(296.0, 1340.0, 120.0, 120.0))
        );
        assert_eq!(
            s.live_frame(&key(2)),
            Some(Rect::new(416.0, -52.0, 120.0, 360.0))
        );
        assert!(!s.hides(&key(1)));
        assert_eq!(s.ghost(), None);
    }

    #[test]
    fn resize_hides_grabbed_segment_behind_ghost() {
        let mut s = session(DragMode::ResizeBottom);
        s.set_ghost(Rect::new(176.0, 1400.0, 120.0, 150.0));

        assert!(s.hides(&key(1)));
        assert!(!s.hides(&key(2)));
        assert_eq!(s.live_frame(&key(1)), None);
        assert_eq!(s.ghost(), Some(Rect::new(176.0, 1400.0, 120.0, 150.0)));
        assert!((s.grabbed_frame().unwrap().rect.height - 120.0).abs() < f64::EPSILON);
    }
}
