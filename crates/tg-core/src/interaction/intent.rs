//! Change requests emitted to the event store.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::EventId;

/// Which occurrences of a recurring event a change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeScope {
    /// Only the occurrence that was dragged. Always used for non-recurring events.
    #[default]
    ThisEvent,
    /// The dragged occurrence and every later one in the series.
    FutureEvents,
}

/// The host's answer to [`Intent::RecurrenceDisambiguationNeeded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceChoice {
    ThisEventOnly,
    AllFutureEvents,
    Cancel,
}

impl RecurrenceChoice {
    /// The scope to apply, or `None` when the change was abandoned.
    pub const fn scope(self) -> Option<ChangeScope> {
        match self {
            Self::ThisEventOnly => Some(ChangeScope::ThisEvent),
            Self::AllFutureEvents => Some(ChangeScope::FutureEvents),
            Self::Cancel => None,
        }
    }
}

/// A confirmed user edit, emitted once per completed gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    /// Shift the event, keeping its duration. The result is always timed.
    Move {
        event_id: EventId,
        new_start: NaiveDateTime,
        new_end: NaiveDateTime,
        #[serde(default)]
        scope: ChangeScope,
    },
    /// Move exactly one edge of the event. The result is always timed.
    Resize {
        event_id: EventId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_start: Option<NaiveDateTime>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_end: Option<NaiveDateTime>,
        #[serde(default)]
        scope: ChangeScope,
    },
    /// Turn the event into an all-day event on the given visible day.
    ConvertToAllDay {
        event_id: EventId,
        day_index: usize,
        date: NaiveDate,
        #[serde(default)]
        scope: ChangeScope,
    },
    /// The target is recurring; the host must pick a scope and call back
    /// before `proposed_change` is emitted.
    RecurrenceDisambiguationNeeded {
        event_id: EventId,
        proposed_change: Box<Intent>,
    },
}

impl Intent {
    pub fn resize_start(event_id: EventId, new_start: NaiveDateTime) -> Self {
        Self::Resize {
            event_id,
            new_start: Some(new_start),
            new_end: None,
            scope: ChangeScope::ThisEvent,
        }
    }

    pub fn resize_end(event_id: EventId, new_end: NaiveDateTime) -> Self {
        Self::Resize {
            event_id,
            new_start: None,
            new_end: Some(new_end),
            scope: ChangeScope::ThisEvent,
        }
    }

    pub const fn event_id(&self) -> &EventId {
        match self {
            Self::Move { event_id, .. }
            | Self::Resize { event_id, .. }
            | Self::ConvertToAllDay { event_id, .. }
            | Self::RecurrenceDisambiguationNeeded { event_id, .. } => event_id,
        }
    }

    /// The scope of a concrete change; `None` for a disambiguation request.
    pub const fn scope(&self) -> Option<ChangeScope> {
        match self {
            Self::Move { scope, .. }
            | Self::Resize { scope, .. }
            | Self::ConvertToAllDay { scope, .. } => Some(*scope),
            Self::RecurrenceDisambiguationNeeded { .. } => None,
        }
    }

    /// Rewrites the scope of a concrete change. Disambiguation requests are
    /// returned unchanged.
    #[must_use]
    pub fn with_scope(mut self, new_scope: ChangeScope) -> Self {
        match &mut self {
            Self::Move { scope, .. }
            | Self::Resize { scope, .. }
            | Self::ConvertToAllDay { scope, .. } => *scope = new_scope,
            Self::RecurrenceDisambiguationNeeded { .. } => {}
        }
        self
    }

    pub const fn needs_disambiguation(&self) -> bool {
        matches!(self, Self::RecurrenceDisambiguationNeeded { .. })
    }
}
