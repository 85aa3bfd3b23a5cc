//! Event records supplied by the event store.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::{ColorToken, EventId};

/// A calendar event as handed to the timeline by the host.
///
/// The timeline treats these as read-only input; edits flow back out as
/// [`Intent`](crate::Intent)s and come back in as a refreshed list.
/// `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: EventId,
    #[serde(default)]
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorToken>,
    #[serde(default)]
    pub is_recurring: bool,
}

impl CalendarEvent {
    /// Creates a timed, non-recurring event.
    pub fn new(
        id: EventId,
        title: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            start,
            end,
            is_all_day: false,
            color: None,
            is_recurring: false,
        }
    }

    #[must_use]
    pub const fn all_day(mut self) -> Self {
        self.is_all_day = true;
        self
    }

    #[must_use]
    pub const fn recurring(mut self) -> Self {
        self.is_recurring = true;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: ColorToken) -> Self {
        self.color = Some(color);
        self
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// An event whose end precedes its start. These never reach the layout.
    pub fn is_degenerate(&self) -> bool {
        self.end < self.start
    }

    pub fn is_zero_duration(&self) -> bool {
        self.end == self.start
    }
}
