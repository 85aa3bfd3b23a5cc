//! Current-time indicator.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::geometry::{Rect, day_index_to_x, time_to_y};
use crate::types::DayRange;

/// Where the "now" line is drawn on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NowIndicator {
    pub now: NaiveDateTime,
    pub day_index: usize,
    /// Vertical position in canvas content coordinates.
    pub y: f64,
}

impl NowIndicator {
    /// Places `now` in `range`, or `None` when today is not visible.
    pub fn locate(now: NaiveDateTime, range: &DayRange, hour_height: f64) -> Option<Self> {
        let date = now.date();
        let day_index = range.index_of(date)?;
        Some(Self {
            now,
            day_index,
            y: time_to_y(now, date, hour_height),
        })
    }

    /// Zero-height line across the indicator's day column, in canvas content
    /// coordinates.
    pub fn line(&self, column_width: f64) -> Rect {
        Rect::new(
            day_index_to_x(self.day_index, 0.0, column_width),
            self.y,
            column_width,
            0.0,
        )
    }
}
