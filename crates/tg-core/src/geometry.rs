//! Mapping between wall-clock time and pixel geometry.
//!
//! Everything here is pure: no function reads shared state, so the whole
//! mapping can be tested without a rendering surface. Vertical positions are
//! measured in day-canvas coordinates, where `y = TOP_MARGIN` is midnight and
//! `y = TOP_MARGIN + 24 * hour_height` is the following midnight.

use std::ops::{Add, Sub};

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::types::day_start;

/// Space above the 0:00 line so its label is not clipped.
pub const TOP_MARGIN: f64 = 8.0;

const HOURS_PER_DAY: f64 = 24.0;
const MINUTES_PER_DAY: f64 = 1440.0;

/// A point in some 2D coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    #[must_use]
    pub fn translated(&self, delta: Point) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    #[must_use]
    pub fn with_origin(&self, origin: Point) -> Self {
        Self::new(origin.x, origin.y, self.width, self.height)
    }
}

/// Pixel sizes of the grid cells, owned by the viewport and handed to layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridMetrics {
    pub hour_height: f64,
    pub column_width: f64,
    pub all_day_row_height: f64,
}

/// Vertical position of `instant` on the canvas of `day`.
///
/// Instants on later days map below the day (`24:00` maps to the bottom line),
/// which lets segment ends use exclusive midnight.
pub fn time_to_y(instant: NaiveDateTime, day: NaiveDate, hour_height: f64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let minutes = (instant - day_start(day)).num_minutes() as f64;
    TOP_MARGIN + minutes / 60.0 * hour_height
}

/// Inverse of [`time_to_y`], clamped to the day and rounded to the nearest
/// minute.
///
/// Positions above the day map to `00:00`; positions below map to the next
/// midnight. Seconds are always zero.
pub fn y_to_time(y: f64, day: NaiveDate, hour_height: f64) -> NaiveDateTime {
    let hours = if hour_height > 0.0 {
        (y - TOP_MARGIN) / hour_height
    } else {
        0.0
    };
    let hours = if hours.is_nan() {
        0.0
    } else {
        hours.clamp(0.0, HOURS_PER_DAY)
    };
    #[allow(clippy::cast_possible_truncation)]
    let minutes = (hours * 60.0).round().min(MINUTES_PER_DAY) as i64;
    day_start(day) + Duration::minutes(minutes)
}

/// Rounds the minute component to the nearest multiple of `graduation_minutes`.
///
/// Halfway values round up. Rounding past `:59` carries into the next hour
/// (and day). Seconds and sub-seconds are dropped.
pub fn snap_to_grid(instant: NaiveDateTime, graduation_minutes: u32) -> NaiveDateTime {
    let step = graduation_minutes.max(1);
    let minute = instant.minute();
    let hour_start = instant
        - Duration::minutes(i64::from(minute))
        - Duration::seconds(i64::from(instant.second()))
        - Duration::nanoseconds(i64::from(instant.nanosecond()));
    let snapped = (minute + step / 2) / step * step;
    hour_start + Duration::minutes(i64::from(snapped))
}

/// Day column under `x`, or `None` left of the inset or past the last day.
pub fn x_to_day_index(
    x: f64,
    leading_inset: f64,
    column_width: f64,
    day_count: usize,
) -> Option<usize> {
    if x.is_nan() || x < leading_inset || column_width <= 0.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = ((x - leading_inset) / column_width).floor() as usize;
    (index < day_count).then_some(index)
}

/// Left edge of day column `index`.
pub fn day_index_to_x(index: usize, leading_inset: f64, column_width: f64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let index = index as f64;
    leading_inset + index * column_width
}

/// Full height of one day's canvas, including the margins at both ends.
pub fn day_canvas_height(hour_height: f64) -> f64 {
    2.0f64.mul_add(TOP_MARGIN, HOURS_PER_DAY * hour_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 13).unwrap()
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        day().and_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn time_to_y_scales_hours_and_minutes() {
        assert!((time_to_y(at(0, 0), day(), 60.0) - TOP_MARGIN).abs() < 1e-9);
        assert!((time_to_y(at(9, 30), day(), 60.0) - (TOP_MARGIN + 570.0)).abs() < 1e-9);
        assert!((time_to_y(at(9, 30), day(), 40.0) - (TOP_MARGIN + 380.0)).abs() < 1e-9);
    }

    #[test]
    fn next_midnight_maps_to_bottom_line() {
        let midnight = day_start(day()) + Duration::days(1);
        assert!((time_to_y(midnight, day(), 50.0) - (TOP_MARGIN + 1200.0)).abs() < 1e-9);
    }

    #[test]
    fn y_to_time_clamps_to_day() {
        assert_eq!(y_to_time(-500.0, day(), 60.0), at(0, 0));
        assert_eq!(
            y_to_time(10_000.0, day(), 60.0),
            day_start(day()) + Duration::days(1)
        );
        assert_eq!(y_to_time(f64::NAN, day(), 60.0), at(0, 0));
        assert_eq!(y_to_time(300.0, day(), 0.0), at(0, 0));
    }

    #[test]
    fn y_to_time_zeroes_seconds() {
        let t = y_to_time(TOP_MARGIN + 60.0 * 9.5 + 0.3, day(), 60.0);
        assert_eq!(t, at(9, 30));
        assert_eq!(t.second(), 0);
    }

    #[test]
    fn geometry_round_trip_to_the_minute() {
        for hour_height in [37.0, 48.0, 60.0, 83.3] {
            for minute_of_day in (0..1440).step_by(7) {
                let t = at(minute_of_day / 60, minute_of_day % 60);
                let y = time_to_y(t, day(), hour_height);
                assert_eq!(y_to_time(y, day(), hour_height), t, "h={hour_height} t={t}");
            }
        }
    }

    #[test]
    fn snap_rounds_to_nearest_graduation() {
        assert_eq!(snap_to_grid(at(9, 4), 10), at(9, 0));
        assert_eq!(snap_to_grid(at(9, 5), 10), at(9, 10));
        assert_eq!(snap_to_grid(at(9, 17), 15), at(9, 15));
        assert_eq!(snap_to_grid(at(9, 23), 15), at(9, 30));
    }

    #[test]
    fn snap_carries_into_next_hour_and_day() {
        assert_eq!(snap_to_grid(at(9, 55), 10), at(10, 0));
        assert_eq!(
            snap_to_grid(at(23, 58), 10),
            day_start(day()) + Duration::days(1)
        );
    }

    #[test]
    fn snap_drops_seconds() {
        let t = day().and_hms_opt(9, 12, 45).unwrap();
        assert_eq!(snap_to_grid(t, 1), at(9, 12));
    }

    #[test]
    fn snap_is_idempotent() {
        for step in [1, 5, 10, 15, 30, 60] {
            for minute_of_day in 0..1440 {
                let once = snap_to_grid(at(minute_of_day / 60, minute_of_day % 60), step);
                assert_eq!(snap_to_grid(once, step), once, "step={step}");
            }
        }
    }

    #[test]
    fn day_index_lookup_is_partial() {
        assert_eq!(x_to_day_index(10.0, 50.0, 100.0, 7), None);
        assert_eq!(x_to_day_index(50.0, 50.0, 100.0, 7), Some(0));
        assert_eq!(x_to_day_index(249.9, 50.0, 100.0, 7), Some(1));
        assert_eq!(x_to_day_index(749.9, 50.0, 100.0, 7), Some(6));
        assert_eq!(x_to_day_index(750.0, 50.0, 100.0, 7), None);
        assert_eq!(x_to_day_index(60.0, 50.0, 0.0, 7), None);
    }

    #[test]
    fn day_index_to_x_inverts_lookup() {
        for index in 0..7 {
            let x = day_index_to_x(index, 56.0, 120.0);
            assert_eq!(x_to_day_index(x, 56.0, 120.0, 7), Some(index));
        }
    }

    #[test]
    fn rect_containment_is_half_open() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(rect.contains(Point::new(10.0, 10.0)));
        assert!(rect.contains(Point::new(29.9, 29.9)));
        assert!(!rect.contains(Point::new(30.0, 15.0)));
        assert!(!rect.contains(Point::new(15.0, 30.0)));
    }
}
