//! Display state of the pinned hour ruler.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::geometry::time_to_y;
use crate::types::day_start;

/// Minute offset shown beside an hour line while a gesture is live.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MinuteMarker {
    /// Hour line the label sits next to.
    pub hour: u32,
    /// Minutes past `hour`, never zero.
    pub minute: u32,
    /// Vertical position in canvas content coordinates.
    pub y: f64,
}

impl MinuteMarker {
    pub fn label(&self) -> String {
        format!("+{}", self.minute)
    }
}

/// One labelled hour line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourLine {
    pub hour: u32,
    pub y: f64,
    pub label: String,
}

/// What the hour ruler draws besides its fixed hour labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HourRuler {
    marker: Option<MinuteMarker>,
}

impl HourRuler {
    pub const fn marker(&self) -> Option<&MinuteMarker> {
        self.marker.as_ref()
    }

    /// Shows the minute offset of `snapped`, or clears the marker when it
    /// sits exactly on an hour.
    pub fn show_minute(&mut self, snapped: NaiveDateTime, day: NaiveDate, hour_height: f64) {
        let minute = snapped.minute();
        self.marker = (minute != 0).then(|| MinuteMarker {
            hour: snapped.hour(),
            minute,
            y: time_to_y(snapped, day, hour_height),
        });
    }

    pub fn clear(&mut self) {
        self.marker = None;
    }

    /// Hour lines `0:00` through `24:00` for the given zoom.
    pub fn hour_lines(hour_height: f64) -> Vec<HourLine> {
        let day = NaiveDate::MIN;
        (0..=24_u32)
            .map(|hour| HourLine {
                hour,
                y: time_to_y(
                    day_start(day) + chrono::Duration::hours(i64::from(hour)),
                    day,
                    hour_height,
                ),
                label: format!("{hour:02}:00"),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TOP_MARGIN;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 14).unwrap()
    }

    #[test]
    fn marker_shows_non_zero_minutes() {
        let mut ruler = HourRuler::default();
        ruler.show_minute(day().and_hms_opt(9, 20, 0).unwrap(), day(), 60.0);

        let marker = ruler.marker().expect("marker should be shown");
        assert_eq!((marker.hour, marker.minute), (9, 20));
        assert_eq!(marker.label(), "+20");
        assert!((marker.y - (TOP_MARGIN + 560.0)).abs() < 1e-9);
    }

    #[test]
    fn exact_hour_drops_marker() {
        let mut ruler = HourRuler::default();
        ruler.show_minute(day().and_hms_opt(9, 20, 0).unwrap(), day(), 60.0);
        ruler.show_minute(day().and_hms_opt(10, 0, 0).unwrap(), day(), 60.0);
        assert!(ruler.marker().is_none());
    }

    #[test]
    fn hour_lines_cover_both_midnights() {
        let lines = HourRuler::hour_lines(50.0);
        assert_eq!(lines.len(), 25);
        assert_eq!(lines[0].label, "00:00");
        assert_eq!(lines[24].label, "24:00");
        assert!((lines[24].y - (TOP_MARGIN + 1200.0)).abs() < 1e-9);
    }
}
