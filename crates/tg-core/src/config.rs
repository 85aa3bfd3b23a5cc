//! Timeline sizing and interaction configuration.

use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// Host-settable options for geometry and gesture handling.
///
/// Missing fields fall back to [`TimelineConfig::default`] when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Height of one hour on the canvas, in pixels.
    /// Default: 60.
    pub hour_pixel_height: f64,

    /// Width of one day column, in pixels.
    /// Default: 120.
    pub day_column_pixel_width: f64,

    /// Snapping resolution for dragged times. Must divide 60.
    /// Default: 10.
    pub graduation_minutes: u32,

    /// All-day rows shown before the all-day region scrolls internally.
    /// Default: 2.5.
    pub max_visible_all_day_rows: f64,

    /// Smallest height a resize ghost may shrink to.
    /// Default: 20.
    pub min_segment_pixel_height: f64,

    /// Height of one all-day lane.
    /// Default: 24.
    pub all_day_row_pixel_height: f64,

    /// Width of the pinned hour ruler on the leading edge.
    /// Default: 56.
    pub hour_ruler_pixel_width: f64,

    /// Height of the pinned day header on the top edge.
    /// Default: 44.
    pub day_header_pixel_height: f64,

    /// Height of the grab band at either end of the focused event.
    /// Default: 10.
    pub resize_handle_pixel_height: f64,

    /// Display length of zero-duration events, for hit testing only.
    /// Default: 30.
    pub zero_duration_display_minutes: u32,

    /// Length given to an all-day event dropped onto the timed canvas.
    /// Default: 60.
    pub converted_timed_duration_minutes: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            hour_pixel_height: 60.0,
            day_column_pixel_width: 120.0,
            graduation_minutes: 10,
            max_visible_all_day_rows: 2.5,
            min_segment_pixel_height: 20.0,
            all_day_row_pixel_height: 24.0,
            hour_ruler_pixel_width: 56.0,
            day_header_pixel_height: 44.0,
            resize_handle_pixel_height: 10.0,
            zero_duration_display_minutes: 30,
            converted_timed_duration_minutes: 60,
        }
    }
}

impl TimelineConfig {
    /// Checks every field against its accepted domain.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let positive = [
            ("hour_pixel_height", self.hour_pixel_height),
            ("day_column_pixel_width", self.day_column_pixel_width),
            ("max_visible_all_day_rows", self.max_visible_all_day_rows),
            ("all_day_row_pixel_height", self.all_day_row_pixel_height),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ValidationError::InvalidConfig {
                    field,
                    reason: "must be a positive number",
                });
            }
        }

        let non_negative = [
            ("min_segment_pixel_height", self.min_segment_pixel_height),
            ("hour_ruler_pixel_width", self.hour_ruler_pixel_width),
            ("day_header_pixel_height", self.day_header_pixel_height),
            ("resize_handle_pixel_height", self.resize_handle_pixel_height),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ValidationError::InvalidConfig {
                    field,
                    reason: "must not be negative",
                });
            }
        }

        if self.graduation_minutes == 0 || 60 % self.graduation_minutes != 0 {
            return Err(ValidationError::InvalidConfig {
                field: "graduation_minutes",
                reason: "must be a divisor of 60",
            });
        }
        if self.converted_timed_duration_minutes == 0 {
            return Err(ValidationError::InvalidConfig {
                field: "converted_timed_duration_minutes",
                reason: "must be at least one minute",
            });
        }
        Ok(())
    }

    /// Visible height cap of the all-day region.
    pub fn max_all_day_visible_height(&self) -> f64 {
        self.max_visible_all_day_rows * self.all_day_row_pixel_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(TimelineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: TimelineConfig =
            serde_json::from_str(r#"{"hour_pixel_height": 48.0, "graduation_minutes": 15}"#)
                .unwrap();
        assert!((config.hour_pixel_height - 48.0).abs() < f64::EPSILON);
        assert_eq!(config.graduation_minutes, 15);
        assert!((config.max_visible_all_day_rows - 2.5).abs() < f64::EPSILON);
        assert!((config.min_segment_pixel_height - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_graduation_not_dividing_hour() {
        let config = TimelineConfig {
            graduation_minutes: 7,
            ..TimelineConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid timeline config: graduation_minutes must be a divisor of 60"
        );
    }

    #[test]
    fn rejects_non_positive_sizes() {
        let config = TimelineConfig {
            day_column_pixel_width: 0.0,
            ..TimelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidConfig {
                field: "day_column_pixel_width",
                ..
            })
        ));

        let config = TimelineConfig {
            hour_pixel_height: f64::NAN,
            ..TimelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn all_day_cap_is_two_and_a_half_rows() {
        let config = TimelineConfig::default();
        assert!((config.max_all_day_visible_height() - 60.0).abs() < f64::EPSILON);
    }
}
