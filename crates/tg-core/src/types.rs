//! Core type definitions with validation.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A day range whose last day precedes its first day.
    #[error("day range is inverted: {from} is after {to}")]
    InvertedRange { from: NaiveDate, to: NaiveDate },

    /// A day range whose last day falls outside the calendar.
    #[error("day range of {days} days starting {from} is out of range")]
    RangeOverflow { from: NaiveDate, days: u32 },

    /// A configuration value outside its accepted domain.
    #[error("invalid timeline config: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// An opaque event identifier handed out by the event store.
    ///
    /// The timeline never interprets the contents; it only compares IDs to
    /// resolve a segment back to its source event.
    EventId, "event ID"
);

define_string_id!(
    /// A color token resolved to an actual color by the host's theme.
    ColorToken, "color token"
);

/// An inclusive range of calendar days shown side by side on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDayRange")]
pub struct DayRange {
    from: NaiveDate,
    to: NaiveDate,
}

#[derive(Deserialize)]
struct RawDayRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl TryFrom<RawDayRange> for DayRange {
    type Error = ValidationError;

    fn try_from(raw: RawDayRange) -> Result<Self, Self::Error> {
        Self::new(raw.from, raw.to)
    }
}

impl DayRange {
    /// Creates a range covering `from..=to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, ValidationError> {
        if to < from {
            return Err(ValidationError::InvertedRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// A range of `days` consecutive days starting at `from`. Zero days is
    /// treated as one.
    pub fn starting(from: NaiveDate, days: u32) -> Result<Self, ValidationError> {
        let to = Duration::try_days(i64::from(days.max(1)) - 1)
            .and_then(|span| from.checked_add_signed(span))
            // The range ends at the midnight after `to`, which must exist too.
            .filter(|to| to.succ_opt().is_some())
            .ok_or(ValidationError::RangeOverflow { from, days })?;
        Ok(Self { from, to })
    }

    pub const fn from(&self) -> NaiveDate {
        self.from
    }

    pub const fn to(&self) -> NaiveDate {
        self.to
    }

    /// Number of days in the range, always at least one.
    pub fn day_count(&self) -> usize {
        usize::try_from((self.to - self.from).num_days() + 1).unwrap_or(1)
    }

    /// Midnight at the start of the first day.
    pub fn start_instant(&self) -> NaiveDateTime {
        day_start(self.from)
    }

    /// Midnight after the last day (exclusive end).
    pub fn end_instant(&self) -> NaiveDateTime {
        day_start(self.to) + Duration::days(1)
    }

    /// The calendar date shown in column `index`, if inside the range.
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        if index >= self.day_count() {
            return None;
        }
        let offset = i64::try_from(index).ok()?;
        Some(self.from + Duration::days(offset))
    }

    /// The column index of `date`, if inside the range.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        if date < self.from || date > self.to {
            return None;
        }
        usize::try_from((date - self.from).num_days()).ok()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.index_of(date).is_some()
    }

    /// Iterates over every date in the range.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.from.iter_days().take_while(|d| *d <= self.to)
    }
}

impl fmt::Display for DayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.from, self.to)
    }
}

/// Midnight at the start of `date`.
pub fn day_start(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}
