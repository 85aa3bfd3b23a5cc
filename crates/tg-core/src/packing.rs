//! Column packing for overlapping segments.
//!
//! Greedy interval-graph coloring: segments sorted by start are placed in the
//! leftmost column whose last occupant has already ended. Because input is
//! sorted by start, only the most recent occupant of each column needs to be
//! checked, and the number of columns opened equals the maximum overlap depth.
//!
//! Every assignment in one packing shares the same `column_count` (the total
//! number of columns opened), so a day's width is divided evenly even when it
//! holds separate clusters of different depth.

use std::cmp::Reverse;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::segment::Segment;

/// Something occupying a half-open time interval.
///
/// This lets the packer lay out both timed segments within a day and all-day
/// bars across the visible range.
pub trait Packable {
    /// Inclusive start of the occupied interval.
    fn span_start(&self) -> NaiveDateTime;

    /// Exclusive end of the occupied interval.
    fn span_end(&self) -> NaiveDateTime;
}

impl Packable for Segment {
    fn span_start(&self) -> NaiveDateTime {
        self.start
    }

    fn span_end(&self) -> NaiveDateTime {
        self.end
    }
}

/// A segment placed in a display column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnAssignment<T = Segment> {
    pub segment: T,
    /// Zero-based column, left to right.
    pub column: usize,
    /// Columns the width is divided into.
    pub column_count: usize,
}

/// Assigns non-overlapping columns to `items`.
///
/// Deterministic on input order: ties on start are broken by longer duration
/// first, then by original position. Output is in placement order.
pub fn pack<T: Packable>(items: Vec<T>) -> Vec<ColumnAssignment<T>> {
    let mut items = items;
    items.sort_by_key(|item| {
        (
            item.span_start(),
            Reverse(item.span_end() - item.span_start()),
        )
    });

    // Last end placed in each column.
    let mut column_ends: Vec<NaiveDateTime> = Vec::new();
    let mut placed = Vec::with_capacity(items.len());
    for item in items {
        let start = item.span_start();
        let column = match column_ends.iter().position(|end| *end <= start) {
            Some(column) => {
                column_ends[column] = item.span_end();
                column
            }
            None => {
                column_ends.push(item.span_end());
                column_ends.len() - 1
            }
        };
        placed.push((item, column));
    }

    let column_count = column_ends.len();
    placed
        .into_iter()
        .map(|(segment, column)| ColumnAssignment {
            segment,
            column,
            column_count,
        })
        .collect()
}

/// Largest number of items covering a single instant.
pub fn max_overlap_depth<T: Packable>(items: &[T]) -> usize {
    let mut edges: Vec<(NaiveDateTime, i32)> = items
        .iter()
        .filter(|item| item.span_start() < item.span_end())
        .flat_map(|item| [(item.span_start(), 1), (item.span_end(), -1)])
        .collect();
    // Ends sort before starts at the same instant: touching intervals do not overlap.
    edges.sort_unstable();

    let mut depth = 0_i32;
    let mut deepest = 0_i32;
    for (_, delta) in edges {
        depth += delta;
        deepest = deepest.max(depth);
    }
    usize::try_from(deepest).unwrap_or(0)
}
