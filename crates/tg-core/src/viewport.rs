//! Pinned two-axis scrolling.
//!
//! The timeline viewport is split into four regions that share one logical
//! scroll position:
//!
//! ```text
//! +--------+----------------------------+
//! | corner | day header      (x mirror) |
//! +--------+----------------------------+
//! | corner | all-day row (x mirror, own |
//! |        |   bounded vertical scroll) |
//! +--------+----------------------------+
//! | hour   | canvas                     |
//! | ruler  |   (scrolls on both axes)   |
//! |(y mirr)|                            |
//! +--------+----------------------------+
//! ```
//!
//! Only the canvas is scrolled directly. Every canvas scroll pushes `x` to the
//! header and all-day row and `y` to the hour ruler.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::TimelineConfig;
use crate::geometry::{
    GridMetrics, Point, Rect, Size, TOP_MARGIN, day_canvas_height, day_index_to_x, time_to_y,
    x_to_day_index,
};
use crate::model::{FrameRegion, SegmentFrame, TimelineModel};
use crate::types::DayRange;

/// Heights closer than this are considered equal between layout passes.
const HEIGHT_TOLERANCE: f64 = 0.5;

/// Zoom limits for the hour height.
const MIN_HOUR_HEIGHT: f64 = 12.0;
const MAX_HOUR_HEIGHT: f64 = 400.0;

/// Part of the viewport under a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Top-left gutter, above the ruler and left of the header.
    Corner,
    DayHeader,
    AllDay,
    HourRuler,
    Canvas,
    /// Outside the viewport entirely.
    Outside,
}

/// Content offsets of each region, already synchronized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionOffsets {
    /// Horizontal is always zero.
    pub hour_ruler: Point,
    /// Vertical is always zero.
    pub day_header: Point,
    pub all_day: Point,
    pub canvas: Point,
}

/// Scroll and sizing state of one timeline instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewportState {
    pub visible_range: DayRange,
    /// Canvas scroll offset; the other regions mirror it.
    pub scroll_offset: Point,
    /// Visible height of the all-day region.
    pub all_day_row_height: f64,
    /// Full height of the all-day lanes, uncapped.
    pub all_day_content_height: f64,
    /// Internal vertical scroll of the all-day region.
    pub all_day_scroll_y: f64,
    pub hour_pixel_height: f64,
    pub day_column_pixel_width: f64,
    pub viewport_size: Size,
}

/// Space available to the all-day lanes during a layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllDayBounds {
    pub visible_height: f64,
}

/// Outcome of [`PinnedScrollCoordinator::relayout_all_day`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AllDayRelayout {
    /// Layout passes run: one when the height was stable, two otherwise.
    pub passes: u8,
    /// Visible height after the final pass.
    pub height: f64,
    /// `false` when the second pass still disagreed with the first; its
    /// result is accepted anyway.
    pub converged: bool,
}

/// Keeps the hour ruler, day header, all-day row and canvas in sync.
#[derive(Debug, Clone)]
pub struct PinnedScrollCoordinator {
    state: ViewportState,
    ruler_width: f64,
    header_height: f64,
    all_day_cap: f64,
}

impl PinnedScrollCoordinator {
    pub fn new(config: &TimelineConfig, range: DayRange, viewport_size: Size) -> Self {
        Self {
            state: ViewportState {
                visible_range: range,
                scroll_offset: Point::ZERO,
                all_day_row_height: 0.0,
                all_day_content_height: 0.0,
                all_day_scroll_y: 0.0,
                hour_pixel_height: config.hour_pixel_height,
                day_column_pixel_width: config.day_column_pixel_width,
                viewport_size,
            },
            ruler_width: config.hour_ruler_pixel_width,
            header_height: config.day_header_pixel_height,
            all_day_cap: config.max_all_day_visible_height(),
        }
    }

    pub const fn state(&self) -> &ViewportState {
        &self.state
    }

    /// Metrics for laying out frames at the current zoom.
    pub fn metrics(&self, all_day_row_height: f64) -> GridMetrics {
        GridMetrics {
            hour_height: self.state.hour_pixel_height,
            column_width: self.state.day_column_pixel_width,
            all_day_row_height,
        }
    }

    /// Size of the scrollable canvas content.
    pub fn content_size(&self) -> Size {
        #[allow(clippy::cast_precision_loss)]
        let days = self.state.visible_range.day_count() as f64;
        Size::new(
            days * self.state.day_column_pixel_width,
            day_canvas_height(self.state.hour_pixel_height),
        )
    }

    /// Viewport position of the canvas's top-left corner.
    pub fn canvas_origin(&self) -> Point {
        Point::new(
            self.ruler_width,
            self.header_height + self.state.all_day_row_height,
        )
    }

    /// Size of the canvas region on screen.
    pub fn canvas_visible_size(&self) -> Size {
        let origin = self.canvas_origin();
        Size::new(
            (self.state.viewport_size.width - origin.x).max(0.0),
            (self.state.viewport_size.height - origin.y).max(0.0),
        )
    }

    /// Largest canvas scroll offset on each axis.
    pub fn max_scroll(&self) -> Point {
        let content = self.content_size();
        let visible = self.canvas_visible_size();
        Point::new(
            (content.width - visible.width).max(0.0),
            (content.height - visible.height).max(0.0),
        )
    }

    /// Offsets of every region, derived from the single canvas offset.
    pub fn offsets(&self) -> RegionOffsets {
        let scroll = self.state.scroll_offset;
        RegionOffsets {
            hour_ruler: Point::new(0.0, scroll.y),
            day_header: Point::new(scroll.x, 0.0),
            all_day: Point::new(scroll.x, self.state.all_day_scroll_y),
            canvas: scroll,
        }
    }

    /// Scrolls the canvas, clamped to its content, and propagates the offset.
    pub fn scroll_canvas_to(&mut self, offset: Point) -> RegionOffsets {
        let max = self.max_scroll();
        let clamped = Point::new(
            clamp_offset(offset.x, max.x),
            clamp_offset(offset.y, max.y),
        );
        if clamped != self.state.scroll_offset {
            trace!(x = clamped.x, y = clamped.y, "canvas scrolled");
            self.state.scroll_offset = clamped;
        }
        self.offsets()
    }

    pub fn scroll_canvas_by(&mut self, delta: Point) -> RegionOffsets {
        self.scroll_canvas_to(self.state.scroll_offset + delta)
    }

    /// Scrolls the all-day row internally. Bounded by its uncapped content.
    pub fn scroll_all_day_to(&mut self, y: f64) -> RegionOffsets {
        let max = (self.state.all_day_content_height - self.state.all_day_row_height).max(0.0);
        self.state.all_day_scroll_y = clamp_offset(y, max);
        self.offsets()
    }

    /// Brings the line of `time` to the top edge of the visible canvas.
    pub fn scroll_to_time(&mut self, time: NaiveTime) -> RegionOffsets {
        let y = time_to_y(
            NaiveDate::MIN.and_time(time),
            NaiveDate::MIN,
            self.state.hour_pixel_height,
        );
        self.scroll_canvas_to(Point::new(self.state.scroll_offset.x, y))
    }

    /// Brings day column `index` to the leading edge.
    pub fn scroll_to_day(&mut self, index: usize) -> RegionOffsets {
        let x = day_index_to_x(index, 0.0, self.state.day_column_pixel_width);
        self.scroll_canvas_to(Point::new(x, self.state.scroll_offset.y))
    }

    pub fn set_viewport_size(&mut self, size: Size) -> RegionOffsets {
        self.state.viewport_size = size;
        self.reclamp()
    }

    /// Adopts a new visible range and recomputes the content size.
    pub fn set_visible_range(&mut self, range: DayRange) -> Size {
        self.state.visible_range = range;
        self.reclamp();
        let size = self.content_size();
        debug!(%range, width = size.width, height = size.height, "content resized");
        size
    }

    /// Zooms the hour height, keeping the time at the top of the canvas fixed.
    pub fn set_hour_pixel_height(&mut self, height: f64) -> RegionOffsets {
        let height = if height.is_finite() {
            height.clamp(MIN_HOUR_HEIGHT, MAX_HOUR_HEIGHT)
        } else {
            self.state.hour_pixel_height
        };
        let ratio = height / self.state.hour_pixel_height;
        self.state.hour_pixel_height = height;
        let y = (self.state.scroll_offset.y - TOP_MARGIN).mul_add(ratio, TOP_MARGIN);
        self.scroll_canvas_to(Point::new(self.state.scroll_offset.x, y))
    }

    /// Resizes the all-day row in at most two layout passes.
    ///
    /// `layout` lays out the all-day lanes within the given bounds and returns
    /// their full content height. The first pass runs against the current
    /// bounds; if the resulting visible height differs from the previous one
    /// by more than half a pixel, the bounds are corrected and `layout` runs
    /// once more. The second result is accepted whether or not it agrees.
    pub fn relayout_all_day<F>(&mut self, mut layout: F) -> AllDayRelayout
    where
        F: FnMut(&AllDayBounds) -> f64,
    {
        let previous = self.state.all_day_row_height;
        let first = layout(&self.all_day_bounds());
        let first_visible = self.capped(first);

        if (first_visible - previous).abs() <= HEIGHT_TOLERANCE {
            self.apply_all_day_height(previous, first);
            return AllDayRelayout {
                passes: 1,
                height: previous,
                converged: true,
            };
        }

        self.apply_all_day_height(first_visible, first);
        let second = layout(&self.all_day_bounds());
        let second_visible = self.capped(second);
        let converged = (second_visible - first_visible).abs() <= HEIGHT_TOLERANCE;
        self.apply_all_day_height(second_visible, second);
        debug!(
            previous,
            height = second_visible,
            converged,
            "all-day row resized"
        );
        AllDayRelayout {
            passes: 2,
            height: second_visible,
            converged,
        }
    }

    /// Classifies a viewport point.
    pub fn region_at(&self, p: Point) -> Region {
        let size = self.state.viewport_size;
        if p.x.is_nan()
            || p.y.is_nan()
            || p.x < 0.0
            || p.y < 0.0
            || p.x >= size.width
            || p.y >= size.height
        {
            return Region::Outside;
        }
        let in_gutter = p.x < self.ruler_width;
        if p.y < self.header_height {
            return if in_gutter {
                Region::Corner
            } else {
                Region::DayHeader
            };
        }
        if p.y < self.header_height + self.state.all_day_row_height {
            return if in_gutter {
                Region::Corner
            } else {
                Region::AllDay
            };
        }
        if in_gutter {
            Region::HourRuler
        } else {
            Region::Canvas
        }
    }

    /// Maps a viewport point into canvas content coordinates.
    pub fn to_canvas(&self, p: Point) -> Point {
        p - self.canvas_origin() + self.state.scroll_offset
    }

    /// Maps a viewport point into all-day content coordinates.
    pub fn to_all_day(&self, p: Point) -> Point {
        p - Point::new(self.ruler_width, self.header_height)
            + Point::new(self.state.scroll_offset.x, self.state.all_day_scroll_y)
    }

    /// Maps a content frame of either region into viewport coordinates.
    pub fn frame_to_viewport(&self, rect: Rect, region: FrameRegion) -> Rect {
        let origin = match region {
            FrameRegion::Canvas => self.canvas_origin() - self.state.scroll_offset,
            FrameRegion::AllDay => {
                Point::new(self.ruler_width, self.header_height)
                    - Point::new(self.state.scroll_offset.x, self.state.all_day_scroll_y)
            }
        };
        rect.translated(origin)
    }

    /// Every segment frame of `model`, mapped into viewport coordinates.
    pub fn viewport_frames(
        &self,
        model: &TimelineModel,
        all_day_row_height: f64,
    ) -> Vec<SegmentFrame> {
        model
            .frames(&self.metrics(all_day_row_height))
            .into_iter()
            .map(|frame| SegmentFrame {
                rect: self.frame_to_viewport(frame.rect, frame.region),
                ..frame
            })
            .collect()
    }

    /// Visible day column under a viewport point, ignoring the vertical axis.
    pub fn day_index_at(&self, p: Point) -> Option<usize> {
        if p.x < self.ruler_width {
            return None;
        }
        x_to_day_index(
            p.x - self.ruler_width + self.state.scroll_offset.x,
            0.0,
            self.state.day_column_pixel_width,
            self.state.visible_range.day_count(),
        )
    }

    const fn all_day_bounds(&self) -> AllDayBounds {
        AllDayBounds {
            visible_height: self.state.all_day_row_height,
        }
    }

    fn capped(&self, content_height: f64) -> f64 {
        content_height.max(0.0).min(self.all_day_cap)
    }

    fn apply_all_day_height(&mut self, visible: f64, content: f64) {
        self.state.all_day_row_height = visible;
        self.state.all_day_content_height = content.max(0.0);
        let max = (self.state.all_day_content_height - visible).max(0.0);
        self.state.all_day_scroll_y = clamp_offset(self.state.all_day_scroll_y, max);
        self.reclamp();
    }

    fn reclamp(&mut self) -> RegionOffsets {
        self.scroll_canvas_to(self.state.scroll_offset)
    }
}

fn clamp_offset(value: f64, max: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, max) }
}
