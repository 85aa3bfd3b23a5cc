//! Layout and interaction engine for calendar day/week timelines.
//!
//! This crate contains the pieces a host UI needs to draw and edit a
//! scrolling time grid:
//! - Geometry: mapping between wall-clock times and canvas pixels
//! - Segmentation: splitting events into per-day pieces
//! - Packing: placing overlapping pieces side by side
//! - Interaction: turning drags, resizes and taps into edit intents
//! - Viewport: keeping the pinned ruler, header and all-day row in sync
//!
//! [`Timeline`] wires these together for a single timeline instance.

mod clock;
pub mod config;
pub mod event;
pub mod geometry;
pub mod interaction;
pub mod model;
mod packing;
pub mod segment;
mod timeline;
pub mod types;
pub mod viewport;

pub use clock::NowIndicator;
pub use config::TimelineConfig;
pub use event::CalendarEvent;
pub use geometry::{GridMetrics, Point, Rect, Size};
pub use interaction::{
    ChangeScope, DragMode, Intent, InteractionController, InteractionState, RecurrenceChoice,
};
pub use model::{DayLayout, FrameRegion, SegmentFrame, SegmentKey, TimelineModel};
pub use packing::{ColumnAssignment, Packable, max_overlap_depth, pack};
pub use segment::{EventSegmenter, Segment};
pub use timeline::{RenderFrame, RenderedSegment, Timeline};
pub use types::{ColorToken, DayRange, EventId, ValidationError};
pub use viewport::{PinnedScrollCoordinator, Region, RegionOffsets, ViewportState};
