//! Reply segmentation and pacing.
//!
//! Turns an arbitrarily long generated reply into a size-bounded, paced
//! delivery plan. [`segment`] locates cut points and [`chunk`] builds
//! the numbered segments from them; [`pacing`] then schedules the
//! delays between parts. Everything here is pure computation over
//! in-memory strings; delivery and persistence live elsewhere.

pub mod chunk;
pub mod pacing;
pub mod segment;

pub use {
    chunk::{DEFAULT_MAX_SEGMENT_LEN, PlanOptions, Segment, plan, plan_with},
    pacing::{DeliveryPlan, PacingConfig, PlannedItem, ScheduledItem, schedule},
    segment::find_boundary,
};
