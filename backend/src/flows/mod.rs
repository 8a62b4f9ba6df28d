//! Stage flow planning
//!
//! Converts configured stage parameters into hourly demands:
//! - [`StageWindow`]: hour-of-day window a stage works in
//! - [`StagePlan`]: rate, window and optional daily cap
//! - [`FlowPlan`]: normal-day and extra-day plans plus a [`FlowSummary`]

pub mod plan;
pub mod stage;

pub use plan::{DayPlan, FlowPlan, FlowSummary};
pub use stage::{StagePlan, StageWindow};
