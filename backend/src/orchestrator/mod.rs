//! Orchestrator - hourly flow scheduler
//!
//! See `engine.rs` for the hour loop and `checkpoint.rs` for save/restore.

pub mod checkpoint;
pub mod engine;

// Re-export main types for convenience
pub use engine::{
    FixedDelayPacing, HourResult, NoPacing, Orchestrator, PacingHook, SimulationError,
};

// Re-export checkpoint types
pub use checkpoint::{StateSnapshot, TunnelSnapshot};
