//! Cold Storage Simulator Core - Rust Engine
//!
//! Hour-stepped simulation of a meat-processing cold store: deboning output
//! collects in a refrigerated chamber and leaves through boxing, plate
//! freezing and fresh dispatch. Boxed product is palletised into freezing
//! tunnels, where it must dwell before it can be released.
//!
//! # Architecture
//!
//! - **core**: Hour clock
//! - **models**: Domain types (Batch, Tunnel, TunnelFarm, State, Event)
//! - **config**: Facility configuration and parameter-sheet loading
//! - **flows**: Stage rates and working windows
//! - **ledger**: Hourly snapshots and daily summaries
//! - **orchestrator**: Main simulation loop and checkpoints
//!
//! # Critical Invariants
//!
//! 1. Tunnel pallets stay within `0..=max_pallets`
//! 2. Tunnel totals equal the sums over their batch queues
//! 3. No kilogram is created or destroyed
//! 4. Execution is single-threaded and deterministic

// Module declarations
pub mod config;
pub mod core;
pub mod flows;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod orchestrator;

// Re-exports for convenience
pub use config::{ConfigError, FacilityConfig};
pub use core::time::HourClock;
pub use flows::{FlowPlan, FlowSummary};
pub use ledger::{DailySummary, HourlySnapshot, InventoryLedger, TunnelState};
pub use models::{
    batch::{Batch, PalletWeights, ProductType},
    event::{Event, EventLog},
    farm::{TunnelFarm, TunnelSpec},
    state::SimulationState,
    tunnel::{Affinity, Tunnel},
};
pub use orchestrator::{HourResult, Orchestrator, SimulationError};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn cold_storage_simulator_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::simulator::PySimulator>()?;
    Ok(())
}
