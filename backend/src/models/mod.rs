//! Domain models for the cold-storage simulator

pub mod batch;
pub mod event;
pub mod farm;
pub mod state;
pub mod tunnel;

// Re-exports
pub use batch::{Batch, PalletWeights, ProductType};
pub use event::{Event, EventLog};
pub use farm::{
    standard_tunnels, Admission, AllocationOutcome, ReleaseOutcome, SeedOutcome, SeedPlacement,
    TunnelFarm, TunnelSpec,
};
pub use state::{FlowTotals, SimulationState};
pub use tunnel::{Affinity, PalletsByType, Tunnel};
