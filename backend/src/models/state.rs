//! Simulation State
//!
//! Scalar stock levels and counters owned by the scheduler. Tunnel contents
//! live in the [`TunnelFarm`](crate::models::TunnelFarm); this struct holds
//! everything else.
//!
//! # Critical Invariants
//!
//! 1. **Mass Conservation**: initial inventory + deboned kg equals
//!    chamber + tunnels + overflow + plates + fresh + released at every hour
//! 2. **Non-negative stock**: chamber stock never drops below zero
//! 3. **Daily counters** reset at hour-of-day 0

use serde::{Deserialize, Serialize};

/// Cumulative kg moved by each stage since the run began
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowTotals {
    /// Chamber plus tunnel seed inventory present at start
    pub initial_inventory_kg: f64,
    /// Deboning output into the chamber
    pub deboned_kg: f64,
    /// Drawn from the chamber by boxing (tunnel-bound, absorbed or overflowed)
    pub boxed_kg: f64,
    /// Drawn from the chamber by plate freezing
    pub plates_kg: f64,
    /// Dispatched fresh
    pub fresh_kg: f64,
    /// Removed from tunnels
    pub released_kg: f64,
}

impl FlowTotals {
    /// Everything that entered the system
    pub fn inputs_kg(&self) -> f64 {
        self.initial_inventory_kg + self.deboned_kg
    }

    /// Everything that left the modelled system
    pub fn outputs_kg(&self) -> f64 {
        self.plates_kg + self.fresh_kg + self.released_kg
    }

    /// Total product sent to freezing (boxing plus plates)
    pub fn frozen_kg(&self) -> f64 {
        self.boxed_kg + self.plates_kg
    }
}

/// Scheduler-owned simulation state
///
/// # Example
///
/// ```rust
/// use cold_storage_simulator_core_rs::SimulationState;
///
/// let mut state = SimulationState::new(5_000.0);
/// state.add_deboned(1_000.0);
/// assert_eq!(state.chamber_stock_kg(), 6_000.0);
///
/// let drawn = state.draw_from_chamber(10_000.0);
/// assert_eq!(drawn, 6_000.0);
/// assert_eq!(state.chamber_stock_kg(), 0.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Refrigerated stock not yet assigned to a tunnel or dispatched
    chamber_stock_kg: f64,

    /// Product that found no tunnel slot and must be frozen externally
    external_overflow_kg: f64,

    /// Deboning output so far today
    deboned_today_kg: f64,

    /// Fresh dispatch so far today
    fresh_today_kg: f64,

    /// Cumulative stage totals
    totals: FlowTotals,
}

impl SimulationState {
    /// Create a state with the given initial chamber stock
    pub fn new(initial_chamber_kg: f64) -> Self {
        let chamber = initial_chamber_kg.max(0.0);
        Self {
            chamber_stock_kg: chamber,
            totals: FlowTotals {
                initial_inventory_kg: chamber,
                ..FlowTotals::default()
            },
            ..Self::default()
        }
    }

    pub fn chamber_stock_kg(&self) -> f64 {
        self.chamber_stock_kg
    }

    pub fn external_overflow_kg(&self) -> f64 {
        self.external_overflow_kg
    }

    pub fn deboned_today_kg(&self) -> f64 {
        self.deboned_today_kg
    }

    pub fn fresh_today_kg(&self) -> f64 {
        self.fresh_today_kg
    }

    pub fn totals(&self) -> &FlowTotals {
        &self.totals
    }

    /// Reset the per-day counters (hour-of-day 0)
    pub fn reset_daily_counters(&mut self) {
        self.deboned_today_kg = 0.0;
        self.fresh_today_kg = 0.0;
    }

    /// Record seed inventory placed into tunnels
    pub fn record_seeded(&mut self, kg: f64) {
        self.totals.initial_inventory_kg += kg;
    }

    /// Record seed inventory that found no tunnel
    pub fn record_seed_overflow(&mut self, kg: f64) {
        self.totals.initial_inventory_kg += kg;
        self.external_overflow_kg += kg;
    }

    /// Add deboning output to the chamber
    pub fn add_deboned(&mut self, kg: f64) {
        self.chamber_stock_kg += kg;
        self.deboned_today_kg += kg;
        self.totals.deboned_kg += kg;
    }

    /// Take up to `kg` out of the chamber, returning what was taken
    pub fn draw_from_chamber(&mut self, kg: f64) -> f64 {
        let drawn = kg.min(self.chamber_stock_kg).max(0.0);
        self.chamber_stock_kg -= drawn;
        drawn
    }

    /// Record chamber product sent to boxing
    pub fn record_boxed(&mut self, kg: f64) {
        self.totals.boxed_kg += kg;
    }

    /// Record boxing output no tunnel could absorb
    pub fn add_overflow(&mut self, kg: f64) {
        self.external_overflow_kg += kg;
    }

    /// Record plate-freezing output
    pub fn record_plates(&mut self, kg: f64) {
        self.totals.plates_kg += kg;
    }

    /// Record fresh dispatch
    pub fn record_fresh(&mut self, kg: f64) {
        self.fresh_today_kg += kg;
        self.totals.fresh_kg += kg;
    }

    /// Record product removed from tunnels
    pub fn record_released(&mut self, kg: f64) {
        self.totals.released_kg += kg;
    }

    /// Mass-balance residual given the current tunnel stock
    ///
    /// # Returns
    ///
    /// Inputs minus (stock + outputs). Zero up to floating-point noise.
    pub fn mass_balance_residual(&self, tunnel_stock_kg: f64) -> f64 {
        let stock = self.chamber_stock_kg + tunnel_stock_kg + self.external_overflow_kg;
        self.totals.inputs_kg() - stock - self.totals.outputs_kg()
    }
}
