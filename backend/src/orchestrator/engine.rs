//! Orchestrator Engine
//!
//! The hourly flow scheduler. Owns the clock, the tunnel farm, the scalar
//! stock levels and the ledger, and moves kilograms between them one
//! simulated hour at a time.
//!
//! # Architecture
//!
//! ```text
//! Construction:
//!   derive flow plan, seed frozen stock, seed still-freezing stock
//!
//! For each hour h:
//! 1. Reset daily counters at hour-of-day 0
//! 2. Deboning into the chamber (daily cap)
//! 3. Boxing out of the chamber, two-pass tunnel allocation, overflow
//! 4. Plate freezing out of the chamber
//! 5. Fresh dispatch out of the chamber (daily cap)
//! 6. Tunnel release in farm order
//! 7. Snapshot, plus a daily summary at day boundaries
//! 8. Pacing hook
//! ```
//!
//! # Example
//!
//! ```rust
//! use cold_storage_simulator_core_rs::config::FacilityConfig;
//! use cold_storage_simulator_core_rs::orchestrator::Orchestrator;
//!
//! let mut config = FacilityConfig::default();
//! config.horizon_hours = 48;
//! config.initial_inventory.chamber_kg = 20_000.0;
//! config.boxing.start_hour = 6.0;
//! config.boxing.duration_hours = 8.0;
//! config.boxing.line_kg_per_hour = vec![1_000.0];
//!
//! let mut orchestrator = Orchestrator::new(config).unwrap();
//! let first = orchestrator.tick().unwrap();
//! assert_eq!(first.hour, 1);
//!
//! let ledger = orchestrator.run().unwrap();
//! assert_eq!(ledger.snapshots().len(), 48);
//! assert_eq!(ledger.daily_summaries().len(), 2);
//! ```

use crate::config::FacilityConfig;
use crate::core::time::HourClock;
use crate::flows::{FlowPlan, FlowSummary};
use crate::ledger::{DailySummary, HourlySnapshot, InventoryLedger, TunnelState};
use crate::models::batch::{ProductType, FROZEN_ENTRY_HOUR, MEAT_DWELL_HOURS};
use crate::models::event::{Event, EventLog};
use crate::models::farm::TunnelFarm;
use crate::models::state::SimulationState;
use crate::orchestrator::checkpoint::{
    compute_config_hash, validate_snapshot, StateSnapshot, TunnelSnapshot,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Pacing
// ============================================================================

/// Hook invoked after each hour's snapshot
///
/// Pacing exists for presentation only and must not touch simulation state.
pub trait PacingHook: Send {
    fn after_hour(&mut self, hour: usize);
}

/// Headless pacing: returns immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

impl PacingHook for NoPacing {
    fn after_hour(&mut self, _hour: usize) {}
}

/// Sleeps a fixed wall-clock delay after every simulated hour
#[derive(Debug, Clone, Copy)]
pub struct FixedDelayPacing {
    delay: Duration,
}

impl FixedDelayPacing {
    /// Negative or non-finite delays are treated as zero
    pub fn new(seconds_per_hour: f64) -> Self {
        let delay = if seconds_per_hour.is_finite() && seconds_per_hour > 0.0 {
            Duration::from_secs_f64(seconds_per_hour)
        } else {
            Duration::ZERO
        };
        Self { delay }
    }

    /// Pacing configured by `pacing_seconds_per_hour`
    pub fn from_config(config: &FacilityConfig) -> Self {
        Self::new(config.pacing_seconds_per_hour)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl PacingHook for FixedDelayPacing {
    fn after_hour(&mut self, _hour: usize) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }
}

// ============================================================================
// Results and errors
// ============================================================================

/// Kg moved by each stage during one hour
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourResult {
    pub hour: usize,
    pub deboned_kg: f64,
    /// Drawn from the chamber for boxing
    pub boxed_kg: f64,
    /// Boxed kg that found a tunnel slot
    pub absorbed_kg: f64,
    /// Boxed kg sent to external freezing
    pub overflow_added_kg: f64,
    pub plates_kg: f64,
    pub fresh_kg: f64,
    pub released_kg: f64,
}

/// Simulation error types
///
/// Running out of tunnel space is not an error; it shows up as overflow.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Simulation horizon exhausted at hour {hour}")]
    HorizonExhausted { hour: usize },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("State validation error: {0}")]
    StateValidationError(String),

    #[error("Config mismatch: checkpoint expects {expected}, got {actual}")]
    ConfigMismatch { expected: String, actual: String },
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Hourly flow scheduler
pub struct Orchestrator {
    /// Configuration the run was built from
    config: FacilityConfig,

    /// Derived stage rates and windows
    plan: FlowPlan,

    /// Hour position
    clock: HourClock,

    /// Tunnels in priority order
    farm: TunnelFarm,

    /// Chamber stock, overflow and counters
    state: SimulationState,

    /// Hourly and daily history
    ledger: InventoryLedger,

    /// Event log for replay and analysis
    event_log: EventLog,

    /// Presentation pacing
    pacing: Box<dyn PacingHook>,

    /// Identifier attached to log lines and checkpoints
    run_id: Uuid,
}

impl Orchestrator {
    /// Create a new orchestrator and seed the initial inventory
    ///
    /// # Arguments
    ///
    /// * `config` - Facility configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Orchestrator)` - Ready to run hour 1
    /// * `Err(SimulationError::InvalidConfig)` - Tunnel layout is malformed
    pub fn new(config: FacilityConfig) -> Result<Self, SimulationError> {
        config
            .validate()
            .map_err(|e| SimulationError::InvalidConfig(e.to_string()))?;
        Self::warn_degenerate(&config);

        let plan = FlowPlan::from_config(&config);
        let clock = HourClock::new(config.horizon_hours, config.has_extra_day(), config.start_date);
        let farm = TunnelFarm::new(&config.tunnels);
        let state = SimulationState::new(non_negative(
            "initial_inventory.chamber_kg",
            config.initial_inventory.chamber_kg,
        ));

        let mut orchestrator = Self {
            config,
            plan,
            clock,
            farm,
            state,
            ledger: InventoryLedger::new(),
            event_log: EventLog::new(),
            pacing: Box::new(NoPacing),
            run_id: Uuid::new_v4(),
        };
        orchestrator.seed_inventory();

        tracing::info!(
            run_id = %orchestrator.run_id,
            horizon_hours = orchestrator.clock.total_hours(),
            extra_day = orchestrator.config.has_extra_day(),
            tunnels = orchestrator.farm.len(),
            seed_overflow_kg = orchestrator.state.external_overflow_kg(),
            "simulation initialised"
        );

        Ok(orchestrator)
    }

    /// Replace the pacing hook
    pub fn with_pacing(mut self, pacing: Box<dyn PacingHook>) -> Self {
        self.pacing = pacing;
        self
    }

    /// Replace the pacing hook in place
    pub fn set_pacing(&mut self, pacing: Box<dyn PacingHook>) {
        self.pacing = pacing;
    }

    fn warn_degenerate(config: &FacilityConfig) {
        let percent = config.bones_percent;
        if !(0.0..=100.0).contains(&percent) {
            tracing::warn!(
                bones_percent = percent,
                effective = config.effective_bones_percent(),
                "bones percentage out of range; clamped"
            );
        }
        let weights = &config.pallet_weights;
        for (product, kg) in [("bones", weights.bones_kg), ("meat", weights.meat_kg)] {
            if !(kg.is_finite() && kg > 0.0) {
                tracing::warn!(
                    product,
                    kg_per_pallet = kg,
                    "degenerate pallet weight; this product cannot enter tunnels"
                );
            }
        }
    }

    // ========================================================================
    // Initial seeding
    // ========================================================================

    /// Place pre-existing tunnel stock: frozen first, then still-freezing
    fn seed_inventory(&mut self) {
        let inventory = &self.config.initial_inventory;
        let frozen_kg = non_negative("initial_inventory.frozen_tunnel_kg", inventory.frozen_tunnel_kg);
        let freezing_kg = non_negative(
            "initial_inventory.freezing_tunnel_kg",
            inventory.freezing_tunnel_kg,
        );

        // Remaining freezing time maps onto a negative entry hour
        let remaining = (inventory.freezing_hours_remaining as i64).min(MEAT_DWELL_HOURS - 1);
        let freezing_entry_hour = if remaining > 0 {
            -(MEAT_DWELL_HOURS - remaining)
        } else {
            FROZEN_ENTRY_HOUR
        };

        self.seed_lot(frozen_kg, FROZEN_ENTRY_HOUR);
        self.seed_lot(freezing_kg, freezing_entry_hour);
    }

    fn seed_lot(&mut self, kg: f64, entry_hour: i64) {
        if kg <= 0.0 {
            return;
        }

        let outcome = self.farm.seed_initial(
            kg,
            entry_hour,
            self.config.effective_bones_percent(),
            &self.config.pallet_weights,
        );

        for placement in &outcome.placements {
            self.event_log.log(Event::InventorySeeded {
                tunnel: placement.tunnel.clone(),
                product: placement.product,
                kg: placement.kg,
                pallets: placement.pallets,
                entry_hour,
            });
        }
        self.state.record_seeded(outcome.placed_kg());

        if outcome.remainder_kg > 0.0 {
            tracing::warn!(
                kg = outcome.remainder_kg,
                entry_hour,
                "initial tunnel stock does not fit; sent to external freezing"
            );
            self.state.record_seed_overflow(outcome.remainder_kg);
            self.event_log.log(Event::SeedOverflow {
                kg: outcome.remainder_kg,
            });
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &FacilityConfig {
        &self.config
    }

    pub fn flow_plan(&self) -> &FlowPlan {
        &self.plan
    }

    /// Headline stage rates
    pub fn flow_summary(&self) -> &FlowSummary {
        self.plan.summary()
    }

    pub fn clock(&self) -> &HourClock {
        &self.clock
    }

    /// Last simulated hour (0 before the first tick)
    pub fn current_hour(&self) -> usize {
        self.clock.current_hour()
    }

    pub fn total_hours(&self) -> usize {
        self.clock.total_hours()
    }

    pub fn is_finished(&self) -> bool {
        self.clock.is_finished()
    }

    pub fn farm(&self) -> &TunnelFarm {
        &self.farm
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn ledger(&self) -> &InventoryLedger {
        &self.ledger
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Inputs minus (stock + outputs); zero up to floating-point noise
    pub fn mass_balance_residual(&self) -> f64 {
        self.state.mass_balance_residual(self.farm.total_kg())
    }

    // ========================================================================
    // Hour Loop Implementation
    // ========================================================================

    /// Simulate the next hour
    ///
    /// # Returns
    ///
    /// * `Ok(HourResult)` - Kg moved by each stage
    /// * `Err(SimulationError::HorizonExhausted)` - Every hour was already simulated
    pub fn tick(&mut self) -> Result<HourResult, SimulationError> {
        if self.clock.is_finished() {
            return Err(SimulationError::HorizonExhausted {
                hour: self.clock.current_hour(),
            });
        }

        self.clock.advance_hour();
        let hour = self.clock.current_hour();
        let hour_of_day = self.clock.hour_of_day();
        let entry_hour = hour as i64;
        let day = self.plan.day(self.clock.is_extra_day()).clone();
        let mut result = HourResult {
            hour,
            ..HourResult::default()
        };

        // STEP 1: DAY ROLLOVER
        if self.clock.is_start_of_day() {
            self.state.reset_daily_counters();
        }

        // STEP 2: DEBONING
        if let Some(stage) = day.deboning {
            let kg = stage.demand(hour_of_day, self.state.deboned_today_kg());
            if kg > 0.0 {
                self.state.add_deboned(kg);
                result.deboned_kg = kg;
            }
        }

        // STEP 3: BOXING + TUNNEL ADMISSION
        if let Some(stage) = day.boxing {
            let boxed = self.state.draw_from_chamber(stage.demand(hour_of_day, 0.0));
            if boxed > 0.0 {
                self.state.record_boxed(boxed);
                result.boxed_kg = boxed;
                self.allocate_boxed(boxed, hour, &mut result);
            }
        }

        // STEP 4: PLATE FREEZING
        if let Some(stage) = day.plates {
            let kg = self.state.draw_from_chamber(stage.demand(hour_of_day, 0.0));
            if kg > 0.0 {
                self.state.record_plates(kg);
                result.plates_kg = kg;
            }
        }

        // STEP 5: FRESH DISPATCH
        if let Some(stage) = day.fresh {
            let demand = stage.demand(hour_of_day, self.state.fresh_today_kg());
            if demand > 0.0 {
                let kg = self.state.draw_from_chamber(demand);
                self.state.record_fresh(kg);
                result.fresh_kg = kg;
            }
        }

        // STEP 6: TUNNEL RELEASE
        if let Some(stage) = day.release {
            let budget = stage.demand(hour_of_day, 0.0);
            if budget > 0.0 {
                let outcome = self.farm.release(budget, entry_hour);
                for (tunnel, kg) in outcome.releases {
                    self.event_log.log(Event::Released { hour, tunnel, kg });
                }
                self.state.record_released(outcome.released_kg);
                result.released_kg = outcome.released_kg;
            }
        }

        // STEP 7: SNAPSHOT
        self.record_snapshot();
        if self.clock.is_end_of_day() {
            self.close_day();
        }

        tracing::debug!(
            hour,
            chamber_kg = self.state.chamber_stock_kg(),
            tunnel_kg = self.farm.total_kg(),
            overflow_kg = self.state.external_overflow_kg(),
            "hour complete"
        );

        // STEP 8: PACING
        self.pacing.after_hour(hour);

        if self.clock.is_finished() {
            tracing::info!(
                run_id = %self.run_id,
                hours = hour,
                overflow_kg = self.state.external_overflow_kg(),
                frozen_kg = self.state.totals().frozen_kg(),
                "simulation complete"
            );
        }

        Ok(result)
    }

    /// Run every remaining hour
    ///
    /// # Returns
    ///
    /// The complete ledger
    pub fn run(&mut self) -> Result<&InventoryLedger, SimulationError> {
        while !self.clock.is_finished() {
            self.tick()?;
        }
        Ok(&self.ledger)
    }

    /// Split boxed kg by type, allocate it, and overflow the rest
    fn allocate_boxed(&mut self, boxed: f64, hour: usize, result: &mut HourResult) {
        let bones_kg = boxed * self.config.effective_bones_percent() / 100.0;
        let meat_kg = boxed - bones_kg;

        let outcome = self
            .farm
            .allocate(bones_kg, meat_kg, hour as i64, &self.config.pallet_weights);

        for admission in &outcome.admissions {
            self.event_log.log(Event::Admitted {
                hour,
                tunnel: admission.tunnel.clone(),
                product: admission.product,
                kg: admission.kg,
                pallets: admission.pallets,
                forced: admission.forced,
            });
        }
        result.absorbed_kg = outcome.absorbed_kg();

        for (product, kg) in [
            (ProductType::Bones, outcome.bones_unabsorbed_kg),
            (ProductType::Meat, outcome.meat_unabsorbed_kg),
        ] {
            if kg > 0.0 {
                self.event_log.log(Event::Overflow { hour, product, kg });
            }
        }

        let overflow = outcome.unabsorbed_kg();
        if overflow > 0.0 {
            self.state.add_overflow(overflow);
            result.overflow_added_kg = overflow;
            tracing::warn!(
                hour,
                kg = overflow,
                total_overflow_kg = self.state.external_overflow_kg(),
                "tunnels full; boxed product sent to external freezing"
            );
        }
    }

    fn record_snapshot(&mut self) {
        let snapshot = HourlySnapshot {
            hour: self.clock.current_hour(),
            datetime: self.clock.datetime(),
            day: self.clock.day(),
            hour_of_day: self.clock.hour_of_day(),
            is_extra_day: self.clock.is_extra_day(),
            chamber_stock_kg: self.state.chamber_stock_kg(),
            tunnel_totals_kg: self.farm.total_kg(),
            overflow_kg: self.state.external_overflow_kg(),
            total_frozen_kg: self.state.totals().frozen_kg(),
            tunnels: self.farm.tunnels().iter().map(TunnelState::from).collect(),
        };
        self.ledger.record_hour(snapshot);
    }

    fn close_day(&mut self) {
        let day = self.clock.day();
        let is_extra_day = self.clock.is_extra_day();
        let label = DailySummary::label_for(day, is_extra_day);

        self.event_log.log(Event::DayClosed {
            hour: self.clock.current_hour(),
            day,
            label: label.clone(),
        });
        self.ledger.record_day(DailySummary {
            day,
            label,
            is_extra_day,
            chamber_stock_kg: self.state.chamber_stock_kg(),
            tunnel_totals_kg: self.farm.total_kg(),
            overflow_kg: self.state.external_overflow_kg(),
        });
    }

    // ========================================================================
    // Checkpoint
    // ========================================================================

    /// Serialize the run so it can be resumed later
    ///
    /// The event log is not part of the checkpoint; a restored run starts
    /// with an empty log.
    pub fn save_state(&self) -> Result<String, SimulationError> {
        let snapshot = StateSnapshot {
            run_id: self.run_id,
            clock: self.clock.clone(),
            state: self.state.clone(),
            tunnels: self.farm.tunnels().iter().map(TunnelSnapshot::from).collect(),
            ledger: self.ledger.clone(),
            config_hash: compute_config_hash(&self.config)?,
        };
        serde_json::to_string(&snapshot)
            .map_err(|e| SimulationError::SerializationError(e.to_string()))
    }

    /// Resume a run from [`Orchestrator::save_state`] output
    ///
    /// # Errors
    ///
    /// * `ConfigMismatch` - `config` is not the configuration the checkpoint was taken with
    /// * `StateValidationError` - Tunnel totals, capacity or mass balance are inconsistent
    /// * `SerializationError` - Malformed JSON
    pub fn load_state(config: FacilityConfig, state_json: &str) -> Result<Self, SimulationError> {
        let snapshot: StateSnapshot = serde_json::from_str(state_json)
            .map_err(|e| SimulationError::SerializationError(e.to_string()))?;

        let actual = compute_config_hash(&config)?;
        if snapshot.config_hash != actual {
            return Err(SimulationError::ConfigMismatch {
                expected: snapshot.config_hash,
                actual,
            });
        }
        validate_snapshot(&snapshot, &config)?;

        let plan = FlowPlan::from_config(&config);
        let farm = TunnelFarm::from_tunnels(snapshot.tunnels.into_iter().map(Into::into).collect());

        tracing::info!(
            run_id = %snapshot.run_id,
            hour = snapshot.clock.current_hour(),
            "simulation restored from checkpoint"
        );

        Ok(Self {
            config,
            plan,
            clock: snapshot.clock,
            farm,
            state: snapshot.state,
            ledger: snapshot.ledger,
            event_log: EventLog::new(),
            pacing: Box::new(NoPacing),
            run_id: snapshot.run_id,
        })
    }
}

/// Clamp a negative or non-finite stock input to 0
fn non_negative(field: &str, value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        tracing::warn!(field, value, "invalid stock level treated as 0");
        0.0
    }
}
