//! Tunnel farm
//!
//! The fixed, ordered set of tunnels. Farm order is a static priority: every
//! sweep (allocation, seeding, release) visits tunnels front to back.
//!
//! # Two-pass allocation
//!
//! ```text
//! Pass 1 (force_mix = false): Bones over all tunnels, then Meat over all tunnels
//! Pass 2 (force_mix = true):  Bones over all tunnels, then Meat over all tunnels
//! Whatever is still unabsorbed becomes external overflow
//! ```
//!
//! The pass order matters: running both passes per tunnel would let the
//! first tunnel mix types before emptier tunnels were offered the product.

use crate::models::batch::{PalletWeights, ProductType, EXHAUSTED_EPSILON};
use crate::models::tunnel::Tunnel;
use serde::{Deserialize, Serialize};

/// Static description of one tunnel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TunnelSpec {
    pub name: String,
    pub max_pallets: f64,
    #[serde(default)]
    pub rows: u32,
    #[serde(default)]
    pub cols: u32,
}

impl TunnelSpec {
    pub fn new(name: &str, max_pallets: f64, rows: u32, cols: u32) -> Self {
        Self {
            name: name.to_string(),
            max_pallets,
            rows,
            cols,
        }
    }
}

/// The facility's standard tunnel layout, in priority order
pub fn standard_tunnels() -> Vec<TunnelSpec> {
    vec![
        TunnelSpec::new("CC037", 44.0, 11, 4),
        TunnelSpec::new("CC038", 44.0, 11, 4),
        TunnelSpec::new("CC058", 44.0, 11, 4),
        TunnelSpec::new("CC059", 55.0, 11, 5),
        TunnelSpec::new("CC062", 168.0, 21, 8),
    ]
}

/// A single admission made during allocation
#[derive(Debug, Clone, PartialEq)]
pub struct Admission {
    pub tunnel: String,
    pub product: ProductType,
    pub kg: f64,
    pub pallets: f64,
    pub forced: bool,
}

/// Result of allocating one hour of boxing output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationOutcome {
    /// Admissions in the order they were made
    pub admissions: Vec<Admission>,
    /// Bones left over after both passes
    pub bones_unabsorbed_kg: f64,
    /// Meat left over after both passes
    pub meat_unabsorbed_kg: f64,
}

impl AllocationOutcome {
    /// Total kg placed into tunnels
    pub fn absorbed_kg(&self) -> f64 {
        self.admissions.iter().map(|a| a.kg).sum()
    }

    /// Total kg that has to be frozen elsewhere
    pub fn unabsorbed_kg(&self) -> f64 {
        self.bones_unabsorbed_kg + self.meat_unabsorbed_kg
    }
}

/// One seeded sub-lot
#[derive(Debug, Clone, PartialEq)]
pub struct SeedPlacement {
    pub tunnel: String,
    pub product: ProductType,
    pub kg: f64,
    pub pallets: f64,
}

/// Result of seeding pre-existing inventory across the farm
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedOutcome {
    /// Sub-lots in insertion order
    pub placements: Vec<SeedPlacement>,
    /// Kg that found no room
    pub remainder_kg: f64,
}

impl SeedOutcome {
    /// Total kg placed into tunnels
    pub fn placed_kg(&self) -> f64 {
        self.placements.iter().map(|p| p.kg).sum()
    }
}

/// Result of one hourly release sweep
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleaseOutcome {
    /// (tunnel name, kg released), only tunnels that released something
    pub releases: Vec<(String, f64)>,
    pub released_kg: f64,
}

/// Ordered collection of tunnels
///
/// # Example
/// ```
/// use cold_storage_simulator_core_rs::models::{PalletWeights, TunnelFarm, TunnelSpec};
///
/// let mut farm = TunnelFarm::new(&[TunnelSpec::new("A", 10.0, 5, 2)]);
/// let weights = PalletWeights::new(1000.0, 1000.0);
///
/// let outcome = farm.allocate(8000.0, 5000.0, 1, &weights);
/// assert!((outcome.absorbed_kg() - 10_000.0).abs() < 1e-6);
/// assert!((outcome.meat_unabsorbed_kg - 3000.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TunnelFarm {
    tunnels: Vec<Tunnel>,
}

impl TunnelFarm {
    /// Build an empty farm from tunnel specs, preserving their order
    pub fn new(specs: &[TunnelSpec]) -> Self {
        Self {
            tunnels: specs
                .iter()
                .map(|s| Tunnel::new(s.name.clone(), s.max_pallets, s.rows, s.cols))
                .collect(),
        }
    }

    /// Wrap already-built tunnels (checkpoint restore)
    pub fn from_tunnels(tunnels: Vec<Tunnel>) -> Self {
        Self { tunnels }
    }

    pub fn tunnels(&self) -> &[Tunnel] {
        &self.tunnels
    }

    pub fn get(&self, name: &str) -> Option<&Tunnel> {
        self.tunnels.iter().find(|t| t.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Tunnel> {
        self.tunnels.iter_mut().find(|t| t.name() == name)
    }

    pub fn len(&self) -> usize {
        self.tunnels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tunnels.is_empty()
    }

    /// Total kg across all tunnels
    pub fn total_kg(&self) -> f64 {
        self.tunnels.iter().map(Tunnel::current_kg).sum()
    }

    /// Total pallets across all tunnels
    pub fn total_pallets(&self) -> f64 {
        self.tunnels.iter().map(Tunnel::current_pallets).sum()
    }

    /// Total pallet capacity
    pub fn max_pallets(&self) -> f64 {
        self.tunnels.iter().map(Tunnel::max_pallets).sum()
    }

    // ========================================================================
    // Sweeps
    // ========================================================================

    /// Offer `kg` of one product to every tunnel in farm order
    fn sweep(
        &mut self,
        mut kg: f64,
        hour: i64,
        product: ProductType,
        weights: &PalletWeights,
        force_mix: bool,
        admissions: &mut Vec<Admission>,
    ) -> f64 {
        for tunnel in &mut self.tunnels {
            if kg <= EXHAUSTED_EPSILON {
                break;
            }
            let leftover = tunnel.admit(kg, hour, product, weights, force_mix);
            let admitted = kg - leftover;
            if admitted > 0.0 {
                tracing::trace!(
                    tunnel = tunnel.name(),
                    product = %product,
                    kg = admitted,
                    force_mix,
                    "admitted into tunnel"
                );
                admissions.push(Admission {
                    tunnel: tunnel.name().to_string(),
                    product,
                    kg: admitted,
                    pallets: admitted / weights.for_product(product),
                    forced: force_mix,
                });
            }
            kg = leftover;
        }
        kg
    }

    /// Allocate one hour of boxing output using the two-pass policy
    ///
    /// # Arguments
    /// * `bones_kg` - Bones share of the hour's boxing output
    /// * `meat_kg` - Meat share of the hour's boxing output
    /// * `hour` - Current simulation hour (entry hour of new batches)
    /// * `weights` - Kg-per-pallet constants
    pub fn allocate(
        &mut self,
        bones_kg: f64,
        meat_kg: f64,
        hour: i64,
        weights: &PalletWeights,
    ) -> AllocationOutcome {
        let mut admissions = Vec::new();

        // Pass 1: keep tunnels single-type where possible
        let bones = self.sweep(bones_kg, hour, ProductType::Bones, weights, false, &mut admissions);
        let meat = self.sweep(meat_kg, hour, ProductType::Meat, weights, false, &mut admissions);

        // Pass 2: force whatever is left into any free slot
        let bones = self.sweep(bones, hour, ProductType::Bones, weights, true, &mut admissions);
        let meat = self.sweep(meat, hour, ProductType::Meat, weights, true, &mut admissions);

        AllocationOutcome {
            admissions,
            bones_unabsorbed_kg: bones,
            meat_unabsorbed_kg: meat,
        }
    }

    /// Seed pre-existing inventory in farm order until it is placed or the farm is full
    pub fn seed_initial(
        &mut self,
        kg: f64,
        entry_hour: i64,
        bones_percent: f64,
        weights: &PalletWeights,
    ) -> SeedOutcome {
        let mut outcome = SeedOutcome::default();
        if kg <= 0.0 {
            return outcome;
        }

        let mut remaining = kg;
        for tunnel in &mut self.tunnels {
            let before = tunnel.queue().len();
            let placed = tunnel.seed_initial(remaining, entry_hour, bones_percent, weights);

            // New sub-lots sit at the head; report them in insertion order
            let added = tunnel.queue().len() - before;
            for batch in tunnel.queue().iter().take(added).rev() {
                outcome.placements.push(SeedPlacement {
                    tunnel: tunnel.name().to_string(),
                    product: batch.product(),
                    kg: batch.weight_kg(),
                    pallets: batch.pallets(),
                });
            }
            remaining -= placed;
            if remaining <= EXHAUSTED_EPSILON {
                break;
            }
        }

        outcome.remainder_kg = remaining.max(0.0);
        outcome
    }

    /// Spend an hourly release budget across tunnels in farm order
    ///
    /// Each tunnel may use whatever budget the tunnels before it left over.
    pub fn release(&mut self, budget_kg: f64, hour: i64) -> ReleaseOutcome {
        let mut outcome = ReleaseOutcome::default();
        let mut budget = budget_kg;

        for tunnel in &mut self.tunnels {
            if budget <= EXHAUSTED_EPSILON {
                break;
            }
            let released = tunnel.release(budget, hour);
            if released > 0.0 {
                tracing::trace!(tunnel = tunnel.name(), kg = released, "released from tunnel");
                outcome.releases.push((tunnel.name().to_string(), released));
            }
            outcome.released_kg += released;
            budget -= released;
        }

        outcome
    }
}
