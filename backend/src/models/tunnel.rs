//! Tunnel model
//!
//! A tunnel is a freezing chamber with a fixed pallet capacity and an ordered
//! queue of batches.
//!
//! # Queue discipline
//!
//! The queue is double-ended:
//! - New admissions are appended at the tail (back of the physical stack)
//! - Initial seed stock is inserted at the head
//! - Release always consumes from the head, and stops at the first batch that
//!   has not finished its dwell time (head-blocking)
//!
//! # Critical Invariants
//!
//! 1. **Capacity**: `0 <= current_pallets <= max_pallets`
//! 2. **Totals**: `current_kg` and `current_pallets` equal the sums over the queue
//! 3. **Affinity**: always derived from the queue contents, never set directly

use crate::models::batch::{
    Batch, PalletWeights, ProductType, ADMIT_EPSILON_PALLETS, EXHAUSTED_EPSILON,
    FROZEN_ENTRY_HOUR,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Product type a tunnel is currently reserved for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Affinity {
    /// Empty, or holding only already-frozen stock
    None,
    /// Holding Bones only
    Bones,
    /// Holding Meat only
    Meat,
    /// Holding both fresh product types
    Mixed,
}

impl Affinity {
    /// Derive the affinity label from a set of queued batches
    pub fn from_batches<'a>(batches: impl IntoIterator<Item = &'a Batch>) -> Self {
        let mut has_bones = false;
        let mut has_meat = false;
        for batch in batches {
            match batch.product() {
                ProductType::Bones => has_bones = true,
                ProductType::Meat => has_meat = true,
                ProductType::AlreadyFrozen => {}
            }
        }
        match (has_bones, has_meat) {
            (false, false) => Affinity::None,
            (true, false) => Affinity::Bones,
            (false, true) => Affinity::Meat,
            (true, true) => Affinity::Mixed,
        }
    }

    /// Whether an unforced admission of `product` must be turned away
    pub fn rejects(self, product: ProductType) -> bool {
        matches!(
            (self, product),
            (Affinity::Bones, ProductType::Meat) | (Affinity::Meat, ProductType::Bones)
        )
    }
}

/// Pallet totals for the two fresh product types
///
/// Already-frozen stock is counted in neither bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PalletsByType {
    pub bones: f64,
    pub meat: f64,
}

impl PalletsByType {
    fn credit(&mut self, product: ProductType, pallets: f64) {
        match product {
            ProductType::Bones => self.bones += pallets,
            ProductType::Meat => self.meat += pallets,
            ProductType::AlreadyFrozen => {}
        }
    }

    fn debit(&mut self, product: ProductType, pallets: f64) {
        match product {
            ProductType::Bones => self.bones = (self.bones - pallets).max(0.0),
            ProductType::Meat => self.meat = (self.meat - pallets).max(0.0),
            ProductType::AlreadyFrozen => {}
        }
    }
}

/// A freezing tunnel
///
/// # Example
/// ```
/// use cold_storage_simulator_core_rs::models::{Affinity, PalletWeights, ProductType, Tunnel};
///
/// let weights = PalletWeights::new(1000.0, 1000.0);
/// let mut tunnel = Tunnel::new("CC037".to_string(), 10.0, 5, 2);
///
/// let leftover = tunnel.admit(8000.0, 1, ProductType::Bones, &weights, false);
/// assert!(leftover.abs() < 1e-6);
/// assert_eq!(tunnel.affinity(), Affinity::Bones);
///
/// // Meat is turned away while the tunnel holds Bones only
/// let rejected = tunnel.admit(5000.0, 1, ProductType::Meat, &weights, false);
/// assert_eq!(rejected, 5000.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tunnel {
    /// Tunnel identifier (e.g., "CC037")
    name: String,

    /// Hard pallet capacity
    max_pallets: f64,

    /// Display geometry: rows of pallet slots
    rows: u32,

    /// Display geometry: columns of pallet slots
    cols: u32,

    /// Running total of queued weight (kg)
    current_kg: f64,

    /// Running total of queued pallets
    current_pallets: f64,

    /// Per-type pallet totals for fresh product
    pallets_by_type: PalletsByType,

    /// Derived product affinity
    affinity: Affinity,

    /// Batch queue; head = next to release
    queue: VecDeque<Batch>,
}

impl Tunnel {
    /// Create an empty tunnel
    ///
    /// Negative capacities are treated as zero.
    pub fn new(name: String, max_pallets: f64, rows: u32, cols: u32) -> Self {
        Self {
            name,
            max_pallets: max_pallets.max(0.0),
            rows,
            cols,
            current_kg: 0.0,
            current_pallets: 0.0,
            pallets_by_type: PalletsByType::default(),
            affinity: Affinity::None,
            queue: VecDeque::new(),
        }
    }

    /// Rebuild a tunnel from checkpointed parts
    ///
    /// Totals are taken as recorded so that checkpoint validation can compare
    /// them against the queue. Affinity is re-derived.
    #[allow(clippy::too_many_arguments)]
    pub fn from_snapshot(
        name: String,
        max_pallets: f64,
        rows: u32,
        cols: u32,
        current_kg: f64,
        current_pallets: f64,
        pallets_by_type: PalletsByType,
        queue: Vec<Batch>,
    ) -> Self {
        let queue: VecDeque<Batch> = queue.into();
        let affinity = Affinity::from_batches(&queue);
        Self {
            name,
            max_pallets,
            rows,
            cols,
            current_kg,
            current_pallets,
            pallets_by_type,
            affinity,
            queue,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_pallets(&self) -> f64 {
        self.max_pallets
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn current_kg(&self) -> f64 {
        self.current_kg
    }

    pub fn current_pallets(&self) -> f64 {
        self.current_pallets
    }

    pub fn pallets_by_type(&self) -> PalletsByType {
        self.pallets_by_type
    }

    pub fn affinity(&self) -> Affinity {
        self.affinity
    }

    /// Queued batches, head first
    pub fn queue(&self) -> &VecDeque<Batch> {
        &self.queue
    }

    /// Free pallet slots
    pub fn available_pallets(&self) -> f64 {
        (self.max_pallets - self.current_pallets).max(0.0)
    }

    /// Sum of queued batch weights (for invariant checking)
    pub fn queued_kg(&self) -> f64 {
        self.queue.iter().map(Batch::weight_kg).sum()
    }

    /// Sum of queued batch pallets (for invariant checking)
    pub fn queued_pallets(&self) -> f64 {
        self.queue.iter().map(Batch::pallets).sum()
    }

    fn update_affinity(&mut self) {
        self.affinity = Affinity::from_batches(&self.queue);
    }

    fn push_head(&mut self, batch: Batch) -> f64 {
        let kg = batch.weight_kg();
        self.current_kg += kg;
        self.current_pallets += batch.pallets();
        self.pallets_by_type.credit(batch.product(), batch.pallets());
        self.queue.push_front(batch);
        kg
    }

    // ========================================================================
    // Admission
    // ========================================================================

    /// Admit fresh product at the tail of the queue
    ///
    /// # Arguments
    /// * `kg_to_add` - Weight offered to this tunnel
    /// * `current_hour` - Entry hour stamped on the new batch
    /// * `product` - Bones or Meat; already-frozen stock is never admitted
    /// * `weights` - Kg-per-pallet constants
    /// * `force_mix` - Ignore the affinity reservation (second allocation pass)
    ///
    /// # Returns
    /// The kg that did not fit.
    pub fn admit(
        &mut self,
        kg_to_add: f64,
        current_hour: i64,
        product: ProductType,
        weights: &PalletWeights,
        force_mix: bool,
    ) -> f64 {
        if !product.is_fresh() || kg_to_add <= 0.0 {
            return kg_to_add;
        }

        // Reserve single-type tunnels during the first pass
        if !force_mix && self.affinity.rejects(product) {
            return kg_to_add;
        }

        let kg_per_pallet = weights.for_product(product);
        if !(kg_per_pallet > 0.0) {
            return kg_to_add;
        }

        let pallets_needed = kg_to_add / kg_per_pallet;
        let pallets_accepted = pallets_needed.min(self.available_pallets()).max(0.0);
        if pallets_accepted <= ADMIT_EPSILON_PALLETS {
            return kg_to_add;
        }

        // Full fit: take the offered weight as-is, leaving exactly 0
        let kg_accepted = if pallets_accepted >= pallets_needed {
            kg_to_add
        } else {
            pallets_accepted * kg_per_pallet
        };
        self.queue
            .push_back(Batch::new(kg_accepted, pallets_accepted, product, current_hour));
        self.current_kg += kg_accepted;
        self.current_pallets += pallets_accepted;
        self.pallets_by_type.credit(product, pallets_accepted);
        self.update_affinity();

        kg_to_add - kg_accepted
    }

    /// Place pre-existing inventory at the head of the queue
    ///
    /// With `entry_hour == FROZEN_ENTRY_HOUR` the stock is already frozen and
    /// is sized with the average pallet weight. Otherwise it is split into
    /// Bones and Meat by `bones_percent`; when both sub-lots do not fit they are
    /// scaled by the same ratio. Meat goes in first and Bones second, which
    /// leaves Bones nearest the head.
    ///
    /// # Returns
    /// The kg placed into this tunnel.
    pub fn seed_initial(
        &mut self,
        kg: f64,
        entry_hour: i64,
        bones_percent: f64,
        weights: &PalletWeights,
    ) -> f64 {
        let available = self.available_pallets();
        if kg <= 0.0 || available <= EXHAUSTED_EPSILON {
            return 0.0;
        }

        let mut placed = 0.0;

        if entry_hour == FROZEN_ENTRY_HOUR {
            let kg_per_pallet = weights.frozen_average();
            let pallets = (kg / kg_per_pallet).min(available);
            if pallets > EXHAUSTED_EPSILON {
                placed += self.push_head(Batch::new(
                    pallets * kg_per_pallet,
                    pallets,
                    ProductType::AlreadyFrozen,
                    FROZEN_ENTRY_HOUR,
                ));
            }
        } else {
            let bones_share = bones_percent.clamp(0.0, 100.0) / 100.0;
            let bones_kg = kg * bones_share;
            let meat_kg = kg - bones_kg;

            let bones_needed = if weights.bones_kg > 0.0 {
                bones_kg / weights.bones_kg
            } else {
                0.0
            };
            let meat_needed = if weights.meat_kg > 0.0 {
                meat_kg / weights.meat_kg
            } else {
                0.0
            };

            let total_needed = bones_needed + meat_needed;
            let ratio = if total_needed > available {
                available / total_needed
            } else {
                1.0
            };

            let meat_pallets = meat_needed * ratio;
            if meat_pallets > EXHAUSTED_EPSILON {
                placed += self.push_head(Batch::new(
                    meat_pallets * weights.meat_kg,
                    meat_pallets,
                    ProductType::Meat,
                    entry_hour,
                ));
            }

            let bones_pallets = bones_needed * ratio;
            if bones_pallets > EXHAUSTED_EPSILON {
                placed += self.push_head(Batch::new(
                    bones_pallets * weights.bones_kg,
                    bones_pallets,
                    ProductType::Bones,
                    entry_hour,
                ));
            }
        }

        if placed > 0.0 {
            self.update_affinity();
        }
        placed
    }

    // ========================================================================
    // Release
    // ========================================================================

    /// Remove frozen product from the head of the queue
    ///
    /// Consumes ready batches head-first until `kg_available_to_remove` is
    /// used up. A head batch that has not finished its dwell stops the loop,
    /// even if later batches are ready. An exhausted batch is popped and its
    /// residue leaves with it.
    ///
    /// # Returns
    /// The kg actually removed.
    pub fn release(&mut self, kg_available_to_remove: f64, current_hour: i64) -> f64 {
        let mut budget = kg_available_to_remove;
        let mut released = 0.0;

        while budget > EXHAUSTED_EPSILON {
            let (taken_kg, taken_pallets, product, exhausted) = {
                let head = match self.queue.front_mut() {
                    Some(head) => head,
                    None => break,
                };
                if !head.is_ready(current_hour) {
                    break;
                }
                let taken_kg = budget.min(head.weight_kg());
                let taken_pallets = head.withdraw(taken_kg);
                (taken_kg, taken_pallets, head.product(), head.is_exhausted())
            };

            self.current_kg -= taken_kg;
            self.current_pallets -= taken_pallets;
            self.pallets_by_type.debit(product, taken_pallets);
            released += taken_kg;
            budget -= taken_kg;

            if exhausted {
                if let Some(residue) = self.queue.pop_front() {
                    self.current_kg -= residue.weight_kg();
                    self.current_pallets -= residue.pallets();
                    self.pallets_by_type.debit(product, residue.pallets());
                    released += residue.weight_kg();
                }
                if self.queue.is_empty() {
                    self.current_kg = 0.0;
                    self.current_pallets = 0.0;
                    self.pallets_by_type = PalletsByType::default();
                }
                self.update_affinity();
            }
        }

        if released > 0.0 {
            self.update_affinity();
        }
        released
    }
}
