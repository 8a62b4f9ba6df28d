//! Batch model
//!
//! A batch is one lot of product sitting in a tunnel queue.
//! Each batch has:
//! - Weight (kg) and pallet count (fractional pallets are allowed)
//! - Product type (Bones, Meat, or already frozen stock)
//! - Entry hour and required dwell (freezing) time
//!
//! Batches are created by tunnel admission or initial seeding, decremented in
//! place by release, and dropped from the queue once exhausted.

use serde::{Deserialize, Serialize};

/// Dwell hours required before a Bones batch may leave a tunnel
pub const BONES_DWELL_HOURS: i64 = 18;

/// Dwell hours required before a Meat batch may leave a tunnel
pub const MEAT_DWELL_HOURS: i64 = 33;

/// Entry-hour sentinel for stock that is already frozen at simulation start
pub const FROZEN_ENTRY_HOUR: i64 = -999;

/// A batch at or below this weight or pallet count is considered exhausted
pub const EXHAUSTED_EPSILON: f64 = 0.01;

/// Minimum pallet count worth admitting into a tunnel
pub const ADMIT_EPSILON_PALLETS: f64 = 0.001;

/// Kg-per-pallet used whenever a real ratio cannot be computed
pub const FAILSAFE_KG_PER_PALLET: f64 = 1000.0;

/// Product type of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    /// Bones: short freezing cycle
    Bones,
    /// Meat: long freezing cycle
    Meat,
    /// Pre-existing stock that is already frozen and immediately releasable
    AlreadyFrozen,
}

impl ProductType {
    /// Dwell hours required before release
    ///
    /// # Example
    /// ```
    /// use cold_storage_simulator_core_rs::models::ProductType;
    ///
    /// assert_eq!(ProductType::Bones.dwell_hours(), 18);
    /// assert_eq!(ProductType::Meat.dwell_hours(), 33);
    /// assert_eq!(ProductType::AlreadyFrozen.dwell_hours(), 0);
    /// ```
    pub fn dwell_hours(self) -> i64 {
        match self {
            ProductType::Bones => BONES_DWELL_HOURS,
            ProductType::Meat => MEAT_DWELL_HOURS,
            ProductType::AlreadyFrozen => 0,
        }
    }

    /// Whether this is one of the two fresh product types that carry affinity
    pub fn is_fresh(self) -> bool {
        !matches!(self, ProductType::AlreadyFrozen)
    }

    /// Stable label used in events and snapshots
    pub fn as_str(self) -> &'static str {
        match self {
            ProductType::Bones => "Bones",
            ProductType::Meat => "Meat",
            ProductType::AlreadyFrozen => "AlreadyFrozen",
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configured kg-per-pallet for each fresh product type
///
/// Tunnel capacity is pallet-denominated, so the same free slot holds a
/// different weight depending on what is being stacked into it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PalletWeights {
    /// Kg carried by one pallet of Bones
    pub bones_kg: f64,
    /// Kg carried by one pallet of Meat
    pub meat_kg: f64,
}

impl Default for PalletWeights {
    fn default() -> Self {
        Self {
            bones_kg: 1100.0,
            meat_kg: 1250.0,
        }
    }
}

impl PalletWeights {
    /// Create pallet weights
    pub fn new(bones_kg: f64, meat_kg: f64) -> Self {
        Self { bones_kg, meat_kg }
    }

    /// Kg per pallet for a product type
    ///
    /// Already-frozen stock has no configured weight of its own and uses
    /// [`PalletWeights::frozen_average`].
    pub fn for_product(&self, product: ProductType) -> f64 {
        match product {
            ProductType::Bones => self.bones_kg,
            ProductType::Meat => self.meat_kg,
            ProductType::AlreadyFrozen => self.frozen_average(),
        }
    }

    /// Average of both weights, used for already-frozen seed stock
    ///
    /// Falls back to [`FAILSAFE_KG_PER_PALLET`] when the average is below 1 kg.
    ///
    /// # Example
    /// ```
    /// use cold_storage_simulator_core_rs::models::PalletWeights;
    ///
    /// assert_eq!(PalletWeights::new(1000.0, 1200.0).frozen_average(), 1100.0);
    /// assert_eq!(PalletWeights::new(0.0, 0.0).frozen_average(), 1000.0);
    /// ```
    pub fn frozen_average(&self) -> f64 {
        let average = (self.bones_kg + self.meat_kg) / 2.0;
        if average < 1.0 || !average.is_finite() {
            FAILSAFE_KG_PER_PALLET
        } else {
            average
        }
    }
}

/// One admitted lot inside a tunnel queue
///
/// # Example
/// ```
/// use cold_storage_simulator_core_rs::models::{Batch, ProductType};
///
/// let batch = Batch::new(2200.0, 2.0, ProductType::Bones, 10);
/// assert!(!batch.is_ready(27));
/// assert!(batch.is_ready(28));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// Remaining weight (kg)
    weight_kg: f64,

    /// Remaining pallets
    pallets: f64,

    /// Product carried by this lot
    product: ProductType,

    /// Simulation hour of admission
    ///
    /// [`FROZEN_ENTRY_HOUR`] marks frozen seed stock; other negative values
    /// encode seed stock that was already partway through its dwell.
    entry_hour: i64,

    /// Hours the lot must stay before release
    required_dwell_hours: i64,
}

impl Batch {
    /// Create a batch with the dwell time implied by its product type
    pub fn new(weight_kg: f64, pallets: f64, product: ProductType, entry_hour: i64) -> Self {
        Self {
            weight_kg,
            pallets,
            product,
            entry_hour,
            required_dwell_hours: product.dwell_hours(),
        }
    }

    /// Remaining weight (kg)
    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    /// Remaining pallets
    pub fn pallets(&self) -> f64 {
        self.pallets
    }

    /// Product type
    pub fn product(&self) -> ProductType {
        self.product
    }

    /// Entry hour
    pub fn entry_hour(&self) -> i64 {
        self.entry_hour
    }

    /// Required dwell hours
    pub fn required_dwell_hours(&self) -> i64 {
        self.required_dwell_hours
    }

    /// First hour at which the batch may be released
    pub fn ready_hour(&self) -> i64 {
        self.entry_hour + self.required_dwell_hours
    }

    /// Release eligibility at the given hour
    pub fn is_ready(&self, current_hour: i64) -> bool {
        self.required_dwell_hours <= 0 || current_hour >= self.ready_hour()
    }

    /// Effective kg per pallet of what is left in this batch
    pub fn kg_per_pallet(&self) -> f64 {
        if self.pallets > ADMIT_EPSILON_PALLETS {
            self.weight_kg / self.pallets
        } else {
            FAILSAFE_KG_PER_PALLET
        }
    }

    /// True once weight or pallets fell to the exhaustion epsilon
    pub fn is_exhausted(&self) -> bool {
        self.weight_kg <= EXHAUSTED_EPSILON || self.pallets <= EXHAUSTED_EPSILON
    }

    /// Remove weight and the matching pallet share
    ///
    /// Returns the pallets removed.
    pub(crate) fn withdraw(&mut self, kg: f64) -> f64 {
        let pallets = kg / self.kg_per_pallet();
        self.weight_kg -= kg;
        self.pallets -= pallets;
        pallets
    }
}
