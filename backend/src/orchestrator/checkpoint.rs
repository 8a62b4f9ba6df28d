//! Checkpoint - Save/Load Simulation State
//!
//! Enables serialization and deserialization of complete orchestrator state
//! for pause/resume within a run.
//!
//! # Critical Invariants
//!
//! - **Queue Integrity**: tunnel totals equal the sums over their batch queues
//! - **Capacity**: no tunnel holds more pallets than it can
//! - **Mass Conservation**: restored balances still account for every kg
//! - **Config Matching**: state can only be loaded with matching config

use crate::config::FacilityConfig;
use crate::core::time::HourClock;
use crate::ledger::InventoryLedger;
use crate::models::batch::Batch;
use crate::models::state::SimulationState;
use crate::models::tunnel::{PalletsByType, Tunnel};
use crate::orchestrator::SimulationError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Relative tolerance for floating-point totals
const TOTALS_TOLERANCE: f64 = 1e-6;

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Complete orchestrator state snapshot
///
/// This structure captures all state necessary to resume a simulation
/// from an arbitrary hour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub run_id: Uuid,

    /// Hour position and horizon
    pub clock: HourClock,

    /// Chamber stock, overflow, counters and totals
    pub state: SimulationState,

    /// Every tunnel with its full batch queue, in farm order
    pub tunnels: Vec<TunnelSnapshot>,

    /// History recorded so far
    pub ledger: InventoryLedger,

    /// SHA256 hash of the run configuration
    pub config_hash: String,
}

/// Tunnel state snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TunnelSnapshot {
    pub name: String,
    pub max_pallets: f64,
    pub rows: u32,
    pub cols: u32,
    pub current_kg: f64,
    pub current_pallets: f64,
    pub pallets_by_type: PalletsByType,
    /// Head first
    pub queue: Vec<Batch>,
}

impl From<&Tunnel> for TunnelSnapshot {
    fn from(tunnel: &Tunnel) -> Self {
        TunnelSnapshot {
            name: tunnel.name().to_string(),
            max_pallets: tunnel.max_pallets(),
            rows: tunnel.rows(),
            cols: tunnel.cols(),
            current_kg: tunnel.current_kg(),
            current_pallets: tunnel.current_pallets(),
            pallets_by_type: tunnel.pallets_by_type(),
            queue: tunnel.queue().iter().cloned().collect(),
        }
    }
}

impl From<TunnelSnapshot> for Tunnel {
    fn from(snapshot: TunnelSnapshot) -> Self {
        Tunnel::from_snapshot(
            snapshot.name,
            snapshot.max_pallets,
            snapshot.rows,
            snapshot.cols,
            snapshot.current_kg,
            snapshot.current_pallets,
            snapshot.pallets_by_type,
            snapshot.queue,
        )
    }
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Compute deterministic SHA256 hash of config
///
/// This hash is used to verify that a checkpoint's config matches
/// the config used to restore it.
///
/// Uses canonical JSON serialization with sorted keys so that the hash does
/// not depend on field order.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    // Recursively sort all object keys for canonical representation
    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let canonical_value = canonicalize(value);

    let json = serde_json::to_string(&canonical_value).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    let result = hasher.finalize();

    Ok(format!("{:x}", result))
}

// ============================================================================
// Validation Functions
// ============================================================================

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOTALS_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// Validate state snapshot integrity
///
/// Checks critical invariants:
/// - Tunnel layout matches the configuration
/// - Tunnel totals equal their queue sums and respect capacity
/// - Clock horizon matches the configuration
/// - Mass balance closes
pub fn validate_snapshot(
    snapshot: &StateSnapshot,
    config: &FacilityConfig,
) -> Result<(), SimulationError> {
    // 1. Tunnel layout
    let names: Vec<&str> = snapshot.tunnels.iter().map(|t| t.name.as_str()).collect();
    let expected: Vec<&str> = config.tunnels.iter().map(|t| t.name.as_str()).collect();
    if names != expected {
        return Err(SimulationError::StateValidationError(format!(
            "Tunnel layout mismatch: expected {:?}, got {:?}",
            expected, names
        )));
    }

    // 2. Queue integrity and capacity
    for tunnel in &snapshot.tunnels {
        let queued_kg: f64 = tunnel.queue.iter().map(Batch::weight_kg).sum();
        let queued_pallets: f64 = tunnel.queue.iter().map(Batch::pallets).sum();

        if !close(tunnel.current_kg, queued_kg) {
            return Err(SimulationError::StateValidationError(format!(
                "Tunnel {} holds {} kg but its queue sums to {} kg",
                tunnel.name, tunnel.current_kg, queued_kg
            )));
        }
        if !close(tunnel.current_pallets, queued_pallets) {
            return Err(SimulationError::StateValidationError(format!(
                "Tunnel {} holds {} pallets but its queue sums to {}",
                tunnel.name, tunnel.current_pallets, queued_pallets
            )));
        }
        if tunnel.current_pallets > tunnel.max_pallets + TOTALS_TOLERANCE {
            return Err(SimulationError::StateValidationError(format!(
                "Tunnel {} over capacity: {} of {} pallets",
                tunnel.name, tunnel.current_pallets, tunnel.max_pallets
            )));
        }
    }

    // 3. Horizon
    if snapshot.clock.total_hours() != config.total_hours() {
        return Err(SimulationError::StateValidationError(format!(
            "Horizon mismatch: config has {} hours, checkpoint has {}",
            config.total_hours(),
            snapshot.clock.total_hours()
        )));
    }

    // 4. Mass conservation
    let tunnel_kg: f64 = snapshot.tunnels.iter().map(|t| t.current_kg).sum();
    let inputs = snapshot.state.totals().inputs_kg();
    let residual = snapshot.state.mass_balance_residual(tunnel_kg);
    if residual.abs() > TOTALS_TOLERANCE * inputs.max(1.0) {
        return Err(SimulationError::StateValidationError(format!(
            "Mass balance violated: residual {} kg",
            residual
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::batch::ProductType;

    #[test]
    fn test_compute_config_hash_deterministic() {
        let config = FacilityConfig::default();
        let hash1 = compute_config_hash(&config).unwrap();
        let hash2 = compute_config_hash(&config.clone()).unwrap();
        assert_eq!(hash1, hash2, "Same config should produce same hash");
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_compute_config_hash_different_for_different_configs() {
        let config1 = FacilityConfig::default();
        let mut config2 = FacilityConfig::default();
        config2.release.kg_per_hour = 1.0;

        assert_ne!(
            compute_config_hash(&config1).unwrap(),
            compute_config_hash(&config2).unwrap(),
            "Different configs should produce different hashes"
        );
    }

    #[test]
    fn test_tunnel_snapshot_preserves_queue_order() {
        let mut tunnel = Tunnel::new("T".to_string(), 10.0, 5, 2);
        let weights = crate::models::PalletWeights::new(1000.0, 1000.0);
        tunnel.admit(1000.0, 1, ProductType::Bones, &weights, false);
        tunnel.admit(1000.0, 2, ProductType::Meat, &weights, true);

        let restored: Tunnel = TunnelSnapshot::from(&tunnel).into();
        assert_eq!(restored, tunnel);
    }
}
