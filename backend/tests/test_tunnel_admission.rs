//! Tunnel Admission Tests
//!
//! Covers pallet-denominated capacity, affinity reservation and the
//! two-pass allocation across the farm.
//!
//! Critical invariants tested:
//! - Capacity: admission never exceeds max_pallets
//! - Affinity exclusivity: unforced admission of the other type is a no-op
//! - Pass ordering: all tunnels see pass 1 before any tunnel sees pass 2

use cold_storage_simulator_core_rs::models::{
    Affinity, PalletWeights, ProductType, Tunnel, TunnelFarm, TunnelSpec,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn unit_weights() -> PalletWeights {
    PalletWeights::new(1000.0, 1000.0)
}

fn tunnel(max_pallets: f64) -> Tunnel {
    Tunnel::new("T".to_string(), max_pallets, 5, 2)
}

// ============================================================================
// Single tunnel
// ============================================================================

#[test]
fn test_admit_into_empty_tunnel_sets_affinity() {
    let mut t = tunnel(10.0);
    let leftover = t.admit(3000.0, 4, ProductType::Meat, &unit_weights(), false);

    assert_eq!(leftover, 0.0);
    assert_eq!(t.current_kg(), 3000.0);
    assert_eq!(t.current_pallets(), 3.0);
    assert_eq!(t.pallets_by_type().meat, 3.0);
    assert_eq!(t.affinity(), Affinity::Meat);

    let batch = &t.queue()[0];
    assert_eq!(batch.entry_hour(), 4);
    assert_eq!(batch.required_dwell_hours(), 33);
}

#[test]
fn test_affinity_exclusivity_leaves_tunnel_untouched() {
    let mut t = tunnel(10.0);
    t.admit(4000.0, 1, ProductType::Bones, &unit_weights(), false);
    let before = t.clone();

    let leftover = t.admit(2500.0, 2, ProductType::Meat, &unit_weights(), false);

    assert_eq!(leftover, 2500.0);
    assert_eq!(t, before);
}

#[test]
fn test_capacity_is_pallet_denominated() {
    // Same 4 free pallets hold different weights per product
    let weights = PalletWeights::new(1100.0, 1250.0);

    let mut bones = tunnel(4.0);
    let left_bones = bones.admit(10_000.0, 1, ProductType::Bones, &weights, false);
    assert!((bones.current_kg() - 4400.0).abs() < 1e-9);
    assert!((left_bones - 5600.0).abs() < 1e-9);

    let mut meat = tunnel(4.0);
    let left_meat = meat.admit(10_000.0, 1, ProductType::Meat, &weights, false);
    assert!((meat.current_kg() - 5000.0).abs() < 1e-9);
    assert!((left_meat - 5000.0).abs() < 1e-9);
}

#[test]
fn test_full_tunnel_rejects_everything() {
    let mut t = tunnel(2.0);
    t.admit(2000.0, 1, ProductType::Bones, &unit_weights(), false);
    assert_eq!(t.available_pallets(), 0.0);

    let leftover = t.admit(700.0, 2, ProductType::Bones, &unit_weights(), true);
    assert_eq!(leftover, 700.0);
    assert_eq!(t.queue().len(), 1);
}

#[test]
fn test_zero_capacity_tunnel_never_admits() {
    let mut t = tunnel(0.0);
    assert_eq!(t.admit(100.0, 1, ProductType::Meat, &unit_weights(), true), 100.0);
}

#[test]
fn test_fractional_pallets_are_admitted() {
    let mut t = tunnel(10.0);
    let leftover = t.admit(550.0, 1, ProductType::Bones, &PalletWeights::new(1100.0, 1250.0), false);
    assert_eq!(leftover, 0.0);
    assert!((t.current_pallets() - 0.5).abs() < 1e-12);
}

// ============================================================================
// Two-pass allocation across the farm
// ============================================================================

/// One tunnel, 10 pallets, 1000 kg/pallet; 8000 kg Bones then 5000 kg Meat
#[test]
fn test_two_pass_admission_scenario() {
    let mut farm = TunnelFarm::new(&[TunnelSpec::new("T", 10.0, 5, 2)]);
    let outcome = farm.allocate(8000.0, 5000.0, 1, &unit_weights());

    // Pass 1: 8 pallets of Bones
    let first = &outcome.admissions[0];
    assert_eq!(first.product, ProductType::Bones);
    assert!(!first.forced);
    assert!((first.kg - 8000.0).abs() < 1e-9);

    // Pass 1 Meat rejected by affinity; pass 2 forces 2 pallets
    assert_eq!(outcome.admissions.len(), 2);
    let second = &outcome.admissions[1];
    assert_eq!(second.product, ProductType::Meat);
    assert!(second.forced);
    assert!((second.kg - 2000.0).abs() < 1e-9);
    assert!((second.pallets - 2.0).abs() < 1e-9);

    assert_eq!(outcome.bones_unabsorbed_kg, 0.0);
    assert!((outcome.meat_unabsorbed_kg - 3000.0).abs() < 1e-9);

    let t = farm.get("T").unwrap();
    assert!((t.current_pallets() - 10.0).abs() < 1e-9);
    assert_eq!(t.affinity(), Affinity::Mixed);
}

#[test]
fn test_pass_order_prefers_later_tunnel_over_mixing() {
    // A holds Bones; B is empty. Meat must go to B in pass 1 rather than mix into A.
    let mut farm = TunnelFarm::new(&[
        TunnelSpec::new("A", 10.0, 5, 2),
        TunnelSpec::new("B", 10.0, 5, 2),
    ]);
    farm.allocate(2000.0, 0.0, 1, &unit_weights());

    let outcome = farm.allocate(0.0, 6000.0, 2, &unit_weights());
    assert!(outcome.admissions.iter().all(|a| a.tunnel == "B" && !a.forced));
    assert_eq!(farm.get("A").unwrap().affinity(), Affinity::Bones);
    assert_eq!(farm.get("B").unwrap().affinity(), Affinity::Meat);
}

#[test]
fn test_forced_pass_fills_reserved_tunnels_in_order() {
    let mut farm = TunnelFarm::new(&[
        TunnelSpec::new("A", 5.0, 1, 5),
        TunnelSpec::new("B", 5.0, 1, 5),
    ]);
    // A becomes Bones, B becomes Meat, both with 2 free pallets
    farm.allocate(3000.0, 3000.0, 1, &unit_weights());

    // 3000 Bones: 2000 into A (pass 1), 1000 forced into B (pass 2)
    let outcome = farm.allocate(3000.0, 0.0, 2, &unit_weights());
    assert_eq!(outcome.admissions.len(), 2);
    assert_eq!(outcome.admissions[0].tunnel, "A");
    assert!(!outcome.admissions[0].forced);
    assert_eq!(outcome.admissions[1].tunnel, "B");
    assert!(outcome.admissions[1].forced);
    assert_eq!(farm.get("B").unwrap().affinity(), Affinity::Mixed);
    assert!(outcome.unabsorbed_kg().abs() < 1e-9);
}

#[test]
fn test_empty_farm_overflows_everything() {
    let mut farm = TunnelFarm::new(&[]);
    let outcome = farm.allocate(1200.0, 800.0, 1, &unit_weights());
    assert!(outcome.admissions.is_empty());
    assert_eq!(outcome.unabsorbed_kg(), 2000.0);
}
