//! Initial Seeding Tests
//!
//! Pre-existing tunnel stock is inserted at the queue head, before any
//! admission, in farm order.

use cold_storage_simulator_core_rs::config::FacilityConfig;
use cold_storage_simulator_core_rs::models::{
    Affinity, PalletWeights, ProductType, Tunnel, TunnelFarm, TunnelSpec,
};
use cold_storage_simulator_core_rs::orchestrator::Orchestrator;

// ============================================================================
// Test Helpers
// ============================================================================

fn unit_weights() -> PalletWeights {
    PalletWeights::new(1000.0, 1000.0)
}

fn two_tunnel_config() -> FacilityConfig {
    let mut config = FacilityConfig::default();
    config.horizon_hours = 24;
    config.pallet_weights = unit_weights();
    config.tunnels = vec![
        TunnelSpec::new("A", 4.0, 2, 2),
        TunnelSpec::new("B", 4.0, 2, 2),
    ];
    config
}

// ============================================================================
// Tunnel-level seeding
// ============================================================================

#[test]
fn test_idempotent_seeding_of_zero_kg() {
    let mut t = Tunnel::new("T".to_string(), 10.0, 5, 2);
    t.admit(1000.0, 3, ProductType::Bones, &unit_weights(), false);
    let before = t.clone();

    assert_eq!(t.seed_initial(0.0, -5, 50.0, &unit_weights()), 0.0);
    assert_eq!(t.seed_initial(0.0, -999, 50.0, &unit_weights()), 0.0);
    assert_eq!(t, before);
}

#[test]
fn test_zero_kg_farm_seed_is_a_no_op() {
    let mut farm = TunnelFarm::new(&[TunnelSpec::new("A", 10.0, 5, 2)]);
    let before = farm.clone();

    let outcome = farm.seed_initial(0.0, -5, 50.0, &unit_weights());

    assert!(outcome.placements.is_empty());
    assert_eq!(outcome.remainder_kg, 0.0);
    assert_eq!(farm, before);
}

#[test]
fn test_fresh_seed_splits_by_bones_percent() {
    let mut t = Tunnel::new("T".to_string(), 10.0, 5, 2);
    let weights = PalletWeights::new(1100.0, 1250.0);

    let placed = t.seed_initial(4000.0, -10, 25.0, &weights);

    assert!((placed - 4000.0).abs() < 1e-9);
    assert_eq!(t.queue().len(), 2);
    assert_eq!(t.queue()[0].product(), ProductType::Bones);
    assert!((t.queue()[0].weight_kg() - 1000.0).abs() < 1e-9);
    assert_eq!(t.queue()[1].product(), ProductType::Meat);
    assert!((t.queue()[1].weight_kg() - 3000.0).abs() < 1e-9);
    assert!((t.pallets_by_type().meat - 2.4).abs() < 1e-9);
    assert_eq!(t.affinity(), Affinity::Mixed);
}

#[test]
fn test_fresh_seed_scales_both_sublots_when_short_of_room() {
    let mut t = Tunnel::new("T".to_string(), 2.0, 1, 2);

    let placed = t.seed_initial(4000.0, -10, 50.0, &unit_weights());

    assert!((placed - 2000.0).abs() < 1e-9);
    assert!((t.queue()[0].pallets() - 1.0).abs() < 1e-9);
    assert!((t.queue()[1].pallets() - 1.0).abs() < 1e-9);
    assert!((t.current_pallets() - 2.0).abs() < 1e-9);
}

#[test]
fn test_single_type_seed_skips_empty_sublot() {
    let mut t = Tunnel::new("T".to_string(), 10.0, 5, 2);
    t.seed_initial(3000.0, -3, 100.0, &unit_weights());
    assert_eq!(t.queue().len(), 1);
    assert_eq!(t.affinity(), Affinity::Bones);
}

#[test]
fn test_frozen_seed_uses_average_pallet_weight() {
    let mut t = Tunnel::new("T".to_string(), 10.0, 5, 2);
    let weights = PalletWeights::new(1000.0, 1200.0);

    t.seed_initial(2200.0, -999, 50.0, &weights);

    let batch = &t.queue()[0];
    assert_eq!(batch.product(), ProductType::AlreadyFrozen);
    assert!((batch.pallets() - 2.0).abs() < 1e-9);
    assert_eq!(batch.required_dwell_hours(), 0);
    assert_eq!(t.affinity(), Affinity::None);
}

#[test]
fn test_seed_goes_ahead_of_admitted_stock() {
    let mut t = Tunnel::new("T".to_string(), 10.0, 5, 2);
    t.admit(2000.0, 1, ProductType::Meat, &unit_weights(), false);
    t.seed_initial(1000.0, -999, 50.0, &unit_weights());

    assert_eq!(t.queue()[0].product(), ProductType::AlreadyFrozen);
    assert_eq!(t.queue()[1].product(), ProductType::Meat);
    // Frozen head releases immediately; the meat behind it waits
    assert!((t.release(5000.0, 2) - 1000.0).abs() < 1e-9);
}

// ============================================================================
// Orchestrator seeding
// ============================================================================

#[test]
fn test_seeding_order_and_overflow() {
    let mut config = two_tunnel_config();
    config.initial_inventory.frozen_tunnel_kg = 6000.0;
    config.initial_inventory.freezing_tunnel_kg = 4000.0;
    config.initial_inventory.freezing_hours_remaining = 10;

    let orchestrator = Orchestrator::new(config).unwrap();
    let farm = orchestrator.farm();

    // Frozen fills A and half of B; freezing stock takes B's last 2 pallets
    let a = farm.get("A").unwrap();
    assert_eq!(a.queue().len(), 1);
    assert!((a.current_pallets() - 4.0).abs() < 1e-9);

    let b = farm.get("B").unwrap();
    assert_eq!(b.queue().len(), 3);
    assert_eq!(b.queue()[0].product(), ProductType::Bones);
    assert_eq!(b.queue()[0].entry_hour(), -23);
    assert_eq!(b.queue()[1].product(), ProductType::Meat);
    assert_eq!(b.queue()[2].product(), ProductType::AlreadyFrozen);
    assert!((b.current_pallets() - 4.0).abs() < 1e-9);

    assert!((orchestrator.state().external_overflow_kg() - 2000.0).abs() < 1e-9);
    assert_eq!(orchestrator.event_log().events_of_type("SeedOverflow").len(), 1);
    assert_eq!(orchestrator.event_log().events_of_type("InventorySeeded").len(), 4);
    assert!(orchestrator.mass_balance_residual().abs() < 1e-6);
}

#[test]
fn test_seeded_events_follow_insertion_order() {
    let mut config = two_tunnel_config();
    config.initial_inventory.freezing_tunnel_kg = 2000.0;
    config.initial_inventory.freezing_hours_remaining = 5;

    let orchestrator = Orchestrator::new(config).unwrap();
    let seeded = orchestrator.event_log().events_of_type("InventorySeeded");
    assert_eq!(seeded.len(), 2);
    assert_eq!(seeded[0].tunnel(), Some("A"));
    assert_eq!(seeded[0].hour(), 0);
}

#[test]
fn test_negative_seed_stock_is_ignored() {
    let mut config = two_tunnel_config();
    config.initial_inventory.frozen_tunnel_kg = -500.0;
    config.initial_inventory.chamber_kg = -10.0;

    let orchestrator = Orchestrator::new(config).unwrap();
    assert_eq!(orchestrator.farm().total_kg(), 0.0);
    assert_eq!(orchestrator.state().chamber_stock_kg(), 0.0);
    assert!(orchestrator.event_log().is_empty());
}
