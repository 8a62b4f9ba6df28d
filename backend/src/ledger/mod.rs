//! Inventory ledger
//!
//! Time series of post-transfer balances, one [`HourlySnapshot`] per hour
//! plus a [`DailySummary`] row at every day boundary. Snapshots are the
//! read model handed to the presentation layer, so they serialise with
//! camelCase field names.

use crate::models::tunnel::{Affinity, PalletsByType, Tunnel};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Presentation view of one tunnel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TunnelState {
    pub name: String,
    pub current_pallets: f64,
    pub max_pallets: f64,
    pub current_kg: f64,
    pub pallets_by_type: PalletsByType,
    pub affinity: Affinity,
    pub rows: u32,
    pub cols: u32,
}

impl From<&Tunnel> for TunnelState {
    fn from(tunnel: &Tunnel) -> Self {
        Self {
            name: tunnel.name().to_string(),
            current_pallets: tunnel.current_pallets(),
            max_pallets: tunnel.max_pallets(),
            current_kg: tunnel.current_kg(),
            pallets_by_type: tunnel.pallets_by_type(),
            affinity: tunnel.affinity(),
            rows: tunnel.rows(),
            cols: tunnel.cols(),
        }
    }
}

/// Balances at the end of one simulated hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlySnapshot {
    pub hour: usize,
    pub datetime: NaiveDateTime,
    pub day: usize,
    pub hour_of_day: usize,
    pub is_extra_day: bool,
    pub chamber_stock_kg: f64,
    pub tunnel_totals_kg: f64,
    pub overflow_kg: f64,
    /// Cumulative boxing plus plate-freezing output
    pub total_frozen_kg: f64,
    #[serde(rename = "perTunnelState")]
    pub tunnels: Vec<TunnelState>,
}

/// Balances at the close of a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub day: usize,
    /// "Day N", or "Day N (extra)" for the extra day
    pub label: String,
    pub is_extra_day: bool,
    pub chamber_stock_kg: f64,
    pub tunnel_totals_kg: f64,
    pub overflow_kg: f64,
}

impl DailySummary {
    /// Label shown for a day
    ///
    /// # Example
    /// ```
    /// use cold_storage_simulator_core_rs::ledger::DailySummary;
    ///
    /// assert_eq!(DailySummary::label_for(2, false), "Day 2");
    /// assert_eq!(DailySummary::label_for(4, true), "Day 4 (extra)");
    /// ```
    pub fn label_for(day: usize, is_extra_day: bool) -> String {
        if is_extra_day {
            format!("Day {} (extra)", day)
        } else {
            format!("Day {}", day)
        }
    }
}

/// Hourly and daily history of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryLedger {
    snapshots: Vec<HourlySnapshot>,
    daily: Vec<DailySummary>,
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an hourly snapshot
    pub fn record_hour(&mut self, snapshot: HourlySnapshot) {
        self.snapshots.push(snapshot);
    }

    /// Append a daily summary row
    pub fn record_day(&mut self, summary: DailySummary) {
        self.daily.push(summary);
    }

    pub fn snapshots(&self) -> &[HourlySnapshot] {
        &self.snapshots
    }

    pub fn daily_summaries(&self) -> &[DailySummary] {
        &self.daily
    }

    /// Most recent hourly snapshot
    pub fn latest(&self) -> Option<&HourlySnapshot> {
        self.snapshots.last()
    }

    /// Snapshot for a given simulation hour (1-based)
    pub fn snapshot_at(&self, hour: usize) -> Option<&HourlySnapshot> {
        self.snapshots.iter().find(|s| s.hour == hour)
    }

    /// Largest overflow seen so far
    pub fn peak_overflow_kg(&self) -> f64 {
        self.snapshots
            .iter()
            .map(|s| s.overflow_kg)
            .fold(0.0, f64::max)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
