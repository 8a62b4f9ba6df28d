//! Facility configuration
//!
//! Everything the scheduler needs is passed in once, as a [`FacilityConfig`],
//! at construction. Every field has a serde default, so a partial record is
//! valid: a missing rate is 0 and a missing extra-day block is disabled.
//!
//! # Example
//!
//! ```rust
//! use cold_storage_simulator_core_rs::config::FacilityConfig;
//!
//! let config = FacilityConfig::from_json_str(r#"{
//!     "horizon_hours": 48,
//!     "start_date": "2024-03-04",
//!     "boxing": { "start_hour": 6, "duration_hours": 8, "line_kg_per_hour": [500, 500] }
//! }"#).unwrap();
//!
//! assert_eq!(config.horizon_hours, 48);
//! assert_eq!(config.boxing.total_kg_per_hour(), 1_000.0);
//! assert_eq!(config.tunnels.len(), 5);
//! assert!(!config.has_extra_day());
//! ```

pub mod sheet;

use crate::core::time::HOURS_PER_DAY;
use crate::models::batch::PalletWeights;
use crate::models::farm::{standard_tunnels, TunnelSpec};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

// ============================================================================
// Stage configuration
// ============================================================================

/// Pre-existing stock at simulation start
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialInventory {
    /// Refrigerated chamber stock (kg)
    pub chamber_kg: f64,
    /// Already-frozen stock sitting in tunnels (kg)
    pub frozen_tunnel_kg: f64,
    /// Stock in tunnels that is still freezing (kg)
    pub freezing_tunnel_kg: f64,
    /// Hours of freezing the still-freezing stock has left
    pub freezing_hours_remaining: u32,
}

/// Deboning line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeboningConfig {
    pub start_hour: f64,
    pub pigs_per_day: f64,
    pub line_speed_pigs_per_hour: f64,
    pub oee_percent: f64,
    /// Carcass weight per pig (kg)
    pub carcass_kg: f64,
    /// Offal weight per pig (kg)
    pub offal_kg: f64,
    pub extra_day: Option<DeboningExtraDay>,
}

/// Extra-day deboning; carcass weight, speed and OEE are shared with normal days
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeboningExtraDay {
    pub start_hour: f64,
    pub pigs: f64,
    pub offal_kg: f64,
}

/// Boxing lines feeding the tunnels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxingConfig {
    pub start_hour: f64,
    pub duration_hours: f64,
    /// Throughput of each line (kg/h)
    pub line_kg_per_hour: Vec<f64>,
    pub extra_day: Option<HourlyExtraDay>,
}

impl BoxingConfig {
    /// Combined throughput of all lines
    pub fn total_kg_per_hour(&self) -> f64 {
        self.line_kg_per_hour.iter().sum()
    }
}

/// A stage with a fixed hourly rate (plate freezing, tunnel release)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HourlyStageConfig {
    pub start_hour: f64,
    pub duration_hours: f64,
    pub kg_per_hour: f64,
    pub extra_day: Option<HourlyExtraDay>,
}

/// Extra-day variant of an hourly-rate stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HourlyExtraDay {
    pub start_hour: f64,
    pub duration_hours: f64,
    pub kg_per_hour: f64,
}

/// Fresh dispatch, configured by daily volume
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshConfig {
    pub start_hour: f64,
    pub duration_hours: f64,
    pub kg_per_day: f64,
    pub extra_day: Option<FreshExtraDay>,
}

/// Extra-day fresh dispatch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshExtraDay {
    pub start_hour: f64,
    pub duration_hours: f64,
    pub kg_per_day: f64,
}

// ============================================================================
// Facility configuration
// ============================================================================

/// Complete facility configuration
///
/// # Fields
///
/// * `horizon_hours` - Simulated hours, not counting the optional extra day
/// * `start_date` - Calendar date of hour 1 (00:00)
/// * `initial_inventory` - Stock present before hour 1
/// * `bones_percent` - Bones share of boxing output and fresh seed stock
/// * `pallet_weights` - Kg per pallet for each product type
/// * `tunnels` - Tunnel layout in priority order
/// * `deboning`, `boxing`, `plates`, `fresh`, `release` - Stage rates and windows
/// * `pacing_seconds_per_hour` - Presentation delay between hours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityConfig {
    pub horizon_hours: usize,
    pub start_date: NaiveDate,
    pub initial_inventory: InitialInventory,
    pub bones_percent: f64,
    pub pallet_weights: PalletWeights,
    pub tunnels: Vec<TunnelSpec>,
    pub deboning: DeboningConfig,
    pub boxing: BoxingConfig,
    pub plates: HourlyStageConfig,
    pub fresh: FreshConfig,
    pub release: HourlyStageConfig,
    pub pacing_seconds_per_hour: f64,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            horizon_hours: 0,
            start_date: NaiveDate::default(),
            initial_inventory: InitialInventory::default(),
            bones_percent: 50.0,
            pallet_weights: PalletWeights::default(),
            tunnels: standard_tunnels(),
            deboning: DeboningConfig::default(),
            boxing: BoxingConfig::default(),
            plates: HourlyStageConfig::default(),
            fresh: FreshConfig::default(),
            release: HourlyStageConfig::default(),
            pacing_seconds_per_hour: 0.0,
        }
    }
}

impl FacilityConfig {
    /// Parse a JSON configuration record
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether any stage defines an extra-day block
    pub fn has_extra_day(&self) -> bool {
        self.deboning.extra_day.is_some()
            || self.boxing.extra_day.is_some()
            || self.plates.extra_day.is_some()
            || self.fresh.extra_day.is_some()
            || self.release.extra_day.is_some()
    }

    /// Horizon including the extra day, if enabled
    pub fn total_hours(&self) -> usize {
        if self.has_extra_day() {
            self.horizon_hours + HOURS_PER_DAY
        } else {
            self.horizon_hours
        }
    }

    /// Bones percentage clamped into 0..=100 (NaN reads as 0)
    pub fn effective_bones_percent(&self) -> f64 {
        if self.bones_percent.is_nan() {
            0.0
        } else {
            self.bones_percent.clamp(0.0, 100.0)
        }
    }

    /// Check the tunnel layout
    ///
    /// Rates are never rejected here; degenerate rates are sanitised when the
    /// flow plan is derived. An empty tunnel list is allowed (everything
    /// boxed overflows).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for spec in &self.tunnels {
            if !seen.insert(spec.name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    key: "tunnels".to_string(),
                    value: format!("duplicate tunnel name {}", spec.name),
                });
            }
            if !spec.max_pallets.is_finite() || spec.max_pallets < 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: format!("tunnels.{}.max_pallets", spec.name),
                    value: spec.max_pallets.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_uses_defaults() {
        let config = FacilityConfig::from_json_str("{}").unwrap();
        assert_eq!(config, FacilityConfig::default());
        assert_eq!(config.bones_percent, 50.0);
        assert_eq!(config.pallet_weights.bones_kg, 1100.0);
        assert_eq!(config.pallet_weights.meat_kg, 1250.0);
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        assert_eq!(config.total_hours(), 0);
    }

    #[test]
    fn test_extra_day_extends_horizon() {
        let config = FacilityConfig::from_json_str(
            r#"{"horizon_hours": 72, "release": {"extra_day": {"kg_per_hour": 900}}}"#,
        )
        .unwrap();
        assert!(config.has_extra_day());
        assert_eq!(config.total_hours(), 96);
    }

    #[test]
    fn test_partial_extra_day_block_defaults_missing_fields() {
        let config =
            FacilityConfig::from_json_str(r#"{"fresh": {"extra_day": {"kg_per_day": 100}}}"#)
                .unwrap();
        let extra = config.fresh.extra_day.unwrap();
        assert_eq!(extra.start_hour, 0.0);
        assert_eq!(extra.duration_hours, 0.0);
    }

    #[test]
    fn test_bones_percent_is_clamped() {
        let mut config = FacilityConfig::default();
        config.bones_percent = 140.0;
        assert_eq!(config.effective_bones_percent(), 100.0);
        config.bones_percent = -5.0;
        assert_eq!(config.effective_bones_percent(), 0.0);
    }

    #[test]
    fn test_validate_rejects_duplicate_tunnels() {
        let mut config = FacilityConfig::default();
        config.tunnels.push(TunnelSpec::new("CC037", 10.0, 2, 5));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_negative_capacity() {
        let mut config = FacilityConfig::default();
        config.tunnels = vec![TunnelSpec::new("X", -1.0, 1, 1)];
        assert!(config.validate().is_err());

        config.tunnels.clear();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            FacilityConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
