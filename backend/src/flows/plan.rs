//! Flow plan derivation
//!
//! Turns the raw stage configuration into per-stage hourly rates, daily caps
//! and windows, once, before the first hour runs.
//!
//! ```text
//! deboning rate  = line_speed × oee/100 × (carcass + offal)
//! deboning cap   = pigs × (carcass + offal)
//! deboning hours = pigs / (line_speed × oee/100)
//! fresh rate     = kg_per_day / duration
//! ```
//!
//! Normal days run every stage. The extra day runs only the stages that
//! define an extra-day block.

use crate::config::FacilityConfig;
use crate::flows::stage::{StagePlan, StageWindow};
use serde::{Deserialize, Serialize};

/// Replace a negative or non-finite input with 0
fn sanitize(field: &str, value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        tracing::warn!(field, value, "degenerate configuration value treated as 0");
        0.0
    }
}

/// Stage plans for one kind of day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub deboning: Option<StagePlan>,
    pub boxing: Option<StagePlan>,
    pub plates: Option<StagePlan>,
    pub fresh: Option<StagePlan>,
    pub release: Option<StagePlan>,
}

/// Headline rates for normal days, reported before a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSummary {
    pub carcass_kg_per_day: f64,
    pub offal_kg_per_day: f64,
    pub deboning_kg_per_hour: f64,
    pub deboning_hours_per_day: f64,
    pub boxing_kg_per_hour: f64,
    pub plates_kg_per_hour: f64,
    pub fresh_kg_per_hour: f64,
    pub release_kg_per_hour: f64,
}

/// Derived stage plans for the whole run
///
/// # Example
///
/// ```rust
/// use cold_storage_simulator_core_rs::config::FacilityConfig;
/// use cold_storage_simulator_core_rs::flows::FlowPlan;
///
/// let mut config = FacilityConfig::default();
/// config.deboning.pigs_per_day = 1_000.0;
/// config.deboning.line_speed_pigs_per_hour = 125.0;
/// config.deboning.oee_percent = 80.0;
/// config.deboning.carcass_kg = 90.0;
/// config.deboning.offal_kg = 10.0;
///
/// let plan = FlowPlan::from_config(&config);
/// let summary = plan.summary();
/// assert_eq!(summary.deboning_kg_per_hour, 10_000.0);
/// assert_eq!(summary.deboning_hours_per_day, 10.0);
/// assert_eq!(summary.carcass_kg_per_day, 90_000.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowPlan {
    normal: DayPlan,
    extra: DayPlan,
    summary: FlowSummary,
}

impl FlowPlan {
    /// Derive the plan from a configuration, sanitising degenerate values
    pub fn from_config(config: &FacilityConfig) -> Self {
        let d = &config.deboning;
        let speed = sanitize("deboning.line_speed_pigs_per_hour", d.line_speed_pigs_per_hour)
            * sanitize("deboning.oee_percent", d.oee_percent)
            / 100.0;
        let carcass = sanitize("deboning.carcass_kg", d.carcass_kg);
        let offal = sanitize("deboning.offal_kg", d.offal_kg);
        let pigs = sanitize("deboning.pigs_per_day", d.pigs_per_day);

        let deboning_hours = if speed > 0.0 { pigs / speed } else { 0.0 };
        let deboning_rate = speed * (carcass + offal);
        let deboning = StagePlan::capped(
            StageWindow::from_duration(sanitize("deboning.start_hour", d.start_hour), deboning_hours),
            deboning_rate,
            pigs * (carcass + offal),
        );

        let b = &config.boxing;
        let boxing_rate = b
            .line_kg_per_hour
            .iter()
            .map(|rate| sanitize("boxing.line_kg_per_hour", *rate))
            .sum::<f64>();
        let boxing = StagePlan::hourly(
            StageWindow::from_duration(
                sanitize("boxing.start_hour", b.start_hour),
                sanitize("boxing.duration_hours", b.duration_hours),
            ),
            boxing_rate,
        );

        let p = &config.plates;
        let plates = StagePlan::hourly(
            StageWindow::from_duration(
                sanitize("plates.start_hour", p.start_hour),
                sanitize("plates.duration_hours", p.duration_hours),
            ),
            sanitize("plates.kg_per_hour", p.kg_per_hour),
        );

        let f = &config.fresh;
        let fresh = Self::fresh_plan(
            "fresh",
            sanitize("fresh.start_hour", f.start_hour),
            sanitize("fresh.duration_hours", f.duration_hours),
            sanitize("fresh.kg_per_day", f.kg_per_day),
        );

        let r = &config.release;
        let release = StagePlan::hourly(
            StageWindow::from_duration(
                sanitize("release.start_hour", r.start_hour),
                sanitize("release.duration_hours", r.duration_hours),
            ),
            sanitize("release.kg_per_hour", r.kg_per_hour),
        );

        let summary = FlowSummary {
            carcass_kg_per_day: pigs * carcass,
            offal_kg_per_day: pigs * offal,
            deboning_kg_per_hour: deboning_rate,
            deboning_hours_per_day: deboning_hours,
            boxing_kg_per_hour: boxing_rate,
            plates_kg_per_hour: plates.kg_per_hour,
            fresh_kg_per_hour: fresh.kg_per_hour,
            release_kg_per_hour: release.kg_per_hour,
        };

        // Extra day: carcass weight, speed and OEE carry over from normal days
        let extra = DayPlan {
            deboning: d.extra_day.as_ref().map(|x| {
                let pigs = sanitize("deboning.extra_day.pigs", x.pigs);
                let kg_per_pig = carcass + sanitize("deboning.extra_day.offal_kg", x.offal_kg);
                let hours = if speed > 0.0 { pigs / speed } else { 0.0 };
                StagePlan::capped(
                    StageWindow::from_duration(
                        sanitize("deboning.extra_day.start_hour", x.start_hour),
                        hours,
                    ),
                    speed * kg_per_pig,
                    pigs * kg_per_pig,
                )
            }),
            boxing: b.extra_day.as_ref().map(|x| {
                StagePlan::hourly(
                    StageWindow::from_duration(
                        sanitize("boxing.extra_day.start_hour", x.start_hour),
                        sanitize("boxing.extra_day.duration_hours", x.duration_hours),
                    ),
                    sanitize("boxing.extra_day.kg_per_hour", x.kg_per_hour),
                )
            }),
            plates: p.extra_day.as_ref().map(|x| {
                StagePlan::hourly(
                    StageWindow::from_duration(
                        sanitize("plates.extra_day.start_hour", x.start_hour),
                        sanitize("plates.extra_day.duration_hours", x.duration_hours),
                    ),
                    sanitize("plates.extra_day.kg_per_hour", x.kg_per_hour),
                )
            }),
            fresh: f.extra_day.as_ref().map(|x| {
                Self::fresh_plan(
                    "fresh.extra_day",
                    sanitize("fresh.extra_day.start_hour", x.start_hour),
                    sanitize("fresh.extra_day.duration_hours", x.duration_hours),
                    sanitize("fresh.extra_day.kg_per_day", x.kg_per_day),
                )
            }),
            release: r.extra_day.as_ref().map(|x| {
                StagePlan::hourly(
                    StageWindow::from_duration(
                        sanitize("release.extra_day.start_hour", x.start_hour),
                        sanitize("release.extra_day.duration_hours", x.duration_hours),
                    ),
                    sanitize("release.extra_day.kg_per_hour", x.kg_per_hour),
                )
            }),
        };

        Self {
            normal: DayPlan {
                deboning: Some(deboning),
                boxing: Some(boxing),
                plates: Some(plates),
                fresh: Some(fresh),
                release: Some(release),
            },
            extra,
            summary,
        }
    }

    fn fresh_plan(stage: &str, start_hour: f64, duration_hours: f64, kg_per_day: f64) -> StagePlan {
        let rate = if duration_hours > 0.0 {
            kg_per_day / duration_hours
        } else {
            if kg_per_day > 0.0 {
                tracing::warn!(stage, kg_per_day, "fresh dispatch has no duration; rate is 0");
            }
            0.0
        };
        StagePlan::capped(
            StageWindow::from_duration(start_hour, duration_hours),
            rate,
            kg_per_day,
        )
    }

    /// Stage plans that apply to a given kind of hour
    pub fn day(&self, is_extra_day: bool) -> &DayPlan {
        if is_extra_day {
            &self.extra
        } else {
            &self.normal
        }
    }

    pub fn summary(&self) -> &FlowSummary {
        &self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FreshExtraDay, HourlyExtraDay};

    #[test]
    fn test_default_config_has_no_flow() {
        let plan = FlowPlan::from_config(&FacilityConfig::default());
        let day = plan.day(false);
        for hour in 0..24 {
            assert_eq!(day.deboning.unwrap().demand(hour, 0.0), 0.0);
            assert_eq!(day.boxing.unwrap().demand(hour, 0.0), 0.0);
            assert_eq!(day.fresh.unwrap().demand(hour, 0.0), 0.0);
        }
        assert_eq!(plan.day(true), &DayPlan::default());
    }

    #[test]
    fn test_fresh_rate_spreads_daily_volume() {
        let mut config = FacilityConfig::default();
        config.fresh.start_hour = 8.0;
        config.fresh.duration_hours = 4.0;
        config.fresh.kg_per_day = 10_000.0;
        let plan = FlowPlan::from_config(&config);
        assert_eq!(plan.summary().fresh_kg_per_hour, 2_500.0);
        assert_eq!(plan.day(false).fresh.unwrap().daily_cap_kg, Some(10_000.0));
    }

    #[test]
    fn test_zero_speed_disables_deboning() {
        let mut config = FacilityConfig::default();
        config.deboning.pigs_per_day = 500.0;
        config.deboning.carcass_kg = 90.0;
        let plan = FlowPlan::from_config(&config);
        assert_eq!(plan.summary().deboning_hours_per_day, 0.0);
        assert_eq!(plan.day(false).deboning.unwrap().demand(0, 0.0), 0.0);
    }

    #[test]
    fn test_degenerate_rates_become_zero() {
        let mut config = FacilityConfig::default();
        config.plates.kg_per_hour = f64::NAN;
        config.release.kg_per_hour = -300.0;
        config.boxing.line_kg_per_hour = vec![200.0, f64::INFINITY];
        let plan = FlowPlan::from_config(&config);
        assert_eq!(plan.summary().plates_kg_per_hour, 0.0);
        assert_eq!(plan.summary().release_kg_per_hour, 0.0);
        assert_eq!(plan.summary().boxing_kg_per_hour, 200.0);
    }

    #[test]
    fn test_extra_day_only_runs_configured_stages() {
        let mut config = FacilityConfig::default();
        config.release.extra_day = Some(HourlyExtraDay {
            start_hour: 0.0,
            duration_hours: 12.0,
            kg_per_hour: 700.0,
        });
        config.fresh.extra_day = Some(FreshExtraDay {
            start_hour: 6.0,
            duration_hours: 0.0,
            kg_per_day: 1_000.0,
        });
        let plan = FlowPlan::from_config(&config);
        let extra = plan.day(true);
        assert!(extra.deboning.is_none());
        assert!(extra.boxing.is_none());
        assert_eq!(extra.release.unwrap().demand(11, 0.0), 700.0);
        assert_eq!(extra.release.unwrap().demand(12, 0.0), 0.0);
        assert_eq!(extra.fresh.unwrap().kg_per_hour, 0.0);
    }

    #[test]
    fn test_extra_day_deboning_uses_normal_carcass_and_speed() {
        let mut config = FacilityConfig::default();
        config.deboning.line_speed_pigs_per_hour = 100.0;
        config.deboning.oee_percent = 100.0;
        config.deboning.carcass_kg = 80.0;
        config.deboning.offal_kg = 20.0;
        config.deboning.extra_day = Some(crate::config::DeboningExtraDay {
            start_hour: 2.0,
            pigs: 300.0,
            offal_kg: 0.0,
        });
        let plan = FlowPlan::from_config(&config);
        let extra = plan.day(true).deboning.unwrap();
        assert_eq!(extra.kg_per_hour, 8_000.0);
        assert_eq!(extra.daily_cap_kg, Some(24_000.0));
        assert_eq!(extra.window, StageWindow::new(2.0, 5.0));
    }
}
