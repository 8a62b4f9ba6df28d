//! Stage windows and hourly demand

use crate::models::batch::EXHAUSTED_EPSILON;
use serde::{Deserialize, Serialize};

/// Working window of a stage within a day, `[start_hour, end_hour)`
///
/// The end may be fractional (e.g. deboning that needs 9.5 hours).
///
/// # Example
/// ```
/// use cold_storage_simulator_core_rs::flows::StageWindow;
///
/// let window = StageWindow::new(6.0, 15.5);
/// assert!(!window.contains(5));
/// assert!(window.contains(6));
/// assert!(window.contains(15));
/// assert!(!window.contains(16));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageWindow {
    pub start_hour: f64,
    pub end_hour: f64,
}

impl StageWindow {
    pub fn new(start_hour: f64, end_hour: f64) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }

    /// A window starting at `start_hour` and lasting `duration_hours`
    pub fn from_duration(start_hour: f64, duration_hours: f64) -> Self {
        Self::new(start_hour, start_hour + duration_hours)
    }

    /// Whether the stage runs during the given hour of the day
    pub fn contains(&self, hour_of_day: usize) -> bool {
        let hour = hour_of_day as f64;
        hour >= self.start_hour && hour < self.end_hour
    }

    pub fn duration_hours(&self) -> f64 {
        (self.end_hour - self.start_hour).max(0.0)
    }
}

/// Rate, window and optional daily cap for one stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StagePlan {
    pub window: StageWindow,
    pub kg_per_hour: f64,
    /// Daily volume limit; `None` for stages limited only by their window
    pub daily_cap_kg: Option<f64>,
}

impl StagePlan {
    /// Stage limited only by its window
    pub fn hourly(window: StageWindow, kg_per_hour: f64) -> Self {
        Self {
            window,
            kg_per_hour,
            daily_cap_kg: None,
        }
    }

    /// Stage limited by a daily volume
    pub fn capped(window: StageWindow, kg_per_hour: f64, daily_cap_kg: f64) -> Self {
        Self {
            window,
            kg_per_hour,
            daily_cap_kg: Some(daily_cap_kg),
        }
    }

    /// Kg the stage wants to move this hour
    ///
    /// # Arguments
    /// * `hour_of_day` - 0..=23
    /// * `done_today_kg` - What the stage already moved today (capped stages only)
    ///
    /// # Returns
    /// 0 outside the window. For capped stages, the rate trimmed to what is
    /// left of the daily cap, or 0 once that remainder is negligible.
    pub fn demand(&self, hour_of_day: usize, done_today_kg: f64) -> f64 {
        if !self.window.contains(hour_of_day) {
            return 0.0;
        }
        match self.daily_cap_kg {
            None => self.kg_per_hour,
            Some(cap) => {
                if done_today_kg >= cap {
                    return 0.0;
                }
                let demand = self.kg_per_hour.min(cap - done_today_kg);
                if demand > EXHAUSTED_EPSILON {
                    demand
                } else {
                    0.0
                }
            }
        }
    }
}
