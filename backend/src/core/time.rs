//! Time management for the simulation
//!
//! The simulation advances in discrete one-hour ticks numbered from 1.
//! Twenty-four ticks form a day. An optional extra day of 24 ticks can be
//! appended after the base horizon; stages use their extra-day windows
//! during those hours.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Hours in one simulated day
pub const HOURS_PER_DAY: usize = 24;

/// Manages simulation time in one-hour ticks
///
/// Hour 0 means "not started". The first call to [`HourClock::advance_hour`]
/// moves the clock to hour 1, which is 00:00 of the start date.
///
/// # Example
/// ```
/// use cold_storage_simulator_core_rs::HourClock;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let mut clock = HourClock::new(48, false, start);
/// assert_eq!(clock.current_hour(), 0);
///
/// clock.advance_hour();
/// assert_eq!(clock.current_hour(), 1);
/// assert_eq!(clock.hour_of_day(), 0);
/// assert_eq!(clock.day(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourClock {
    /// Hours elapsed since simulation start (0 = not started)
    current_hour: usize,
    /// Configured horizon, excluding the extra day
    base_hours: usize,
    /// Whether an extra 24h block follows the base horizon
    extra_day: bool,
    /// Wall-clock instant of hour 1
    start: NaiveDateTime,
}

impl HourClock {
    /// Create a new clock
    ///
    /// # Arguments
    /// * `base_hours` - Configured simulation horizon
    /// * `extra_day` - Append a 24-hour extra-day block after the horizon
    /// * `start_date` - Calendar date of hour 1 (starting at midnight)
    pub fn new(base_hours: usize, extra_day: bool, start_date: NaiveDate) -> Self {
        Self {
            current_hour: 0,
            base_hours,
            extra_day,
            start: start_date.and_time(NaiveTime::default()),
        }
    }

    /// Advance time by one hour
    pub fn advance_hour(&mut self) {
        self.current_hour += 1;
    }

    /// Current hour (1-based once started)
    pub fn current_hour(&self) -> usize {
        self.current_hour
    }

    /// Total number of hours to simulate, including the extra day
    ///
    /// # Example
    /// ```
    /// use cold_storage_simulator_core_rs::HourClock;
    /// use chrono::NaiveDate;
    ///
    /// let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    /// assert_eq!(HourClock::new(72, false, start).total_hours(), 72);
    /// assert_eq!(HourClock::new(72, true, start).total_hours(), 96);
    /// ```
    pub fn total_hours(&self) -> usize {
        if self.extra_day {
            self.base_hours + HOURS_PER_DAY
        } else {
            self.base_hours
        }
    }

    /// Configured horizon without the extra day
    pub fn base_hours(&self) -> usize {
        self.base_hours
    }

    /// Hour within the current day (0..=23)
    pub fn hour_of_day(&self) -> usize {
        self.current_hour.saturating_sub(1) % HOURS_PER_DAY
    }

    /// Current day (1-based)
    pub fn day(&self) -> usize {
        self.current_hour.saturating_sub(1) / HOURS_PER_DAY + 1
    }

    /// True while the clock is inside the appended extra-day block
    pub fn is_extra_day(&self) -> bool {
        self.current_hour > self.base_hours
    }

    /// True on the first hour of a day, when per-day counters reset
    pub fn is_start_of_day(&self) -> bool {
        self.current_hour > 0 && self.hour_of_day() == 0
    }

    /// True on the last hour of a day or the final hour of the run
    ///
    /// # Example
    /// ```
    /// use cold_storage_simulator_core_rs::HourClock;
    /// use chrono::NaiveDate;
    ///
    /// let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    /// let mut clock = HourClock::new(30, false, start);
    /// for _ in 0..24 {
    ///     clock.advance_hour();
    /// }
    /// assert!(clock.is_end_of_day());
    /// ```
    pub fn is_end_of_day(&self) -> bool {
        self.current_hour > 0
            && (self.hour_of_day() == HOURS_PER_DAY - 1 || self.current_hour == self.total_hours())
    }

    /// True once every hour of the horizon has been simulated
    pub fn is_finished(&self) -> bool {
        self.current_hour >= self.total_hours()
    }

    /// Wall-clock datetime of the current hour
    pub fn datetime(&self) -> NaiveDateTime {
        self.start + Duration::hours(self.current_hour.saturating_sub(1) as i64)
    }

    /// Wall-clock datetime of hour 1
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }
}
