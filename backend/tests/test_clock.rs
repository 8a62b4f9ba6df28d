//! Tests for HourClock
//!
//! Hour numbering is 1-based; hour-of-day and day index derive from it.

use chrono::{NaiveDate, NaiveDateTime};
use cold_storage_simulator_core_rs::HourClock;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

fn advance(clock: &mut HourClock, hours: usize) {
    for _ in 0..hours {
        clock.advance_hour();
    }
}

#[test]
fn test_clock_new() {
    let clock = HourClock::new(48, false, start());
    assert_eq!(clock.current_hour(), 0);
    assert_eq!(clock.total_hours(), 48);
    assert!(!clock.is_finished());
}

#[test]
fn test_hour_of_day_and_day() {
    let mut clock = HourClock::new(72, false, start());

    clock.advance_hour();
    assert_eq!(clock.hour_of_day(), 0);
    assert_eq!(clock.day(), 1);
    assert!(clock.is_start_of_day());

    advance(&mut clock, 23); // hour 24
    assert_eq!(clock.hour_of_day(), 23);
    assert_eq!(clock.day(), 1);
    assert!(clock.is_end_of_day());

    clock.advance_hour(); // hour 25
    assert_eq!(clock.hour_of_day(), 0);
    assert_eq!(clock.day(), 2);
    assert!(clock.is_start_of_day());
    assert!(!clock.is_end_of_day());
}

#[test]
fn test_extra_day_detection() {
    let mut clock = HourClock::new(24, true, start());
    assert_eq!(clock.total_hours(), 48);

    advance(&mut clock, 24);
    assert!(!clock.is_extra_day());

    clock.advance_hour(); // hour 25
    assert!(clock.is_extra_day());
    assert_eq!(clock.day(), 2);
}

#[test]
fn test_partial_last_day_closes_at_final_hour() {
    let mut clock = HourClock::new(30, false, start());
    advance(&mut clock, 29);
    assert!(!clock.is_end_of_day());

    clock.advance_hour(); // hour 30, hour-of-day 5
    assert_eq!(clock.hour_of_day(), 5);
    assert!(clock.is_end_of_day());
    assert!(clock.is_finished());
}

#[test]
fn test_datetime_starts_at_midnight() {
    let mut clock = HourClock::new(48, false, start());
    clock.advance_hour();
    let expected: NaiveDateTime = start().and_hms_opt(0, 0, 0).unwrap();
    assert_eq!(clock.datetime(), expected);

    advance(&mut clock, 25); // hour 26
    assert_eq!(
        clock.datetime(),
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(1, 0, 0)
            .unwrap()
    );
}

#[test]
fn test_clock_round_trips_through_json() {
    let mut clock = HourClock::new(24, true, start());
    advance(&mut clock, 30);
    let json = serde_json::to_string(&clock).unwrap();
    let restored: HourClock = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, clock);
    assert!(restored.is_extra_day());
}
