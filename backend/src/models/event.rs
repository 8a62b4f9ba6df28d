//! Event logging for simulation replay and auditing.
//!
//! Every change to tunnel contents is captured as an [`Event`]:
//! - **Seeding**: pre-existing inventory placed before hour 1
//! - **Admission**: boxing output accepted by a tunnel
//! - **Overflow**: product that no tunnel could take
//! - **Release**: frozen product leaving a tunnel
//! - **Day close**: end-of-day summary boundary
//!
//! Seeding events carry hour 0.
//!
//! # Example
//!
//! ```rust
//! use cold_storage_simulator_core_rs::models::{Event, ProductType};
//!
//! let event = Event::Admitted {
//!     hour: 7,
//!     tunnel: "CC037".to_string(),
//!     product: ProductType::Bones,
//!     kg: 2_200.0,
//!     pallets: 2.0,
//!     forced: false,
//! };
//!
//! assert_eq!(event.hour(), 7);
//! assert_eq!(event.tunnel(), Some("CC037"));
//! ```

use crate::models::batch::ProductType;
use serde::Serialize;

/// Simulation event capturing a state change.
///
/// Events are logged in the order they occur within an hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Initial inventory placed at the head of a tunnel
    InventorySeeded {
        tunnel: String,
        product: ProductType,
        kg: f64,
        pallets: f64,
        entry_hour: i64,
    },

    /// Initial inventory that did not fit anywhere
    SeedOverflow { kg: f64 },

    /// Boxing output admitted into a tunnel
    Admitted {
        hour: usize,
        tunnel: String,
        product: ProductType,
        kg: f64,
        pallets: f64,
        /// Admitted during the forced-mixing pass
        forced: bool,
    },

    /// Boxing output sent to external freezing
    Overflow {
        hour: usize,
        product: ProductType,
        kg: f64,
    },

    /// Frozen product removed from a tunnel
    Released {
        hour: usize,
        tunnel: String,
        kg: f64,
    },

    /// Last hour of a simulated day
    DayClosed {
        hour: usize,
        day: usize,
        label: String,
    },
}

impl Event {
    /// Simulation hour of the event (0 for seeding)
    pub fn hour(&self) -> usize {
        match self {
            Event::InventorySeeded { .. } | Event::SeedOverflow { .. } => 0,
            Event::Admitted { hour, .. } => *hour,
            Event::Overflow { hour, .. } => *hour,
            Event::Released { hour, .. } => *hour,
            Event::DayClosed { hour, .. } => *hour,
        }
    }

    /// Get event type as string (for filtering/analysis)
    pub fn event_type(&self) -> &str {
        match self {
            Event::InventorySeeded { .. } => "InventorySeeded",
            Event::SeedOverflow { .. } => "SeedOverflow",
            Event::Admitted { .. } => "Admitted",
            Event::Overflow { .. } => "Overflow",
            Event::Released { .. } => "Released",
            Event::DayClosed { .. } => "DayClosed",
        }
    }

    /// Tunnel name if the event touches a single tunnel
    pub fn tunnel(&self) -> Option<&str> {
        match self {
            Event::InventorySeeded { tunnel, .. } => Some(tunnel),
            Event::Admitted { tunnel, .. } => Some(tunnel),
            Event::Released { tunnel, .. } => Some(tunnel),
            _ => None,
        }
    }

    /// Kg moved by the event, if any
    pub fn kg(&self) -> Option<f64> {
        match self {
            Event::InventorySeeded { kg, .. }
            | Event::SeedOverflow { kg }
            | Event::Admitted { kg, .. }
            | Event::Overflow { kg, .. }
            | Event::Released { kg, .. } => Some(*kg),
            Event::DayClosed { .. } => None,
        }
    }
}

/// Event log for storing and querying simulation events.
///
/// This is a simple wrapper around Vec<Event> with convenience methods.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Get the number of events logged
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events for a specific hour
    pub fn events_at_hour(&self, hour: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.hour() == hour).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events for a specific tunnel
    pub fn events_for_tunnel(&self, tunnel: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.tunnel() == Some(tunnel))
            .collect()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admitted(hour: usize, tunnel: &str) -> Event {
        Event::Admitted {
            hour,
            tunnel: tunnel.to_string(),
            product: ProductType::Meat,
            kg: 1_250.0,
            pallets: 1.0,
            forced: false,
        }
    }

    #[test]
    fn test_seed_events_are_hour_zero() {
        let event = Event::SeedOverflow { kg: 300.0 };
        assert_eq!(event.hour(), 0);
        assert_eq!(event.kg(), Some(300.0));
        assert_eq!(event.tunnel(), None);
    }

    #[test]
    fn test_event_type() {
        let event = Event::Released {
            hour: 3,
            tunnel: "CC062".to_string(),
            kg: 500.0,
        };
        assert_eq!(event.event_type(), "Released");
    }

    #[test]
    fn test_event_log_queries() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        log.log(admitted(1, "CC037"));
        log.log(admitted(1, "CC038"));
        log.log(Event::Overflow {
            hour: 1,
            product: ProductType::Bones,
            kg: 40.0,
        });
        log.log(admitted(2, "CC037"));

        assert_eq!(log.len(), 4);
        assert_eq!(log.events_at_hour(1).len(), 3);
        assert_eq!(log.events_of_type("Admitted").len(), 3);
        assert_eq!(log.events_for_tunnel("CC037").len(), 2);

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_value(admitted(5, "CC059")).unwrap();
        assert_eq!(json["type"], "Admitted");
        assert_eq!(json["product"], "Meat");
    }
}
