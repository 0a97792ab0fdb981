//! Domain event logging for auditing.
//!
//! The engine records every significant state change as an event. The log
//! supports:
//! - Auditing (verify that every occupied slot traces to a ticket)
//! - Debugging (understand what happened and when)
//! - Analysis (extract occupancy and revenue patterns)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A state change recorded by the engine.
///
/// All events carry the wall-clock instant at which they occurred, in the
/// order the engine committed them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParkingEvent {
    /// A vehicle entered and a ticket was created
    VehicleEntered {
        at: DateTime<Utc>,
        ticket_id: String,
        plate: String,
        slot_id: String,
        lot_id: u64,
    },

    /// The gateway confirmed a charge and the ticket was marked PAID
    PaymentSucceeded {
        at: DateTime<Utc>,
        ticket_id: String,
        amount: i64,
    },

    /// The gateway declined a charge; the ticket stays ACTIVE
    PaymentFailed {
        at: DateTime<Utc>,
        ticket_id: String,
        amount: i64,
    },

    /// A slot returned to AVAILABLE after its ticket was paid
    SlotReleased {
        at: DateTime<Utc>,
        ticket_id: String,
        slot_id: String,
    },
}

impl ParkingEvent {
    /// Instant at which the event occurred.
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            ParkingEvent::VehicleEntered { at, .. }
            | ParkingEvent::PaymentSucceeded { at, .. }
            | ParkingEvent::PaymentFailed { at, .. }
            | ParkingEvent::SlotReleased { at, .. } => *at,
        }
    }

    /// Short event-type name, for filtering.
    pub fn event_type(&self) -> &'static str {
        match self {
            ParkingEvent::VehicleEntered { .. } => "vehicle_entered",
            ParkingEvent::PaymentSucceeded { .. } => "payment_succeeded",
            ParkingEvent::PaymentFailed { .. } => "payment_failed",
            ParkingEvent::SlotReleased { .. } => "slot_released",
        }
    }

    /// Ticket the event belongs to.
    pub fn ticket_id(&self) -> &str {
        match self {
            ParkingEvent::VehicleEntered { ticket_id, .. }
            | ParkingEvent::PaymentSucceeded { ticket_id, .. }
            | ParkingEvent::PaymentFailed { ticket_id, .. }
            | ParkingEvent::SlotReleased { ticket_id, .. } => ticket_id,
        }
    }
}

/// Append-only event log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<ParkingEvent>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn record(&mut self, event: ParkingEvent) {
        self.events.push(event);
    }

    /// Number of events recorded
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All events in commit order
    pub fn events(&self) -> &[ParkingEvent] {
        &self.events
    }

    /// Events of a given type, in commit order
    pub fn events_of_type(&self, event_type: &str) -> Vec<&ParkingEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Events for a given ticket, in commit order
    pub fn events_for_ticket(&self, ticket_id: &str) -> Vec<&ParkingEvent> {
        self.events
            .iter()
            .filter(|e| e.ticket_id() == ticket_id)
            .collect()
    }
}
