//! Ticket model
//!
//! A ticket records one vehicle's occupancy of one slot from entry to
//! exit. Lifecycle:
//!
//! ```text
//! ACTIVE ──payment success──▶ PAID            (terminal)
//!    └────payment failure───▶ PAYMENT_FAILED  (terminal)
//! ```
//!
//! The slot reference is immutable after creation: exit changes only the
//! ticket's status and exit time, never which slot it refers to. At most
//! one ACTIVE ticket exists per plate; the ticket store enforces that.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::slot::Slot;
use crate::models::vehicle::{Vehicle, VehicleClass};

/// Ticket lifecycle status.
///
/// `Paid` and `PaymentFailed` are terminal; no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    /// Vehicle is parked, fee accruing
    Active,
    /// Fee charged successfully, slot released
    Paid,
    /// Terminal failure state defined by the lifecycle.
    ///
    /// The reference exit flow never writes this: a failed charge leaves
    /// the ticket Active so payment can be retried.
    PaymentFailed,
}

/// Errors from illegal ticket transitions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TicketError {
    #[error("ticket is not active")]
    NotActive,
}

/// Record of one vehicle's stay in one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique ticket identifier (UUID)
    id: String,

    /// Owning vehicle
    vehicle_id: String,

    /// Normalized plate, denormalized for active-by-plate lookups
    plate: String,

    /// Vehicle class at entry, used for pricing
    vehicle_class: VehicleClass,

    /// The exact slot instance held; immutable after creation
    slot_id: String,

    /// When the vehicle entered
    entry_time: DateTime<Utc>,

    /// When the vehicle exited; absent until the ticket leaves ACTIVE
    exit_time: Option<DateTime<Utc>>,

    /// Current status
    status: TicketStatus,
}

impl Ticket {
    /// Create an ACTIVE ticket binding a vehicle to a reserved slot.
    pub fn new(vehicle: &Vehicle, slot: &Slot, entry_time: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            vehicle_id: vehicle.id().to_string(),
            plate: vehicle.plate().to_string(),
            vehicle_class: vehicle.class(),
            slot_id: slot.id().to_string(),
            entry_time,
            exit_time: None,
            status: TicketStatus::Active,
        }
    }

    /// Get ticket ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get owning vehicle ID
    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    /// Get the normalized plate
    pub fn plate(&self) -> &str {
        &self.plate
    }

    /// Get the vehicle class used for pricing
    pub fn vehicle_class(&self) -> VehicleClass {
        self.vehicle_class
    }

    /// Get the held slot ID
    pub fn slot_id(&self) -> &str {
        &self.slot_id
    }

    /// Get entry time
    pub fn entry_time(&self) -> DateTime<Utc> {
        self.entry_time
    }

    /// Get exit time, if the stay has ended
    pub fn exit_time(&self) -> Option<DateTime<Utc>> {
        self.exit_time
    }

    /// Get current status
    pub fn status(&self) -> TicketStatus {
        self.status
    }

    /// Check if the ticket is ACTIVE
    pub fn is_active(&self) -> bool {
        self.status == TicketStatus::Active
    }

    /// Transition ACTIVE→PAID, fixing the exit time.
    ///
    /// The exit time is the authoritative instant computed by the caller
    /// when the exit began, not when the transition commits.
    pub(crate) fn complete(&mut self, exit_time: DateTime<Utc>) -> Result<(), TicketError> {
        if self.status != TicketStatus::Active {
            return Err(TicketError::NotActive);
        }
        self.status = TicketStatus::Paid;
        self.exit_time = Some(exit_time);
        Ok(())
    }
}
