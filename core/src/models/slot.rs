//! Parking slot model
//!
//! A slot is a single physical parking space located by lot, floor, and
//! number. Its status moves only AVAILABLE→OCCUPIED (allocation) and
//! OCCUPIED→AVAILABLE (release); every transition bumps a monotonically
//! increasing version used as a fencing token for lost-update detection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::vehicle::VehicleClass;

/// Slot occupancy status. There are no other states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotStatus {
    /// Free to be allocated
    Available,
    /// Held by exactly one active ticket
    Occupied,
}

/// Errors from illegal slot transitions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlotError {
    #[error("slot is not available")]
    NotAvailable,

    #[error("slot is not occupied")]
    NotOccupied,
}

/// A single physical parking space.
///
/// Slots are created by an out-of-scope admin flow; this core only reads
/// them and flips their status through the transitions above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Unique slot identifier (UUID)
    id: String,

    /// Owning parking lot
    lot_id: u64,

    /// Floor; negative for below-grade levels
    floor: i32,

    /// Slot number, unique within lot+floor
    number: u32,

    /// Vehicle class this slot accepts
    class: VehicleClass,

    /// Current occupancy status
    status: SlotStatus,

    /// Fencing token, bumped on every status transition
    version: u64,
}

impl Slot {
    /// Create a new AVAILABLE slot at version 0.
    pub fn new(lot_id: u64, floor: i32, number: u32, class: VehicleClass) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            lot_id,
            floor,
            number,
            class,
            status: SlotStatus::Available,
            version: 0,
        }
    }

    /// Get slot ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get owning lot ID
    pub fn lot_id(&self) -> u64 {
        self.lot_id
    }

    /// Get floor
    pub fn floor(&self) -> i32 {
        self.floor
    }

    /// Get slot number within lot+floor
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Get accepted vehicle class
    pub fn class(&self) -> VehicleClass {
        self.class
    }

    /// Get current status
    pub fn status(&self) -> SlotStatus {
        self.status
    }

    /// Get the fencing token
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Check if the slot can be allocated
    pub fn is_available(&self) -> bool {
        self.status == SlotStatus::Available
    }

    /// Transition AVAILABLE→OCCUPIED.
    ///
    /// Callers race for this transition; the store serializes it so only
    /// one of them observes `Ok`.
    pub(crate) fn occupy(&mut self) -> Result<(), SlotError> {
        if self.status != SlotStatus::Available {
            return Err(SlotError::NotAvailable);
        }
        self.status = SlotStatus::Occupied;
        self.version += 1;
        Ok(())
    }

    /// Transition OCCUPIED→AVAILABLE.
    ///
    /// Release is uncontended (only the ticket holding the slot releases
    /// it), so no fencing check is made; the status invariant still holds.
    pub(crate) fn release(&mut self) -> Result<(), SlotError> {
        if self.status != SlotStatus::Occupied {
            return Err(SlotError::NotOccupied);
        }
        self.status = SlotStatus::Available;
        self.version += 1;
        Ok(())
    }
}
