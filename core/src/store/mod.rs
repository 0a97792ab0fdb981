//! Repository contracts consumed by the engine.
//!
//! Every store is a trait so a durable backend can replace the in-memory
//! implementations in [`memory`] without touching the engine. The three
//! contracts that carry the concurrency guarantees:
//!
//! - [`SlotStore::try_occupy`] is the atomic conditional
//!   AVAILABLE→OCCUPIED transition; losing the race is `Ok(None)`, never
//!   an error, and the lock is held only for the single check-and-set.
//! - [`VehicleStore::find_or_create`] is an idempotent upsert keyed on the
//!   normalized plate; concurrent first-seen creates resolve to one record.
//! - [`TicketStore::create_active`] enforces at most one ACTIVE ticket per
//!   plate inside one critical section (a uniqueness constraint, not a
//!   check-then-act).

pub mod memory;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::payment::{PaymentRecord, PaymentStatus};
use crate::models::pricing_rule::PricingRule;
use crate::models::slot::{Slot, SlotError};
use crate::models::ticket::{Ticket, TicketError};
use crate::models::vehicle::{Vehicle, VehicleClass};

/// Errors surfaced by the stores
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("parking lot {0} is not registered")]
    LotNotFound(u64),

    #[error("slot {0} does not exist")]
    SlotNotFound(String),

    #[error("ticket {0} does not exist")]
    TicketNotFound(String),

    #[error("no payment record exists for ticket {0}")]
    PaymentNotFound(String),

    #[error("vehicle {plate} already holds an active ticket")]
    DuplicateActiveTicket { plate: String },

    #[error("slot state conflict: {0}")]
    SlotConflict(#[from] SlotError),

    #[error("ticket state conflict: {0}")]
    TicketConflict(#[from] TicketError),
}

/// Transactional repository over slot records.
pub trait SlotStore: Send + Sync {
    /// Snapshot of AVAILABLE slots in `lot_id` accepting `class`.
    ///
    /// The snapshot is unordered; allocation strategies impose their own
    /// ordering. No lock is held once this returns, so any entry may be
    /// taken by a concurrent caller before [`SlotStore::try_occupy`] runs.
    fn available_slots(&self, lot_id: u64, class: VehicleClass) -> Result<Vec<Slot>, StoreError>;

    /// Atomic conditional transition: OCCUPIED iff currently AVAILABLE.
    ///
    /// Returns the updated slot, or `Ok(None)` when the race was lost
    /// (the slot is no longer available). Never blocks longer than the
    /// single check-and-set.
    fn try_occupy(&self, slot_id: &str) -> Result<Option<Slot>, StoreError>;

    /// Unconditional release back to AVAILABLE.
    ///
    /// Release is uncontended: only the ticket holding the slot releases
    /// it, so no fencing comparison is made.
    fn release(&self, slot_id: &str) -> Result<Slot, StoreError>;

    /// Fetch one slot by id.
    fn get(&self, slot_id: &str) -> Result<Slot, StoreError>;
}

/// Repository over vehicle records.
pub trait VehicleStore: Send + Sync {
    /// Look up the vehicle by plate, creating it on first sight.
    ///
    /// Race-safe: concurrent calls for the same never-seen plate resolve
    /// to a single record.
    fn find_or_create(&self, plate: &str, class: VehicleClass, owner_contact: &str) -> Vehicle;

    /// Look up the vehicle by plate.
    fn find_by_plate(&self, plate: &str) -> Option<Vehicle>;
}

/// Repository over ticket records.
pub trait TicketStore: Send + Sync {
    /// Create an ACTIVE ticket for `vehicle` holding `slot`.
    ///
    /// Fails with [`StoreError::DuplicateActiveTicket`] when the plate
    /// already holds an ACTIVE ticket. The check and the insert happen in
    /// one critical section.
    fn create_active(
        &self,
        vehicle: &Vehicle,
        slot: &Slot,
        entry_time: DateTime<Utc>,
    ) -> Result<Ticket, StoreError>;

    /// Fetch one ticket by id.
    fn get(&self, ticket_id: &str) -> Result<Ticket, StoreError>;

    /// The ACTIVE ticket for a plate, if any.
    fn find_active_by_plate(&self, plate: &str) -> Option<Ticket>;

    /// Conditional ACTIVE→PAID transition fixing the exit time.
    ///
    /// Fails with a [`StoreError::TicketConflict`] when the ticket is not
    /// ACTIVE, so completion commits at most once.
    fn complete(&self, ticket_id: &str, exit_time: DateTime<Utc>) -> Result<Ticket, StoreError>;
}

/// Read-only pricing rule lookup.
pub trait PricingRuleStore: Send + Sync {
    /// Rule for a class; `None` means the built-in default applies.
    fn rule_for(&self, class: VehicleClass) -> Option<PricingRule>;
}

/// Repository over payment records (one per ticket).
pub trait PaymentStore: Send + Sync {
    /// Create or reset the ticket's payment record to INITIATED.
    fn initiate(&self, ticket_id: &str, amount: i64, at: DateTime<Utc>) -> PaymentRecord;

    /// Record the gateway outcome on the existing record.
    fn finish(
        &self,
        ticket_id: &str,
        status: PaymentStatus,
        at: DateTime<Utc>,
    ) -> Result<PaymentRecord, StoreError>;

    /// The ticket's payment record, if payment was ever initiated.
    fn for_ticket(&self, ticket_id: &str) -> Option<PaymentRecord>;
}
