//! Thread-safe in-memory store implementations.
//!
//! These back the engine in tests and embedded deployments; a durable
//! backend implements the same traits. Locks are scoped to single
//! operations — in particular, [`InMemorySlotStore::try_occupy`] holds
//! the write lock only for one slot's check-and-set, never across an
//! allocation scan.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};

use crate::models::payment::{PaymentRecord, PaymentStatus};
use crate::models::pricing_rule::PricingRule;
use crate::models::slot::Slot;
use crate::models::ticket::Ticket;
use crate::models::vehicle::{normalize_plate, Vehicle, VehicleClass};
use crate::store::{
    PaymentStore, PricingRuleStore, SlotStore, StoreError, TicketStore, VehicleStore,
};

/// In-memory slot repository.
///
/// Lots and slots are registered by setup code standing in for the
/// out-of-scope admin flow.
#[derive(Debug, Default)]
pub struct InMemorySlotStore {
    inner: RwLock<SlotTable>,
}

#[derive(Debug, Default)]
struct SlotTable {
    lots: HashSet<u64>,
    slots: HashMap<String, Slot>,
}

impl InMemorySlotStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parking lot id so its slots can be inserted and queried.
    pub fn register_lot(&self, lot_id: u64) {
        self.inner.write().lots.insert(lot_id);
    }

    /// Insert a slot into a registered lot.
    pub fn insert_slot(&self, slot: Slot) -> Result<(), StoreError> {
        let mut table = self.inner.write();
        if !table.lots.contains(&slot.lot_id()) {
            return Err(StoreError::LotNotFound(slot.lot_id()));
        }
        table.slots.insert(slot.id().to_string(), slot);
        Ok(())
    }

    /// Number of OCCUPIED slots, across all lots.
    pub fn occupied_count(&self) -> usize {
        self.inner
            .read()
            .slots
            .values()
            .filter(|s| !s.is_available())
            .count()
    }
}

impl SlotStore for InMemorySlotStore {
    fn available_slots(&self, lot_id: u64, class: VehicleClass) -> Result<Vec<Slot>, StoreError> {
        let table = self.inner.read();
        if !table.lots.contains(&lot_id) {
            return Err(StoreError::LotNotFound(lot_id));
        }
        Ok(table
            .slots
            .values()
            .filter(|s| s.lot_id() == lot_id && s.class() == class && s.is_available())
            .cloned()
            .collect())
    }

    fn try_occupy(&self, slot_id: &str) -> Result<Option<Slot>, StoreError> {
        let mut table = self.inner.write();
        let slot = table
            .slots
            .get_mut(slot_id)
            .ok_or_else(|| StoreError::SlotNotFound(slot_id.to_string()))?;
        if slot.occupy().is_err() {
            // Lost the race: a concurrent caller took this slot between
            // the snapshot and now. Not an error.
            return Ok(None);
        }
        Ok(Some(slot.clone()))
    }

    fn release(&self, slot_id: &str) -> Result<Slot, StoreError> {
        let mut table = self.inner.write();
        let slot = table
            .slots
            .get_mut(slot_id)
            .ok_or_else(|| StoreError::SlotNotFound(slot_id.to_string()))?;
        slot.release()?;
        Ok(slot.clone())
    }

    fn get(&self, slot_id: &str) -> Result<Slot, StoreError> {
        self.inner
            .read()
            .slots
            .get(slot_id)
            .cloned()
            .ok_or_else(|| StoreError::SlotNotFound(slot_id.to_string()))
    }
}

/// In-memory vehicle repository keyed on the normalized plate.
#[derive(Debug, Default)]
pub struct InMemoryVehicleStore {
    by_plate: Mutex<HashMap<String, Vehicle>>,
}

impl InMemoryVehicleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered vehicles.
    pub fn len(&self) -> usize {
        self.by_plate.lock().len()
    }

    /// Check if no vehicle was ever registered.
    pub fn is_empty(&self) -> bool {
        self.by_plate.lock().is_empty()
    }
}

impl VehicleStore for InMemoryVehicleStore {
    fn find_or_create(&self, plate: &str, class: VehicleClass, owner_contact: &str) -> Vehicle {
        let key = normalize_plate(plate);
        // entry() makes the lookup-or-insert a single atomic step; two
        // first-seen racers get the same record, not a uniqueness violation
        self.by_plate
            .lock()
            .entry(key)
            .or_insert_with(|| Vehicle::new(plate, class, owner_contact))
            .clone()
    }

    fn find_by_plate(&self, plate: &str) -> Option<Vehicle> {
        self.by_plate.lock().get(&normalize_plate(plate)).cloned()
    }
}

/// In-memory ticket repository with the one-ACTIVE-per-plate constraint.
#[derive(Debug, Default)]
pub struct InMemoryTicketStore {
    inner: Mutex<TicketTable>,
}

#[derive(Debug, Default)]
struct TicketTable {
    by_id: HashMap<String, Ticket>,
    /// plate → ticket id of the single ACTIVE ticket
    active_by_plate: HashMap<String, String>,
}

impl InMemoryTicketStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tickets ever created.
    pub fn len(&self) -> usize {
        self.inner.lock().by_id.len()
    }

    /// Check if no ticket was ever created.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().by_id.is_empty()
    }
}

impl TicketStore for InMemoryTicketStore {
    fn create_active(
        &self,
        vehicle: &Vehicle,
        slot: &Slot,
        entry_time: DateTime<Utc>,
    ) -> Result<Ticket, StoreError> {
        let mut table = self.inner.lock();
        // Uniqueness constraint on (plate, ACTIVE): checked and inserted
        // under the same lock, so two racing entries cannot both commit
        if table.active_by_plate.contains_key(vehicle.plate()) {
            return Err(StoreError::DuplicateActiveTicket {
                plate: vehicle.plate().to_string(),
            });
        }
        let ticket = Ticket::new(vehicle, slot, entry_time);
        table
            .active_by_plate
            .insert(vehicle.plate().to_string(), ticket.id().to_string());
        table.by_id.insert(ticket.id().to_string(), ticket.clone());
        Ok(ticket)
    }

    fn get(&self, ticket_id: &str) -> Result<Ticket, StoreError> {
        self.inner
            .lock()
            .by_id
            .get(ticket_id)
            .cloned()
            .ok_or_else(|| StoreError::TicketNotFound(ticket_id.to_string()))
    }

    fn find_active_by_plate(&self, plate: &str) -> Option<Ticket> {
        let table = self.inner.lock();
        let ticket_id = table.active_by_plate.get(&normalize_plate(plate))?;
        table.by_id.get(ticket_id).cloned()
    }

    fn complete(&self, ticket_id: &str, exit_time: DateTime<Utc>) -> Result<Ticket, StoreError> {
        let mut table = self.inner.lock();
        let ticket = table
            .by_id
            .get_mut(ticket_id)
            .ok_or_else(|| StoreError::TicketNotFound(ticket_id.to_string()))?;
        ticket.complete(exit_time)?;
        let ticket = ticket.clone();
        table.active_by_plate.remove(ticket.plate());
        Ok(ticket)
    }
}

/// In-memory pricing rule lookup.
#[derive(Debug, Default)]
pub struct InMemoryPricingRuleStore {
    rules: RwLock<HashMap<VehicleClass, PricingRule>>,
}

impl InMemoryPricingRuleStore {
    /// Create a store with no rules; defaults apply to every class.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the rule for its class.
    pub fn upsert(&self, rule: PricingRule) {
        self.rules.write().insert(rule.class(), rule);
    }
}

impl PricingRuleStore for InMemoryPricingRuleStore {
    fn rule_for(&self, class: VehicleClass) -> Option<PricingRule> {
        self.rules.read().get(&class).copied()
    }
}

/// In-memory payment records, one per ticket.
#[derive(Debug, Default)]
pub struct InMemoryPaymentStore {
    by_ticket: Mutex<HashMap<String, PaymentRecord>>,
}

impl InMemoryPaymentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tickets with a payment record.
    pub fn len(&self) -> usize {
        self.by_ticket.lock().len()
    }

    /// Check if no payment was ever initiated.
    pub fn is_empty(&self) -> bool {
        self.by_ticket.lock().is_empty()
    }
}

impl PaymentStore for InMemoryPaymentStore {
    fn initiate(&self, ticket_id: &str, amount: i64, at: DateTime<Utc>) -> PaymentRecord {
        let mut records = self.by_ticket.lock();
        match records.get_mut(ticket_id) {
            Some(record) => {
                record.reinitiate(amount, at);
                record.clone()
            }
            None => {
                let record = PaymentRecord::initiated(ticket_id, amount, at);
                records.insert(ticket_id.to_string(), record.clone());
                record
            }
        }
    }

    fn finish(
        &self,
        ticket_id: &str,
        status: PaymentStatus,
        at: DateTime<Utc>,
    ) -> Result<PaymentRecord, StoreError> {
        let mut records = self.by_ticket.lock();
        let record = records
            .get_mut(ticket_id)
            .ok_or_else(|| StoreError::PaymentNotFound(ticket_id.to_string()))?;
        record.finish(status, at);
        Ok(record.clone())
    }

    fn for_ticket(&self, ticket_id: &str) -> Option<PaymentRecord> {
        self.by_ticket.lock().get(ticket_id).cloned()
    }
}
