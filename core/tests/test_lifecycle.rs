//! Tests for the ticket lifecycle engine

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_core_rs::{
    ChargeOutcome, EngineConfig, EntryRequest, InMemoryPaymentStore, InMemoryPricingRuleStore,
    InMemorySlotStore, InMemoryTicketStore, InMemoryVehicleStore, ManualClock, ParkingEngine,
    ParkingError, PaymentStatus, SimulatedGateway, Slot, SlotStore, StoreError, Ticket,
    TicketStore, Vehicle, VehicleClass,
};

const LOT: u64 = 1;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 2, 7, 30, 0).unwrap()
}

struct Harness {
    engine: ParkingEngine,
    slots: Arc<InMemorySlotStore>,
    vehicles: Arc<InMemoryVehicleStore>,
    tickets: Arc<InMemoryTicketStore>,
    clock: Arc<ManualClock>,
    gateway: Arc<SimulatedGateway>,
}

fn harness(slot_specs: &[(i32, u32, VehicleClass)]) -> Harness {
    let slots = Arc::new(InMemorySlotStore::new());
    slots.register_lot(LOT);
    for &(floor, number, class) in slot_specs {
        slots.insert_slot(Slot::new(LOT, floor, number, class)).unwrap();
    }
    let vehicles = Arc::new(InMemoryVehicleStore::new());
    let tickets = Arc::new(InMemoryTicketStore::new());
    let clock = Arc::new(ManualClock::starting_at(t0()));
    let gateway = Arc::new(SimulatedGateway::approving());

    let engine = ParkingEngine::new(
        EngineConfig::default(),
        Arc::clone(&slots) as Arc<dyn SlotStore>,
        Arc::clone(&vehicles) as Arc<dyn parking_core_rs::VehicleStore>,
        Arc::clone(&tickets) as Arc<dyn TicketStore>,
        Arc::new(InMemoryPaymentStore::new()),
        Arc::new(InMemoryPricingRuleStore::new()),
        Arc::clone(&gateway) as Arc<dyn parking_core_rs::PaymentGateway>,
        Arc::clone(&clock) as Arc<dyn parking_core_rs::Clock>,
    );

    Harness {
        engine,
        slots,
        vehicles,
        tickets,
        clock,
        gateway,
    }
}

fn car_request(plate: &str) -> EntryRequest {
    EntryRequest {
        plate: plate.to_string(),
        class: VehicleClass::Car,
        owner_contact: "owner@example.com".to_string(),
        lot_id: LOT,
        gate_id: 1,
        gate_floor: 0,
    }
}

#[test]
fn test_enter_creates_active_ticket_on_reserved_slot() {
    let h = harness(&[(0, 1, VehicleClass::Car)]);

    let entry = h.engine.enter(&car_request(" ka-01-hh-1234 ")).unwrap();

    assert_eq!(entry.plate, "KA-01-HH-1234");
    assert_eq!(entry.floor, 0);
    assert_eq!(entry.number, 1);
    assert_eq!(entry.entry_time, t0());
    assert_eq!(h.slots.occupied_count(), 1);

    let receipt = h.engine.receipt(&entry.ticket_id).unwrap();
    assert_eq!(receipt.slot_id, entry.slot_id);
    assert_eq!(receipt.exit_time, None);
    assert_eq!(receipt.amount, 0);
}

#[test]
fn test_duplicate_plate_rejected_case_insensitively() {
    let h = harness(&[(0, 1, VehicleClass::Car), (0, 2, VehicleClass::Car)]);

    h.engine.enter(&car_request("KA-01")).unwrap();
    let second = h.engine.enter(&car_request(" ka-01 "));

    assert_eq!(
        second.unwrap_err(),
        ParkingError::AlreadyParked {
            plate: "KA-01".to_string()
        }
    );
    assert_eq!(h.slots.occupied_count(), 1);
}

#[test]
fn test_full_lot_signals_no_capacity() {
    let h = harness(&[(0, 1, VehicleClass::Car)]);

    h.engine.enter(&car_request("KA-01")).unwrap();
    let second = h.engine.enter(&car_request("KA-02"));

    assert_eq!(
        second.unwrap_err(),
        ParkingError::NoCapacity {
            lot_id: LOT,
            class: VehicleClass::Car
        }
    );
}

#[test]
fn test_class_mismatch_signals_no_capacity() {
    let h = harness(&[(0, 1, VehicleClass::Car)]);

    let mut request = car_request("KA-77");
    request.class = VehicleClass::Truck;

    assert_eq!(
        h.engine.enter(&request).unwrap_err(),
        ParkingError::NoCapacity {
            lot_id: LOT,
            class: VehicleClass::Truck
        }
    );
}

#[test]
fn test_unknown_lot_signals_not_found() {
    let h = harness(&[(0, 1, VehicleClass::Car)]);

    let mut request = car_request("KA-01");
    request.lot_id = 42;

    assert_eq!(h.engine.enter(&request).unwrap_err(), ParkingError::LotNotFound(42));
}

#[test]
fn test_preview_receipt_and_charge_agree() {
    let h = harness(&[(0, 1, VehicleClass::Car)]);
    let entry = h.engine.enter(&car_request("KA-01")).unwrap();

    h.clock.advance(Duration::minutes(121));

    let preview = h.engine.preview_amount(&entry.ticket_id).unwrap();
    assert_eq!(preview, 2_000);
    assert_eq!(h.engine.receipt(&entry.ticket_id).unwrap().amount, preview);

    let exit = h.engine.pay_and_exit(&entry.ticket_id).unwrap();
    assert_eq!(exit.outcome, ChargeOutcome::Success);
    assert_eq!(exit.amount, 2_000);

    // The receipt is frozen at the authoritative exit time
    h.clock.advance(Duration::hours(6));
    let receipt = h.engine.receipt(&entry.ticket_id).unwrap();
    assert_eq!(receipt.amount, 2_000);
    assert_eq!(receipt.exit_time, Some(t0() + Duration::minutes(121)));

    let record = h.engine.payment_for(&entry.ticket_id).unwrap();
    assert_eq!(record.status(), PaymentStatus::Success);
    assert_eq!(record.amount(), 2_000);
}

#[test]
fn test_exit_releases_slot_for_next_vehicle() {
    let h = harness(&[(0, 1, VehicleClass::Car)]);
    let entry = h.engine.enter(&car_request("KA-01")).unwrap();

    h.engine.pay_and_exit(&entry.ticket_id).unwrap();
    assert_eq!(h.slots.occupied_count(), 0);

    let next = h.engine.enter(&car_request("KA-02")).unwrap();
    assert_eq!(next.slot_id, entry.slot_id);
}

#[test]
fn test_second_exit_is_rejected_without_double_effects() {
    let h = harness(&[(0, 1, VehicleClass::Car)]);
    let entry = h.engine.enter(&car_request("KA-01")).unwrap();

    h.engine.pay_and_exit(&entry.ticket_id).unwrap();
    let again = h.engine.pay_and_exit(&entry.ticket_id);

    assert_eq!(
        again.unwrap_err(),
        ParkingError::TicketNotActive(entry.ticket_id.clone())
    );
    // occupy + release exactly once
    let slot = h.slots.get(&entry.slot_id).unwrap();
    assert!(slot.is_available());
    assert_eq!(slot.version(), 2);
}

#[test]
fn test_declined_payment_leaves_ticket_retryable() {
    let h = harness(&[(0, 1, VehicleClass::Car)]);
    let entry = h.engine.enter(&car_request("KA-01")).unwrap();
    h.clock.advance(Duration::minutes(121));

    h.gateway.set_approve(false);
    let failed = h.engine.pay_and_exit(&entry.ticket_id).unwrap();

    assert_eq!(failed.outcome, ChargeOutcome::Failed);
    // The caller still learns the amount due
    assert_eq!(failed.amount, 2_000);
    // Ticket stays ACTIVE and the slot stays held
    assert!(h.tickets.find_active_by_plate("KA-01").is_some());
    assert_eq!(h.slots.occupied_count(), 1);
    assert_eq!(
        h.engine.payment_for(&entry.ticket_id).unwrap().status(),
        PaymentStatus::Failed
    );

    // Retry after another hour: the fee is recomputed for the longer stay
    h.gateway.set_approve(true);
    h.clock.advance(Duration::minutes(60));
    let retried = h.engine.pay_and_exit(&entry.ticket_id).unwrap();

    assert_eq!(retried.outcome, ChargeOutcome::Success);
    assert_eq!(retried.amount, 4_000);
    assert_eq!(h.slots.occupied_count(), 0);

    // One payment record per ticket, upserted across the retry
    let record = h.engine.payment_for(&entry.ticket_id).unwrap();
    assert_eq!(record.status(), PaymentStatus::Success);
    assert_eq!(record.amount(), 4_000);
}

#[test]
fn test_vehicle_record_reused_across_stays() {
    let h = harness(&[(0, 1, VehicleClass::Car)]);

    let first = h.engine.enter(&car_request("KA-01")).unwrap();
    h.engine.pay_and_exit(&first.ticket_id).unwrap();
    let second = h.engine.enter(&car_request("ka-01")).unwrap();

    assert_ne!(first.ticket_id, second.ticket_id);
    assert_eq!(h.vehicles.len(), 1);
}

#[test]
fn test_unknown_ticket_is_not_found_everywhere() {
    let h = harness(&[(0, 1, VehicleClass::Car)]);

    let missing = "no-such-ticket";
    assert_eq!(
        h.engine.preview_amount(missing).unwrap_err(),
        ParkingError::TicketNotFound(missing.to_string())
    );
    assert_eq!(
        h.engine.pay_and_exit(missing).unwrap_err(),
        ParkingError::TicketNotFound(missing.to_string())
    );
    assert_eq!(
        h.engine.receipt(missing).unwrap_err(),
        ParkingError::TicketNotFound(missing.to_string())
    );
}

#[test]
fn test_event_log_carries_the_audit_trail() {
    let h = harness(&[(0, 1, VehicleClass::Car)]);
    let entry = h.engine.enter(&car_request("KA-01")).unwrap();

    h.gateway.set_approve(false);
    h.engine.pay_and_exit(&entry.ticket_id).unwrap();
    h.gateway.set_approve(true);
    h.engine.pay_and_exit(&entry.ticket_id).unwrap();

    let events = h.engine.events();
    let types: Vec<&str> = events.iter().map(|e| e.event_type()).collect();
    assert_eq!(
        types,
        vec!["vehicle_entered", "payment_failed", "payment_succeeded", "slot_released"]
    );
    assert!(events.iter().all(|e| e.ticket_id() == entry.ticket_id));
}

/// Ticket store that fails the next `create_active`, simulating the
/// losing side of a same-plate race committing after the advisory check.
struct FailNextCreate {
    inner: InMemoryTicketStore,
    fail_next: AtomicBool,
}

impl FailNextCreate {
    fn new() -> Self {
        Self {
            inner: InMemoryTicketStore::new(),
            fail_next: AtomicBool::new(true),
        }
    }
}

impl TicketStore for FailNextCreate {
    fn create_active(
        &self,
        vehicle: &Vehicle,
        slot: &Slot,
        entry_time: DateTime<Utc>,
    ) -> Result<Ticket, StoreError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(StoreError::DuplicateActiveTicket {
                plate: vehicle.plate().to_string(),
            });
        }
        self.inner.create_active(vehicle, slot, entry_time)
    }

    fn get(&self, ticket_id: &str) -> Result<Ticket, StoreError> {
        self.inner.get(ticket_id)
    }

    fn find_active_by_plate(&self, plate: &str) -> Option<Ticket> {
        self.inner.find_active_by_plate(plate)
    }

    fn complete(&self, ticket_id: &str, exit_time: DateTime<Utc>) -> Result<Ticket, StoreError> {
        self.inner.complete(ticket_id, exit_time)
    }
}

#[test]
fn test_failed_ticket_creation_rolls_back_reservation() {
    let slots = Arc::new(InMemorySlotStore::new());
    slots.register_lot(LOT);
    slots.insert_slot(Slot::new(LOT, 0, 1, VehicleClass::Car)).unwrap();

    let engine = ParkingEngine::new(
        EngineConfig::default(),
        Arc::clone(&slots) as Arc<dyn SlotStore>,
        Arc::new(InMemoryVehicleStore::new()),
        Arc::new(FailNextCreate::new()),
        Arc::new(InMemoryPaymentStore::new()),
        Arc::new(InMemoryPricingRuleStore::new()),
        Arc::new(SimulatedGateway::approving()),
        Arc::new(ManualClock::starting_at(t0())),
    );

    let failed = engine.enter(&car_request("KA-01"));
    assert_eq!(
        failed.unwrap_err(),
        ParkingError::AlreadyParked {
            plate: "KA-01".to_string()
        }
    );
    // The reservation was rolled back, not leaked
    assert_eq!(slots.occupied_count(), 0);

    // The slot is observable again by a subsequent successful entry
    let entry = engine.enter(&car_request("KA-02")).unwrap();
    assert_eq!(entry.number, 1);
    assert_eq!(slots.occupied_count(), 1);
}
