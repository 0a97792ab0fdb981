//! Tests for the allocation strategies and the reservation protocol

use std::sync::Arc;

use parking_core_rs::{
    build_strategy, AllocationStrategy, InMemorySlotStore, LevelWiseStrategy,
    NearestToGateStrategy, Slot, SlotStore, StoreError, StrategyConfig, VehicleClass,
};

const LOT: u64 = 1;
const GATE: u64 = 10;

/// Store with one car slot per floor, numbered in insertion order.
fn store_with_floors(floors: &[i32]) -> (Arc<InMemorySlotStore>, Vec<String>) {
    let store = Arc::new(InMemorySlotStore::new());
    store.register_lot(LOT);
    let mut slot_ids = Vec::new();
    for (i, &floor) in floors.iter().enumerate() {
        let slot = Slot::new(LOT, floor, (i + 1) as u32, VehicleClass::Car);
        slot_ids.push(slot.id().to_string());
        store.insert_slot(slot).unwrap();
    }
    (store, slot_ids)
}

/// Drain the lot through the strategy, returning floors in the order
/// slots were handed out.
fn drain_floors(strategy: &dyn AllocationStrategy, gate_floor: i32) -> Vec<i32> {
    let mut floors = Vec::new();
    while let Some(slot) = strategy.allocate(LOT, GATE, gate_floor, VehicleClass::Car).unwrap() {
        floors.push(slot.floor());
    }
    floors
}

#[test]
fn test_nearest_orders_by_gate_distance() {
    let (store, _) = store_with_floors(&[0, 1, 2, 5]);
    let strategy = NearestToGateStrategy::new(store);

    assert_eq!(drain_floors(&strategy, 2), vec![2, 1, 0, 5]);
}

#[test]
fn test_nearest_breaks_distance_ties_by_floor() {
    // Floors 0 and 2 are both one floor away from gate floor 1
    let (store, _) = store_with_floors(&[2, 0]);
    let strategy = NearestToGateStrategy::new(store);

    assert_eq!(drain_floors(&strategy, 1), vec![0, 2]);
}

#[test]
fn test_nearest_breaks_floor_ties_by_number() {
    let store = Arc::new(InMemorySlotStore::new());
    store.register_lot(LOT);
    let high = Slot::new(LOT, 0, 7, VehicleClass::Car);
    let low = Slot::new(LOT, 0, 3, VehicleClass::Car);
    store.insert_slot(high).unwrap();
    store.insert_slot(low).unwrap();

    let strategy = NearestToGateStrategy::new(store);
    let first = strategy.allocate(LOT, GATE, 0, VehicleClass::Car).unwrap().unwrap();
    assert_eq!(first.number(), 3);
}

#[test]
fn test_level_wise_ignores_gate_floor() {
    let (store, _) = store_with_floors(&[2, 0, 1]);
    let strategy = LevelWiseStrategy::new(store);

    // Gate is on floor 2; selection order is still bottom-up
    assert_eq!(drain_floors(&strategy, 2), vec![0, 1, 2]);
}

#[test]
fn test_allocate_filters_by_class() {
    let store = Arc::new(InMemorySlotStore::new());
    store.register_lot(LOT);
    store.insert_slot(Slot::new(LOT, 0, 1, VehicleClass::Bike)).unwrap();
    let car_slot = Slot::new(LOT, 3, 1, VehicleClass::Car);
    let car_slot_id = car_slot.id().to_string();
    store.insert_slot(car_slot).unwrap();

    let strategy = NearestToGateStrategy::new(Arc::clone(&store) as Arc<dyn SlotStore>);

    let allocated = strategy.allocate(LOT, GATE, 0, VehicleClass::Car).unwrap().unwrap();
    assert_eq!(allocated.id(), car_slot_id);

    // No truck slot exists: a normal negative result, not an error
    assert_eq!(strategy.allocate(LOT, GATE, 0, VehicleClass::Truck).unwrap(), None);
}

#[test]
fn test_exhausted_lot_returns_none() {
    let (store, _) = store_with_floors(&[0]);
    let strategy = NearestToGateStrategy::new(store);

    assert!(strategy.allocate(LOT, GATE, 0, VehicleClass::Car).unwrap().is_some());
    assert_eq!(strategy.allocate(LOT, GATE, 0, VehicleClass::Car).unwrap(), None);
}

#[test]
fn test_unknown_lot_is_not_found() {
    let (store, _) = store_with_floors(&[0]);
    let strategy = NearestToGateStrategy::new(store);

    assert_eq!(
        strategy.allocate(99, GATE, 0, VehicleClass::Car).unwrap_err(),
        StoreError::LotNotFound(99)
    );
}

#[test]
fn test_lost_race_advances_to_next_candidate() {
    let (store, slot_ids) = store_with_floors(&[0, 1]);
    let strategy = NearestToGateStrategy::new(Arc::clone(&store) as Arc<dyn SlotStore>);

    // A concurrent caller takes the best candidate between this caller's
    // snapshot and its reservation attempt
    store.try_occupy(&slot_ids[0]).unwrap().unwrap();

    let allocated = strategy.allocate(LOT, GATE, 0, VehicleClass::Car).unwrap().unwrap();
    assert_eq!(allocated.id(), slot_ids[1]);
    assert_eq!(allocated.floor(), 1);
}

#[test]
fn test_free_returns_slot_to_pool() {
    let (store, _) = store_with_floors(&[0]);
    let strategy = NearestToGateStrategy::new(Arc::clone(&store) as Arc<dyn SlotStore>);

    let slot = strategy.allocate(LOT, GATE, 0, VehicleClass::Car).unwrap().unwrap();
    assert_eq!(slot.version(), 1);

    strategy.free(&slot).unwrap();

    let again = strategy.allocate(LOT, GATE, 0, VehicleClass::Car).unwrap().unwrap();
    assert_eq!(again.id(), slot.id());
    // occupy, release, occupy
    assert_eq!(again.version(), 3);
}

#[test]
fn test_factory_builds_configured_variant() {
    let (store, _) = store_with_floors(&[2, 0]);

    let level_wise = build_strategy(StrategyConfig::LevelWise, Arc::clone(&store) as Arc<dyn SlotStore>);
    let first = level_wise.allocate(LOT, GATE, 2, VehicleClass::Car).unwrap().unwrap();

    // Nearest-to-gate would have picked floor 2 here
    assert_eq!(first.floor(), 0);
}

#[test]
fn test_factory_fallback_name_selects_default() {
    let (store, _) = store_with_floors(&[2, 0]);

    let config = StrategyConfig::from_name("no_such_strategy");
    let strategy = build_strategy(config, Arc::clone(&store) as Arc<dyn SlotStore>);
    let first = strategy.allocate(LOT, GATE, 2, VehicleClass::Car).unwrap().unwrap();

    // Default is nearest-to-gate
    assert_eq!(first.floor(), 2);
}
