//! Nearest-to-gate allocation.

use std::sync::Arc;

use crate::allocation::{reserve_in_order, AllocationStrategy};
use crate::models::slot::Slot;
use crate::models::vehicle::VehicleClass;
use crate::store::{SlotStore, StoreError};

/// Offers the AVAILABLE slot closest to the entry gate's floor.
///
/// Candidates are ordered by `|floor − gate_floor|` ascending, ties broken
/// by floor ascending, then number ascending, which makes the selection
/// order deterministic for a given snapshot.
pub struct NearestToGateStrategy {
    slots: Arc<dyn SlotStore>,
}

impl NearestToGateStrategy {
    /// Create the strategy over a slot store.
    pub fn new(slots: Arc<dyn SlotStore>) -> Self {
        Self { slots }
    }
}

impl AllocationStrategy for NearestToGateStrategy {
    fn allocate(
        &self,
        lot_id: u64,
        _gate_id: u64,
        gate_floor: i32,
        class: VehicleClass,
    ) -> Result<Option<Slot>, StoreError> {
        let mut candidates = self.slots.available_slots(lot_id, class)?;
        candidates.sort_by_key(|s| ((s.floor() - gate_floor).abs(), s.floor(), s.number()));
        reserve_in_order(self.slots.as_ref(), candidates)
    }

    fn free(&self, slot: &Slot) -> Result<(), StoreError> {
        self.slots.release(slot.id())?;
        Ok(())
    }
}
