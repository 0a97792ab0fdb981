//! Level-wise allocation.

use std::sync::Arc;

use crate::allocation::{reserve_in_order, AllocationStrategy};
use crate::models::slot::Slot;
use crate::models::vehicle::VehicleClass;
use crate::store::{SlotStore, StoreError};

/// Fills the lot floor by floor from the bottom up.
///
/// Candidates are ordered by floor ascending, then number ascending; the
/// gate plays no part in the ordering.
pub struct LevelWiseStrategy {
    slots: Arc<dyn SlotStore>,
}

impl LevelWiseStrategy {
    /// Create the strategy over a slot store.
    pub fn new(slots: Arc<dyn SlotStore>) -> Self {
        Self { slots }
    }
}

impl AllocationStrategy for LevelWiseStrategy {
    fn allocate(
        &self,
        lot_id: u64,
        _gate_id: u64,
        _gate_floor: i32,
        class: VehicleClass,
    ) -> Result<Option<Slot>, StoreError> {
        let mut candidates = self.slots.available_slots(lot_id, class)?;
        candidates.sort_by_key(|s| (s.floor(), s.number()));
        reserve_in_order(self.slots.as_ref(), candidates)
    }

    fn free(&self, slot: &Slot) -> Result<(), StoreError> {
        self.slots.release(slot.id())?;
        Ok(())
    }
}
