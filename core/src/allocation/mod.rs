//! Slot allocation strategies.
//!
//! A strategy decides which AVAILABLE slot is offered next. Two
//! interchangeable variants implement one contract:
//!
//! 1. **Nearest-to-gate** ([`NearestToGateStrategy`]): slots closest to
//!    the entry gate's floor first.
//! 2. **Level-wise** ([`LevelWiseStrategy`]): lowest floors first,
//!    ignoring the gate.
//!
//! Selection is not reservation. Between reading AVAILABLE and committing
//! occupancy another caller may win the slot, so every candidate is taken
//! through [`SlotStore::try_occupy`] — an atomic conditional transition.
//! A lost race moves on to the next candidate in the same ordered
//! snapshot; the scan never re-queries, and an exhausted list is a normal
//! "no capacity" result, not an error. No lock is held across the scan.
//!
//! The active variant is chosen once at startup via [`StrategyConfig`];
//! behavior is identical across variants except for selection order.

mod level_wise;
mod nearest;

pub use level_wise::LevelWiseStrategy;
pub use nearest::NearestToGateStrategy;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::slot::Slot;
use crate::models::vehicle::VehicleClass;
use crate::store::{SlotStore, StoreError};

/// Pure selection + reservation contract implemented by every strategy.
pub trait AllocationStrategy: Send + Sync {
    /// Reserve one slot for `class` in `lot_id`, or `Ok(None)` when no
    /// slot could be secured (no capacity).
    fn allocate(
        &self,
        lot_id: u64,
        gate_id: u64,
        gate_floor: i32,
        class: VehicleClass,
    ) -> Result<Option<Slot>, StoreError>;

    /// Return a held slot to AVAILABLE.
    fn free(&self, slot: &Slot) -> Result<(), StoreError>;
}

/// Strategy selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Order by |floor − gate floor|, then floor, then number
    NearestToGate,
    /// Order by floor, then number
    LevelWise,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::NearestToGate
    }
}

impl StrategyConfig {
    /// Map a configured strategy name, falling back to the default
    /// variant (nearest-to-gate) for unknown names.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "nearest_to_gate" | "nearest" => StrategyConfig::NearestToGate,
            "level_wise" | "levelwise" => StrategyConfig::LevelWise,
            other => {
                tracing::warn!(
                    strategy = other,
                    "unknown allocation strategy name, falling back to nearest_to_gate"
                );
                StrategyConfig::default()
            }
        }
    }
}

/// Build the configured strategy over a slot store.
pub fn build_strategy(
    config: StrategyConfig,
    slots: Arc<dyn SlotStore>,
) -> Box<dyn AllocationStrategy> {
    match config {
        StrategyConfig::NearestToGate => Box::new(NearestToGateStrategy::new(slots)),
        StrategyConfig::LevelWise => Box::new(LevelWiseStrategy::new(slots)),
    }
}

/// Walk an ordered candidate list, reserving the first slot whose
/// conditional transition succeeds.
pub(crate) fn reserve_in_order(
    slots: &dyn SlotStore,
    candidates: Vec<Slot>,
) -> Result<Option<Slot>, StoreError> {
    for candidate in candidates {
        match slots.try_occupy(candidate.id())? {
            Some(reserved) => return Ok(Some(reserved)),
            None => {
                // Lost the race for this candidate; try the next one
                tracing::debug!(slot_id = candidate.id(), "slot taken concurrently, trying next candidate");
            }
        }
    }
    Ok(None)
}
