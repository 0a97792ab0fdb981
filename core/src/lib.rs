//! Parking Core - Slot Allocation Engine
//!
//! Concurrency-safe allocation of a shared pool of parking slots, with
//! ticket lifecycle tracking and time-based fee calculation.
//!
//! # Architecture
//!
//! - **core**: Clock abstraction (wall-clock and test-controllable time)
//! - **models**: Domain types (Vehicle, Slot, Ticket, PricingRule, Payment)
//! - **store**: Repository contracts and thread-safe in-memory backends
//! - **allocation**: Pluggable slot-selection strategies and the
//!   reservation protocol
//! - **pricing**: Tiered fee calculation from elapsed time
//! - **payment**: Payment gateway seam
//! - **engine**: Ticket lifecycle orchestration (enter, preview, pay+exit)
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (cents)
//! 2. A slot is handed to at most one vehicle at a time: every
//!    AVAILABLE→OCCUPIED transition is an atomic conditional update
//! 3. At most one ACTIVE ticket exists per plate
//! 4. A slot is released only after its ticket is durably PAID

// Module declarations
pub mod allocation;
pub mod core;
pub mod engine;
pub mod models;
pub mod payment;
pub mod pricing;
pub mod store;

// Re-exports for convenience
pub use crate::core::clock::{Clock, ManualClock, SystemClock};
pub use allocation::{build_strategy, AllocationStrategy, LevelWiseStrategy, NearestToGateStrategy, StrategyConfig};
pub use engine::{
    EngineConfig, EntryRequest, EntryResponse, ExitResponse, ParkingEngine, ParkingError, Receipt,
};
pub use models::{
    event::{EventLog, ParkingEvent},
    payment::{PaymentRecord, PaymentStatus},
    pricing_rule::PricingRule,
    slot::{Slot, SlotError, SlotStatus},
    ticket::{Ticket, TicketError, TicketStatus},
    vehicle::{normalize_plate, Vehicle, VehicleClass},
};
pub use payment::{ChargeOutcome, PaymentGateway, SimulatedGateway};
pub use pricing::{billable_amount, DefaultRates, PricingEngine};
pub use store::{
    memory::{
        InMemoryPaymentStore, InMemoryPricingRuleStore, InMemorySlotStore, InMemoryTicketStore,
        InMemoryVehicleStore,
    },
    PaymentStore, PricingRuleStore, SlotStore, StoreError, TicketStore, VehicleStore,
};
