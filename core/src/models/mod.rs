//! Domain models.
//!
//! CRITICAL: All money values are i64 (cents)

pub mod event;
pub mod payment;
pub mod pricing_rule;
pub mod slot;
pub mod ticket;
pub mod vehicle;

pub use event::{EventLog, ParkingEvent};
pub use payment::{PaymentRecord, PaymentStatus};
pub use pricing_rule::PricingRule;
pub use slot::{Slot, SlotError, SlotStatus};
pub use ticket::{Ticket, TicketError, TicketStatus};
pub use vehicle::{normalize_plate, Vehicle, VehicleClass};
