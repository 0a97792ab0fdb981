//! Ticket lifecycle orchestration.
//!
//! See `lifecycle.rs` for the full implementation.

pub mod lifecycle;

// Re-export main types for convenience
pub use lifecycle::{
    EngineConfig, EntryRequest, EntryResponse, ExitResponse, ParkingEngine, ParkingError, Receipt,
};
