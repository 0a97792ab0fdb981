//! Vehicle model
//!
//! A vehicle is identified by its license plate. Plates are compared in
//! normalized form (trimmed, ASCII-uppercased) so `" ka-01 "` and `"KA-01"`
//! name the same vehicle. Vehicles are created lazily on first entry and
//! never deleted by this core.

use serde::{Deserialize, Serialize};

/// Vehicle class, which determines slot compatibility and pricing tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleClass {
    /// Two-wheeler
    Bike,
    /// Four-wheeler
    Car,
    /// Heavy vehicle
    Truck,
}

/// Normalize a license plate for identity comparison.
///
/// # Example
/// ```
/// use parking_core_rs::normalize_plate;
///
/// assert_eq!(normalize_plate("  ka-01-hh-1234 "), "KA-01-HH-1234");
/// ```
pub fn normalize_plate(plate: &str) -> String {
    plate.trim().to_ascii_uppercase()
}

/// A registered vehicle.
///
/// Immutable once created except for the owner contact, which is mutated
/// by an out-of-scope admin flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Unique vehicle identifier (UUID)
    id: String,

    /// Normalized license plate (unique)
    plate: String,

    /// Vehicle class
    class: VehicleClass,

    /// Owner contact (e.g. email)
    owner_contact: String,
}

impl Vehicle {
    /// Create a new vehicle. The plate is normalized on construction.
    pub fn new(plate: &str, class: VehicleClass, owner_contact: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            plate: normalize_plate(plate),
            class,
            owner_contact: owner_contact.to_string(),
        }
    }

    /// Get vehicle ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the normalized plate
    pub fn plate(&self) -> &str {
        &self.plate
    }

    /// Get vehicle class
    pub fn class(&self) -> VehicleClass {
        self.class
    }

    /// Get owner contact
    pub fn owner_contact(&self) -> &str {
        &self.owner_contact
    }
}
