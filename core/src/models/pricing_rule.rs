//! Pricing rule model
//!
//! One rule per vehicle class: a free-minutes threshold and an hourly
//! rate. Rules are read-only from this core's perspective; when no rule
//! is configured for a class, the engine falls back to the built-in
//! defaults in [`crate::pricing::DefaultRates`].
//!
//! CRITICAL: All money values are i64 (cents)

use serde::{Deserialize, Serialize};

use crate::models::vehicle::VehicleClass;

/// Tiered pricing for one vehicle class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRule {
    /// Vehicle class this rule applies to
    class: VehicleClass,

    /// Minutes of free parking before billing starts
    free_minutes: i64,

    /// Rate per billable hour (i64 cents)
    rate_per_hour: i64,
}

impl PricingRule {
    /// Create a rule.
    ///
    /// # Panics
    /// Panics if `free_minutes` or `rate_per_hour` is negative.
    pub fn new(class: VehicleClass, free_minutes: i64, rate_per_hour: i64) -> Self {
        assert!(free_minutes >= 0, "free_minutes must not be negative");
        assert!(rate_per_hour >= 0, "rate_per_hour must not be negative");
        Self {
            class,
            free_minutes,
            rate_per_hour,
        }
    }

    /// Get the vehicle class
    pub fn class(&self) -> VehicleClass {
        self.class
    }

    /// Get the free-minutes threshold
    pub fn free_minutes(&self) -> i64 {
        self.free_minutes
    }

    /// Get the hourly rate (i64 cents)
    pub fn rate_per_hour(&self) -> i64 {
        self.rate_per_hour
    }
}
