//! Fee calculation from elapsed time and tiered pricing rules.
//!
//! The computation is stateless: (vehicle class, elapsed duration, rule)
//! maps to an amount in i64 cents.
//!
//! - Elapsed minutes clamp at zero, so inverted entry/exit clocks from
//!   caller error never produce a negative fee.
//! - Billable minutes are elapsed minutes past the rule's free threshold.
//! - Partial hours always round up to the next whole hour; zero billable
//!   minutes yield a zero amount.
//! - The final multiplication `billable_hours × rate_per_hour` happens in
//!   integer cents and is exact — cents are the fixed 2-decimal monetary
//!   representation, and no fractional intermediate ever exists.
//!
//! CRITICAL: All money values are i64 (cents)

use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::models::pricing_rule::PricingRule;
use crate::models::vehicle::VehicleClass;
use crate::store::PricingRuleStore;

/// Built-in rates applied when no rule is configured for a class.
///
/// These are configuration constants, not duplicated business logic; the
/// shipped values match the reference deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultRates {
    /// Free minutes granted to every class
    pub free_minutes: i64,
    /// Default hourly rate for bikes (i64 cents)
    pub bike_rate_per_hour: i64,
    /// Default hourly rate for cars (i64 cents)
    pub car_rate_per_hour: i64,
    /// Default hourly rate for trucks (i64 cents)
    pub truck_rate_per_hour: i64,
}

impl Default for DefaultRates {
    fn default() -> Self {
        Self {
            free_minutes: 120,
            bike_rate_per_hour: 1_000,
            car_rate_per_hour: 2_000,
            truck_rate_per_hour: 4_000,
        }
    }
}

impl DefaultRates {
    /// The default rule for a class.
    pub fn rule_for(&self, class: VehicleClass) -> PricingRule {
        let rate = match class {
            VehicleClass::Bike => self.bike_rate_per_hour,
            VehicleClass::Car => self.car_rate_per_hour,
            VehicleClass::Truck => self.truck_rate_per_hour,
        };
        PricingRule::new(class, self.free_minutes, rate)
    }
}

/// Compute the fee for a stay under one rule.
///
/// # Example
/// ```
/// use chrono::Duration;
/// use parking_core_rs::{billable_amount, PricingRule, VehicleClass};
///
/// let rule = PricingRule::new(VehicleClass::Car, 120, 2_000);
///
/// // 121 minutes: one minute past the free window, one billable hour
/// assert_eq!(billable_amount(&rule, Duration::minutes(121)), 2_000);
/// // Inside the free window: nothing due
/// assert_eq!(billable_amount(&rule, Duration::minutes(119)), 0);
/// ```
pub fn billable_amount(rule: &PricingRule, elapsed: Duration) -> i64 {
    let elapsed_minutes = elapsed.num_minutes().max(0);
    let billable_minutes = (elapsed_minutes - rule.free_minutes()).max(0);
    let billable_hours = (billable_minutes + 59) / 60;
    billable_hours * rule.rate_per_hour()
}

/// Rule lookup plus fee computation.
pub struct PricingEngine {
    rules: Arc<dyn PricingRuleStore>,
    defaults: DefaultRates,
}

impl PricingEngine {
    /// Create the engine over a rule store with default-rate fallback.
    pub fn new(rules: Arc<dyn PricingRuleStore>, defaults: DefaultRates) -> Self {
        Self { rules, defaults }
    }

    /// Amount due for a stay of `elapsed` by a vehicle of `class`.
    pub fn amount_due(&self, class: VehicleClass, elapsed: Duration) -> i64 {
        let rule = self
            .rules
            .rule_for(class)
            .unwrap_or_else(|| self.defaults.rule_for(class));
        billable_amount(&rule, elapsed)
    }
}
