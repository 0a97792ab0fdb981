//! Payment record model
//!
//! Exactly one payment record exists per ticket. Re-initiating payment on
//! a ticket (after a declined charge) resets the same record instead of
//! creating a duplicate.
//!
//! CRITICAL: All money values are i64 (cents)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payment record status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Charge handed to the gateway, outcome unknown
    Initiated,
    /// Gateway confirmed the charge
    Success,
    /// Gateway declined the charge
    Failed,
}

/// The single payment record attached to a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Linked ticket
    ticket_id: String,

    /// Charged amount (i64 cents)
    amount: i64,

    /// Current status
    status: PaymentStatus,

    /// When the record last changed
    timestamp: DateTime<Utc>,
}

impl PaymentRecord {
    /// Create a fresh INITIATED record.
    pub fn initiated(ticket_id: &str, amount: i64, at: DateTime<Utc>) -> Self {
        Self {
            ticket_id: ticket_id.to_string(),
            amount,
            status: PaymentStatus::Initiated,
            timestamp: at,
        }
    }

    /// Get the linked ticket ID
    pub fn ticket_id(&self) -> &str {
        &self.ticket_id
    }

    /// Get the charged amount (i64 cents)
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Get current status
    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    /// Get the last-change timestamp
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Reset the record for a retried charge.
    pub(crate) fn reinitiate(&mut self, amount: i64, at: DateTime<Utc>) {
        self.amount = amount;
        self.status = PaymentStatus::Initiated;
        self.timestamp = at;
    }

    /// Record the gateway outcome.
    pub(crate) fn finish(&mut self, status: PaymentStatus, at: DateTime<Utc>) {
        self.status = status;
        self.timestamp = at;
    }
}
