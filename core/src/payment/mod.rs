//! Payment gateway seam.
//!
//! The gateway is a black box: a charge either succeeds or fails, may be
//! slow, and must not be assumed idempotent. The engine never re-invokes
//! it automatically after a failure — retry is the caller's decision.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Outcome of one charge attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeOutcome {
    /// The gateway accepted the charge
    Success,
    /// The gateway declined the charge
    Failed,
}

/// External charge processor.
pub trait PaymentGateway: Send + Sync {
    /// Charge `amount` (i64 cents) against the ticket's payer.
    fn charge(&self, ticket_id: &str, amount: i64) -> ChargeOutcome;
}

/// Gateway stand-in with scriptable outcomes.
///
/// Approves everything by default; flip [`SimulatedGateway::set_approve`]
/// or script individual tickets with
/// [`SimulatedGateway::decline_ticket`] to exercise failure paths.
#[derive(Debug, Default)]
pub struct SimulatedGateway {
    decline_all: AtomicBool,
    declined_tickets: Mutex<HashSet<String>>,
}

impl SimulatedGateway {
    /// Gateway that approves every charge.
    pub fn approving() -> Self {
        Self::default()
    }

    /// Gateway that declines every charge.
    pub fn declining() -> Self {
        let gateway = Self::default();
        gateway.decline_all.store(true, Ordering::SeqCst);
        gateway
    }

    /// Switch between approving and declining all charges.
    pub fn set_approve(&self, approve: bool) {
        self.decline_all.store(!approve, Ordering::SeqCst);
    }

    /// Decline charges for one specific ticket.
    pub fn decline_ticket(&self, ticket_id: &str) {
        self.declined_tickets.lock().insert(ticket_id.to_string());
    }

    /// Stop declining charges for one specific ticket.
    pub fn clear_ticket(&self, ticket_id: &str) {
        self.declined_tickets.lock().remove(ticket_id);
    }
}

impl PaymentGateway for SimulatedGateway {
    fn charge(&self, ticket_id: &str, _amount: i64) -> ChargeOutcome {
        if self.decline_all.load(Ordering::SeqCst) {
            return ChargeOutcome::Failed;
        }
        if self.declined_tickets.lock().contains(ticket_id) {
            return ChargeOutcome::Failed;
        }
        ChargeOutcome::Success
    }
}
