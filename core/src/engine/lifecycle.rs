//! Ticket lifecycle engine.
//!
//! Orchestrates vehicle lookup, slot allocation, ticket creation, fee
//! calculation, payment, and slot release. Each operation is one logical
//! transaction:
//!
//! - `enter` either produces an ACTIVE ticket bound to a reserved slot or
//!   leaves no trace — a reservation whose ticket cannot be created is
//!   rolled back, so no slot stays OCCUPIED without a ticket.
//! - `pay_and_exit` fixes the authoritative exit time before charging,
//!   marks the ticket PAID before the slot is released (never the reverse
//!   order), and leaves a declined ticket ACTIVE so payment can be
//!   retried. It is serialized per ticket; unrelated tickets are never
//!   blocked.
//! - `preview_amount` and `receipt` are read-only and take no ticket
//!   lock, so they are safe to call concurrently with an exit.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::allocation::{build_strategy, AllocationStrategy, StrategyConfig};
use crate::core::clock::Clock;
use crate::models::event::{EventLog, ParkingEvent};
use crate::models::payment::{PaymentRecord, PaymentStatus};
use crate::models::ticket::Ticket;
use crate::models::vehicle::{normalize_plate, VehicleClass};
use crate::payment::{ChargeOutcome, PaymentGateway};
use crate::pricing::{DefaultRates, PricingEngine};
use crate::store::{PaymentStore, PricingRuleStore, SlotStore, StoreError, TicketStore, VehicleStore};

/// Engine configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Allocation strategy, selected once at startup
    pub strategy: StrategyConfig,
    /// Rates applied to classes without a stored pricing rule
    pub default_rates: DefaultRates,
}

/// Errors surfaced by the lifecycle operations.
///
/// Capacity is an expected negative outcome, not a fault; conflicts are
/// user-facing rejections; not-found errors are never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParkingError {
    #[error("no available slot for {class:?} in lot {lot_id}")]
    NoCapacity { lot_id: u64, class: VehicleClass },

    #[error("vehicle {plate} already parked with an active ticket")]
    AlreadyParked { plate: String },

    #[error("parking lot {0} is not registered")]
    LotNotFound(u64),

    #[error("ticket {0} does not exist")]
    TicketNotFound(String),

    #[error("ticket {0} is not active")]
    TicketNotActive(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Entry request from the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRequest {
    /// License plate as read at the gate (normalized internally)
    pub plate: String,
    /// Vehicle class
    pub class: VehicleClass,
    /// Owner contact, stored on first sight of the plate
    pub owner_contact: String,
    /// Target parking lot
    pub lot_id: u64,
    /// Entry gate
    pub gate_id: u64,
    /// Floor the entry gate is on
    pub gate_floor: i32,
}

/// Successful entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryResponse {
    pub ticket_id: String,
    pub slot_id: String,
    pub floor: i32,
    pub number: u32,
    pub plate: String,
    pub entry_time: DateTime<Utc>,
}

/// Outcome of a pay-and-exit attempt.
///
/// A declined charge is a *result*, not an error: the amount due is
/// reported so the caller can show "amount due, payment failed", and the
/// ticket remains ACTIVE for a retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitResponse {
    pub ticket_id: String,
    /// Amount computed for the stay (i64 cents)
    pub amount: i64,
    pub outcome: ChargeOutcome,
}

/// Read-only projection of a ticket and its current amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub ticket_id: String,
    pub plate: String,
    pub slot_id: String,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    /// Amount for the stay so far, or the frozen amount after exit (i64 cents)
    pub amount: i64,
}

/// The ticket lifecycle engine.
///
/// Shared across callers behind an `Arc`; every operation takes `&self`.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use parking_core_rs::{
///     EngineConfig, EntryRequest, InMemoryPaymentStore, InMemoryPricingRuleStore,
///     InMemorySlotStore, InMemoryTicketStore, InMemoryVehicleStore, ParkingEngine,
///     SimulatedGateway, Slot, SystemClock, VehicleClass,
/// };
///
/// let slots = Arc::new(InMemorySlotStore::new());
/// slots.register_lot(1);
/// slots.insert_slot(Slot::new(1, 0, 1, VehicleClass::Car)).unwrap();
///
/// let engine = ParkingEngine::new(
///     EngineConfig::default(),
///     slots,
///     Arc::new(InMemoryVehicleStore::new()),
///     Arc::new(InMemoryTicketStore::new()),
///     Arc::new(InMemoryPaymentStore::new()),
///     Arc::new(InMemoryPricingRuleStore::new()),
///     Arc::new(SimulatedGateway::approving()),
///     Arc::new(SystemClock),
/// );
///
/// let entry = engine
///     .enter(&EntryRequest {
///         plate: "KA-01-HH-1234".to_string(),
///         class: VehicleClass::Car,
///         owner_contact: "owner@example.com".to_string(),
///         lot_id: 1,
///         gate_id: 1,
///         gate_floor: 0,
///     })
///     .unwrap();
///
/// let exit = engine.pay_and_exit(&entry.ticket_id).unwrap();
/// assert_eq!(exit.amount, 0); // still inside the free window
/// ```
pub struct ParkingEngine {
    slots: Arc<dyn SlotStore>,
    vehicles: Arc<dyn VehicleStore>,
    tickets: Arc<dyn TicketStore>,
    payments: Arc<dyn PaymentStore>,
    gateway: Arc<dyn PaymentGateway>,
    clock: Arc<dyn Clock>,
    strategy: Box<dyn AllocationStrategy>,
    pricing: PricingEngine,
    events: Mutex<EventLog>,
    /// Per-ticket exit serialization: one writer per ticket, previews
    /// excluded
    exit_guards: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ParkingEngine {
    /// Build an engine; the allocation strategy is constructed from the
    /// config once, here.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: EngineConfig,
        slots: Arc<dyn SlotStore>,
        vehicles: Arc<dyn VehicleStore>,
        tickets: Arc<dyn TicketStore>,
        payments: Arc<dyn PaymentStore>,
        rules: Arc<dyn PricingRuleStore>,
        gateway: Arc<dyn PaymentGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let strategy = build_strategy(config.strategy, Arc::clone(&slots));
        let pricing = PricingEngine::new(rules, config.default_rates);
        Self {
            slots,
            vehicles,
            tickets,
            payments,
            gateway,
            clock,
            strategy,
            pricing,
            events: Mutex::new(EventLog::new()),
            exit_guards: Mutex::new(HashMap::new()),
        }
    }

    /// Admit a vehicle: allocate a slot and open an ACTIVE ticket.
    pub fn enter(&self, request: &EntryRequest) -> Result<EntryResponse, ParkingError> {
        let plate = normalize_plate(&request.plate);
        // Advisory pre-check for a friendly rejection; the race-proof
        // guard is the ticket store's uniqueness constraint below
        if self.tickets.find_active_by_plate(&plate).is_some() {
            return Err(ParkingError::AlreadyParked { plate });
        }

        let vehicle =
            self.vehicles
                .find_or_create(&request.plate, request.class, &request.owner_contact);

        let reserved = self
            .strategy
            .allocate(request.lot_id, request.gate_id, request.gate_floor, request.class)
            .map_err(|err| match err {
                StoreError::LotNotFound(id) => ParkingError::LotNotFound(id),
                other => ParkingError::from(other),
            })?;
        let slot = match reserved {
            Some(slot) => slot,
            None => {
                return Err(ParkingError::NoCapacity {
                    lot_id: request.lot_id,
                    class: request.class,
                })
            }
        };

        let entry_time = self.clock.now();
        let ticket = match self.tickets.create_active(&vehicle, &slot, entry_time) {
            Ok(ticket) => ticket,
            Err(err) => {
                // The reservation must not outlive the failed entry: no
                // slot may stay OCCUPIED without an ACTIVE ticket
                if let Err(release_err) = self.strategy.free(&slot) {
                    tracing::error!(
                        slot_id = slot.id(),
                        error = %release_err,
                        "failed to roll back slot reservation"
                    );
                }
                return Err(match err {
                    StoreError::DuplicateActiveTicket { plate } => {
                        ParkingError::AlreadyParked { plate }
                    }
                    other => ParkingError::from(other),
                });
            }
        };

        self.events.lock().record(ParkingEvent::VehicleEntered {
            at: entry_time,
            ticket_id: ticket.id().to_string(),
            plate: vehicle.plate().to_string(),
            slot_id: slot.id().to_string(),
            lot_id: request.lot_id,
        });
        tracing::info!(
            ticket_id = ticket.id(),
            plate = vehicle.plate(),
            slot_id = slot.id(),
            floor = slot.floor(),
            "vehicle entered"
        );

        Ok(EntryResponse {
            ticket_id: ticket.id().to_string(),
            slot_id: slot.id().to_string(),
            floor: slot.floor(),
            number: slot.number(),
            plate: vehicle.plate().to_string(),
            entry_time,
        })
    }

    /// Amount due right now (or the frozen amount after exit). Never
    /// mutates state and never locks the ticket.
    pub fn preview_amount(&self, ticket_id: &str) -> Result<i64, ParkingError> {
        let ticket = self.lookup(ticket_id)?;
        Ok(self
            .pricing
            .amount_due(ticket.vehicle_class(), self.elapsed(&ticket)))
    }

    /// Charge the stay and close the ticket.
    pub fn pay_and_exit(&self, ticket_id: &str) -> Result<ExitResponse, ParkingError> {
        let guard = self.exit_guard(ticket_id);
        let _exit = guard.lock();

        let ticket = self.lookup(ticket_id)?;
        if !ticket.is_active() {
            return Err(ParkingError::TicketNotActive(ticket_id.to_string()));
        }

        // The authoritative exit time is fixed here, before the charge
        let exit_time = self.clock.now();
        let amount = self
            .pricing
            .amount_due(ticket.vehicle_class(), exit_time - ticket.entry_time());

        self.payments.initiate(ticket_id, amount, exit_time);
        match self.gateway.charge(ticket_id, amount) {
            ChargeOutcome::Failed => {
                self.payments
                    .finish(ticket_id, PaymentStatus::Failed, self.clock.now())?;
                self.events.lock().record(ParkingEvent::PaymentFailed {
                    at: exit_time,
                    ticket_id: ticket_id.to_string(),
                    amount,
                });
                tracing::warn!(ticket_id, amount, "payment declined, ticket stays active");
                // Slot is NOT released; the ticket remains retryable
                Ok(ExitResponse {
                    ticket_id: ticket_id.to_string(),
                    amount,
                    outcome: ChargeOutcome::Failed,
                })
            }
            ChargeOutcome::Success => {
                self.payments
                    .finish(ticket_id, PaymentStatus::Success, self.clock.now())?;
                let paid = self
                    .tickets
                    .complete(ticket_id, exit_time)
                    .map_err(|err| match err {
                        StoreError::TicketConflict(_) => {
                            ParkingError::TicketNotActive(ticket_id.to_string())
                        }
                        other => ParkingError::from(other),
                    })?;

                // The ticket is durably PAID before the slot opens up:
                // the reverse order could hand the slot to a new vehicle
                // while this ticket still looked ACTIVE
                let slot = self.slots.get(paid.slot_id())?;
                self.strategy.free(&slot)?;

                {
                    let mut events = self.events.lock();
                    events.record(ParkingEvent::PaymentSucceeded {
                        at: exit_time,
                        ticket_id: ticket_id.to_string(),
                        amount,
                    });
                    events.record(ParkingEvent::SlotReleased {
                        at: exit_time,
                        ticket_id: ticket_id.to_string(),
                        slot_id: slot.id().to_string(),
                    });
                }
                tracing::info!(ticket_id, amount, slot_id = slot.id(), "vehicle exited");

                // Terminal ticket: its guard is no longer needed
                self.exit_guards.lock().remove(ticket_id);

                Ok(ExitResponse {
                    ticket_id: ticket_id.to_string(),
                    amount,
                    outcome: ChargeOutcome::Success,
                })
            }
        }
    }

    /// Read-only ticket projection for completed or in-progress stays.
    pub fn receipt(&self, ticket_id: &str) -> Result<Receipt, ParkingError> {
        let ticket = self.lookup(ticket_id)?;
        let amount = self
            .pricing
            .amount_due(ticket.vehicle_class(), self.elapsed(&ticket));
        Ok(Receipt {
            ticket_id: ticket.id().to_string(),
            plate: ticket.plate().to_string(),
            slot_id: ticket.slot_id().to_string(),
            entry_time: ticket.entry_time(),
            exit_time: ticket.exit_time(),
            amount,
        })
    }

    /// The payment record for a ticket, if payment was ever initiated.
    pub fn payment_for(&self, ticket_id: &str) -> Option<PaymentRecord> {
        self.payments.for_ticket(ticket_id)
    }

    /// Snapshot of the domain event log.
    pub fn events(&self) -> Vec<ParkingEvent> {
        self.events.lock().events().to_vec()
    }

    fn lookup(&self, ticket_id: &str) -> Result<Ticket, ParkingError> {
        self.tickets.get(ticket_id).map_err(|err| match err {
            StoreError::TicketNotFound(id) => ParkingError::TicketNotFound(id),
            other => ParkingError::from(other),
        })
    }

    fn elapsed(&self, ticket: &Ticket) -> Duration {
        ticket.exit_time().unwrap_or_else(|| self.clock.now()) - ticket.entry_time()
    }

    fn exit_guard(&self, ticket_id: &str) -> Arc<Mutex<()>> {
        self.exit_guards
            .lock()
            .entry(ticket_id.to_string())
            .or_default()
            .clone()
    }
}
