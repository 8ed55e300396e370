//! Per-station state and its service cycle.
//!
//! A station cycles `Idle -> Serving -> AwaitingPayment -> Idle` for the
//! whole life of the shop. It is only ever mutated while the owning shop's
//! lock is held (or from the arbiter thread that owns the state).

use serde::{Deserialize, Serialize};

use crate::core::ShopError;
use crate::util::ids::{CustomerId, StationId};

/// Service phase of a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationPhase {
    /// No occupant; the station sleeps until a customer is assigned.
    Idle,
    /// A customer is assigned and being served.
    Serving,
    /// Service is done; the station waits for the customer to pay.
    AwaitingPayment,
}

/// One server in the shop's station arena.
#[derive(Debug, Clone)]
pub struct Station {
    id: StationId,
    occupant: Option<CustomerId>,
    phase: StationPhase,
    paid: bool,
}

impl Station {
    pub(crate) const fn new(id: StationId) -> Self {
        Self {
            id,
            occupant: None,
            phase: StationPhase::Idle,
            paid: false,
        }
    }

    /// Station identifier (its index in the arena).
    #[must_use]
    pub const fn id(&self) -> StationId {
        self.id
    }

    /// Customer currently bound to this station, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<CustomerId> {
        self.occupant
    }

    /// Current service phase.
    #[must_use]
    pub const fn phase(&self) -> StationPhase {
        self.phase
    }

    /// Whether the station can take a new customer.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.phase, StationPhase::Idle)
    }

    /// Whether the current occupant has paid.
    #[must_use]
    pub const fn is_paid(&self) -> bool {
        self.paid
    }

    /// Bind `customer` to this idle station and start serving.
    pub(crate) fn assign(&mut self, customer: CustomerId) -> Result<(), ShopError> {
        if !self.is_idle() {
            return Err(ShopError::violation(
                self.id,
                format!("cannot assign customer {customer} to a busy station"),
            ));
        }
        self.occupant = Some(customer);
        self.phase = StationPhase::Serving;
        self.paid = false;
        Ok(())
    }

    /// `Serving -> AwaitingPayment`. Returns the customer that was served.
    pub(crate) fn finish_service(&mut self) -> Result<CustomerId, ShopError> {
        match (self.phase, self.occupant) {
            (StationPhase::Serving, Some(customer)) => {
                self.phase = StationPhase::AwaitingPayment;
                Ok(customer)
            }
            (phase, _) => Err(ShopError::violation(
                self.id,
                format!("cannot finish service while {phase:?}"),
            )),
        }
    }

    /// Whether `customer`'s service is finished and payment is due.
    ///
    /// Asking on behalf of a customer that does not occupy this station is
    /// a protocol violation, since that customer would otherwise wait forever.
    pub(crate) fn is_service_done(&self, customer: CustomerId) -> Result<bool, ShopError> {
        if self.occupant != Some(customer) {
            return Err(ShopError::violation(
                self.id,
                format!("customer {customer} does not occupy this station"),
            ));
        }
        Ok(self.phase == StationPhase::AwaitingPayment)
    }

    /// Record `customer`'s payment.
    pub(crate) fn record_payment(&mut self, customer: CustomerId) -> Result<(), ShopError> {
        if !self.is_service_done(customer)? {
            return Err(ShopError::violation(
                self.id,
                format!("customer {customer} paid before service finished"),
            ));
        }
        if self.paid {
            return Err(ShopError::violation(
                self.id,
                format!("customer {customer} already paid"),
            ));
        }
        self.paid = true;
        Ok(())
    }

    /// `AwaitingPayment -> Idle`, clearing the occupant. Returns the
    /// customer that just left.
    pub(crate) fn release(&mut self) -> Result<CustomerId, ShopError> {
        match (self.phase, self.occupant, self.paid) {
            (StationPhase::AwaitingPayment, Some(customer), true) => {
                self.occupant = None;
                self.phase = StationPhase::Idle;
                self.paid = false;
                Ok(customer)
            }
            (StationPhase::AwaitingPayment, _, false) => Err(ShopError::violation(
                self.id,
                "released before payment was recorded",
            )),
            (phase, _, _) => Err(ShopError::violation(
                self.id,
                format!("cannot release while {phase:?}"),
            )),
        }
    }
}
