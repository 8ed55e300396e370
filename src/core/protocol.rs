//! The actor-facing shop protocol.

use serde::{Deserialize, Serialize};

use crate::core::{ShopError, ShopStats};
use crate::util::ids::{CustomerId, StationId};

/// Outcome of a customer's arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arrival {
    /// The customer is bound to this station and must call `depart` next.
    Assigned(StationId),
    /// Every station and waiting seat was taken; the customer left.
    Rejected,
}

impl Arrival {
    /// Station assigned, if any.
    #[must_use]
    pub const fn station(self) -> Option<StationId> {
        match self {
            Self::Assigned(station) => Some(station),
            Self::Rejected => None,
        }
    }

    /// Whether the customer got a station.
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        matches!(self, Self::Assigned(_))
    }
}

/// Operations customer and station actors use to coordinate.
///
/// Customers call [`arrive`](Self::arrive) and, if assigned,
/// [`depart`](Self::depart). Stations loop over
/// [`await_customer`](Self::await_customer), their own service work,
/// [`finish_cut`](Self::finish_cut) and
/// [`release_station`](Self::release_station).
///
/// Every blocking call releases the shop while it waits. There is no
/// timeout: an actor that never makes its follow-up call blocks its
/// partner indefinitely.
pub trait ShopProtocol: Send + Sync {
    /// Assign an idle station, queue until one frees up, or reject.
    ///
    /// Returns `Closed` if the shop is closed on arrival or while waiting.
    fn arrive(&self, customer: CustomerId) -> Result<Arrival, ShopError>;

    /// Wait for service at `station` to finish, then pay.
    fn depart(&self, customer: CustomerId, station: StationId) -> Result<(), ShopError>;

    /// Sleep until a customer is bound to `station` and return it.
    ///
    /// Returns `Closed` once the shop is closed and nobody is bound.
    fn await_customer(&self, station: StationId) -> Result<CustomerId, ShopError>;

    /// Report service done, then wait for the customer's payment.
    fn finish_cut(&self, station: StationId) -> Result<(), ShopError>;

    /// Free `station` for the next customer.
    fn release_station(&self, station: StationId) -> Result<(), ShopError>;

    /// Cumulative number of rejected arrivals.
    fn drop_count(&self) -> u64;

    /// Current occupancy and counters.
    fn stats(&self) -> ShopStats;

    /// Stop accepting customers and wake sleeping stations.
    fn close(&self);
}
