//! Customer and station actor loops.
//!
//! These drive any [`ShopProtocol`] implementation. Service work runs in
//! the station's own thread between `await_customer` and `finish_cut`,
//! never while the shop is locked.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{Arrival, ShopError, ShopProtocol};
use crate::util::ids::{CustomerId, StationId};

/// Work a station performs for one customer.
pub trait Service: Send + Sync {
    /// Serve `customer` at `station`. Runs outside the shop's lock.
    fn serve(&self, station: StationId, customer: CustomerId);
}

/// Service that takes a fixed amount of time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedService(pub Duration);

impl FixedService {
    /// Service lasting `micros` microseconds.
    #[must_use]
    pub const fn from_micros(micros: u64) -> Self {
        Self(Duration::from_micros(micros))
    }
}

impl Service for FixedService {
    fn serve(&self, _station: StationId, _customer: CustomerId) {
        if !self.0.is_zero() {
            thread::sleep(self.0);
        }
    }
}

impl<F> Service for F
where
    F: Fn(StationId, CustomerId) + Send + Sync,
{
    fn serve(&self, station: StationId, customer: CustomerId) {
        self(station, customer);
    }
}

/// How a customer's visit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerOutcome {
    /// Served at this station and paid.
    Served(StationId),
    /// Turned away on arrival.
    Rejected,
    /// Sent home from the waiting room because the shop closed.
    Abandoned,
}

/// Run one customer's visit: arrive, then depart if assigned.
///
/// # Errors
///
/// Propagates protocol or infrastructure errors from the shop. A shop that
/// closes while the customer waits yields `CustomerOutcome::Abandoned`.
pub fn run_customer<S>(shop: &S, customer: CustomerId) -> Result<CustomerOutcome, ShopError>
where
    S: ShopProtocol + ?Sized,
{
    let station = match shop.arrive(customer) {
        Ok(Arrival::Assigned(station)) => station,
        Ok(Arrival::Rejected) => return Ok(CustomerOutcome::Rejected),
        Err(ShopError::Closed) => return Ok(CustomerOutcome::Abandoned),
        Err(e) => return Err(e),
    };
    shop.depart(customer, station)?;
    debug!(%customer, %station, "customer served");
    Ok(CustomerOutcome::Served(station))
}

/// Run a station until the shop closes. Returns how many customers it served.
///
/// If `service` panics, the station closes the shop, completes the current
/// customer's cycle so that customer is not left waiting in `depart`, and
/// stops. Closing first empties the waiting room, so nobody is handed to a
/// station that is about to stop.
///
/// # Errors
///
/// Propagates any error other than `Closed` from the shop. A panicking
/// service yields `ShopError::Internal`.
pub fn run_station<S, V>(shop: &S, station: StationId, service: &V) -> Result<u64, ShopError>
where
    S: ShopProtocol + ?Sized,
    V: Service + ?Sized,
{
    let mut served = 0u64;
    loop {
        let customer = match shop.await_customer(station) {
            Ok(customer) => customer,
            Err(ShopError::Closed) => {
                debug!(%station, served, "station stopping");
                return Ok(served);
            }
            Err(e) => {
                warn!(%station, error = %e, "station failed");
                return Err(e);
            }
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| service.serve(station, customer)));
        if let Err(payload) = outcome {
            let reason = panic_message(payload.as_ref());
            warn!(%station, %customer, %reason, "service panicked, closing shop");
            shop.close();
            shop.finish_cut(station)?;
            shop.release_station(station)?;
            return Err(ShopError::Internal(format!(
                "service at station {station} panicked: {reason}"
            )));
        }
        shop.finish_cut(station)?;
        shop.release_station(station)?;
        served += 1;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".into())
}
