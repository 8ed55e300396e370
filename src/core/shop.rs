//! Lock-and-condvar shop monitor.
//!
//! One `parking_lot::Mutex` guards the whole [`ShopState`]. Each station owns
//! three condition variables (assigned, service done, payment) kept in an
//! arena indexed by station id, and a single shared `station_freed`
//! condition wakes queued customers. Every wait re-checks its predicate
//! after waking, so spurious wakeups are harmless.

use parking_lot::{Condvar, Mutex};

use crate::config::ShopConfig;
use crate::core::events::{Actor, EventSink, ShopEventKind};
use crate::core::state::{Admission, ShopState};
use crate::core::{Arrival, ShopError, ShopProtocol, ShopStats};
use crate::util::ids::{CustomerId, StationId};

/// Condition variables a single station's actors block on.
#[derive(Debug, Default)]
struct StationSignals {
    /// A customer was bound to the station.
    assigned: Condvar,
    /// The station finished serving its occupant.
    service_done: Condvar,
    /// The occupant paid.
    payment: Condvar,
}

/// Shop monitor shared by every customer and station actor.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
/// use shop_monitor::core::{Arrival, Shop, ShopProtocol};
/// use shop_monitor::util::{CustomerId, StationId};
///
/// let shop = Arc::new(Shop::new(2, 1).unwrap());
///
/// let station = {
///     let shop = Arc::clone(&shop);
///     thread::spawn(move || {
///         let customer = shop.await_customer(StationId(0)).unwrap();
///         shop.finish_cut(StationId(0)).unwrap();
///         shop.release_station(StationId(0)).unwrap();
///         customer
///     })
/// };
///
/// let arrival = shop.arrive(CustomerId(1)).unwrap();
/// assert_eq!(arrival, Arrival::Assigned(StationId(0)));
/// shop.depart(CustomerId(1), StationId(0)).unwrap();
///
/// assert_eq!(station.join().unwrap(), CustomerId(1));
/// assert_eq!(shop.drop_count(), 0);
/// ```
pub struct Shop {
    state: Mutex<ShopState>,
    signals: Vec<StationSignals>,
    station_freed: Condvar,
}

impl Shop {
    /// Create a shop with `capacity` waiting seats and `station_count` stations.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::InvalidConfig` if `station_count` is zero.
    pub fn new(capacity: usize, station_count: usize) -> Result<Self, ShopError> {
        let state = ShopState::new(capacity, station_count)?;
        tracing::info!(capacity, station_count, "shop opened");
        Ok(Self {
            state: Mutex::new(state),
            signals: (0..station_count).map(|_| StationSignals::default()).collect(),
            station_freed: Condvar::new(),
        })
    }

    /// Create a shop from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::InvalidConfig` if the configuration is invalid.
    pub fn from_config(config: &ShopConfig) -> Result<Self, ShopError> {
        config.validate().map_err(ShopError::InvalidConfig)?;
        Self::new(config.capacity, config.station_count)
    }

    /// Attach an event sink.
    #[must_use]
    pub fn with_events(mut self, sink: Box<dyn EventSink>) -> Self {
        self.state.get_mut().set_event_sink(sink);
        self
    }

    /// Number of waiting seats.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.state.lock().stats().capacity
    }

    /// Number of stations.
    #[must_use]
    pub fn station_count(&self) -> usize {
        self.signals.len()
    }

    /// Whether [`close`](ShopProtocol::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().is_closed()
    }

    /// Check the structural invariants against the current state.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invariant found broken.
    pub fn check_invariants(&self) -> Result<(), String> {
        self.state.lock().check_invariants()
    }

    fn signals(&self, station: StationId) -> Result<&StationSignals, ShopError> {
        self.signals
            .get(station.index())
            .ok_or(ShopError::UnknownStation(station))
    }
}

impl ShopProtocol for Shop {
    fn arrive(&self, customer: CustomerId) -> Result<Arrival, ShopError> {
        let mut state = self.state.lock();
        match state.admit(customer)? {
            Admission::Assigned(station) => {
                self.signals(station)?.assigned.notify_one();
                Ok(Arrival::Assigned(station))
            }
            Admission::Rejected => Ok(Arrival::Rejected),
            Admission::Queued => loop {
                // The releasing station binds us before waking the room.
                if let Some(station) = state.station_of(customer) {
                    return Ok(Arrival::Assigned(station));
                }
                if !state.is_waiting(customer) {
                    return Err(ShopError::Closed);
                }
                self.station_freed.wait(&mut state);
            },
        }
    }

    fn depart(&self, customer: CustomerId, station: StationId) -> Result<(), ShopError> {
        let signals = self.signals(station)?;
        let mut state = self.state.lock();
        if !state.is_service_done(station, customer)? {
            state.emit(
                Actor::Customer(customer),
                ShopEventKind::AwaitingService { station },
            );
            while !state.is_service_done(station, customer)? {
                signals.service_done.wait(&mut state);
            }
        }
        state.pay(customer, station)?;
        signals.payment.notify_one();
        Ok(())
    }

    fn await_customer(&self, station: StationId) -> Result<CustomerId, ShopError> {
        let signals = self.signals(station)?;
        let mut state = self.state.lock();
        let mut announced = false;
        let customer = loop {
            if let Some(customer) = state.assigned_customer(station)? {
                break customer;
            }
            if state.is_closed() {
                return Err(ShopError::Closed);
            }
            if !announced {
                state.emit(Actor::Station(station), ShopEventKind::Sleeping);
                announced = true;
            }
            signals.assigned.wait(&mut state);
        };
        state.emit(
            Actor::Station(station),
            ShopEventKind::ServiceStarted { customer },
        );
        Ok(customer)
    }

    fn finish_cut(&self, station: StationId) -> Result<(), ShopError> {
        let signals = self.signals(station)?;
        let mut state = self.state.lock();
        state.finish_service(station)?;
        signals.service_done.notify_one();
        while !state.is_paid(station)? {
            signals.payment.wait(&mut state);
        }
        Ok(())
    }

    fn release_station(&self, station: StationId) -> Result<(), ShopError> {
        let signals = self.signals(station)?;
        let mut state = self.state.lock();
        match state.release(station) {
            Ok(next) => {
                if next.is_some() {
                    signals.assigned.notify_one();
                }
                self.station_freed.notify_all();
                debug_assert!(state.check_invariants().is_ok());
                Ok(())
            }
            Err(e) => {
                tracing::warn!(%station, error = %e, "release rejected");
                Err(e)
            }
        }
    }

    fn drop_count(&self) -> u64 {
        self.state.lock().drop_count()
    }

    fn stats(&self) -> ShopStats {
        self.state.lock().stats()
    }

    fn close(&self) {
        let mut state = self.state.lock();
        if state.is_closed() {
            return;
        }
        let abandoned = state.close();
        drop(state);
        tracing::info!(abandoned = abandoned.len(), "shop closed");
        self.station_freed.notify_all();
        for signals in &self.signals {
            signals.assigned.notify_all();
        }
    }
}
