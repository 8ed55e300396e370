//! Message-passing shop back end.
//!
//! A single arbiter thread owns the [`ShopState`] and serves requests from a
//! `crossbeam-channel`. Each request carries a bounded(1) reply channel.
//! Requests that cannot be answered yet (a queued arrival, a station with
//! nobody to serve, a customer waiting for service, a station waiting for
//! payment) are parked and answered once their predicate holds.
//!
//! After every request the arbiter settles parked requests, publishes
//! fresh statistics, and only then sends replies, so a caller that sees
//! `Rejected` also sees the incremented drop count.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::ShopConfig;
use crate::core::events::{Actor, EventSink, ShopEventKind};
use crate::core::state::{Admission, ShopState};
use crate::core::{Arrival, ShopError, ShopProtocol, ShopStats};
use crate::util::ids::{CustomerId, StationId};

type Reply<T> = Sender<Result<T, ShopError>>;

enum Request {
    Arrive {
        customer: CustomerId,
        reply: Reply<Arrival>,
    },
    Depart {
        customer: CustomerId,
        station: StationId,
        reply: Reply<()>,
    },
    AwaitCustomer {
        station: StationId,
        reply: Reply<CustomerId>,
    },
    FinishCut {
        station: StationId,
        reply: Reply<()>,
    },
    Release {
        station: StationId,
        reply: Reply<()>,
    },
    Close {
        reply: Reply<()>,
    },
}

/// Values the arbiter publishes for lock-free reads by clients.
struct Published {
    drops: AtomicU64,
    stats: Mutex<ShopStats>,
}

/// Client handle to an arbiter thread. Cheap to clone; the arbiter exits
/// once every handle is dropped.
#[derive(Clone)]
pub struct ArbiterShop {
    requests: Sender<Request>,
    published: Arc<Published>,
}

impl ArbiterShop {
    /// Spawn an arbiter thread for a shop with the given dimensions.
    ///
    /// The returned handle yields the final statistics when the arbiter
    /// exits.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::InvalidConfig` for invalid dimensions, or
    /// `ShopError::Internal` if the thread cannot be spawned.
    pub fn spawn(
        cfg: &ShopConfig,
        events: Option<Box<dyn EventSink>>,
    ) -> Result<(Self, JoinHandle<ShopStats>), ShopError> {
        cfg.validate().map_err(ShopError::InvalidConfig)?;
        let mut state = ShopState::new(cfg.capacity, cfg.station_count)?;
        if let Some(sink) = events {
            state.set_event_sink(sink);
        }

        let published = Arc::new(Published {
            drops: AtomicU64::new(0),
            stats: Mutex::new(state.stats()),
        });
        let (tx, rx) = unbounded();
        let arbiter = Arbiter::new(state, Arc::clone(&published), cfg.station_count);

        let handle = thread::Builder::new()
            .name("shop-arbiter".into())
            .spawn(move || arbiter.run(&rx))
            .map_err(|e| ShopError::Internal(format!("failed to spawn arbiter: {e}")))?;

        info!(
            capacity = cfg.capacity,
            station_count = cfg.station_count,
            "arbiter shop opened"
        );
        Ok((
            Self {
                requests: tx,
                published,
            },
            handle,
        ))
    }

    fn call<T>(&self, make: impl FnOnce(Reply<T>) -> Request) -> Result<T, ShopError> {
        let (reply, response) = bounded(1);
        self.requests
            .send(make(reply))
            .map_err(|_| ShopError::Internal("arbiter stopped".into()))?;
        response
            .recv()
            .map_err(|_| ShopError::Internal("arbiter dropped the request".into()))?
    }
}

impl ShopProtocol for ArbiterShop {
    fn arrive(&self, customer: CustomerId) -> Result<Arrival, ShopError> {
        self.call(|reply| Request::Arrive { customer, reply })
    }

    fn depart(&self, customer: CustomerId, station: StationId) -> Result<(), ShopError> {
        self.call(|reply| Request::Depart {
            customer,
            station,
            reply,
        })
    }

    fn await_customer(&self, station: StationId) -> Result<CustomerId, ShopError> {
        self.call(|reply| Request::AwaitCustomer { station, reply })
    }

    fn finish_cut(&self, station: StationId) -> Result<(), ShopError> {
        self.call(|reply| Request::FinishCut { station, reply })
    }

    fn release_station(&self, station: StationId) -> Result<(), ShopError> {
        self.call(|reply| Request::Release { station, reply })
    }

    fn drop_count(&self) -> u64 {
        self.published.drops.load(Ordering::Acquire)
    }

    fn stats(&self) -> ShopStats {
        self.published.stats.lock().clone()
    }

    fn close(&self) {
        if let Err(e) = self.call(|reply| Request::Close { reply }) {
            debug!(error = %e, "close after arbiter stopped");
        }
    }
}

/// Arbiter-side state: the shop plus every parked request.
struct Arbiter {
    state: ShopState,
    published: Arc<Published>,
    queued: Vec<(CustomerId, Reply<Arrival>)>,
    sleeping: Vec<Option<Reply<CustomerId>>>,
    departing: Vec<Option<(CustomerId, Reply<()>)>>,
    collecting: Vec<Option<Reply<()>>>,
    outbox: Vec<Box<dyn FnOnce() + Send>>,
}

impl Arbiter {
    fn new(state: ShopState, published: Arc<Published>, station_count: usize) -> Self {
        Self {
            state,
            published,
            queued: Vec::new(),
            sleeping: (0..station_count).map(|_| None).collect(),
            departing: (0..station_count).map(|_| None).collect(),
            collecting: (0..station_count).map(|_| None).collect(),
            outbox: Vec::new(),
        }
    }

    fn run(mut self, requests: &Receiver<Request>) -> ShopStats {
        debug!("arbiter started");
        while let Ok(request) = requests.recv() {
            self.handle(request);
            self.settle();
            self.publish();
            for send in self.outbox.drain(..) {
                send();
            }
        }
        debug!("all arbiter handles dropped, exiting");
        self.state.stats()
    }

    fn answer<T: Send + 'static>(&mut self, reply: Reply<T>, value: Result<T, ShopError>) {
        self.outbox.push(Box::new(move || {
            // The caller may have hung up.
            let _ = reply.send(value);
        }));
    }

    fn handle(&mut self, request: Request) {
        match request {
            Request::Arrive { customer, reply } => match self.state.admit(customer) {
                Ok(Admission::Assigned(station)) => {
                    self.answer(reply, Ok(Arrival::Assigned(station)));
                }
                Ok(Admission::Rejected) => self.answer(reply, Ok(Arrival::Rejected)),
                Ok(Admission::Queued) => self.queued.push((customer, reply)),
                Err(e) => self.answer(reply, Err(e)),
            },
            Request::Depart {
                customer,
                station,
                reply,
            } => match self.state.is_service_done(station, customer) {
                Ok(true) => {
                    let paid = self.state.pay(customer, station);
                    self.answer(reply, paid);
                }
                Ok(false) if self.departing[station.index()].is_some() => self.answer(
                    reply,
                    Err(ShopError::violation(station, "a customer is already departing")),
                ),
                Ok(false) => {
                    self.state.emit(
                        Actor::Customer(customer),
                        ShopEventKind::AwaitingService { station },
                    );
                    self.departing[station.index()] = Some((customer, reply));
                }
                Err(e) => self.answer(reply, Err(e)),
            },
            Request::AwaitCustomer { station, reply } => {
                if let Err(e) = self.state.assigned_customer(station) {
                    self.answer(reply, Err(e));
                } else if self.sleeping[station.index()].is_some() {
                    self.answer(
                        reply,
                        Err(ShopError::violation(station, "station is already waiting")),
                    );
                } else {
                    self.sleeping[station.index()] = Some(reply);
                    if matches!(self.state.assigned_customer(station), Ok(None))
                        && !self.state.is_closed()
                    {
                        self.state.emit(Actor::Station(station), ShopEventKind::Sleeping);
                    }
                }
            }
            Request::FinishCut { station, reply } => match self.state.finish_service(station) {
                Ok(_) => self.collecting[station.index()] = Some(reply),
                Err(e) => self.answer(reply, Err(e)),
            },
            Request::Release { station, reply } => {
                let released = self.state.release(station).map(|_| ());
                if let Err(e) = &released {
                    tracing::warn!(%station, error = %e, "release rejected");
                }
                self.answer(reply, released);
            }
            Request::Close { reply } => {
                let abandoned = self.state.close();
                info!(abandoned = abandoned.len(), "arbiter shop closed");
                self.answer(reply, Ok(()));
            }
        }
    }

    /// Answer every parked request whose predicate now holds.
    fn settle(&mut self) {
        for (customer, reply) in std::mem::take(&mut self.queued) {
            if let Some(station) = self.state.station_of(customer) {
                self.answer(reply, Ok(Arrival::Assigned(station)));
            } else if self.state.is_waiting(customer) {
                self.queued.push((customer, reply));
            } else {
                self.answer(reply, Err(ShopError::Closed));
            }
        }

        for idx in 0..self.sleeping.len() {
            let Some(reply) = self.sleeping[idx].take() else {
                continue;
            };
            let station = StationId(idx);
            match self.state.assigned_customer(station) {
                Ok(Some(customer)) => {
                    self.state.emit(
                        Actor::Station(station),
                        ShopEventKind::ServiceStarted { customer },
                    );
                    self.answer(reply, Ok(customer));
                }
                Ok(None) if self.state.is_closed() => self.answer(reply, Err(ShopError::Closed)),
                Ok(None) => self.sleeping[idx] = Some(reply),
                Err(e) => self.answer(reply, Err(e)),
            }
        }

        // Payments first, so stations collecting below see them.
        for idx in 0..self.departing.len() {
            let Some((customer, reply)) = self.departing[idx].take() else {
                continue;
            };
            let station = StationId(idx);
            match self.state.is_service_done(station, customer) {
                Ok(true) => {
                    let paid = self.state.pay(customer, station);
                    self.answer(reply, paid);
                }
                Ok(false) => self.departing[idx] = Some((customer, reply)),
                Err(e) => self.answer(reply, Err(e)),
            }
        }

        for idx in 0..self.collecting.len() {
            let Some(reply) = self.collecting[idx].take() else {
                continue;
            };
            match self.state.is_paid(StationId(idx)) {
                Ok(true) => self.answer(reply, Ok(())),
                Ok(false) => self.collecting[idx] = Some(reply),
                Err(e) => self.answer(reply, Err(e)),
            }
        }
    }

    fn publish(&self) {
        let stats = self.state.stats();
        self.published.drops.store(stats.drops, Ordering::Release);
        *self.published.stats.lock() = stats;
    }
}
