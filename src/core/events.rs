//! Shop event journal.
//!
//! Every protocol step is recorded as a [`ShopEvent`] while the shop's lock
//! is held, so the sequence numbers reflect the true order of state changes.
//! Events are always traced at `debug` level; an [`EventSink`] can be
//! attached to capture them as well.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::util::ids::{CustomerId, StationId};

/// Actor an event is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    /// A customer actor.
    Customer(CustomerId),
    /// A station actor.
    Station(StationId),
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopEventKind {
    /// Customer took a waiting seat.
    Queued {
        /// Seats still free after this customer sat down.
        seats_available: usize,
    },
    /// Customer left because every station and seat was taken.
    Rejected,
    /// Customer was bound to a station.
    Assigned {
        /// Station the customer moves to.
        station: StationId,
        /// Seats free after the assignment.
        seats_available: usize,
    },
    /// Customer is waiting for its service to finish.
    AwaitingService {
        /// Station serving the customer.
        station: StationId,
    },
    /// Customer paid and left.
    Paid {
        /// Station that was paid.
        station: StationId,
    },
    /// Customer was sent home because the shop closed.
    Abandoned,
    /// Station has nobody to serve and goes to sleep.
    Sleeping,
    /// Station begins serving a customer.
    ServiceStarted {
        /// Customer being served.
        customer: CustomerId,
    },
    /// Station finished serving and waits for payment.
    ServiceFinished {
        /// Customer that was served.
        customer: CustomerId,
    },
    /// Station is free again.
    Released {
        /// Queued customer handed this station, if any.
        next: Option<CustomerId>,
    },
}

/// A single recorded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopEvent {
    /// Monotonic sequence number within one shop.
    pub seq: u64,
    /// Timestamp in milliseconds since epoch.
    pub at_ms: u128,
    /// Actor that caused the event.
    pub actor: Actor,
    /// Event detail.
    pub kind: ShopEventKind,
}

impl fmt::Display for ShopEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.actor {
            Actor::Customer(id) => write!(f, "customer[{id}]: ")?,
            Actor::Station(id) => write!(f, "station [{id}]: ")?,
        }
        match &self.kind {
            ShopEventKind::Queued { seats_available } => write!(
                f,
                "takes a waiting chair. # waiting seats available = {seats_available}"
            ),
            ShopEventKind::Rejected => {
                write!(f, "leaves the shop because of no available waiting chairs.")
            }
            ShopEventKind::Assigned {
                station,
                seats_available,
            } => write!(
                f,
                "moves to service chair[{station}]. # waiting seats available = {seats_available}"
            ),
            ShopEventKind::AwaitingService { station } => {
                write!(f, "waits for station[{station}] to be done with the service")
            }
            ShopEventKind::Paid { station } => {
                write!(f, "says good-bye to station[{station}].")
            }
            ShopEventKind::Abandoned => write!(f, "leaves because the shop closed."),
            ShopEventKind::Sleeping => write!(f, "sleeps because of no customers."),
            ShopEventKind::ServiceStarted { customer } => {
                write!(f, "starts a service for customer[{customer}]")
            }
            ShopEventKind::ServiceFinished { customer } => {
                write!(f, "is done with the service for customer[{customer}]")
            }
            ShopEventKind::Released { next: Some(next) } => {
                write!(f, "calls in customer[{next}]")
            }
            ShopEventKind::Released { next: None } => write!(f, "calls in another customer"),
        }
    }
}

/// Event sink abstraction.
pub trait EventSink: Send {
    /// Record an event. Called with the shop's lock held; keep it short.
    fn record(&mut self, event: ShopEvent);
}

/// Bounded in-memory event buffer for tests and post-run inspection.
///
/// Clones share the same buffer, so a test can keep one handle while the
/// shop owns the other.
#[derive(Debug, Clone)]
pub struct InMemoryEventSink {
    inner: Arc<Mutex<BoundedEvents>>,
}

#[derive(Debug)]
struct BoundedEvents {
    events: VecDeque<ShopEvent>,
    max_events: usize,
}

impl InMemoryEventSink {
    /// Create a sink keeping at most `max_events`, dropping the oldest first.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BoundedEvents {
                events: VecDeque::with_capacity(max_events.min(4096)),
                max_events,
            })),
        }
    }

    /// Snapshot of stored events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<ShopEvent> {
        self.inner.lock().events.iter().cloned().collect()
    }

    /// Customers in the order they were assigned a station.
    #[must_use]
    pub fn assignment_order(&self) -> Vec<(CustomerId, StationId)> {
        self.inner
            .lock()
            .events
            .iter()
            .filter_map(|event| match (event.actor, &event.kind) {
                (Actor::Customer(customer), ShopEventKind::Assigned { station, .. }) => {
                    Some((customer, *station))
                }
                _ => None,
            })
            .collect()
    }
}

impl EventSink for InMemoryEventSink {
    fn record(&mut self, event: ShopEvent) {
        let mut inner = self.inner.lock();
        if inner.max_events == 0 {
            return;
        }
        if inner.events.len() >= inner.max_events {
            inner.events.pop_front();
        }
        inner.events.push_back(event);
    }
}
