//! Non-blocking shop state machine.
//!
//! `ShopState` holds the waiting room, the station arena and the counters,
//! and implements every transition of the protocol without ever blocking.
//! The lock-based [`Shop`](crate::core::Shop) and the message-passing
//! [`ArbiterShop`](crate::runtime::ArbiterShop) only add the waiting.
//!
//! Invariant kept by every transition: if any station is idle, the waiting
//! room is empty. Releasing a station while customers are queued hands that
//! station straight to the head of the queue.

use crate::core::events::{Actor, EventSink, ShopEvent, ShopEventKind};
use crate::core::station::{Station, StationPhase};
use crate::core::waiting_room::WaitingRoom;
use crate::core::{ShopError, ShopStats};
use crate::util::clock::now_ms;
use crate::util::ids::{CustomerId, StationId};

/// Result of admitting an arriving customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    /// Bound to an idle station right away.
    Assigned(StationId),
    /// Seated in the waiting room.
    Queued,
    /// Stations and seats all taken.
    Rejected,
}

#[derive(Debug, Default)]
struct Counters {
    arrivals: u64,
    assigned: u64,
    served: u64,
    drops: u64,
    abandoned: u64,
}

pub(crate) struct ShopState {
    waiting_room: WaitingRoom,
    stations: Vec<Station>,
    counters: Counters,
    closed: bool,
    next_seq: u64,
    events: Option<Box<dyn EventSink>>,
}

impl ShopState {
    pub(crate) fn new(capacity: usize, station_count: usize) -> Result<Self, ShopError> {
        if station_count == 0 {
            return Err(ShopError::InvalidConfig(
                "station_count must be greater than 0".into(),
            ));
        }
        Ok(Self {
            waiting_room: WaitingRoom::new(capacity),
            stations: (0..station_count).map(|i| Station::new(StationId(i))).collect(),
            counters: Counters::default(),
            closed: false,
            next_seq: 0,
            events: None,
        })
    }

    pub(crate) fn set_event_sink(&mut self, sink: Box<dyn EventSink>) {
        self.events = Some(sink);
    }

    pub(crate) const fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) const fn drop_count(&self) -> u64 {
        self.counters.drops
    }

    pub(crate) fn emit(&mut self, actor: Actor, kind: ShopEventKind) {
        let event = ShopEvent {
            seq: self.next_seq,
            at_ms: now_ms(),
            actor,
            kind,
        };
        self.next_seq += 1;
        tracing::debug!(seq = event.seq, "{event}");
        if let Some(sink) = self.events.as_mut() {
            sink.record(event);
        }
    }

    fn station(&self, station: StationId) -> Result<&Station, ShopError> {
        self.stations
            .get(station.index())
            .ok_or(ShopError::UnknownStation(station))
    }

    fn station_mut(&mut self, station: StationId) -> Result<&mut Station, ShopError> {
        self.stations
            .get_mut(station.index())
            .ok_or(ShopError::UnknownStation(station))
    }

    /// Lowest-index idle station.
    fn lowest_idle(&self) -> Option<StationId> {
        self.stations.iter().find(|s| s.is_idle()).map(Station::id)
    }

    fn bind(&mut self, station: StationId, customer: CustomerId) -> Result<(), ShopError> {
        self.station_mut(station)?.assign(customer)?;
        self.counters.assigned += 1;
        let seats_available = self.waiting_room.available();
        self.emit(
            Actor::Customer(customer),
            ShopEventKind::Assigned {
                station,
                seats_available,
            },
        );
        Ok(())
    }

    /// Admit an arriving customer: assign, queue or reject.
    pub(crate) fn admit(&mut self, customer: CustomerId) -> Result<Admission, ShopError> {
        if self.closed {
            return Err(ShopError::Closed);
        }
        self.counters.arrivals += 1;

        if let Some(station) = self.lowest_idle() {
            debug_assert!(self.waiting_room.is_empty());
            self.bind(station, customer)?;
            return Ok(Admission::Assigned(station));
        }

        if self.waiting_room.push(customer).is_err() {
            self.counters.drops += 1;
            self.emit(Actor::Customer(customer), ShopEventKind::Rejected);
            return Ok(Admission::Rejected);
        }
        let seats_available = self.waiting_room.available();
        self.emit(
            Actor::Customer(customer),
            ShopEventKind::Queued { seats_available },
        );
        Ok(Admission::Queued)
    }

    /// Station a customer is bound to, if any.
    pub(crate) fn station_of(&self, customer: CustomerId) -> Option<StationId> {
        self.stations
            .iter()
            .find(|s| s.occupant() == Some(customer))
            .map(Station::id)
    }

    pub(crate) fn is_waiting(&self, customer: CustomerId) -> bool {
        self.waiting_room.contains(customer)
    }

    /// Customer the station should start serving, if one is bound to it.
    pub(crate) fn assigned_customer(
        &self,
        station: StationId,
    ) -> Result<Option<CustomerId>, ShopError> {
        let st = self.station(station)?;
        match (st.phase(), st.occupant()) {
            (StationPhase::Idle, _) => Ok(None),
            (StationPhase::Serving, occupant) => Ok(occupant),
            (StationPhase::AwaitingPayment, _) => Err(ShopError::violation(
                station,
                "awaiting a new customer before the previous one was released",
            )),
        }
    }

    /// `Serving -> AwaitingPayment`.
    pub(crate) fn finish_service(&mut self, station: StationId) -> Result<CustomerId, ShopError> {
        let customer = self.station_mut(station)?.finish_service()?;
        self.emit(
            Actor::Station(station),
            ShopEventKind::ServiceFinished { customer },
        );
        Ok(customer)
    }

    pub(crate) fn is_service_done(
        &self,
        station: StationId,
        customer: CustomerId,
    ) -> Result<bool, ShopError> {
        self.station(station)?.is_service_done(customer)
    }

    pub(crate) fn pay(&mut self, customer: CustomerId, station: StationId) -> Result<(), ShopError> {
        self.station_mut(station)?.record_payment(customer)?;
        self.counters.served += 1;
        self.emit(Actor::Customer(customer), ShopEventKind::Paid { station });
        Ok(())
    }

    pub(crate) fn is_paid(&self, station: StationId) -> Result<bool, ShopError> {
        Ok(self.station(station)?.is_paid())
    }

    /// `AwaitingPayment -> Idle`. If customers are queued, the earliest one
    /// is bound to this station before returning and is returned.
    pub(crate) fn release(&mut self, station: StationId) -> Result<Option<CustomerId>, ShopError> {
        self.station_mut(station)?.release()?;
        let next = self.waiting_room.pop();
        if let Some(customer) = next {
            self.bind(station, customer)?;
        }
        self.emit(Actor::Station(station), ShopEventKind::Released { next });
        Ok(next)
    }

    /// Close the shop. Returns the queued customers that were sent home.
    pub(crate) fn close(&mut self) -> Vec<CustomerId> {
        if self.closed {
            return Vec::new();
        }
        self.closed = true;
        let abandoned = self.waiting_room.drain();
        self.counters.abandoned += abandoned.len() as u64;
        for &customer in &abandoned {
            self.emit(Actor::Customer(customer), ShopEventKind::Abandoned);
        }
        abandoned
    }

    pub(crate) fn stats(&self) -> ShopStats {
        ShopStats {
            capacity: self.waiting_room.capacity(),
            station_count: self.stations.len(),
            waiting: self.waiting_room.len(),
            busy_stations: self.stations.iter().filter(|s| !s.is_idle()).count(),
            arrivals: self.counters.arrivals,
            assigned: self.counters.assigned,
            served: self.counters.served,
            drops: self.counters.drops,
            abandoned: self.counters.abandoned,
        }
    }

    /// Verify the structural invariants. Used by tests and debug assertions.
    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        if self.waiting_room.len() > self.waiting_room.capacity() {
            return Err("waiting room over capacity".into());
        }
        let mut occupants = Vec::with_capacity(self.stations.len());
        for station in &self.stations {
            if station.is_idle() != station.occupant().is_none() {
                return Err(format!("station {} idle/occupant mismatch", station.id()));
            }
            if let Some(customer) = station.occupant() {
                if occupants.contains(&customer) {
                    return Err(format!("customer {customer} occupies two stations"));
                }
                if self.waiting_room.contains(customer) {
                    return Err(format!("customer {customer} both queued and seated"));
                }
                occupants.push(customer);
            }
        }
        if self.lowest_idle().is_some() && !self.waiting_room.is_empty() {
            return Err("idle station while customers are queued".into());
        }
        if !self.stats().is_balanced() {
            return Err("arrivals not accounted for".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::InMemoryEventSink;

    fn serve_to_idle(state: &mut ShopState, station: StationId) -> Option<CustomerId> {
        let customer = state.finish_service(station).unwrap();
        state.pay(customer, station).unwrap();
        state.release(station).unwrap()
    }

    #[test]
    fn test_zero_stations_rejected() {
        assert!(matches!(
            ShopState::new(3, 0),
            Err(ShopError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_lowest_index_wins() {
        let mut state = ShopState::new(2, 3).unwrap();
        assert_eq!(state.admit(CustomerId(1)).unwrap(), Admission::Assigned(StationId(0)));
        assert_eq!(state.admit(CustomerId(2)).unwrap(), Admission::Assigned(StationId(1)));
        assert_eq!(state.admit(CustomerId(3)).unwrap(), Admission::Assigned(StationId(2)));

        // Free station 1 first, then station 0: next arrival takes 0.
        serve_to_idle(&mut state, StationId(1));
        serve_to_idle(&mut state, StationId(0));
        assert_eq!(state.admit(CustomerId(4)).unwrap(), Admission::Assigned(StationId(0)));
        state.check_invariants().unwrap();
    }

    #[test]
    fn test_queue_then_reject() {
        let mut state = ShopState::new(1, 1).unwrap();
        assert_eq!(state.admit(CustomerId(1)).unwrap(), Admission::Assigned(StationId(0)));
        assert_eq!(state.admit(CustomerId(2)).unwrap(), Admission::Queued);
        assert_eq!(state.admit(CustomerId(3)).unwrap(), Admission::Rejected);
        assert_eq!(state.drop_count(), 1);
        assert!(state.is_waiting(CustomerId(2)));
        state.check_invariants().unwrap();
    }

    #[test]
    fn test_zero_capacity_rejects_when_busy() {
        let mut state = ShopState::new(0, 1).unwrap();
        state.admit(CustomerId(1)).unwrap();
        assert_eq!(state.admit(CustomerId(2)).unwrap(), Admission::Rejected);
    }

    #[test]
    fn test_release_hands_off_in_fifo_order() {
        let mut state = ShopState::new(3, 1).unwrap();
        state.admit(CustomerId(10)).unwrap();
        for id in [11, 12, 13] {
            assert_eq!(state.admit(CustomerId(id)).unwrap(), Admission::Queued);
        }

        assert_eq!(serve_to_idle(&mut state, StationId(0)), Some(CustomerId(11)));
        assert_eq!(state.station_of(CustomerId(11)), Some(StationId(0)));
        assert!(!state.is_waiting(CustomerId(11)));
        state.check_invariants().unwrap();

        assert_eq!(serve_to_idle(&mut state, StationId(0)), Some(CustomerId(12)));
        assert_eq!(serve_to_idle(&mut state, StationId(0)), Some(CustomerId(13)));
        assert_eq!(serve_to_idle(&mut state, StationId(0)), None);

        let stats = state.stats();
        assert_eq!(stats.served, 4);
        assert_eq!(stats.assigned, 4);
        assert_eq!(stats.busy_stations, 0);
        state.check_invariants().unwrap();
    }

    #[test]
    fn test_double_release_is_violation() {
        let mut state = ShopState::new(1, 1).unwrap();
        state.admit(CustomerId(1)).unwrap();
        serve_to_idle(&mut state, StationId(0));
        let err = state.release(StationId(0)).unwrap_err();
        assert!(matches!(err, ShopError::ProtocolViolation { .. }));
    }

    #[test]
    fn test_unknown_station() {
        let mut state = ShopState::new(1, 2).unwrap();
        assert_eq!(
            state.finish_service(StationId(5)).unwrap_err(),
            ShopError::UnknownStation(StationId(5))
        );
    }

    #[test]
    fn test_assigned_customer_tracks_phase() {
        let mut state = ShopState::new(1, 1).unwrap();
        assert_eq!(state.assigned_customer(StationId(0)).unwrap(), None);
        state.admit(CustomerId(8)).unwrap();
        assert_eq!(state.assigned_customer(StationId(0)).unwrap(), Some(CustomerId(8)));
        state.finish_service(StationId(0)).unwrap();
        assert!(state.assigned_customer(StationId(0)).is_err());
    }

    #[test]
    fn test_close_sends_queue_home() {
        let mut state = ShopState::new(2, 1).unwrap();
        state.admit(CustomerId(1)).unwrap();
        state.admit(CustomerId(2)).unwrap();
        state.admit(CustomerId(3)).unwrap();

        assert_eq!(state.close(), vec![CustomerId(2), CustomerId(3)]);
        assert!(state.close().is_empty());
        assert_eq!(state.admit(CustomerId(4)).unwrap_err(), ShopError::Closed);

        let stats = state.stats();
        assert_eq!(stats.abandoned, 2);
        assert_eq!(stats.waiting, 0);
        // The seated customer can still finish.
        assert_eq!(serve_to_idle(&mut state, StationId(0)), None);
        state.check_invariants().unwrap();
    }

    #[test]
    fn test_events_are_sequenced() {
        let sink = InMemoryEventSink::new(64);
        let mut state = ShopState::new(1, 1).unwrap();
        state.set_event_sink(Box::new(sink.clone()));

        state.admit(CustomerId(1)).unwrap();
        state.admit(CustomerId(2)).unwrap();
        state.admit(CustomerId(3)).unwrap();
        serve_to_idle(&mut state, StationId(0));

        let events = sink.events();
        assert!(events.windows(2).all(|w| w[0].seq < w[1].seq));
        assert_eq!(
            sink.assignment_order(),
            vec![(CustomerId(1), StationId(0)), (CustomerId(2), StationId(0))]
        );
        assert!(events
            .iter()
            .any(|e| e.actor == Actor::Customer(CustomerId(3)) && e.kind == ShopEventKind::Rejected));
    }
}
