//! Tests for the shop event journal

use shop_monitor::core::{Actor, InMemoryEventSink, Shop, ShopEvent, ShopEventKind, ShopProtocol};
use shop_monitor::util::{CustomerId, StationId};

fn event(actor: Actor, kind: ShopEventKind) -> ShopEvent {
    ShopEvent {
        seq: 0,
        at_ms: 0,
        actor,
        kind,
    }
}

#[test]
fn test_customer_event_lines() {
    let queued = event(
        Actor::Customer(CustomerId(3)),
        ShopEventKind::Queued { seats_available: 2 },
    );
    assert_eq!(
        queued.to_string(),
        "customer[3]: takes a waiting chair. # waiting seats available = 2"
    );

    let rejected = event(Actor::Customer(CustomerId(4)), ShopEventKind::Rejected);
    assert_eq!(
        rejected.to_string(),
        "customer[4]: leaves the shop because of no available waiting chairs."
    );
}

#[test]
fn test_station_event_lines() {
    let sleeping = event(Actor::Station(StationId(0)), ShopEventKind::Sleeping);
    assert_eq!(sleeping.to_string(), "station [0]: sleeps because of no customers.");

    let released = event(
        Actor::Station(StationId(1)),
        ShopEventKind::Released {
            next: Some(CustomerId(9)),
        },
    );
    assert_eq!(released.to_string(), "station [1]: calls in customer[9]");
}

#[test]
fn test_sink_keeps_sequence_order() {
    let sink = InMemoryEventSink::new(64);
    let shop = Shop::new(0, 1).unwrap().with_events(Box::new(sink.clone()));
    shop.arrive(CustomerId(1)).unwrap();
    shop.arrive(CustomerId(2)).unwrap();

    let events = sink.events();
    assert!(events.windows(2).all(|w| w[0].seq < w[1].seq));
    assert_eq!(events[0].actor, Actor::Customer(CustomerId(1)));
    assert!(matches!(
        events[0].kind,
        ShopEventKind::Assigned {
            station: StationId(0),
            seats_available: 0
        }
    ));
    assert_eq!(events[1].kind, ShopEventKind::Rejected);
}

#[test]
fn test_sink_drops_oldest_when_full() {
    let sink = InMemoryEventSink::new(2);
    let shop = Shop::new(0, 1).unwrap().with_events(Box::new(sink.clone()));
    for id in 1..=4 {
        shop.arrive(CustomerId(id)).unwrap();
    }
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].actor, Actor::Customer(CustomerId(4)));
    assert_eq!(events[1].kind, ShopEventKind::Rejected);
}

#[test]
fn test_events_serialize() {
    let json = serde_json::to_value(event(
        Actor::Station(StationId(2)),
        ShopEventKind::ServiceStarted {
            customer: CustomerId(5),
        },
    ))
    .unwrap();
    assert_eq!(json["actor"]["station"], 2);
    assert_eq!(json["kind"]["service_started"]["customer"], 5);
}
