//! Tests for utility functions

use shop_monitor::util::{init_tracing, now_ms, CustomerId, StationId};

#[test]
fn test_ids_display_as_numbers() {
    assert_eq!(CustomerId(17).to_string(), "17");
    assert_eq!(StationId(2).to_string(), "2");
}

#[test]
fn test_ids_from_integers() {
    assert_eq!(CustomerId::from(5), CustomerId(5));
    assert_eq!(StationId::from(3).index(), 3);
}

#[test]
fn test_ids_serialize_transparently() {
    assert_eq!(serde_json::to_string(&CustomerId(8)).unwrap(), "8");
    let station: StationId = serde_json::from_str("1").unwrap();
    assert_eq!(station, StationId(1));
}

#[test]
fn test_now_ms_is_monotone_enough() {
    let a = now_ms();
    let b = now_ms();
    assert!(a > 0);
    assert!(b >= a);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
}
