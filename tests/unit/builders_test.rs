//! Tests for builder modules

use shop_monitor::builders::{build_backend, build_shop};
use shop_monitor::config::{BackendConfig, ShopConfig};
use shop_monitor::core::{Arrival, InMemoryEventSink, ShopError, ShopProtocol};
use shop_monitor::util::{CustomerId, StationId};

#[test]
fn test_build_shop_from_config() {
    let shop = build_shop(&ShopConfig::new(4, 2), None).unwrap();
    assert_eq!(shop.capacity(), 4);
    assert_eq!(shop.station_count(), 2);
}

#[test]
fn test_build_shop_rejects_zero_stations() {
    assert!(matches!(
        build_shop(&ShopConfig::new(4, 0), None),
        Err(ShopError::InvalidConfig(_))
    ));
}

#[test]
fn test_build_shop_with_events() {
    let sink = InMemoryEventSink::new(16);
    let shop = build_shop(&ShopConfig::new(1, 1), Some(Box::new(sink.clone()))).unwrap();
    shop.arrive(CustomerId(1)).unwrap();
    assert_eq!(sink.assignment_order(), vec![(CustomerId(1), StationId(0))]);
}

#[test]
fn test_build_each_backend() {
    for backend in [BackendConfig::Monitor, BackendConfig::Arbiter] {
        let built = build_backend(backend, &ShopConfig::new(0, 1), None).unwrap();
        assert_eq!(built.has_arbiter(), backend == BackendConfig::Arbiter);
        let shop = &built.shop;
        assert_eq!(
            shop.arrive(CustomerId(1)).unwrap(),
            Arrival::Assigned(StationId(0))
        );
        assert_eq!(shop.arrive(CustomerId(2)).unwrap(), Arrival::Rejected);
        assert_eq!(shop.drop_count(), 1);
        shop.close();
    }
}

#[test]
fn test_finish_returns_final_stats() {
    for backend in [BackendConfig::Monitor, BackendConfig::Arbiter] {
        let built = build_backend(backend, &ShopConfig::new(0, 1), None).unwrap();
        built.shop.arrive(CustomerId(1)).unwrap();
        built.shop.arrive(CustomerId(2)).unwrap();

        let stats = built.finish().unwrap();
        assert_eq!(stats.arrivals, 2);
        assert_eq!(stats.assigned, 1);
        assert_eq!(stats.drops, 1);
        assert!(stats.is_balanced());
    }
}

#[test]
fn test_build_backend_rejects_zero_stations() {
    for backend in [BackendConfig::Monitor, BackendConfig::Arbiter] {
        assert!(matches!(
            build_backend(backend, &ShopConfig::new(1, 0), None),
            Err(ShopError::InvalidConfig(_))
        ));
    }
}
