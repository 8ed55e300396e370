//! Tests for configuration validation and loading

use std::collections::HashMap;

use shop_monitor::config::{
    BackendConfig, ShopConfig, SimulationConfig, DEFAULT_CAPACITY, DEFAULT_MAX_ARRIVAL_GAP_US,
    DEFAULT_STATION_COUNT,
};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_shop_config_defaults() {
    let cfg = ShopConfig::default();
    assert_eq!(cfg.capacity, DEFAULT_CAPACITY);
    assert_eq!(cfg.station_count, DEFAULT_STATION_COUNT);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_shop_config_zero_stations_invalid() {
    assert!(ShopConfig::new(3, 0).validate().is_err());
}

#[test]
fn test_shop_config_zero_capacity_valid() {
    assert!(ShopConfig::new(0, 1).validate().is_ok());
}

#[test]
fn test_simulation_config_from_json() {
    let cfg = SimulationConfig::from_json_str(
        r#"{"shop": {"capacity": 5, "station_count": 2}, "customers": 40, "backend": "arbiter"}"#,
    )
    .unwrap();
    assert_eq!(cfg.shop, ShopConfig::new(5, 2));
    assert_eq!(cfg.customers, 40);
    assert_eq!(cfg.service_time_us, 0);
    assert_eq!(cfg.max_arrival_gap_us, DEFAULT_MAX_ARRIVAL_GAP_US);
    assert_eq!(cfg.backend, BackendConfig::Arbiter);
}

#[test]
fn test_simulation_config_json_rejects_zero_stations() {
    let err = SimulationConfig::from_json_str(
        r#"{"shop": {"capacity": 5, "station_count": 0}, "customers": 1}"#,
    )
    .unwrap_err();
    assert!(err.contains("station_count"));
}

#[test]
fn test_simulation_config_json_parse_error() {
    let err = SimulationConfig::from_json_str("{not json").unwrap_err();
    assert!(err.starts_with("parse error"));
}

#[test]
fn test_simulation_config_from_lookup() {
    let cfg = SimulationConfig::from_lookup(lookup(&[
        ("SHOP_CAPACITY", "0"),
        ("SHOP_STATIONS", "4"),
        ("SHOP_CUSTOMERS", " 25 "),
        ("SHOP_BACKEND", "Arbiter"),
    ]))
    .unwrap();
    assert_eq!(cfg.shop, ShopConfig::new(0, 4));
    assert_eq!(cfg.customers, 25);
    assert_eq!(cfg.backend, BackendConfig::Arbiter);
    assert_eq!(cfg.service_time_us, SimulationConfig::default().service_time_us);
}

#[test]
fn test_simulation_config_from_lookup_bad_value() {
    let err = SimulationConfig::from_lookup(lookup(&[("SHOP_CUSTOMERS", "many")])).unwrap_err();
    assert!(err.contains("SHOP_CUSTOMERS"));
}

#[test]
fn test_simulation_config_from_lookup_zero_stations() {
    assert!(SimulationConfig::from_lookup(lookup(&[("SHOP_STATIONS", "0")])).is_err());
}

#[test]
fn test_backend_from_str() {
    assert_eq!("monitor".parse::<BackendConfig>(), Ok(BackendConfig::Monitor));
    assert_eq!(" ARBITER ".parse::<BackendConfig>(), Ok(BackendConfig::Arbiter));
    assert!("actors".parse::<BackendConfig>().is_err());
}
