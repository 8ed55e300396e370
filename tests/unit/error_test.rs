//! Tests for error types

use shop_monitor::core::{AppResult, ShopError};
use shop_monitor::util::StationId;

#[test]
fn test_invalid_config_error() {
    let err = ShopError::InvalidConfig("station_count must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: station_count must be greater than 0"
    );
}

#[test]
fn test_unknown_station_error() {
    let err = ShopError::UnknownStation(StationId(4));
    assert_eq!(format!("{}", err), "unknown station 4");
}

#[test]
fn test_protocol_violation_error() {
    let err = ShopError::ProtocolViolation {
        station: StationId(1),
        reason: "station released twice".to_string(),
    };
    assert_eq!(
        format!("{}", err),
        "protocol violation at station 1: station released twice"
    );
}

#[test]
fn test_closed_error() {
    assert_eq!(format!("{}", ShopError::Closed), "shop is closed");
}

#[test]
fn test_internal_error() {
    let err = ShopError::Internal("customer-3 panicked".to_string());
    assert_eq!(format!("{}", err), "internal error: customer-3 panicked");
}

#[test]
fn test_converts_into_app_result() {
    fn fails() -> AppResult<()> {
        Err(ShopError::Closed.into())
    }
    let err = fails().unwrap_err();
    assert_eq!(err.downcast_ref::<ShopError>(), Some(&ShopError::Closed));
}
