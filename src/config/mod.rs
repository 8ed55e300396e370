//! Configuration models for the shop and its simulation driver.

pub mod shop;

pub use shop::{
    BackendConfig, ShopConfig, SimulationConfig, DEFAULT_CAPACITY, DEFAULT_MAX_ARRIVAL_GAP_US,
    DEFAULT_STATION_COUNT,
};
