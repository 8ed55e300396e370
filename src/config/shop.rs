//! Shop and simulation configuration structures.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Waiting-room seats when none are configured.
pub const DEFAULT_CAPACITY: usize = 3;
/// Stations when none are configured.
pub const DEFAULT_STATION_COUNT: usize = 1;
/// Upper bound (exclusive) of the random gap between customer arrivals.
pub const DEFAULT_MAX_ARRIVAL_GAP_US: u64 = 1000;

const fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

const fn default_station_count() -> usize {
    DEFAULT_STATION_COUNT
}

const fn default_max_arrival_gap_us() -> u64 {
    DEFAULT_MAX_ARRIVAL_GAP_US
}

/// Which shop implementation a simulation drives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendConfig {
    /// Mutex and condition-variable monitor.
    #[default]
    Monitor,
    /// Single arbitrating thread fed over channels.
    Arbiter,
}

impl FromStr for BackendConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monitor" => Ok(Self::Monitor),
            "arbiter" => Ok(Self::Arbiter),
            other => Err(format!("unknown backend `{other}`")),
        }
    }
}

/// Shop dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Waiting-room seats. Zero is allowed: customers then only get in
    /// when a station is idle.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Number of stations. Must be at least one.
    #[serde(default = "default_station_count")]
    pub station_count: usize,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            station_count: DEFAULT_STATION_COUNT,
        }
    }
}

impl ShopConfig {
    /// Create a configuration with explicit dimensions.
    #[must_use]
    pub const fn new(capacity: usize, station_count: usize) -> Self {
        Self {
            capacity,
            station_count,
        }
    }

    /// Validate shop dimensions.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.station_count == 0 {
            return Err("station_count must be greater than 0".into());
        }
        Ok(())
    }
}

/// Parameters for a full customer/station simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Shop dimensions.
    #[serde(default)]
    pub shop: ShopConfig,
    /// Number of customer actors to spawn.
    pub customers: usize,
    /// Time each station spends serving one customer, in microseconds.
    #[serde(default)]
    pub service_time_us: u64,
    /// Customers arrive after a random pause in `[0, max_arrival_gap_us)`.
    #[serde(default = "default_max_arrival_gap_us")]
    pub max_arrival_gap_us: u64,
    /// Shop implementation to drive.
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            shop: ShopConfig::default(),
            customers: 10,
            service_time_us: 1000,
            max_arrival_gap_us: DEFAULT_MAX_ARRIVAL_GAP_US,
            backend: BackendConfig::Monitor,
        }
    }
}

impl SimulationConfig {
    /// Validate shop dimensions.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        self.shop
            .validate()
            .map_err(|e| format!("shop invalid: {e}"))
    }

    /// Parse simulation configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from `SHOP_*` environment variables, loading a
    /// `.env` file first if one exists. Unset variables keep their defaults.
    ///
    /// Recognised variables: `SHOP_CAPACITY`, `SHOP_STATIONS`,
    /// `SHOP_CUSTOMERS`, `SHOP_SERVICE_TIME_US`, `SHOP_MAX_ARRIVAL_GAP_US`,
    /// `SHOP_BACKEND` (`monitor` or `arbiter`).
    ///
    /// # Errors
    ///
    /// Returns a message naming the variable that failed to parse or validate.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns a message naming the key that failed to parse or validate.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: FromStr>(key: &str, raw: Option<String>) -> Result<Option<T>, String>
        where
            T::Err: std::fmt::Display,
        {
            raw.map(|v| {
                v.trim()
                    .parse::<T>()
                    .map_err(|e| format!("{key}: invalid value `{v}`: {e}"))
            })
            .transpose()
        }

        let mut cfg = Self::default();
        if let Some(v) = parse("SHOP_CAPACITY", lookup("SHOP_CAPACITY"))? {
            cfg.shop.capacity = v;
        }
        if let Some(v) = parse("SHOP_STATIONS", lookup("SHOP_STATIONS"))? {
            cfg.shop.station_count = v;
        }
        if let Some(v) = parse("SHOP_CUSTOMERS", lookup("SHOP_CUSTOMERS"))? {
            cfg.customers = v;
        }
        if let Some(v) = parse("SHOP_SERVICE_TIME_US", lookup("SHOP_SERVICE_TIME_US"))? {
            cfg.service_time_us = v;
        }
        if let Some(v) = parse("SHOP_MAX_ARRIVAL_GAP_US", lookup("SHOP_MAX_ARRIVAL_GAP_US"))? {
            cfg.max_arrival_gap_us = v;
        }
        if let Some(v) = parse("SHOP_BACKEND", lookup("SHOP_BACKEND"))? {
            cfg.backend = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}
