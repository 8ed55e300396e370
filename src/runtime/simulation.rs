//! Full simulation runs: spawn stations and customers, collect a report.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};
use uuid::Uuid;

use crate::builders::build_backend;
use crate::config::{BackendConfig, SimulationConfig};
use crate::core::{EventSink, ShopError, ShopProtocol, ShopStats};
use crate::runtime::actors::{run_customer, run_station, CustomerOutcome, FixedService, Service};
use crate::util::ids::{CustomerId, StationId};

/// Outcome of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Unique identifier of this run.
    pub run_id: String,
    /// Back end that was driven.
    pub backend: BackendConfig,
    /// Waiting-room seats.
    pub capacity: usize,
    /// Number of stations.
    pub station_count: usize,
    /// Customers spawned.
    pub customers: usize,
    /// Customers that were served and paid.
    pub served: u64,
    /// Customers turned away on arrival.
    pub rejected: u64,
    /// Customers sent home when the shop closed.
    pub abandoned: u64,
    /// Customers served by each station, indexed by station id.
    pub served_per_station: Vec<u64>,
    /// Final shop statistics.
    pub stats: ShopStats,
    /// Wall time of the run in milliseconds.
    pub elapsed_ms: u128,
}

/// Drives one configured run.
pub struct Simulation {
    config: SimulationConfig,
    events: Option<Box<dyn EventSink>>,
}

impl Simulation {
    /// Create a simulation from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::InvalidConfig` if the configuration is invalid.
    pub fn new(config: SimulationConfig) -> Result<Self, ShopError> {
        config.validate().map_err(ShopError::InvalidConfig)?;
        Ok(Self {
            config,
            events: None,
        })
    }

    /// Attach an event sink to the shop the run creates.
    #[must_use]
    pub fn with_events(mut self, sink: Box<dyn EventSink>) -> Self {
        self.events = Some(sink);
        self
    }

    /// Run to completion with fixed-duration service.
    ///
    /// # Errors
    ///
    /// Returns the first error any actor reports, or `ShopError::Internal`
    /// if an actor thread panics or cannot be spawned.
    pub fn run(self) -> Result<SimulationReport, ShopError> {
        let service = FixedService::from_micros(self.config.service_time_us);
        self.run_with_service(service)
    }

    /// Run to completion with custom service work.
    ///
    /// # Errors
    ///
    /// Returns the first error any actor reports, or `ShopError::Internal`
    /// if an actor thread panics or cannot be spawned. A panicking service
    /// closes the shop (see [`run_station`]), so the run still returns.
    pub fn run_with_service<V>(self, service: V) -> Result<SimulationReport, ShopError>
    where
        V: Service + 'static,
    {
        let Self { config, events } = self;
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("simulation", run_id = %run_id);
        let _enter = span.enter();

        let backend = build_backend(config.backend, &config.shop, events)?;
        let shop = Arc::clone(&backend.shop);
        let service = Arc::new(service);
        let started = Instant::now();
        info!(
            stations = config.shop.station_count,
            capacity = config.shop.capacity,
            customers = config.customers,
            "simulation starting"
        );

        let stations = (0..config.shop.station_count)
            .map(|idx| spawn_station(&shop, StationId(idx), &service))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rng = rand::rng();
        let mut customers = Vec::with_capacity(config.customers);
        for idx in 0..config.customers {
            if config.max_arrival_gap_us > 0 {
                let gap = rng.random_range(0..config.max_arrival_gap_us);
                thread::sleep(Duration::from_micros(gap));
            }
            let id = CustomerId(idx as u64 + 1);
            customers.push(spawn_customer(&shop, id)?);
        }

        let mut first_error = None;
        let (mut served, mut rejected, mut abandoned) = (0u64, 0u64, 0u64);
        for handle in customers {
            match join(handle) {
                Ok(CustomerOutcome::Served(_)) => served += 1,
                Ok(CustomerOutcome::Rejected) => rejected += 1,
                Ok(CustomerOutcome::Abandoned) => abandoned += 1,
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        shop.close();
        let mut served_per_station = Vec::with_capacity(stations.len());
        for handle in stations {
            match join(handle) {
                Ok(count) => served_per_station.push(count),
                Err(e) => {
                    served_per_station.push(0);
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        drop(shop);
        let stats = backend.finish()?;
        let report = SimulationReport {
            run_id,
            backend: config.backend,
            capacity: config.shop.capacity,
            station_count: config.shop.station_count,
            customers: config.customers,
            served,
            rejected,
            abandoned,
            served_per_station,
            stats,
            elapsed_ms: started.elapsed().as_millis(),
        };
        info!(
            served = report.served,
            rejected = report.rejected,
            elapsed_ms = report.elapsed_ms,
            "simulation finished"
        );
        Ok(report)
    }
}

/// Run `base` once per waiting-room capacity in `capacities`.
///
/// # Errors
///
/// Stops at the first failing run and returns its error.
pub fn sweep_capacity(
    base: &SimulationConfig,
    capacities: RangeInclusive<usize>,
) -> Result<Vec<SimulationReport>, ShopError> {
    capacities
        .map(|capacity| {
            let mut config = base.clone();
            config.shop.capacity = capacity;
            Simulation::new(config)?.run()
        })
        .collect()
}

fn spawn_station<V>(
    shop: &Arc<dyn ShopProtocol>,
    station: StationId,
    service: &Arc<V>,
) -> Result<JoinHandle<Result<u64, ShopError>>, ShopError>
where
    V: Service + 'static,
{
    let shop = Arc::clone(shop);
    let service = Arc::clone(service);
    thread::Builder::new()
        .name(format!("station-{station}"))
        .spawn(move || run_station(shop.as_ref(), station, service.as_ref()))
        .map_err(|e| ShopError::Internal(format!("failed to spawn station {station}: {e}")))
}

fn spawn_customer(
    shop: &Arc<dyn ShopProtocol>,
    customer: CustomerId,
) -> Result<JoinHandle<Result<CustomerOutcome, ShopError>>, ShopError> {
    let shop = Arc::clone(shop);
    thread::Builder::new()
        .name(format!("customer-{customer}"))
        .spawn(move || run_customer(shop.as_ref(), customer))
        .map_err(|e| ShopError::Internal(format!("failed to spawn customer {customer}: {e}")))
}

fn join<T>(handle: JoinHandle<Result<T, ShopError>>) -> Result<T, ShopError> {
    let name = handle.thread().name().unwrap_or("actor").to_string();
    handle
        .join()
        .map_err(|_| ShopError::Internal(format!("{name} panicked")))?
}
