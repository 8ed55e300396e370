//! Actor drivers and alternative back ends.

pub mod actors;
pub mod arbiter;
pub mod simulation;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_driver;

pub use actors::{run_customer, run_station, CustomerOutcome, FixedService, Service};
pub use arbiter::ArbiterShop;
pub use simulation::{sweep_capacity, Simulation, SimulationReport};
#[cfg(feature = "tokio-runtime")]
pub use tokio_driver::AsyncShop;
