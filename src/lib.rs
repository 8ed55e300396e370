//! # Shop Monitor
//!
//! A bounded-capacity resource-allocation monitor: many arriving customer
//! actors compete for a small, fixed pool of station servers, mediated by a
//! waiting room with a fixed number of seats.
//!
//! ## Protocol
//!
//! - A customer calls `arrive`. It is bound to the lowest-index idle
//!   station, seated in the waiting room until a station frees up, or
//!   rejected (counted in `drop_count`) when stations and seats are full.
//! - An assigned customer calls `depart`, which waits for service to finish
//!   and then pays.
//! - A station loops: `await_customer`, serve outside the lock,
//!   `finish_cut` (waits for payment), `release_station`.
//!
//! Queued customers are served strictly in arrival order. A released
//! station is handed to the head of the waiting room in the same critical
//! section, so a newcomer can never overtake someone already seated.
//!
//! ## Back ends
//!
//! - [`core::Shop`]: one `parking_lot::Mutex` plus per-station condition
//!   variables and one shared "station freed" condition.
//! - [`runtime::ArbiterShop`]: a single thread owning the state, fed over
//!   `crossbeam-channel` request/reply pairs.
//!
//! Both implement [`core::ShopProtocol`], which the actor drivers in
//! [`runtime`] are written against.
//!
//! ```rust
//! use shop_monitor::config::{ShopConfig, SimulationConfig};
//! use shop_monitor::runtime::Simulation;
//!
//! let config = SimulationConfig {
//!     shop: ShopConfig::new(3, 2),
//!     customers: 5,
//!     service_time_us: 0,
//!     max_arrival_gap_us: 0,
//!     ..SimulationConfig::default()
//! };
//! let report = Simulation::new(config).unwrap().run().unwrap();
//! assert_eq!(report.served + report.rejected, 5);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Shop state machine, monitor and protocol.
pub mod core;
/// Configuration models for the shop and simulations.
pub mod config;
/// Builders to construct shop back ends from configuration.
pub mod builders;
/// Actor drivers, the arbiter back end and the async facade.
pub mod runtime;
/// Shared utilities.
pub mod util;
