//! Error types for shop operations.

use thiserror::Error;

use crate::util::ids::StationId;

/// Errors produced by the shop monitor, the arbiter and the drivers.
///
/// Turning a customer away is not an error; it is reported as
/// [`Arrival::Rejected`](crate::core::Arrival::Rejected).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShopError {
    /// Construction-time misuse such as a shop with zero stations.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A station id outside the shop's station arena.
    #[error("unknown station {0}")]
    UnknownStation(StationId),
    /// An actor called an operation out of protocol order.
    #[error("protocol violation at station {station}: {reason}")]
    ProtocolViolation {
        /// Station whose protocol was broken.
        station: StationId,
        /// What the caller did wrong.
        reason: String,
    },
    /// The shop has been closed and no longer serves customers.
    #[error("shop is closed")]
    Closed,
    /// Infrastructure failure (actor thread panic, arbiter gone, join error).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ShopError {
    pub(crate) fn violation(station: StationId, reason: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            station,
            reason: reason.into(),
        }
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
