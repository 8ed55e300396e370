//! Tokio facade over any blocking shop back end.
//!
//! Each protocol call may block for as long as another actor takes, so it
//! is moved onto tokio's blocking thread pool with `spawn_blocking`. The
//! async runtime's worker threads never wait on the shop.

use std::sync::Arc;

use crate::core::{Arrival, ShopError, ShopProtocol, ShopStats};
use crate::runtime::actors::CustomerOutcome;
use crate::util::ids::{CustomerId, StationId};

/// Async handle to a shared shop.
pub struct AsyncShop<S: ShopProtocol + ?Sized + 'static> {
    inner: Arc<S>,
}

impl<S: ShopProtocol + ?Sized + 'static> Clone for AsyncShop<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ShopProtocol + ?Sized + 'static> AsyncShop<S> {
    /// Wrap a shared shop.
    pub const fn new(inner: Arc<S>) -> Self {
        Self { inner }
    }

    /// Underlying blocking shop.
    #[must_use]
    pub const fn inner(&self) -> &Arc<S> {
        &self.inner
    }

    async fn blocking<T, F>(&self, call: F) -> Result<T, ShopError>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> Result<T, ShopError> + Send + 'static,
    {
        let shop = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || call(shop.as_ref()))
            .await
            .map_err(|e| ShopError::Internal(format!("blocking shop call failed: {e}")))?
    }

    /// Async [`ShopProtocol::arrive`].
    ///
    /// # Errors
    ///
    /// Same as the blocking call, plus `Internal` if the blocking task fails.
    pub async fn arrive(&self, customer: CustomerId) -> Result<Arrival, ShopError> {
        self.blocking(move |shop| shop.arrive(customer)).await
    }

    /// Async [`ShopProtocol::depart`].
    ///
    /// # Errors
    ///
    /// Same as the blocking call, plus `Internal` if the blocking task fails.
    pub async fn depart(&self, customer: CustomerId, station: StationId) -> Result<(), ShopError> {
        self.blocking(move |shop| shop.depart(customer, station)).await
    }

    /// Async [`ShopProtocol::await_customer`].
    ///
    /// # Errors
    ///
    /// Same as the blocking call, plus `Internal` if the blocking task fails.
    pub async fn await_customer(&self, station: StationId) -> Result<CustomerId, ShopError> {
        self.blocking(move |shop| shop.await_customer(station)).await
    }

    /// Async [`ShopProtocol::finish_cut`].
    ///
    /// # Errors
    ///
    /// Same as the blocking call, plus `Internal` if the blocking task fails.
    pub async fn finish_cut(&self, station: StationId) -> Result<(), ShopError> {
        self.blocking(move |shop| shop.finish_cut(station)).await
    }

    /// Async [`ShopProtocol::release_station`].
    ///
    /// # Errors
    ///
    /// Same as the blocking call, plus `Internal` if the blocking task fails.
    pub async fn release_station(&self, station: StationId) -> Result<(), ShopError> {
        self.blocking(move |shop| shop.release_station(station)).await
    }

    /// Arrive and, if assigned, depart.
    ///
    /// # Errors
    ///
    /// Same as [`run_customer`](crate::runtime::run_customer).
    pub async fn visit(&self, customer: CustomerId) -> Result<CustomerOutcome, ShopError> {
        self.blocking(move |shop| crate::runtime::actors::run_customer(shop, customer))
            .await
    }

    /// Cumulative number of rejected arrivals.
    #[must_use]
    pub fn drop_count(&self) -> u64 {
        self.inner.drop_count()
    }

    /// Current occupancy and counters.
    #[must_use]
    pub fn stats(&self) -> ShopStats {
        self.inner.stats()
    }

    /// Close the shop.
    pub fn close(&self) {
        self.inner.close();
    }
}
