//! Builders to construct shops from configuration.

use std::sync::Arc;
use std::thread::JoinHandle;

use crate::config::{BackendConfig, ShopConfig};
use crate::core::{EventSink, Shop, ShopError, ShopProtocol, ShopStats};
use crate::runtime::ArbiterShop;

/// Build a lock-based shop monitor from configuration.
///
/// # Errors
///
/// Returns `ShopError::InvalidConfig` if the configuration is invalid.
pub fn build_shop(cfg: &ShopConfig, events: Option<Box<dyn EventSink>>) -> Result<Shop, ShopError> {
    let shop = Shop::from_config(cfg)?;
    Ok(match events {
        Some(sink) => shop.with_events(sink),
        None => shop,
    })
}

/// A constructed back end plus the arbiter thread backing it, if any.
pub struct ShopBackend {
    /// Shared handle every actor drives.
    pub shop: Arc<dyn ShopProtocol>,
    arbiter: Option<JoinHandle<ShopStats>>,
}

impl ShopBackend {
    /// Whether an arbiter thread backs this shop.
    #[must_use]
    pub const fn has_arbiter(&self) -> bool {
        self.arbiter.is_some()
    }

    /// Drop this handle and return the final statistics.
    ///
    /// For the arbiter back end this joins the arbiter thread, which exits
    /// once every clone of `shop` is gone. Drop all other clones first.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Internal` if the arbiter thread panicked.
    pub fn finish(self) -> Result<ShopStats, ShopError> {
        let Self { shop, arbiter } = self;
        let Some(handle) = arbiter else {
            return Ok(shop.stats());
        };
        drop(shop);
        handle
            .join()
            .map_err(|_| ShopError::Internal("arbiter thread panicked".into()))
    }
}

/// Build the selected back end behind the shared protocol trait.
///
/// # Errors
///
/// Returns `ShopError::InvalidConfig` for invalid dimensions, or
/// `ShopError::Internal` if the arbiter thread cannot be spawned.
pub fn build_backend(
    backend: BackendConfig,
    cfg: &ShopConfig,
    events: Option<Box<dyn EventSink>>,
) -> Result<ShopBackend, ShopError> {
    cfg.validate()
        .map_err(|e| ShopError::InvalidConfig(format!("config invalid: {e}")))?;

    match backend {
        BackendConfig::Monitor => Ok(ShopBackend {
            shop: Arc::new(build_shop(cfg, events)?),
            arbiter: None,
        }),
        BackendConfig::Arbiter => {
            let (shop, handle) = ArbiterShop::spawn(cfg, events)?;
            Ok(ShopBackend {
                shop: Arc::new(shop),
                arbiter: Some(handle),
            })
        }
    }
}
