//! Builders to construct shop back ends from configuration.

pub mod shop_builder;

pub use shop_builder::{build_backend, build_shop, ShopBackend};
