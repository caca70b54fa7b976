//! Data-driven content definitions and loaders.
//!
//! This crate ships the stock data files under `data/` and loaders that turn
//! them into core types:
//! - Game configuration (TOML)
//! - Level progression table (RON)
//! - Shop catalog (RON)
//!
//! Every file is optional for the caller: missing sections fall back to the
//! built-in defaults defined in `duckhunt-core`.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentBundle, ContentFactory, LevelLoader, LoadResult, ShopLoader};

/// Directory holding the stock data files, resolved at compile time.
pub const STOCK_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");
