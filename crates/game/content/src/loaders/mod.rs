//! Content loaders for reading game data from files.
//!
//! TOML carries the flat, override-friendly configuration. RON carries the
//! tabular data (levels, items) where enum variants read naturally.

pub mod config;
pub mod factory;
pub mod levels;
pub mod shop;

pub use config::ConfigLoader;
pub use factory::{ContentBundle, ContentFactory};
pub use levels::LevelLoader;
pub use shop::ShopLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
