//! Content factory for loading every data file from one directory.

use std::path::{Path, PathBuf};

use duckhunt_core::{GameConfig, LevelTable, ShopCatalog};

use crate::loaders::{ConfigLoader, LevelLoader, LoadResult, ShopLoader};

/// Everything the engine reads as static data.
#[derive(Clone, Debug, Default)]
pub struct ContentBundle {
    pub config: GameConfig,
    pub levels: LevelTable,
    pub catalog: ShopCatalog,
}

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── levels.ron
/// └── shop.ron
/// ```
///
/// A missing file falls back to the built-in default for that part. A file
/// that exists but does not parse is an error.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Factory over the data files shipped with this crate.
    pub fn stock() -> Self {
        Self::new(crate::STOCK_DATA_DIR)
    }

    /// Load game configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        self.load_or_default("config.toml", ConfigLoader::load)
    }

    /// Load the level table from `levels.ron`.
    pub fn load_levels(&self) -> LoadResult<LevelTable> {
        self.load_or_default("levels.ron", LevelLoader::load)
    }

    /// Load the shop catalog from `shop.ron`.
    pub fn load_catalog(&self) -> LoadResult<ShopCatalog> {
        self.load_or_default("shop.ron", ShopLoader::load)
    }

    pub fn load_all(&self) -> LoadResult<ContentBundle> {
        Ok(ContentBundle {
            config: self.load_config()?,
            levels: self.load_levels()?,
            catalog: self.load_catalog()?,
        })
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn load_or_default<T: Default>(
        &self,
        file: &str,
        load: impl FnOnce(&Path) -> LoadResult<T>,
    ) -> LoadResult<T> {
        let path = self.data_dir.join(file);
        if path.exists() {
            load(&path)
        } else {
            Ok(T::default())
        }
    }
}
