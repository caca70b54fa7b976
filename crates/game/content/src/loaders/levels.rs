//! Level table loader.

use std::path::Path;

use duckhunt_core::{LevelSpec, LevelTable};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Level table structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelFile {
    pub levels: Vec<LevelSpec>,
}

/// Loader for the XP progression from RON files.
pub struct LevelLoader;

impl LevelLoader {
    /// Load the level table from a RON file.
    ///
    /// Thresholds must be strictly ascending; the first row is level 1.
    pub fn load(path: &Path) -> LoadResult<LevelTable> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<LevelTable> {
        let file: LevelFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse level table RON: {}", e))?;

        LevelTable::new(file.levels).map_err(|e| anyhow::anyhow!("Invalid level table: {}", e))
    }
}
