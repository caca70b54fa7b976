//! Read-only collaborators the engine consults.
//!
//! Configuration, the level table and the shop catalog are static data. The
//! presence oracle and the RNG come from the host. [`GameEnv`] bundles the
//! static parts so operations take one environment argument.
mod presence;
mod rng;

pub use presence::{OpenPresence, PresenceOracle};
pub use rng::{PcgRng, RngOracle, ScriptedRolls};

use crate::config::GameConfig;
use crate::shop::ShopCatalog;
use crate::stats::{LevelTable, ModifierEngine};

/// Static data and oracles required by combat and the shop.
#[derive(Clone, Copy)]
pub struct GameEnv<'a> {
    pub config: &'a GameConfig,
    pub levels: &'a LevelTable,
    pub catalog: &'a ShopCatalog,
    pub presence: &'a dyn PresenceOracle,
}

impl<'a> GameEnv<'a> {
    pub fn new(
        config: &'a GameConfig,
        levels: &'a LevelTable,
        catalog: &'a ShopCatalog,
        presence: &'a dyn PresenceOracle,
    ) -> Self {
        Self {
            config,
            levels,
            catalog,
            presence,
        }
    }

    pub fn modifiers(&self) -> ModifierEngine<'a> {
        ModifierEngine::new(self.config, self.levels)
    }
}

impl core::fmt::Debug for GameEnv<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GameEnv")
            .field("config", self.config)
            .field("levels", &self.levels.max_level())
            .field("catalog", &self.catalog.len())
            .finish_non_exhaustive()
    }
}
