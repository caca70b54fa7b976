//! Deterministic duck hunt rules shared by the runtime and offline tools.
//!
//! `duckhunt-core` defines the canonical game model (players, ducks, items,
//! temporary effects) and the pure operations that mutate it:
//! [`DuckLifecycleManager`] for spawning and departures, [`CombatResolver`]
//! for shoot/reload/befriend and [`ShopInventory`] for the item economy.
//! Every stat read goes through [`ModifierEngine`].
//!
//! The crate performs no I/O and reads no clock. Time arrives as a
//! [`Timestamp`] argument and randomness through an [`RngOracle`], so every
//! outcome is reproducible from its inputs.
pub mod combat;
pub mod config;
pub mod ducks;
pub mod env;
pub mod error;
pub mod shop;
pub mod state;
pub mod stats;

pub use combat::{
    BefriendOutcome, CombatResolver, FriendlyFire, HitReport, JamCause, Loot, MissReport,
    ReloadOutcome, ShootOutcome,
};
pub use config::{GameConfig, PlayerDefaults, ScalingPolicy, Window};
pub use ducks::{DuckLifecycleManager, attraction_percent, radar_recipients};
pub use env::{GameEnv, OpenPresence, PcgRng, PresenceOracle, RngOracle, ScriptedRolls};
pub use error::{ErrorSeverity, GameError};
pub use shop::{
    CatalogError, Delivery, EffectResult, ItemEffect, ItemRequest, PurchaseMode, PurchaseReceipt,
    SaleReceipt, ShopCatalog, ShopError, ShopInventory, ShopItem, TargetRule, UseReceipt,
};
pub use state::{
    ChannelId, Duck, DuckFate, DuckId, DuckKind, EffectKind, GameState, Gear, HuntStats, Inventory,
    ItemId, Player, PlayerId, Roster, TemporaryEffect, TemporaryEffects, Timestamp, Weapon,
};
pub use stats::{LevelSpec, LevelTable, LevelTableError, ModifierEngine, StatKind};
