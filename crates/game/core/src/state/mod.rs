//! Authoritative in-memory game state.
//!
//! Players are keyed by lowercased nickname and ducks by channel. Every
//! mutation runs synchronously to completion inside the engine operations, so
//! no entity is ever observed half-updated.
mod duck;
mod effects;
mod gear;
mod ids;
mod inventory;
mod player;

use std::collections::BTreeMap;

pub use duck::{Duck, DuckFate, DuckKind};
pub use effects::{EffectContract, EffectKind, TemporaryEffect, TemporaryEffects};
pub use gear::Gear;
pub use ids::{ChannelId, DuckId, PlayerId, Timestamp};
pub use inventory::{Inventory, ItemId};
pub use player::{HuntStats, Player, Weapon};

use crate::config::PlayerDefaults;
use crate::ducks::DuckLifecycleManager;

/// Players currently held in memory.
///
/// Ordered by id so that any random pick over the roster is reproducible for
/// a given RNG stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    players: BTreeMap<PlayerId, Player>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn get_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.players.contains_key(id)
    }

    /// Returns the player, creating it from `defaults` on first contact.
    pub fn get_or_create(&mut self, id: &PlayerId, defaults: &PlayerDefaults) -> &mut Player {
        self.players
            .entry(id.clone())
            .or_insert_with(|| Player::new(id.clone(), defaults))
    }

    /// Two distinct players, mutably. `None` if either is missing or
    /// `a == b`.
    pub fn pair_mut(&mut self, a: &PlayerId, b: &PlayerId) -> Option<(&mut Player, &mut Player)> {
        if a == b {
            return None;
        }
        let mut first = None;
        let mut second = None;
        for (id, player) in self.players.iter_mut() {
            if id == a {
                first = Some(player);
            } else if id == b {
                second = Some(player);
            }
        }
        Some((first?, second?))
    }

    /// Inserts or replaces a player record.
    pub fn insert(&mut self, player: Player) -> Option<Player> {
        self.players.insert(player.id.clone(), player)
    }

    pub fn remove(&mut self, id: &PlayerId) -> Option<Player> {
        self.players.remove(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.players.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Everything the engine mutates: the player roster and the live ducks.
#[derive(Clone, Debug, Default)]
pub struct GameState {
    pub roster: Roster,
    pub ducks: DuckLifecycleManager,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }
}
