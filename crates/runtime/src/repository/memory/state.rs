//! In-memory PlayerStore implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use duckhunt_core::{Player, PlayerId};

use crate::repository::{PlayerStore, RepositoryError, Result};

/// In-memory implementation of PlayerStore.
///
/// Records live as long as the store. Used when no save file is configured
/// and by tests that inspect what the save scheduler wrote.
pub struct InMemoryPlayerStore {
    players: RwLock<HashMap<PlayerId, Player>>,
}

impl InMemoryPlayerStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            players: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store pre-populated with `players`.
    pub fn with_players(players: impl IntoIterator<Item = Player>) -> Self {
        let players = players.into_iter().map(|p| (p.id.clone(), p)).collect();
        Self {
            players: RwLock::new(players),
        }
    }

    /// Number of saved records.
    pub fn len(&self) -> usize {
        self.players.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryPlayerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerStore for InMemoryPlayerStore {
    fn load(&self, id: &PlayerId) -> Result<Option<Player>> {
        let players = self
            .players
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(players.get(id).cloned())
    }

    fn save(&self, player: &Player) -> Result<()> {
        let mut players = self
            .players
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        players.insert(player.id.clone(), player.clone());
        Ok(())
    }

    fn list_ids(&self) -> Result<Vec<PlayerId>> {
        let players = self
            .players
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut ids: Vec<PlayerId> = players.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
