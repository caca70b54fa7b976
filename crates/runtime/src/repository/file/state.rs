//! File-based PlayerStore implementation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use duckhunt_core::{Player, PlayerDefaults, PlayerId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::legacy;
use crate::repository::{PlayerStore, RepositoryError, Result};

/// On-disk layout of the current save format.
#[derive(Serialize, Deserialize)]
struct PlayerDocument {
    version: u32,
    players: BTreeMap<PlayerId, Player>,
}

/// Borrowing twin of [`PlayerDocument`] so a save does not clone the roster.
#[derive(Serialize)]
struct PlayerDocumentRef<'a> {
    version: u32,
    players: &'a BTreeMap<PlayerId, Player>,
}

/// File-based implementation of PlayerStore.
///
/// Every player lives in a single JSON document:
///
/// ```json
/// { "version": 2, "players": { "alice": { ... } } }
/// ```
///
/// The document is read once when the store opens and cached. Each save
/// rewrites the whole file through a temporary sibling and an atomic rename,
/// so a crash mid-write leaves the previous document intact.
///
/// Version 1 documents are migrated in memory at open time and written back
/// in the current layout on the next save.
pub struct FilePlayerStore {
    path: PathBuf,
    players: RwLock<BTreeMap<PlayerId, Player>>,
    migrated: bool,
}

impl FilePlayerStore {
    /// Opens (or prepares to create) the save document at `path`.
    ///
    /// `defaults` fill fields that legacy records do not carry.
    pub fn open(path: impl AsRef<Path>, defaults: &PlayerDefaults) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(RepositoryError::Io)?;
        }

        let (players, migrated) = if path.exists() {
            let text = fs::read_to_string(&path).map_err(RepositoryError::Io)?;
            Self::decode(&text, defaults)?
        } else {
            (BTreeMap::new(), false)
        };

        tracing::info!(
            "Opened player store {} with {} records{}",
            path.display(),
            players.len(),
            if migrated { " (migrated from version 1)" } else { "" }
        );

        Ok(Self {
            path,
            players: RwLock::new(players),
            migrated,
        })
    }

    /// Location of the save document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the document on disk was in the legacy layout when opened.
    pub fn was_migrated(&self) -> bool {
        self.migrated
    }

    fn decode(text: &str, defaults: &PlayerDefaults) -> Result<(BTreeMap<PlayerId, Player>, bool)> {
        if text.trim().is_empty() {
            return Ok((BTreeMap::new(), false));
        }

        let document: Value = serde_json::from_str(text)?;
        match document.get("version") {
            Some(Value::Number(n)) if n.as_u64() == Some(u64::from(Player::CURRENT_VERSION)) => {
                let typed: PlayerDocument = serde_json::from_value(document)?;
                Ok((typed.players, false))
            }
            Some(Value::Number(n)) if n.as_u64() == Some(1) => {
                Ok((legacy::migrate(&document, defaults)?, true))
            }
            // Version 1 writers stored the version as text, or not at all.
            None | Some(Value::String(_)) => Ok((legacy::migrate(&document, defaults)?, true)),
            Some(other) => Err(RepositoryError::UnsupportedVersion {
                found: other.to_string(),
                supported: Player::CURRENT_VERSION,
            }),
        }
    }

    fn persist(&self, players: &BTreeMap<PlayerId, Player>) -> Result<()> {
        let document = PlayerDocumentRef {
            version: Player::CURRENT_VERSION,
            players,
        };
        let bytes = serde_json::to_vec_pretty(&document)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, bytes).map_err(RepositoryError::Io)?;
        fs::rename(&temp_path, &self.path).map_err(RepositoryError::Io)?;

        tracing::debug!("Saved {} players to {}", players.len(), self.path.display());
        Ok(())
    }
}

impl PlayerStore for FilePlayerStore {
    fn load(&self, id: &PlayerId) -> Result<Option<Player>> {
        let players = self
            .players
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(players.get(id).cloned())
    }

    fn save(&self, player: &Player) -> Result<()> {
        self.save_all(std::slice::from_ref(player))
    }

    fn save_all(&self, batch: &[Player]) -> Result<()> {
        let mut players = self
            .players
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        let mut next = players.clone();
        for player in batch {
            next.insert(player.id.clone(), player.clone());
        }
        // Only commit to the cache once the file is on disk.
        self.persist(&next)?;
        *players = next;
        Ok(())
    }

    fn list_ids(&self) -> Result<Vec<PlayerId>> {
        let players = self
            .players
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(players.keys().cloned().collect())
    }
}
