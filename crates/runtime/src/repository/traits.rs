//! Repository contract for durable player records.

use duckhunt_core::{Player, PlayerId};

use super::Result;

/// Durable storage for player records.
///
/// Implementations are synchronous. The runtime calls them from the save
/// scheduler on a blocking thread and from the game worker on first contact
/// with a nick, never while a gameplay mutation is half applied.
pub trait PlayerStore: Send + Sync {
    /// Load a saved player, `None` when the nick has never been saved.
    fn load(&self, id: &PlayerId) -> Result<Option<Player>>;

    /// Save one player, replacing any previous record.
    fn save(&self, player: &Player) -> Result<()>;

    /// Save a batch of players.
    ///
    /// Stores that rewrite a whole document should override this so a
    /// batch costs one write.
    fn save_all(&self, players: &[Player]) -> Result<()> {
        for player in players {
            self.save(player)?;
        }
        Ok(())
    }

    /// Every nick with a saved record.
    fn list_ids(&self) -> Result<Vec<PlayerId>>;
}
