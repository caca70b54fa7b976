//! Event types for different topics.

use duckhunt_core::{ChannelId, Duck, DuckFate, PlayerId};
use serde::{Deserialize, Serialize};

/// Ducks appearing and leaving channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuckEvent {
    /// A duck entered a channel.
    Spawned {
        duck: Duck,
        /// Players in the channel holding an active duck radar.
        radar: Vec<PlayerId>,
    },

    /// A duck left a channel for good.
    Departed {
        duck: Duck,
        fate: DuckFate,
        /// Player whose action shot or befriended the duck.
        by: Option<PlayerId>,
    },
}

impl DuckEvent {
    pub fn channel(&self) -> &ChannelId {
        match self {
            Self::Spawned { duck, .. } | Self::Departed { duck, .. } => &duck.channel,
        }
    }
}

/// Outcome of save scheduler flushes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistenceEvent {
    /// Pending player records were written.
    Flushed { players: usize },

    /// A write failed. The records stay pending for the next window.
    Failed { pending: usize, error: String },
}
