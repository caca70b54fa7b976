//! Presence oracle: who is currently in which channel.

use crate::state::{ChannelId, PlayerId};

/// Answers whether a player is in a channel.
///
/// Consulted before any item is applied to another player and when choosing
/// friendly-fire victims.
pub trait PresenceOracle {
    fn is_present(&self, player: &PlayerId, channel: &ChannelId) -> bool;
}

/// Treats every known player as present everywhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenPresence;

impl PresenceOracle for OpenPresence {
    fn is_present(&self, _player: &PlayerId, _channel: &ChannelId) -> bool {
        true
    }
}

impl<F> PresenceOracle for F
where
    F: Fn(&PlayerId, &ChannelId) -> bool,
{
    fn is_present(&self, player: &PlayerId, channel: &ChannelId) -> bool {
        self(player, channel)
    }
}
