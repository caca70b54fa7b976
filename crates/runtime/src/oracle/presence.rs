//! Channel membership fed by join and part notifications.

use std::collections::{BTreeMap, BTreeSet};

use duckhunt_core::{ChannelId, PlayerId, PresenceOracle};

/// Who is currently in which channel.
#[derive(Clone, Debug, Default)]
pub struct ChannelRoster {
    channels: BTreeMap<ChannelId, BTreeSet<PlayerId>>,
}

impl ChannelRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a join. Returns false when the player was already there.
    pub fn join(&mut self, player: PlayerId, channel: ChannelId) -> bool {
        self.channels.entry(channel).or_default().insert(player)
    }

    /// Records a part. Empty channels are forgotten.
    pub fn part(&mut self, player: &PlayerId, channel: &ChannelId) -> bool {
        let Some(members) = self.channels.get_mut(channel) else {
            return false;
        };
        let removed = members.remove(player);
        if members.is_empty() {
            self.channels.remove(channel);
        }
        removed
    }

    /// Members of `channel`, in nick order.
    pub fn members(&self, channel: &ChannelId) -> impl Iterator<Item = &PlayerId> {
        self.channels.get(channel).into_iter().flatten()
    }

    /// Channels with at least one member.
    pub fn channels(&self) -> impl Iterator<Item = &ChannelId> {
        self.channels.keys()
    }

    pub fn contains_channel(&self, channel: &ChannelId) -> bool {
        self.channels.contains_key(channel)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

impl PresenceOracle for ChannelRoster {
    fn is_present(&self, player: &PlayerId, channel: &ChannelId) -> bool {
        self.channels
            .get(channel)
            .is_some_and(|members| members.contains(player))
    }
}
