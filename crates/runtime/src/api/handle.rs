//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! every player action, plus event streams for specific topics.
use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc, oneshot};

use duckhunt_core::{
    BefriendOutcome, ChannelId, Duck, DuckKind, ItemId, Player, PlayerId, PurchaseMode,
    PurchaseReceipt, ReloadOutcome, SaleReceipt, ShootOutcome, UseReceipt,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<Result<T>>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Record that `player` joined `channel`, loading their saved record.
    ///
    /// Returns false when the player was already there.
    pub async fn join_channel(&self, player: impl Into<PlayerId>, channel: impl Into<ChannelId>) -> Result<bool> {
        let (player, channel) = (player.into(), channel.into());
        self.request(|reply| Command::Join {
            player,
            channel,
            reply,
        })
        .await
    }

    /// Record that `player` left `channel`.
    pub async fn part_channel(&self, player: impl Into<PlayerId>, channel: impl Into<ChannelId>) -> Result<bool> {
        let (player, channel) = (player.into(), channel.into());
        self.request(|reply| Command::Part {
            player,
            channel,
            reply,
        })
        .await
    }

    /// Fire at the oldest duck in `channel`.
    pub async fn shoot(&self, player: impl Into<PlayerId>, channel: impl Into<ChannelId>) -> Result<ShootOutcome> {
        let (player, channel) = (player.into(), channel.into());
        self.request(|reply| Command::Shoot {
            player,
            channel,
            reply,
        })
        .await
    }

    /// Clear a jam or load a fresh magazine.
    pub async fn reload(&self, player: impl Into<PlayerId>) -> Result<ReloadOutcome> {
        let player = player.into();
        self.request(|reply| Command::Reload { player, reply }).await
    }

    /// Try to befriend the oldest duck in `channel`.
    pub async fn befriend(&self, player: impl Into<PlayerId>, channel: impl Into<ChannelId>) -> Result<BefriendOutcome> {
        let (player, channel) = (player.into(), channel.into());
        self.request(|reply| Command::Befriend {
            player,
            channel,
            reply,
        })
        .await
    }

    /// Buy an item, banking it or applying it (optionally to `target`).
    ///
    /// Shop validation failures surface as [`RuntimeError::Shop`].
    pub async fn purchase(
        &self,
        player: impl Into<PlayerId>,
        channel: impl Into<ChannelId>,
        item: ItemId,
        target: Option<PlayerId>,
        mode: PurchaseMode,
    ) -> Result<PurchaseReceipt> {
        let (player, channel) = (player.into(), channel.into());
        self.request(|reply| Command::Purchase {
            player,
            channel,
            item,
            target,
            mode,
            reply,
        })
        .await
    }

    /// Apply a banked item, optionally to `target`.
    pub async fn use_item(
        &self,
        player: impl Into<PlayerId>,
        channel: impl Into<ChannelId>,
        item: ItemId,
        target: Option<PlayerId>,
    ) -> Result<UseReceipt> {
        let (player, channel) = (player.into(), channel.into());
        self.request(|reply| Command::UseItem {
            player,
            channel,
            item,
            target,
            reply,
        })
        .await
    }

    /// Sell one banked unit of `item`.
    pub async fn sell(&self, player: impl Into<PlayerId>, item: ItemId) -> Result<SaleReceipt> {
        let player = player.into();
        self.request(|reply| Command::Sell { player, item, reply }).await
    }

    /// Spawn a duck now, optionally of a forced kind.
    ///
    /// `None` means the channel is already at capacity.
    pub async fn spawn_duck(&self, channel: impl Into<ChannelId>, kind: Option<DuckKind>) -> Result<Option<Duck>> {
        let channel = channel.into();
        self.request(|reply| Command::SpawnDuck {
            channel,
            kind,
            reply,
        })
        .await
    }

    /// Snapshot of a player, from memory or the store.
    pub async fn player(&self, player: impl Into<PlayerId>) -> Result<Option<Player>> {
        let player = player.into();
        self.request(|reply| Command::QueryPlayer { player, reply }).await
    }

    /// Live ducks in `channel`, oldest first.
    pub async fn ducks(&self, channel: impl Into<ChannelId>) -> Result<Vec<Duck>> {
        let channel = channel.into();
        self.request(|reply| Command::QueryDucks { channel, reply }).await
    }

    /// Write every pending player record now. Returns how many were written.
    pub async fn flush(&self) -> Result<usize> {
        self.request(|reply| Command::Flush { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Ducks` - Spawns (with radar recipients) and departures
    /// - `Topic::Persistence` - Save scheduler flushes and failures
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use duckhunt_runtime::Topic;
    ///
    /// let mut ducks = handle.subscribe(Topic::Ducks);
    /// while let Ok(event) = ducks.recv().await {
    ///     // Announce the duck
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }
}
