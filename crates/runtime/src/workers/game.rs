//! Game worker that owns the authoritative [`GameState`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle) and the
//! tick loops, resolves them through the `duckhunt-core` engines and
//! publishes duck events to the EventBus. Commands run one at a time and
//! never await in the middle of a mutation, so no lock guards the state.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

use duckhunt_content::ContentBundle;
use duckhunt_core::{
    BefriendOutcome, ChannelId, CombatResolver, Delivery, Duck, DuckFate, DuckKind, EffectResult,
    GameEnv, GameState, ItemId, ItemRequest, Player, PlayerId, PresenceOracle, PurchaseMode,
    PurchaseReceipt, ReloadOutcome, RngOracle, Roster, SaleReceipt, ShootOutcome, ShopInventory,
    Timestamp, UseReceipt, attraction_percent, radar_recipients,
};

use super::persistence::SaveRequest;
use super::ticker::TickKind;
use crate::api::{Result, RuntimeError};
use crate::events::{DuckEvent, EventBus};
use crate::oracle::{ChannelRoster, Clock};
use crate::repository::PlayerStore;

/// Commands that can be sent to the game worker
pub(crate) enum Command {
    Join {
        player: PlayerId,
        channel: ChannelId,
        reply: oneshot::Sender<Result<bool>>,
    },
    Part {
        player: PlayerId,
        channel: ChannelId,
        reply: oneshot::Sender<Result<bool>>,
    },
    Shoot {
        player: PlayerId,
        channel: ChannelId,
        reply: oneshot::Sender<Result<ShootOutcome>>,
    },
    Reload {
        player: PlayerId,
        reply: oneshot::Sender<Result<ReloadOutcome>>,
    },
    Befriend {
        player: PlayerId,
        channel: ChannelId,
        reply: oneshot::Sender<Result<BefriendOutcome>>,
    },
    Purchase {
        player: PlayerId,
        channel: ChannelId,
        item: ItemId,
        target: Option<PlayerId>,
        mode: PurchaseMode,
        reply: oneshot::Sender<Result<PurchaseReceipt>>,
    },
    UseItem {
        player: PlayerId,
        channel: ChannelId,
        item: ItemId,
        target: Option<PlayerId>,
        reply: oneshot::Sender<Result<UseReceipt>>,
    },
    Sell {
        player: PlayerId,
        item: ItemId,
        reply: oneshot::Sender<Result<SaleReceipt>>,
    },
    /// Spawn now, bypassing the spawn schedule.
    SpawnDuck {
        channel: ChannelId,
        kind: Option<DuckKind>,
        reply: oneshot::Sender<Result<Option<Duck>>>,
    },
    QueryPlayer {
        player: PlayerId,
        reply: oneshot::Sender<Result<Option<Player>>>,
    },
    QueryDucks {
        channel: ChannelId,
        reply: oneshot::Sender<Result<Vec<Duck>>>,
    },
    /// Forwarded to the save scheduler, which replies directly.
    Flush { reply: oneshot::Sender<Result<usize>> },
    /// Periodic job from a tick loop. No reply.
    Tick(TickKind),
}

/// Everything the game worker needs besides its channels.
pub(crate) struct GameWorkerParts {
    pub content: ContentBundle,
    pub rng: Box<dyn RngOracle + Send>,
    pub clock: Arc<dyn Clock>,
    pub store: Arc<dyn PlayerStore>,
}

/// Background task that processes gameplay commands.
pub(crate) struct GameWorker {
    state: GameState,
    content: ContentBundle,
    presence: ChannelRoster,
    rng: Box<dyn RngOracle + Send>,
    clock: Arc<dyn Clock>,
    store: Arc<dyn PlayerStore>,
    /// When each channel's next scheduled spawn is due.
    next_spawn: BTreeMap<ChannelId, Timestamp>,
    command_rx: mpsc::Receiver<Command>,
    save_tx: mpsc::UnboundedSender<SaveRequest>,
    shutdown_rx: watch::Receiver<bool>,
    event_bus: EventBus,
}

impl GameWorker {
    pub(crate) fn new(
        parts: GameWorkerParts,
        command_rx: mpsc::Receiver<Command>,
        save_tx: mpsc::UnboundedSender<SaveRequest>,
        shutdown_rx: watch::Receiver<bool>,
        event_bus: EventBus,
    ) -> Self {
        info!(
            "GameWorker initialized with {} duck kinds, {} levels, {} shop items",
            parts.content.config.ducks.kinds.len(),
            parts.content.levels.max_level(),
            parts.content.catalog.len()
        );

        Self {
            state: GameState::default(),
            content: parts.content,
            presence: ChannelRoster::new(),
            rng: parts.rng,
            clock: parts.clock,
            store: parts.store,
            next_spawn: BTreeMap::new(),
            command_rx,
            save_tx,
            shutdown_rx,
            event_bus,
        }
    }

    /// Main worker loop.
    ///
    /// On shutdown, commands already queued still run to completion before the
    /// worker exits. Dropping the worker closes the save channel, which
    /// triggers the save scheduler's final flush.
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    self.handle_command(cmd);
                }
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        break;
                    }
                }
                else => break,
            }
        }

        self.command_rx.close();
        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd);
        }
        info!(
            "GameWorker stopped with {} players and {} live ducks",
            self.state.roster.len(),
            self.state.ducks.total_alive()
        );
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Join {
                player,
                channel,
                reply,
            } => {
                let result = self.join(player, channel);
                respond(reply, result, "Join");
            }
            Command::Part {
                player,
                channel,
                reply,
            } => {
                let left = self.presence.part(&player, &channel);
                debug!("{} left {} (was present: {})", player, channel, left);
                respond(reply, Ok(left), "Part");
            }
            Command::Shoot {
                player,
                channel,
                reply,
            } => {
                let result = self.shoot(&player, &channel);
                respond(reply, result, "Shoot");
            }
            Command::Reload { player, reply } => {
                let result = self.reload(&player);
                respond(reply, result, "Reload");
            }
            Command::Befriend {
                player,
                channel,
                reply,
            } => {
                let result = self.befriend(&player, &channel);
                respond(reply, result, "Befriend");
            }
            Command::Purchase {
                player,
                channel,
                item,
                target,
                mode,
                reply,
            } => {
                let result = self.purchase(&player, &channel, item, target.as_ref(), mode);
                respond(reply, result, "Purchase");
            }
            Command::UseItem {
                player,
                channel,
                item,
                target,
                reply,
            } => {
                let result = self.use_item(&player, &channel, item, target.as_ref());
                respond(reply, result, "UseItem");
            }
            Command::Sell {
                player,
                item,
                reply,
            } => {
                let result = self.sell(&player, item);
                respond(reply, result, "Sell");
            }
            Command::SpawnDuck {
                channel,
                kind,
                reply,
            } => {
                let result = if self.presence.contains_channel(&channel) {
                    let now = self.clock.now();
                    Ok(self.spawn_in(&channel, kind, now))
                } else {
                    Err(RuntimeError::UnknownChannel(channel))
                };
                respond(reply, result, "SpawnDuck");
            }
            Command::QueryPlayer { player, reply } => {
                let result = match self.state.roster.get(&player) {
                    Some(p) => Ok(Some(p.clone())),
                    None => self.store.load(&player).map_err(RuntimeError::from),
                };
                respond(reply, result, "QueryPlayer");
            }
            Command::QueryDucks { channel, reply } => {
                let ducks = self.state.ducks.alive(&channel).to_vec();
                respond(reply, Ok(ducks), "QueryDucks");
            }
            Command::Flush { reply } => {
                if let Err(mpsc::error::SendError(request)) = self.save_tx.send(SaveRequest::Flush { reply }) {
                    if let SaveRequest::Flush { reply } = request {
                        respond(reply, Ok(0), "Flush");
                    }
                    warn!("Save scheduler stopped; nothing to flush");
                }
            }
            Command::Tick(TickKind::Spawn) => self.spawn_due(),
            Command::Tick(TickKind::Timeout) => self.sweep_timeouts(),
        }
    }

    // ========================================================================
    // Player actions
    // ========================================================================

    fn join(&mut self, player: PlayerId, channel: ChannelId) -> Result<bool> {
        self.ensure_loaded(&player);
        let joined = self.presence.join(player.clone(), channel.clone());
        debug!("{} joined {} (new: {})", player, channel, joined);
        Ok(joined)
    }

    fn shoot(&mut self, player: &PlayerId, channel: &ChannelId) -> Result<ShootOutcome> {
        self.require_presence(player, channel)?;
        self.ensure_loaded(player);
        let now = self.clock.now();

        let env = GameEnv::new(
            &self.content.config,
            &self.content.levels,
            &self.content.catalog,
            &self.presence,
        );
        let outcome = CombatResolver::new(env).shoot(&mut self.state, player, channel, now, self.rng.as_mut());
        debug!("{} shot in {}: {:?}", player, channel, outcome);

        let departed: Vec<Duck> = outcome.departed().into_iter().cloned().collect();
        self.announce_departures(departed, player);

        let victim = match &outcome {
            ShootOutcome::WildFire {
                friendly_fire: Some(ff),
                ..
            } => Some(&ff.victim),
            ShootOutcome::Miss(report) => report.friendly_fire.as_ref().map(|ff| &ff.victim),
            _ => None,
        };
        let rearmed: &[PlayerId] = match &outcome {
            ShootOutcome::Hit(report) => &report.rearmed,
            _ => &[],
        };
        if !rearmed.is_empty() {
            info!("Kill in {} returned guns to {:?}", channel, rearmed);
        }
        self.mark_dirty(std::iter::once(player).chain(victim).chain(rearmed));
        Ok(outcome)
    }

    fn reload(&mut self, player: &PlayerId) -> Result<ReloadOutcome> {
        self.ensure_loaded(player);
        let now = self.clock.now();

        let env = GameEnv::new(
            &self.content.config,
            &self.content.levels,
            &self.content.catalog,
            &self.presence,
        );
        let outcome = CombatResolver::new(env).reload(&mut self.state.roster, player, now, self.rng.as_mut());
        debug!("{} reloaded: {:?}", player, outcome);

        self.mark_dirty([player]);
        Ok(outcome)
    }

    fn befriend(&mut self, player: &PlayerId, channel: &ChannelId) -> Result<BefriendOutcome> {
        self.require_presence(player, channel)?;
        self.ensure_loaded(player);
        let now = self.clock.now();

        let env = GameEnv::new(
            &self.content.config,
            &self.content.levels,
            &self.content.catalog,
            &self.presence,
        );
        let outcome = CombatResolver::new(env).befriend(&mut self.state, player, channel, now, self.rng.as_mut());
        debug!("{} befriended in {}: {:?}", player, channel, outcome);

        if let Some(duck) = outcome.departed() {
            self.announce_departures(vec![duck.clone()], player);
        }
        if !matches!(outcome, BefriendOutcome::NoDuck) {
            self.mark_dirty([player]);
        }
        Ok(outcome)
    }

    fn purchase(
        &mut self,
        player: &PlayerId,
        channel: &ChannelId,
        item: ItemId,
        target: Option<&PlayerId>,
        mode: PurchaseMode,
    ) -> Result<PurchaseReceipt> {
        self.require_presence(player, channel)?;
        self.ensure_loaded(player);
        self.ensure_target_loaded(target, channel);
        let now = self.clock.now();

        let mut request = ItemRequest::new(player, channel, item);
        if let Some(target) = target {
            request = request.on(target);
        }
        let env = GameEnv::new(
            &self.content.config,
            &self.content.levels,
            &self.content.catalog,
            &self.presence,
        );
        let receipt = ShopInventory::new(env)
            .purchase(&mut self.state.roster, request, mode, now)
            .inspect_err(|e| debug!("{} could not buy item {}: {}", player, item, e))?;
        debug!("{} bought item {}: {:?}", player, item, receipt.delivery);

        match &receipt.delivery {
            Delivery::Applied { subject, effect } => {
                self.mark_dirty([player, subject]);
                self.follow_up(effect, channel, now);
            }
            Delivery::Stored { .. } => self.mark_dirty([player]),
        }
        Ok(receipt)
    }

    fn use_item(
        &mut self,
        player: &PlayerId,
        channel: &ChannelId,
        item: ItemId,
        target: Option<&PlayerId>,
    ) -> Result<UseReceipt> {
        self.require_presence(player, channel)?;
        self.ensure_loaded(player);
        self.ensure_target_loaded(target, channel);
        let now = self.clock.now();

        let mut request = ItemRequest::new(player, channel, item);
        if let Some(target) = target {
            request = request.on(target);
        }
        let env = GameEnv::new(
            &self.content.config,
            &self.content.levels,
            &self.content.catalog,
            &self.presence,
        );
        let receipt = ShopInventory::new(env)
            .use_from_inventory(&mut self.state.roster, request, now)
            .inspect_err(|e| debug!("{} could not use item {}: {}", player, item, e))?;
        debug!("{} used item {} on {}: {:?}", player, item, receipt.subject, receipt.effect);

        self.mark_dirty([player, &receipt.subject]);
        self.follow_up(&receipt.effect, channel, now);
        Ok(receipt)
    }

    fn sell(&mut self, player: &PlayerId, item: ItemId) -> Result<SaleReceipt> {
        self.ensure_loaded(player);
        let env = GameEnv::new(
            &self.content.config,
            &self.content.levels,
            &self.content.catalog,
            &self.presence,
        );
        let receipt = ShopInventory::new(env).sell(&mut self.state.roster, player, item)?;
        debug!("{} sold item {} for {} xp", player, item, receipt.refund);

        self.mark_dirty([player]);
        Ok(receipt)
    }

    /// Runtime side effects of an applied item.
    fn follow_up(&mut self, effect: &EffectResult, channel: &ChannelId, now: Timestamp) {
        if matches!(effect, EffectResult::DuckCalled) && self.spawn_in(channel, None, now).is_none() {
            debug!("Called duck did not come: {} is full", channel);
        }
    }

    // ========================================================================
    // Ducks
    // ========================================================================

    fn spawn_in(&mut self, channel: &ChannelId, kind: Option<DuckKind>, now: Timestamp) -> Option<Duck> {
        let duck = self
            .state
            .ducks
            .spawn(channel, kind, now, &self.content.config, self.rng.as_mut())?;

        let radar = radar_recipients(channel_players(&self.presence, &self.state.roster, channel), now);
        info!("{} duck {} spawned in {}", duck.kind, duck.id, channel);
        self.event_bus.publish(DuckEvent::Spawned {
            duck: duck.clone(),
            radar,
        });
        Some(duck)
    }

    /// Spawns in every channel whose scheduled time has come and schedules
    /// the next one. Channels nobody is in lose their schedule.
    fn spawn_due(&mut self) {
        let now = self.clock.now();
        let presence = &self.presence;
        self.next_spawn.retain(|channel, _| presence.contains_channel(channel));

        let channels: Vec<ChannelId> = self.presence.channels().cloned().collect();
        for channel in channels {
            match self.next_spawn.get(&channel).copied() {
                Some(due) if due > now => continue,
                Some(_) => {
                    self.spawn_in(&channel, None, now);
                }
                None => {}
            }
            let next = self.next_spawn_at(&channel, now);
            debug!("Next spawn in {} at {:?}", channel, next);
            self.next_spawn.insert(channel, next);
        }
    }

    /// A random draw from the spawn window, shortened by the strongest duck
    /// attraction among the channel's players.
    fn next_spawn_at(&mut self, channel: &ChannelId, now: Timestamp) -> Timestamp {
        let window = self.content.config.spawning.interval_secs.normalized();
        let percent = attraction_percent(channel_players(&self.presence, &self.state.roster, channel), now);
        let secs = self.rng.range(window.min, window.max);

        let delay_ms = secs.saturating_mul(1_000).saturating_mul(100) / u64::from(percent.max(1));
        Timestamp::from_millis(now.as_millis().saturating_add(delay_ms))
    }

    fn sweep_timeouts(&mut self) {
        let now = self.clock.now();
        for duck in self.state.ducks.timeout_sweep(now) {
            info!("Duck {} left {} unharmed", duck.id, duck.channel);
            self.event_bus.publish(DuckEvent::Departed {
                duck,
                fate: DuckFate::TimedOut,
                by: None,
            });
        }
    }

    fn announce_departures(&self, ducks: Vec<Duck>, actor: &PlayerId) {
        for duck in ducks {
            let Some(fate) = duck.fate() else {
                continue;
            };
            let by = matches!(fate, DuckFate::Shot | DuckFate::Befriended).then(|| actor.clone());
            self.event_bus.publish(DuckEvent::Departed { duck, fate, by });
        }
    }

    // ========================================================================
    // Players
    // ========================================================================

    fn require_presence(&self, player: &PlayerId, channel: &ChannelId) -> Result<()> {
        if self.presence.is_present(player, channel) {
            Ok(())
        } else {
            Err(RuntimeError::NotInChannel {
                player: player.clone(),
                channel: channel.clone(),
            })
        }
    }

    /// Brings a player into memory: the saved record if there is one,
    /// otherwise a fresh player from the configured defaults.
    fn ensure_loaded(&mut self, id: &PlayerId) {
        if self.state.roster.contains(id) {
            return;
        }

        match self.store.load(id) {
            Ok(Some(player)) => {
                debug!("Loaded saved player {}", id);
                self.state.roster.insert(player);
            }
            Ok(None) => {
                debug!("Created player {}", id);
                self.state.roster.get_or_create(id, &self.content.config.player);
            }
            Err(e) => {
                error!("Failed to load player {}: {}; starting from defaults", id, e);
                self.state.roster.get_or_create(id, &self.content.config.player);
            }
        }
    }

    fn ensure_target_loaded(&mut self, target: Option<&PlayerId>, channel: &ChannelId) {
        if let Some(target) = target
            && self.presence.is_present(target, channel)
        {
            self.ensure_loaded(target);
        }
    }

    /// Hands fresh snapshots of `ids` to the save scheduler.
    fn mark_dirty<'a>(&self, ids: impl IntoIterator<Item = &'a PlayerId>) {
        let mut players: Vec<Player> = Vec::new();
        for id in ids {
            if players.iter().any(|p| &p.id == id) {
                continue;
            }
            if let Some(player) = self.state.roster.get(id) {
                players.push(player.clone());
            }
        }
        if players.is_empty() {
            return;
        }
        if self.save_tx.send(SaveRequest::Dirty(players)).is_err() {
            warn!("Save scheduler stopped; player changes will not be persisted");
        }
    }
}

/// Players currently in `channel`.
fn channel_players<'a>(
    presence: &'a ChannelRoster,
    roster: &'a Roster,
    channel: &'a ChannelId,
) -> impl Iterator<Item = &'a Player> {
    presence.members(channel).filter_map(|id| roster.get(id))
}

fn respond<T>(reply: oneshot::Sender<T>, value: T, command: &str) {
    if reply.send(value).is_err() {
        debug!("{} reply channel closed (caller dropped)", command);
    }
}
