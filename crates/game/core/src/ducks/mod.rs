//! Duck lifecycle: spawning, timeouts and scare propagation.
//!
//! ```text
//! SPAWNED → ALIVE → { SHOT | BEFRIENDED | SCARED | TIMED_OUT }
//! ```
//!
//! Every terminal transition removes the duck from its channel's live list in
//! the same call that records the fate, so the live list only ever holds
//! alive ducks and a resolved duck can never be targeted again.

use std::collections::BTreeMap;

use crate::config::{GameConfig, ScareConfig};
use crate::env::RngOracle;
use crate::state::{
    ChannelId, Duck, DuckFate, DuckId, DuckKind, EffectKind, Player, PlayerId, Timestamp,
};

/// Owns the live ducks of every channel.
#[derive(Clone, Debug, Default)]
pub struct DuckLifecycleManager {
    channels: BTreeMap<ChannelId, Vec<Duck>>,
    next_id: u64,
}

impl DuckLifecycleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a duck unless the channel is already at capacity.
    ///
    /// A full channel is a normal state, not an error: the call returns
    /// `None` and nothing changes. `forced` bypasses the weighted draw.
    pub fn spawn(
        &mut self,
        channel: &ChannelId,
        forced: Option<DuckKind>,
        now: Timestamp,
        config: &GameConfig,
        rng: &mut dyn RngOracle,
    ) -> Option<Duck> {
        if self.alive_count(channel) >= config.spawning.max_ducks_per_channel {
            return None;
        }

        let kind = match forced {
            Some(kind) => kind,
            None => Self::draw_kind(config, rng),
        };
        let profile = config.ducks.profile(kind);
        let window = profile
            .timeout_secs
            .unwrap_or(config.spawning.timeout_secs)
            .normalized();
        let timeout_secs = rng.range(window.min, window.max);

        self.next_id += 1;
        let duck = Duck::new(
            DuckId(self.next_id),
            channel.clone(),
            kind,
            profile.health,
            now,
            timeout_secs,
        );
        self.channels
            .entry(channel.clone())
            .or_default()
            .push(duck.clone());
        Some(duck)
    }

    fn draw_kind(config: &GameConfig, rng: &mut dyn RngOracle) -> DuckKind {
        let total: u64 = config.ducks.kinds.iter().map(|p| u64::from(p.weight)).sum();
        if total == 0 {
            return DuckKind::Normal;
        }

        let mut ticket = rng.range(1, total);
        for profile in &config.ducks.kinds {
            let weight = u64::from(profile.weight);
            if ticket <= weight {
                return profile.kind;
            }
            ticket -= weight;
        }
        DuckKind::Normal
    }

    /// Removes every duck whose lifetime has elapsed. Returns the departed
    /// ducks with fate [`DuckFate::TimedOut`].
    pub fn timeout_sweep(&mut self, now: Timestamp) -> Vec<Duck> {
        let mut departed = Vec::new();
        for ducks in self.channels.values_mut() {
            let mut index = 0;
            while index < ducks.len() {
                if ducks[index].has_timed_out(now) {
                    let mut duck = ducks.remove(index);
                    duck.resolve(DuckFate::TimedOut);
                    departed.push(duck);
                } else {
                    index += 1;
                }
            }
        }
        self.channels.retain(|_, ducks| !ducks.is_empty());
        departed
    }

    /// After a kill, every other duck in the channel independently rolls
    /// `chance` to flee. Returns the ducks that fled.
    pub fn scare_others(
        &mut self,
        channel: &ChannelId,
        excluded: DuckId,
        chance: i32,
        rng: &mut dyn RngOracle,
    ) -> Vec<Duck> {
        let candidates: Vec<DuckId> = self
            .alive(channel)
            .iter()
            .map(|d| d.id)
            .filter(|id| *id != excluded)
            .collect();

        candidates
            .into_iter()
            .filter(|_| rng.percent(chance))
            .filter_map(|id| self.resolve(channel, id, DuckFate::Scared))
            .collect()
    }

    /// A duck that has been shot at repeatedly may flee even on a miss.
    pub fn scare_on_miss(
        &mut self,
        channel: &ChannelId,
        duck: DuckId,
        scare: &ScareConfig,
        rng: &mut dyn RngOracle,
    ) -> Option<Duck> {
        let attempts = self.get(channel, duck)?.hit_attempts;
        if attempts < scare.on_miss_min_attempts {
            return None;
        }
        if rng.percent(scare.on_miss_chance) {
            self.resolve(channel, duck, DuckFate::Scared)
        } else {
            None
        }
    }

    /// Records `fate` and removes the duck from the live list.
    pub fn resolve(&mut self, channel: &ChannelId, id: DuckId, fate: DuckFate) -> Option<Duck> {
        let ducks = self.channels.get_mut(channel)?;
        let index = ducks.iter().position(|d| d.id == id)?;
        let mut duck = ducks.remove(index);
        duck.resolve(fate);
        if ducks.is_empty() {
            self.channels.remove(channel);
        }
        Some(duck)
    }

    /// The implicit target of shoot and befriend: smallest spawn time,
    /// ties broken by spawn order.
    pub fn oldest_alive(&self, channel: &ChannelId) -> Option<&Duck> {
        self.alive(channel)
            .iter()
            .min_by_key(|d| (d.spawned_at, d.id))
    }

    pub fn get(&self, channel: &ChannelId, id: DuckId) -> Option<&Duck> {
        self.alive(channel).iter().find(|d| d.id == id)
    }

    pub fn get_mut(&mut self, channel: &ChannelId, id: DuckId) -> Option<&mut Duck> {
        self.channels
            .get_mut(channel)?
            .iter_mut()
            .find(|d| d.id == id)
    }

    /// Live ducks in spawn order.
    pub fn alive(&self, channel: &ChannelId) -> &[Duck] {
        self.channels.get(channel).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn alive_count(&self, channel: &ChannelId) -> usize {
        self.alive(channel).len()
    }

    pub fn total_alive(&self) -> usize {
        self.channels.values().map(Vec::len).sum()
    }

    /// Channels with at least one live duck.
    pub fn channels(&self) -> impl Iterator<Item = &ChannelId> {
        self.channels.keys()
    }
}

/// Strongest duck-attraction multiplier among `players`, in percent.
/// Returns 100 when nobody has an active attraction effect.
pub fn attraction_percent<'a>(players: impl IntoIterator<Item = &'a Player>, now: Timestamp) -> u32 {
    players
        .into_iter()
        .filter_map(|p| p.effects.get(EffectKind::AttractDucks, now))
        .map(|e| e.magnitude.max(100) as u32)
        .max()
        .unwrap_or(100)
}

/// Players holding an active duck radar.
pub fn radar_recipients<'a>(
    players: impl IntoIterator<Item = &'a Player>,
    now: Timestamp,
) -> Vec<PlayerId> {
    players
        .into_iter()
        .filter(|p| p.has_effect(EffectKind::DuckRadar, now))
        .map(|p| p.id.clone())
        .collect()
}
