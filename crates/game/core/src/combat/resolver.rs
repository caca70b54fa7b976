//! Shoot, reload and befriend against a channel's live ducks.
//!
//! # Roll order
//!
//! Each branch draws from the RNG in a fixed order, one draw per check:
//!
//! - shoot: nothing while confiscated, wet, jammed or empty; otherwise jam, then either (wild fire) friendly-fire check and victim pick,
//!   or (duck present) hit, then on a kill the lucky-shot check, one scare
//!   check per other duck, the bushes check and loot pick (rearming draws
//!   nothing); on a miss the
//!   ricochet check, victim pick and, after repeated attempts, the flee check
//! - reload: one reliability check, and none at all when clearing a jam
//! - befriend: success check, then either the XP reward draw or the flee check

use crate::combat::hit::{hit_chance, jam_chance, shot_damage};
use crate::combat::{
    BefriendOutcome, FriendlyFire, HitReport, JamCause, Loot, MissReport, ReloadOutcome,
    ShootOutcome,
};
use crate::env::{GameEnv, RngOracle};
use crate::shop::check_room;
use crate::state::{
    ChannelId, DuckFate, DuckId, DuckKind, EffectKind, GameState, Gear, Player, PlayerId, Roster,
    Timestamp,
};
use crate::stats::{StatBounds, StatKind};

/// Resolves player actions. Stateless apart from the borrowed environment.
#[derive(Clone, Copy, Debug)]
pub struct CombatResolver<'a> {
    env: GameEnv<'a>,
}

impl<'a> CombatResolver<'a> {
    pub fn new(env: GameEnv<'a>) -> Self {
        Self { env }
    }

    /// Fires at the oldest live duck in `channel`.
    pub fn shoot(
        &self,
        state: &mut GameState,
        shooter: &PlayerId,
        channel: &ChannelId,
        now: Timestamp,
        rng: &mut dyn RngOracle,
    ) -> ShootOutcome {
        let modifiers = self.env.modifiers();
        let player = state.roster.get_or_create(shooter, &self.env.config.player);

        if player.weapon.confiscated {
            return ShootOutcome::Confiscated;
        }
        if player.has_effect(EffectKind::WetClothes, now) {
            return ShootOutcome::Wet;
        }
        if player.weapon.jammed {
            return ShootOutcome::Jammed(JamCause::AlreadyJammed);
        }
        if !player.weapon.fire() {
            return ShootOutcome::Empty;
        }

        let reliability = modifiers.effective_stat(player, StatKind::Reliability, now);
        let jam = modifiers.effective_stat(player, StatKind::JamChance, now);
        let jam_odds = jam_chance(reliability, jam, &player.stats, &self.env.config.shooting);
        player.stats.shots_fired += 1;
        if rng.percent(jam_odds) {
            player.weapon.jammed = true;
            player.stats.jammed += 1;
            return ShootOutcome::Jammed(JamCause::Misfire);
        }

        let Some(target) = state.ducks.oldest_alive(channel).map(|d| d.id) else {
            return self.wild_fire(&mut state.roster, shooter, channel, now, rng);
        };

        let ammo_left = player.weapon.ammo;
        let accuracy = modifiers.effective_stat(player, StatKind::Accuracy, now);
        let perfect_aim = player.has_effect(EffectKind::PerfectAim, now);
        let gear = player.gear;

        let Some(duck) = state.ducks.get_mut(channel, target) else {
            return self.wild_fire(&mut state.roster, shooter, channel, now, rng);
        };
        duck.hit_attempts += 1;
        let profile = self.env.config.ducks.profile(duck.kind);
        let chance = hit_chance(accuracy, profile.accuracy_malus, gear, perfect_aim, self.env.config);

        if rng.percent(chance) {
            let remaining = duck.wound(shot_damage(gear, &self.env.config.gear));
            if remaining > 0 {
                let duck = duck.clone();
                if let Some(player) = state.roster.get_mut(shooter) {
                    drift_accuracy(player, self.env.config.shooting.accuracy_gain_on_hit);
                }
                return ShootOutcome::Hit(HitReport {
                    duck,
                    hit_chance: chance,
                    killed: false,
                    xp_gained: 0,
                    lucky_shot: false,
                    reaction_ms: None,
                    scared: Vec::new(),
                    loot: None,
                    rearmed: Vec::new(),
                    ammo_left,
                });
            }
            self.kill(state, shooter, channel, target, chance, now, rng)
        } else {
            self.miss(state, shooter, channel, target, chance, now, rng)
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn kill(
        &self,
        state: &mut GameState,
        shooter: &PlayerId,
        channel: &ChannelId,
        target: DuckId,
        chance: i32,
        now: Timestamp,
        rng: &mut dyn RngOracle,
    ) -> ShootOutcome {
        let config = self.env.config;
        let modifiers = self.env.modifiers();
        let Some(duck) = state.ducks.resolve(channel, target, DuckFate::Shot) else {
            return self.wild_fire(&mut state.roster, shooter, channel, now, rng);
        };
        let profile = config.ducks.profile(duck.kind);
        let player = state.roster.get_or_create(shooter, &config.player);

        let luck = modifiers.effective_stat(player, StatKind::Luck, now);
        let lucky_shot = rng.percent(config.shooting.lucky_shot_chance + luck);
        let mut xp = profile.xp;
        if lucky_shot {
            xp = xp.saturating_mul(config.shooting.lucky_shot_multiplier_percent) / 100;
        }
        let luck_percent = u64::try_from(luck.max(0)).unwrap_or(0) * config.shooting.luck_xp_percent_per_point;
        xp = xp.saturating_mul(100 + luck_percent) / 100;

        let reaction_ms = now.millis_since(duck.spawned_at);
        player.gain_xp(xp);
        player.stats.record_kill(reaction_ms);
        if duck.kind == DuckKind::Golden {
            player.stats.golden_caught += 1;
        }
        player.adjust_karma(profile.karma.unwrap_or(config.karma.hit));
        drift_accuracy(player, config.shooting.accuracy_gain_on_hit);
        let ammo_left = player.weapon.ammo;
        let silenced = player.gear.contains(Gear::SILENCER);

        let scare_chance = if silenced {
            config.scare.silenced_after_kill_chance
        } else {
            config.scare.after_kill_chance
        };
        let scared = state.ducks.scare_others(channel, duck.id, scare_chance, rng);
        let loot = self.search_bushes(&mut state.roster, shooter, rng);
        let rearmed = if config.shooting.rearm_on_kill {
            self.rearm_channel(&mut state.roster, channel)
        } else {
            Vec::new()
        };

        ShootOutcome::Hit(HitReport {
            duck,
            hit_chance: chance,
            killed: true,
            xp_gained: xp,
            lucky_shot,
            reaction_ms: Some(reaction_ms),
            scared,
            loot,
            rearmed,
            ammo_left,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn miss(
        &self,
        state: &mut GameState,
        shooter: &PlayerId,
        channel: &ChannelId,
        target: DuckId,
        chance: i32,
        now: Timestamp,
        rng: &mut dyn RngOracle,
    ) -> ShootOutcome {
        let config = self.env.config;
        let modifiers = self.env.modifiers();
        let kind = state
            .ducks
            .get(channel, target)
            .map_or(DuckKind::Normal, |d| d.kind);

        let player = state.roster.get_or_create(shooter, &config.player);
        player.stats.missed += 1;
        player.stats.break_streak();
        let xp_lost = player.lose_xp(modifiers.scale_penalty(config.penalties.miss, player.xp).unsigned_abs());
        player.adjust_karma(modifiers.scale_penalty(config.karma.miss, player.xp));
        drift_accuracy(player, -config.shooting.accuracy_loss_on_miss);
        let ammo_left = player.weapon.ammo;
        let ricochet = if player.gear.contains(Gear::EXPLOSIVE_AMMO) {
            config.shooting.explosive_ricochet_chance
        } else {
            config.shooting.ricochet_chance
        };

        let friendly_fire = if rng.percent(ricochet) {
            self.friendly_fire(&mut state.roster, shooter, channel, config.penalties.ricochet_victim, now, rng)
        } else {
            None
        };
        let fled = state.ducks.scare_on_miss(channel, target, &config.scare, rng);

        ShootOutcome::Miss(MissReport {
            duck: target,
            kind,
            hit_chance: chance,
            xp_lost,
            friendly_fire,
            fled,
            ammo_left,
        })
    }

    fn wild_fire(
        &self,
        roster: &mut Roster,
        shooter: &PlayerId,
        channel: &ChannelId,
        now: Timestamp,
        rng: &mut dyn RngOracle,
    ) -> ShootOutcome {
        let config = self.env.config;
        let modifiers = self.env.modifiers();
        let player = roster.get_or_create(shooter, &config.player);

        player.stats.wild_shots += 1;
        player.stats.break_streak();
        let miss = modifiers.scale_penalty(config.penalties.miss, player.xp);
        let mut xp_lost = player.lose_xp(miss.unsigned_abs());
        let wild = modifiers.scale_penalty(config.penalties.wild_fire, player.xp);
        xp_lost += player.lose_xp(wild.unsigned_abs());
        player.adjust_karma(modifiers.scale_penalty(config.karma.wild_fire, player.xp));
        player.weapon.confiscated = true;

        let friendly_fire = if rng.percent(config.shooting.wild_fire_friendly_fire_chance) {
            self.friendly_fire(roster, shooter, channel, config.penalties.friendly_fire_victim, now, rng)
        } else {
            None
        };

        ShootOutcome::WildFire {
            xp_lost,
            friendly_fire,
        }
    }

    /// Picks a random other player present in `channel` and applies the
    /// victim penalty, unless they are insured.
    fn friendly_fire(
        &self,
        roster: &mut Roster,
        shooter: &PlayerId,
        channel: &ChannelId,
        victim_penalty: i64,
        now: Timestamp,
        rng: &mut dyn RngOracle,
    ) -> Option<FriendlyFire> {
        let config = self.env.config;
        let modifiers = self.env.modifiers();
        let candidates: Vec<PlayerId> = roster
            .ids()
            .filter(|id| *id != shooter && self.env.presence.is_present(id, channel))
            .cloned()
            .collect();
        let victim_id = candidates.get(rng.pick(candidates.len())?)?.clone();

        let (player, victim) = roster.pair_mut(shooter, &victim_id)?;
        let insured = victim.has_effect(EffectKind::Insurance, now);
        let xp_lost = if insured {
            0
        } else {
            let penalty = modifiers.scale_penalty(victim_penalty, victim.xp);
            victim.lose_xp(penalty.unsigned_abs())
        };

        player.stats.friendly_fire += 1;
        if !player.has_effect(EffectKind::Insurance, now) {
            player.adjust_karma(modifiers.scale_penalty(config.karma.friendly_fire, player.xp));
        }

        Some(FriendlyFire {
            victim: victim_id,
            xp_lost,
            insured,
        })
    }

    fn search_bushes(&self, roster: &mut Roster, shooter: &PlayerId, rng: &mut dyn RngOracle) -> Option<Loot> {
        let config = self.env.config;
        if !rng.percent(config.shooting.bushes_chance) {
            return None;
        }
        let loot_table = &config.shooting.bushes_loot;
        let found = *loot_table.get(rng.pick(loot_table.len())?)?;
        let item = self.env.catalog.get(found)?;

        let player = roster.get_mut(shooter)?;
        player.stats.items_found += 1;
        if check_room(player, item, &config.inventory).is_ok() {
            player.inventory.add(item.id);
            Some(Loot::Stashed(item.id))
        } else {
            Some(Loot::Lost(item.id))
        }
    }

    /// Returns every confiscated gun held by a player present in `channel`,
    /// loaded.
    fn rearm_channel(&self, roster: &mut Roster, channel: &ChannelId) -> Vec<PlayerId> {
        let disarmed: Vec<PlayerId> = roster
            .iter()
            .filter(|p| p.weapon.confiscated && self.env.presence.is_present(&p.id, channel))
            .map(|p| p.id.clone())
            .collect();
        for id in &disarmed {
            if let Some(player) = roster.get_mut(id) {
                player.weapon.confiscated = false;
                player.weapon.refill();
            }
        }
        disarmed
    }

    /// Clears a jam, or swaps in a fresh magazine.
    pub fn reload(
        &self,
        roster: &mut Roster,
        player: &PlayerId,
        now: Timestamp,
        rng: &mut dyn RngOracle,
    ) -> ReloadOutcome {
        let modifiers = self.env.modifiers();
        let player = roster.get_or_create(player, &self.env.config.player);

        if player.weapon.jammed {
            player.weapon.jammed = false;
            return ReloadOutcome::Unjammed;
        }
        if player.weapon.is_full() {
            return ReloadOutcome::AlreadyFull;
        }
        if player.weapon.chargers == 0 {
            return ReloadOutcome::NoChargers;
        }

        let reliability = modifiers.effective_stat(player, StatKind::Reliability, now);
        if rng.percent(reliability) {
            player.weapon.chargers -= 1;
            player.weapon.refill();
            ReloadOutcome::Reloaded {
                ammo: player.weapon.ammo,
                chargers_left: player.weapon.chargers,
            }
        } else {
            player.weapon.jammed = true;
            player.stats.jammed += 1;
            ReloadOutcome::JammedOnReload
        }
    }

    /// Tries to befriend the oldest live duck in `channel`.
    pub fn befriend(
        &self,
        state: &mut GameState,
        player: &PlayerId,
        channel: &ChannelId,
        now: Timestamp,
        rng: &mut dyn RngOracle,
    ) -> BefriendOutcome {
        let config = self.env.config;
        let Some(target) = state.ducks.oldest_alive(channel).map(|d| d.id) else {
            return BefriendOutcome::NoDuck;
        };
        let player = state.roster.get_or_create(player, &config.player);
        let rate = self.befriend_rate(player, now);

        if rng.percent(rate) {
            let Some(duck) = state.ducks.resolve(channel, target, DuckFate::Befriended) else {
                return BefriendOutcome::NoDuck;
            };
            let reward = config.befriend.xp_reward.normalized();
            let xp_gained = rng.range(reward.min, reward.max);
            player.gain_xp(xp_gained);
            player.stats.befriended += 1;
            player.adjust_karma(config.karma.befriend);
            return BefriendOutcome::Success {
                duck,
                rate,
                xp_gained,
            };
        }

        let modifiers = self.env.modifiers();
        let xp_lost = player.lose_xp(
            modifiers
                .scale_penalty(config.penalties.befriend_fail, player.xp)
                .unsigned_abs(),
        );
        player.adjust_karma(modifiers.scale_penalty(config.karma.befriend_fail, player.xp));

        if rng.percent(config.befriend.scared_away_chance) {
            if let Some(duck) = state.ducks.resolve(channel, target, DuckFate::Scared) {
                return BefriendOutcome::ScaredAway {
                    duck,
                    rate,
                    xp_lost,
                };
            }
        }
        BefriendOutcome::Refused {
            duck: target,
            rate,
            xp_lost,
        }
    }

    /// Success chance of befriending, in percent.
    ///
    /// Base rate plus the capped level bonus (via the modifier pipeline),
    /// plus the capped luck bonus, clamped to the configured window.
    pub fn befriend_rate(&self, player: &mut Player, now: Timestamp) -> i32 {
        let befriend = &self.env.config.befriend;
        let modifiers = self.env.modifiers();
        let with_level = modifiers.effective_stat(player, StatKind::BefriendRate, now);
        let luck = modifiers.effective_stat(player, StatKind::Luck, now);
        let luck_bonus = luck
            .saturating_mul(befriend.luck_bonus_per_point)
            .clamp(0, befriend.luck_bonus_cap);
        with_level
            .saturating_add(luck_bonus)
            .clamp(befriend.min_rate, befriend.max_rate.max(befriend.min_rate))
    }
}

/// Shifts base accuracy after a shot, within the accuracy bounds.
fn drift_accuracy(player: &mut Player, delta: i32) {
    let bounds = StatBounds::ACCURACY;
    player.accuracy = player.accuracy.saturating_add(delta).clamp(bounds.min, bounds.max);
}
