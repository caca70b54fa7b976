//! Effective stat computation.

use crate::config::{GameConfig, ScalingPolicy};
use crate::state::{EffectContract, Gear, Player, Timestamp};
use crate::stats::{Bonus, BonusStack, LevelTable, StatBounds};

/// Stats that go through the modifier pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StatKind {
    Accuracy,
    Reliability,
    JamChance,
    BefriendRate,
    Luck,
}

impl StatKind {
    pub const fn bounds(self) -> StatBounds {
        match self {
            Self::Accuracy => StatBounds::ACCURACY,
            Self::Reliability | Self::JamChance | Self::Luck => StatBounds::PERCENT,
            Self::BefriendRate => StatBounds::BEFRIEND_RATE,
        }
    }

    /// The player's stored base value for this stat. Befriend rate has no
    /// per-player base; it starts from the configured rate.
    pub fn base_of(self, player: &Player, config: &GameConfig) -> i32 {
        match self {
            Self::Accuracy => player.accuracy,
            Self::Reliability => player.reliability,
            Self::JamChance => player.jam_chance,
            Self::Luck => player.luck,
            Self::BefriendRate => config.befriend.base_rate,
        }
    }
}

/// Computes post-modifier stats from base values, level, gear and
/// temporary effects.
#[derive(Clone, Copy, Debug)]
pub struct ModifierEngine<'a> {
    config: &'a GameConfig,
    levels: &'a LevelTable,
}

impl<'a> ModifierEngine<'a> {
    pub fn new(config: &'a GameConfig, levels: &'a LevelTable) -> Self {
        Self { config, levels }
    }

    pub fn level_of(&self, xp: u64) -> u32 {
        self.levels.level_of(xp)
    }

    /// Maximum number of spare magazines at the player's level.
    pub fn max_chargers(&self, xp: u64) -> u32 {
        self.levels.spec_for_xp(xp).max_chargers
    }

    /// Effective value of `stat` starting from `base`.
    ///
    /// Expired effects are purged from the player first. Then, in order:
    /// the level modifier, matching temporary effects, and permanent gear.
    /// The result is clamped to the stat's bounds.
    pub fn effective(&self, base: i32, player: &mut Player, stat: StatKind, now: Timestamp) -> i32 {
        player.effects.remove_expired(now);

        let bounds = stat.bounds();
        let mut stack = BonusStack::new();

        let level = self.levels.level_of(player.xp);
        let mut level_bonus = self.levels.modifier(level, stat);
        if stat == StatKind::BefriendRate {
            level_bonus = level_bonus.min(self.config.befriend.level_bonus_cap);
        }
        stack.add(Bonus::Flat(level_bonus));

        for effect in player.effects.active_at(now) {
            match effect.kind.modifies() {
                Some((kind, EffectContract::Additive)) if kind == stat => {
                    stack.add(Bonus::Flat(effect.magnitude));
                }
                Some((kind, EffectContract::Reduction)) if kind == stat => {
                    stack.add(Bonus::Less(effect.magnitude.clamp(0, 100)));
                }
                _ => {}
            }
        }

        let without_gear = stack.apply(base);
        let gear = self.gear_bonus(player.gear, stat);
        let value = if stat == StatKind::Reliability && gear > 0 {
            let cap = self.config.gear.reliability_cap.max(without_gear);
            without_gear.saturating_add(gear).min(cap)
        } else {
            without_gear.saturating_add(gear)
        };

        value.clamp(bounds.min, bounds.max)
    }

    /// [`effective`](Self::effective) using the player's own base value.
    pub fn effective_stat(&self, player: &mut Player, stat: StatKind, now: Timestamp) -> i32 {
        let base = stat.base_of(player, self.config);
        self.effective(base, player, stat, now)
    }

    fn gear_bonus(&self, gear: Gear, stat: StatKind) -> i32 {
        let bonuses = &self.config.gear;
        let mut total = 0;
        match stat {
            StatKind::Accuracy if gear.contains(Gear::SCOPE) => total += bonuses.scope_accuracy,
            StatKind::Reliability => {
                if gear.contains(Gear::GREASE) {
                    total += bonuses.grease_reliability;
                }
                if gear.contains(Gear::BRUSH) {
                    total += bonuses.brush_reliability;
                }
            }
            StatKind::Luck if gear.contains(Gear::LUCKY_CHARM) => total += bonuses.lucky_charm_luck,
            _ => {}
        }
        total
    }

    /// Scales a penalty by the level reached at `xp`.
    ///
    /// The magnitude grows (harsher) or shrinks (gentler) with level but the
    /// sign never changes, and a non-zero penalty never scales to zero.
    pub fn scale_penalty(&self, base_penalty: i64, xp: u64) -> i64 {
        if base_penalty == 0 {
            return 0;
        }

        let scaling = &self.config.penalties.scaling;
        let steps = u64::from(self.levels.level_of(xp).saturating_sub(1));
        let step = u64::from(scaling.step_percent);
        let percent = match scaling.policy {
            ScalingPolicy::Harsher => {
                let ceiling = u64::from(scaling.ceiling_percent).max(100);
                (100 + step.saturating_mul(steps)).min(ceiling)
            }
            ScalingPolicy::Gentler => {
                let floor = u64::from(scaling.floor_percent).min(100);
                100u64.saturating_sub(step.saturating_mul(steps)).max(floor)
            }
            ScalingPolicy::Fixed => 100,
        };

        let magnitude = (base_penalty.unsigned_abs().saturating_mul(percent) / 100).max(1);
        let magnitude = i64::try_from(magnitude).unwrap_or(i64::MAX);
        if base_penalty < 0 { -magnitude } else { magnitude }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerDefaults;
    use crate::state::{EffectKind, PlayerId, TemporaryEffect};

    fn player() -> Player {
        Player::new(PlayerId::new("bob"), &PlayerDefaults::default())
    }

    #[test]
    fn test_level_one_accuracy_is_base() {
        let config = GameConfig::default();
        let levels = LevelTable::default();
        let engine = ModifierEngine::new(&config, &levels);
        let mut p = player();

        assert_eq!(engine.effective_stat(&mut p, StatKind::Accuracy, Timestamp::ZERO), 65);
    }

    #[test]
    fn test_expired_effect_is_purged_and_ignored() {
        let config = GameConfig::default();
        let levels = LevelTable::default();
        let engine = ModifierEngine::new(&config, &levels);
        let mut p = player();
        p.effects.add(TemporaryEffect {
            kind: EffectKind::Sand,
            magnitude: 40,
            expires_at: Timestamp::from_secs(10),
        });

        let now = Timestamp::from_secs(11);
        assert_eq!(engine.effective_stat(&mut p, StatKind::Accuracy, now), 65);
        assert!(p.effects.is_empty());
    }

    #[test]
    fn test_sand_reduces_after_additive_terms() {
        let config = GameConfig::default();
        let levels = LevelTable::default();
        let engine = ModifierEngine::new(&config, &levels);
        let mut p = player();
        p.gear |= Gear::SCOPE;
        p.effects.add(TemporaryEffect {
            kind: EffectKind::Sand,
            magnitude: 50,
            expires_at: Timestamp::from_secs(60),
        });

        // (65) × 0.5 + scope 5
        assert_eq!(engine.effective_stat(&mut p, StatKind::Accuracy, Timestamp::ZERO), 37);
    }

    #[test]
    fn test_gear_reliability_respects_cap() {
        let config = GameConfig::default();
        let levels = LevelTable::default();
        let engine = ModifierEngine::new(&config, &levels);
        let mut p = player();
        p.reliability = 90;
        p.gear |= Gear::GREASE | Gear::BRUSH;

        assert_eq!(engine.effective_stat(&mut p, StatKind::Reliability, Timestamp::ZERO), 95);
    }

    #[test]
    fn test_scale_penalty_harsher_grows_with_level() {
        let config = GameConfig::default();
        let levels = LevelTable::default();
        let engine = ModifierEngine::new(&config, &levels);

        assert_eq!(engine.scale_penalty(-4, 0), -4);
        // level 11: 100 + 5 × 10 = 150%
        assert_eq!(engine.scale_penalty(-4, 325), -6);
    }

    #[test]
    fn test_scale_penalty_gentler_keeps_a_penalty() {
        let mut config = GameConfig::default();
        config.penalties.scaling.policy = ScalingPolicy::Gentler;
        config.penalties.scaling.floor_percent = 0;
        let levels = LevelTable::default();
        let engine = ModifierEngine::new(&config, &levels);

        assert_eq!(engine.scale_penalty(-2, 10_000), -1);
    }
}
