//! Effect dispatch shared by the purchase and use paths.

use crate::shop::{ItemEffect, ShopItem};
use crate::state::{EffectKind, Gear, Player, TemporaryEffect, Timestamp};
use crate::stats::{ModifierEngine, StatKind};

/// What applying an item actually changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectResult {
    AmmoLoaded { added: u32, ammo: u32, capacity: u32 },
    ChargersAdded { added: u32, chargers: u32, max: u32 },
    StatChanged { stat: StatKind, before: i32, after: i32 },
    GearEquipped { flag: Gear },
    EffectApplied { kind: EffectKind, expires_at: Timestamp },
    Cleansed { removed: usize },
    GunRestored { was_confiscated: bool },
    /// The caller should spawn a duck in the user's channel.
    DuckCalled,
}

/// Applies `item` to `subject`.
///
/// Never fails: bounds are enforced by clamping, so an item whose effect is
/// already saturated still resolves, with `added == 0` or `before == after`.
pub fn apply_effect(
    subject: &mut Player,
    item: &ShopItem,
    modifiers: &ModifierEngine<'_>,
    now: Timestamp,
) -> EffectResult {
    match item.effect {
        ItemEffect::Ammo { amount } => {
            let added = subject.weapon.load(amount);
            EffectResult::AmmoLoaded {
                added,
                ammo: subject.weapon.ammo,
                capacity: subject.weapon.capacity,
            }
        }
        ItemEffect::Chargers { amount } => {
            let max = modifiers.max_chargers(subject.xp);
            let current = subject.weapon.chargers;
            let chargers = current.max(current.saturating_add(amount).min(max));
            subject.weapon.chargers = chargers;
            EffectResult::ChargersAdded {
                added: chargers - current,
                chargers,
                max,
            }
        }
        ItemEffect::Accuracy { delta } => shift_stat(subject, StatKind::Accuracy, delta),
        ItemEffect::Reliability { delta } => shift_stat(subject, StatKind::Reliability, delta),
        ItemEffect::JamChance { delta } => shift_stat(subject, StatKind::JamChance, delta),
        ItemEffect::Luck { delta } => shift_stat(subject, StatKind::Luck, delta),
        ItemEffect::Gear { flag } => {
            subject.gear.insert(flag);
            EffectResult::GearEquipped { flag }
        }
        ItemEffect::Timed { kind, magnitude } => {
            subject.effects.remove_expired(now);
            subject.effects.add(TemporaryEffect {
                kind,
                magnitude,
                expires_at: now.after_secs(item.duration_secs),
            });
            let expires_at = subject
                .effects
                .get(kind, now)
                .map_or(now.after_secs(item.duration_secs), |e| e.expires_at);
            EffectResult::EffectApplied { kind, expires_at }
        }
        ItemEffect::Cleanse => EffectResult::Cleansed {
            removed: subject.effects.cleanse(),
        },
        ItemEffect::RestoreGun => {
            let was_confiscated = subject.weapon.confiscated;
            subject.weapon.confiscated = false;
            subject.weapon.jammed = false;
            subject.weapon.refill();
            EffectResult::GunRestored { was_confiscated }
        }
        ItemEffect::CallDuck => EffectResult::DuckCalled,
    }
}

fn shift_stat(subject: &mut Player, stat: StatKind, delta: i32) -> EffectResult {
    let bounds = stat.bounds();
    let slot = match stat {
        StatKind::Accuracy => &mut subject.accuracy,
        StatKind::Reliability => &mut subject.reliability,
        StatKind::JamChance => &mut subject.jam_chance,
        StatKind::Luck | StatKind::BefriendRate => &mut subject.luck,
    };
    let before = *slot;
    *slot = before.saturating_add(delta).clamp(bounds.min, bounds.max);
    EffectResult::StatChanged {
        stat,
        before,
        after: *slot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::state::PlayerId;
    use crate::stats::LevelTable;

    fn setup() -> (GameConfig, LevelTable, Player) {
        let config = GameConfig::default();
        let player = Player::new(PlayerId::new("alice"), &config.player);
        (config, LevelTable::default(), player)
    }

    #[test]
    fn test_ammo_bounded_by_capacity() {
        let (config, levels, mut player) = setup();
        player.weapon.ammo = 5;
        let item = ShopItem::new(1, "bullets", 1, ItemEffect::Ammo { amount: 3 });

        let result = apply_effect(&mut player, &item, &ModifierEngine::new(&config, &levels), Timestamp::ZERO);
        assert_eq!(
            result,
            EffectResult::AmmoLoaded {
                added: 1,
                ammo: 6,
                capacity: 6
            }
        );
    }

    #[test]
    fn test_chargers_bounded_by_level() {
        let (config, levels, mut player) = setup();
        let item = ShopItem::new(2, "clip", 1, ItemEffect::Chargers { amount: 5 });

        let result = apply_effect(&mut player, &item, &ModifierEngine::new(&config, &levels), Timestamp::ZERO);
        assert_eq!(
            result,
            EffectResult::ChargersAdded {
                added: 0,
                chargers: 2,
                max: 2
            }
        );
    }

    #[test]
    fn test_stat_delta_is_clamped() {
        let (config, levels, mut player) = setup();
        let item = ShopItem::new(11, "rifle", 1, ItemEffect::Accuracy { delta: 80 });

        let result = apply_effect(&mut player, &item, &ModifierEngine::new(&config, &levels), Timestamp::ZERO);
        assert_eq!(
            result,
            EffectResult::StatChanged {
                stat: StatKind::Accuracy,
                before: 65,
                after: 100
            }
        );
    }

    #[test]
    fn test_timed_effect_uses_absolute_expiry() {
        let (config, levels, mut player) = setup();
        let item = ShopItem::new(
            17,
            "sabotage",
            1,
            ItemEffect::Timed {
                kind: EffectKind::Sabotage,
                magnitude: 30,
            },
        )
        .lasting(60);
        let now = Timestamp::from_secs(100);

        let result = apply_effect(&mut player, &item, &ModifierEngine::new(&config, &levels), now);
        assert_eq!(
            result,
            EffectResult::EffectApplied {
                kind: EffectKind::Sabotage,
                expires_at: Timestamp::from_secs(160)
            }
        );
        assert!(player.has_effect(EffectKind::Sabotage, Timestamp::from_secs(159)));
        assert!(!player.has_effect(EffectKind::Sabotage, Timestamp::from_secs(160)));
    }

    #[test]
    fn test_restore_gun_clears_confiscation() {
        let (config, levels, mut player) = setup();
        player.weapon.confiscated = true;
        player.weapon.jammed = true;
        player.weapon.ammo = 0;
        let item = ShopItem::new(5, "gun", 1, ItemEffect::RestoreGun);

        let result = apply_effect(&mut player, &item, &ModifierEngine::new(&config, &levels), Timestamp::ZERO);
        assert_eq!(result, EffectResult::GunRestored { was_confiscated: true });
        assert!(!player.weapon.confiscated && !player.weapon.jammed);
        assert_eq!(player.weapon.ammo, player.weapon.capacity);
    }
}
