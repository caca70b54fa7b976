//! Hit, jam and damage formulas.

use crate::config::{GameConfig, GearBonuses, ShootingConfig};
use crate::state::{Gear, HuntStats};

/// Probability (percent) that a shot hits its duck.
///
/// # Formula
///
/// ```text
/// chance = max(accuracy - malus, floor) + sunglasses + mirror
/// clamped to [0, cap]
/// ```
///
/// `accuracy` is the shooter's effective accuracy, which already carries
/// level, scope and temporary effects. Perfect aim bypasses the formula and
/// always hits.
pub fn hit_chance(accuracy: i32, malus: i32, gear: Gear, perfect_aim: bool, config: &GameConfig) -> i32 {
    if perfect_aim {
        return 100;
    }

    let shooting = &config.shooting;
    let mut chance = accuracy.saturating_sub(malus).max(shooting.hit_chance_floor);
    if gear.contains(Gear::SUNGLASSES) {
        chance += config.gear.sunglasses_hit;
    }
    if gear.contains(Gear::MIRROR) {
        chance += config.gear.mirror_hit;
    }
    chance.clamp(0, shooting.hit_chance_cap)
}

/// Probability (percent) that firing jams the gun.
///
/// # Formula
///
/// ```text
/// wear    = min(shots_fired / wear_shots_per_point, wear_penalty_cap)
/// history = min(jammed / jams_per_point, jam_history_cap)
/// chance  = 100 - reliability + jam_chance + wear + history
/// clamped to [0, 100]
/// ```
pub fn jam_chance(reliability: i32, jam: i32, stats: &HuntStats, shooting: &ShootingConfig) -> i32 {
    let wear = ratio(stats.shots_fired, shooting.wear_shots_per_point).min(shooting.wear_penalty_cap);
    let history = ratio(stats.jammed, shooting.jams_per_point).min(shooting.jam_history_cap);
    (100 - reliability + jam + wear + history).clamp(0, 100)
}

fn ratio(count: u32, per_point: u32) -> i32 {
    if per_point == 0 {
        return 0;
    }
    i32::try_from(count / per_point).unwrap_or(i32::MAX)
}

/// Health removed by one hit. Special ammunition adds to the base point.
pub fn shot_damage(gear: Gear, bonuses: &GearBonuses) -> u32 {
    if gear.intersects(Gear::AP_AMMO | Gear::EXPLOSIVE_AMMO) {
        1 + bonuses.special_ammo_damage
    } else {
        1
    }
}
