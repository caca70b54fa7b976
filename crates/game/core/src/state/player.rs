//! Player record.
//!
//! `level` is deliberately absent: it is always derived from `xp` through the
//! [`LevelTable`](crate::stats::LevelTable).

use crate::config::PlayerDefaults;
use crate::state::{EffectKind, Gear, Inventory, PlayerId, TemporaryEffects, Timestamp};

/// Firearm state. `0 <= ammo <= capacity` holds after every operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weapon {
    pub ammo: u32,
    pub capacity: u32,
    /// Spare magazines. Bounded by the level-derived maximum.
    pub chargers: u32,
    pub jammed: bool,
    pub confiscated: bool,
}

impl Weapon {
    pub fn is_full(&self) -> bool {
        self.ammo >= self.capacity
    }

    pub fn refill(&mut self) {
        self.ammo = self.capacity;
    }

    /// Consumes one round. Returns false if the magazine was empty.
    pub fn fire(&mut self) -> bool {
        if self.ammo == 0 {
            return false;
        }
        self.ammo -= 1;
        true
    }

    /// Adds rounds without exceeding capacity. Returns how many were loaded.
    pub fn load(&mut self, rounds: u32) -> u32 {
        let loaded = rounds.min(self.capacity.saturating_sub(self.ammo));
        self.ammo += loaded;
        loaded
    }
}

/// Cumulative hunting counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HuntStats {
    pub caught: u32,
    pub befriended: u32,
    pub golden_caught: u32,
    pub shots_fired: u32,
    pub missed: u32,
    pub wild_shots: u32,
    pub jammed: u32,
    pub friendly_fire: u32,
    pub items_found: u32,
    pub streak: u32,
    pub best_streak: u32,
    /// Fastest kill, measured from spawn to the killing shot.
    pub best_time_ms: Option<u64>,
}

impl HuntStats {
    pub fn record_kill(&mut self, reaction_ms: u64) {
        self.caught += 1;
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
        self.best_time_ms = Some(match self.best_time_ms {
            Some(best) => best.min(reaction_ms),
            None => reaction_ms,
        });
    }

    pub fn break_streak(&mut self) {
        self.streak = 0;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Player {
    pub version: u32,
    pub id: PlayerId,
    pub xp: u64,
    pub karma: i64,
    pub weapon: Weapon,
    pub accuracy: i32,
    pub reliability: i32,
    pub jam_chance: i32,
    pub luck: i32,
    pub gear: Gear,
    pub inventory: Inventory,
    pub effects: TemporaryEffects,
    pub stats: HuntStats,
}

impl Player {
    /// Record layout version written by this build.
    pub const CURRENT_VERSION: u32 = 2;

    /// Creates a fresh player from configured defaults.
    pub fn new(id: PlayerId, defaults: &PlayerDefaults) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            id,
            xp: defaults.xp,
            karma: 0,
            weapon: Weapon {
                ammo: defaults.ammo,
                capacity: defaults.ammo_capacity,
                chargers: defaults.chargers,
                jammed: false,
                confiscated: false,
            },
            accuracy: defaults.accuracy,
            reliability: defaults.reliability,
            jam_chance: defaults.jam_chance,
            luck: defaults.luck,
            gear: Gear::empty(),
            inventory: Inventory::new(),
            effects: TemporaryEffects::empty(),
            stats: HuntStats::default(),
        }
    }

    pub fn gain_xp(&mut self, amount: u64) {
        self.xp = self.xp.saturating_add(amount);
    }

    /// Deducts XP, flooring at zero. Returns the amount actually removed.
    pub fn lose_xp(&mut self, amount: u64) -> u64 {
        let lost = amount.min(self.xp);
        self.xp -= lost;
        lost
    }

    pub fn adjust_karma(&mut self, delta: i64) {
        self.karma = self.karma.saturating_add(delta);
    }

    pub fn has_effect(&self, kind: EffectKind, now: Timestamp) -> bool {
        self.effects.has(kind, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(PlayerId::new("Alice"), &PlayerDefaults::default())
    }

    #[test]
    fn test_lose_xp_floors_at_zero() {
        let mut p = player();
        p.xp = 3;
        assert_eq!(p.lose_xp(10), 3);
        assert_eq!(p.xp, 0);
    }

    #[test]
    fn test_weapon_load_is_bounded_by_capacity() {
        let mut p = player();
        p.weapon.ammo = 4;
        assert_eq!(p.weapon.load(10), 2);
        assert!(p.weapon.is_full());
    }

    #[test]
    fn test_record_kill_tracks_best_time_and_streak() {
        let mut stats = HuntStats::default();
        stats.record_kill(9_000);
        stats.record_kill(4_000);
        stats.break_streak();
        stats.record_kill(6_000);

        assert_eq!(stats.caught, 3);
        assert_eq!(stats.best_streak, 2);
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.best_time_ms, Some(4_000));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_record_tolerates_missing_counters() {
        use crate::state::ItemId;

        let mut p = player();
        p.inventory.add(ItemId(3));
        let mut json = serde_json::to_value(&p).unwrap();
        json["id"] = "ALICE".into();
        json["stats"] = serde_json::json!({ "caught": 4 });

        let back: Player = serde_json::from_value(json).unwrap();
        assert_eq!(back.id.as_str(), "alice");
        assert_eq!(back.stats.caught, 4);
        assert_eq!(back.stats.best_time_ms, None);
        assert_eq!(back.inventory.count(ItemId(3)), 1);
    }
}
