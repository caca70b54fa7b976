//! Game configuration: every probability, bonus and penalty the rules use.
//!
//! All sections implement `Default` with the stock balance, and (with the
//! `serde` feature) every field is optional in serialized form, so a config
//! file only needs to list the values it overrides.

use crate::state::{DuckKind, ItemId};

/// Inclusive `[min, max]` window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Window {
    pub min: u64,
    pub max: u64,
}

impl Window {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// Returns the window with `min <= max` guaranteed.
    pub fn normalized(self) -> Self {
        if self.min <= self.max {
            self
        } else {
            Self::new(self.max, self.min)
        }
    }
}

/// Root configuration.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    pub ducks: DuckConfig,
    pub spawning: SpawnConfig,
    pub shooting: ShootingConfig,
    pub penalties: PenaltyConfig,
    pub befriend: BefriendConfig,
    pub karma: KarmaConfig,
    pub scare: ScareConfig,
    pub player: PlayerDefaults,
    pub gear: GearBonuses,
    pub inventory: InventoryConfig,
}

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    /// One slot per [`EffectKind`](crate::state::EffectKind) with headroom.
    pub const MAX_TEMPORARY_EFFECTS: usize = 8;

    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Ducks
// ============================================================================

/// Balance profile of one duck kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DuckProfile {
    pub kind: DuckKind,
    /// Relative spawn weight. Zero disables random spawns of this kind.
    pub weight: u32,
    pub xp: u64,
    /// Subtracted from the shooter's hit chance.
    pub accuracy_malus: i32,
    pub health: u32,
    /// Overrides [`SpawnConfig::timeout_secs`] for this kind.
    #[cfg_attr(feature = "serde", serde(default))]
    pub timeout_secs: Option<Window>,
    /// Karma awarded for the kill.
    #[cfg_attr(feature = "serde", serde(default))]
    pub karma: Option<i64>,
}

impl DuckProfile {
    pub const fn new(kind: DuckKind, weight: u32, xp: u64, accuracy_malus: i32, health: u32) -> Self {
        Self {
            kind,
            weight,
            xp,
            accuracy_malus,
            health,
            timeout_secs: None,
            karma: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DuckConfig {
    pub kinds: Vec<DuckProfile>,
}

impl DuckConfig {
    /// Profile for `kind`. Kinds missing from the table fall back to the
    /// stock profile so a partial config never leaves a kind undefined.
    pub fn profile(&self, kind: DuckKind) -> DuckProfile {
        self.kinds
            .iter()
            .find(|p| p.kind == kind)
            .copied()
            .unwrap_or_else(|| Self::stock_profile(kind))
    }

    fn stock_profile(kind: DuckKind) -> DuckProfile {
        match kind {
            DuckKind::Normal => DuckProfile::new(DuckKind::Normal, 70, 15, 0, 1),
            DuckKind::Rare => DuckProfile::new(DuckKind::Rare, 15, 25, 10, 1),
            DuckKind::Golden => DuckProfile {
                karma: Some(5),
                ..DuckProfile::new(DuckKind::Golden, 8, 50, 30, 2)
            },
            DuckKind::Armored => DuckProfile {
                karma: Some(5),
                ..DuckProfile::new(DuckKind::Armored, 2, 75, 20, 3)
            },
            DuckKind::Fast => DuckProfile {
                timeout_secs: Some(Window::new(20, 35)),
                ..DuckProfile::new(DuckKind::Fast, 5, 20, 15, 1)
            },
        }
    }
}

impl Default for DuckConfig {
    fn default() -> Self {
        Self {
            kinds: [
                DuckKind::Normal,
                DuckKind::Rare,
                DuckKind::Golden,
                DuckKind::Armored,
                DuckKind::Fast,
            ]
            .into_iter()
            .map(Self::stock_profile)
            .collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpawnConfig {
    /// Delay between scheduled spawns in a channel.
    pub interval_secs: Window,
    pub max_ducks_per_channel: usize,
    /// Default duck lifetime.
    pub timeout_secs: Window,
    /// Cadence of the timeout sweep.
    pub poll_interval_secs: u64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            interval_secs: Window::new(1800, 5400),
            max_ducks_per_channel: 3,
            timeout_secs: Window::new(45, 75),
            poll_interval_secs: 2,
        }
    }
}

// ============================================================================
// Combat
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ShootingConfig {
    pub hit_chance_floor: i32,
    pub hit_chance_cap: i32,
    /// Base chance of a lucky shot, raised by one point per luck point.
    pub lucky_shot_chance: i32,
    pub lucky_shot_multiplier_percent: u64,
    /// Extra XP per luck point on a kill, in percent.
    pub luck_xp_percent_per_point: u64,
    pub bushes_chance: i32,
    /// Item ids that can turn up in the bushes after a kill.
    pub bushes_loot: Vec<ItemId>,
    pub wild_fire_friendly_fire_chance: i32,
    pub ricochet_chance: i32,
    pub explosive_ricochet_chance: i32,
    /// One jam point per this many lifetime shots.
    pub wear_shots_per_point: u32,
    pub wear_penalty_cap: i32,
    /// One jam point per this many past jams.
    pub jams_per_point: u32,
    pub jam_history_cap: i32,
    /// Base accuracy earned by every hit.
    pub accuracy_gain_on_hit: i32,
    /// Base accuracy lost on every miss.
    pub accuracy_loss_on_miss: i32,
    /// A kill hands back every confiscated gun in the channel.
    pub rearm_on_kill: bool,
}

impl Default for ShootingConfig {
    fn default() -> Self {
        Self {
            hit_chance_floor: 10,
            hit_chance_cap: 95,
            lucky_shot_chance: 5,
            lucky_shot_multiplier_percent: 150,
            luck_xp_percent_per_point: 10,
            bushes_chance: 12,
            bushes_loot: vec![ItemId(1), ItemId(2), ItemId(6), ItemId(7), ItemId(9), ItemId(10)],
            wild_fire_friendly_fire_chance: 25,
            ricochet_chance: 8,
            explosive_ricochet_chance: 15,
            wear_shots_per_point: 50,
            wear_penalty_cap: 5,
            jams_per_point: 10,
            jam_history_cap: 5,
            accuracy_gain_on_hit: 1,
            accuracy_loss_on_miss: 2,
            rearm_on_kill: true,
        }
    }
}

/// How penalties grow or shrink with level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ScalingPolicy {
    /// Veterans lose more per mistake.
    #[default]
    Harsher,
    /// Veterans lose less per mistake.
    Gentler,
    /// Level has no influence.
    Fixed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PenaltyScaling {
    pub policy: ScalingPolicy,
    /// Percentage points added (harsher) or removed (gentler) per level above 1.
    pub step_percent: u32,
    /// Lower bound of the gentler multiplier.
    pub floor_percent: u32,
    /// Upper bound of the harsher multiplier.
    pub ceiling_percent: u32,
}

impl Default for PenaltyScaling {
    fn default() -> Self {
        Self {
            policy: ScalingPolicy::Harsher,
            step_percent: 5,
            floor_percent: 25,
            ceiling_percent: 300,
        }
    }
}

/// Base XP penalties, expressed as negative numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PenaltyConfig {
    pub miss: i64,
    pub wild_fire: i64,
    pub friendly_fire_victim: i64,
    pub ricochet_victim: i64,
    pub befriend_fail: i64,
    pub scaling: PenaltyScaling,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            miss: -2,
            wild_fire: -3,
            friendly_fire_victim: -4,
            ricochet_victim: -3,
            befriend_fail: -1,
            scaling: PenaltyScaling::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BefriendConfig {
    pub base_rate: i32,
    pub min_rate: i32,
    pub max_rate: i32,
    /// Cap on the level-table contribution.
    pub level_bonus_cap: i32,
    pub luck_bonus_per_point: i32,
    pub luck_bonus_cap: i32,
    /// On failure, chance that the duck flees instead of staying.
    pub scared_away_chance: i32,
    pub xp_reward: Window,
}

impl Default for BefriendConfig {
    fn default() -> Self {
        Self {
            base_rate: 65,
            min_rate: 5,
            max_rate: 90,
            level_bonus_cap: 20,
            luck_bonus_per_point: 3,
            luck_bonus_cap: 15,
            scared_away_chance: 10,
            xp_reward: Window::new(1, 3),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KarmaConfig {
    pub hit: i64,
    pub miss: i64,
    pub wild_fire: i64,
    pub friendly_fire: i64,
    pub befriend: i64,
    pub befriend_fail: i64,
}

impl Default for KarmaConfig {
    fn default() -> Self {
        Self {
            hit: 2,
            miss: -1,
            wild_fire: -3,
            friendly_fire: -10,
            befriend: 2,
            befriend_fail: -1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScareConfig {
    /// Chance for each other duck to flee after a kill.
    pub after_kill_chance: i32,
    /// Same, when the shooter carries a silencer.
    pub silenced_after_kill_chance: i32,
    pub on_miss_chance: i32,
    pub on_miss_min_attempts: u32,
}

impl Default for ScareConfig {
    fn default() -> Self {
        Self {
            after_kill_chance: 30,
            silenced_after_kill_chance: 0,
            on_miss_chance: 40,
            on_miss_min_attempts: 2,
        }
    }
}

// ============================================================================
// Players and items
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlayerDefaults {
    pub xp: u64,
    pub ammo: u32,
    pub ammo_capacity: u32,
    pub chargers: u32,
    pub accuracy: i32,
    pub reliability: i32,
    pub jam_chance: i32,
    pub luck: i32,
}

impl Default for PlayerDefaults {
    fn default() -> Self {
        Self {
            xp: 0,
            ammo: 6,
            ammo_capacity: 6,
            chargers: 2,
            accuracy: 65,
            reliability: 70,
            jam_chance: 0,
            luck: 0,
        }
    }
}

/// Stat contributions of permanent gear.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GearBonuses {
    pub scope_accuracy: i32,
    pub lucky_charm_luck: i32,
    pub sunglasses_hit: i32,
    pub mirror_hit: i32,
    pub grease_reliability: i32,
    pub brush_reliability: i32,
    /// Gear cannot lift reliability above this value.
    pub reliability_cap: i32,
    /// Extra damage per hit from special ammunition.
    pub special_ammo_damage: u32,
}

impl Default for GearBonuses {
    fn default() -> Self {
        Self {
            scope_accuracy: 5,
            lucky_charm_luck: 5,
            sunglasses_hit: 5,
            mirror_hit: 3,
            grease_reliability: 10,
            brush_reliability: 5,
            reliability_cap: 95,
            special_ammo_damage: 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InventoryConfig {
    pub max_total: u32,
    pub sell_refund_percent: u64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            max_total: 20,
            sell_refund_percent: 70,
        }
    }
}
