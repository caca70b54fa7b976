//! Combat outcome types.
//!
//! Every gameplay branch, including the unlucky ones, is an ordinary
//! variant here. Presentation renders these values; the engine itself never
//! produces text.

use crate::state::{Duck, DuckId, DuckKind, ItemId, PlayerId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JamCause {
    /// The gun was already jammed; nothing was fired.
    AlreadyJammed,
    /// The round was spent and the gun jammed.
    Misfire,
}

/// A stray shot that landed on another player.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FriendlyFire {
    pub victim: PlayerId,
    pub xp_lost: u64,
    /// The victim's insurance absorbed the loss.
    pub insured: bool,
}

/// Something found in the bushes after a kill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Loot {
    Stashed(ItemId),
    /// Found but the inventory had no room for it.
    Lost(ItemId),
}

impl Loot {
    pub fn item(self) -> ItemId {
        match self {
            Self::Stashed(item) | Self::Lost(item) => item,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitReport {
    /// Snapshot of the target after the hit. Carries the `Shot` fate on a kill.
    pub duck: Duck,
    pub hit_chance: i32,
    pub killed: bool,
    pub xp_gained: u64,
    pub lucky_shot: bool,
    /// Milliseconds from spawn to the killing shot.
    pub reaction_ms: Option<u64>,
    /// Other ducks that fled at the sound of the kill.
    pub scared: Vec<Duck>,
    pub loot: Option<Loot>,
    /// Players whose confiscated guns this kill handed back.
    pub rearmed: Vec<PlayerId>,
    pub ammo_left: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MissReport {
    pub duck: DuckId,
    pub kind: DuckKind,
    pub hit_chance: i32,
    pub xp_lost: u64,
    pub friendly_fire: Option<FriendlyFire>,
    /// The missed duck fled after repeated attempts.
    pub fled: Option<Duck>,
    pub ammo_left: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShootOutcome {
    Confiscated,
    /// Soaked clothes; nothing was fired.
    Wet,
    Jammed(JamCause),
    Empty,
    /// Fired with no duck around: penalties applied and the gun confiscated.
    WildFire {
        xp_lost: u64,
        friendly_fire: Option<FriendlyFire>,
    },
    Hit(HitReport),
    Miss(MissReport),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReloadOutcome {
    Unjammed,
    AlreadyFull,
    NoChargers,
    Reloaded { ammo: u32, chargers_left: u32 },
    JammedOnReload,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BefriendOutcome {
    NoDuck,
    Success {
        duck: Duck,
        rate: i32,
        xp_gained: u64,
    },
    Refused {
        duck: DuckId,
        rate: i32,
        xp_lost: u64,
    },
    ScaredAway {
        duck: Duck,
        rate: i32,
        xp_lost: u64,
    },
}

impl ShootOutcome {
    /// Ducks that left the channel as a result of this shot.
    pub fn departed(&self) -> Vec<&Duck> {
        match self {
            Self::Hit(report) => {
                let mut gone: Vec<&Duck> = report.scared.iter().collect();
                if report.killed {
                    gone.insert(0, &report.duck);
                }
                gone
            }
            Self::Miss(report) => report.fled.iter().collect(),
            _ => Vec::new(),
        }
    }
}

impl BefriendOutcome {
    pub fn departed(&self) -> Option<&Duck> {
        match self {
            Self::Success { duck, .. } | Self::ScaredAway { duck, .. } => Some(duck),
            _ => None,
        }
    }
}
