//! Combat resolution.
//!
//! - `hit`: pure hit, jam and damage formulas
//! - `result`: typed outcomes for shoot, reload and befriend
//! - `resolver`: [`CombatResolver`], which applies those formulas to the
//!   roster and the channel's live ducks
//!
//! Target selection is always FIFO: the oldest live duck in the channel.

pub mod hit;
mod resolver;
mod result;

pub use hit::{hit_chance, jam_chance, shot_damage};
pub use resolver::CombatResolver;
pub use result::{
    BefriendOutcome, FriendlyFire, HitReport, JamCause, Loot, MissReport, ReloadOutcome,
    ShootOutcome,
};
