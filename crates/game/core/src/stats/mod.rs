//! Stat pipeline: level progression, bonus stacking and effective values.
//!
//! Every stat read used by combat and the shop goes through
//! [`ModifierEngine`], which purges expired temporary effects before
//! computing anything, so a stale effect can never influence a roll.
mod bonus;
mod levels;
mod modifier;

pub use bonus::{Bonus, BonusStack, StatBounds};
pub use levels::{LevelSpec, LevelTable, LevelTableError};
pub use modifier::{ModifierEngine, StatKind};
