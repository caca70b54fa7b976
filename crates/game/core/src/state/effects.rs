//! Time-boxed modifiers attached to a player.
//!
//! Effects store an absolute `expires_at` rather than a countdown, so liveness
//! is a pure function of `now`. An effect counts as active while
//! `now < expires_at`. Stat reads go through
//! [`ModifierEngine`](crate::stats::ModifierEngine), which purges expired
//! entries before computing anything.

use arrayvec::ArrayVec;

use crate::config::GameConfig;
use crate::state::Timestamp;
use crate::stats::StatKind;

/// How an effect's magnitude combines with the stat it targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectContract {
    /// Magnitude is added to the stat (negative for debuffs).
    Additive,
    /// Magnitude is a percentage reduction applied after additive terms.
    Reduction,
}

/// Kinds of temporary effects.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EffectKind {
    // ========================================================================
    // Debuffs (applied to a target)
    // ========================================================================
    /// Raises jam chance by `magnitude` points.
    Sabotage,

    /// Drenched clothes: the holder cannot shoot until they dry.
    WetClothes,

    /// Sand in the sights: accuracy reduced by `magnitude` percent.
    Sand,

    // ========================================================================
    // Buffs and markers
    // ========================================================================
    /// Spawn interval divided by `magnitude / 100` for the holder's channels.
    AttractDucks,

    /// Friendly-fire penalties against the holder's XP are waived.
    Insurance,

    /// Hit chance forced to 100.
    PerfectAim,

    /// Holder is notified of every spawn in channels they hunt.
    DuckRadar,
}

impl EffectKind {
    /// Stat this effect feeds into, if any, and how.
    pub const fn modifies(self) -> Option<(StatKind, EffectContract)> {
        match self {
            Self::Sabotage => Some((StatKind::JamChance, EffectContract::Additive)),
            Self::Sand => Some((StatKind::Accuracy, EffectContract::Reduction)),
            Self::WetClothes
            | Self::AttractDucks
            | Self::Insurance
            | Self::PerfectAim
            | Self::DuckRadar => None,
        }
    }

    /// Debuffs are the effects a cleansing item removes.
    pub const fn is_debuff(self) -> bool {
        matches!(self, Self::Sabotage | Self::WetClothes | Self::Sand)
    }
}

/// A single temporary effect with its absolute expiry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemporaryEffect {
    pub kind: EffectKind,
    pub magnitude: i32,
    pub expires_at: Timestamp,
}

impl TemporaryEffect {
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        now < self.expires_at
    }
}

/// Ordered set of temporary effects, at most one entry per kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemporaryEffects {
    effects: ArrayVec<TemporaryEffect, { GameConfig::MAX_TEMPORARY_EFFECTS }>,
}

impl TemporaryEffects {
    pub fn empty() -> Self {
        Self {
            effects: ArrayVec::new(),
        }
    }

    /// Checks if an effect of `kind` is active at `now`.
    pub fn has(&self, kind: EffectKind, now: Timestamp) -> bool {
        self.effects
            .iter()
            .any(|e| e.kind == kind && e.is_active_at(now))
    }

    /// Returns the active effect of `kind`, if any.
    pub fn get(&self, kind: EffectKind, now: Timestamp) -> Option<&TemporaryEffect> {
        self.effects
            .iter()
            .find(|e| e.kind == kind && e.is_active_at(now))
    }

    /// Adds an effect.
    ///
    /// If the kind is already present, the entry keeps the later expiry and
    /// the magnitude with the larger absolute value.
    pub fn add(&mut self, effect: TemporaryEffect) {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            existing.expires_at = existing.expires_at.max(effect.expires_at);
            if effect.magnitude.unsigned_abs() > existing.magnitude.unsigned_abs() {
                existing.magnitude = effect.magnitude;
            }
            return;
        }

        if !self.effects.is_full() {
            self.effects.push(effect);
        }
    }

    /// Removes every debuff regardless of expiry. Returns how many were removed.
    pub fn cleanse(&mut self) -> usize {
        let before = self.effects.len();
        self.effects.retain(|e| !e.kind.is_debuff());
        before - self.effects.len()
    }

    /// Drops every effect whose expiry has passed.
    pub fn remove_expired(&mut self, now: Timestamp) {
        self.effects.retain(|e| e.is_active_at(now));
    }

    /// Active effects at `now`, in insertion order.
    pub fn active_at(&self, now: Timestamp) -> impl Iterator<Item = &TemporaryEffect> + '_ {
        self.effects.iter().filter(move |e| e.is_active_at(now))
    }

    /// All stored effects, including ones that expired but were not yet purged.
    pub fn iter(&self) -> impl Iterator<Item = &TemporaryEffect> {
        self.effects.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect(kind: EffectKind, magnitude: i32, expires_ms: u64) -> TemporaryEffect {
        TemporaryEffect {
            kind,
            magnitude,
            expires_at: Timestamp::from_millis(expires_ms),
        }
    }

    #[test]
    fn test_add_extends_and_keeps_stronger_magnitude() {
        let mut effects = TemporaryEffects::empty();
        effects.add(effect(EffectKind::Sabotage, 40, 1_000));
        effects.add(effect(EffectKind::Sabotage, 10, 5_000));

        assert_eq!(effects.len(), 1);
        let stored = effects.get(EffectKind::Sabotage, Timestamp::ZERO).copied();
        assert_eq!(stored, Some(effect(EffectKind::Sabotage, 40, 5_000)));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let mut effects = TemporaryEffects::empty();
        effects.add(effect(EffectKind::PerfectAim, 0, 1_000));

        assert!(effects.has(EffectKind::PerfectAim, Timestamp::from_millis(999)));
        assert!(!effects.has(EffectKind::PerfectAim, Timestamp::from_millis(1_000)));

        effects.remove_expired(Timestamp::from_millis(1_000));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_cleanse_only_removes_debuffs() {
        let mut effects = TemporaryEffects::empty();
        effects.add(effect(EffectKind::Sabotage, 15, 10_000));
        effects.add(effect(EffectKind::Sand, 30, 10_000));
        effects.add(effect(EffectKind::Insurance, 0, 10_000));

        assert_eq!(effects.cleanse(), 2);
        assert!(effects.has(EffectKind::Insurance, Timestamp::ZERO));
        assert!(!effects.has(EffectKind::Sabotage, Timestamp::ZERO));
    }
}
