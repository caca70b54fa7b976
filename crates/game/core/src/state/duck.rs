//! Duck entities.

use crate::state::{ChannelId, DuckId, Timestamp};

/// Duck varieties. Weights, XP and difficulty live in
/// [`DuckConfig`](crate::config::DuckConfig).
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DuckKind {
    #[default]
    Normal,
    Rare,
    Golden,
    Armored,
    Fast,
}

/// Terminal states of a duck. Every fate means "removed from the live set".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum DuckFate {
    Shot,
    Befriended,
    Scared,
    TimedOut,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Duck {
    pub id: DuckId,
    pub channel: ChannelId,
    pub kind: DuckKind,
    pub health: u32,
    pub max_health: u32,
    pub spawned_at: Timestamp,
    /// Lifetime drawn at spawn from the kind's timeout window.
    pub timeout_secs: u64,
    pub hit_attempts: u32,
    fate: Option<DuckFate>,
}

impl Duck {
    pub fn new(
        id: DuckId,
        channel: ChannelId,
        kind: DuckKind,
        max_health: u32,
        spawned_at: Timestamp,
        timeout_secs: u64,
    ) -> Self {
        let max_health = max_health.max(1);
        Self {
            id,
            channel,
            kind,
            health: max_health,
            max_health,
            spawned_at,
            timeout_secs,
            hit_attempts: 0,
            fate: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.fate.is_none()
    }

    pub fn fate(&self) -> Option<DuckFate> {
        self.fate
    }

    /// Instant after which the timeout sweep removes this duck.
    pub fn expires_at(&self) -> Timestamp {
        self.spawned_at.after_secs(self.timeout_secs)
    }

    /// Strictly past the timeout, matching `now - spawned_at > timeout`.
    pub fn has_timed_out(&self, now: Timestamp) -> bool {
        now.millis_since(self.spawned_at) > self.timeout_secs.saturating_mul(1_000)
    }

    /// Applies `damage`. Returns the remaining health.
    pub fn wound(&mut self, damage: u32) -> u32 {
        self.health = self.health.saturating_sub(damage);
        self.health
    }

    /// Records the terminal state. A resolved duck never becomes alive again,
    /// so only the first call has an effect.
    pub(crate) fn resolve(&mut self, fate: DuckFate) -> bool {
        if self.fate.is_some() {
            return false;
        }
        self.fate = Some(fate);
        true
    }
}
