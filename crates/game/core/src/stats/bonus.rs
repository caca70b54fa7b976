//! Bonus application stack.
//!
//! Every effective stat is computed the same way:
//! Flat → Less, then gear and clamping in the modifier engine.

/// A single bonus that can be applied to a stat value.
///
/// - **Flat**: additive, applied first (level modifiers, sabotage)
/// - **Less**: sequential reductions (e.g. sand in the sights, ×0.7)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bonus {
    Flat(i32),
    /// Stored as percentage (10 = ×0.9).
    Less(i32),
}

/// A collection of bonuses applied in a fixed order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BonusStack {
    bonuses: Vec<Bonus>,
}

impl BonusStack {
    pub fn new() -> Self {
        Self {
            bonuses: Vec::new(),
        }
    }

    pub fn add(&mut self, bonus: Bonus) {
        self.bonuses.push(bonus);
    }

    /// Applies all bonuses to `base`. Clamping is left to the caller.
    ///
    /// ```text
    /// result = (base + flat_sum) × less_product
    /// ```
    pub fn apply(&self, base: i32) -> i32 {
        let flat_sum: i64 = self
            .bonuses
            .iter()
            .filter_map(|b| match b {
                Bonus::Flat(v) => Some(i64::from(*v)),
                Bonus::Less(_) => None,
            })
            .sum();

        let after_less = self
            .bonuses
            .iter()
            .filter_map(|b| match b {
                Bonus::Less(p) => Some(i64::from(*p)),
                Bonus::Flat(_) => None,
            })
            .fold(i64::from(base) + flat_sum, |acc, less| acc * (100 - less).max(0) / 100);

        after_less.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
}

/// Valid range of a stat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatBounds {
    pub min: i32,
    pub max: i32,
}

impl StatBounds {
    pub const ACCURACY: Self = Self { min: 10, max: 100 };
    pub const PERCENT: Self = Self { min: 0, max: 100 };
    pub const BEFRIEND_RATE: Self = Self { min: 5, max: 95 };
}
