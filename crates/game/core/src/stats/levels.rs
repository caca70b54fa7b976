//! XP → level progression table.

use crate::stats::StatKind;

/// One row of the level table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelSpec {
    /// Minimum XP to hold this level.
    pub xp: u64,
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub accuracy: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub reliability: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub befriend: i32,
    pub max_chargers: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LevelTableError {
    #[error("level table must define at least one level")]
    Empty,

    #[error("level {level} threshold {xp} is not above the previous threshold")]
    NotAscending { level: u32, xp: u64 },
}

/// Ascending XP thresholds. Level numbers are 1-based row indices.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<LevelSpec>", into = "Vec<LevelSpec>"))]
pub struct LevelTable {
    levels: Vec<LevelSpec>,
}

impl LevelTable {
    pub fn new(levels: Vec<LevelSpec>) -> Result<Self, LevelTableError> {
        if levels.is_empty() {
            return Err(LevelTableError::Empty);
        }
        for (index, pair) in levels.windows(2).enumerate() {
            if pair[1].xp <= pair[0].xp {
                return Err(LevelTableError::NotAscending {
                    level: index as u32 + 2,
                    xp: pair[1].xp,
                });
            }
        }
        Ok(Self { levels })
    }

    /// Level for `xp`.
    ///
    /// XP below the first threshold is level 1; XP beyond the last threshold
    /// stays at the top level.
    pub fn level_of(&self, xp: u64) -> u32 {
        let reached = self.levels.partition_point(|spec| spec.xp <= xp);
        reached.max(1) as u32
    }

    pub fn max_level(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Row for `level`, clamped into the table.
    pub fn spec(&self, level: u32) -> &LevelSpec {
        let index = (level.max(1) as usize - 1).min(self.levels.len() - 1);
        &self.levels[index]
    }

    pub fn spec_for_xp(&self, xp: u64) -> &LevelSpec {
        self.spec(self.level_of(xp))
    }

    pub fn title_of(&self, xp: u64) -> &str {
        &self.spec_for_xp(xp).title
    }

    /// XP still needed for the next level, zero at the top level.
    pub fn xp_to_next(&self, xp: u64) -> u64 {
        let level = self.level_of(xp) as usize;
        self.levels
            .get(level)
            .map(|next| next.xp.saturating_sub(xp))
            .unwrap_or(0)
    }

    /// Additive modifier the level grants to `stat`.
    pub fn modifier(&self, level: u32, stat: StatKind) -> i32 {
        let spec = self.spec(level);
        match stat {
            StatKind::Accuracy => spec.accuracy,
            StatKind::Reliability => spec.reliability,
            StatKind::BefriendRate => spec.befriend,
            StatKind::JamChance | StatKind::Luck => 0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelSpec> {
        self.levels.iter()
    }
}

impl TryFrom<Vec<LevelSpec>> for LevelTable {
    type Error = LevelTableError;

    fn try_from(levels: Vec<LevelSpec>) -> Result<Self, Self::Error> {
        Self::new(levels)
    }
}

impl From<LevelTable> for Vec<LevelSpec> {
    fn from(table: LevelTable) -> Self {
        table.levels
    }
}

const STOCK_LEVELS: [(u64, &str); 40] = [
    (0, "Duck Harasser"),
    (10, "Unemployed"),
    (25, "Hunter Apprentice"),
    (45, "Duck Tracker"),
    (70, "Sharp Shooter"),
    (100, "Hunter"),
    (135, "Experienced Hunter"),
    (175, "Skilled Hunter"),
    (220, "Expert Hunter"),
    (270, "Master Hunter"),
    (325, "Duck Slayer"),
    (385, "Duck Terminator"),
    (450, "Duck Destroyer"),
    (520, "Duck Exterminator"),
    (595, "Duck Assassin"),
    (675, "Legendary Hunter"),
    (760, "Elite Hunter"),
    (850, "Supreme Hunter"),
    (945, "Ultimate Hunter"),
    (1045, "Godlike Hunter"),
    (1150, "Duck Nightmare"),
    (1260, "Duck Executioner"),
    (1375, "Duck Eliminator"),
    (1495, "Duck Obliterator"),
    (1620, "Duck Annihilator"),
    (1750, "Duck Devastator"),
    (1885, "Duck Vanquisher"),
    (2025, "Duck Conqueror"),
    (2170, "Duck Dominator"),
    (2320, "Duck Emperor"),
    (2475, "Duck Overlord"),
    (2635, "Duck Deity"),
    (2800, "Duck God"),
    (2970, "Duck Nemesis"),
    (3145, "Duck Apocalypse"),
    (3325, "Duck Armageddon"),
    (3510, "Duck Ragnarok"),
    (3700, "Duck Cataclysm"),
    (3895, "Duck Holocaust"),
    (4095, "Duck Genesis"),
];

impl Default for LevelTable {
    /// Stock 40-level progression.
    fn default() -> Self {
        let levels = STOCK_LEVELS
            .iter()
            .enumerate()
            .map(|(index, (xp, title))| {
                let step = index as i32;
                LevelSpec {
                    xp: *xp,
                    title: (*title).to_string(),
                    accuracy: step / 3,
                    reliability: step / 4,
                    befriend: (step * 2).min(20),
                    max_chargers: 2 + index as u32 / 10,
                }
            })
            .collect();
        Self { levels }
    }
}
