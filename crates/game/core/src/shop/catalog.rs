//! Shop catalog: item definitions and their effect variants.

use std::collections::BTreeMap;

use crate::state::{EffectKind, Gear, ItemId};

/// Whether an item may, must or must not be aimed at another player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TargetRule {
    /// Acts on the user only.
    #[default]
    Forbidden,
    /// Acts on the user, or on another player when one is named.
    Optional,
    /// Must be aimed at a player. Such items cannot be banked.
    Required,
}

/// What applying an item does to its subject.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemEffect {
    /// Loads rounds, bounded by magazine capacity.
    Ammo { amount: u32 },
    /// Adds spare magazines, bounded by the level-derived maximum.
    Chargers { amount: u32 },
    Accuracy { delta: i32 },
    Reliability { delta: i32 },
    JamChance { delta: i32 },
    Luck { delta: i32 },
    /// Grants a permanent equipment flag.
    Gear { flag: Gear },
    /// Inserts a temporary effect lasting the item's `duration_secs`.
    Timed { kind: EffectKind, magnitude: i32 },
    /// Removes every active debuff.
    Cleanse,
    /// Returns a confiscated gun, unjammed and loaded.
    RestoreGun,
    /// Lures a duck into the channel. The host performs the spawn.
    CallDuck,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShopItem {
    pub id: ItemId,
    pub name: String,
    /// Price in XP.
    pub price: u64,
    pub effect: ItemEffect,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: TargetRule,
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration_secs: u64,
    /// Per-type inventory cap.
    #[cfg_attr(feature = "serde", serde(default = "ShopItem::default_max_owned"))]
    pub max_owned: u32,
}

impl ShopItem {
    pub const DEFAULT_MAX_OWNED: u32 = 5;

    #[cfg(feature = "serde")]
    fn default_max_owned() -> u32 {
        Self::DEFAULT_MAX_OWNED
    }

    pub fn new(id: u32, name: impl Into<String>, price: u64, effect: ItemEffect) -> Self {
        Self {
            id: ItemId(id),
            name: name.into(),
            price,
            effect,
            target: TargetRule::Forbidden,
            duration_secs: 0,
            max_owned: Self::DEFAULT_MAX_OWNED,
        }
    }

    pub fn with_target(mut self, target: TargetRule) -> Self {
        self.target = target;
        self
    }

    pub fn lasting(mut self, secs: u64) -> Self {
        self.duration_secs = secs;
        self
    }

    pub fn max_owned(mut self, cap: u32) -> Self {
        self.max_owned = cap;
        self
    }

    pub fn requires_target(&self) -> bool {
        self.target == TargetRule::Required
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("item id {0} is defined more than once")]
    DuplicateId(ItemId),

    #[error("item {0} has a timed effect but no duration")]
    MissingDuration(ItemId),
}

/// Immutable item catalog, keyed by id.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<ShopItem>", into = "Vec<ShopItem>"))]
pub struct ShopCatalog {
    items: BTreeMap<ItemId, ShopItem>,
}

impl ShopCatalog {
    pub fn new(items: Vec<ShopItem>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for item in items {
            if matches!(item.effect, ItemEffect::Timed { .. }) && item.duration_secs == 0 {
                return Err(CatalogError::MissingDuration(item.id));
            }
            let id = item.id;
            if map.insert(id, item).is_some() {
                return Err(CatalogError::DuplicateId(id));
            }
        }
        Ok(Self { items: map })
    }

    pub fn get(&self, id: ItemId) -> Option<&ShopItem> {
        self.items.get(&id)
    }

    /// Items in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ShopItem> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl TryFrom<Vec<ShopItem>> for ShopCatalog {
    type Error = CatalogError;

    fn try_from(items: Vec<ShopItem>) -> Result<Self, Self::Error> {
        Self::new(items)
    }
}

impl From<ShopCatalog> for Vec<ShopItem> {
    fn from(catalog: ShopCatalog) -> Self {
        catalog.items.into_values().collect()
    }
}

const HOUR: u64 = 3_600;
const DAY: u64 = 24 * HOUR;

impl Default for ShopCatalog {
    /// Stock item list.
    fn default() -> Self {
        use ItemEffect as Fx;
        use TargetRule::{Optional, Required};

        let items = vec![
            ShopItem::new(1, "Extra bullet", 7, Fx::Ammo { amount: 1 })
                .with_target(Optional)
                .max_owned(10),
            ShopItem::new(2, "Extra clip", 20, Fx::Chargers { amount: 1 }).with_target(Optional),
            ShopItem::new(3, "AP ammo", 15, Fx::Gear { flag: Gear::AP_AMMO }),
            ShopItem::new(4, "Explosive ammo", 25, Fx::Gear { flag: Gear::EXPLOSIVE_AMMO }),
            ShopItem::new(5, "Repurchase confiscated gun", 40, Fx::RestoreGun),
            ShopItem::new(6, "Grease", 8, Fx::Gear { flag: Gear::GREASE }),
            ShopItem::new(7, "Sight", 6, Fx::Gear { flag: Gear::SCOPE }),
            ShopItem::new(8, "Infrared detector", 15, Fx::Timed {
                kind: EffectKind::PerfectAim,
                magnitude: 0,
            })
            .lasting(600),
            ShopItem::new(9, "Silencer", 5, Fx::Gear { flag: Gear::SILENCER }),
            ShopItem::new(10, "Four-leaf clover", 13, Fx::Gear { flag: Gear::LUCKY_CHARM }),
            ShopItem::new(11, "Shotgun", 100, Fx::Accuracy { delta: 5 }).max_owned(1),
            ShopItem::new(12, "Assault rifle", 200, Fx::Reliability { delta: 10 }).max_owned(1),
            ShopItem::new(13, "Sniper rifle", 350, Fx::Accuracy { delta: 15 }).max_owned(1),
            ShopItem::new(14, "Automatic shotgun", 500, Fx::Accuracy { delta: 20 }).max_owned(1),
            ShopItem::new(15, "Handful of sand", 7, Fx::Timed {
                kind: EffectKind::Sand,
                magnitude: 20,
            })
            .with_target(Required)
            .lasting(15 * 60),
            ShopItem::new(16, "Water bucket", 10, Fx::Timed {
                kind: EffectKind::WetClothes,
                magnitude: 0,
            })
            .with_target(Required)
            .lasting(15 * 60),
            ShopItem::new(17, "Sabotage", 14, Fx::Timed {
                kind: EffectKind::Sabotage,
                magnitude: 30,
            })
            .with_target(Required)
            .lasting(HOUR),
            ShopItem::new(18, "Life insurance", 10, Fx::Timed {
                kind: EffectKind::Insurance,
                magnitude: 0,
            })
            .lasting(DAY),
            ShopItem::new(19, "Liability insurance", 5, Fx::Timed {
                kind: EffectKind::Insurance,
                magnitude: 0,
            })
            .lasting(HOUR),
            ShopItem::new(20, "Decoy", 80, Fx::Timed {
                kind: EffectKind::AttractDucks,
                magnitude: 150,
            })
            .lasting(HOUR),
            ShopItem::new(21, "Piece of bread", 50, Fx::Timed {
                kind: EffectKind::AttractDucks,
                magnitude: 200,
            })
            .lasting(10 * 60),
            ShopItem::new(22, "Ducks detector", 50, Fx::Timed {
                kind: EffectKind::DuckRadar,
                magnitude: 0,
            })
            .lasting(DAY),
            ShopItem::new(23, "Mechanical duck", 50, Fx::CallDuck),
            ShopItem::new(24, "Spare clothes", 12, Fx::Cleanse).with_target(Optional),
        ];

        Self {
            items: items.into_iter().map(|item| (item.id, item)).collect(),
        }
    }
}
