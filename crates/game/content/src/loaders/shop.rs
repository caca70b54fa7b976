//! Shop catalog loader.

use std::path::Path;

use duckhunt_core::{ShopCatalog, ShopItem};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Item catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopFile {
    pub items: Vec<ShopItem>,
}

/// Loader for the shop catalog from RON files.
pub struct ShopLoader;

impl ShopLoader {
    /// Load the item catalog from a RON file.
    ///
    /// Duplicate ids and timed effects without a duration are rejected.
    pub fn load(path: &Path) -> LoadResult<ShopCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<ShopCatalog> {
        let file: ShopFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse shop catalog RON: {}", e))?;

        ShopCatalog::new(file.items).map_err(|e| anyhow::anyhow!("Invalid shop catalog: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duckhunt_core::{EffectKind, ItemEffect, ItemId, TargetRule};

    #[test]
    fn test_parse_items_with_defaults() {
        let catalog = ShopLoader::parse(
            r#"(
                items: [
                    (id: 1, name: "Extra bullet", price: 7, effect: Ammo(amount: 1), target: optional),
                    (
                        id: 17,
                        name: "Sabotage",
                        price: 14,
                        effect: Timed(kind: sabotage, magnitude: 30),
                        target: required,
                        duration_secs: 3600,
                    ),
                ],
            )"#,
        )
        .unwrap();

        let bullet = catalog.get(ItemId(1)).unwrap();
        assert_eq!(bullet.target, TargetRule::Optional);
        assert_eq!(bullet.max_owned, ShopItem::DEFAULT_MAX_OWNED);

        let sabotage = catalog.get(ItemId(17)).unwrap();
        assert!(sabotage.requires_target());
        assert_eq!(
            sabotage.effect,
            ItemEffect::Timed {
                kind: EffectKind::Sabotage,
                magnitude: 30
            }
        );
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = ShopLoader::parse(
            r#"(items: [
                (id: 3, name: "a", price: 1, effect: Cleanse),
                (id: 3, name: "b", price: 1, effect: Cleanse),
            ])"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("defined more than once"));
    }
}
