//! Shop rejections.
//!
//! Every variant is returned before any state is touched: price, inventory
//! and effects change together or not at all.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{ItemId, PlayerId};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShopError {
    #[error("no item with id {0}")]
    InvalidId(ItemId),

    /// Items that act on a target cannot be banked.
    #[error("item {0} must be used on a target and cannot be stored")]
    InvalidStorage(ItemId),

    #[error("item {0} needs a target")]
    TargetRequired(ItemId),

    #[error("item {0} cannot be used on another player")]
    TargetForbidden(ItemId),

    #[error("{target} is not here")]
    TargetNotPresent { target: PlayerId },

    #[error("item {item} costs {price} xp but only {available} xp is available")]
    InsufficientXp {
        item: ItemId,
        price: u64,
        available: u64,
    },

    #[error("already holding {owned} of item {item} (limit {limit})")]
    ItemLimit { item: ItemId, owned: u32, limit: u32 },

    #[error("inventory full ({total}/{capacity})")]
    InventoryFull { total: u32, capacity: u32 },

    #[error("item {0} is not in the inventory")]
    NotOwned(ItemId),

    /// Permanent gear the subject already carries.
    #[error("item {0} is already equipped")]
    AlreadyOwned(ItemId),
}

impl GameError for ShopError {
    fn severity(&self) -> ErrorSeverity {
        use ShopError::*;
        match self {
            InvalidId(_) | InvalidStorage(_) | TargetRequired(_) | TargetForbidden(_) => {
                ErrorSeverity::Validation
            }
            TargetNotPresent { .. } | NotOwned(_) | AlreadyOwned(_) => ErrorSeverity::Validation,
            InsufficientXp { .. } | ItemLimit { .. } | InventoryFull { .. } => {
                ErrorSeverity::Recoverable
            }
        }
    }

    fn error_code(&self) -> &'static str {
        use ShopError::*;
        match self {
            InvalidId(_) => "SHOP_INVALID_ID",
            InvalidStorage(_) => "SHOP_INVALID_STORAGE",
            TargetRequired(_) => "SHOP_TARGET_REQUIRED",
            TargetForbidden(_) => "SHOP_TARGET_FORBIDDEN",
            TargetNotPresent { .. } => "SHOP_TARGET_NOT_PRESENT",
            InsufficientXp { .. } => "SHOP_INSUFFICIENT_XP",
            ItemLimit { .. } => "SHOP_ITEM_LIMIT",
            InventoryFull { .. } => "SHOP_INVENTORY_FULL",
            NotOwned(_) => "SHOP_NOT_OWNED",
            AlreadyOwned(_) => "SHOP_ALREADY_OWNED",
        }
    }
}
