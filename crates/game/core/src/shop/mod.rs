//! Shop: purchases, banked items and the effect dispatch.
//!
//! Every operation validates completely before it mutates. Price,
//! inventory and effect changes are then applied together in one
//! uninterrupted step, so a rejected request leaves the roster untouched.
mod catalog;
mod effect;
mod error;

pub use catalog::{CatalogError, ItemEffect, ShopCatalog, ShopItem, TargetRule};
pub use effect::{EffectResult, apply_effect};
pub use error::ShopError;

use crate::config::InventoryConfig;
use crate::env::GameEnv;
use crate::state::{ChannelId, ItemId, Player, PlayerId, Roster, Timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PurchaseMode {
    /// Pay now, bank the item for later use.
    Store,
    /// Pay now, apply immediately.
    Apply,
}

/// Who is acting with which item, where, and on whom.
#[derive(Clone, Copy, Debug)]
pub struct ItemRequest<'r> {
    pub actor: &'r PlayerId,
    pub channel: &'r ChannelId,
    pub item: ItemId,
    pub target: Option<&'r PlayerId>,
}

impl<'r> ItemRequest<'r> {
    pub fn new(actor: &'r PlayerId, channel: &'r ChannelId, item: ItemId) -> Self {
        Self {
            actor,
            channel,
            item,
            target: None,
        }
    }

    pub fn on(mut self, target: &'r PlayerId) -> Self {
        self.target = Some(target);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Delivery {
    Stored { owned: u32, total: u32, capacity: u32 },
    Applied { subject: PlayerId, effect: EffectResult },
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PurchaseReceipt {
    pub item: ItemId,
    pub price: u64,
    pub xp_left: u64,
    pub delivery: Delivery,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UseReceipt {
    pub item: ItemId,
    pub subject: PlayerId,
    pub effect: EffectResult,
    /// Units of the item still banked after this use.
    pub remaining: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaleReceipt {
    pub item: ItemId,
    pub refund: u64,
    pub xp: u64,
    pub remaining: u32,
}

/// Checks the per-type and total inventory caps for one more unit of `item`.
pub fn check_room(player: &Player, item: &ShopItem, caps: &InventoryConfig) -> Result<(), ShopError> {
    let owned = player.inventory.count(item.id);
    if owned >= item.max_owned {
        return Err(ShopError::ItemLimit {
            item: item.id,
            owned,
            limit: item.max_owned,
        });
    }
    let total = player.inventory.total();
    if total >= caps.max_total {
        return Err(ShopError::InventoryFull {
            total,
            capacity: caps.max_total,
        });
    }
    Ok(())
}

/// Rejects permanent gear the subject already carries.
fn check_not_equipped(roster: &Roster, subject: &PlayerId, item: &ShopItem) -> Result<(), ShopError> {
    match item.effect {
        ItemEffect::Gear { flag } if roster.get(subject).is_some_and(|p| p.gear.contains(flag)) => {
            Err(ShopError::AlreadyOwned(item.id))
        }
        _ => Ok(()),
    }
}

fn check_funds(player: &Player, item: &ShopItem) -> Result<(), ShopError> {
    if player.xp < item.price {
        return Err(ShopError::InsufficientXp {
            item: item.id,
            price: item.price,
            available: player.xp,
        });
    }
    Ok(())
}

/// Catalog-backed purchase, use and sale of items.
#[derive(Clone, Copy, Debug)]
pub struct ShopInventory<'a> {
    env: GameEnv<'a>,
}

impl<'a> ShopInventory<'a> {
    pub fn new(env: GameEnv<'a>) -> Self {
        Self { env }
    }

    fn lookup(&self, id: ItemId) -> Result<&'a ShopItem, ShopError> {
        self.env.catalog.get(id).ok_or(ShopError::InvalidId(id))
    }

    /// Buys an item with XP, either banking it or applying it at once.
    pub fn purchase(
        &self,
        roster: &mut Roster,
        request: ItemRequest<'_>,
        mode: PurchaseMode,
        now: Timestamp,
    ) -> Result<PurchaseReceipt, ShopError> {
        let item = self.lookup(request.item)?;

        match mode {
            PurchaseMode::Store => {
                if item.requires_target() {
                    return Err(ShopError::InvalidStorage(item.id));
                }
                let caps = &self.env.config.inventory;
                let buyer = roster.get_or_create(request.actor, &self.env.config.player);
                check_funds(buyer, item)?;
                check_room(buyer, item, caps)?;

                buyer.lose_xp(item.price);
                buyer.inventory.add(item.id);
                Ok(PurchaseReceipt {
                    item: item.id,
                    price: item.price,
                    xp_left: buyer.xp,
                    delivery: Delivery::Stored {
                        owned: buyer.inventory.count(item.id),
                        total: buyer.inventory.total(),
                        capacity: caps.max_total,
                    },
                })
            }
            PurchaseMode::Apply => {
                let subject = self.resolve_subject(roster, item, &request)?;
                check_not_equipped(roster, &subject, item)?;
                let effect = self.settle(roster, request.actor, &subject, item, now, |buyer| {
                    check_funds(buyer, item)?;
                    buyer.lose_xp(item.price);
                    Ok(())
                })?;
                let xp_left = roster.get(request.actor).map_or(0, |p| p.xp);
                Ok(PurchaseReceipt {
                    item: item.id,
                    price: item.price,
                    xp_left,
                    delivery: Delivery::Applied { subject, effect },
                })
            }
        }
    }

    /// Applies a banked item, consuming one unit instead of paying XP.
    pub fn use_from_inventory(
        &self,
        roster: &mut Roster,
        request: ItemRequest<'_>,
        now: Timestamp,
    ) -> Result<UseReceipt, ShopError> {
        let item = self.lookup(request.item)?;
        let owned = roster
            .get(request.actor)
            .map_or(0, |p| p.inventory.count(item.id));
        if owned == 0 {
            return Err(ShopError::NotOwned(item.id));
        }

        let subject = self.resolve_subject(roster, item, &request)?;
        check_not_equipped(roster, &subject, item)?;
        let effect = self.settle(roster, request.actor, &subject, item, now, |user| {
            if user.inventory.take_one(item.id) {
                Ok(())
            } else {
                Err(ShopError::NotOwned(item.id))
            }
        })?;
        let remaining = roster
            .get(request.actor)
            .map_or(0, |p| p.inventory.count(item.id));
        Ok(UseReceipt {
            item: item.id,
            subject,
            effect,
            remaining,
        })
    }

    /// Sells one banked unit back for a share of its price.
    pub fn sell(&self, roster: &mut Roster, seller: &PlayerId, id: ItemId) -> Result<SaleReceipt, ShopError> {
        let item = self.lookup(id)?;
        let player = roster.get_or_create(seller, &self.env.config.player);
        if !player.inventory.take_one(item.id) {
            return Err(ShopError::NotOwned(item.id));
        }

        let refund = item.price.saturating_mul(self.env.config.inventory.sell_refund_percent) / 100;
        player.gain_xp(refund);
        Ok(SaleReceipt {
            item: item.id,
            refund,
            xp: player.xp,
            remaining: player.inventory.count(item.id),
        })
    }

    /// Decides who the item acts on and validates that choice.
    fn resolve_subject(
        &self,
        roster: &Roster,
        item: &ShopItem,
        request: &ItemRequest<'_>,
    ) -> Result<PlayerId, ShopError> {
        let target = match (item.target, request.target) {
            (TargetRule::Required, None) => return Err(ShopError::TargetRequired(item.id)),
            (TargetRule::Forbidden, Some(target)) if target != request.actor => {
                return Err(ShopError::TargetForbidden(item.id));
            }
            (_, target) => target,
        };

        match target {
            Some(target) if target != request.actor => {
                let present = roster.contains(target)
                    && self.env.presence.is_present(target, request.channel);
                if !present {
                    return Err(ShopError::TargetNotPresent {
                        target: target.clone(),
                    });
                }
                Ok(target.clone())
            }
            _ => Ok(request.actor.clone()),
        }
    }

    /// Runs `pay` on the actor and, only if it succeeds, applies the item to
    /// `subject`.
    fn settle(
        &self,
        roster: &mut Roster,
        actor: &PlayerId,
        subject: &PlayerId,
        item: &ShopItem,
        now: Timestamp,
        pay: impl FnOnce(&mut Player) -> Result<(), ShopError>,
    ) -> Result<EffectResult, ShopError> {
        let modifiers = self.env.modifiers();
        roster.get_or_create(actor, &self.env.config.player);

        if actor == subject {
            let Some(player) = roster.get_mut(actor) else {
                return Err(ShopError::TargetNotPresent {
                    target: actor.clone(),
                });
            };
            pay(player)?;
            return Ok(apply_effect(player, item, &modifiers, now));
        }

        let (payer, target) = roster
            .pair_mut(actor, subject)
            .ok_or_else(|| ShopError::TargetNotPresent {
                target: subject.clone(),
            })?;
        pay(payer)?;
        Ok(apply_effect(target, item, &modifiers, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::env::OpenPresence;
    use crate::state::EffectKind;
    use crate::stats::LevelTable;

    struct Fixture {
        config: GameConfig,
        levels: LevelTable,
        catalog: ShopCatalog,
        roster: Roster,
    }

    impl Fixture {
        fn new() -> Self {
            let config = GameConfig::default();
            let mut roster = Roster::new();
            for nick in ["alice", "bob"] {
                let player = roster.get_or_create(&PlayerId::new(nick), &config.player);
                player.xp = 500;
            }
            Self {
                config,
                levels: LevelTable::default(),
                catalog: ShopCatalog::default(),
                roster,
            }
        }

        fn xp(&self, nick: &str) -> u64 {
            self.roster.get(&PlayerId::new(nick)).unwrap().xp
        }
    }

    fn alice() -> PlayerId {
        PlayerId::new("alice")
    }

    fn bob() -> PlayerId {
        PlayerId::new("bob")
    }

    fn pond() -> ChannelId {
        ChannelId::new("#pond")
    }

    #[test]
    fn test_store_banks_item_and_charges() {
        let mut fx = Fixture::new();
        let env = GameEnv::new(&fx.config, &fx.levels, &fx.catalog, &OpenPresence);
        let shop = ShopInventory::new(env);
        let (actor, channel) = (alice(), pond());

        let receipt = shop
            .purchase(&mut fx.roster, ItemRequest::new(&actor, &channel, ItemId(1)), PurchaseMode::Store, Timestamp::ZERO)
            .unwrap();
        assert_eq!(receipt.xp_left, 493);
        assert_eq!(
            receipt.delivery,
            Delivery::Stored {
                owned: 1,
                total: 1,
                capacity: 20
            }
        );
    }

    #[test]
    fn test_store_rejects_targeted_items() {
        let mut fx = Fixture::new();
        let env = GameEnv::new(&fx.config, &fx.levels, &fx.catalog, &OpenPresence);
        let shop = ShopInventory::new(env);
        let (actor, channel) = (alice(), pond());

        let err = shop
            .purchase(&mut fx.roster, ItemRequest::new(&actor, &channel, ItemId(17)), PurchaseMode::Store, Timestamp::ZERO)
            .unwrap_err();
        assert_eq!(err, ShopError::InvalidStorage(ItemId(17)));
        assert_eq!(fx.xp("alice"), 500);
    }

    #[test]
    fn test_item_limit_checked_before_payment() {
        let mut fx = Fixture::new();
        let env = GameEnv::new(&fx.config, &fx.levels, &fx.catalog, &OpenPresence);
        let shop = ShopInventory::new(env);
        let (actor, channel) = (alice(), pond());
        let request = ItemRequest::new(&actor, &channel, ItemId(11));

        shop.purchase(&mut fx.roster, request, PurchaseMode::Store, Timestamp::ZERO)
            .unwrap();
        let err = shop
            .purchase(&mut fx.roster, request, PurchaseMode::Store, Timestamp::ZERO)
            .unwrap_err();
        assert!(matches!(err, ShopError::ItemLimit { owned: 1, limit: 1, .. }));
        assert_eq!(fx.xp("alice"), 400);
    }

    #[test]
    fn test_apply_requires_target_for_debuffs() {
        let mut fx = Fixture::new();
        let env = GameEnv::new(&fx.config, &fx.levels, &fx.catalog, &OpenPresence);
        let shop = ShopInventory::new(env);
        let (actor, channel) = (alice(), pond());

        let err = shop
            .purchase(&mut fx.roster, ItemRequest::new(&actor, &channel, ItemId(16)), PurchaseMode::Apply, Timestamp::ZERO)
            .unwrap_err();
        assert_eq!(err, ShopError::TargetRequired(ItemId(16)));
    }

    #[test]
    fn test_apply_on_target_charges_buyer_and_affects_target() {
        let mut fx = Fixture::new();
        let env = GameEnv::new(&fx.config, &fx.levels, &fx.catalog, &OpenPresence);
        let shop = ShopInventory::new(env);
        let (actor, channel, target) = (alice(), pond(), bob());
        let now = Timestamp::from_secs(10);

        let receipt = shop
            .purchase(
                &mut fx.roster,
                ItemRequest::new(&actor, &channel, ItemId(17)).on(&target),
                PurchaseMode::Apply,
                now,
            )
            .unwrap();

        assert_eq!(receipt.xp_left, 486);
        assert_eq!(fx.xp("bob"), 500);
        assert!(fx.roster.get(&target).unwrap().has_effect(EffectKind::Sabotage, now));
        assert!(!fx.roster.get(&actor).unwrap().has_effect(EffectKind::Sabotage, now));
    }

    #[test]
    fn test_absent_target_is_rejected_without_payment() {
        let mut fx = Fixture::new();
        let nobody_here = |_: &PlayerId, _: &ChannelId| false;
        let env = GameEnv::new(&fx.config, &fx.levels, &fx.catalog, &nobody_here);
        let shop = ShopInventory::new(env);
        let (actor, channel, target) = (alice(), pond(), bob());

        let err = shop
            .purchase(
                &mut fx.roster,
                ItemRequest::new(&actor, &channel, ItemId(15)).on(&target),
                PurchaseMode::Apply,
                Timestamp::ZERO,
            )
            .unwrap_err();
        assert_eq!(err, ShopError::TargetNotPresent { target: bob() });
        assert_eq!(fx.xp("alice"), 500);
    }

    #[test]
    fn test_area_items_forbid_targets() {
        let mut fx = Fixture::new();
        let env = GameEnv::new(&fx.config, &fx.levels, &fx.catalog, &OpenPresence);
        let shop = ShopInventory::new(env);
        let (actor, channel, target) = (alice(), pond(), bob());

        let err = shop
            .purchase(
                &mut fx.roster,
                ItemRequest::new(&actor, &channel, ItemId(21)).on(&target),
                PurchaseMode::Apply,
                Timestamp::ZERO,
            )
            .unwrap_err();
        assert_eq!(err, ShopError::TargetForbidden(ItemId(21)));
    }

    #[test]
    fn test_use_consumes_banked_unit() {
        let mut fx = Fixture::new();
        let env = GameEnv::new(&fx.config, &fx.levels, &fx.catalog, &OpenPresence);
        let shop = ShopInventory::new(env);
        let (actor, channel) = (alice(), pond());
        let request = ItemRequest::new(&actor, &channel, ItemId(7));

        assert_eq!(
            shop.use_from_inventory(&mut fx.roster, request, Timestamp::ZERO),
            Err(ShopError::NotOwned(ItemId(7)))
        );

        shop.purchase(&mut fx.roster, request, PurchaseMode::Store, Timestamp::ZERO)
            .unwrap();
        let receipt = shop
            .use_from_inventory(&mut fx.roster, request, Timestamp::ZERO)
            .unwrap();
        assert_eq!(receipt.remaining, 0);
        assert_eq!(receipt.subject, alice());
        assert_eq!(receipt.effect, EffectResult::GearEquipped { flag: crate::state::Gear::SCOPE });
        assert_eq!(fx.xp("alice"), 494);
    }

    #[test]
    fn test_owned_gear_is_rejected_before_payment() {
        let mut fx = Fixture::new();
        let env = GameEnv::new(&fx.config, &fx.levels, &fx.catalog, &OpenPresence);
        let shop = ShopInventory::new(env);
        let (actor, channel) = (alice(), pond());
        let request = ItemRequest::new(&actor, &channel, ItemId(7));

        shop.purchase(&mut fx.roster, request, PurchaseMode::Store, Timestamp::ZERO)
            .unwrap();
        shop.purchase(&mut fx.roster, request, PurchaseMode::Apply, Timestamp::ZERO)
            .unwrap();
        assert_eq!(fx.xp("alice"), 488);

        assert_eq!(
            shop.purchase(&mut fx.roster, request, PurchaseMode::Apply, Timestamp::ZERO),
            Err(ShopError::AlreadyOwned(ItemId(7)))
        );
        assert_eq!(
            shop.use_from_inventory(&mut fx.roster, request, Timestamp::ZERO),
            Err(ShopError::AlreadyOwned(ItemId(7)))
        );
        assert_eq!(fx.xp("alice"), 488);
        assert_eq!(fx.roster.get(&actor).unwrap().inventory.count(ItemId(7)), 1);
    }

    #[test]
    fn test_sell_refunds_share_of_price() {
        let mut fx = Fixture::new();
        let env = GameEnv::new(&fx.config, &fx.levels, &fx.catalog, &OpenPresence);
        let shop = ShopInventory::new(env);
        let (actor, channel) = (alice(), pond());

        shop.purchase(&mut fx.roster, ItemRequest::new(&actor, &channel, ItemId(2)), PurchaseMode::Store, Timestamp::ZERO)
            .unwrap();
        let receipt = shop.sell(&mut fx.roster, &actor, ItemId(2)).unwrap();
        assert_eq!(receipt.refund, 14);
        assert_eq!(receipt.xp, 494);
        assert_eq!(
            shop.sell(&mut fx.roster, &actor, ItemId(2)),
            Err(ShopError::NotOwned(ItemId(2)))
        );
    }
}
