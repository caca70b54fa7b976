//! Banked shop items owned by a player.

use std::collections::BTreeMap;

/// Shop catalog identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ItemId(pub u32);

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Item id → count. Entries never hold a zero count.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Inventory {
    items: BTreeMap<ItemId, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, item: ItemId) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    /// Total number of units across all item types.
    pub fn total(&self) -> u32 {
        self.items.values().sum()
    }

    pub fn add(&mut self, item: ItemId) {
        *self.items.entry(item).or_insert(0) += 1;
    }

    /// Removes one unit. Returns false when none was owned.
    pub fn take_one(&mut self, item: ItemId) -> bool {
        match self.items.get_mut(&item) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.items.remove(&item);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, u32)> + '_ {
        self.items.iter().map(|(id, count)| (*id, *count))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<(ItemId, u32)> for Inventory {
    fn from_iter<T: IntoIterator<Item = (ItemId, u32)>>(iter: T) -> Self {
        let items = iter.into_iter().filter(|(_, count)| *count > 0).collect();
        Self { items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_last_unit_removes_entry() {
        let mut inventory = Inventory::new();
        inventory.add(ItemId(3));
        inventory.add(ItemId(3));

        assert!(inventory.take_one(ItemId(3)));
        assert_eq!(inventory.count(ItemId(3)), 1);
        assert!(inventory.take_one(ItemId(3)));
        assert!(inventory.is_empty());
        assert!(!inventory.take_one(ItemId(3)));
    }

    #[test]
    fn test_from_iter_drops_zero_counts() {
        let inventory: Inventory = [(ItemId(1), 0), (ItemId(2), 4)].into_iter().collect();
        assert_eq!(inventory.total(), 4);
        assert_eq!(inventory.iter().count(), 1);
    }
}
