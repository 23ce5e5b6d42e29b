// src/runstate/src/inventory.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;

use catalog::{ArmorPayload, FoodPayload, MagicPayload, PotionPayload, WeaponPayload};

/// Items a slot can hold. Enemies, traps and currencies never enter the
/// inventory; they resolve on pickup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemPayload {
    Weapon(WeaponPayload),
    Armor(ArmorPayload),
    Potion(PotionPayload),
    Food(FoodPayload),
    Magic(MagicPayload),
}

impl ItemPayload {
    pub fn sell_value(&self) -> u32 {
        match self {
            ItemPayload::Weapon(w) => w.sell_value(),
            ItemPayload::Armor(a) => a.sell_value(),
            ItemPayload::Potion(p) => p.price / 2,
            ItemPayload::Food(f) => f.price / 2,
            ItemPayload::Magic(_) => 10,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("inventory is full")]
    Full,
    #[error("no item in that slot")]
    EmptySlot,
    #[error("slot index out of range")]
    InvalidSlot,
    #[error("those items cannot be merged")]
    MergeMismatch,
    #[error("nothing above legendary")]
    AlreadyMaxRarity,
}

/// Fixed-capacity item slots: base five plus amulet-granted bonus slots.
/// Capacity growth keeps existing slot indices stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<Option<ItemPayload>>,
}

pub const BASE_SLOTS: usize = 5;

impl Default for Inventory {
    fn default() -> Self {
        Self::new(BASE_SLOTS)
    }
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn grow(&mut self, extra: usize) {
        for _ in 0..extra {
            self.slots.push(None);
        }
    }

    pub fn get(&self, slot: usize) -> Option<&ItemPayload> {
        self.slots.get(slot).and_then(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut ItemPayload> {
        self.slots.get_mut(slot).and_then(|s| s.as_mut())
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|s| s.is_some())
    }

    pub fn used(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Place an item into the first free slot.
    pub fn add(&mut self, item: ItemPayload) -> Result<usize, InventoryError> {
        let slot = self
            .slots
            .iter()
            .position(|s| s.is_none())
            .ok_or(InventoryError::Full)?;
        self.slots[slot] = Some(item);
        Ok(slot)
    }

    /// Take the item out of a slot.
    pub fn take(&mut self, slot: usize) -> Result<ItemPayload, InventoryError> {
        let entry = self
            .slots
            .get_mut(slot)
            .ok_or(InventoryError::InvalidSlot)?;
        entry.take().ok_or(InventoryError::EmptySlot)
    }

    /// Put an item back into a specific empty slot (used when an attack
    /// finishes and the surviving weapon returns home).
    pub fn put_back(&mut self, slot: usize, item: ItemPayload) -> Result<(), InventoryError> {
        let entry = self
            .slots
            .get_mut(slot)
            .ok_or(InventoryError::InvalidSlot)?;
        if entry.is_some() {
            return Err(InventoryError::Full);
        }
        *entry = Some(item);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ItemPayload)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|item| (i, item)))
    }

    /// Merge two gear items into one of the next rarity. Same kind and
    /// same rarity normally; `cross_tier` (transmuter sigil) lifts the
    /// equal-rarity requirement and merges at the higher of the two.
    /// Validation happens before any mutation: a rejected merge leaves
    /// both slots untouched.
    pub fn merge(
        &mut self,
        a: usize,
        b: usize,
        cross_tier: bool,
    ) -> Result<usize, InventoryError> {
        if a == b {
            return Err(InventoryError::MergeMismatch);
        }
        let merged = {
            let left = self.get(a).ok_or(InventoryError::EmptySlot)?;
            let right = self.get(b).ok_or(InventoryError::EmptySlot)?;
            match (left, right) {
                (ItemPayload::Weapon(x), ItemPayload::Weapon(y)) => {
                    if x.kind != y.kind {
                        return Err(InventoryError::MergeMismatch);
                    }
                    if x.rarity != y.rarity && !cross_tier {
                        return Err(InventoryError::MergeMismatch);
                    }
                    let next = x
                        .rarity
                        .max(y.rarity)
                        .next()
                        .ok_or(InventoryError::AlreadyMaxRarity)?;
                    ItemPayload::Weapon(WeaponPayload::new(x.kind, next))
                }
                (ItemPayload::Armor(x), ItemPayload::Armor(y)) => {
                    if x.rarity != y.rarity && !cross_tier {
                        return Err(InventoryError::MergeMismatch);
                    }
                    let next = x
                        .rarity
                        .max(y.rarity)
                        .next()
                        .ok_or(InventoryError::AlreadyMaxRarity)?;
                    ItemPayload::Armor(ArmorPayload::new(next))
                }
                _ => return Err(InventoryError::MergeMismatch),
            }
        };
        self.slots[b] = None;
        self.slots[a] = Some(merged);
        Ok(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{Rarity, WeaponKind};

    fn sword(rarity: Rarity) -> ItemPayload {
        ItemPayload::Weapon(WeaponPayload::new(WeaponKind::Sword, rarity))
    }

    #[test]
    fn add_fills_first_free_slot_and_full_rejects() {
        let mut inv = Inventory::new(2);
        assert_eq!(inv.add(sword(Rarity::Common)), Ok(0));
        assert_eq!(inv.add(sword(Rarity::Common)), Ok(1));
        assert_eq!(inv.add(sword(Rarity::Common)), Err(InventoryError::Full));
        let _ = inv.take(0).unwrap();
        assert_eq!(inv.add(sword(Rarity::Common)), Ok(0));
    }

    #[test]
    fn merge_same_kind_same_rarity_upgrades() {
        let mut inv = Inventory::default();
        inv.add(sword(Rarity::Common)).unwrap();
        inv.add(sword(Rarity::Common)).unwrap();
        assert_eq!(inv.merge(0, 1, false), Ok(0));
        match inv.get(0).unwrap() {
            ItemPayload::Weapon(w) => assert_eq!(w.rarity, Rarity::Uncommon),
            other => panic!("unexpected {other:?}"),
        }
        assert!(inv.get(1).is_none());
    }

    #[test]
    fn cross_tier_merge_needs_the_sigil() {
        let mut inv = Inventory::default();
        inv.add(sword(Rarity::Common)).unwrap();
        inv.add(sword(Rarity::Uncommon)).unwrap();
        assert_eq!(inv.merge(0, 1, false), Err(InventoryError::MergeMismatch));
        // Rejection left both slots alone.
        assert!(inv.get(0).is_some() && inv.get(1).is_some());
        assert_eq!(inv.merge(0, 1, true), Ok(0));
        match inv.get(0).unwrap() {
            ItemPayload::Weapon(w) => assert_eq!(w.rarity, Rarity::Rare),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn mismatched_kinds_never_merge() {
        let mut inv = Inventory::default();
        inv.add(sword(Rarity::Common)).unwrap();
        inv.add(ItemPayload::Weapon(WeaponPayload::new(
            WeaponKind::Dagger,
            Rarity::Common,
        )))
        .unwrap();
        assert_eq!(inv.merge(0, 1, true), Err(InventoryError::MergeMismatch));
    }

    #[test]
    fn legendary_pair_cannot_merge_higher() {
        let mut inv = Inventory::default();
        inv.add(sword(Rarity::Legendary)).unwrap();
        inv.add(sword(Rarity::Legendary)).unwrap();
        assert_eq!(inv.merge(0, 1, false), Err(InventoryError::AlreadyMaxRarity));
    }

    #[test]
    fn grow_preserves_slot_indices() {
        let mut inv = Inventory::default();
        inv.add(sword(Rarity::Common)).unwrap();
        inv.grow(2);
        assert_eq!(inv.capacity(), BASE_SLOTS + 2);
        assert!(matches!(inv.get(0), Some(ItemPayload::Weapon(_))));
    }
}
