// src/catalog/src/loot.rs
//! Coins, crystals, amulet drops and treasure-chest contents.

use rand::Rng;

use amulets::AmuletKind;
use strum::IntoEnumIterator;

use crate::card::CardPayload;
use crate::consumable::create_potion;
use crate::gear::{rarity_for_floor, ArmorPayload, WeaponKind, WeaponPayload};
use crate::weights::weighted_pick;

pub fn coin_amount(floor: u32, rng: &mut impl Rng) -> u32 {
    3 + floor + rng.random_range(0..3)
}

pub fn crystal_amount(floor: u32) -> u32 {
    1 + floor / 5
}

/// Weighted amulet pick, excluding kinds the caller already owns at cap.
/// With everything excluded the roll falls back to the full table: the
/// catalog never fails to produce a card, and the pickup path resolves the
/// duplicate (it converts to coins there).
pub fn pick_amulet(exclude: &[AmuletKind], rng: &mut impl Rng) -> AmuletKind {
    let entries: Vec<(AmuletKind, u32)> = AmuletKind::iter()
        .filter(|k| !exclude.contains(k))
        .map(|k| (k, k.def().weight))
        .collect();
    if entries.is_empty() {
        let all: Vec<(AmuletKind, u32)> =
            AmuletKind::iter().map(|k| (k, k.def().weight)).collect();
        return *weighted_pick(&all, rng);
    }
    *weighted_pick(&entries, rng)
}

pub fn create_weapon(floor: u32, rng: &mut impl Rng) -> WeaponPayload {
    let kinds = [
        WeaponKind::Sword,
        WeaponKind::Dagger,
        WeaponKind::Spear,
        WeaponKind::Axe,
        WeaponKind::Bow,
        WeaponKind::Crossbow,
    ];
    let kind = kinds[rng.random_range(0..kinds.len())];
    WeaponPayload::new(kind, rarity_for_floor(floor, rng))
}

pub fn create_armor(floor: u32, rng: &mut impl Rng) -> ArmorPayload {
    ArmorPayload::roll(rarity_for_floor(floor, rng), rng)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChestDrop {
    Coins,
    Amulet,
    Weapon,
    Potion,
}

/// Chest contents: a weighted roll over a loot table that skews richer than
/// ordinary floor drops.
pub fn chest_loot(floor: u32, owned: &[AmuletKind], rng: &mut impl Rng) -> CardPayload {
    let entries = [
        (ChestDrop::Coins, 40u32),
        (ChestDrop::Amulet, 20),
        (ChestDrop::Weapon, 20),
        (ChestDrop::Potion, 20),
    ];
    match *weighted_pick(&entries, rng) {
        ChestDrop::Coins => CardPayload::Coin {
            amount: coin_amount(floor, rng) * 3,
        },
        ChestDrop::Amulet => CardPayload::Amulet {
            kind: pick_amulet(owned, rng),
        },
        ChestDrop::Weapon => {
            // Chests bias one rarity up when possible.
            let mut weapon = create_weapon(floor, rng);
            if let Some(next) = weapon.rarity.next() {
                weapon = WeaponPayload::new(weapon.kind, next);
            }
            CardPayload::Weapon(weapon)
        }
        ChestDrop::Potion => CardPayload::Potion(create_potion(floor)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn amulet_pick_honors_exclusions() {
        let mut rng = Pcg32::seed_from_u64(17);
        let exclude = [AmuletKind::ShadowCloak, AmuletKind::PhoenixFeather];
        for _ in 0..300 {
            let kind = pick_amulet(&exclude, &mut rng);
            assert!(!exclude.contains(&kind));
        }
    }

    #[test]
    fn amulet_pick_with_everything_excluded_still_yields() {
        let mut rng = Pcg32::seed_from_u64(18);
        let all: Vec<AmuletKind> = AmuletKind::iter().collect();
        // Falls back to the full table rather than failing.
        let _ = pick_amulet(&all, &mut rng);
    }

    #[test]
    fn chest_loot_is_always_a_valid_card() {
        let mut rng = Pcg32::seed_from_u64(19);
        for _ in 0..100 {
            let card = chest_loot(6, &[], &mut rng);
            assert!(!card.is_enemy());
        }
    }
}
