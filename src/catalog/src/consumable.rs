// src/catalog/src/consumable.rs
//! Potions, food and magic cards. Consumable tiers are deterministic: the
//! highest tier the floor has unlocked is the one that drops.

use rand::Rng;

use crate::card::{FoodPayload, MagicKind, MagicPayload, PotionPayload};

struct PotionTier {
    min_floor: u32,
    healing: u32,
    price: u32,
}

static POTION_TIERS: &[PotionTier] = &[
    PotionTier { min_floor: 1, healing: 5, price: 12 },
    PotionTier { min_floor: 4, healing: 10, price: 22 },
    PotionTier { min_floor: 8, healing: 18, price: 38 },
    PotionTier { min_floor: 12, healing: 30, price: 60 },
];

struct FoodTier {
    min_floor: u32,
    actions: u32,
    price: u32,
}

static FOOD_TIERS: &[FoodTier] = &[
    FoodTier { min_floor: 1, actions: 1, price: 8 },
    FoodTier { min_floor: 5, actions: 2, price: 16 },
    FoodTier { min_floor: 9, actions: 3, price: 28 },
];

/// Highest tier index whose `min_floor` has been reached; tier 0 otherwise.
fn highest_tier(min_floors: impl Iterator<Item = u32>, floor: u32) -> usize {
    let mut picked = 0;
    for (i, min_floor) in min_floors.enumerate() {
        if min_floor <= floor {
            picked = i;
        }
    }
    picked
}

pub fn create_potion(floor: u32) -> PotionPayload {
    let i = highest_tier(POTION_TIERS.iter().map(|t| t.min_floor), floor);
    let tier = &POTION_TIERS[i];
    PotionPayload {
        tier: i as u32 + 1,
        healing: tier.healing,
        price: tier.price,
    }
}

pub fn create_food(floor: u32) -> FoodPayload {
    let i = highest_tier(FOOD_TIERS.iter().map(|t| t.min_floor), floor);
    let tier = &FOOD_TIERS[i];
    FoodPayload {
        tier: i as u32 + 1,
        actions: tier.actions,
        price: tier.price,
    }
}

/// Magic families with their unlock floors. The family is a uniform pick
/// among unlocked entries; the parameters come from the highest unlocked
/// tier of that family.
pub fn create_magic(floor: u32, rng: &mut impl Rng) -> MagicPayload {
    let unlocked: Vec<fn(u32) -> MagicKind> = [
        (1u32, fireball_for as fn(u32) -> MagicKind),
        (2, magic_shield_for),
        (2, frost_for),
        (3, shadow_blade_for),
        (4, bone_wall_for),
        (6, mirror_shield_for),
    ]
    .into_iter()
    .filter(|(min_floor, _)| *min_floor <= floor)
    .map(|(_, f)| f)
    .collect();

    let kind = unlocked[rng.random_range(0..unlocked.len())](floor);
    MagicPayload { kind }
}

fn fireball_for(floor: u32) -> MagicKind {
    let damage = if floor >= 9 {
        8
    } else if floor >= 5 {
        5
    } else {
        3
    };
    MagicKind::Fireball { damage }
}

fn frost_for(floor: u32) -> MagicKind {
    MagicKind::Frost { turns: if floor >= 8 { 3 } else { 2 } }
}

fn shadow_blade_for(floor: u32) -> MagicKind {
    if floor >= 9 {
        MagicKind::ShadowBlade { turns: 4, multiplier: 2.0 }
    } else {
        MagicKind::ShadowBlade { turns: 3, multiplier: 1.5 }
    }
}

fn magic_shield_for(floor: u32) -> MagicKind {
    if floor >= 8 {
        MagicKind::MagicShield { turns: 4, multiplier: 2.0 }
    } else {
        MagicKind::MagicShield { turns: 3, multiplier: 1.5 }
    }
}

fn bone_wall_for(floor: u32) -> MagicKind {
    MagicKind::BoneWall { charges: if floor >= 10 { 2 } else { 1 } }
}

fn mirror_shield_for(_floor: u32) -> MagicKind {
    MagicKind::MirrorShield
}
