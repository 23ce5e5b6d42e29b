// src/catalog/src/gear.rs
use bincode::{Decode, Encode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter, EnumString};

use crate::weights::weighted_pick;

/// Gear rarity. Durability and pricing come from fixed per-kind/per-rarity
/// tables rather than formulas so balance stays tunable.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn next(&self) -> Option<Rarity> {
        match self {
            Rarity::Common => Some(Rarity::Uncommon),
            Rarity::Uncommon => Some(Rarity::Rare),
            Rarity::Rare => Some(Rarity::Epic),
            Rarity::Epic => Some(Rarity::Legendary),
            Rarity::Legendary => None,
        }
    }

    fn min_floor(&self) -> u32 {
        match self {
            Rarity::Common => 1,
            Rarity::Uncommon => 2,
            Rarity::Rare => 4,
            Rarity::Epic => 7,
            Rarity::Legendary => 10,
        }
    }

    fn drop_weight(&self) -> u32 {
        match self {
            Rarity::Common => 50,
            Rarity::Uncommon => 30,
            Rarity::Rare => 15,
            Rarity::Epic => 8,
            Rarity::Legendary => 4,
        }
    }
}

/// Weighted roll among the rarities the floor has unlocked.
pub fn rarity_for_floor(floor: u32, rng: &mut impl Rng) -> Rarity {
    let entries: Vec<(Rarity, u32)> = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ]
    .into_iter()
    .filter(|r| r.min_floor() <= floor)
    .map(|r| (r, r.drop_weight()))
    .collect();
    *weighted_pick(&entries, rng)
}

/// Per-weapon special mechanic, fixed by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "snake_case")]
pub enum WeaponSpecial {
    /// Two independent hits per attack action.
    DualWield,
    /// Attacking also blocks the next enemy turn.
    Block,
    /// Cleaves revealed neighbors of the target for half damage.
    SpecialAttack,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WeaponKind {
    Sword,
    Dagger,
    Spear,
    Axe,
    Bow,
    Crossbow,
}

impl WeaponKind {
    /// Ranged weapons ignore the melee gate at 80% damage.
    pub fn is_ranged(&self) -> bool {
        matches!(self, WeaponKind::Bow | WeaponKind::Crossbow)
    }

    pub fn special(&self) -> Option<WeaponSpecial> {
        match self {
            WeaponKind::Dagger => Some(WeaponSpecial::DualWield),
            WeaponKind::Spear => Some(WeaponSpecial::Block),
            WeaponKind::Axe => Some(WeaponSpecial::SpecialAttack),
            WeaponKind::Sword | WeaponKind::Bow | WeaponKind::Crossbow => None,
        }
    }

    /// Base damage per rarity. Daggers trade raw damage for two hits.
    fn damage(&self, rarity: Rarity) -> u32 {
        let base = match rarity {
            Rarity::Common => 3,
            Rarity::Uncommon => 4,
            Rarity::Rare => 6,
            Rarity::Epic => 8,
            Rarity::Legendary => 11,
        };
        match self {
            WeaponKind::Sword => base + 1,
            WeaponKind::Dagger => base.saturating_sub(1).max(1),
            WeaponKind::Spear => base,
            WeaponKind::Axe => base + 2,
            WeaponKind::Bow => base,
            WeaponKind::Crossbow => base + 1,
        }
    }

    /// Durability lookup table.
    fn durability(&self, rarity: Rarity) -> u32 {
        let base = match rarity {
            Rarity::Common => 6,
            Rarity::Uncommon => 8,
            Rarity::Rare => 10,
            Rarity::Epic => 12,
            Rarity::Legendary => 14,
        };
        match self {
            WeaponKind::Dagger => base + 2,
            WeaponKind::Axe => base.saturating_sub(2),
            _ => base,
        }
    }
}

fn weapon_price(rarity: Rarity) -> u32 {
    match rarity {
        Rarity::Common => 20,
        Rarity::Uncommon => 35,
        Rarity::Rare => 55,
        Rarity::Epic => 80,
        Rarity::Legendary => 120,
    }
}

fn armor_price(rarity: Rarity) -> u32 {
    match rarity {
        Rarity::Common => 18,
        Rarity::Uncommon => 30,
        Rarity::Rare => 48,
        Rarity::Epic => 70,
        Rarity::Legendary => 105,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct WeaponPayload {
    pub kind: WeaponKind,
    pub rarity: Rarity,
    pub damage: u32,
    pub durability: u32,
    pub max_durability: u32,
    pub special: Option<WeaponSpecial>,
    pub price: u32,
}

impl WeaponPayload {
    pub fn new(kind: WeaponKind, rarity: Rarity) -> Self {
        let durability = kind.durability(rarity);
        Self {
            kind,
            rarity,
            damage: kind.damage(rarity),
            durability,
            max_durability: durability,
            special: kind.special(),
            price: weapon_price(rarity),
        }
    }

    pub fn is_ranged(&self) -> bool {
        self.kind.is_ranged()
    }

    pub fn is_broken(&self) -> bool {
        self.durability == 0
    }

    /// The only legal durability increase.
    pub fn repair(&mut self) {
        self.durability = self.max_durability;
    }

    pub fn sell_value(&self) -> u32 {
        self.price / 2
    }
}

impl fmt::Display for WeaponPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} dmg, {}/{})",
            self.rarity, self.kind, self.damage, self.durability, self.max_durability
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct ArmorPayload {
    pub rarity: Rarity,
    pub protection: u32,
    pub durability: u32,
    pub max_durability: u32,
    /// Chance for the armor itself to negate a hit outright.
    pub dodge_chance: Option<f32>,
    /// Percent of pre-mitigation damage thrown back at the attacker.
    pub reflection: Option<u32>,
    pub price: u32,
}

impl ArmorPayload {
    pub fn new(rarity: Rarity) -> Self {
        let (protection, durability) = match rarity {
            Rarity::Common => (2, 4),
            Rarity::Uncommon => (3, 5),
            Rarity::Rare => (4, 6),
            Rarity::Epic => (6, 8),
            Rarity::Legendary => (8, 10),
        };
        Self {
            rarity,
            protection,
            durability,
            max_durability: durability,
            dodge_chance: None,
            reflection: None,
            price: armor_price(rarity),
        }
    }

    /// Roll an armor drop for the floor; a minority of pieces carry a dodge
    /// or reflection affix instead of being plain.
    pub fn roll(rarity: Rarity, rng: &mut impl Rng) -> Self {
        let mut armor = Self::new(rarity);
        match rng.random_range(0..10) {
            0 | 1 => armor.dodge_chance = Some(0.1),
            2 | 3 => armor.reflection = Some(30),
            _ => {}
        }
        armor
    }

    pub fn is_broken(&self) -> bool {
        self.durability == 0
    }

    pub fn repair(&mut self) {
        self.durability = self.max_durability;
    }

    pub fn sell_value(&self) -> u32 {
        self.price / 2
    }
}

impl fmt::Display for ArmorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} armor ({} prot, {}/{})",
            self.rarity, self.protection, self.durability, self.max_durability
        )
    }
}
