// src/catalog/src/card.rs
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use amulets::AmuletKind;

use crate::enemy::EnemyPayload;
use crate::gear::{ArmorPayload, WeaponPayload};
use crate::trap::TrapPayload;

/// Discriminant for every card the board can hold.
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
pub enum CardType {
    Enemy,
    Boss,
    Coin,
    Crystal,
    Trap,
    Weapon,
    Armor,
    Amulet,
    Potion,
    Food,
    Magic,
    Key,
    TreasureChest,
}

/// Healing potion; tier picked deterministically per floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct PotionPayload {
    pub tier: u32,
    pub healing: u32,
    pub price: u32,
}

/// Food restores action points; tier picked deterministically per floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct FoodPayload {
    pub tier: u32,
    pub actions: u32,
    pub price: u32,
}

/// One-shot magic cards. Parameters are baked in at creation from the
/// highest tier the floor has unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "snake_case")]
pub enum MagicKind {
    /// Hits every revealed enemy on the board.
    Fireball { damage: u32 },
    /// Freezes one enemy for the given number of its turns.
    Frost { turns: u32 },
    /// Weapon damage multiplier for a few turns.
    ShadowBlade { turns: u32, multiplier: f32 },
    /// Armor protection multiplier for a few turns.
    MagicShield { turns: u32, multiplier: f32 },
    /// Charges that each reflect one enemy attack.
    BoneWall { charges: u32 },
    /// One-shot full reflection of the next enemy turn.
    MirrorShield,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct MagicPayload {
    pub kind: MagicKind,
}

/// Polymorphic card payload, one variant per card type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "snake_case")]
pub enum CardPayload {
    Enemy(EnemyPayload),
    Boss(EnemyPayload),
    Coin { amount: u32 },
    Crystal { amount: u32 },
    Trap(TrapPayload),
    Weapon(WeaponPayload),
    Armor(ArmorPayload),
    Amulet { kind: AmuletKind },
    Potion(PotionPayload),
    Food(FoodPayload),
    Magic(MagicPayload),
    Key,
    TreasureChest { opened: bool },
}

impl CardPayload {
    pub fn card_type(&self) -> CardType {
        match self {
            CardPayload::Enemy(_) => CardType::Enemy,
            CardPayload::Boss(_) => CardType::Boss,
            CardPayload::Coin { .. } => CardType::Coin,
            CardPayload::Crystal { .. } => CardType::Crystal,
            CardPayload::Trap(_) => CardType::Trap,
            CardPayload::Weapon(_) => CardType::Weapon,
            CardPayload::Armor(_) => CardType::Armor,
            CardPayload::Amulet { .. } => CardType::Amulet,
            CardPayload::Potion(_) => CardType::Potion,
            CardPayload::Food(_) => CardType::Food,
            CardPayload::Magic(_) => CardType::Magic,
            CardPayload::Key => CardType::Key,
            CardPayload::TreasureChest { .. } => CardType::TreasureChest,
        }
    }

    /// Enemy or boss payload, if this card fights back.
    pub fn as_enemy(&self) -> Option<&EnemyPayload> {
        match self {
            CardPayload::Enemy(e) | CardPayload::Boss(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyPayload> {
        match self {
            CardPayload::Enemy(e) | CardPayload::Boss(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_enemy(&self) -> bool {
        self.as_enemy().is_some()
    }

    pub fn is_boss(&self) -> bool {
        matches!(self, CardPayload::Boss(_))
    }
}
