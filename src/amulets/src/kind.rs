// src/amulets/src/kind.rs
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Static definition shared by every instance of an amulet kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmuletDef {
    pub name: &'static str,
    pub description: &'static str,
    /// Stackable kinds level up on duplicate pickup instead of rejecting.
    pub stackable: bool,
    pub max_level: u32,
    /// 0 means unlimited; limited-use hooks decrement `uses_left`.
    pub uses: u32,
    /// Drop weight for the catalog's cumulative roll.
    pub weight: u32,
    pub price: u32,
    /// Cursed amulets trade a benefit for a net-negative hook.
    pub cursed: bool,
}

/// Effect applied exactly once, at acquisition or run-load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum EquipEffect {
    MaxHealth(u32),
    BonusSlots(u32),
}

/// Effect applied once per floor transition, scaled by stack level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum FloorEndEffect {
    Heal(u32),
}

/// Effect dispatched when the player kills an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum KillEffect {
    Heal(u32),
    Coins(u32),
}

/// Every amulet in the game. Hooks are exhaustive matches on this enum so a
/// new kind cannot ship with a half-wired definition.
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
pub enum AmuletKind {
    Regeneration,
    VitalityTalisman,
    HungryDagger,
    PowerCharm,
    BerserkerIdol,
    IronSkin,
    ShadowCloak,
    PhoenixFeather,
    LuckyCoin,
    GourmetRing,
    HealingCharm,
    WhetstoneCharm,
    TransmuterSigil,
    CursedSkull,
    BottomlessBag,
    SoulHarvester,
}

impl AmuletKind {
    pub fn def(&self) -> AmuletDef {
        match self {
            AmuletKind::Regeneration => AmuletDef {
                name: "Regeneration",
                description: "Heal 2 health per stack when a floor is cleared",
                stackable: true,
                max_level: 2,
                uses: 0,
                weight: 10,
                price: 40,
                cursed: false,
            },
            AmuletKind::VitalityTalisman => AmuletDef {
                name: "Vitality Talisman",
                description: "+5 max health per stack",
                stackable: true,
                max_level: 3,
                uses: 0,
                weight: 10,
                price: 45,
                cursed: false,
            },
            AmuletKind::HungryDagger => AmuletDef {
                name: "Hungry Dagger",
                description: "Hits that would leave 1 health kill outright; \
                              any other non-lethal hit feeds the enemy instead",
                stackable: false,
                max_level: 1,
                uses: 0,
                weight: 4,
                price: 60,
                cursed: true,
            },
            AmuletKind::PowerCharm => AmuletDef {
                name: "Power Charm",
                description: "+1 weapon damage per stack",
                stackable: true,
                max_level: 3,
                uses: 0,
                weight: 12,
                price: 50,
                cursed: false,
            },
            AmuletKind::BerserkerIdol => AmuletDef {
                name: "Berserker Idol",
                description: "Deal and take 25% more damage",
                stackable: false,
                max_level: 1,
                uses: 0,
                weight: 6,
                price: 55,
                cursed: true,
            },
            AmuletKind::IronSkin => AmuletDef {
                name: "Iron Skin",
                description: "Reduce damage taken by 1 per stack",
                stackable: true,
                max_level: 2,
                uses: 0,
                weight: 9,
                price: 55,
                cursed: false,
            },
            AmuletKind::ShadowCloak => AmuletDef {
                name: "Shadow Cloak",
                description: "10% chance to dodge any hit",
                stackable: false,
                max_level: 1,
                uses: 0,
                weight: 7,
                price: 60,
                cursed: false,
            },
            AmuletKind::PhoenixFeather => AmuletDef {
                name: "Phoenix Feather",
                description: "Cancels one lethal hit, then crumbles",
                stackable: false,
                max_level: 1,
                uses: 1,
                weight: 4,
                price: 80,
                cursed: false,
            },
            AmuletKind::LuckyCoin => AmuletDef {
                name: "Lucky Coin",
                description: "Find 50% more gold",
                stackable: false,
                max_level: 1,
                uses: 0,
                weight: 10,
                price: 35,
                cursed: false,
            },
            AmuletKind::GourmetRing => AmuletDef {
                name: "Gourmet Ring",
                description: "Food restores 1 extra action",
                stackable: false,
                max_level: 1,
                uses: 0,
                weight: 8,
                price: 35,
                cursed: false,
            },
            AmuletKind::HealingCharm => AmuletDef {
                name: "Healing Charm",
                description: "Potions heal 50% more",
                stackable: false,
                max_level: 1,
                uses: 0,
                weight: 8,
                price: 40,
                cursed: false,
            },
            AmuletKind::WhetstoneCharm => AmuletDef {
                name: "Whetstone Charm",
                description: "Weapons wear out half as fast",
                stackable: false,
                max_level: 1,
                uses: 0,
                weight: 7,
                price: 50,
                cursed: false,
            },
            AmuletKind::TransmuterSigil => AmuletDef {
                name: "Transmuter Sigil",
                description: "Merge gear across rarities",
                stackable: false,
                max_level: 1,
                uses: 0,
                weight: 5,
                price: 45,
                cursed: false,
            },
            AmuletKind::CursedSkull => AmuletDef {
                name: "Cursed Skull",
                description: "Max health capped at 80%; gold doubled, +1 coin per kill",
                stackable: false,
                max_level: 1,
                uses: 0,
                weight: 4,
                price: 30,
                cursed: true,
            },
            AmuletKind::BottomlessBag => AmuletDef {
                name: "Bottomless Bag",
                description: "+2 inventory slots",
                stackable: false,
                max_level: 1,
                uses: 0,
                weight: 6,
                price: 50,
                cursed: false,
            },
            AmuletKind::SoulHarvester => AmuletDef {
                name: "Soul Harvester",
                description: "Heal 1 per stack on every kill",
                stackable: true,
                max_level: 2,
                uses: 0,
                weight: 6,
                price: 55,
                cursed: false,
            },
        }
    }

    /// Applied once, at acquisition or when a save is restored.
    pub fn on_equip(&self, level: u32) -> Option<EquipEffect> {
        match self {
            AmuletKind::VitalityTalisman => Some(EquipEffect::MaxHealth(5 * level.max(1))),
            AmuletKind::BottomlessBag => Some(EquipEffect::BonusSlots(2)),
            _ => None,
        }
    }

    /// Applied once per floor transition.
    pub fn on_floor_end(&self, level: u32) -> Option<FloorEndEffect> {
        match self {
            AmuletKind::Regeneration => Some(FloorEndEffect::Heal(2 * level.max(1))),
            _ => None,
        }
    }

    /// Dispatched for every enemy the player kills.
    pub fn on_enemy_kill(&self, level: u32) -> Option<KillEffect> {
        match self {
            AmuletKind::SoulHarvester => Some(KillEffect::Heal(level.max(1))),
            AmuletKind::CursedSkull => Some(KillEffect::Coins(1)),
            _ => None,
        }
    }

    pub fn modify_weapon_damage(&self, level: u32, damage: u32) -> u32 {
        match self {
            AmuletKind::PowerCharm => damage + level,
            AmuletKind::BerserkerIdol => (damage as f32 * 1.25).floor() as u32,
            _ => damage,
        }
    }

    pub fn modify_damage_taken(&self, level: u32, damage: u32) -> u32 {
        match self {
            AmuletKind::IronSkin => damage.saturating_sub(level),
            // Cursed: rounds against the player.
            AmuletKind::BerserkerIdol => (damage as f32 * 1.25).ceil() as u32,
            _ => damage,
        }
    }

    pub fn modify_potion_healing(&self, _level: u32, healing: u32) -> u32 {
        match self {
            AmuletKind::HealingCharm => (healing as f32 * 1.5).floor() as u32,
            _ => healing,
        }
    }

    pub fn modify_gold_found(&self, _level: u32, gold: u32) -> u32 {
        match self {
            AmuletKind::LuckyCoin => (gold as f32 * 1.5).floor() as u32,
            AmuletKind::CursedSkull => gold * 2,
            _ => gold,
        }
    }

    pub fn modify_food_ap(&self, _level: u32, ap: u32) -> u32 {
        match self {
            AmuletKind::GourmetRing => ap + 1,
            _ => ap,
        }
    }

    /// Additive across the active set; rolled once against the sum.
    pub fn dodge_chance(&self, _level: u32) -> f32 {
        match self {
            AmuletKind::ShadowCloak => 0.10,
            _ => 0.0,
        }
    }

    /// Multiplicative across the active set; 1.0 = full wear.
    pub fn durability_rate(&self, _level: u32) -> f32 {
        match self {
            AmuletKind::WhetstoneCharm => 0.5,
            _ => 1.0,
        }
    }

    /// Whether this kind can intercept a lethal hit (limited-use).
    pub fn prevents_lethal(&self) -> bool {
        matches!(self, AmuletKind::PhoenixFeather)
    }

    pub fn allows_cross_tier_merge(&self) -> bool {
        matches!(self, AmuletKind::TransmuterSigil)
    }

    /// Minimum across the active set, default 1.0 (= 100% of max health).
    pub fn max_health_cap(&self) -> f32 {
        match self {
            AmuletKind::CursedSkull => 0.8,
            _ => 1.0,
        }
    }
}
