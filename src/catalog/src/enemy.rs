// src/catalog/src/enemy.rs
use bincode::{Decode, Encode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Fixed at spawn from the card's board row sign; never changes afterwards,
/// even if the enemy becomes the last one standing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize, Encode, Decode,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Melee,
    Ranged,
}

/// Per-species combat abilities, carried as data on the payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "snake_case")]
pub enum EnemyAbility {
    /// Applies a poison stack to the player on hit.
    Poison { damage: u32, turns: u32 },
    /// Chance to steal coins on hit.
    CoinSteal { chance: f32, amount: u32 },
    /// Chance to dodge an incoming (non-reflected) attack entirely.
    Evade { chance: f32 },
    /// Chance each enemy turn to summon an ally into an empty slot.
    Summon { chance: f32 },
    /// Heals for a percentage of the damage it deals.
    Lifesteal { percent: u32 },
    /// Extra damage against an armored player.
    ArmorBreak { bonus: u32 },
    /// Bonus attack while below a health threshold.
    Rage { threshold_percent: u32, bonus: u32 },
    /// Escapes the board after this many hits survived (no death rewards).
    Escape { after_hits: u32 },
}

/// A live enemy (or boss) on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct EnemyPayload {
    pub name: String,
    pub health: u32,
    pub max_health: u32,
    pub attack: u32,
    pub role: Role,
    pub abilities: Vec<EnemyAbility>,
    /// Turns of freeze remaining; a frozen enemy skips its attack.
    pub frozen: u32,
    /// Hits survived so far, for `Escape` species.
    pub hit_counter: u32,
    pub elite: bool,
}

impl EnemyPayload {
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn ability_evade_chance(&self) -> Option<f32> {
        self.abilities.iter().find_map(|a| match a {
            EnemyAbility::Evade { chance } => Some(*chance),
            _ => None,
        })
    }

    pub fn escape_threshold(&self) -> Option<u32> {
        self.abilities.iter().find_map(|a| match a {
            EnemyAbility::Escape { after_hits } => Some(*after_hits),
            _ => None,
        })
    }

    /// Attack value for this turn, including rage bonuses.
    pub fn effective_attack(&self) -> u32 {
        let mut attack = self.attack;
        for ability in &self.abilities {
            if let EnemyAbility::Rage {
                threshold_percent,
                bonus,
            } = ability
            {
                if self.health * 100 <= self.max_health * threshold_percent {
                    attack += bonus;
                }
            }
        }
        attack
    }
}

/// One growth step of a species; the highest tier whose `min_floor` has been
/// reached is the one that spawns.
pub struct EnemyTier {
    pub min_floor: u32,
    pub health: u32,
    pub attack: u32,
}

/// Static species definition.
pub struct EnemySpec {
    pub name: &'static str,
    pub min_floor: u32,
    pub tiers: &'static [EnemyTier],
    pub abilities: &'static [EnemyAbility],
}

/// Every regular enemy species, ordered roughly by first appearance.
pub static ENEMIES: &[EnemySpec] = &[
    EnemySpec {
        name: "Cave Rat",
        min_floor: 1,
        tiers: &[
            EnemyTier { min_floor: 1, health: 4, attack: 1 },
            EnemyTier { min_floor: 4, health: 7, attack: 2 },
            EnemyTier { min_floor: 8, health: 11, attack: 3 },
        ],
        abilities: &[],
    },
    EnemySpec {
        name: "Dire Bat",
        min_floor: 1,
        tiers: &[
            EnemyTier { min_floor: 1, health: 3, attack: 2 },
            EnemyTier { min_floor: 5, health: 6, attack: 3 },
            EnemyTier { min_floor: 9, health: 9, attack: 4 },
        ],
        abilities: &[EnemyAbility::Evade { chance: 0.25 }],
    },
    EnemySpec {
        name: "Slime",
        min_floor: 1,
        tiers: &[
            EnemyTier { min_floor: 1, health: 5, attack: 1 },
            EnemyTier { min_floor: 4, health: 9, attack: 2 },
            EnemyTier { min_floor: 8, health: 14, attack: 3 },
        ],
        abilities: &[],
    },
    EnemySpec {
        name: "Venom Spider",
        min_floor: 2,
        tiers: &[
            EnemyTier { min_floor: 2, health: 5, attack: 2 },
            EnemyTier { min_floor: 6, health: 9, attack: 3 },
            EnemyTier { min_floor: 10, health: 13, attack: 4 },
        ],
        abilities: &[EnemyAbility::Poison { damage: 2, turns: 2 }],
    },
    EnemySpec {
        name: "Skeleton",
        min_floor: 2,
        tiers: &[
            EnemyTier { min_floor: 2, health: 6, attack: 2 },
            EnemyTier { min_floor: 6, health: 10, attack: 3 },
            EnemyTier { min_floor: 10, health: 15, attack: 5 },
        ],
        abilities: &[],
    },
    EnemySpec {
        name: "Mimic",
        min_floor: 3,
        tiers: &[
            EnemyTier { min_floor: 3, health: 8, attack: 3 },
            EnemyTier { min_floor: 8, health: 14, attack: 5 },
        ],
        abilities: &[EnemyAbility::Escape { after_hits: 4 }],
    },
    EnemySpec {
        name: "Gutter Thief",
        min_floor: 3,
        tiers: &[
            EnemyTier { min_floor: 3, health: 6, attack: 2 },
            EnemyTier { min_floor: 7, health: 10, attack: 3 },
            EnemyTier { min_floor: 11, health: 14, attack: 5 },
        ],
        abilities: &[EnemyAbility::CoinSteal { chance: 0.35, amount: 3 }],
    },
    EnemySpec {
        name: "Ghost",
        min_floor: 4,
        tiers: &[
            EnemyTier { min_floor: 4, health: 7, attack: 3 },
            EnemyTier { min_floor: 8, health: 11, attack: 4 },
            EnemyTier { min_floor: 12, health: 16, attack: 6 },
        ],
        abilities: &[EnemyAbility::Evade { chance: 0.4 }],
    },
    EnemySpec {
        name: "Stone Golem",
        min_floor: 5,
        tiers: &[
            EnemyTier { min_floor: 5, health: 12, attack: 3 },
            EnemyTier { min_floor: 9, health: 18, attack: 5 },
            EnemyTier { min_floor: 13, health: 24, attack: 7 },
        ],
        abilities: &[EnemyAbility::ArmorBreak { bonus: 2 }],
    },
    EnemySpec {
        name: "Vampire",
        min_floor: 6,
        tiers: &[
            EnemyTier { min_floor: 6, health: 10, attack: 4 },
            EnemyTier { min_floor: 10, health: 15, attack: 6 },
        ],
        abilities: &[EnemyAbility::Lifesteal { percent: 50 }],
    },
    EnemySpec {
        name: "Berserker",
        min_floor: 7,
        tiers: &[
            EnemyTier { min_floor: 7, health: 12, attack: 5 },
            EnemyTier { min_floor: 11, health: 18, attack: 7 },
        ],
        abilities: &[EnemyAbility::Rage { threshold_percent: 50, bonus: 2 }],
    },
    EnemySpec {
        name: "Necromancer",
        min_floor: 8,
        tiers: &[
            EnemyTier { min_floor: 8, health: 12, attack: 3 },
            EnemyTier { min_floor: 12, health: 18, attack: 5 },
        ],
        abilities: &[EnemyAbility::Summon { chance: 0.35 }],
    },
];

/// Elite scaling: health x1.2 (floored), attack +2.
const ELITE_HEALTH_MULTIPLIER: f32 = 1.2;
const ELITE_ATTACK_BONUS: u32 = 2;

/// Create an enemy for the floor: uniform pick among species whose
/// `min_floor` has been reached, then the highest unlocked tier. With no
/// eligible species (never with the shipped table) a fixed fallback block
/// is returned; this function cannot fail.
pub fn create_enemy(floor: u32, elite: bool, rng: &mut impl Rng) -> EnemyPayload {
    let eligible: Vec<&EnemySpec> = ENEMIES.iter().filter(|s| s.min_floor <= floor).collect();
    let Some(spec) = eligible
        .get(rng.random_range(0..eligible.len().max(1)))
        .copied()
    else {
        return fallback_enemy(floor);
    };

    let tier = spec
        .tiers
        .iter()
        .filter(|t| t.min_floor <= floor)
        .next_back()
        .unwrap_or(&spec.tiers[0]);

    let (mut health, mut attack) = (tier.health, tier.attack);
    if elite {
        health = (health as f32 * ELITE_HEALTH_MULTIPLIER).floor() as u32;
        attack += ELITE_ATTACK_BONUS;
    }

    EnemyPayload {
        name: spec.name.to_string(),
        health,
        max_health: health,
        attack,
        // Placeholder; the board fixes the role from the row sign at
        // placement and it never changes afterwards.
        role: Role::Melee,
        abilities: spec.abilities.to_vec(),
        frozen: 0,
        hit_counter: 0,
        elite,
    }
}

/// Deterministic stat block used when no species is eligible.
fn fallback_enemy(floor: u32) -> EnemyPayload {
    EnemyPayload {
        name: "Lost Soul".to_string(),
        health: 3 + floor,
        max_health: 3 + floor,
        attack: 1 + floor / 4,
        role: Role::Melee,
        abilities: Vec::new(),
        frozen: 0,
        hit_counter: 0,
        elite: false,
    }
}
