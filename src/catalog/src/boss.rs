// src/catalog/src/boss.rs
use crate::enemy::{EnemyAbility, EnemyPayload, Role};

/// Named bosses, one per boss floor bracket. Selection takes the highest
/// entry whose `min_floor` has been reached, so late-game boss floors
/// repeat the top of the roster.
pub struct BossSpec {
    pub name: &'static str,
    pub min_floor: u32,
    pub health: u32,
    pub attack: u32,
    pub abilities: &'static [EnemyAbility],
}

pub static BOSSES: &[BossSpec] = &[
    BossSpec {
        name: "Bone Colossus",
        min_floor: 5,
        health: 40,
        attack: 5,
        abilities: &[EnemyAbility::Summon { chance: 0.3 }],
    },
    BossSpec {
        name: "Plague Herald",
        min_floor: 10,
        health: 70,
        attack: 7,
        abilities: &[
            EnemyAbility::Summon { chance: 0.3 },
            EnemyAbility::Poison { damage: 2, turns: 2 },
        ],
    },
    BossSpec {
        name: "Mirror Queen",
        min_floor: 15,
        health: 100,
        attack: 9,
        abilities: &[
            EnemyAbility::Summon { chance: 0.4 },
            EnemyAbility::Evade { chance: 0.2 },
        ],
    },
];

/// Boss payload for the floor. Bosses sit alone on the board; the single
/// slot is a front slot, so the role is melee by construction.
pub fn create_boss(floor: u32) -> EnemyPayload {
    let spec = BOSSES
        .iter()
        .filter(|b| b.min_floor <= floor)
        .next_back()
        .unwrap_or(&BOSSES[0]);
    EnemyPayload {
        name: spec.name.to_string(),
        health: spec.health,
        max_health: spec.health,
        attack: spec.attack,
        role: Role::Melee,
        abilities: spec.abilities.to_vec(),
        frozen: 0,
        hit_counter: 0,
        elite: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boss_roster_escalates_by_floor() {
        assert_eq!(create_boss(5).name, "Bone Colossus");
        assert_eq!(create_boss(10).name, "Plague Herald");
        assert_eq!(create_boss(15).name, "Mirror Queen");
        // Beyond the roster the top boss repeats.
        assert_eq!(create_boss(25).name, "Mirror Queen");
        // Below the first bracket falls back to the first entry.
        assert_eq!(create_boss(1).name, "Bone Colossus");
    }
}
