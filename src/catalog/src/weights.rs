// src/catalog/src/weights.rs
//! Per-floor spawn distribution and the shared cumulative-weight roll.

use rand::Rng;

use crate::card::CardType;

/// Boss fights every fifth floor.
pub fn is_boss_floor(floor: u32) -> bool {
    floor > 0 && floor % 5 == 0
}

/// Weighted type distribution for a floor. Floors 1-5 are hand-authored;
/// deeper floors fall back to a monotonic formula (enemies and traps creep
/// up, loot creeps down, everything clamped). Boss floors spawn exactly one
/// boss card.
pub fn card_weights(floor: u32) -> Vec<(CardType, u32)> {
    if is_boss_floor(floor) {
        return vec![(CardType::Boss, 100)];
    }

    match floor {
        1 => vec![
            (CardType::Enemy, 30),
            (CardType::Coin, 22),
            (CardType::Weapon, 12),
            (CardType::Armor, 8),
            (CardType::Potion, 8),
            (CardType::Food, 8),
            (CardType::Trap, 4),
            (CardType::Magic, 4),
            (CardType::Amulet, 2),
            (CardType::Crystal, 1),
            (CardType::Key, 1),
        ],
        2 => vec![
            (CardType::Enemy, 32),
            (CardType::Coin, 20),
            (CardType::Weapon, 11),
            (CardType::Armor, 8),
            (CardType::Potion, 8),
            (CardType::Food, 7),
            (CardType::Trap, 5),
            (CardType::Magic, 4),
            (CardType::Amulet, 2),
            (CardType::Crystal, 1),
            (CardType::Key, 2),
        ],
        3 => vec![
            (CardType::Enemy, 34),
            (CardType::Coin, 18),
            (CardType::Weapon, 10),
            (CardType::Armor, 7),
            (CardType::Potion, 8),
            (CardType::Food, 7),
            (CardType::Trap, 6),
            (CardType::Magic, 5),
            (CardType::Amulet, 2),
            (CardType::Crystal, 1),
            (CardType::Key, 2),
        ],
        4 => vec![
            (CardType::Enemy, 36),
            (CardType::Coin, 17),
            (CardType::Weapon, 9),
            (CardType::Armor, 7),
            (CardType::Potion, 8),
            (CardType::Food, 7),
            (CardType::Trap, 6),
            (CardType::Magic, 5),
            (CardType::Amulet, 3),
            (CardType::Crystal, 1),
            (CardType::Key, 2),
        ],
        _ => {
            let f = floor;
            vec![
                (CardType::Enemy, (30 + 2 * f).min(50)),
                (CardType::Coin, 22u32.saturating_sub(f).max(10)),
                (CardType::Weapon, 12u32.saturating_sub(f / 2).max(6)),
                (CardType::Armor, 8u32.saturating_sub(f / 3).max(4)),
                (CardType::Potion, 8),
                (CardType::Food, 7),
                (CardType::Trap, (4 + f / 2).min(10)),
                (CardType::Magic, 5),
                (CardType::Amulet, 3),
                (CardType::Crystal, 2),
                (CardType::Key, 2),
            ]
        }
    }
}

/// Cumulative-weight roll: draw `r = rng * total`, walk the entries
/// subtracting weights, select when `r` drops to or below zero. The last
/// entry is the fallback for floating-point edge cases.
///
/// Panics on an empty slice: an empty weight table is a static
/// configuration bug, not a runtime condition.
pub fn weighted_pick<'a, T>(entries: &'a [(T, u32)], rng: &mut impl Rng) -> &'a T {
    assert!(!entries.is_empty(), "weighted_pick on empty table");
    let total: u32 = entries.iter().map(|(_, w)| w).sum();
    if total == 0 {
        return &entries[entries.len() - 1].0;
    }
    let mut r = rng.random_range(0.0..1.0) * total as f64;
    for (value, weight) in entries {
        r -= *weight as f64;
        if r <= 0.0 {
            return value;
        }
    }
    &entries[entries.len() - 1].0
}
