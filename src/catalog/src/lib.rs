// src/catalog/src/lib.rs
//! Content catalog: static stat tables and deterministic lookup/weighted
//! selection. Given a card type and a floor this crate always produces a
//! fully-populated payload; missing content resolves to fallbacks, never
//! errors. The only panic here is an empty weight table, which is a
//! programming-time configuration bug.

pub mod boss;
pub mod card;
pub mod consumable;
pub mod enemy;
pub mod gear;
pub mod loot;
pub mod trap;
pub mod weights;

pub use card::{CardPayload, CardType, FoodPayload, MagicKind, MagicPayload, PotionPayload};
pub use enemy::{EnemyAbility, EnemyPayload, Role};
pub use gear::{ArmorPayload, Rarity, WeaponKind, WeaponPayload, WeaponSpecial};
pub use trap::{TrapKind, TrapPayload};
pub use weights::{card_weights, is_boss_floor, weighted_pick};

use rand::Rng;

/// Build a card payload of the requested type for the floor. Dispatches to
/// the per-type generators; every arm produces a valid payload.
pub fn create_card(ty: CardType, floor: u32, elite: bool, rng: &mut impl Rng) -> CardPayload {
    match ty {
        CardType::Enemy => CardPayload::Enemy(enemy::create_enemy(floor, elite, rng)),
        CardType::Boss => CardPayload::Boss(boss::create_boss(floor)),
        CardType::Coin => CardPayload::Coin {
            amount: loot::coin_amount(floor, rng),
        },
        CardType::Crystal => CardPayload::Crystal {
            amount: loot::crystal_amount(floor),
        },
        CardType::Trap => CardPayload::Trap(trap::create_trap(floor, rng)),
        CardType::Weapon => CardPayload::Weapon(loot::create_weapon(floor, rng)),
        CardType::Armor => CardPayload::Armor(loot::create_armor(floor, rng)),
        CardType::Amulet => CardPayload::Amulet {
            kind: loot::pick_amulet(&[], rng),
        },
        CardType::Potion => CardPayload::Potion(consumable::create_potion(floor)),
        CardType::Food => CardPayload::Food(consumable::create_food(floor)),
        CardType::Magic => CardPayload::Magic(consumable::create_magic(floor, rng)),
        CardType::Key => CardPayload::Key,
        CardType::TreasureChest => CardPayload::TreasureChest { opened: false },
    }
}

/// Roll a card type from the floor's weight table and build its payload.
pub fn roll_card(floor: u32, elite: bool, rng: &mut impl Rng) -> CardPayload {
    let weights = card_weights(floor);
    let ty = *weighted_pick(&weights, rng);
    create_card(ty, floor, elite, rng)
}
