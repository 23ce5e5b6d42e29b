//! Builders for deterministic combat scenarios shared by the
//! integration suites.
#![allow(dead_code)]

use board::{BoardState, Position};
use catalog::enemy::{EnemyAbility, EnemyPayload, Role};
use catalog::{CardPayload, Rarity, WeaponKind, WeaponPayload};
use combat::{CombatSession, RoomKind, RoomPhase, RoomState};
use runstate::{ItemPayload, RunState};

/// A plain enemy payload; the board fixes the real role from the row at
/// placement.
pub fn enemy(name: &str, health: u32, attack: u32) -> CardPayload {
    CardPayload::Enemy(EnemyPayload {
        name: name.to_string(),
        health,
        max_health: health,
        attack,
        role: Role::Melee,
        abilities: Vec::new(),
        frozen: 0,
        hit_counter: 0,
        elite: false,
    })
}

pub fn enemy_with(
    name: &str,
    health: u32,
    attack: u32,
    abilities: Vec<EnemyAbility>,
) -> CardPayload {
    let mut card = enemy(name, health, attack);
    if let Some(e) = card.as_enemy_mut() {
        e.abilities = abilities;
    }
    card
}

pub fn active_room(kind: RoomKind) -> RoomState {
    RoomState {
        kind,
        phase: RoomPhase::Active,
        initialized: true,
        active_id: 1,
    }
}

/// Session over a hand-placed board with a fixed seed.
pub fn session_over(cards: Vec<(Position, CardPayload, bool)>) -> CombatSession {
    session_seeded(7, cards)
}

pub fn session_seeded(seed: u64, cards: Vec<(Position, CardPayload, bool)>) -> CombatSession {
    let board = BoardState::from_parts(cards);
    CombatSession::restore(RunState::new(seed), board, active_room(RoomKind::Combat))
}

/// Put a weapon into the inventory, returning its slot.
pub fn arm(session: &mut CombatSession, weapon: WeaponPayload) -> usize {
    session
        .run
        .inventory
        .add(ItemPayload::Weapon(weapon))
        .expect("inventory has room in tests")
}

pub fn sword(rarity: Rarity) -> WeaponPayload {
    WeaponPayload::new(WeaponKind::Sword, rarity)
}

pub fn bow(rarity: Rarity) -> WeaponPayload {
    WeaponPayload::new(WeaponKind::Bow, rarity)
}

/// Health of the enemy at `index`, panicking loudly when the slot is
/// empty or not an enemy.
pub fn enemy_health(session: &CombatSession, index: usize) -> u32 {
    session
        .board
        .card(index)
        .and_then(|c| c.payload.as_enemy())
        .map(|e| e.health)
        .expect("enemy expected at index")
}
