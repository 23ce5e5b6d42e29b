// src/board/src/lib.rs
//! Board & reveal engine: owns the spatial topology of the combat board
//! and the rules for what becomes visible and attackable, when.
//!
//! Slots are a fixed arena (`Vec<Option<BoardCard>>`); indices are stable
//! identity for the life of a floor and an emptied slot stays `None`.
//! Operations on empty slots are no-ops, never errors.

pub mod grid;

pub use grid::{
    blob_shape, card_count, compact_shape, neighbor_offsets, neighbors_of, Position, MAX_CARDS,
    MIN_CARDS,
};

use bincode::{Decode, Encode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use catalog::{CardPayload, Role, TrapPayload};

/// One cell on the combat board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct BoardCard {
    pub revealed: bool,
    pub payload: CardPayload,
    pub position: Position,
    /// Precomputed 6-connected adjacency, built once per spawn.
    pub neighbors: Vec<usize>,
}

/// Result of a reveal request.
#[derive(Debug, Clone, PartialEq)]
pub enum RevealOutcome {
    /// Empty or out-of-range slot; nothing happened.
    NoCard,
    /// Already face-up; nothing happened.
    AlreadyRevealed,
    /// Flipped. Any payload consequence is deferred to the caller, to be
    /// applied when the flip animation completes.
    Revealed(Option<PendingConsequence>),
}

/// A payload consequence that must wait for the flip to finish visually.
/// Rule state is only mutated when the caller applies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub enum PendingConsequence {
    /// A trap card fires once its card is face-up.
    Trap { index: usize, trap: TrapPayload },
    /// A boss flip stuns the room: the next enemy turn is skipped.
    SkipNextEnemyTurn,
}

/// How many enemy cards start face-up on a fresh floor.
pub fn initial_reveal_target(floor: u32) -> usize {
    if floor >= 4 { 3 } else { 2 }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct BoardState {
    slots: Vec<Option<BoardCard>>,
}

impl BoardState {
    /// Assemble a board from placed payloads. Enemy roles are fixed here
    /// from the row sign and never change afterwards; adjacency is built
    /// in a second pass over a coordinate map.
    pub fn from_parts(cards: Vec<(Position, CardPayload, bool)>) -> Self {
        let mut slots: Vec<Option<BoardCard>> = cards
            .into_iter()
            .map(|(position, mut payload, revealed)| {
                if let Some(enemy) = payload.as_enemy_mut() {
                    enemy.role = if position.is_front() {
                        Role::Melee
                    } else {
                        Role::Ranged
                    };
                }
                Some(BoardCard {
                    revealed,
                    payload,
                    position,
                    neighbors: Vec::new(),
                })
            })
            .collect();

        let by_pos: HashMap<Position, usize> = slots
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (c.position, i)))
            .collect();
        for slot in slots.iter_mut().flatten() {
            slot.neighbors = neighbors_of(slot.position)
                .iter()
                .filter_map(|p| by_pos.get(p).copied())
                .collect();
        }

        Self { slots }
    }

    /// Rebuild a board from a snapshot, preserving emptied slots as the
    /// `None` holes they were: indices are identity and must survive a
    /// save/load round trip.
    pub fn from_slots(slots: Vec<Option<(Position, CardPayload, bool)>>) -> Self {
        let mut board = Self {
            slots: slots
                .into_iter()
                .map(|entry| {
                    entry.map(|(position, payload, revealed)| BoardCard {
                        revealed,
                        payload,
                        position,
                        neighbors: Vec::new(),
                    })
                })
                .collect(),
        };
        let by_pos: HashMap<Position, usize> = board
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (c.position, i)))
            .collect();
        for slot in board.slots.iter_mut().flatten() {
            slot.neighbors = neighbors_of(slot.position)
                .iter()
                .filter_map(|p| by_pos.get(p).copied())
                .collect();
        }
        board
    }

    /// Spawn a regular combat floor: compact cluster, weighted payload
    /// rolls, then the initial free reveals. Returns the revealed indices.
    pub fn spawn_combat(floor: u32, elite: bool, rng: &mut impl Rng) -> (Self, Vec<usize>) {
        let shape = compact_shape(card_count(floor, elite));
        let mut cards: Vec<(Position, CardPayload, bool)> = shape
            .into_iter()
            .map(|pos| (pos, catalog::roll_card(floor, elite, rng), false))
            .collect();

        // A combat floor with zero enemies would clear itself; force one.
        if !cards.iter().any(|(_, p, _)| p.is_enemy()) {
            cards[0].1 = CardPayload::Enemy(catalog::enemy::create_enemy(floor, elite, rng));
        }

        let mut board = Self::from_parts(cards);
        let picks = board.reveal_initial(floor, rng);
        (board, picks)
    }

    /// Boss floors collapse the board to a single always-revealed front
    /// slot.
    pub fn spawn_boss(floor: u32) -> Self {
        Self::from_parts(vec![(
            Position::new(1, 0),
            CardPayload::Boss(catalog::boss::create_boss(floor)),
            true,
        )])
    }

    /// Treasure rooms use the blob shape and come fully revealed: chests
    /// plus loose loot, no enemies.
    pub fn spawn_treasure(floor: u32, rng: &mut impl Rng) -> Self {
        let chests = if floor >= 8 { 2 } else { 1 };
        let shape = blob_shape(6, rng);
        let cards = shape
            .into_iter()
            .enumerate()
            .map(|(i, pos)| {
                let payload = if i < chests {
                    CardPayload::TreasureChest { opened: false }
                } else if i % 2 == 0 {
                    CardPayload::Coin {
                        amount: catalog::loot::coin_amount(floor, rng),
                    }
                } else {
                    CardPayload::Crystal {
                        amount: catalog::loot::crystal_amount(floor),
                    }
                };
                (pos, payload, true)
            })
            .collect();
        Self::from_parts(cards)
    }

    /* ---------- slot access ---------- */

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    pub fn card(&self, index: usize) -> Option<&BoardCard> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    pub fn card_mut(&mut self, index: usize) -> Option<&mut BoardCard> {
        self.slots.get_mut(index).and_then(|s| s.as_mut())
    }

    /// Clear a slot, returning the card. Clearing an empty slot is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<BoardCard> {
        self.slots.get_mut(index).and_then(|s| s.take())
    }

    /// Every slot in index order, holes included (snapshot support).
    pub fn iter_slots(&self) -> impl Iterator<Item = Option<&BoardCard>> {
        self.slots.iter().map(|s| s.as_ref())
    }

    pub fn iter_cards(&self) -> impl Iterator<Item = (usize, &BoardCard)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|c| (i, c)))
    }

    pub fn empty_slot_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.is_none().then_some(i))
            .collect()
    }

    /// Re-occupy an emptied slot (boss summons). Position and adjacency
    /// are inherited from the original spawn layout, so the payload must
    /// be placed into a slot that once held a card. Returns false if the
    /// slot is still occupied or never existed.
    pub fn place_summon(&mut self, index: usize, payload: CardPayload, layout: &SlotLayout) -> bool {
        if index >= self.slots.len() || self.slots[index].is_some() {
            return false;
        }
        let Some((position, neighbors)) = layout.get(index) else {
            return false;
        };
        let mut payload = payload;
        if let Some(enemy) = payload.as_enemy_mut() {
            enemy.role = if position.is_front() {
                Role::Melee
            } else {
                Role::Ranged
            };
        }
        self.slots[index] = Some(BoardCard {
            revealed: true,
            payload,
            position,
            neighbors,
        });
        true
    }

    /// Snapshot of every slot's position and adjacency, taken at spawn so
    /// summons can re-occupy cleared slots later.
    pub fn layout(&self) -> SlotLayout {
        SlotLayout {
            slots: self
                .slots
                .iter()
                .map(|s| s.as_ref().map(|c| (c.position, c.neighbors.clone())))
                .collect(),
        }
    }

    /* ---------- enemy queries ---------- */

    pub fn enemy_indices(&self) -> Vec<usize> {
        self.iter_cards()
            .filter(|(_, c)| c.payload.as_enemy().is_some_and(|e| e.is_alive()))
            .map(|(i, _)| i)
            .collect()
    }

    /// The gate predicate: true while any melee-role enemy is alive
    /// anywhere on the board, revealed or not.
    pub fn any_melee_alive(&self) -> bool {
        self.iter_cards().any(|(_, c)| {
            c.payload
                .as_enemy()
                .is_some_and(|e| e.is_alive() && e.role == Role::Melee)
        })
    }

    pub fn hidden_ranged_indices(&self) -> Vec<usize> {
        self.iter_cards()
            .filter(|(_, c)| {
                !c.revealed
                    && c.payload
                        .as_enemy()
                        .is_some_and(|e| e.is_alive() && e.role == Role::Ranged)
            })
            .map(|(i, _)| i)
            .collect()
    }

    pub fn revealed_enemy_indices(&self) -> Vec<usize> {
        self.iter_cards()
            .filter(|(_, c)| c.revealed && c.payload.as_enemy().is_some_and(|e| e.is_alive()))
            .map(|(i, _)| i)
            .collect()
    }

    /// Melee attacks may only reach a ranged-role target once no melee
    /// enemy survives anywhere. Hidden melee enemies still block.
    pub fn melee_gate_blocks(&self, target: usize) -> bool {
        let Some(card) = self.card(target) else {
            return false;
        };
        let Some(enemy) = card.payload.as_enemy() else {
            return false;
        };
        enemy.role == Role::Ranged && self.any_melee_alive()
    }

    pub fn unopened_chest_count(&self) -> usize {
        self.iter_cards()
            .filter(|(_, c)| matches!(c.payload, CardPayload::TreasureChest { opened: false }))
            .count()
    }

    /* ---------- reveal rules ---------- */

    /// Flip a card. The payload consequence (trap damage, boss stun) is
    /// returned for the caller to apply after the flip animation; the
    /// board mutation itself is immediate.
    pub fn reveal(&mut self, index: usize) -> RevealOutcome {
        let Some(card) = self.card_mut(index) else {
            return RevealOutcome::NoCard;
        };
        if card.revealed {
            return RevealOutcome::AlreadyRevealed;
        }
        card.revealed = true;
        let consequence = match &card.payload {
            CardPayload::Trap(trap) => Some(PendingConsequence::Trap {
                index,
                trap: *trap,
            }),
            CardPayload::Boss(_) => Some(PendingConsequence::SkipNextEnemyTurn),
            _ => None,
        };
        RevealOutcome::Revealed(consequence)
    }

    /// Initial free reveals for a fresh floor: one front-role enemy when
    /// any exists, one back-role enemy if room remains, then fill with
    /// enemies adjacent to the picks, falling back to any unpicked enemy.
    /// All picks flip simultaneously and cost nothing.
    pub fn reveal_initial(&mut self, floor: u32, rng: &mut impl Rng) -> Vec<usize> {
        let picks = self.initial_reveal_picks(floor, rng);
        for &i in &picks {
            if let Some(card) = self.slots.get_mut(i).and_then(|s| s.as_mut()) {
                card.revealed = true;
            }
        }
        picks
    }

    fn initial_reveal_picks(&self, floor: u32, rng: &mut impl Rng) -> Vec<usize> {
        let target = initial_reveal_target(floor);
        let enemies = self.enemy_indices();
        let front: Vec<usize> = enemies
            .iter()
            .copied()
            .filter(|&i| self.card(i).unwrap().position.is_front())
            .collect();
        let back: Vec<usize> = enemies
            .iter()
            .copied()
            .filter(|&i| !self.card(i).unwrap().position.is_front())
            .collect();

        let mut picks: Vec<usize> = Vec::with_capacity(target);
        if !front.is_empty() {
            picks.push(front[rng.random_range(0..front.len())]);
        }
        if picks.len() < target && !back.is_empty() {
            picks.push(back[rng.random_range(0..back.len())]);
        }

        while picks.len() < target {
            let adjacent: Vec<usize> = picks
                .iter()
                .filter_map(|&i| self.card(i))
                .flat_map(|c| c.neighbors.iter().copied())
                .filter(|i| enemies.contains(i) && !picks.contains(i))
                .collect();
            let pool: Vec<usize> = if adjacent.is_empty() {
                enemies
                    .iter()
                    .copied()
                    .filter(|i| !picks.contains(i))
                    .collect()
            } else {
                adjacent
            };
            if pool.is_empty() {
                break;
            }
            picks.push(pool[rng.random_range(0..pool.len())]);
        }
        picks
    }

    /// Progressive reveal-on-clear. Called while the dying card still
    /// occupies its slot (health zero), so its neighbor list is readable
    /// without any stub bookkeeping; the caller removes the card after.
    ///
    /// Once no melee enemy survives, exactly one hidden ranged enemy is
    /// revealed: a neighbor of the dead card when possible, otherwise a
    /// uniform pick over the whole board.
    pub fn reveal_candidate_after_kill(
        &self,
        dead_index: usize,
        rng: &mut impl Rng,
    ) -> Option<usize> {
        if self.any_melee_alive() {
            return None;
        }
        let hidden = self.hidden_ranged_indices();
        if hidden.is_empty() {
            return None;
        }
        let near: Vec<usize> = self
            .card(dead_index)
            .map(|c| {
                c.neighbors
                    .iter()
                    .copied()
                    .filter(|i| hidden.contains(i))
                    .collect()
            })
            .unwrap_or_default();
        let pool = if near.is_empty() { &hidden } else { &near };
        Some(pool[rng.random_range(0..pool.len())])
    }
}

/// Positions and adjacency of every slot at spawn time, kept so cleared
/// slots can be re-occupied by summons.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct SlotLayout {
    slots: Vec<Option<(Position, Vec<usize>)>>,
}

impl SlotLayout {
    pub fn get(&self, index: usize) -> Option<(Position, Vec<usize>)> {
        self.slots.get(index).and_then(|s| s.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::enemy::EnemyPayload;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn enemy(name: &str, health: u32) -> CardPayload {
        CardPayload::Enemy(EnemyPayload {
            name: name.to_string(),
            health,
            max_health: health,
            attack: 2,
            role: Role::Melee, // overwritten at placement
            abilities: Vec::new(),
            frozen: 0,
            hit_counter: 0,
            elite: false,
        })
    }

    fn coin() -> CardPayload {
        CardPayload::Coin { amount: 3 }
    }

    #[test]
    fn roles_are_fixed_from_row_sign_at_placement() {
        let board = BoardState::from_parts(vec![
            (Position::new(1, 0), enemy("front", 5), false),
            (Position::new(0, 0), enemy("back", 5), false),
            (Position::new(-1, 0), enemy("deep back", 5), false),
        ]);
        let role_of = |i: usize| board.card(i).unwrap().payload.as_enemy().unwrap().role;
        assert_eq!(role_of(0), Role::Melee);
        assert_eq!(role_of(1), Role::Ranged);
        assert_eq!(role_of(2), Role::Ranged);
    }

    #[test]
    fn adjacency_links_brick_neighbors_both_ways() {
        // Row 0 (even) at col 0 neighbors row 1 (odd) at cols -1 and 0.
        let board = BoardState::from_parts(vec![
            (Position::new(0, 0), coin(), false),
            (Position::new(1, 0), coin(), false),
            (Position::new(1, -1), coin(), false),
            (Position::new(5, 5), coin(), false),
        ]);
        let neighbors = &board.card(0).unwrap().neighbors;
        assert!(neighbors.contains(&1));
        assert!(neighbors.contains(&2));
        assert!(!neighbors.contains(&3));
        assert!(board.card(1).unwrap().neighbors.contains(&0));
    }

    #[test]
    fn hidden_melee_still_blocks_the_gate() {
        let board = BoardState::from_parts(vec![
            (Position::new(1, 0), enemy("hidden melee", 5), false),
            (Position::new(0, 0), enemy("revealed ranged", 5), true),
        ]);
        assert!(board.melee_gate_blocks(1));
        assert!(!board.melee_gate_blocks(0));
    }

    #[test]
    fn gate_opens_when_melee_health_reaches_zero() {
        let mut board = BoardState::from_parts(vec![
            (Position::new(1, 0), enemy("melee", 5), true),
            (Position::new(0, 0), enemy("ranged", 5), true),
        ]);
        board
            .card_mut(0)
            .unwrap()
            .payload
            .as_enemy_mut()
            .unwrap()
            .health = 0;
        assert!(!board.melee_gate_blocks(1));
    }

    #[test]
    fn reveal_is_noop_on_empty_and_revealed_slots() {
        let mut board = BoardState::from_parts(vec![(Position::new(1, 0), coin(), true)]);
        assert_eq!(board.reveal(0), RevealOutcome::AlreadyRevealed);
        assert_eq!(board.reveal(42), RevealOutcome::NoCard);
        board.remove(0);
        assert_eq!(board.reveal(0), RevealOutcome::NoCard);
        // Double-remove is also a no-op.
        assert!(board.remove(0).is_none());
    }

    #[test]
    fn trap_reveal_defers_its_consequence() {
        let mut rng = Pcg32::seed_from_u64(4);
        let trap = catalog::trap::create_trap(2, &mut rng);
        let mut board =
            BoardState::from_parts(vec![(Position::new(0, 0), CardPayload::Trap(trap), false)]);
        match board.reveal(0) {
            RevealOutcome::Revealed(Some(PendingConsequence::Trap { index, .. })) => {
                assert_eq!(index, 0)
            }
            other => panic!("expected deferred trap, got {other:?}"),
        }
        // The card itself is face-up immediately.
        assert!(board.card(0).unwrap().revealed);
    }

    #[test]
    fn initial_reveal_counts_follow_the_floor() {
        let mut rng = Pcg32::seed_from_u64(8);
        for (floor, expected) in [(1u32, 2usize), (3, 2), (4, 3), (9, 3)] {
            let (board, picks) = BoardState::spawn_combat(floor, false, &mut rng);
            let enemies = board.enemy_indices().len();
            assert_eq!(picks.len(), expected.min(enemies), "floor {floor}");
            for &i in &picks {
                assert!(board.card(i).unwrap().revealed);
                assert!(board.card(i).unwrap().payload.is_enemy());
            }
        }
    }

    #[test]
    fn initial_reveal_includes_a_front_enemy_when_one_exists() {
        let mut rng = Pcg32::seed_from_u64(13);
        for _ in 0..50 {
            let (board, picks) = BoardState::spawn_combat(2, false, &mut rng);
            let has_front_enemy = board.iter_cards().any(|(_, c)| {
                c.payload.as_enemy().is_some() && c.position.is_front()
            });
            if has_front_enemy {
                assert!(
                    picks
                        .iter()
                        .any(|&i| board.card(i).unwrap().position.is_front()),
                    "no front enemy among initial reveals"
                );
            }
        }
    }

    #[test]
    fn kill_reveal_prefers_neighbors_of_the_dead_card() {
        let mut rng = Pcg32::seed_from_u64(21);
        // Lone melee at (1,0); hidden ranged at (0,0) adjacent, another far
        // away at (-2, 3).
        let mut board = BoardState::from_parts(vec![
            (Position::new(1, 0), enemy("melee", 5), true),
            (Position::new(0, 0), enemy("near ranged", 5), false),
            (Position::new(-2, 3), enemy("far ranged", 5), false),
        ]);
        // Melee still alive: no reveal yet.
        assert_eq!(board.reveal_candidate_after_kill(0, &mut rng), None);

        board
            .card_mut(0)
            .unwrap()
            .payload
            .as_enemy_mut()
            .unwrap()
            .health = 0;
        for _ in 0..20 {
            assert_eq!(board.reveal_candidate_after_kill(0, &mut rng), Some(1));
        }
    }

    #[test]
    fn kill_reveal_falls_back_to_any_hidden_ranged() {
        let mut rng = Pcg32::seed_from_u64(22);
        let mut board = BoardState::from_parts(vec![
            (Position::new(1, 0), enemy("melee", 5), true),
            (Position::new(-3, 4), enemy("far ranged", 5), false),
        ]);
        board
            .card_mut(0)
            .unwrap()
            .payload
            .as_enemy_mut()
            .unwrap()
            .health = 0;
        assert_eq!(board.reveal_candidate_after_kill(0, &mut rng), Some(1));
    }

    #[test]
    fn boss_spawn_is_single_revealed_melee_slot() {
        let board = BoardState::spawn_boss(5);
        assert_eq!(board.len(), 1);
        let card = board.card(0).unwrap();
        assert!(card.revealed);
        assert!(card.payload.is_boss());
        assert_eq!(card.payload.as_enemy().unwrap().role, Role::Melee);
    }

    #[test]
    fn treasure_spawn_has_chests_and_no_enemies() {
        let mut rng = Pcg32::seed_from_u64(31);
        let board = BoardState::spawn_treasure(3, &mut rng);
        assert!(board.unopened_chest_count() >= 1);
        assert!(board.enemy_indices().is_empty());
        assert!(board.iter_cards().all(|(_, c)| c.revealed));
    }

    #[test]
    fn summon_reoccupies_cleared_slots_only() {
        let mut board = BoardState::from_parts(vec![
            (Position::new(1, 0), enemy("a", 5), true),
            (Position::new(0, 0), enemy("b", 5), true),
        ]);
        let layout = board.layout();
        assert!(!board.place_summon(0, enemy("c", 3), &layout));
        board.remove(0);
        assert!(board.place_summon(0, enemy("c", 3), &layout));
        let card = board.card(0).unwrap();
        assert!(card.revealed);
        // Role re-derived from the slot's row.
        assert_eq!(card.payload.as_enemy().unwrap().role, Role::Melee);
        assert_eq!(card.neighbors, vec![1]);
    }
}
