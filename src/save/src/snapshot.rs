// src/save/src/snapshot.rs
//! The versioned run snapshot. Loads tolerate absent or malformed fields
//! through per-field defaults; a migration pass backfills fields added in
//! later schema versions; snapshots past the retention window are
//! discarded as if they never existed.

use serde::{Deserialize, Serialize};

use amulets::ActiveAmulets;
use board::{BoardState, Position};
use catalog::{ArmorPayload, CardPayload};
use combat::{CombatSession, RoomKind, RoomPhase, RoomState};
use error::GameError;
use runstate::{
    DamageStats, Inventory, RunState, StatusEffect, TimedBuff, BASE_MAX_ACTIONS, BASE_MAX_HEALTH,
};

/// Current run-snapshot schema version.
pub const SAVE_VERSION: &str = "2.1.0";

/// Saves older than a week are discarded on load.
pub const RETENTION_SECS: u64 = 7 * 24 * 60 * 60;

fn legacy_version() -> String {
    // Snapshots written before versioning existed parse as v1.
    "1.0.0".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSection {
    pub health: u32,
    pub max_health: u32,
    pub base_max_health: u32,
    pub actions_left: u32,
    pub max_actions: u32,
    pub first_action_used: bool,
    pub coins: u32,
    pub crystals: u32,
    pub keys: u32,
    pub current_floor: u32,
    pub bonus_inventory_slots: u32,
    pub bottomless_bag_applied: bool,
    pub rng_seed: u64,
}

impl Default for PlayerSection {
    fn default() -> Self {
        Self {
            health: BASE_MAX_HEALTH,
            max_health: BASE_MAX_HEALTH,
            base_max_health: BASE_MAX_HEALTH,
            actions_left: BASE_MAX_ACTIONS,
            max_actions: BASE_MAX_ACTIONS,
            first_action_used: false,
            coins: 0,
            crystals: 0,
            keys: 0,
            current_floor: 1,
            bonus_inventory_slots: 0,
            bottomless_bag_applied: false,
            rng_seed: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentSection {
    pub equipped_armor: Option<ArmorPayload>,
    pub inventory: Inventory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsSection {
    pub active_amulets: ActiveAmulets,
    pub player_effects: Vec<StatusEffect>,
    pub shadow_blade: Option<TimedBuff>,
    pub magic_shield: Option<TimedBuff>,
    pub bone_wall: u32,
    pub mirror_shield: bool,
    pub block_next_attack: bool,
}

/// One board slot; `None` entries are the load-bearing null holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSlot {
    pub revealed: bool,
    pub data: CardPayload,
    pub position: Position,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSection {
    pub cards: Vec<Option<CardSlot>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSection {
    #[serde(rename = "type")]
    pub kind: RoomKind,
    pub initialized: bool,
    pub active_id: u32,
}

impl Default for RoomSection {
    fn default() -> Self {
        Self {
            kind: RoomKind::Combat,
            initialized: false,
            active_id: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSnapshot {
    pub player: PlayerSection,
    pub equipment: EquipmentSection,
    pub effects: EffectsSection,
    pub damage_tracking: DamageStats,
    pub board: BoardSection,
    pub room: RoomSection,
    pub saved_at: u64,
    #[serde(default = "legacy_version")]
    pub save_version: String,
}

impl RunSnapshot {
    /// Capture the full session state at `saved_at` (unix seconds).
    pub fn capture(session: &CombatSession, saved_at: u64) -> Self {
        let run = &session.run;
        Self {
            player: PlayerSection {
                health: run.health,
                max_health: run.max_health,
                base_max_health: run.base_max_health,
                actions_left: run.actions_left,
                max_actions: run.max_actions,
                first_action_used: run.first_action_used,
                coins: run.coins,
                crystals: run.crystals,
                keys: run.keys,
                current_floor: run.current_floor,
                bonus_inventory_slots: run.bonus_inventory_slots,
                bottomless_bag_applied: run.bottomless_bag_applied,
                rng_seed: run.rng.seed(),
            },
            equipment: EquipmentSection {
                equipped_armor: run.equipped_armor.clone(),
                inventory: run.inventory.clone(),
            },
            effects: EffectsSection {
                active_amulets: run.amulets.clone(),
                player_effects: run.player_effects.clone(),
                shadow_blade: run.buffs.shadow_blade,
                magic_shield: run.buffs.magic_shield,
                bone_wall: run.buffs.bone_wall,
                mirror_shield: run.buffs.mirror_shield,
                block_next_attack: run.buffs.block_next_attack,
            },
            damage_tracking: run.damage_stats.clone(),
            board: BoardSection {
                cards: session
                    .board
                    .iter_slots()
                    .map(|slot| {
                        slot.map(|card| CardSlot {
                            revealed: card.revealed,
                            data: card.payload.clone(),
                            position: card.position,
                        })
                    })
                    .collect(),
            },
            room: RoomSection {
                kind: session.room.kind,
                initialized: session.room.initialized,
                active_id: session.room.active_id,
            },
            saved_at,
            save_version: SAVE_VERSION.to_string(),
        }
    }

    /// True when the snapshot is past the retention window.
    pub fn is_stale(&self, now: u64) -> bool {
        now.saturating_sub(self.saved_at) > RETENTION_SECS
    }

    /// Backfill fields introduced after the snapshot was written, keyed by
    /// the major of `save_version`. Unknown future versions pass through.
    pub fn migrate(&mut self) {
        let major = self
            .save_version
            .split('.')
            .next()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(1);
        if major < 2 {
            // v1 predates the capped action pool and the derived max
            // health split; zeroes here mean "field was missing".
            if self.player.max_actions == 0 {
                self.player.max_actions = BASE_MAX_ACTIONS;
            }
            if self.player.max_health == 0 {
                self.player.max_health = BASE_MAX_HEALTH;
            }
            if self.player.base_max_health == 0 {
                self.player.base_max_health = self.player.max_health;
            }
        }
        self.save_version = SAVE_VERSION.to_string();
    }

    /// Rebuild a live session. Staleness is rejected here as a final
    /// guard; relic passives are re-applied by the caller on top of the
    /// restored state (they are not serialized).
    pub fn restore(mut self, now: u64) -> Result<CombatSession, GameError> {
        if self.is_stale(now) {
            return Err(GameError::StaleSave);
        }
        self.migrate();

        let mut run = RunState::new(self.player.rng_seed);
        run.health = self.player.health.min(self.player.max_health);
        run.max_health = self.player.max_health;
        run.base_max_health = self.player.base_max_health;
        run.actions_left = self.player.actions_left.min(self.player.max_actions);
        run.max_actions = self.player.max_actions;
        run.first_action_used = self.player.first_action_used;
        run.coins = self.player.coins;
        run.crystals = self.player.crystals;
        run.keys = self.player.keys;
        run.current_floor = self.player.current_floor;
        run.bonus_inventory_slots = self.player.bonus_inventory_slots;
        run.bottomless_bag_applied = self.player.bottomless_bag_applied;
        run.equipped_armor = self.equipment.equipped_armor;
        run.inventory = self.equipment.inventory;
        run.amulets = self.effects.active_amulets;
        run.player_effects = self.effects.player_effects;
        run.buffs.shadow_blade = self.effects.shadow_blade;
        run.buffs.magic_shield = self.effects.magic_shield;
        run.buffs.bone_wall = self.effects.bone_wall;
        run.buffs.mirror_shield = self.effects.mirror_shield;
        run.buffs.block_next_attack = self.effects.block_next_attack;
        run.damage_stats = self.damage_tracking;

        let board = BoardState::from_slots(
            self.board
                .cards
                .into_iter()
                .map(|slot| slot.map(|c| (c.position, c.data, c.revealed)))
                .collect(),
        );

        // The phase is derived, not stored: a room with work left is
        // active, anything else sits cleared awaiting the next floor.
        let phase = match self.room.kind {
            RoomKind::Treasure if board.unopened_chest_count() > 0 => RoomPhase::Active,
            RoomKind::Treasure => RoomPhase::Cleared,
            _ if board.enemy_indices().is_empty() => RoomPhase::Cleared,
            _ => RoomPhase::Active,
        };
        let room = RoomState {
            kind: self.room.kind,
            phase,
            initialized: self.room.initialized,
            active_id: self.room.active_id,
        };

        Ok(CombatSession::restore(run, board, room))
    }
}
