// src/save/src/lib.rs
//! Run state & persistence contract: the versioned, migratable JSON
//! snapshot of a run, the separate meta-progression namespace, the
//! atomic file store and the portable export/import token.
//!
//! The combat, board and amulet engines treat this crate as an opaque
//! load/store boundary; relic passives are re-applied by the caller after
//! a load, never serialized.

pub mod export;
pub mod snapshot;
pub mod store;

pub use export::{export_token, import_token, ExportBundle, Settings};
pub use snapshot::{
    BoardSection, CardSlot, EffectsSection, EquipmentSection, PlayerSection, RoomSection,
    RunSnapshot, RETENTION_SECS, SAVE_VERSION,
};
pub use store::SaveStore;

#[cfg(test)]
mod tests {
    use super::*;
    use board::{BoardState, Position};
    use catalog::enemy::{EnemyPayload, Role};
    use catalog::{CardPayload, Rarity, WeaponKind, WeaponPayload};
    use combat::{CombatSession, RoomKind, RoomPhase, RoomState};
    use runstate::{ItemPayload, RunState};

    const NOW: u64 = 1_700_000_000;

    fn sample_session() -> CombatSession {
        let mut run = RunState::new(99);
        run.coins = 31;
        run.crystals = 2;
        run.keys = 1;
        run.current_floor = 3;
        run.health = 14;
        run.inventory
            .add(ItemPayload::Weapon(WeaponPayload::new(
                WeaponKind::Spear,
                Rarity::Uncommon,
            )))
            .unwrap();
        run.add_poison(2, 3);
        run.buffs.bone_wall = 1;

        let board = BoardState::from_parts(vec![
            (
                Position::new(1, 0),
                CardPayload::Enemy(EnemyPayload {
                    name: "Skeleton".to_string(),
                    health: 6,
                    max_health: 6,
                    attack: 2,
                    role: Role::Melee,
                    abilities: Vec::new(),
                    frozen: 0,
                    hit_counter: 0,
                    elite: false,
                }),
                true,
            ),
            (Position::new(0, 0), CardPayload::Coin { amount: 5 }, false),
        ]);
        let room = RoomState {
            kind: RoomKind::Combat,
            phase: RoomPhase::Active,
            initialized: true,
            active_id: 3,
        };
        CombatSession::restore(run, board, room)
    }

    #[test]
    fn capture_restore_roundtrip_reproduces_the_run() {
        let session = sample_session();
        let snapshot = RunSnapshot::capture(&session, NOW);
        let restored = snapshot.restore(NOW).unwrap();

        assert_eq!(restored.run.coins, 31);
        assert_eq!(restored.run.crystals, 2);
        assert_eq!(restored.run.keys, 1);
        assert_eq!(restored.run.health, 14);
        assert_eq!(restored.run.current_floor, 3);
        assert_eq!(restored.run.player_effects, session.run.player_effects);
        assert_eq!(restored.run.buffs.bone_wall, 1);
        assert_eq!(restored.run.rng.seed(), 99);
        assert!(matches!(
            restored.run.inventory.get(0),
            Some(ItemPayload::Weapon(w)) if w.kind == WeaponKind::Spear
        ));

        // Board round trip: same slots, same reveal state, adjacency
        // rebuilt.
        assert_eq!(restored.board.len(), 2);
        assert!(restored.board.card(0).unwrap().revealed);
        assert!(!restored.board.card(1).unwrap().revealed);
        assert_eq!(restored.board.card(0).unwrap().neighbors, vec![1]);
        assert_eq!(restored.room.kind, RoomKind::Combat);
        assert_eq!(restored.room.phase, RoomPhase::Active);
    }

    #[test]
    fn removed_slots_survive_as_holes() {
        let mut session = sample_session();
        session.board.remove(1);
        let snapshot = RunSnapshot::capture(&session, NOW);
        let restored = snapshot.restore(NOW).unwrap();
        assert_eq!(restored.board.len(), 2);
        assert!(restored.board.card(1).is_none());
        assert!(restored.board.card(0).is_some());
    }

    #[test]
    fn empty_json_object_restores_to_defaults() {
        let snapshot: RunSnapshot = serde_json::from_str("{}").unwrap();
        // Legacy versioning kicks in for an unversioned blob.
        assert_eq!(snapshot.save_version, "1.0.0");
        // saved_at defaults to 0, which is hopelessly stale; restore at
        // time zero instead to check the defaults themselves.
        let restored = snapshot.restore(0).unwrap();
        assert_eq!(restored.run.health, runstate::BASE_MAX_HEALTH);
        assert_eq!(restored.run.max_actions, runstate::BASE_MAX_ACTIONS);
        assert_eq!(restored.run.current_floor, 1);
        // Nothing on the board means the room reads as cleared.
        assert_eq!(restored.room.phase, RoomPhase::Cleared);
    }

    #[test]
    fn partial_player_section_fills_missing_fields() {
        let json = format!(
            r#"{{"player": {{"coins": 12, "current_floor": 4}}, "saved_at": {NOW}}}"#
        );
        let snapshot: RunSnapshot = serde_json::from_str(&json).unwrap();
        let restored = snapshot.restore(NOW).unwrap();
        assert_eq!(restored.run.coins, 12);
        assert_eq!(restored.run.current_floor, 4);
        assert_eq!(restored.run.health, runstate::BASE_MAX_HEALTH);
    }

    #[test]
    fn v1_snapshots_migrate_forward() {
        let json = format!(
            r#"{{"save_version": "1.0.0",
                 "player": {{"health": 9, "max_health": 0, "max_actions": 0,
                             "base_max_health": 0}},
                 "saved_at": {NOW}}}"#
        );
        let mut snapshot: RunSnapshot = serde_json::from_str(&json).unwrap();
        snapshot.migrate();
        assert_eq!(snapshot.save_version, SAVE_VERSION);
        assert_eq!(snapshot.player.max_actions, runstate::BASE_MAX_ACTIONS);
        assert_eq!(snapshot.player.max_health, runstate::BASE_MAX_HEALTH);
        assert_eq!(snapshot.player.base_max_health, runstate::BASE_MAX_HEALTH);
        assert_eq!(snapshot.player.health, 9);
    }

    #[test]
    fn stale_snapshot_refuses_to_restore() {
        let session = sample_session();
        let snapshot = RunSnapshot::capture(&session, NOW - RETENTION_SECS - 1);
        assert!(matches!(
            snapshot.restore(NOW),
            Err(error::GameError::StaleSave)
        ));
    }
}
