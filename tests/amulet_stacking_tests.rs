// tests/amulet_stacking_tests.rs
//! Stacking, duplicate rejection and the aggregation queries.

mod helpers;

use amulets::{ActiveAmulets, AddOutcome, AmuletError, AmuletKind};
use board::Position;
use helpers::*;
use runstate::RunState;

#[test]
fn scenario_regeneration_stacks_to_its_cap_then_rejects() {
    let mut run = RunState::new(1);
    assert_eq!(
        run.equip_amulet(AmuletKind::Regeneration).unwrap(),
        AddOutcome::Added
    );
    assert_eq!(
        run.equip_amulet(AmuletKind::Regeneration).unwrap(),
        AddOutcome::Leveled(2)
    );
    // max_level = 2: the third copy is rejected outright.
    assert!(run.equip_amulet(AmuletKind::Regeneration).is_err());
    assert_eq!(run.amulets.level(AmuletKind::Regeneration), 2);
    assert_eq!(run.amulets.len(), 1);
}

#[test]
fn non_stackable_duplicates_never_enter_the_set() {
    let mut set = ActiveAmulets::new();
    set.add(AmuletKind::LuckyCoin).unwrap();
    assert_eq!(set.add(AmuletKind::LuckyCoin), Err(AmuletError::Duplicate));
    assert_eq!(set.len(), 1);
}

#[test]
fn duplicate_pickup_on_the_board_melts_into_gold() {
    let mut session = session_over(vec![
        (Position::new(1, 0), enemy("Guard", 50, 0), true),
        (
            Position::new(0, 0),
            catalog::CardPayload::Amulet {
                kind: AmuletKind::LuckyCoin,
            },
            true,
        ),
    ]);
    session.run.equip_amulet(AmuletKind::LuckyCoin).unwrap();
    let coins_before = session.run.coins;

    session.pick_up(1).unwrap();
    assert!(session.run.coins > coins_before, "refunded as gold");
    assert_eq!(session.run.amulets.len(), 1);
}

#[test]
fn floor_end_heal_scales_with_stack_level() {
    let mut session = session_over(vec![(
        Position::new(1, 0),
        enemy("Guard", 4, 0),
        true,
    )]);
    session.run.equip_amulet(AmuletKind::Regeneration).unwrap();
    session.run.equip_amulet(AmuletKind::Regeneration).unwrap();
    session.run.health = 10;

    let slot = arm(&mut session, sword(catalog::Rarity::Common));
    session.attack(Some(slot), 0).unwrap();
    assert_eq!(
        session.room.phase,
        combat::RoomPhase::Cleared,
        "lone enemy died"
    );
    session.advance_floor().unwrap();
    // Level 2 regeneration: +4 on the floor transition.
    assert_eq!(session.run.health, 14);
}

#[test]
fn gold_potion_and_food_folds_run_through_the_active_set() {
    let mut run = RunState::new(1);
    run.equip_amulet(AmuletKind::LuckyCoin).unwrap();
    run.equip_amulet(AmuletKind::CursedSkull).unwrap();
    // 10 -> x1.5 = 15 -> x2 = 30, folded left to right.
    assert_eq!(run.gain_gold(10), 30);

    assert_eq!(run.amulets.modify_potion_healing(10), 10);
    run.equip_amulet(AmuletKind::HealingCharm).unwrap();
    assert_eq!(run.amulets.modify_potion_healing(10), 15);

    run.equip_amulet(AmuletKind::GourmetRing).unwrap();
    assert_eq!(run.amulets.modify_food_ap(1), 2);
}

#[test]
fn cursed_skull_caps_max_health_at_eighty_percent() {
    let mut run = RunState::new(1);
    assert_eq!(run.max_health, runstate::BASE_MAX_HEALTH);
    run.equip_amulet(AmuletKind::CursedSkull).unwrap();
    let expected = (runstate::BASE_MAX_HEALTH as f32 * 0.8).floor() as u32;
    assert_eq!(run.max_health, expected);
    assert!(run.health <= run.max_health);
}
