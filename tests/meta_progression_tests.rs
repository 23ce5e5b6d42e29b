// tests/meta_progression_tests.rs
//! Death-driven relic unlocking layered over the combat session.

mod helpers;

use board::Position;
use card_dungeon::{finish_run, new_run};
use combat::DamageSource;
use helpers::*;
use meta::{MetaState, RelicKind};

#[test]
fn a_death_feeds_meta_and_unlocks_the_matching_relic() {
    let mut session = session_over(vec![(
        Position::new(1, 0),
        enemy("Cave Rat", 4, 3),
        true,
    )]);
    session.take_damage(999, Some(0), DamageSource::Enemy);
    assert!(session.run.is_dead());

    let mut meta = MetaState::new();
    let unlocked = finish_run(&session, &mut meta);
    assert_eq!(unlocked, Some(RelicKind::RatKingCrown));
    assert_eq!(meta.total_deaths, 1);
    assert_eq!(meta.enemy_kill_stats["Cave Rat"], 1);
    assert_eq!(meta.best_floor, session.run.current_floor);
}

#[test]
fn a_live_session_records_nothing() {
    let session = session_over(vec![(
        Position::new(1, 0),
        enemy("Cave Rat", 4, 1),
        true,
    )]);
    let mut meta = MetaState::new();
    assert_eq!(finish_run(&session, &mut meta), None);
    assert_eq!(meta.total_deaths, 0);
}

#[test]
fn repeat_deaths_to_the_same_killer_unlock_nothing_new() {
    let mut meta = MetaState::new();
    for _ in 0..2 {
        let mut session = session_over(vec![(
            Position::new(1, 0),
            enemy("Cave Rat", 4, 3),
            true,
        )]);
        session.take_damage(999, Some(0), DamageSource::Enemy);
        finish_run(&session, &mut meta);
    }
    assert_eq!(meta.total_deaths, 2);
    assert_eq!(meta.unlocked_relics.len(), 1, "unlocks stay idempotent");
}

#[test]
fn trap_deaths_fall_back_to_milestone_unlocks() {
    let mut meta = MetaState::new();
    meta.total_deaths = 4;

    let mut session = session_over(vec![(
        Position::new(1, 0),
        enemy("Guard", 10, 0),
        true,
    )]);
    session.take_damage(999, None, DamageSource::Trap);
    assert!(session.run.is_dead());
    assert_eq!(session.death.as_ref().unwrap().killed_by, "trap");

    // Fifth death: the milestone relic fires since no killer matches.
    let unlocked = finish_run(&session, &mut meta);
    assert_eq!(unlocked, Some(RelicKind::StubbornSoul));
}

#[test]
fn unlocked_relics_shape_the_next_run_only_at_start() {
    let mut meta = MetaState::new();
    meta.unlock(RelicKind::RatKingCrown);
    meta.unlock(RelicKind::GolemHeart);

    let session = new_run(11, &mut meta);
    assert_eq!(session.run.coins, 10);
    assert_eq!(
        session.run.max_health,
        runstate::BASE_MAX_HEALTH + 4
    );
    assert_eq!(session.run.health, session.run.max_health);
    assert_eq!(meta.total_runs, 1);
}

#[test]
fn kill_counts_flow_from_the_run_into_meta() {
    let mut session = session_over(vec![(
        Position::new(1, 0),
        enemy("Skeleton", 1, 50),
        true,
    )]);
    let slot = arm(&mut session, sword(catalog::Rarity::Common));
    session.attack(Some(slot), 0).unwrap();
    assert_eq!(session.run.damage_stats.enemies_killed, 1);

    // The run then ends elsewhere.
    session.take_damage(999, None, DamageSource::Environmental);
    let mut meta = MetaState::new();
    finish_run(&session, &mut meta);
    assert_eq!(meta.total_enemies_killed, 1);
}
