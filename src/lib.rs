// src/lib.rs
//! Card-board dungeon roguelite engine.
//!
//! The workspace members carry the actual systems; this crate re-exports
//! them and owns the small amount of glue that crosses them: starting a
//! run with relic passives applied, resuming one from a snapshot, and
//! feeding a finished run into meta-progression.

pub use amulets;
pub use board;
pub use catalog;
pub use combat;
pub use error;
pub use meta;
pub use runstate;
pub use save;

use combat::CombatSession;
use error::GameError;
use meta::{MetaState, RelicKind, RelicPassive};
use runstate::RunState;
use save::RunSnapshot;

/// Apply unlocked relic passives. Recomputed bonuses (max health, action
/// pool) apply on every call; starting-state grants (coins, keys) only
/// when a run begins, never when one resumes.
pub fn apply_relic_passives(run: &mut RunState, meta: &MetaState, new_run: bool) {
    for passive in meta.passives() {
        match passive {
            RelicPassive::BonusMaxHealth(bonus) => run.relic_bonus_max_health += bonus,
            RelicPassive::BonusActions(bonus) => run.relic_bonus_actions += bonus,
            RelicPassive::StartingCoins(coins) if new_run => run.coins += coins,
            RelicPassive::StartingKeys(keys) if new_run => run.keys += keys,
            _ => {}
        }
    }
    run.recompute_max_health();
    run.recompute_max_actions();
    if new_run {
        run.health = run.max_health;
        run.refill_actions();
    }
}

/// Begin a fresh run on floor one with every unlocked relic in effect.
pub fn new_run(seed: u64, meta: &mut MetaState) -> CombatSession {
    meta.record_run_start();
    let mut run = RunState::new(seed);
    apply_relic_passives(&mut run, meta, true);
    CombatSession::start(run)
}

/// Resume a saved run. Relic passives are re-applied on top of the
/// restored state; they are not part of the snapshot.
pub fn resume_run(
    snapshot: RunSnapshot,
    meta: &MetaState,
    now: u64,
) -> Result<CombatSession, GameError> {
    let mut session = snapshot.restore(now)?;
    apply_relic_passives(&mut session.run, meta, false);
    Ok(session)
}

/// Feed a finished (dead) run into meta-progression. Returns the relic
/// this death unlocked, if any. A session that is still alive records
/// nothing.
pub fn finish_run(session: &CombatSession, meta: &mut MetaState) -> Option<RelicKind> {
    let report = session.death.as_ref()?;
    meta.record_death(
        &report.killed_by,
        report.floor,
        session.run.damage_stats.enemies_killed,
    )
}
