// src/combat/src/lib.rs
//! Combat resolution engine. A [`CombatSession`] owns the board and the
//! run state for one floor at a time and resolves every player action and
//! enemy turn synchronously; the host only ever observes results through
//! the event queue and the deferred reveal consequences.

pub mod attack;
pub mod defense;
pub mod enemy_turn;
pub mod events;
pub mod session;


pub use attack::AttackOutcome;
pub use defense::DamageSource;
pub use events::SessionEvent;
pub use session::{CombatSession, DeathReport, RoomKind, RoomPhase, RoomState};

use thiserror::Error;

use runstate::{InventoryError, RunError};

/// Rejection reasons for player actions. Every rejection is atomic: the
/// session mutates nothing before validation passes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CombatError {
    #[error("the room is not active")]
    RoomNotActive,
    #[error("the run is over")]
    PlayerDead,
    #[error("no such target")]
    InvalidTarget,
    #[error("melee weapons cannot reach the back line yet")]
    MeleeGateBlocked,
    #[error("that card is still face down")]
    TargetHidden,
    #[error("a key is needed to open this chest")]
    ChestLocked,
    #[error(transparent)]
    Run(#[from] RunError),
}

impl From<InventoryError> for CombatError {
    fn from(err: InventoryError) -> Self {
        CombatError::Run(RunError::Inventory(err))
    }
}
