// src/runstate/src/effects.rs
use serde::{Deserialize, Serialize};
use strum::Display;

/// Over-time effects on the player. Poison is the only kind today; the
/// list form keeps stacked instances separate so each expires on its own
/// clock.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatusKind {
    Poison,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub damage: u32,
    pub turns: u32,
}

/// A buff that lasts a fixed number of enemy turns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedBuff {
    pub turns: u32,
    pub multiplier: f32,
}

/// Transient combat buffs granted by magic cards and weapon specials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatBuffs {
    /// Weapon damage multiplier.
    pub shadow_blade: Option<TimedBuff>,
    /// Armor protection multiplier.
    pub magic_shield: Option<TimedBuff>,
    /// Charges that each reflect one enemy attack.
    pub bone_wall: u32,
    /// One-shot full reflection of the next enemy turn.
    pub mirror_shield: bool,
    /// Spear block: absorbs the whole next enemy turn.
    pub block_next_attack: bool,
}

/// Which timed buffs expired during a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpiredBuffs {
    pub shadow_blade: bool,
    pub magic_shield: bool,
}

impl CombatBuffs {
    /// Tick the timed buffs at the end of an enemy turn.
    pub fn tick_turn(&mut self) -> ExpiredBuffs {
        let mut expired = ExpiredBuffs::default();
        if let Some(buff) = self.shadow_blade.as_mut() {
            buff.turns = buff.turns.saturating_sub(1);
            if buff.turns == 0 {
                self.shadow_blade = None;
                expired.shadow_blade = true;
            }
        }
        if let Some(buff) = self.magic_shield.as_mut() {
            buff.turns = buff.turns.saturating_sub(1);
            if buff.turns == 0 {
                self.magic_shield = None;
                expired.magic_shield = true;
            }
        }
        expired
    }

    pub fn shadow_blade_multiplier(&self) -> f32 {
        self.shadow_blade.map_or(1.0, |b| b.multiplier)
    }

    pub fn magic_shield_multiplier(&self) -> f32 {
        self.magic_shield.map_or(1.0, |b| b.multiplier)
    }
}
