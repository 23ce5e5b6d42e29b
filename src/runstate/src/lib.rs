// src/runstate/src/lib.rs
//! The mutable per-run aggregate: player vitals, action points, wallet,
//! equipment, amulets, status effects and transient buffs. Everything a
//! snapshot has to capture lives here or on the board.

pub mod effects;
pub mod inventory;
pub mod rng;
pub mod stats;

pub use effects::{CombatBuffs, ExpiredBuffs, StatusEffect, StatusKind, TimedBuff};
pub use inventory::{Inventory, InventoryError, ItemPayload, BASE_SLOTS};
pub use rng::RunRng;
pub use stats::DamageStats;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use amulets::{ActiveAmulets, AddOutcome, AmuletError, AmuletKind, EquipEffect};
use catalog::{ArmorPayload, WeaponPayload};

pub const BASE_MAX_HEALTH: u32 = 20;
pub const BASE_MAX_ACTIONS: u32 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunError {
    #[error("no actions left this turn")]
    NoActionsLeft,
    #[error("not enough coins")]
    NotEnoughCoins,
    #[error("no key to spend")]
    NoKey,
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error(transparent)]
    Amulet(#[from] AmuletError),
}

/// Mutable state of one run. Owned by the combat session and persisted
/// through the save contract; never a global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub health: u32,
    pub max_health: u32,
    /// Max health before the amulet cap; vitality and relic bonuses land
    /// here and the cap multiplies on top.
    pub base_max_health: u32,
    pub actions_left: u32,
    pub max_actions: u32,
    pub first_action_used: bool,
    pub coins: u32,
    pub crystals: u32,
    pub keys: u32,
    pub current_floor: u32,
    pub equipped_armor: Option<ArmorPayload>,
    /// Held only while an attack action resolves.
    pub equipped_weapon: Option<WeaponPayload>,
    pub amulets: ActiveAmulets,
    pub player_effects: Vec<StatusEffect>,
    pub buffs: CombatBuffs,
    pub inventory: Inventory,
    pub bonus_inventory_slots: u32,
    pub bottomless_bag_applied: bool,
    pub damage_stats: DamageStats,
    pub alive: bool,
    pub rng: RunRng,
    /// Relic passives are re-applied on run start and on load; they are
    /// never part of the serialized snapshot.
    #[serde(skip)]
    pub relic_bonus_max_health: u32,
    #[serde(skip)]
    pub relic_bonus_actions: u32,
}

impl RunState {
    pub fn new(seed: u64) -> Self {
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
            equipped_armor: None,
            equipped_weapon: None,
            amulets: ActiveAmulets::new(),
            player_effects: Vec::new(),
            buffs: CombatBuffs::default(),
            inventory: Inventory::default(),
            bonus_inventory_slots: 0,
            bottomless_bag_applied: false,
            damage_stats: DamageStats::default(),
            alive: true,
            rng: RunRng::new(seed),
            relic_bonus_max_health: 0,
            relic_bonus_actions: 0,
        }
    }

    /* ---------- vitals ---------- */

    pub fn is_dead(&self) -> bool {
        !self.alive || self.health == 0
    }

    /// Heal, clamped to max health. Returns the amount actually gained.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }

    /// Raise base max health and re-derive the capped maximum.
    pub fn raise_base_max_health(&mut self, amount: u32) {
        self.base_max_health += amount;
        self.recompute_max_health();
    }

    /// Re-derive `max_health` from the base, relic bonuses and the amulet
    /// cap, clamping current health into the new bound. Never drops below
    /// 1.
    pub fn recompute_max_health(&mut self) {
        let cap = self.amulets.max_health_cap();
        let base = self.base_max_health + self.relic_bonus_max_health;
        self.max_health = ((base as f32 * cap).floor() as u32).max(1);
        self.health = self.health.min(self.max_health);
    }

    /// Re-derive the action pool size from the base and relic bonuses.
    pub fn recompute_max_actions(&mut self) {
        self.max_actions = BASE_MAX_ACTIONS + self.relic_bonus_actions;
    }

    /* ---------- action points ---------- */

    /// Spend one action point. The caller decides whether hitting zero
    /// triggers the enemy turn.
    pub fn spend_action(&mut self) -> Result<(), RunError> {
        if self.actions_left == 0 {
            return Err(RunError::NoActionsLeft);
        }
        self.actions_left -= 1;
        self.first_action_used = true;
        Ok(())
    }

    pub fn refill_actions(&mut self) {
        self.actions_left = self.max_actions;
    }

    /// Restore action points (food), folded through the amulet set and
    /// clamped at the max.
    pub fn restore_actions(&mut self, base: u32) -> u32 {
        let gained = self.amulets.modify_food_ap(base);
        let before = self.actions_left;
        self.actions_left = (self.actions_left + gained).min(self.max_actions);
        self.actions_left - before
    }

    /* ---------- wallet ---------- */

    /// Add found gold, folded through the amulet modifiers. Returns the
    /// credited amount.
    pub fn gain_gold(&mut self, base: u32) -> u32 {
        let amount = self.amulets.modify_gold_found(base);
        self.coins = self.coins.saturating_add(amount);
        amount
    }

    /// Lose coins (theft, snatcher traps). Returns the amount actually
    /// taken.
    pub fn lose_coins(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.coins);
        self.coins -= taken;
        taken
    }

    pub fn spend_coins(&mut self, amount: u32) -> Result<(), RunError> {
        if self.coins < amount {
            return Err(RunError::NotEnoughCoins);
        }
        self.coins -= amount;
        Ok(())
    }

    pub fn spend_key(&mut self) -> Result<(), RunError> {
        if self.keys == 0 {
            return Err(RunError::NoKey);
        }
        self.keys -= 1;
        Ok(())
    }

    /* ---------- amulets ---------- */

    /// Pick up an amulet: stack or add, then apply its one-time equip
    /// effects. Rejections leave the run untouched.
    pub fn equip_amulet(&mut self, kind: AmuletKind) -> Result<AddOutcome, RunError> {
        let outcome = self.amulets.add(kind)?;
        let level = self.amulets.level(kind);
        match kind.on_equip(level) {
            // `on_equip` reports the cumulative bonus for the stack, so a
            // level-up applies only the delta over the previous level.
            Some(EquipEffect::MaxHealth(total)) => {
                let prev = if level >= 2 {
                    match kind.on_equip(level - 1) {
                        Some(EquipEffect::MaxHealth(b)) => b,
                        _ => 0,
                    }
                } else {
                    0
                };
                self.raise_base_max_health(total - prev);
            }
            Some(EquipEffect::BonusSlots(extra)) => {
                if !self.bottomless_bag_applied {
                    self.bottomless_bag_applied = true;
                    self.bonus_inventory_slots += extra;
                    self.inventory.grow(extra as usize);
                }
            }
            None => {}
        }
        // Cursed caps apply the moment the amulet is equipped.
        self.recompute_max_health();
        Ok(outcome)
    }

    /* ---------- status effects ---------- */

    pub fn add_poison(&mut self, damage: u32, turns: u32) {
        self.player_effects.push(StatusEffect {
            kind: StatusKind::Poison,
            damage,
            turns,
        });
    }

    /// Tick all status effects one enemy turn: total poison damage is
    /// summed across stacked instances into one combined hit, and spent
    /// instances drop off.
    pub fn tick_effects(&mut self) -> u32 {
        let mut total = 0;
        for effect in &mut self.player_effects {
            if effect.turns > 0 {
                total += effect.damage;
                effect.turns -= 1;
            }
        }
        self.player_effects.retain(|e| e.turns > 0);
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heal_clamps_at_max() {
        let mut run = RunState::new(1);
        run.health = 18;
        assert_eq!(run.heal(10), 2);
        assert_eq!(run.health, run.max_health);
    }

    #[test]
    fn spend_action_rejects_at_zero_without_mutation() {
        let mut run = RunState::new(1);
        run.actions_left = 1;
        assert!(run.spend_action().is_ok());
        assert_eq!(run.spend_action(), Err(RunError::NoActionsLeft));
        assert_eq!(run.actions_left, 0);
    }

    #[test]
    fn vitality_raises_and_cursed_skull_caps_max_health() {
        let mut run = RunState::new(1);
        run.equip_amulet(AmuletKind::VitalityTalisman).unwrap();
        assert_eq!(run.max_health, BASE_MAX_HEALTH + 5);
        // Second stack adds its own +5, not +10.
        run.equip_amulet(AmuletKind::VitalityTalisman).unwrap();
        assert_eq!(run.max_health, BASE_MAX_HEALTH + 10);

        run.equip_amulet(AmuletKind::CursedSkull).unwrap();
        let expected = ((BASE_MAX_HEALTH + 10) as f32 * 0.8).floor() as u32;
        assert_eq!(run.max_health, expected);
        assert!(run.health <= run.max_health);
    }

    #[test]
    fn bottomless_bag_grows_inventory_once() {
        let mut run = RunState::new(1);
        run.equip_amulet(AmuletKind::BottomlessBag).unwrap();
        assert_eq!(run.inventory.capacity(), BASE_SLOTS + 2);
        assert_eq!(run.bonus_inventory_slots, 2);
        assert!(run.bottomless_bag_applied);
        // A duplicate pickup rejects and cannot double-grow.
        assert!(run.equip_amulet(AmuletKind::BottomlessBag).is_err());
        assert_eq!(run.inventory.capacity(), BASE_SLOTS + 2);
    }

    #[test]
    fn poison_instances_stack_and_expire_independently() {
        let mut run = RunState::new(1);
        run.add_poison(2, 1);
        run.add_poison(3, 2);
        assert_eq!(run.tick_effects(), 5);
        assert_eq!(run.player_effects.len(), 1);
        assert_eq!(run.tick_effects(), 3);
        assert!(run.player_effects.is_empty());
        assert_eq!(run.tick_effects(), 0);
    }

    #[test]
    fn gold_gain_folds_through_amulets() {
        let mut run = RunState::new(1);
        run.equip_amulet(AmuletKind::LuckyCoin).unwrap();
        assert_eq!(run.gain_gold(10), 15);
        assert_eq!(run.coins, 15);
    }
}
