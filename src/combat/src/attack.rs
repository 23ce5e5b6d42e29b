// src/combat/src/attack.rs
//! Player → enemy attack pipeline.
//!
//! Order of operations, fixed by design: gate validation (rejections
//! mutate nothing) → evade roll (a miss costs no durability) → durability
//! charge, once per action → per-hit resolution (twice for dual wield,
//! each hit evaluated independently) → death handling, kill rewards,
//! reveal propagation and the floor-clear check.

use amulets::AmuletKind;
use catalog::{WeaponPayload, WeaponSpecial};
use runstate::ItemPayload;

use crate::events::SessionEvent;
use crate::session::CombatSession;
use crate::CombatError;

/// Ranged weapons ignore the melee gate at this fraction of their damage,
/// floored.
pub const RANGED_MULTIPLIER: f32 = 0.8;

/// Unarmed swings land for this much.
const FIST_DAMAGE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    /// The target evaded; nothing changed, not even durability.
    Missed,
    Hit { damage_dealt: u32, killed: bool },
    /// The target fled the board (Mimic); no rewards were paid.
    Escaped,
}

impl CombatSession {
    /// Attack a revealed enemy with the weapon in `weapon_slot`, or bare
    /// fists when `None`. One action.
    pub fn attack(
        &mut self,
        weapon_slot: Option<usize>,
        target: usize,
    ) -> Result<AttackOutcome, CombatError> {
        self.ensure_actionable()?;

        let Some(card) = self.board.card(target) else {
            return Err(CombatError::InvalidTarget);
        };
        if !card.revealed {
            return Err(CombatError::TargetHidden);
        }
        let Some(enemy) = card.payload.as_enemy() else {
            return Err(CombatError::InvalidTarget);
        };
        if !enemy.is_alive() {
            return Err(CombatError::InvalidTarget);
        }
        let evade_chance = enemy.ability_evade_chance();
        let escape_threshold = enemy.escape_threshold();
        let target_neighbors = card.neighbors.clone();

        let ranged = match weapon_slot {
            Some(slot) => match self.run.inventory.get(slot) {
                Some(ItemPayload::Weapon(w)) => w.is_ranged(),
                _ => return Err(CombatError::InvalidTarget),
            },
            None => false,
        };
        // The gate: melee may not reach the back line while any melee
        // enemy survives, hidden ones included.
        if !ranged && self.board.melee_gate_blocks(target) {
            return Err(CombatError::MeleeGateBlocked);
        }

        // Validation done; first mutation.
        self.run.spend_action()?;
        let mut weapon: Option<WeaponPayload> = match weapon_slot {
            Some(slot) => match self.run.inventory.take(slot)? {
                ItemPayload::Weapon(w) => Some(w),
                // Re-checked above; cannot happen within one action.
                other => {
                    let _ = self.run.inventory.put_back(slot, other);
                    return Err(CombatError::InvalidTarget);
                }
            },
            None => None,
        };

        // Evade beats everything else: no damage, no durability loss.
        if let Some(chance) = evade_chance {
            if self.run.rng.random_bool(chance as f64) {
                self.emit(SessionEvent::text_at(target, "Miss!"));
                self.emit(SessionEvent::sound("whiff"));
                if let (Some(slot), Some(w)) = (weapon_slot, weapon.take()) {
                    let _ = self.run.inventory.put_back(slot, ItemPayload::Weapon(w));
                }
                self.finish_action();
                return Ok(AttackOutcome::Missed);
            }
        }

        // Durability is charged once per attack action, after the evade
        // roll; whetstone-class amulets can skip the tick entirely.
        if let Some(w) = weapon.as_mut() {
            let rate = self.run.amulets.durability_rate().clamp(0.0, 1.0);
            if self.run.rng.random_bool(rate as f64) {
                w.durability = w.durability.saturating_sub(1);
            }
        }

        let swing = self.swing_damage(weapon.as_ref());
        let hits = match weapon.as_ref().and_then(|w| w.special) {
            Some(WeaponSpecial::DualWield) => 2,
            _ => 1,
        };

        let mut dealt = 0;
        let mut killed = false;
        let mut escaped = false;
        for _ in 0..hits {
            match self.resolve_hit(target, swing, escape_threshold) {
                HitResult::Damaged(amount) => dealt += amount,
                HitResult::Fed => {}
                HitResult::Killed(amount) => {
                    dealt += amount;
                    killed = true;
                    break;
                }
                HitResult::Escaped => {
                    escaped = true;
                    break;
                }
                HitResult::Gone => break,
            }
        }

        match weapon.as_ref().and_then(|w| w.special) {
            Some(WeaponSpecial::Block) => {
                self.run.buffs.block_next_attack = true;
                self.emit(SessionEvent::text("Braced behind the spear"));
            }
            Some(WeaponSpecial::SpecialAttack) => {
                self.cleave(&target_neighbors, target, swing / 2);
            }
            _ => {}
        }

        // A weapon at zero durability is destroyed, not returned.
        if let (Some(slot), Some(w)) = (weapon_slot, weapon.take()) {
            if w.is_broken() {
                self.emit(SessionEvent::text(format!("{w} shatters")));
                self.emit(SessionEvent::sound("weapon_break"));
            } else {
                let _ = self.run.inventory.put_back(slot, ItemPayload::Weapon(w));
            }
        }

        self.finish_action();
        if escaped {
            Ok(AttackOutcome::Escaped)
        } else {
            Ok(AttackOutcome::Hit {
                damage_dealt: dealt,
                killed,
            })
        }
    }

    /// Damage of one swing after the ranged penalty, the amulet fold and
    /// the shadow-blade multiplier. Reflection-mode damage never comes
    /// through here.
    fn swing_damage(&self, weapon: Option<&WeaponPayload>) -> u32 {
        let mut damage = weapon.map_or(FIST_DAMAGE, |w| w.damage);
        if weapon.is_some_and(|w| w.is_ranged()) {
            damage = (damage as f32 * RANGED_MULTIPLIER).floor() as u32;
        }
        damage = self.run.amulets.modify_weapon_damage(damage);
        let blade = self.run.buffs.shadow_blade_multiplier();
        if blade != 1.0 {
            damage = (damage as f32 * blade).floor() as u32;
        }
        damage
    }

    fn resolve_hit(
        &mut self,
        target: usize,
        damage: u32,
        escape_threshold: Option<u32>,
    ) -> HitResult {
        let hungry = self.run.amulets.has(AmuletKind::HungryDagger);

        let (result, hit_counter) = {
            let Some(enemy) = self
                .board
                .card_mut(target)
                .and_then(|c| c.payload.as_enemy_mut())
            else {
                return HitResult::Gone;
            };
            if !enemy.is_alive() {
                return HitResult::Gone;
            }
            enemy.hit_counter += 1;

            let after = enemy.health as i64 - damage as i64;
            let result = if hungry && after == 1 {
                // The dagger devours the last sliver of life.
                let drained = enemy.health;
                enemy.health = 0;
                HitResult::Killed(drained)
            } else if hungry && after > 1 {
                // Non-lethal hits feed the enemy instead. Intentional
                // risk/reward of the cursed dagger, not a bug.
                enemy.health = (enemy.health + 1).min(enemy.max_health);
                HitResult::Fed
            } else if after <= 0 {
                let drained = enemy.health;
                enemy.health = 0;
                HitResult::Killed(drained)
            } else {
                enemy.health -= damage;
                HitResult::Damaged(damage)
            };
            (result, enemy.hit_counter)
        };

        match result {
            HitResult::Killed(amount) => {
                self.run.damage_stats.record_dealt(amount);
                self.emit(SessionEvent::text_at(target, format!("-{amount}")));
                self.emit(SessionEvent::sound("enemy_death"));
                self.on_enemy_removed(target, true);
                HitResult::Killed(amount)
            }
            HitResult::Damaged(amount) => {
                self.run.damage_stats.record_dealt(amount);
                self.emit(SessionEvent::text_at(target, format!("-{amount}")));
                self.emit(SessionEvent::sound("hit"));
                if escape_threshold.is_some_and(|t| hit_counter >= t) {
                    self.emit(SessionEvent::text_at(target, "It slips away!"));
                    self.on_enemy_removed(target, false);
                    return HitResult::Escaped;
                }
                HitResult::Damaged(amount)
            }
            HitResult::Fed => {
                self.emit(SessionEvent::text_at(target, "+1"));
                if escape_threshold.is_some_and(|t| hit_counter >= t) {
                    self.emit(SessionEvent::text_at(target, "It slips away!"));
                    self.on_enemy_removed(target, false);
                    return HitResult::Escaped;
                }
                HitResult::Fed
            }
            other => other,
        }
    }

    /// Axe cleave: half damage to every revealed, living enemy adjacent
    /// to the main target. Plain damage, no per-hit modifiers.
    fn cleave(&mut self, neighbors: &[usize], origin: usize, damage: u32) {
        if damage == 0 {
            return;
        }
        let targets: Vec<usize> = neighbors
            .iter()
            .copied()
            .filter(|&i| {
                i != origin
                    && self.board.card(i).is_some_and(|c| {
                        c.revealed && c.payload.as_enemy().is_some_and(|e| e.is_alive())
                    })
            })
            .collect();
        for index in targets {
            self.emit(SessionEvent::PlayAnimation {
                index,
                name: "cleave".into(),
            });
            self.damage_enemy_direct(index, damage);
        }
    }

    /// Direct damage to an enemy slot: reflections, fireballs and cleaves.
    /// Skips the gate, the amulet fold, evade and durability; handles
    /// death normally. Returns the damage applied.
    pub(crate) fn damage_enemy_direct(&mut self, index: usize, amount: u32) -> u32 {
        let applied = {
            let Some(enemy) = self
                .board
                .card_mut(index)
                .and_then(|c| c.payload.as_enemy_mut())
            else {
                return 0;
            };
            if !enemy.is_alive() {
                return 0;
            }
            let applied = amount.min(enemy.health);
            enemy.health -= applied;
            applied
        };
        if applied > 0 {
            self.run.damage_stats.record_dealt(applied);
            self.emit(SessionEvent::text_at(index, format!("-{applied}")));
        }
        let dead = self
            .board
            .card(index)
            .and_then(|c| c.payload.as_enemy())
            .is_some_and(|e| !e.is_alive());
        if dead {
            self.emit(SessionEvent::sound("enemy_death"));
            self.on_enemy_removed(index, true);
        }
        applied
    }
}

/// Outcome of a single swing inside one attack action.
enum HitResult {
    Damaged(u32),
    Killed(u32),
    /// Hungry-dagger inversion: the enemy healed instead.
    Fed,
    Escaped,
    /// The slot emptied mid-action.
    Gone,
}
