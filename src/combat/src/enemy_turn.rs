// src/combat/src/enemy_turn.rs
//! Enemy-turn resolution. Runs synchronously to completion once
//! triggered: defensive buffs in strict priority order, then every
//! revealed enemy in board order, then buff and status ticking with its
//! own death check (poison can kill after the enemies already acted).

use catalog::{CardPayload, EnemyAbility};

use crate::defense::DamageSource;
use crate::events::SessionEvent;
use crate::session::CombatSession;

impl CombatSession {
    pub(crate) fn enemy_turn(&mut self) {
        // One-shot grace: fresh floor or boss stun.
        if self.grace {
            self.grace = false;
            self.emit(SessionEvent::text("The enemies hesitate"));
            return;
        }
        if self.run.is_dead() {
            return;
        }

        // Defensive buffs consume in strict priority order, each fully
        // absorbing the turn's attacks when it fires.
        if self.run.buffs.block_next_attack {
            self.run.buffs.block_next_attack = false;
            self.emit(SessionEvent::text("Blocked!"));
            self.emit(SessionEvent::sound("block"));
            self.end_of_turn();
            return;
        }
        if self.run.buffs.bone_wall > 0 {
            if let Some((attacker, damage)) = self.first_eligible_attacker() {
                self.run.buffs.bone_wall -= 1;
                self.emit(SessionEvent::text_at(attacker, "Bone wall reflects"));
                self.damage_enemy_direct(attacker, damage);
                self.end_of_turn();
                return;
            }
        }
        if self.run.buffs.mirror_shield {
            if let Some((attacker, damage)) = self.first_eligible_attacker() {
                self.run.buffs.mirror_shield = false;
                self.emit(SessionEvent::text_at(attacker, "Mirrored"));
                self.damage_enemy_direct(attacker, damage);
                self.end_of_turn();
                return;
            }
        }

        for index in 0..self.board.len() {
            if self.run.is_dead() {
                break;
            }
            let Some(action) = self.enemy_action(index) else {
                continue;
            };

            match action {
                EnemyAction::Thaw { now_free } => {
                    if now_free {
                        self.emit(SessionEvent::text_at(index, "Unfrozen"));
                    }
                }
                EnemyAction::Strike {
                    mut damage,
                    abilities,
                } => {
                    self.process_summons(index, &abilities);

                    for ability in &abilities {
                        if let EnemyAbility::ArmorBreak { bonus } = ability {
                            if self.run.equipped_armor.is_some() {
                                damage += bonus;
                            }
                        }
                    }
                    self.emit(SessionEvent::PlayAnimation {
                        index,
                        name: "enemy_attack".into(),
                    });
                    let applied = self.take_damage(damage, Some(index), DamageSource::Enemy);

                    for ability in &abilities {
                        match *ability {
                            EnemyAbility::Poison { damage, turns } if applied > 0 => {
                                self.run.add_poison(damage, turns);
                                self.emit(SessionEvent::text("Poisoned!"));
                            }
                            EnemyAbility::CoinSteal { chance, amount } => {
                                if self.run.rng.random_bool(chance as f64) {
                                    let taken = self.run.lose_coins(amount);
                                    if taken > 0 {
                                        self.emit(SessionEvent::text(format!("-{taken} gold")));
                                        self.emit(SessionEvent::sound("coins"));
                                    }
                                }
                            }
                            EnemyAbility::Lifesteal { percent } if applied > 0 => {
                                let steal = applied * percent / 100;
                                if let Some(enemy) = self
                                    .board
                                    .card_mut(index)
                                    .and_then(|c| c.payload.as_enemy_mut())
                                {
                                    enemy.health = (enemy.health + steal).min(enemy.max_health);
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
        }

        self.end_of_turn();
    }

    /// Frozen bookkeeping plus the enemy's intent for this turn. Frozen
    /// enemies tick down and skip entirely; the zero-crossing is reported
    /// so the host can announce the thaw.
    fn enemy_action(&mut self, index: usize) -> Option<EnemyAction> {
        let card = self.board.card_mut(index)?;
        if !card.revealed {
            return None;
        }
        let enemy = card.payload.as_enemy_mut()?;
        if !enemy.is_alive() {
            return None;
        }
        if enemy.frozen > 0 {
            enemy.frozen -= 1;
            return Some(EnemyAction::Thaw {
                now_free: enemy.frozen == 0,
            });
        }
        Some(EnemyAction::Strike {
            damage: enemy.effective_attack(),
            abilities: enemy.abilities.clone(),
        })
    }

    /// Summon rolls: each summoner has a chance to raise an ally into a
    /// cleared slot, which re-derives its role from the slot's row.
    fn process_summons(&mut self, summoner: usize, abilities: &[EnemyAbility]) {
        for ability in abilities {
            let EnemyAbility::Summon { chance } = ability else {
                continue;
            };
            if !self.run.rng.random_bool(*chance as f64) {
                continue;
            }
            let empties = self.board.empty_slot_indices();
            let Some(&slot) = self.run.rng.choose(&empties) else {
                continue;
            };
            let ally = catalog::enemy::create_enemy(
                self.run.current_floor,
                false,
                &mut self.run.rng,
            );
            let placed =
                self.board
                    .place_summon(slot, CardPayload::Enemy(ally), &self.layout);
            if placed {
                self.emit(SessionEvent::text_at(summoner, "Summons an ally"));
                self.emit(SessionEvent::PlayAnimation {
                    index: slot,
                    name: "summon".into(),
                });
            }
        }
    }

    /// First revealed, living, unfrozen enemy in board order, with the
    /// damage it would deal. Used by the reflecting defenses.
    fn first_eligible_attacker(&self) -> Option<(usize, u32)> {
        self.board.iter_cards().find_map(|(i, c)| {
            if !c.revealed {
                return None;
            }
            let enemy = c.payload.as_enemy()?;
            if !enemy.is_alive() || enemy.frozen > 0 {
                return None;
            }
            Some((i, enemy.effective_attack()))
        })
    }

    /// Shared tail of every enemy turn: timed buffs tick, stacked poison
    /// lands as one combined hit, and the death check runs again
    /// independently of the attack loop's.
    fn end_of_turn(&mut self) {
        let expired = self.run.buffs.tick_turn();
        if expired.shadow_blade {
            self.emit(SessionEvent::text("Shadow blade fades"));
        }
        if expired.magic_shield {
            self.emit(SessionEvent::text("Magic shield fades"));
        }
        let poison = self.run.tick_effects();
        self.apply_status_damage(poison);
    }
}

enum EnemyAction {
    /// Frozen this tick: no attack, whether or not the thaw completed.
    Thaw { now_free: bool },
    Strike {
        damage: u32,
        abilities: Vec<EnemyAbility>,
    },
}
