// src/combat/src/defense.rs
//! Player damage-taking pipeline: amulet dodge → damage-taken fold →
//! armor (own dodge, magic-shield-boosted protection, reflection,
//! durability) → lethal prevention → clamped application and the death
//! flow.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::events::SessionEvent;
use crate::session::{CombatSession, DeathReport};

/// Where a hit on the player came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DamageSource {
    Enemy,
    Trap,
    Exhaustion,
    Environmental,
}

impl DamageSource {
    pub fn label(&self) -> &'static str {
        match self {
            DamageSource::Enemy => "enemy",
            DamageSource::Trap => "trap",
            DamageSource::Exhaustion => "exhaustion",
            DamageSource::Environmental => "environmental",
        }
    }
}

impl CombatSession {
    /// Run a hit against the player. Returns the damage that actually
    /// landed after dodges, folds, armor and lethal prevention.
    ///
    /// Exhaustion is self-inflicted and bypasses armor entirely.
    pub fn take_damage(
        &mut self,
        amount: u32,
        attacker: Option<usize>,
        source: DamageSource,
    ) -> u32 {
        // First lethal hit wins; later damage in the same turn is inert.
        if self.run.is_dead() {
            return 0;
        }

        if self.run.amulets.check_dodge(&mut self.run.rng) {
            self.emit(SessionEvent::text("Dodged!"));
            self.emit(SessionEvent::sound("whiff"));
            return 0;
        }

        let amount = self.run.amulets.modify_damage_taken(amount);

        let mut mitigated = amount;
        let mut reflection: Option<(usize, u32)> = None;
        let mut armor_dodged = false;
        let mut armor_broke = false;
        if source != DamageSource::Exhaustion {
            let shield = self.run.buffs.magic_shield_multiplier();
            if let Some(armor) = self.run.equipped_armor.as_mut() {
                let dodge = armor.dodge_chance.unwrap_or(0.0);
                if dodge > 0.0 && self.run.rng.random_bool(dodge as f64) {
                    armor_dodged = true;
                    mitigated = 0;
                } else {
                    let protection = (armor.protection as f32 * shield).floor() as u32;
                    mitigated = mitigated.saturating_sub(protection);
                    if let (Some(percent), Some(attacker)) = (armor.reflection, attacker) {
                        reflection = Some((attacker, amount * percent / 100));
                    }
                }
                // Armor wears on every hit that reaches it, dodged or not.
                armor.durability = armor.durability.saturating_sub(1);
                armor_broke = armor.durability == 0;
            }
            if armor_broke {
                self.run.equipped_armor = None;
                self.emit(SessionEvent::text("Armor shattered!"));
                self.emit(SessionEvent::sound("armor_break"));
            }
            if armor_dodged {
                self.emit(SessionEvent::text("Deflected"));
            }
        }

        if let Some((attacker_index, raw)) = reflection {
            // Reflection cannot finish a boss off; it stops at 1 health.
            let capped = match self
                .board
                .card(attacker_index)
                .filter(|c| c.payload.is_boss())
                .and_then(|c| c.payload.as_enemy())
            {
                Some(boss) => raw.min(boss.health.saturating_sub(1)),
                None => raw,
            };
            if capped > 0 {
                self.emit(SessionEvent::text_at(attacker_index, "Reflected"));
                self.damage_enemy_direct(attacker_index, capped);
            }
        }

        if mitigated >= self.run.health && mitigated > 0 {
            if let Some(kind) = self.run.amulets.check_lethal_prevention() {
                self.emit(SessionEvent::text(format!(
                    "{} burns away to save you",
                    kind.def().name
                )));
                self.emit(SessionEvent::sound("lethal_prevented"));
                return 0;
            }
        }

        let applied = mitigated.min(self.run.health);
        if applied > 0 {
            self.run.health -= applied;
            self.run.damage_stats.record_taken(source.label(), applied);
            self.emit(SessionEvent::text(format!("-{applied} health")));
            self.emit(SessionEvent::sound("player_hit"));
        }

        if self.run.health == 0 {
            let killed_by = attacker
                .and_then(|i| self.board.card(i))
                .and_then(|c| c.payload.as_enemy())
                .map(|e| e.name.clone())
                .unwrap_or_else(|| source.label().to_string());
            self.trigger_death(killed_by, source);
        }
        applied
    }

    /// End-of-turn status damage (poison). One combined hit that skips
    /// dodge, armor and the amulet fold; it can still be the killing blow.
    pub(crate) fn apply_status_damage(&mut self, total: u32) {
        if total == 0 || self.run.is_dead() {
            return;
        }
        let applied = total.min(self.run.health);
        self.run.health -= applied;
        self.run.damage_stats.record_taken("poison", applied);
        self.emit(SessionEvent::text(format!("-{applied} poison")));
        if self.run.health == 0 {
            self.trigger_death("poison".to_string(), DamageSource::Environmental);
        }
    }

    /// Terminal transition: the run is over. Not an error; the death
    /// report feeds meta-progression.
    pub(crate) fn trigger_death(&mut self, killed_by: String, source: DamageSource) {
        if self.death.is_some() {
            return;
        }
        self.run.alive = false;
        self.emit(SessionEvent::text(format!("Slain by {killed_by}")));
        self.emit(SessionEvent::sound("game_over"));
        self.death = Some(DeathReport {
            killed_by,
            source,
            floor: self.run.current_floor,
        });
    }
}
