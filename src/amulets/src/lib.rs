// src/amulets/src/lib.rs
//! Amulet effect engine: static definitions plus the player's active set.
//!
//! Every "modify" query folds left-to-right over the active list in
//! acquisition order, so two multipliers compound instead of both applying
//! to the original base. Dodge and lethal prevention are queried, not
//! folded: dodge sums chances and rolls once, lethal prevention
//! short-circuits on the first capable amulet.

pub mod kind;

pub use kind::{AmuletDef, AmuletKind, EquipEffect, FloorEndEffect, KillEffect};

use bincode::{Decode, Encode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmuletError {
    #[error("amulet already owned")]
    Duplicate,
    #[error("amulet is at max level")]
    MaxLevel,
}

/// One owned amulet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct AmuletInstance {
    pub kind: AmuletKind,
    pub level: u32,
    pub uses_left: u32,
}

impl AmuletInstance {
    pub fn new(kind: AmuletKind) -> Self {
        Self {
            kind,
            level: 1,
            uses_left: kind.def().uses,
        }
    }
}

/// Outcome of an `add` that did not reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Leveled(u32),
}

/// The player's equipped amulets, in acquisition order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct ActiveAmulets {
    amulets: Vec<AmuletInstance>,
}

impl ActiveAmulets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AmuletInstance> {
        self.amulets.iter()
    }

    pub fn len(&self) -> usize {
        self.amulets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amulets.is_empty()
    }

    pub fn has(&self, kind: AmuletKind) -> bool {
        self.amulets.iter().any(|a| a.kind == kind)
    }

    pub fn level(&self, kind: AmuletKind) -> u32 {
        self.amulets
            .iter()
            .find(|a| a.kind == kind)
            .map_or(0, |a| a.level)
    }

    /// Add a pickup. Non-stackable duplicates and max-level stacks reject
    /// without mutating the set.
    pub fn add(&mut self, kind: AmuletKind) -> Result<AddOutcome, AmuletError> {
        let def = kind.def();
        if let Some(existing) = self.amulets.iter_mut().find(|a| a.kind == kind) {
            if !def.stackable {
                return Err(AmuletError::Duplicate);
            }
            if existing.level >= def.max_level {
                return Err(AmuletError::MaxLevel);
            }
            existing.level += 1;
            return Ok(AddOutcome::Leveled(existing.level));
        }
        self.amulets.push(AmuletInstance::new(kind));
        Ok(AddOutcome::Added)
    }

    /* ---------- folded modifier queries ---------- */

    pub fn modify_weapon_damage(&self, damage: u32) -> u32 {
        self.amulets
            .iter()
            .fold(damage, |d, a| a.kind.modify_weapon_damage(a.level, d))
    }

    pub fn modify_damage_taken(&self, damage: u32) -> u32 {
        self.amulets
            .iter()
            .fold(damage, |d, a| a.kind.modify_damage_taken(a.level, d))
    }

    pub fn modify_potion_healing(&self, healing: u32) -> u32 {
        self.amulets
            .iter()
            .fold(healing, |h, a| a.kind.modify_potion_healing(a.level, h))
    }

    pub fn modify_gold_found(&self, gold: u32) -> u32 {
        self.amulets
            .iter()
            .fold(gold, |g, a| a.kind.modify_gold_found(a.level, g))
    }

    pub fn modify_food_ap(&self, ap: u32) -> u32 {
        self.amulets
            .iter()
            .fold(ap, |v, a| a.kind.modify_food_ap(a.level, v))
    }

    /* ---------- queried (non-folded) checks ---------- */

    /// Sum of all dodge chances, clamped to [0, 1].
    pub fn total_dodge_chance(&self) -> f32 {
        self.amulets
            .iter()
            .map(|a| a.kind.dodge_chance(a.level))
            .sum::<f32>()
            .clamp(0.0, 1.0)
    }

    /// One roll against the summed dodge chance.
    pub fn check_dodge(&self, rng: &mut impl Rng) -> bool {
        let chance = self.total_dodge_chance();
        chance > 0.0 && rng.random_bool(chance as f64)
    }

    /// First amulet (in acquisition order) that can intercept a lethal hit
    /// wins and spends a use. Spent single-use amulets are removed.
    pub fn check_lethal_prevention(&mut self) -> Option<AmuletKind> {
        let idx = self
            .amulets
            .iter()
            .position(|a| a.kind.prevents_lethal() && a.uses_left > 0)?;
        let kind = self.amulets[idx].kind;
        self.amulets[idx].uses_left -= 1;
        if self.amulets[idx].uses_left == 0 {
            self.amulets.remove(idx);
        }
        Some(kind)
    }

    /// Multiplicative across the set; 1.0 with no modifiers.
    pub fn durability_rate(&self) -> f32 {
        self.amulets
            .iter()
            .map(|a| a.kind.durability_rate(a.level))
            .product()
    }

    /// Boolean OR: any one amulet grants it.
    pub fn allows_cross_tier_merge(&self) -> bool {
        self.amulets.iter().any(|a| a.kind.allows_cross_tier_merge())
    }

    /// Minimum across the set, default 1.0.
    pub fn max_health_cap(&self) -> f32 {
        self.amulets
            .iter()
            .map(|a| a.kind.max_health_cap())
            .fold(1.0f32, f32::min)
    }

    /// All floor-end effects, in acquisition order.
    pub fn on_floor_end(&self) -> Vec<FloorEndEffect> {
        self.amulets
            .iter()
            .filter_map(|a| a.kind.on_floor_end(a.level))
            .collect()
    }

    /// All kill effects, in acquisition order.
    pub fn on_enemy_kill(&self) -> Vec<KillEffect> {
        self.amulets
            .iter()
            .filter_map(|a| a.kind.on_enemy_kill(a.level))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn non_stackable_duplicate_is_rejected() {
        let mut set = ActiveAmulets::new();
        assert_eq!(set.add(AmuletKind::ShadowCloak), Ok(AddOutcome::Added));
        assert_eq!(
            set.add(AmuletKind::ShadowCloak),
            Err(AmuletError::Duplicate)
        );
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn stackable_levels_then_caps() {
        let mut set = ActiveAmulets::new();
        assert_eq!(set.add(AmuletKind::Regeneration), Ok(AddOutcome::Added));
        assert_eq!(
            set.add(AmuletKind::Regeneration),
            Ok(AddOutcome::Leveled(2))
        );
        // Regeneration max level is 2.
        assert_eq!(set.add(AmuletKind::Regeneration), Err(AmuletError::MaxLevel));
        assert_eq!(set.level(AmuletKind::Regeneration), 2);
    }

    #[test]
    fn modifiers_fold_in_acquisition_order() {
        let mut set = ActiveAmulets::new();
        set.add(AmuletKind::PowerCharm).unwrap();
        set.add(AmuletKind::BerserkerIdol).unwrap();
        // (10 + 1) * 1.25 = 13, not 10 * 1.25 + 1 = 13.5 -> order matters
        // once the numbers stop commuting; fold applies PowerCharm first.
        assert_eq!(set.modify_weapon_damage(10), 13);

        let mut reversed = ActiveAmulets::new();
        reversed.add(AmuletKind::BerserkerIdol).unwrap();
        reversed.add(AmuletKind::PowerCharm).unwrap();
        // 10 * 1.25 = 12 (floored), + 1 = 13 here; with damage 11 the two
        // orders diverge: (11+1)*1.25 = 15 vs floor(11*1.25)+1 = 14.
        assert_eq!(set.modify_weapon_damage(11), 15);
        assert_eq!(reversed.modify_weapon_damage(11), 14);
    }

    #[test]
    fn lethal_prevention_spends_a_use_and_crumbles() {
        let mut set = ActiveAmulets::new();
        set.add(AmuletKind::PhoenixFeather).unwrap();
        assert_eq!(
            set.check_lethal_prevention(),
            Some(AmuletKind::PhoenixFeather)
        );
        // Single use: the feather is gone, the next lethal hit lands.
        assert!(!set.has(AmuletKind::PhoenixFeather));
        assert_eq!(set.check_lethal_prevention(), None);
    }

    #[test]
    fn durability_rate_multiplies_and_cap_takes_minimum() {
        let mut set = ActiveAmulets::new();
        assert_eq!(set.durability_rate(), 1.0);
        assert_eq!(set.max_health_cap(), 1.0);
        set.add(AmuletKind::WhetstoneCharm).unwrap();
        set.add(AmuletKind::CursedSkull).unwrap();
        assert_eq!(set.durability_rate(), 0.5);
        assert_eq!(set.max_health_cap(), 0.8);
    }

    #[test]
    fn dodge_sums_and_rolls_once() {
        let mut set = ActiveAmulets::new();
        set.add(AmuletKind::ShadowCloak).unwrap();
        assert!((set.total_dodge_chance() - 0.10).abs() < f32::EPSILON);

        let mut rng = Pcg32::seed_from_u64(7);
        let dodges = (0..1000).filter(|_| set.check_dodge(&mut rng)).count();
        // 10% chance: well inside [50, 200] over 1000 rolls.
        assert!((50..200).contains(&dodges), "dodged {dodges}/1000");
    }
}
