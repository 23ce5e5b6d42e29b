// src/meta/src/lib.rs
//! Meta-progression: run-independent state that only ever grows. Deaths
//! feed kill statistics and can unlock at most one relic each; unlocking
//! is idempotent and the caller persists the state immediately.

pub mod relic;

pub use relic::{KillerMatch, RelicDef, RelicKind, RelicPassive, RELICS};

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const META_SAVE_VERSION: &str = "2.0.0";

fn default_meta_version() -> String {
    META_SAVE_VERSION.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct MetaState {
    #[serde(default)]
    pub unlocked_relics: BTreeSet<RelicKind>,
    #[serde(default)]
    pub total_deaths: u32,
    #[serde(default)]
    pub best_floor: u32,
    /// Deaths keyed by killer name.
    #[serde(default)]
    pub enemy_kill_stats: BTreeMap<String, u32>,
    #[serde(default)]
    pub total_runs: u32,
    #[serde(default)]
    pub total_enemies_killed: u32,
    #[serde(default = "default_meta_version")]
    pub save_version: String,
}

impl Default for MetaState {
    fn default() -> Self {
        Self {
            unlocked_relics: BTreeSet::new(),
            total_deaths: 0,
            best_floor: 0,
            enemy_kill_stats: BTreeMap::new(),
            total_runs: 0,
            total_enemies_killed: 0,
            save_version: META_SAVE_VERSION.to_string(),
        }
    }
}

impl MetaState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_run_start(&mut self) {
        self.total_runs = self.total_runs.saturating_add(1);
    }

    pub fn is_unlocked(&self, kind: RelicKind) -> bool {
        self.unlocked_relics.contains(&kind)
    }

    /// Idempotent unlock; returns true when the relic is new.
    pub fn unlock(&mut self, kind: RelicKind) -> bool {
        self.unlocked_relics.insert(kind)
    }

    /// Passives of every unlocked relic, in definition order.
    pub fn passives(&self) -> Vec<RelicPassive> {
        RELICS
            .iter()
            .filter(|d| self.unlocked_relics.contains(&d.kind))
            .map(|d| d.passive)
            .collect()
    }

    /// Death hook: update the statistics and select at most one new relic.
    /// Killer-matched relics win over milestone relics; already-owned
    /// relics never unlock twice.
    pub fn record_death(
        &mut self,
        killed_by: &str,
        floor: u32,
        enemies_killed: u32,
    ) -> Option<RelicKind> {
        self.total_deaths = self.total_deaths.saturating_add(1);
        self.best_floor = self.best_floor.max(floor);
        self.total_enemies_killed = self.total_enemies_killed.saturating_add(enemies_killed);
        *self
            .enemy_kill_stats
            .entry(killed_by.to_string())
            .or_insert(0) += 1;

        let killer_match = RELICS.iter().find(|d| {
            !self.unlocked_relics.contains(&d.kind)
                && d.killed_by.is_some_and(|m| m.matches(killed_by))
        });
        let unlock = killer_match.or_else(|| {
            RELICS.iter().find(|d| {
                !self.unlocked_relics.contains(&d.kind)
                    && (d.min_deaths.is_some_and(|n| self.total_deaths >= n)
                        || d.min_floor.is_some_and(|n| self.best_floor >= n))
            })
        })?;
        self.unlocked_relics.insert(unlock.kind);
        Some(unlock.kind)
    }
}
