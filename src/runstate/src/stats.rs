// src/runstate/src/stats.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Damage bookkeeping for the death screen and meta-progression.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageStats {
    pub total_taken: u32,
    pub total_dealt: u32,
    pub biggest_hit_taken: u32,
    pub enemies_killed: u32,
    /// Damage taken keyed by source label ("enemy", "trap", ...).
    pub taken_by_source: HashMap<String, u32>,
}

impl DamageStats {
    pub fn record_taken(&mut self, source: &str, amount: u32) {
        self.total_taken = self.total_taken.saturating_add(amount);
        self.biggest_hit_taken = self.biggest_hit_taken.max(amount);
        *self.taken_by_source.entry(source.to_string()).or_insert(0) += amount;
    }

    pub fn record_dealt(&mut self, amount: u32) {
        self.total_dealt = self.total_dealt.saturating_add(amount);
    }

    pub fn record_kill(&mut self) {
        self.enemies_killed = self.enemies_killed.saturating_add(1);
    }
}
