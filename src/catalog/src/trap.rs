// src/catalog/src/trap.rs
use bincode::{Decode, Encode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::weights::weighted_pick;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TrapKind {
    /// Flat damage on reveal.
    Spikes,
    /// Small hit plus a poison stack.
    PoisonDart,
    /// Steals coins instead of health.
    CoinSnatcher,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct TrapPayload {
    pub kind: TrapKind,
    pub damage: u32,
    /// Poison applied on trigger (PoisonDart only).
    pub poison_damage: u32,
    pub poison_turns: u32,
    /// Coins stolen on trigger (CoinSnatcher only).
    pub coins_stolen: u32,
}

/// Trap selection is a cumulative-weight roll; damage scales gently with
/// the floor.
pub fn create_trap(floor: u32, rng: &mut impl Rng) -> TrapPayload {
    let entries = [
        (TrapKind::Spikes, 50u32),
        (TrapKind::PoisonDart, 30),
        (TrapKind::CoinSnatcher, 20),
    ];
    let kind = *weighted_pick(&entries, rng);
    match kind {
        TrapKind::Spikes => TrapPayload {
            kind,
            damage: 3 + floor / 3,
            poison_damage: 0,
            poison_turns: 0,
            coins_stolen: 0,
        },
        TrapKind::PoisonDart => TrapPayload {
            kind,
            damage: 1,
            poison_damage: 2,
            poison_turns: 2,
            coins_stolen: 0,
        },
        TrapKind::CoinSnatcher => TrapPayload {
            kind,
            damage: 0,
            poison_damage: 0,
            poison_turns: 0,
            coins_stolen: 4 + floor / 2,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn spike_damage_scales_with_floor() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut shallow = 0;
        let mut deep = 0;
        for _ in 0..200 {
            let t = create_trap(1, &mut rng);
            if t.kind == TrapKind::Spikes {
                shallow = t.damage;
            }
            let t = create_trap(12, &mut rng);
            if t.kind == TrapKind::Spikes {
                deep = t.damage;
            }
        }
        assert_eq!(shallow, 3);
        assert_eq!(deep, 7);
    }
}
