// src/meta/src/relic.rs
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Cross-run permanent unlocks, granted on death. Distinct from amulets:
/// a relic modifies the *starting* state of later runs and never changes
/// anything mid-run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
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
pub enum RelicKind {
    RatKingCrown,
    BoneCharm,
    SpiderFang,
    GolemHeart,
    VampireAsh,
    ColossusShard,
    HeraldsMask,
    StubbornSoul,
    DeepDelverSigil,
}

/// Passive starting-state modifier carried by an unlocked relic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum RelicPassive {
    BonusMaxHealth(u32),
    BonusActions(u32),
    StartingCoins(u32),
    StartingKeys(u32),
}

/// How a relic's `killed_by` pattern matches the killer's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillerMatch {
    /// Substring match, for common enemy families ("Rat" hits "Cave Rat").
    Family(&'static str),
    /// Exact match, for named bosses.
    Exact(&'static str),
}

pub struct RelicDef {
    pub kind: RelicKind,
    pub name: &'static str,
    pub description: &'static str,
    pub killed_by: Option<KillerMatch>,
    /// Milestone unlock: total deaths reached.
    pub min_deaths: Option<u32>,
    /// Milestone unlock: best floor reached.
    pub min_floor: Option<u32>,
    pub passive: RelicPassive,
}

/// Unlock selection walks this list in order, killer matches first.
pub static RELICS: &[RelicDef] = &[
    RelicDef {
        kind: RelicKind::RatKingCrown,
        name: "Rat King's Crown",
        description: "Start each run with 10 gold",
        killed_by: Some(KillerMatch::Family("Rat")),
        min_deaths: None,
        min_floor: None,
        passive: RelicPassive::StartingCoins(10),
    },
    RelicDef {
        kind: RelicKind::BoneCharm,
        name: "Bone Charm",
        description: "+2 max health",
        killed_by: Some(KillerMatch::Family("Skeleton")),
        min_deaths: None,
        min_floor: None,
        passive: RelicPassive::BonusMaxHealth(2),
    },
    RelicDef {
        kind: RelicKind::SpiderFang,
        name: "Spider Fang",
        description: "Start each run with a key",
        killed_by: Some(KillerMatch::Family("Spider")),
        min_deaths: None,
        min_floor: None,
        passive: RelicPassive::StartingKeys(1),
    },
    RelicDef {
        kind: RelicKind::GolemHeart,
        name: "Golem Heart",
        description: "+4 max health",
        killed_by: Some(KillerMatch::Family("Golem")),
        min_deaths: None,
        min_floor: None,
        passive: RelicPassive::BonusMaxHealth(4),
    },
    RelicDef {
        kind: RelicKind::VampireAsh,
        name: "Vampire Ash",
        description: "Start each run with 15 gold",
        killed_by: Some(KillerMatch::Family("Vampire")),
        min_deaths: None,
        min_floor: None,
        passive: RelicPassive::StartingCoins(15),
    },
    RelicDef {
        kind: RelicKind::ColossusShard,
        name: "Colossus Shard",
        description: "+1 action per turn",
        killed_by: Some(KillerMatch::Exact("Bone Colossus")),
        min_deaths: None,
        min_floor: None,
        passive: RelicPassive::BonusActions(1),
    },
    RelicDef {
        kind: RelicKind::HeraldsMask,
        name: "Herald's Mask",
        description: "+5 max health",
        killed_by: Some(KillerMatch::Exact("Plague Herald")),
        min_deaths: None,
        min_floor: None,
        passive: RelicPassive::BonusMaxHealth(5),
    },
    RelicDef {
        kind: RelicKind::StubbornSoul,
        name: "Stubborn Soul",
        description: "Five deaths in: +3 max health",
        killed_by: None,
        min_deaths: Some(5),
        min_floor: None,
        passive: RelicPassive::BonusMaxHealth(3),
    },
    RelicDef {
        kind: RelicKind::DeepDelverSigil,
        name: "Deep Delver's Sigil",
        description: "Reach floor 8: start with a key",
        killed_by: None,
        min_deaths: None,
        min_floor: Some(8),
        passive: RelicPassive::StartingKeys(1),
    },
];

impl RelicKind {
    pub fn def(&self) -> &'static RelicDef {
        RELICS
            .iter()
            .find(|d| d.kind == *self)
            .expect("every relic kind has a definition")
    }
}

impl KillerMatch {
    pub fn matches(&self, killer: &str) -> bool {
        match self {
            KillerMatch::Family(pattern) => killer.contains(pattern),
            KillerMatch::Exact(pattern) => killer == *pattern,
        }
    }
}
